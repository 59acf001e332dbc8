use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::{OrderItem, OrderView};
use crate::errors::AppError;
use crate::AppOrderService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Free-text shipping address; may be absent.
    #[serde(default)]
    pub shipping_address: Option<String>,
    pub products: Vec<OrderProductRequest>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderProductRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub shipping_address: Option<String>,
    pub created_at: String,
    pub total_price: String,
    pub vat_amount: String,
    pub products: Vec<OrderProductResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderProductResponse {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub total_price: String,
    pub vat_amount: String,
    pub vat_rate: String,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            shipping_address: order.shipping_address,
            created_at: order.created_at.to_rfc3339(),
            total_price: order.total_price.to_string(),
            vat_amount: order.vat_amount.to_string(),
            products: order
                .lines
                .into_iter()
                .map(|l| OrderProductResponse {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    name: l.name,
                    total_price: l.total_price.to_string(),
                    vat_amount: l.vat_amount.to_string(),
                    vat_rate: l.vat_rate.to_string(),
                })
                .collect(),
        }
    }
}

fn validate_request(body: &OrderRequest) -> Result<(), AppError> {
    if body.products.is_empty() {
        return Err(AppError::BadRequest(
            "Order must contain at least one product".to_string(),
        ));
    }
    if body.products.iter().any(|p| p.quantity <= 0) {
        return Err(AppError::BadRequest(
            "Product quantity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders
///
/// Snapshots current catalog prices into an immutable order. The order and
/// its lines are written in a single transaction; duplicate or unknown
/// product ids reject the request before anything is persisted.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = OrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Invalid order data"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppOrderService>,
    body: web::Json<OrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    validate_request(&body)?;

    let items: Vec<OrderItem> = body
        .products
        .iter()
        .map(|p| OrderItem {
            product_id: p.product_id,
            quantity: p.quantity,
        })
        .collect();
    let shipping_address = body.shipping_address;

    let order = web::block(move || service.create_order(shipping_address, items))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders/{id}
///
/// Returns the order together with its lines, in request order.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppOrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)?;

    match order {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound),
    }
}
