use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::{BigDecimal, Zero};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::product::{NewProduct, Product, ProductChangeset};
use crate::pricing;
use crate::schema::products;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    /// Gross price (VAT included) as a decimal string to avoid
    /// floating-point issues, e.g. "999.99"
    pub total_price: String,
    /// VAT rate as a decimal string, e.g. "0.22"
    pub vat_rate: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub total_price: String,
    pub net_price: String,
    pub vat_amount: String,
    pub vat_rate: String,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        let net_price = pricing::compute_net_price(&product.total_price, &product.vat_rate);
        let vat_amount = &product.total_price - &net_price;
        ProductResponse {
            id: product.id,
            name: product.name,
            description: product.description,
            total_price: product.total_price.to_string(),
            net_price: net_price.to_string(),
            vat_amount: vat_amount.to_string(),
            vat_rate: product.vat_rate.to_string(),
        }
    }
}

// ── Search parameters / pagination ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSearchParams {
    /// Case-insensitive name substring filter.
    pub name: Option<String>,
    /// Keep only products strictly more expensive than this.
    pub min_price: Option<String>,
    /// Keep only products strictly cheaper than this.
    pub max_price: Option<String>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

// ── Field validation ─────────────────────────────────────────────────────────

fn parse_positive_price(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    let value = BigDecimal::from_str(raw)
        .map_err(|_| AppError::BadRequest(format!("Invalid {field}: '{raw}'")))?;
    if value <= BigDecimal::zero() {
        return Err(AppError::BadRequest(format!(
            "Product {field} must be greater than zero"
        )));
    }
    if value.fractional_digit_count() > 2 {
        return Err(AppError::BadRequest(format!(
            "Product {field} must have at most 2 fractional digits"
        )));
    }
    Ok(value)
}

fn validate_request(body: &ProductRequest) -> Result<(BigDecimal, BigDecimal), AppError> {
    let total_price = parse_positive_price("totalPrice", &body.total_price)?;
    let vat_rate = parse_positive_price("vatRate", &body.vat_rate)?;
    Ok((total_price, vat_rate))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created successfully", body = ProductResponse),
        (status = 400, description = "Invalid product data"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn create_product(
    pool: web::Data<DbPool>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (total_price, vat_rate) = validate_request(&body)?;

    let product = web::block(move || {
        let mut conn = pool.get()?;
        let product: Product = diesel::insert_into(products::table)
            .values(&NewProduct {
                id: Uuid::new_v4(),
                name: body.name,
                description: body.description,
                total_price,
                vat_rate,
            })
            .returning(Product::as_returning())
            .get_result(&mut conn)?;
        Ok::<_, AppError>(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn get_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let product = web::block(move || {
        let mut conn = pool.get()?;
        let product = products::table
            .find(product_id)
            .select(Product::as_select())
            .first(&mut conn)
            .optional()?;
        Ok::<_, AppError>(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound),
    }
}

/// PUT /api/products/{id}
///
/// Overwrites all four mutable fields. There is no optimistic-concurrency
/// check; concurrent updates follow last-write-wins.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    request_body = ProductRequest,
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product updated successfully", body = ProductResponse),
        (status = 400, description = "Invalid product data"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn update_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let body = body.into_inner();
    let (total_price, vat_rate) = validate_request(&body)?;

    let product = web::block(move || {
        let mut conn = pool.get()?;
        let product = diesel::update(products::table.find(product_id))
            .set(&ProductChangeset {
                name: body.name,
                description: body.description,
                total_price,
                vat_rate,
            })
            .returning(Product::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok::<_, AppError>(product)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    match product {
        Some(product) => Ok(HttpResponse::Ok().json(ProductResponse::from(product))),
        None => Err(AppError::NotFound),
    }
}

/// DELETE /api/products/{id}
///
/// Idempotent: deleting an unknown id is still a 204. Orders keep their
/// snapshots, so existing orders are unaffected.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn delete_product(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    web::block(move || {
        let mut conn = pool.get()?;
        diesel::delete(products::table.find(product_id)).execute(&mut conn)?;
        Ok::<_, AppError>(())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/products
///
/// All supplied filters apply conjunctively; absent filters impose no
/// constraint. An empty result set is a valid response.
#[utoipa::path(
    get,
    path = "/api/products",
    params(
        ("name" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("minPrice" = Option<String>, Query, description = "Strict lower price bound"),
        ("maxPrice" = Option<String>, Query, description = "Strict upper price bound"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "List of matching products", body = [ProductResponse]),
        (status = 400, description = "Invalid filter value"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn search_products(
    pool: web::Data<DbPool>,
    query: web::Query<ProductSearchParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let min_price = params
        .min_price
        .map(|raw| {
            BigDecimal::from_str(&raw)
                .map_err(|_| AppError::BadRequest(format!("Invalid minPrice: '{raw}'")))
        })
        .transpose()?;
    let max_price = params
        .max_price
        .map(|raw| {
            BigDecimal::from_str(&raw)
                .map_err(|_| AppError::BadRequest(format!("Invalid maxPrice: '{raw}'")))
        })
        .transpose()?;

    let rows = web::block(move || {
        let mut conn = pool.get()?;

        let mut query = products::table
            .select(Product::as_select())
            .into_boxed::<Pg>();
        if let Some(name) = params.name {
            query = query.filter(products::name.ilike(format!("%{name}%")));
        }
        if let Some(min) = min_price {
            query = query.filter(products::total_price.gt(min));
        }
        if let Some(max) = max_price {
            query = query.filter(products::total_price.lt(max));
        }

        let rows: Vec<Product> = query
            .order(products::name.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)?;
        Ok::<_, AppError>(rows)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let items: Vec<ProductResponse> = rows.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(items))
}
