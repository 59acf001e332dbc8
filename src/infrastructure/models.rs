use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{order_products, orders, products};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub shipping_address: Option<String>,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_products)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
    pub vat_rate: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_products)]
pub struct NewOrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
    pub vat_rate: BigDecimal,
}

/// Projection of the product columns an order snapshot needs.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductSnapshotRow {
    pub id: Uuid,
    pub name: String,
    pub total_price: BigDecimal,
    pub vat_rate: BigDecimal,
}
