use bigdecimal::BigDecimal;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::products;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub total_price: BigDecimal,
    pub vat_rate: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub total_price: BigDecimal,
    pub vat_rate: BigDecimal,
}

/// Full overwrite of the mutable product fields; partial updates are not
/// supported.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: String,
    pub description: String,
    pub total_price: BigDecimal,
    pub vat_rate: BigDecimal,
}
