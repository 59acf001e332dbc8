use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::pricing;

use super::errors::DomainError;

/// One (product, quantity) pair from an order request.
#[derive(Debug, Clone)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Catalog fields captured at order time. Later changes to the product do
/// not affect orders built from this snapshot.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub name: String,
    pub total_price: BigDecimal,
    pub vat_rate: BigDecimal,
}

/// An order ready to persist, with all prices frozen from the catalog.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub shipping_address: Option<String>,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
    pub lines: Vec<OrderLineDraft>,
}

#[derive(Debug, Clone)]
pub struct OrderLineDraft {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
    pub vat_rate: BigDecimal,
}

/// A persisted order, lines in the order they were requested.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub shipping_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
    pub lines: Vec<OrderLineView>,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub total_price: BigDecimal,
    pub vat_amount: BigDecimal,
    pub vat_rate: BigDecimal,
}

impl OrderDraft {
    /// Build an order snapshot from request items and the resolved products.
    ///
    /// Lines keep the request order. The line total is the unit gross price
    /// times the quantity; line VAT is decomposed from the line total, not
    /// the unit price. Fails with `ProductNotFound` for the first item (in
    /// request order) with no matching snapshot.
    pub fn assemble(
        shipping_address: Option<String>,
        items: &[OrderItem],
        products: &[ProductSnapshot],
    ) -> Result<OrderDraft, DomainError> {
        let by_id: HashMap<Uuid, &ProductSnapshot> =
            products.iter().map(|p| (p.id, p)).collect();

        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = by_id
                .get(&item.product_id)
                .copied()
                .ok_or(DomainError::ProductNotFound(item.product_id))?;
            let line_total = &product.total_price * BigDecimal::from(item.quantity);
            let line_vat = pricing::compute_vat_amount(&line_total, &product.vat_rate);
            lines.push(OrderLineDraft {
                product_id: item.product_id,
                quantity: item.quantity,
                name: product.name.clone(),
                total_price: line_total,
                vat_amount: line_vat,
                vat_rate: product.vat_rate.clone(),
            });
        }

        let total_price = lines
            .iter()
            .fold(BigDecimal::zero(), |acc, l| acc + &l.total_price);
        let vat_amount = lines
            .iter()
            .fold(BigDecimal::zero(), |acc, l| acc + &l.vat_amount);

        Ok(OrderDraft {
            shipping_address,
            total_price,
            vat_amount,
            lines,
        })
    }
}
