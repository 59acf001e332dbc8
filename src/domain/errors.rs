use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Duplicate product: {0}")]
    DuplicateProduct(Uuid),
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),
    #[error("Order not found")]
    NotFound,
    #[error("Internal error: {0}")]
    Internal(String),
}
