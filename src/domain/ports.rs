use uuid::Uuid;

use super::errors::DomainError;
use super::order::{OrderDraft, OrderView, ProductSnapshot};

pub trait OrderRepository: Send + Sync + 'static {
    /// Resolve catalog snapshots for the given ids in a single lookup.
    /// Missing ids are simply absent from the result; absence is the
    /// caller's signal.
    fn find_products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProductSnapshot>, DomainError>;

    /// Persist the order and its lines atomically, returning the stored
    /// aggregate with generated ids and creation timestamp.
    fn save(&self, draft: OrderDraft) -> Result<OrderView, DomainError>;

    fn find_by_id_with_lines(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
}
