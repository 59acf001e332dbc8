use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderDraft, OrderItem, OrderView};
use crate::domain::ports::OrderRepository;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validate the request, freeze catalog prices into a snapshot and
    /// persist it.
    ///
    /// Duplicate ids are rejected before any repository call; a missing
    /// product rejects the request before anything is written.
    pub fn create_order(
        &self,
        shipping_address: Option<String>,
        items: Vec<OrderItem>,
    ) -> Result<OrderView, DomainError> {
        check_duplicate_products(&items)?;
        let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let products = self.repo.find_products_by_ids(&ids)?;
        let draft = OrderDraft::assemble(shipping_address, &items, &products)?;
        self.repo.save(draft)
    }

    pub fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.repo.find_by_id_with_lines(id)
    }
}

fn check_duplicate_products(items: &[OrderItem]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.product_id) {
            return Err(DomainError::DuplicateProduct(item.product_id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};

    use bigdecimal::BigDecimal;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::order::{OrderLineView, ProductSnapshot};

    /// In-memory repository standing in for the database.
    struct FakeRepository {
        products: Vec<ProductSnapshot>,
        saved: Mutex<Vec<OrderDraft>>,
    }

    impl FakeRepository {
        fn with_products(products: Vec<ProductSnapshot>) -> Self {
            Self {
                products,
                saved: Mutex::new(Vec::new()),
            }
        }

        fn save_count(&self) -> usize {
            self.saved.lock().expect("lock poisoned").len()
        }
    }

    impl OrderRepository for Arc<FakeRepository> {
        fn find_products_by_ids(
            &self,
            ids: &[Uuid],
        ) -> Result<Vec<ProductSnapshot>, DomainError> {
            Ok(self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect())
        }

        fn save(&self, draft: OrderDraft) -> Result<OrderView, DomainError> {
            let view = OrderView {
                id: Uuid::new_v4(),
                shipping_address: draft.shipping_address.clone(),
                created_at: Utc::now(),
                total_price: draft.total_price.clone(),
                vat_amount: draft.vat_amount.clone(),
                lines: draft
                    .lines
                    .iter()
                    .map(|l| OrderLineView {
                        id: Uuid::new_v4(),
                        product_id: l.product_id,
                        quantity: l.quantity,
                        name: l.name.clone(),
                        total_price: l.total_price.clone(),
                        vat_amount: l.vat_amount.clone(),
                        vat_rate: l.vat_rate.clone(),
                    })
                    .collect(),
            };
            self.saved.lock().expect("lock poisoned").push(draft);
            Ok(view)
        }

        fn find_by_id_with_lines(&self, _id: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(None)
        }
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn snapshot(id: Uuid, name: &str, total_price: &str, vat_rate: &str) -> ProductSnapshot {
        ProductSnapshot {
            id,
            name: name.to_string(),
            total_price: dec(total_price),
            vat_rate: dec(vat_rate),
        }
    }

    #[test]
    fn create_order_snapshots_prices_and_totals() {
        let phone = Uuid::new_v4();
        let watch = Uuid::new_v4();
        let repo = Arc::new(FakeRepository::with_products(vec![
            snapshot(phone, "iPhone", "999.99", "0.22"),
            snapshot(watch, "Apple Watch", "150", "0.21"),
        ]));
        let service = OrderService::new(repo.clone());

        let order = service
            .create_order(
                Some("via Roma, 5".to_string()),
                vec![
                    OrderItem { product_id: phone, quantity: 2 },
                    OrderItem { product_id: watch, quantity: 1 },
                ],
            )
            .expect("create failed");

        assert_eq!(order.shipping_address.as_deref(), Some("via Roma, 5"));
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[0].name, "iPhone");
        assert_eq!(order.lines[0].total_price, dec("1999.98"));
        assert_eq!(order.lines[0].vat_amount, dec("360.65"));
        assert_eq!(order.lines[1].name, "Apple Watch");
        assert_eq!(order.lines[1].total_price, dec("150"));
        assert_eq!(order.lines[1].vat_amount, dec("26.03"));
        assert_eq!(order.total_price, dec("2149.98"));
        assert_eq!(order.vat_amount, dec("386.68"));
        assert_eq!(repo.save_count(), 1);
    }

    #[test]
    fn create_order_sums_mixed_quantities() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let repo = Arc::new(FakeRepository::with_products(vec![
            snapshot(a, "Samsung Galaxy S24", "800.00", "0.22"),
            snapshot(b, "Galaxy Buds", "199.99", "0.22"),
        ]));
        let service = OrderService::new(repo.clone());

        let order = service
            .create_order(
                None,
                vec![
                    OrderItem { product_id: a, quantity: 2 },
                    OrderItem { product_id: b, quantity: 1 },
                ],
            )
            .expect("create failed");

        assert_eq!(order.lines[0].total_price, dec("1600.00"));
        assert_eq!(order.total_price, dec("1799.99"));
    }

    #[test]
    fn duplicate_product_is_rejected_before_any_lookup_or_save() {
        let id = Uuid::new_v4();
        let repo = Arc::new(FakeRepository::with_products(vec![snapshot(
            id, "iPhone", "999.99", "0.22",
        )]));
        let service = OrderService::new(repo.clone());

        let err = service
            .create_order(
                Some("via Roma, 5".to_string()),
                vec![
                    OrderItem { product_id: id, quantity: 2 },
                    OrderItem { product_id: id, quantity: 1 },
                ],
            )
            .unwrap_err();

        match &err {
            DomainError::DuplicateProduct(dup) => assert_eq!(*dup, id),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), format!("Duplicate product: {id}"));
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn missing_product_is_rejected_without_save() {
        let known = Uuid::new_v4();
        let missing = Uuid::new_v4();
        let repo = Arc::new(FakeRepository::with_products(vec![snapshot(
            known, "iPhone", "999.99", "0.22",
        )]));
        let service = OrderService::new(repo.clone());

        let err = service
            .create_order(
                None,
                vec![
                    OrderItem { product_id: known, quantity: 2 },
                    OrderItem { product_id: missing, quantity: 1 },
                ],
            )
            .unwrap_err();

        match &err {
            DomainError::ProductNotFound(id) => assert_eq!(*id, missing),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), format!("Product not found: {missing}"));
        assert_eq!(repo.save_count(), 0);
    }

    #[test]
    fn lines_follow_request_order() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        // Catalog order is reversed relative to the request.
        let repo = Arc::new(FakeRepository::with_products(vec![
            snapshot(second, "B", "2.00", "0.22"),
            snapshot(first, "A", "1.00", "0.22"),
        ]));
        let service = OrderService::new(repo.clone());

        let order = service
            .create_order(
                None,
                vec![
                    OrderItem { product_id: first, quantity: 1 },
                    OrderItem { product_id: second, quantity: 1 },
                ],
            )
            .expect("create failed");

        assert_eq!(order.lines[0].product_id, first);
        assert_eq!(order.lines[1].product_id, second);
    }
}
