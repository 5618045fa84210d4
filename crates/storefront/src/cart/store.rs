//! The cart store: cart state, its persistence, and the add-control registry.

use std::collections::HashMap;

use comfy_house_core::{Cart, CartLine, CartTotals, ControlId, Product, ProductId};
use tracing::debug;

use super::{AmountChange, CartError};
use crate::error::add_breadcrumb;
use crate::storage::{self, CART_KEY, Storage};

/// Owns the cart and writes it through to storage after every mutation.
///
/// Also keeps a direct map from product id to the add control mounted for
/// it, so the view can re-enable the right control when a line goes away.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
    controls: HashMap<ProductId, ControlId>,
}

impl<S: Storage> CartStore<S> {
    /// Create a store over `storage` with an empty in-memory cart.
    ///
    /// Call [`restore`](Self::restore) to load the persisted cart.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cart: Cart::new(),
            controls: HashMap::new(),
        }
    }

    /// Load the persisted cart (empty if none) and make it current.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the stored cart cannot be read or parsed.
    pub fn restore(&mut self) -> Result<&Cart, CartError> {
        self.cart = storage::load_json(&self.storage, CART_KEY)?.unwrap_or_default();
        debug!(lines = self.cart.len(), "Restored cart");
        Ok(&self.cart)
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Item count and total of the current cart.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    /// The underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store, returning its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Persist a freshly loaded catalog so later adds can look products up.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the snapshot cannot be written.
    pub fn save_catalog(&mut self, products: &[Product]) -> Result<(), CartError> {
        storage::save_products(&mut self.storage, products)?;
        Ok(())
    }

    /// Associate the add control for `id`, returning any stale handle it replaces.
    pub fn register_control(&mut self, id: ProductId, control: ControlId) -> Option<ControlId> {
        self.controls.insert(id, control)
    }

    /// The add control registered for `id`.
    #[must_use]
    pub fn control(&self, id: &ProductId) -> Option<&ControlId> {
        self.controls.get(id)
    }

    /// Append a new line for `id` with an amount of 1.
    ///
    /// The product is looked up in the persisted catalog snapshot.
    ///
    /// # Errors
    ///
    /// - `CartError::AlreadyInCart` if a line for `id` exists (cart unchanged)
    /// - `CartError::UnknownProduct` if the snapshot has no such product
    /// - `CartError::Storage` if reading the snapshot or persisting fails
    pub fn add_item(&mut self, id: &ProductId) -> Result<&CartLine, CartError> {
        if self.cart.contains(id) {
            return Err(CartError::AlreadyInCart(id.clone()));
        }

        let product = storage::load_products(&self.storage)?
            .into_iter()
            .find(|product| &product.id == id)
            .ok_or_else(|| CartError::UnknownProduct(id.clone()))?;

        let mut next = self.cart.clone();
        next.push(CartLine::new(product));
        self.commit(next)?;

        debug!(product_id = %id, "Added cart line");
        add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));

        self.cart
            .line(id)
            .ok_or_else(|| CartError::NotFound(id.clone()))
    }

    /// Increase the amount of the line for `id` by one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if there is no line for `id`,
    /// `CartError::AmountOverflow` if the amount is already at its maximum, or
    /// `CartError::Storage` if persisting fails. The cart is unchanged on error.
    pub fn increment_amount(&mut self, id: &ProductId) -> Result<u32, CartError> {
        let mut next = self.cart.clone();
        let line = next
            .line_mut(id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;
        line.amount = line
            .amount
            .checked_add(1)
            .ok_or_else(|| CartError::AmountOverflow(id.clone()))?;
        let amount = line.amount;

        self.commit(next)?;
        debug!(product_id = %id, amount, "Incremented cart line");
        add_breadcrumb("cart", "Increased amount", Some(&[("product_id", id.as_str())]));
        Ok(amount)
    }

    /// Decrease the amount of the line for `id` by one.
    ///
    /// Decrementing a line whose amount is 1 removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotFound` if there is no line for `id`, or
    /// `CartError::Storage` if persisting fails. The cart is unchanged on error.
    pub fn decrement_amount(&mut self, id: &ProductId) -> Result<AmountChange, CartError> {
        let mut next = self.cart.clone();
        let line = next
            .line_mut(id)
            .ok_or_else(|| CartError::NotFound(id.clone()))?;

        if line.amount <= 1 {
            return self.remove_item(id).map(AmountChange::Removed);
        }

        line.amount -= 1;
        let amount = line.amount;

        self.commit(next)?;
        debug!(product_id = %id, amount, "Decremented cart line");
        add_breadcrumb("cart", "Decreased amount", Some(&[("product_id", id.as_str())]));
        Ok(AmountChange::Updated(amount))
    }

    /// Delete the line for `id`. Absent lines are a no-op.
    ///
    /// Returns the add control to re-enable, if one is registered.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if persisting fails. The cart is unchanged
    /// on error.
    pub fn remove_item(&mut self, id: &ProductId) -> Result<Option<ControlId>, CartError> {
        let mut next = self.cart.clone();
        let removed = next.remove(id).is_some();
        self.commit(next)?;

        if removed {
            debug!(product_id = %id, "Removed cart line");
            add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
        }
        Ok(self.controls.get(id).cloned())
    }

    /// Remove every line.
    ///
    /// Returns the add controls of every line that was present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if persisting fails. The cart is unchanged
    /// on error.
    pub fn clear(&mut self) -> Result<Vec<ControlId>, CartError> {
        let ids = self.cart.ids();
        self.commit(Cart::new())?;

        let controls: Vec<ControlId> = ids
            .iter()
            .filter_map(|id| self.controls.get(id).cloned())
            .collect();
        debug!(lines = ids.len(), "Cleared cart");
        add_breadcrumb("cart", "Cleared cart", None);
        Ok(controls)
    }

    /// Write `next` to storage, then make it the current cart.
    fn commit(&mut self, next: Cart) -> Result<(), CartError> {
        storage::save_json(&mut self.storage, CART_KEY, &next)?;
        self.cart = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use comfy_house_core::Price;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::{MemoryStorage, StorageError};

    fn product(id: &str, dollars: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(dollars * 100).unwrap(),
            image: format!("./images/{id}.jpeg"),
        }
    }

    fn id(raw: &str) -> ProductId {
        ProductId::new(raw)
    }

    /// Store over a catalog of `a` ($10) and `b` ($5).
    fn store() -> CartStore<MemoryStorage> {
        let mut store = CartStore::new(MemoryStorage::new());
        store
            .save_catalog(&[product("a", 10), product("b", 5)])
            .unwrap();
        store.restore().unwrap();
        store
    }

    fn assert_totals(store: &CartStore<MemoryStorage>, count: u64, dollars: i64) {
        let totals = store.totals();
        assert_eq!(totals.item_count, count);
        assert_eq!(totals.total, Decimal::from(dollars));
    }

    fn persisted(store: &CartStore<MemoryStorage>) -> Cart {
        storage::load_json(store.storage(), CART_KEY)
            .unwrap()
            .unwrap_or_default()
    }

    // =========================================================================
    // Restore
    // =========================================================================

    #[test]
    fn test_restore_empty_storage() {
        let mut store = CartStore::new(MemoryStorage::new());
        assert!(store.restore().unwrap().is_empty());
    }

    #[test]
    fn test_restore_reads_persisted_cart() {
        let mut first = store();
        first.add_item(&id("b")).unwrap();
        first.add_item(&id("a")).unwrap();
        first.increment_amount(&id("a")).unwrap();
        let before = first.cart().clone();

        let mut reloaded = CartStore::new(first.into_storage());
        let restored = reloaded.restore().unwrap();
        assert_eq!(restored, &before);
        assert_eq!(restored.ids(), vec![id("b"), id("a")]);
    }

    #[test]
    fn test_restore_corrupt_cart_is_error() {
        let mut storage = MemoryStorage::new();
        storage.set(CART_KEY, "not json").unwrap();
        let mut store = CartStore::new(storage);
        assert!(matches!(
            store.restore().unwrap_err(),
            CartError::Storage(StorageError::Corrupt { .. })
        ));
    }

    // =========================================================================
    // Add
    // =========================================================================

    #[test]
    fn test_add_appends_line_with_amount_one() {
        let mut store = store();
        let line = store.add_item(&id("a")).unwrap();
        assert_eq!(line.amount, 1);
        assert_eq!(line.product.title, "Product a");
        assert_eq!(persisted(&store), *store.cart());
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut store = store();
        store.add_item(&id("a")).unwrap();
        let err = store.add_item(&id("a")).unwrap_err();
        assert!(matches!(err, CartError::AlreadyInCart(_)));
        assert_eq!(store.cart().len(), 1);
        assert_totals(&store, 1, 10);
    }

    #[test]
    fn test_add_unknown_product() {
        let mut store = store();
        let err = store.add_item(&id("zzz")).unwrap_err();
        assert!(matches!(err, CartError::UnknownProduct(_)));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_add_then_remove_restores_empty_state() {
        let mut store = store();
        let before = persisted(&store);

        store.add_item(&id("a")).unwrap();
        store.remove_item(&id("a")).unwrap();

        assert!(store.cart().is_empty());
        assert_eq!(persisted(&store), before);
        assert_totals(&store, 0, 0);
    }

    // =========================================================================
    // Amounts
    // =========================================================================

    #[test]
    fn test_increment_absent_line() {
        let mut store = store();
        assert!(matches!(
            store.increment_amount(&id("a")).unwrap_err(),
            CartError::NotFound(_)
        ));
    }

    #[test]
    fn test_decrement_absent_line() {
        let mut store = store();
        assert!(matches!(
            store.decrement_amount(&id("a")).unwrap_err(),
            CartError::NotFound(_)
        ));
    }

    #[test]
    fn test_decrement_from_one_removes_line() {
        let mut store = store();
        store.register_control(id("a"), ControlId::new("control-0"));
        store.add_item(&id("a")).unwrap();

        let change = store.decrement_amount(&id("a")).unwrap();
        assert_eq!(change, AmountChange::Removed(Some(ControlId::new("control-0"))));
        assert!(!store.cart().contains(&id("a")));
        assert!(persisted(&store).is_empty());
    }

    #[test]
    fn test_decrement_never_reaches_zero() {
        let mut store = store();
        store.add_item(&id("a")).unwrap();
        store.increment_amount(&id("a")).unwrap();
        store.increment_amount(&id("a")).unwrap();

        assert_eq!(
            store.decrement_amount(&id("a")).unwrap(),
            AmountChange::Updated(2)
        );
        assert_eq!(
            store.decrement_amount(&id("a")).unwrap(),
            AmountChange::Updated(1)
        );
        assert_eq!(
            store.decrement_amount(&id("a")).unwrap(),
            AmountChange::Removed(None)
        );
        assert!(store.cart().lines().iter().all(|line| line.amount >= 1));
    }

    // =========================================================================
    // Remove / clear
    // =========================================================================

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = store();
        store.add_item(&id("a")).unwrap();
        assert_eq!(store.remove_item(&id("b")).unwrap(), None);
        assert_eq!(store.cart().len(), 1);
    }

    #[test]
    fn test_clear_returns_every_control() {
        let mut store = store();
        store.register_control(id("a"), ControlId::new("control-a"));
        store.register_control(id("b"), ControlId::new("control-b"));
        store.add_item(&id("a")).unwrap();
        store.add_item(&id("b")).unwrap();

        let controls = store.clear().unwrap();
        assert_eq!(
            controls,
            vec![ControlId::new("control-a"), ControlId::new("control-b")]
        );
        assert!(store.cart().is_empty());
        assert!(persisted(&store).is_empty());
        assert_totals(&store, 0, 0);
    }

    #[test]
    fn test_register_control_replaces_stale_handle() {
        let mut store = store();
        assert!(store.register_control(id("a"), ControlId::new("old")).is_none());
        let stale = store.register_control(id("a"), ControlId::new("new"));
        assert_eq!(stale, Some(ControlId::new("old")));
        assert_eq!(store.control(&id("a")), Some(&ControlId::new("new")));
    }

    // =========================================================================
    // Scenario
    // =========================================================================

    #[test]
    fn test_two_product_scenario() {
        let mut store = store();

        store.add_item(&id("a")).unwrap();
        assert_totals(&store, 1, 10);

        store.add_item(&id("b")).unwrap();
        assert_totals(&store, 2, 15);

        assert_eq!(store.increment_amount(&id("a")).unwrap(), 2);
        assert_totals(&store, 3, 25);

        assert_eq!(
            store.decrement_amount(&id("b")).unwrap(),
            AmountChange::Removed(None)
        );
        assert_eq!(store.cart().ids(), vec![id("a")]);
        assert_totals(&store, 2, 20);

        store.clear().unwrap();
        assert!(store.cart().is_empty());
        assert_totals(&store, 0, 0);
    }

    #[test]
    fn test_totals_match_lines_after_every_step() {
        let mut store = store();
        let check = |store: &CartStore<MemoryStorage>| {
            let count: u64 = store
                .cart()
                .lines()
                .iter()
                .map(|line| u64::from(line.amount))
                .sum();
            let total: Decimal = store.cart().lines().iter().map(CartLine::subtotal).sum();
            assert_eq!(store.totals().item_count, count);
            assert_eq!(store.totals().total, total);
        };

        store.add_item(&id("a")).unwrap();
        check(&store);
        store.increment_amount(&id("a")).unwrap();
        check(&store);
        store.add_item(&id("b")).unwrap();
        check(&store);
        store.decrement_amount(&id("a")).unwrap();
        check(&store);
        store.remove_item(&id("a")).unwrap();
        check(&store);
    }

    #[test]
    fn test_every_mutation_leaves_breadcrumb() {
        let events = sentry::test::with_captured_events(|| {
            let mut store = store();
            store.add_item(&id("a")).unwrap();
            store.increment_amount(&id("a")).unwrap();
            store.decrement_amount(&id("a")).unwrap();
            store.remove_item(&id("a")).unwrap();
            store.clear().unwrap();
            sentry::capture_message("cart trail", sentry::Level::Info);
        });

        let trail: Vec<&str> = events[0]
            .breadcrumbs
            .values
            .iter()
            .filter(|crumb| crumb.category.as_deref() == Some("cart"))
            .filter_map(|crumb| crumb.message.as_deref())
            .collect();
        assert_eq!(
            trail,
            vec![
                "Added item",
                "Increased amount",
                "Decreased amount",
                "Removed item",
                "Cleared cart"
            ]
        );
    }

    // =========================================================================
    // Operation sequences
    // =========================================================================

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Add(&'static str),
        Increment(&'static str),
        Decrement(&'static str),
        Remove(&'static str),
        Clear,
    }

    const OPS: [Op; 9] = [
        Op::Add("a"),
        Op::Add("b"),
        Op::Increment("a"),
        Op::Increment("b"),
        Op::Decrement("a"),
        Op::Decrement("b"),
        Op::Remove("a"),
        Op::Remove("b"),
        Op::Clear,
    ];

    /// Apply `op` to both the store and a plain `(id, amount)` model.
    ///
    /// Returns whether the store accepted the operation and whether the
    /// model expected it to.
    fn apply(
        store: &mut CartStore<MemoryStorage>,
        model: &mut Vec<(ProductId, u32)>,
        op: Op,
    ) -> (bool, bool) {
        let position = |model: &Vec<(ProductId, u32)>, raw: &str| {
            model.iter().position(|(line_id, _)| line_id.as_str() == raw)
        };

        match op {
            Op::Add(raw) => {
                let expected = position(model, raw).is_none();
                if expected {
                    model.push((id(raw), 1));
                }
                (store.add_item(&id(raw)).is_ok(), expected)
            }
            Op::Increment(raw) => {
                let found = position(model, raw);
                if let Some(index) = found {
                    model[index].1 += 1;
                }
                (store.increment_amount(&id(raw)).is_ok(), found.is_some())
            }
            Op::Decrement(raw) => {
                let found = position(model, raw);
                if let Some(index) = found {
                    if model[index].1 == 1 {
                        model.remove(index);
                    } else {
                        model[index].1 -= 1;
                    }
                }
                (store.decrement_amount(&id(raw)).is_ok(), found.is_some())
            }
            Op::Remove(raw) => {
                if let Some(index) = position(model, raw) {
                    model.remove(index);
                }
                (store.remove_item(&id(raw)).is_ok(), true)
            }
            Op::Clear => {
                model.clear();
                (store.clear().is_ok(), true)
            }
        }
    }

    fn assert_consistent(store: &CartStore<MemoryStorage>, model: &[(ProductId, u32)]) {
        let lines: Vec<(ProductId, u32)> = store
            .cart()
            .lines()
            .iter()
            .map(|line| (line.id().clone(), line.amount))
            .collect();
        assert_eq!(lines, model);
        assert!(lines.iter().all(|(_, amount)| *amount >= 1));

        let count: u64 = lines.iter().map(|(_, amount)| u64::from(*amount)).sum();
        let total: Decimal = store.cart().lines().iter().map(CartLine::subtotal).sum();
        assert_eq!(store.totals().item_count, count);
        assert_eq!(store.totals().total, total);
        assert_eq!(persisted(store), *store.cart());
    }

    #[test]
    fn test_every_operation_sequence_keeps_totals_consistent() {
        const DEPTH: u32 = 4;

        for seed in 0..OPS.len().pow(DEPTH) {
            let mut store = store();
            let mut model = Vec::new();
            let mut rest = seed;

            for _ in 0..DEPTH {
                let op = OPS[rest % OPS.len()];
                rest /= OPS.len();

                let (accepted, expected) = apply(&mut store, &mut model, op);
                assert_eq!(accepted, expected, "sequence {seed}, op {op:?}");
                assert_consistent(&store, &model);
            }
        }
    }

    // =========================================================================
    // Storage failures
    // =========================================================================

    /// Memory storage whose cart writes fail while `fail_cart_writes` is set.
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_cart_writes: Rc<Cell<bool>>,
    }

    impl Storage for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == CART_KEY && self.fail_cart_writes.get() {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    source: std::io::Error::other("disk full"),
                });
            }
            self.inner.set(key, value)
        }
    }

    fn flaky_store() -> (CartStore<FlakyStorage>, Rc<Cell<bool>>) {
        let fail = Rc::new(Cell::new(false));
        let mut store = CartStore::new(FlakyStorage {
            inner: MemoryStorage::new(),
            fail_cart_writes: Rc::clone(&fail),
        });
        store
            .save_catalog(&[product("a", 10), product("b", 5)])
            .unwrap();
        store.restore().unwrap();
        store.add_item(&id("a")).unwrap();
        store.increment_amount(&id("a")).unwrap();
        (store, fail)
    }

    fn stored_cart(store: &CartStore<FlakyStorage>) -> Option<Cart> {
        storage::load_json(store.storage(), CART_KEY).unwrap()
    }

    #[test]
    fn test_failed_write_leaves_cart_unchanged() {
        type Mutation = fn(&mut CartStore<FlakyStorage>) -> Result<(), CartError>;
        let mutations: [(&str, Mutation); 5] = [
            ("add", |s| s.add_item(&id("b")).map(|_| ())),
            ("increment", |s| s.increment_amount(&id("a")).map(|_| ())),
            ("decrement", |s| s.decrement_amount(&id("a")).map(|_| ())),
            ("remove", |s| s.remove_item(&id("a")).map(|_| ())),
            ("clear", |s| s.clear().map(|_| ())),
        ];

        for (name, mutate) in mutations {
            let (mut store, fail) = flaky_store();
            let before = store.cart().clone();
            fail.set(true);

            let err = mutate(&mut store).unwrap_err();
            assert!(
                matches!(err, CartError::Storage(StorageError::Io { .. })),
                "{name}: {err}"
            );
            assert_eq!(store.cart(), &before, "{name}");
            assert_eq!(stored_cart(&store).as_ref(), Some(&before), "{name}");
        }
    }

    #[test]
    fn test_failed_decrement_from_one_keeps_line() {
        let (mut store, fail) = flaky_store();
        store.decrement_amount(&id("a")).unwrap();
        fail.set(true);

        assert!(store.decrement_amount(&id("a")).is_err());
        assert_eq!(store.cart().line(&id("a")).unwrap().amount, 1);
        assert_eq!(stored_cart(&store).as_ref(), Some(store.cart()));
    }

    #[test]
    fn test_add_succeeds_after_failed_write() {
        let (mut store, fail) = flaky_store();
        fail.set(true);
        assert!(store.add_item(&id("b")).is_err());
        assert!(!store.cart().contains(&id("b")));

        fail.set(false);
        assert_eq!(store.add_item(&id("b")).unwrap().amount, 1);
        assert_eq!(stored_cart(&store).as_ref(), Some(store.cart()));
    }

    // =========================================================================
    // Amount bounds
    // =========================================================================

    #[test]
    fn test_increment_at_max_amount_is_rejected() {
        let mut store = store();
        let full = Cart::from(vec![CartLine {
            product: product("a", 10),
            amount: u32::MAX,
        }]);
        storage::save_json(&mut store.storage, CART_KEY, &full).unwrap();
        store.restore().unwrap();

        let err = store.increment_amount(&id("a")).unwrap_err();
        assert!(matches!(err, CartError::AmountOverflow(_)));
        assert_eq!(store.cart().line(&id("a")).unwrap().amount, u32::MAX);
        assert_eq!(persisted(&store), full);

        assert_eq!(
            store.decrement_amount(&id("a")).unwrap(),
            AmountChange::Updated(u32::MAX - 1)
        );
    }

    #[test]
    fn test_restore_rejects_zero_amount() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                CART_KEY,
                r#"[{"id":"a","title":"Sofa","price":"10","image":"a.png","amount":0}]"#,
            )
            .unwrap();
        let mut store = CartStore::new(storage);
        assert!(matches!(
            store.restore().unwrap_err(),
            CartError::Storage(StorageError::Corrupt { .. })
        ));
        assert!(store.cart().is_empty());
    }
}
