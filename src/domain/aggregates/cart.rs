//! Cart Aggregate
//!
//! The active cart plus the history of committed carts. Every mutation ends
//! with an explicit save through the injected [`CartPersistence`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use chrono::Utc;
use crate::domain::aggregates::order::Order;
use crate::domain::aggregates::product::{Product, Variant};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::Money;
use crate::persistence::{self, CartPersistence, STORAGE_KEY};
use crate::{PosError, Result};

/// Denormalized snapshot of a chosen variant at add-to-cart time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    #[serde(rename = "id")]
    pub product_id: String,
    pub name: String,
    pub storage: String,
    pub color: String,
    pub purchase_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
}

impl CartLineItem {
    pub fn from_variant(product: &Product, variant: &Variant) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            storage: variant.storage.clone(),
            color: variant.color.clone(),
            purchase_type: variant.set_type.clone(),
            price: variant.price,
            image: product.image.clone(),
        }
    }

    /// Identity used for removal: price and image are ignored.
    pub fn same_configuration(&self, other: &CartLineItem) -> bool {
        self.product_id == other.product_id
            && self.storage == other.storage
            && self.color == other.color
            && self.purchase_type == other.purchase_type
    }

    pub fn price(&self) -> Money { Money::new(self.price) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

impl CartState {
    pub fn total(&self) -> Money { self.items.iter().map(CartLineItem::price).sum() }
}

/// Read-only diagnostic hook, handed the full state after every mutation.
pub trait StoreInspector: Send + Sync {
    fn inspect(&self, state: &CartState);
}

/// Dumps the state as JSON at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingInspector;

impl StoreInspector for TracingInspector {
    fn inspect(&self, state: &CartState) {
        match serde_json::to_string(state) {
            Ok(json) => debug!(key = STORAGE_KEY, state = %json, "cart state"),
            Err(e) => debug!(error = %e, "cart state not serializable"),
        }
    }
}

pub struct CartStore {
    state: CartState,
    persistence: Box<dyn CartPersistence>,
    inspector: Option<Box<dyn StoreInspector>>,
    events: Vec<DomainEvent>,
}

impl CartStore {
    /// Restore from `persistence`, or start empty when nothing usable is stored.
    pub fn open(persistence: impl CartPersistence + 'static) -> Self {
        let state = persistence::restore(&persistence);
        info!(items = state.items.len(), orders = state.orders.len(), "cart restored");
        Self { state, persistence: Box::new(persistence), inspector: None, events: vec![] }
    }

    pub fn with_inspector(mut self, inspector: impl StoreInspector + 'static) -> Self {
        inspector.inspect(&self.state);
        self.inspector = Some(Box::new(inspector));
        self
    }

    pub fn state(&self) -> &CartState { &self.state }
    pub fn items(&self) -> &[CartLineItem] { &self.state.items }
    pub fn orders(&self) -> &[Order] { &self.state.orders }
    pub fn total(&self) -> Money { self.state.total() }
    pub fn item_count(&self) -> usize { self.state.items.len() }
    pub fn is_empty(&self) -> bool { self.state.items.is_empty() }

    pub fn add_to_cart(&mut self, item: CartLineItem) {
        debug!(product_id = %item.product_id, storage = %item.storage, color = %item.color, "add to cart");
        self.raise_event(CartEvent::ItemAdded { product_id: item.product_id.clone(), price: item.price() });
        self.state.items.push(item);
        self.commit();
    }

    /// Remove every item with the same configuration as `target`. Returns the
    /// number of items removed; zero leaves the cart untouched.
    pub fn remove_from_cart(&mut self, target: &CartLineItem) -> usize {
        let before = self.state.items.len();
        self.state.items.retain(|item| !item.same_configuration(target));
        let count = before - self.state.items.len();
        if count > 0 {
            debug!(product_id = %target.product_id, count, "removed from cart");
            self.raise_event(CartEvent::ItemsRemoved { product_id: target.product_id.clone(), count });
            self.commit();
        }
        count
    }

    /// Discard the active cart without recording an order.
    pub fn clear_cart(&mut self) {
        let discarded = std::mem::take(&mut self.state.items).len();
        self.raise_event(CartEvent::Cleared { discarded });
        self.commit();
    }

    /// Move the active cart into order history in one step.
    ///
    /// An empty cart is refused with [`PosError::EmptyCart`] and nothing is
    /// recorded.
    pub fn place_order(&mut self) -> Result<Order> {
        if self.state.items.is_empty() {
            warn!("place order requested on an empty cart");
            return Err(PosError::EmptyCart);
        }
        let order = Order::from(std::mem::take(&mut self.state.items));
        self.state.orders.push(order.clone());
        let order_index = self.state.orders.len() - 1;
        let total = order.total();
        info!(order_index, items = order.len(), total = %total, "order placed");
        self.raise_event(CartEvent::OrderPlaced { order_index, total, placed_at: Utc::now() });
        self.commit();
        Ok(order)
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) { self.events.push(DomainEvent::Cart(e)); }

    fn commit(&mut self) {
        if let Err(e) = self.persistence.save(&self.state) {
            warn!(error = %e, key = STORAGE_KEY, "failed to persist cart state");
        }
        if let Some(inspector) = &self.inspector {
            inspector.inspect(&self.state);
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").field("state", &self.state).field("pending_events", &self.events.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryPersistence;
    use std::sync::{Arc, Mutex};

    fn item(id: &str, storage: &str, price: i64) -> CartLineItem {
        CartLineItem {
            product_id: id.into(),
            name: format!("Phone {id}"),
            storage: storage.into(),
            color: "Black".into(),
            purchase_type: "Phone Only".into(),
            price: Decimal::new(price, 0),
            image: "/mockup/duck.png".into(),
        }
    }

    #[test]
    fn test_add_appends_without_dedup() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("A", "128GB", 100));
        cart.add_to_cart(item("A", "128GB", 100));
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total().amount(), Decimal::new(200, 0));
    }

    #[test]
    fn test_remove_takes_every_matching_configuration() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("A", "128GB", 100));
        cart.add_to_cart(item("B", "128GB", 200));
        // same configuration, repriced between the two adds
        cart.add_to_cart(item("A", "128GB", 150));
        cart.add_to_cart(item("A", "256GB", 300));

        assert_eq!(cart.remove_from_cart(&item("A", "128GB", 999)), 2);
        assert_eq!(cart.items(), &[item("B", "128GB", 200), item("A", "256GB", 300)]);
    }

    #[test]
    fn test_add_then_remove_restores_length() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("B", "128GB", 200));
        let before = cart.item_count();
        cart.add_to_cart(item("A", "128GB", 100));
        cart.remove_from_cart(&item("A", "128GB", 100));
        assert_eq!(cart.item_count(), before);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("A", "128GB", 100));
        let before = cart.items().to_vec();
        cart.take_events();
        assert_eq!(cart.remove_from_cart(&item("Z", "128GB", 100)), 0);
        assert_eq!(cart.items(), before.as_slice());
        assert!(cart.take_events().is_empty());
    }

    #[test]
    fn test_clear_discards_without_recording() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("A", "128GB", 100));
        cart.clear_cart();
        cart.clear_cart();
        assert!(cart.is_empty());
        assert!(cart.orders().is_empty());
    }

    #[test]
    fn test_place_order_moves_items_into_history() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("A", "128GB", 100));
        cart.add_to_cart(item("B", "128GB", 200));
        cart.remove_from_cart(&item("A", "128GB", 100));
        let before = cart.items().to_vec();

        let order = cart.place_order().unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.orders().len(), 1);
        assert_eq!(cart.orders()[0].items(), before.as_slice());
        assert_eq!(order.total().amount(), Decimal::new(200, 0));
    }

    #[test]
    fn test_place_order_refuses_empty_cart() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        assert!(matches!(cart.place_order(), Err(PosError::EmptyCart)));
        assert!(cart.orders().is_empty());
    }

    #[test]
    fn test_order_history_only_grows() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("A", "128GB", 100));
        cart.place_order().unwrap();
        let first = cart.orders()[0].clone();
        cart.add_to_cart(item("B", "256GB", 200));
        cart.clear_cart();
        cart.add_to_cart(item("C", "512GB", 300));
        cart.place_order().unwrap();
        assert_eq!(cart.orders().len(), 2);
        assert_eq!(cart.orders()[0], first);
    }

    #[test]
    fn test_mutations_are_persisted() {
        let storage = MemoryPersistence::new();
        let mut cart = CartStore::open(storage.clone());
        cart.add_to_cart(item("A", "128GB", 100));
        cart.place_order().unwrap();
        cart.add_to_cart(item("B", "128GB", 200));

        let reopened = CartStore::open(storage);
        assert_eq!(reopened.state(), cart.state());
    }

    #[test]
    fn test_events_are_raised() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(item("A", "128GB", 100));
        cart.place_order().unwrap();
        let events = cart.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], DomainEvent::Cart(CartEvent::OrderPlaced { order_index: 0, .. })));
        assert!(cart.take_events().is_empty());
    }

    struct Recorder(Arc<Mutex<Vec<usize>>>);
    impl StoreInspector for Recorder {
        fn inspect(&self, state: &CartState) { self.0.lock().unwrap().push(state.items.len()); }
    }

    #[test]
    fn test_inspector_sees_every_mutation() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut cart = CartStore::open(MemoryPersistence::new()).with_inspector(Recorder(seen.clone()));
        cart.add_to_cart(item("A", "128GB", 100));
        cart.add_to_cart(item("B", "128GB", 200));
        cart.clear_cart();
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_line_item_wire_names() {
        let json = serde_json::to_value(item("A", "128GB", 100)).unwrap();
        assert_eq!(json["id"], "A");
        assert_eq!(json["purchaseType"], "Phone Only");
        assert_eq!(json["price"], 100.0);
    }
}
