//! Domain events
use crate::domain::value_objects::Money;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub enum DomainEvent {
    Cart(CartEvent),
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartEvent {
    ItemAdded { product_id: String, price: Money },
    ItemsRemoved { product_id: String, count: usize },
    Cleared { discarded: usize },
    OrderPlaced { order_index: usize, total: Money, placed_at: DateTime<Utc> },
}
