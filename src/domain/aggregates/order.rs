//! Order Aggregate

use serde::{Deserialize, Serialize};
use crate::domain::aggregates::cart::CartLineItem;
use crate::domain::value_objects::Money;

/// Snapshot of a cart at the moment checkout committed it. Serialized as the
/// bare item array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order(Vec<CartLineItem>);

impl Order {
    pub fn items(&self) -> &[CartLineItem] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn total(&self) -> Money { self.0.iter().map(CartLineItem::price).sum() }
}

impl From<Vec<CartLineItem>> for Order {
    fn from(items: Vec<CartLineItem>) -> Self { Self(items) }
}
