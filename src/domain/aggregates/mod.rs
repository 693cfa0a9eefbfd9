//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{
    default_selection, distinct_axis_values, resolve_variant, Product, ProductDraft, ProductUpdate, ProductView,
    Selection, Variant,
};
pub use order::Order;
pub use cart::{CartLineItem, CartState, CartStore, StoreInspector, TracingInspector};
