//! Storefront domain: catalog resolution, cart and order history
pub mod aggregates;
pub mod events;
pub mod value_objects;
