//! Mini POS storefront
//!
//! Product catalog browsing, a persisted shopping cart and a simulated
//! checkout flow.
//!
//! ## Features
//! - Variant resolution by storage, color and set type
//! - Cart with order history, saved after every change
//! - Simulated payment transition guarded per checkout view
//! - Admin product and variant maintenance

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod domain;
pub mod http;
pub mod persistence;

use thiserror::Error;

pub use catalog::{CatalogProvider, InMemoryCatalog};
pub use checkout::{CheckoutActivation, CheckoutNotice, CheckoutOutcome, PaymentLatch, PaymentSignal};
pub use config::{Config, ConfigError};
pub use domain::aggregates::{
    CartLineItem, CartState, CartStore, Order, Product, ProductDraft, ProductUpdate, ProductView, Selection,
    StoreInspector, TracingInspector, Variant,
};
pub use domain::value_objects::{Axis, Money};
pub use persistence::{CartPersistence, FilePersistence, MemoryPersistence, STORAGE_KEY};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum PosError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Variant {index} not found on product {product_id}")]
    VariantNotFound { product_id: String, index: usize },

    #[error("No variant matches the current selection")]
    NoMatchingVariant,

    #[error("No items in cart to place order")]
    EmptyCart,

    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] validator::ValidationErrors),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PosError>;
