//! Catalog provider
//!
//! Read side used by the storefront and the admin product screens. The
//! bundled [`InMemoryCatalog`] can be seeded from a JSON file of products.

use std::fs;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};
use uuid::Uuid;
use crate::domain::aggregates::{Product, ProductDraft, ProductUpdate};
use crate::{PosError, Result};

pub trait CatalogProvider: Send + Sync {
    fn list_products(&self) -> Result<Vec<Product>>;
    fn get_product(&self, id: &str) -> Result<Product>;
    fn create_product(&self, draft: ProductDraft) -> Result<Product>;
    fn update_product(&self, id: &str, update: ProductUpdate) -> Result<Product>;
    fn delete_product(&self, id: &str) -> Result<()>;
    /// Drop the variant at `index`, keeping the order of the rest.
    fn delete_variant(&self, product_id: &str, index: usize) -> Result<Product>;
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<Vec<Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self { Self::default() }

    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let products: Vec<Product> = serde_json::from_str(&fs::read_to_string(path)?)?;
        info!(path = %path.display(), products = products.len(), "catalog seeded");
        Ok(Self::from_products(products))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Product>>> {
        self.products.read().map_err(|_| PosError::StorageError("catalog lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Product>>> {
        self.products.write().map_err(|_| PosError::StorageError("catalog lock poisoned".into()))
    }
}

fn find_mut<'a>(products: &'a mut [Product], id: &str) -> Result<&'a mut Product> {
    products.iter_mut().find(|p| p.id == id).ok_or_else(|| PosError::ProductNotFound(id.to_string()))
}

impl CatalogProvider for InMemoryCatalog {
    fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.read()?.clone())
    }

    fn get_product(&self, id: &str) -> Result<Product> {
        self.read()?.iter().find(|p| p.id == id).cloned().ok_or_else(|| PosError::ProductNotFound(id.to_string()))
    }

    fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        draft.check()?;
        let product = Product {
            id: Uuid::now_v7().to_string(),
            name: draft.name,
            description: draft.description,
            image: draft.image,
            variants: draft.variants,
        };
        self.write()?.push(product.clone());
        info!(product_id = %product.id, variants = product.variants.len(), "product created");
        Ok(product)
    }

    fn update_product(&self, id: &str, update: ProductUpdate) -> Result<Product> {
        let mut products = self.write()?;
        let product = find_mut(&mut products, id)?;
        product.name = update.name;
        product.variants = update.variants;
        info!(product_id = %id, "product updated");
        Ok(product.clone())
    }

    fn delete_product(&self, id: &str) -> Result<()> {
        let mut products = self.write()?;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(PosError::ProductNotFound(id.to_string()));
        }
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    fn delete_variant(&self, product_id: &str, index: usize) -> Result<Product> {
        let mut products = self.write()?;
        let product = find_mut(&mut products, product_id)?;
        if index >= product.variants.len() {
            warn!(product_id, index, "variant index out of range");
            return Err(PosError::VariantNotFound { product_id: product_id.to_string(), index });
        }
        product.variants.remove(index);
        Ok(product.clone())
    }
}
