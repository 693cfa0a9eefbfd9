//! Product Aggregate
//!
//! Variant resolution for the product detail view: the selectable options on
//! each axis and the single variant a full selection resolves to.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::{Validate, ValidationError};
use crate::domain::aggregates::cart::CartLineItem;
use crate::domain::value_objects::{Axis, Money, StorageCapacity};
use crate::Result;

/// One purchasable configuration of a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Variant {
    #[validate(length(min = 1, message = "storage is required"))]
    pub storage: String,
    #[validate(length(min = 1, message = "color is required"))]
    pub color: String,
    #[serde(rename = "setType")]
    #[validate(length(min = 1, message = "set type is required"))]
    pub set_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom = "positive_price")]
    pub price: Decimal,
}

fn positive_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    if price.is_sign_positive() && !price.is_zero() { Ok(()) } else { Err(ValidationError::new("price_must_be_positive")) }
}

impl Variant {
    pub fn new(storage: impl Into<String>, color: impl Into<String>, set_type: impl Into<String>, price: Decimal) -> Self {
        Self { storage: storage.into(), color: color.into(), set_type: set_type.into(), price }
    }

    pub fn axis(&self, axis: Axis) -> &str {
        match axis {
            Axis::Storage => &self.storage,
            Axis::Color => &self.color,
            Axis::SetType => &self.set_type,
        }
    }

    /// Exact, case-sensitive match on all three axes. An axis left unset in
    /// the selection never matches.
    pub fn matches(&self, selection: &Selection) -> bool {
        Axis::ALL.iter().all(|&axis| selection.get(axis) == Some(self.axis(axis)))
    }

    pub fn price(&self) -> Money { Money::new(self.price) }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(rename = "desc", alias = "description", default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// A tentative choice on each axis; any subset may be unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub storage: Option<String>,
    pub color: Option<String>,
    #[serde(rename = "setType")]
    pub set_type: Option<String>,
}

impl Selection {
    pub fn full(storage: impl Into<String>, color: impl Into<String>, set_type: impl Into<String>) -> Self {
        Self { storage: Some(storage.into()), color: Some(color.into()), set_type: Some(set_type.into()) }
    }

    pub fn of(variant: &Variant) -> Self {
        Self::full(&variant.storage, &variant.color, &variant.set_type)
    }

    pub fn get(&self, axis: Axis) -> Option<&str> {
        match axis {
            Axis::Storage => self.storage.as_deref(),
            Axis::Color => self.color.as_deref(),
            Axis::SetType => self.set_type.as_deref(),
        }
    }

    pub fn set(&mut self, axis: Axis, value: Option<String>) {
        match axis {
            Axis::Storage => self.storage = value,
            Axis::Color => self.color = value,
            Axis::SetType => self.set_type = value,
        }
    }

    pub fn with(mut self, axis: Axis, value: impl Into<String>) -> Self {
        self.set(axis, Some(value.into()));
        self
    }

    pub fn is_complete(&self) -> bool {
        Axis::ALL.iter().all(|&axis| self.get(axis).is_some())
    }

    /// Fill every unset axis from `fallback`.
    pub fn or(mut self, fallback: &Selection) -> Self {
        for axis in Axis::ALL {
            if self.get(axis).is_none() {
                self.set(axis, fallback.get(axis).map(str::to_owned));
            }
        }
        self
    }
}

/// Distinct values present on `axis`. Storage is ordered by capacity, color
/// and set type lexicographically.
pub fn distinct_axis_values(variants: &[Variant], axis: Axis) -> Vec<String> {
    let distinct: BTreeSet<&str> = variants.iter().map(|v| v.axis(axis)).collect();
    let mut values: Vec<String> = distinct.into_iter().map(str::to_owned).collect();
    if axis == Axis::Storage {
        values.sort_by(|a, b| StorageCapacity::compare_labels(a, b));
    }
    values
}

/// First variant matching the selection exactly, if any.
pub fn resolve_variant<'a>(variants: &'a [Variant], selection: &Selection) -> Option<&'a Variant> {
    variants.iter().find(|v| v.matches(selection))
}

/// Selection a freshly loaded product starts with: the first variant's triple.
pub fn default_selection(variants: &[Variant]) -> Selection {
    variants.first().map(Selection::of).unwrap_or_default()
}

/// State behind the product detail page.
#[derive(Clone, Debug)]
pub struct ProductView {
    product: Product,
    selection: Selection,
}

impl ProductView {
    pub fn new(product: Product) -> Self {
        let selection = default_selection(&product.variants);
        Self { product, selection }
    }

    /// Open the view with a partial selection; unset axes keep their defaults.
    pub fn with_selection(product: Product, selection: Selection) -> Self {
        let selection = selection.or(&default_selection(&product.variants));
        Self { product, selection }
    }

    pub fn product(&self) -> &Product { &self.product }
    pub fn selection(&self) -> &Selection { &self.selection }
    pub fn options(&self, axis: Axis) -> Vec<String> { distinct_axis_values(&self.product.variants, axis) }

    pub fn select(&mut self, axis: Axis, value: impl Into<String>) {
        self.selection.set(axis, Some(value.into()));
    }

    pub fn resolved(&self) -> Option<&Variant> { resolve_variant(&self.product.variants, &self.selection) }
    pub fn price(&self) -> Option<Money> { self.resolved().map(Variant::price) }
    pub fn can_add_to_cart(&self) -> bool { self.resolved().is_some() }

    /// Snapshot of the resolved variant, ready for the cart. `None` keeps the
    /// add-to-cart action disabled.
    pub fn line_item(&self) -> Option<CartLineItem> {
        self.resolved().map(|variant| CartLineItem::from_variant(&self.product, variant))
    }
}

/// Admin form payload for a new product.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, message = "product name is required"))]
    pub name: String,
    #[serde(rename = "desc", alias = "description")]
    #[validate(length(min = 1, message = "product description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "product image is required"))]
    pub image: String,
    #[validate(length(min = 1, message = "at least one variant is required"))]
    pub variants: Vec<Variant>,
}

impl ProductDraft {
    /// Validate the draft and every variant in it.
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        for variant in &self.variants {
            variant.validate()?;
        }
        Ok(())
    }
}

/// Admin edit payload: the edit screen only touches name and variants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub variants: Vec<Variant>,
}
