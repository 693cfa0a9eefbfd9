//! Value Objects for the storefront

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;

/// Display label of the single currency the store trades in.
pub const CURRENCY_LABEL: &str = "RM";

/// Money value object
///
/// Single-currency amount. Serialized as a plain JSON number so persisted
/// carts stay readable by the storefront client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    pub fn new(amount: Decimal) -> Self { Self(amount) }
    pub fn zero() -> Self { Self(Decimal::ZERO) }
    pub fn amount(&self) -> Decimal { self.0 }
    pub fn is_zero(&self) -> bool { self.0.is_zero() }
    pub fn add(&self, other: &Money) -> Money { Money(self.0 + other.0) }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self { Self(amount) }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc.add(&m))
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc.add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", CURRENCY_LABEL, self.0.round_dp(2))
    }
}

/// One of the three independent dimensions a variant is selected on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    Storage,
    Color,
    SetType,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Storage, Axis::Color, Axis::SetType];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Color => "color",
            Self::SetType => "setType",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageUnit {
    Mb,
    Gb,
    Tb,
}

impl StorageUnit {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MB" | "M" => Some(Self::Mb),
            "" | "GB" | "G" => Some(Self::Gb),
            "TB" | "T" => Some(Self::Tb),
            _ => None,
        }
    }

    fn megabytes(&self) -> u64 {
        match self {
            Self::Mb => 1,
            Self::Gb => 1024,
            Self::Tb => 1024 * 1024,
        }
    }
}

/// Storage capacity parsed from a label such as `128GB`, `1.5TB` or `1TB`.
///
/// Comparison is on the unit-normalized size, so `1TB` orders after `512GB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StorageCapacity {
    value: Decimal,
    unit: StorageUnit,
}

impl StorageCapacity {
    /// Parse a leading number (integer or decimal, e.g. `1.5`) followed by an
    /// optional unit. Returns `None` when the label has no leading digits or
    /// an unknown unit.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        let whole = label.bytes().take_while(u8::is_ascii_digit).count();
        if whole == 0 { return None; }
        let mut end = whole;
        if label[whole..].starts_with('.') {
            let fraction = label[whole + 1..].bytes().take_while(u8::is_ascii_digit).count();
            if fraction > 0 { end = whole + 1 + fraction; }
        }
        let (number, rest) = label.split_at(end);
        let value = number.parse::<Decimal>().ok()?;
        let unit = StorageUnit::parse(rest)?;
        Some(Self { value, unit })
    }

    pub fn value(&self) -> Decimal { self.value }
    pub fn unit(&self) -> StorageUnit { self.unit }
    pub fn megabytes(&self) -> Decimal {
        self.value.checked_mul(Decimal::from(self.unit.megabytes())).unwrap_or(Decimal::MAX)
    }

    /// Order two storage labels by capacity. Unparseable labels sort after
    /// every parsed one, lexicographically among themselves.
    pub fn compare_labels(a: &str, b: &str) -> Ordering {
        match (Self::parse(a), Self::parse(b)) {
            (Some(x), Some(y)) => x.megabytes().cmp(&y.megabytes()).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(Decimal::new(4899, 0)).to_string(), "RM 4899.00");
        assert_eq!(Money::new(Decimal::new(1995, 1)).to_string(), "RM 199.50");
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [Money::new(Decimal::new(100, 0)), Money::new(Decimal::new(200, 0))].iter().sum();
        assert_eq!(total.amount(), Decimal::new(300, 0));
        assert!(std::iter::empty::<Money>().sum::<Money>().is_zero());
    }

    #[test]
    fn test_money_serializes_as_number() {
        let json = serde_json::to_string(&Money::new(Decimal::new(5299, 0))).unwrap();
        assert_eq!(json, "5299.0");
        let back: Money = serde_json::from_str("5299").unwrap();
        assert_eq!(back.amount(), Decimal::new(5299, 0));
    }

    #[test]
    fn test_storage_parse() {
        let cap = StorageCapacity::parse("256GB").unwrap();
        assert_eq!(cap.value(), Decimal::from(256));
        assert_eq!(cap.unit(), StorageUnit::Gb);
        assert_eq!(StorageCapacity::parse("1tb").unwrap().unit(), StorageUnit::Tb);
        assert_eq!(StorageCapacity::parse("64").unwrap().unit(), StorageUnit::Gb);
        assert!(StorageCapacity::parse("GB").is_none());
        assert!(StorageCapacity::parse("12 parsecs").is_none());
    }

    #[test]
    fn test_terabytes_sort_after_gigabytes() {
        let mut labels = vec!["1TB", "512GB", "128GB", "Unlimited", "64GB"];
        labels.sort_by(|a, b| StorageCapacity::compare_labels(a, b));
        assert_eq!(labels, vec!["64GB", "128GB", "512GB", "1TB", "Unlimited"]);
    }

    #[test]
    fn test_fractional_capacity_sorts_by_size() {
        let cap = StorageCapacity::parse("1.5TB").unwrap();
        assert_eq!(cap.value(), Decimal::new(15, 1));
        assert_eq!(cap.megabytes(), Decimal::from(1536 * 1024));

        let mut labels = vec!["1.5TB", "512GB", "2TB", "1TB"];
        labels.sort_by(|a, b| StorageCapacity::compare_labels(a, b));
        assert_eq!(labels, vec!["512GB", "1TB", "1.5TB", "2TB"]);
        assert!(StorageCapacity::parse("1.TB").is_none());
    }
}
