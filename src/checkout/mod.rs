//! Simulated payment transition
//!
//! The payment page sends the shopper back to checkout with a `payment`
//! query value of `success` or `failed`. Each checkout view activation owns a
//! [`CheckoutActivation`], which consumes that signal at most once.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};
use crate::domain::aggregates::{CartStore, Order};

/// Checkout URL with the payment signal stripped.
pub const CLEARED_CHECKOUT_URL: &str = "/checkout";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentSignal {
    Success,
    Failed,
}

impl PaymentSignal {
    /// Parse the raw query value; anything unrecognised counts as no signal.
    pub fn from_query(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.parse().ok())
    }
}

impl FromStr for PaymentSignal {
    type Err = UnknownSignal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownSignal(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment signal: {0}")]
pub struct UnknownSignal(pub String);

/// One-shot latch. The first [`fire`](Self::fire) returns `true`, every later
/// call returns `false`.
#[derive(Debug, Default)]
pub struct PaymentLatch {
    fired: bool,
}

impl PaymentLatch {
    pub fn new() -> Self { Self::default() }
    pub fn is_fired(&self) -> bool { self.fired }

    pub fn fire(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutNotice {
    OrderPlaced,
    EmptyCart,
    PaymentFailed,
}

impl CheckoutNotice {
    pub fn message(&self) -> &'static str {
        match self {
            Self::OrderPlaced => "Payment successful. Order placed!",
            Self::EmptyCart => "No items in cart to place order.",
            Self::PaymentFailed => "Payment failed.",
        }
    }

    pub fn is_warning(&self) -> bool { !matches!(self, Self::OrderPlaced) }
}

impl fmt::Display for CheckoutNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.message()) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub notice: Option<CheckoutNotice>,
    pub order: Option<Order>,
    /// Where the view should navigate next so a refresh cannot replay the signal.
    pub redirect: Option<&'static str>,
}

impl CheckoutOutcome {
    fn untouched() -> Self { Self::default() }

    fn consumed(notice: CheckoutNotice, order: Option<Order>) -> Self {
        Self { notice: Some(notice), order, redirect: Some(CLEARED_CHECKOUT_URL) }
    }
}

#[derive(Debug)]
pub struct CheckoutActivation {
    signal: Option<PaymentSignal>,
    latch: PaymentLatch,
}

impl CheckoutActivation {
    pub fn new(signal: Option<PaymentSignal>) -> Self {
        Self { signal, latch: PaymentLatch::new() }
    }

    /// Apply the payment signal to the cart. Only the first call per
    /// activation has any effect; re-renders get an untouched outcome.
    pub fn consume(&mut self, cart: &mut CartStore) -> CheckoutOutcome {
        if !self.latch.fire() {
            return CheckoutOutcome::untouched();
        }
        match self.signal {
            None => CheckoutOutcome::untouched(),
            Some(PaymentSignal::Success) => match cart.place_order() {
                Ok(order) => {
                    info!(items = order.len(), total = %order.total(), "payment succeeded");
                    CheckoutOutcome::consumed(CheckoutNotice::OrderPlaced, Some(order))
                }
                Err(e) => {
                    warn!(error = %e, "payment succeeded with nothing to order");
                    CheckoutOutcome::consumed(CheckoutNotice::EmptyCart, None)
                }
            },
            Some(PaymentSignal::Failed) => {
                warn!(items = cart.item_count(), "payment failed");
                CheckoutOutcome::consumed(CheckoutNotice::PaymentFailed, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::CartLineItem;
    use crate::persistence::MemoryPersistence;
    use rust_decimal::Decimal;

    fn cart_with_item() -> CartStore {
        let mut cart = CartStore::open(MemoryPersistence::new());
        cart.add_to_cart(CartLineItem {
            product_id: "3".into(),
            name: "Xiaomi 13T Pro".into(),
            storage: "512GB".into(),
            color: "Blue".into(),
            purchase_type: "Full Set".into(),
            price: Decimal::new(3999, 0),
            image: "xiaomi.png".into(),
        });
        cart
    }

    #[test]
    fn test_signal_parsing() {
        assert_eq!(PaymentSignal::from_query(Some("success")), Some(PaymentSignal::Success));
        assert_eq!(PaymentSignal::from_query(Some("failed")), Some(PaymentSignal::Failed));
        assert_eq!(PaymentSignal::from_query(Some("SUCCESS")), None);
        assert_eq!(PaymentSignal::from_query(None), None);
    }

    #[test]
    fn test_latch_fires_once() {
        let mut latch = PaymentLatch::new();
        assert!(latch.fire());
        assert!(latch.is_fired());
        assert!(!latch.fire());
    }

    #[test]
    fn test_success_places_order_once() {
        let mut cart = cart_with_item();
        let mut activation = CheckoutActivation::new(Some(PaymentSignal::Success));

        let outcome = activation.consume(&mut cart);
        assert_eq!(outcome.notice, Some(CheckoutNotice::OrderPlaced));
        assert_eq!(outcome.redirect, Some(CLEARED_CHECKOUT_URL));
        assert_eq!(outcome.order.map(|o| o.len()), Some(1));
        assert!(cart.is_empty());
        assert_eq!(cart.orders().len(), 1);

        // re-render of the same view
        cart.add_to_cart(cart_with_item().items()[0].clone());
        assert_eq!(activation.consume(&mut cart), CheckoutOutcome::default());
        assert_eq!(cart.orders().len(), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_success_on_empty_cart_warns() {
        let mut cart = CartStore::open(MemoryPersistence::new());
        let outcome = CheckoutActivation::new(Some(PaymentSignal::Success)).consume(&mut cart);
        assert_eq!(outcome.notice, Some(CheckoutNotice::EmptyCart));
        assert!(outcome.notice.unwrap().is_warning());
        assert!(cart.orders().is_empty());
    }

    #[test]
    fn test_failed_leaves_cart_untouched() {
        let mut cart = cart_with_item();
        let before = cart.state().clone();
        let outcome = CheckoutActivation::new(Some(PaymentSignal::Failed)).consume(&mut cart);
        assert_eq!(outcome.notice, Some(CheckoutNotice::PaymentFailed));
        assert_eq!(outcome.redirect, Some(CLEARED_CHECKOUT_URL));
        assert_eq!(cart.state(), &before);
    }

    #[test]
    fn test_no_signal_is_noop() {
        let mut cart = cart_with_item();
        let before = cart.state().clone();
        let outcome = CheckoutActivation::new(None).consume(&mut cart);
        assert_eq!(outcome, CheckoutOutcome::default());
        assert_eq!(cart.state(), &before);
    }

    #[test]
    fn test_new_activation_consumes_again() {
        let mut cart = cart_with_item();
        CheckoutActivation::new(Some(PaymentSignal::Success)).consume(&mut cart);
        cart.add_to_cart(cart_with_item().items()[0].clone());
        CheckoutActivation::new(Some(PaymentSignal::Success)).consume(&mut cart);
        assert_eq!(cart.orders().len(), 2);
    }
}
