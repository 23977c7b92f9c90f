//! Order summary arithmetic shared by the cart page and checkout.
//!
//! Shipping is a flat fee on any non-empty cart, tax is estimated at a fixed
//! rate on the discounted subtotal, and promo codes take a percentage off the
//! subtotal. Money is rounded to cents half away from zero.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartState;
use crate::types::round_to_cents;

/// Flat shipping fee for a non-empty cart.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(15, 0, 0, false, 0);

/// Estimated sales tax rate (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Error returned for unknown promo codes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid promo code")]
pub struct PromoCodeError;

/// A recognized promotional code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromoCode {
    /// 10% off the first order.
    #[serde(rename = "WELCOME10")]
    Welcome10,
}

impl PromoCode {
    /// Parse a code, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PromoCodeError`] if the code is not recognized.
    pub fn parse(code: &str) -> Result<Self, PromoCodeError> {
        let code = code.trim();
        if code.eq_ignore_ascii_case(Self::Welcome10.code()) {
            Ok(Self::Welcome10)
        } else {
            Err(PromoCodeError)
        }
    }

    /// Canonical (uppercase) form of the code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Welcome10 => "WELCOME10",
        }
    }

    /// Fraction of the subtotal taken off.
    #[must_use]
    pub const fn discount_rate(self) -> Decimal {
        match self {
            Self::Welcome10 => Decimal::from_parts(10, 0, 0, false, 2),
        }
    }
}

impl FromStr for PromoCode {
    type Err = PromoCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Totals for an order built from the current cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// Sum of line totals before discount.
    pub subtotal: Decimal,
    /// Amount taken off by the promo code.
    pub discount: Decimal,
    pub shipping: Decimal,
    /// Estimated tax on the discounted subtotal.
    pub tax: Decimal,
    /// What the customer pays.
    pub total: Decimal,
    /// Number of items (sum of quantities).
    pub item_count: u64,
    /// Number of distinct lines.
    pub line_count: usize,
    pub promo_code: Option<PromoCode>,
}

impl OrderSummary {
    /// Compute the summary for a cart.
    #[must_use]
    pub fn new(cart: &CartState, promo_code: Option<PromoCode>) -> Self {
        let subtotal = cart.total();
        let discount = promo_code.map_or(Decimal::ZERO, |promo| {
            round_to_cents(subtotal * promo.discount_rate())
        });
        let discounted = subtotal - discount;
        let shipping = if cart.is_empty() {
            Decimal::ZERO
        } else {
            FLAT_SHIPPING
        };
        let tax = round_to_cents(discounted * TAX_RATE);

        Self {
            subtotal,
            discount,
            shipping,
            tax,
            total: discounted + shipping + tax,
            item_count: cart.count(),
            line_count: cart.line_count(),
            promo_code,
        }
    }
}
