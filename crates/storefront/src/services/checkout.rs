//! Checkout: order summary, payment and cart clearing.
//!
//! Payment is mocked. The gateway hands out payment intents for the order
//! total in cents and confirms them immediately; a real processor would slot
//! in behind [`PaymentGateway`] without touching the cart logic.

use chrono::Utc;
use heirloom_core::checkout::{OrderSummary, PromoCode};
use heirloom_core::{CurrencyCode, Email, OrderId, Price};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use super::carts::SharedCart;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// There is nothing to pay for.
    #[error("Cart is empty")]
    EmptyCart,

    /// The payment could not be taken.
    #[error("Payment failed: {0}")]
    Payment(#[from] PaymentError),
}

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The amount cannot be charged.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// A payment awaiting confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    /// Amount in the smallest currency unit (cents).
    pub amount: i64,
    pub currency: &'static str,
}

/// Mock payment gateway.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentGateway;

impl PaymentGateway {
    /// Create a payment intent for `amount`.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative or too large to express in
    /// cents.
    pub fn create_intent(&self, amount: Price) -> Result<PaymentIntent, PaymentError> {
        let cents = amount
            .to_minor_units()
            .filter(|cents| *cents >= 0)
            .ok_or_else(|| PaymentError::InvalidAmount(amount.display()))?;

        let mut rng = rand::rng();
        Ok(PaymentIntent {
            id: format!("pi_{}", random_base36(&mut rng, 9)),
            client_secret: format!("mock_client_secret_{}", random_base36(&mut rng, 9)),
            amount: cents,
            currency: amount.currency_code.processor_code(),
        })
    }

    /// Confirm a payment intent.
    ///
    /// # Errors
    ///
    /// The mock gateway always succeeds.
    #[allow(clippy::unnecessary_wraps, clippy::unused_self)]
    pub fn confirm(&self, intent: &PaymentIntent) -> Result<(), PaymentError> {
        info!(payment_intent = %intent.id, amount = intent.amount, "payment confirmed");
        Ok(())
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub email: Email,
    pub summary: OrderSummary,
    pub payment_intent_id: String,
    /// Amount charged in cents: the summary's grand total, not the subtotal.
    pub amount_cents: i64,
}

/// Turns a cart into an order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutService {
    gateway: PaymentGateway,
}

impl CheckoutService {
    /// Create a checkout service over a gateway.
    #[must_use]
    pub const fn new(gateway: PaymentGateway) -> Self {
        Self { gateway }
    }

    /// Pay for the cart and clear it.
    ///
    /// The cart stays locked from summary to clear, so the amount charged is
    /// exactly the amount of the lines that get cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or the payment fails. The cart
    /// is left untouched in both cases.
    #[instrument(skip(self, cart, email), fields(cart_id = %cart.id()))]
    pub fn checkout(
        &self,
        cart: &SharedCart,
        email: Email,
        promo_code: Option<PromoCode>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        cart.with(|store| {
            if store.state().is_empty() {
                return Err(CheckoutError::EmptyCart);
            }

            let summary = OrderSummary::new(store.state(), promo_code);
            let intent = self
                .gateway
                .create_intent(Price::new(summary.total, CurrencyCode::USD))?;
            self.gateway.confirm(&intent)?;

            let order_id = generate_order_id(Utc::now().timestamp_millis(), &mut rand::rng());
            store.clear_cart();
            info!(%order_id, total = %summary.total, "order placed");

            Ok(OrderConfirmation {
                order_id,
                email,
                summary,
                payment_intent_id: intent.id,
                amount_cents: intent.amount,
            })
        })
    }
}

/// Generate an order ID of the form `ORD-<base36 millis>-<6 base36 chars>`.
pub fn generate_order_id(timestamp_millis: i64, rng: &mut impl Rng) -> OrderId {
    let timestamp = to_base36(timestamp_millis.unsigned_abs());
    let suffix = random_base36(rng, 6).to_ascii_uppercase();
    OrderId::new(format!("ORD-{timestamp}-{suffix}"))
}

fn to_base36(mut value: u64) -> String {
    let mut digits = Vec::new();
    loop {
        #[allow(clippy::cast_possible_truncation)] // remainder is below 36
        let digit = (value % 36) as u32;
        digits.push(char::from_digit(digit, 36).unwrap_or('0'));
        value /= 36;
        if value == 0 {
            break;
        }
    }
    digits.iter().rev().collect()
}

fn random_base36(rng: &mut impl Rng, len: usize) -> String {
    (0..len)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect()
}
