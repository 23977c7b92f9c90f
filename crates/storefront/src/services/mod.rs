//! Business logic services.
//!
//! - [`carts`] - Per-session cart registry with idle eviction
//! - [`checkout`] - Order summary, mock payment and cart clearing

pub mod carts;
pub mod checkout;

pub use carts::{CartRegistry, SharedCart};
pub use checkout::{CheckoutError, CheckoutService, OrderConfirmation, PaymentGateway};
