//! Core types for Heirloom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, round_to_cents};
pub use product::{Category, CategoryFilter, Product, ProductError, UnknownCategory};
