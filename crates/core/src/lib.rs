//! Heirloom Core - Shared types and cart state.
//!
//! This crate provides the domain pieces used across all Heirloom components:
//! - `storefront` - Public-facing vintage-luxury shop
//! - `cli` - Command-line tools for inspecting persisted carts
//!
//! # Architecture
//!
//! The core crate contains types, the cart store and pure checkout arithmetic.
//! It does no network I/O; persistence is reached through the
//! [`cart::KeyValueStore`] trait so it can be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, products and emails
//! - [`cart`] - The observable, persisted cart store
//! - [`checkout`] - Order summary (shipping, tax, promo codes)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use types::*;
