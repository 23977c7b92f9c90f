//! CLI subcommand implementations.

pub mod carts;
pub mod catalog;

use heirloom_core::cart::StorageError;
use heirloom_core::{ProductError, UnknownCategory};
use heirloom_storefront::config::ConfigError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cart storage could not be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The built-in catalog is invalid.
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] ProductError),

    /// Unknown category filter.
    #[error(transparent)]
    Category(#[from] UnknownCategory),

    /// No cart is persisted under this ID.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}
