//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::{CartRegistry, CheckoutService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the catalog and open carts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    carts: CartRegistry,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Product catalog
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let carts = CartRegistry::new(config.data_dir.clone(), config.cart_idle_timeout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                carts,
                checkout: CheckoutService::default(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the open-cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
