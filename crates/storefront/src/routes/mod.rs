//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing (?category=bags)
//! GET  /products/:id           - Product detail
//!
//! # Cart (mutations send HX-Trigger: cart-updated)
//! GET  /cart                   - Cart contents
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Set quantity (below 1 removes)
//! POST /cart/remove            - Remove item
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge
//! GET  /cart/summary           - Order summary (?promo_code=)
//! POST /cart/promo             - Validate a promo code
//!
//! # Checkout
//! POST /checkout               - Pay and place the order
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/summary", get(cart::summary))
        .route("/promo", post(cart::promo))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::catalog::Catalog;
    use crate::config::StorefrontConfig;
    use crate::state::AppState;

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            data_dir: dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        };
        let app = crate::app(AppState::new(config, Catalog::seeded().unwrap()));

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"ok");
    }
}
