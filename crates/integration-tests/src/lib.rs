//! Integration test harness for Heirloom.
//!
//! [`TestApp`] owns a storefront router backed by a temporary data
//! directory. [`TestClient`]s send requests through it in-process and keep
//! the session cookie like a browser, so each client has its own cart.
//!
//! ```rust,ignore
//! let app = TestApp::new();
//! let mut client = app.client();
//! let resp = client.post("/cart/add", &[("product_id", "1")]).await;
//! assert_eq!(resp.status, StatusCode::OK);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::{Path, PathBuf};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use heirloom_storefront::catalog::Catalog;
use heirloom_storefront::config::StorefrontConfig;
use heirloom_storefront::state::AppState;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// A storefront over a throwaway cart directory.
pub struct TestApp {
    router: Router,
    data_dir: PathBuf,
    _temp: TempDir,
}

impl TestApp {
    /// Build a storefront with the seeded catalog.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let data_dir = temp.path().join("carts");
        Self {
            router: build_router(&data_dir),
            data_dir,
            _temp: temp,
        }
    }

    /// Rebuild the router over the same data directory, as after a
    /// restart. In-memory sessions and open carts are lost.
    #[must_use]
    pub fn restart(self) -> Self {
        Self {
            router: build_router(&self.data_dir),
            ..self
        }
    }

    /// Directory holding persisted carts.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// A new client with no session.
    #[must_use]
    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::expect_used)]
fn build_router(data_dir: &Path) -> Router {
    let config = StorefrontConfig {
        data_dir: data_dir.to_path_buf(),
        ..StorefrontConfig::default()
    };
    let catalog = Catalog::seeded().expect("Seed catalog is valid");
    heirloom_storefront::app(AppState::new(config, catalog))
}

/// A browser-like client holding one session cookie.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
}

impl TestClient {
    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri);
        self.send(request, Body::empty()).await
    }

    /// Send a form-encoded POST request. Values are sent as-is, so keep
    /// them free of `&`, `=`, `+` and `%`.
    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = form
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(request, Body::from(body)).await
    }

    #[allow(clippy::expect_used)]
    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = request.body(body).expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE)
            && let Ok(value) = set_cookie.to_str()
            && let Some(pair) = value.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        }
    }
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("Response body is not JSON")
    }

    /// Value of a response header, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}
