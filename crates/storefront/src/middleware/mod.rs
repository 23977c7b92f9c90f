//! HTTP middleware for storefront.
//!
//! - [`session`] - Cookie sessions carrying the visitor's cart ID

pub mod session;

pub use session::create_session_layer;
