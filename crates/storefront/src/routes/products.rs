//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use heirloom_core::{Category, CategoryFilter, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub description: String,
    pub price: Decimal,
    /// Formatted price, e.g. `$1,999.00`.
    pub price_display: String,
    pub image: String,
    pub category: Category,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            description: product.description.clone(),
            price: product.price,
            price_display: product.unit_price().display(),
            image: product.image.clone(),
            category: product.category,
        }
    }
}

/// Product listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// `all` or a category tag.
    pub category: Option<String>,
}

/// List products, optionally filtered by category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProductView>>> {
    let filter = query
        .category
        .as_deref()
        .unwrap_or_default()
        .parse::<CategoryFilter>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let products = state
        .catalog()
        .products(filter)
        .iter()
        .map(|product| ProductView::from(product.as_ref()))
        .collect();

    Ok(Json(products))
}

/// Display a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductView>> {
    let id = ProductId::new(id);
    let product = state
        .catalog()
        .product(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(Json(ProductView::from(product.as_ref())))
}
