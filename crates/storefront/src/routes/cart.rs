//! Cart route handlers.
//!
//! Every mutation responds with the cart. Mutations that change it also send
//! an `HX-Trigger: cart-updated` header, so any fragment showing the cart
//! (the nav badge, the checkout summary) re-renders; no-ops send none.
//!
//! Cart IDs are stored in the session and resolved through the cart registry.

use axum::{
    Form, Json,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Response},
};
use heirloom_core::cart::{CartLine, CartState, floor_quantity};
use heirloom_core::checkout::{OrderSummary, PromoCode};
use heirloom_core::{CartId, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::services::{CartRegistry, SharedCart};
use crate::state::AppState;

/// Header telling HTMX fragments the cart changed.
pub const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

// =============================================================================
// Views
// =============================================================================

/// Cart item display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product_id: ProductId,
    pub name: String,
    pub brand: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub line_total: Decimal,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.clone(),
            name: line.product.name.clone(),
            brand: line.product.brand.clone(),
            image: line.product.image.clone(),
            quantity: line.quantity.get(),
            price: line.product.unit_price().display(),
            line_price: line.line_price().display(),
            line_total: line.line_total(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub subtotal_amount: Decimal,
    /// Total number of items, not lines.
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&CartState::new())
    }
}

impl From<&CartState> for CartView {
    fn from(cart: &CartState) -> Self {
        let subtotal = cart.total();
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: Price::usd(subtotal).display(),
            subtotal_amount: subtotal,
            item_count: cart.count(),
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Clone, Serialize)]
pub struct CartCountView {
    pub count: u64,
}

/// Order summary display data.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    #[serde(flatten)]
    pub amounts: OrderSummary,
    pub subtotal_display: String,
    pub discount_display: String,
    pub shipping_display: String,
    pub tax_display: String,
    pub total_display: String,
}

impl From<OrderSummary> for SummaryView {
    fn from(amounts: OrderSummary) -> Self {
        let show = |amount: Decimal| Price::usd(amount).display();
        Self {
            subtotal_display: show(amounts.subtotal),
            discount_display: show(amounts.discount),
            shipping_display: show(amounts.shipping),
            tax_display: show(amounts.tax),
            total_display: show(amounts.total),
            amounts,
        }
    }
}

/// Accepted promo code data.
#[derive(Debug, Clone, Serialize)]
pub struct PromoView {
    pub code: &'static str,
    pub discount_rate: Decimal,
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<f64>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: f64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Promo code form data.
#[derive(Debug, Deserialize)]
pub struct PromoForm {
    pub code: String,
}

/// Summary query parameters.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub promo_code: Option<String>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Get the cart ID from the session.
async fn get_cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<CartId>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// The session's cart, if it has one.
pub(crate) async fn current_cart(state: &AppState, session: &Session) -> Result<Option<SharedCart>> {
    match get_cart_id(session).await {
        Some(cart_id) => Ok(Some(state.carts().open(&cart_id).await?)),
        None => Ok(None),
    }
}

/// The session's cart, creating one on first use.
async fn cart_for_update(state: &AppState, session: &Session) -> Result<SharedCart> {
    if let Some(cart) = current_cart(state, session).await? {
        return Ok(cart);
    }

    let cart_id = CartRegistry::new_cart_id();
    session.insert(session_keys::CART_ID, &cart_id).await?;
    tracing::info!(%cart_id, "cart created");
    Ok(state.carts().open(&cart_id).await?)
}

/// Floor a submitted quantity, refusing NaN and infinities.
fn parse_quantity(value: f64) -> Result<i64> {
    floor_quantity(value)
        .ok_or_else(|| AppError::BadRequest("quantity must be a finite number".to_string()))
}

/// Parse an optional promo code; blank means none.
pub(crate) fn parse_promo(code: Option<&str>) -> Result<Option<PromoCode>> {
    match code.map(str::trim).filter(|code| !code.is_empty()) {
        Some(code) => PromoCode::parse(code)
            .map(Some)
            .map_err(|e| AppError::BadRequest(e.to_string())),
        None => Ok(None),
    }
}

fn cart_response(view: CartView, changed: bool) -> Response {
    if changed {
        (AppendHeaders([CART_UPDATED_TRIGGER]), Json(view)).into_response()
    } else {
        Json(view).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let view = current_cart(&state, &session)
        .await?
        .map_or_else(CartView::empty, |cart| CartView::from(&cart.snapshot()));
    Ok(Json(view))
}

/// Add an item to the cart, creating the cart if needed.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = parse_quantity(form.quantity.unwrap_or(1.0))?;
    let product_id = ProductId::new(form.product_id);
    let product = state
        .catalog()
        .product(&product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let cart = cart_for_update(&state, &session).await?;
    let (changed, view) = cart.with(|store| {
        let changed = store.add_to_cart(product, quantity);
        (changed, CartView::from(store.state()))
    });

    Ok(cart_response(view, changed))
}

/// Set an item's quantity. Quantities below 1 remove the item.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let quantity = parse_quantity(form.quantity)?;
    let Some(cart) = current_cart(&state, &session).await? else {
        return Ok(cart_response(CartView::empty(), false));
    };

    let product_id = ProductId::new(form.product_id);
    let (changed, view) = cart.with(|store| {
        let changed = store.update_quantity(&product_id, quantity);
        (changed, CartView::from(store.state()))
    });

    Ok(cart_response(view, changed))
}

/// Remove an item from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let Some(cart) = current_cart(&state, &session).await? else {
        return Ok(cart_response(CartView::empty(), false));
    };

    let product_id = ProductId::new(form.product_id);
    let (changed, view) = cart.with(|store| {
        let changed = store.remove_from_cart(&product_id);
        (changed, CartView::from(store.state()))
    });

    Ok(cart_response(view, changed))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Response> {
    let Some(cart) = current_cart(&state, &session).await? else {
        return Ok(cart_response(CartView::empty(), false));
    };

    let changed = cart.with(|store| store.clear_cart());
    Ok(cart_response(CartView::empty(), changed))
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCountView>> {
    let count = current_cart(&state, &session)
        .await?
        .map_or(0, |cart| cart.with(|store| store.cart_count()));
    Ok(Json(CartCountView { count }))
}

/// Order summary with shipping, tax and an optional promo code.
#[instrument(skip(state, session))]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryView>> {
    let promo = parse_promo(query.promo_code.as_deref())?;
    let cart = current_cart(&state, &session)
        .await?
        .map_or_else(CartState::new, |cart| cart.snapshot());
    Ok(Json(SummaryView::from(OrderSummary::new(&cart, promo))))
}

/// Validate a promo code.
#[instrument]
pub async fn promo(Form(form): Form<PromoForm>) -> Result<Json<PromoView>> {
    let promo = PromoCode::parse(&form.code).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(PromoView {
        code: promo.code(),
        discount_rate: promo.discount_rate(),
    }))
}
