//! Checkout route handler.

use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use heirloom_core::{Email, OrderId, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use super::cart::{CART_UPDATED_TRIGGER, SummaryView, current_cart, parse_promo};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::CheckoutError;
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub email: String,
    pub promo_code: Option<String>,
}

/// Order confirmation display data.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationView {
    pub order_id: OrderId,
    pub email: Email,
    pub amount: Decimal,
    pub amount_display: String,
    /// Amount charged, in cents.
    pub amount_cents: i64,
    pub payment_intent_id: String,
    pub summary: SummaryView,
}

/// Place an order for the session's cart.
///
/// The cart is cleared once payment succeeds.
#[instrument(skip(state, session, form))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let email = Email::parse(&form.email).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let promo = parse_promo(form.promo_code.as_deref())?;

    let cart = current_cart(&state, &session)
        .await?
        .ok_or(CheckoutError::EmptyCart)?;

    let confirmation = state.checkout().checkout(&cart, email, promo)?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", confirmation.order_id.as_str())]),
    );

    let amount = confirmation.summary.total;
    let view = ConfirmationView {
        order_id: confirmation.order_id,
        email: confirmation.email,
        amount,
        amount_display: Price::usd(amount).display(),
        amount_cents: confirmation.amount_cents,
        payment_intent_id: confirmation.payment_intent_id,
        summary: SummaryView::from(confirmation.summary),
    };

    Ok((AppendHeaders([CART_UPDATED_TRIGGER]), Json(view)).into_response())
}
