//! Cart lines and the ordered cart state.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::quantity::Quantity;
use crate::types::{Price, Product, ProductId};

/// One (product, quantity) pairing within the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The catalog product. Shared, not owned, by the cart.
    pub product: Arc<Product>,
    pub quantity: Quantity,
}

impl CartLine {
    /// Create a line.
    #[must_use]
    pub const fn new(product: Arc<Product>, quantity: Quantity) -> Self {
        Self { product, quantity }
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity.get())
    }

    /// Line total with currency, for display.
    #[must_use]
    pub fn line_price(&self) -> Price {
        Price::usd(self.line_total())
    }
}

/// The ordered contents of a cart.
///
/// Holds at most one line per product ID. Lines keep their insertion order;
/// updating a line in place does not move it. Totals are computed on every
/// read and never stored.
///
/// Serializes as an ordered list of `{product, quantity}` objects. On
/// deserialization, repeated product IDs are merged into the first line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct CartState {
    lines: Vec<CartLine>,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in cart order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines (not items).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product.id == product_id)
    }

    /// Sum of `price × quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| &line.product.id == product_id)
    }

    /// Merge `quantity` into the product's line, appending if absent.
    pub(crate) fn add(&mut self, product: Arc<Product>, quantity: Quantity) {
        match self.position(&product.id) {
            Some(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.quantity = line.quantity.saturating_add(quantity);
                }
            }
            None => self.lines.push(CartLine::new(product, quantity)),
        }
    }

    /// Remove a product's line. Returns whether anything was removed.
    pub(crate) fn remove(&mut self, product_id: &ProductId) -> bool {
        self.position(product_id)
            .map(|index| self.lines.remove(index))
            .is_some()
    }

    /// Set a line's quantity in place. Returns whether anything changed.
    pub(crate) fn set_quantity(&mut self, product_id: &ProductId, quantity: Quantity) -> bool {
        match self.lines.iter_mut().find(|line| &line.product.id == product_id) {
            Some(line) if line.quantity != quantity => {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Drop every line. Returns whether the cart was non-empty.
    pub(crate) fn clear(&mut self) -> bool {
        let had_lines = !self.lines.is_empty();
        self.lines.clear();
        had_lines
    }
}

impl From<Vec<CartLine>> for CartState {
    fn from(lines: Vec<CartLine>) -> Self {
        let mut state = Self::new();
        for line in lines {
            state.add(line.product, line.quantity);
        }
        state
    }
}

impl From<CartState> for Vec<CartLine> {
    fn from(state: CartState) -> Self {
        state.lines
    }
}
