//! Positive line quantities.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// The quantity of a cart line. Always at least 1.
///
/// Caller-supplied values are normalized rather than rejected: anything below
/// 1 becomes 1 and anything above `u32::MAX` saturates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Clamp an integer into `1..=u32::MAX`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let value = u32::try_from(value.max(1)).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN))
    }

    /// Exact conversion; `None` for values below 1 or above `u32::MAX`.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
    }

    /// The quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add another quantity, saturating at `u32::MAX`.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0.get()))
    }
}

/// Floor a caller-supplied quantity to a whole number.
///
/// NaN and infinities are refused; finite values saturate at the `i64`
/// bounds. The result still goes through the store's own normalization.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // float-to-int casts saturate
pub fn floor_quantity(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.floor() as i64)
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_minimum_is_one() {
        assert_eq!(Quantity::clamped(0).get(), 1);
        assert_eq!(Quantity::clamped(-7).get(), 1);
        assert_eq!(Quantity::clamped(i64::MIN).get(), 1);
    }

    #[test]
    fn test_clamped_saturates() {
        assert_eq!(Quantity::clamped(i64::MAX).get(), u32::MAX);
        assert_eq!(Quantity::clamped(3).get(), 3);
    }

    #[test]
    fn test_new_is_exact() {
        assert_eq!(Quantity::new(0), None);
        assert_eq!(Quantity::new(-1), None);
        assert_eq!(Quantity::new(2).map(Quantity::get), Some(2));
    }

    #[test]
    fn test_floor_quantity() {
        assert_eq!(floor_quantity(2.9), Some(2));
        assert_eq!(floor_quantity(0.5), Some(0));
        assert_eq!(floor_quantity(-3.5), Some(-4));
        assert_eq!(floor_quantity(1e300), Some(i64::MAX));
    }

    #[test]
    fn test_floor_quantity_rejects_non_finite() {
        assert_eq!(floor_quantity(f64::NAN), None);
        assert_eq!(floor_quantity(f64::INFINITY), None);
        assert_eq!(floor_quantity(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_saturating_add() {
        let max = Quantity::clamped(i64::MAX);
        assert_eq!(max.saturating_add(Quantity::ONE), max);
        assert_eq!(Quantity::ONE.saturating_add(Quantity::ONE).get(), 2);
    }

    #[test]
    fn test_zero_is_rejected_on_deserialize() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Quantity>("3").is_ok());
    }
}
