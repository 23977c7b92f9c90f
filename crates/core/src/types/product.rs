//! Catalog product types.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Errors that can occur when constructing a [`Product`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product ID is empty.
    #[error("product id cannot be empty")]
    EmptyId,
    /// The price is below zero.
    #[error("product price cannot be negative (got {0})")]
    NegativePrice(Decimal),
}

/// A product as supplied by the catalog.
///
/// Products are read-only from the cart's point of view. Carts hold them
/// behind an `Arc` and store them inline when persisted, since there is no
/// backing catalog service to re-resolve IDs against. Deserializing goes
/// through [`Product::new`], so stored products are validated too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ProductRecord")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub description: String,
    /// Unit price in the store's base currency.
    pub price: Decimal,
    /// Image URI.
    pub image: String,
    pub category: Category,
}

impl Product {
    /// Create a validated product.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty or the price is negative.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        brand: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
        category: Category,
    ) -> Result<Self, ProductError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ProductError::EmptyId);
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ProductError::NegativePrice(price));
        }

        Ok(Self {
            id,
            name: name.into(),
            brand: brand.into(),
            description: description.into(),
            price,
            image: image.into(),
            category,
        })
    }

    /// Unit price with currency, for display.
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::usd(self.price)
    }
}

/// Unvalidated wire form of [`Product`].
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    brand: String,
    description: String,
    price: Decimal,
    image: String,
    category: Category,
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.name,
            record.brand,
            record.description,
            record.price,
            record.image,
            record.category,
        )
    }
}

/// Product classification used for catalog filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bags,
    Jewelry,
    Accessories,
    Clothing,
}

impl Category {
    /// All categories, in catalog display order.
    pub const ALL: [Self; 4] = [Self::Bags, Self::Jewelry, Self::Accessories, Self::Clothing];

    /// The lowercase tag used in URLs and persisted data.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bags => "bags",
            Self::Jewelry => "jewelry",
            Self::Accessories => "accessories",
            Self::Clothing => "clothing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a category tag is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

/// A catalog filter: everything, or a single category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Whether a product passes this filter.
    #[must_use]
    pub fn matches(self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => product.category == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}
