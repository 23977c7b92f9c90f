//! Mocked product catalog.
//!
//! The shop has no backing catalog service yet; products are a fixed list
//! built at startup. Handlers and the cart only ever see
//! [`Product`]s, so swapping this for a real source touches nothing else.

use std::sync::Arc;

use heirloom_core::{Category, CategoryFilter, Product, ProductError, ProductId};
use rust_decimal::Decimal;

/// In-memory product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Arc<[Arc<Product>]>,
}

impl Catalog {
    /// Build a catalog from a product list.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products.into_iter().map(Arc::new).collect(),
        }
    }

    /// The vintage collection the shop launches with.
    ///
    /// # Errors
    ///
    /// Returns an error if a seed product fails validation.
    pub fn seeded() -> Result<Self, ProductError> {
        let products = SEED
            .iter()
            .map(|seed| {
                Product::new(
                    seed.id,
                    seed.name,
                    seed.brand,
                    seed.description,
                    Decimal::new(seed.price, 0),
                    seed.image,
                    seed.category,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(products))
    }

    /// Products passing the filter, in catalog order.
    #[must_use]
    pub fn products(&self, filter: CategoryFilter) -> Vec<Arc<Product>> {
        self.products
            .iter()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect()
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Arc<Product>> {
        self.products
            .iter()
            .find(|product| &product.id == id)
            .cloned()
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

struct SeedProduct {
    id: &'static str,
    name: &'static str,
    brand: &'static str,
    price: i64,
    image: &'static str,
    description: &'static str,
    category: Category,
}

const SEED: &[SeedProduct] = &[
    SeedProduct {
        id: "1",
        name: "Monogram Canvas Bag",
        brand: "Louis Vuitton",
        price: 1999,
        image: "https://images.pexels.com/photos/1152077/pexels-photo-1152077.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Authentic vintage Louis Vuitton monogram canvas bag in excellent condition.",
        category: Category::Bags,
    },
    SeedProduct {
        id: "2",
        name: "Classic Flap Bag",
        brand: "Chanel",
        price: 4599,
        image: "https://images.pexels.com/photos/1306262/pexels-photo-1306262.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Iconic Chanel Classic Flap Bag in black caviar leather with gold hardware.",
        category: Category::Bags,
    },
    SeedProduct {
        id: "3",
        name: "Gold Watch",
        brand: "Cartier",
        price: 8999,
        image: "https://images.pexels.com/photos/9978722/pexels-photo-9978722.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Vintage Cartier watch in 18k gold, recently serviced and in excellent condition.",
        category: Category::Jewelry,
    },
    SeedProduct {
        id: "4",
        name: "Silk Scarf",
        brand: "Hermès",
        price: 399,
        image: "https://images.pexels.com/photos/6046184/pexels-photo-6046184.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Vintage Hermès silk scarf with classic equestrian print.",
        category: Category::Accessories,
    },
    SeedProduct {
        id: "5",
        name: "Wool Coat",
        brand: "Burberry",
        price: 1299,
        image: "https://images.pexels.com/photos/7679740/pexels-photo-7679740.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Classic Burberry trench coat in camel, excellent vintage condition.",
        category: Category::Clothing,
    },
    SeedProduct {
        id: "6",
        name: "Bamboo Handle Bag",
        brand: "Gucci",
        price: 1799,
        image: "https://images.pexels.com/photos/5234154/pexels-photo-5234154.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Vintage Gucci bamboo handle bag in navy blue leather.",
        category: Category::Bags,
    },
    SeedProduct {
        id: "7",
        name: "Diamond Pendant Necklace",
        brand: "Tiffany & Co.",
        price: 2499,
        image: "https://images.pexels.com/photos/11638817/pexels-photo-11638817.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Vintage Tiffany & Co. diamond pendant necklace in platinum setting.",
        category: Category::Jewelry,
    },
    SeedProduct {
        id: "8",
        name: "Cashmere Sweater",
        brand: "Ralph Lauren",
        price: 399,
        image: "https://images.pexels.com/photos/6801642/pexels-photo-6801642.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=2",
        description: "Vintage Ralph Lauren cashmere sweater in cream, excellent condition.",
        category: Category::Clothing,
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_catalog() {
        let catalog = Catalog::seeded().unwrap();
        assert_eq!(catalog.len(), 8);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_filter_by_category() {
        let catalog = Catalog::seeded().unwrap();
        let bags = catalog.products(CategoryFilter::Only(Category::Bags));
        let ids: Vec<&str> = bags.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "6"]);

        assert_eq!(catalog.products(CategoryFilter::All).len(), 8);
    }

    #[test]
    fn test_lookup() {
        let catalog = Catalog::seeded().unwrap();
        let watch = catalog.product(&ProductId::new("3")).unwrap();
        assert_eq!(watch.brand, "Cartier");
        assert_eq!(watch.price, Decimal::new(8999, 0));
        assert!(catalog.product(&ProductId::new("99")).is_none());
    }

    #[test]
    fn test_lookup_shares_product() {
        let catalog = Catalog::seeded().unwrap();
        let a = catalog.product(&ProductId::new("1")).unwrap();
        let b = catalog.product(&ProductId::new("1")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
