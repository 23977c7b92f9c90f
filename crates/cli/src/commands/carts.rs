//! Persisted cart inspection.
//!
//! # Usage
//!
//! ```bash
//! heirloom-cli carts list
//! heirloom-cli carts show <CART_ID>
//! heirloom-cli carts clear <CART_ID>
//! ```
//!
//! Carts are read straight from the data directory, so these commands work
//! whether or not the storefront is running. Clearing a cart that is open in
//! a running storefront only takes effect once the server evicts it.

use std::io::Write;
use std::path::Path;

use heirloom_core::cart::{CART_STORAGE_KEY, CartStore, KeyValueStore};
use heirloom_core::{CartId, Price};
use heirloom_storefront::storage::{FileStore, persisted_cart_ids};
use tracing::info;

use super::CommandError;

/// Open a persisted cart, failing if nothing is stored for it.
fn open_existing(data_dir: &Path, id: &str) -> Result<CartStore<FileStore>, CommandError> {
    let cart_id = CartId::new(id);
    let storage = FileStore::for_cart(data_dir, &cart_id)?;
    if storage.load(CART_STORAGE_KEY)?.is_none() {
        return Err(CommandError::CartNotFound(id.to_owned()));
    }
    Ok(CartStore::open(storage))
}

/// Print one row per persisted cart: ID, item count, subtotal.
///
/// # Errors
///
/// Returns an error if the data directory cannot be read.
pub fn list(data_dir: &Path, out: &mut impl Write) -> Result<(), CommandError> {
    let ids = persisted_cart_ids(data_dir)?;
    info!(carts = ids.len(), data_dir = %data_dir.display(), "listing carts");

    for id in ids {
        let store = CartStore::open(FileStore::for_cart(data_dir, &id)?);
        writeln!(
            out,
            "{id}\t{} items\t{}",
            store.cart_count(),
            Price::usd(store.cart_total()).display()
        )?;
    }
    Ok(())
}

/// Print the lines of one cart and its subtotal.
///
/// # Errors
///
/// Returns an error if the cart does not exist or cannot be read.
pub fn show(data_dir: &Path, id: &str, out: &mut impl Write) -> Result<(), CommandError> {
    let store = open_existing(data_dir, id)?;

    for line in store.lines() {
        writeln!(
            out,
            "{}\t{} {}\t{} x {}\t{}",
            line.product.id,
            line.product.brand,
            line.product.name,
            line.quantity,
            line.product.unit_price().display(),
            line.line_price().display()
        )?;
    }
    writeln!(
        out,
        "subtotal\t{}",
        Price::usd(store.cart_total()).display()
    )?;
    Ok(())
}

/// Empty one cart. Its stored blob is removed.
///
/// # Errors
///
/// Returns an error if the cart does not exist or cannot be written.
pub fn clear(data_dir: &Path, id: &str) -> Result<(), CommandError> {
    let mut store = open_existing(data_dir, id)?;
    store.clear_cart();
    info!(cart_id = %id, "cart cleared");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use heirloom_core::{Category, Product};
    use rust_decimal::Decimal;

    use super::*;

    fn seed_cart(data_dir: &Path, id: &str) {
        let product = Product::new(
            "1",
            "Classic Flap Bag",
            "Chanel",
            "",
            Decimal::new(1999, 0),
            "",
            Category::Bags,
        )
        .unwrap();
        let storage = FileStore::for_cart(data_dir, &CartId::new(id)).unwrap();
        let mut store = CartStore::open(storage);
        store.add_to_cart(Arc::new(product), 2);
    }

    #[test]
    fn test_list_carts() {
        let dir = tempfile::tempdir().unwrap();
        seed_cart(dir.path(), "abc");

        let mut out = Vec::new();
        list(dir.path(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "abc\t2 items\t$3,998.00\n");
    }

    #[test]
    fn test_show_cart() {
        let dir = tempfile::tempdir().unwrap();
        seed_cart(dir.path(), "abc");

        let mut out = Vec::new();
        show(dir.path(), "abc", &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Chanel Classic Flap Bag\t2 x $1,999.00\t$3,998.00"));
        assert!(out.ends_with("subtotal\t$3,998.00\n"));
    }

    #[test]
    fn test_clear_cart() {
        let dir = tempfile::tempdir().unwrap();
        seed_cart(dir.path(), "abc");

        clear(dir.path(), "abc").unwrap();

        // An emptied cart leaves nothing persisted
        let mut out = Vec::new();
        list(dir.path(), &mut out).unwrap();
        assert!(out.is_empty());
        assert!(matches!(
            show(dir.path(), "abc", &mut Vec::new()),
            Err(CommandError::CartNotFound(_))
        ));
    }

    #[test]
    fn test_missing_cart() {
        let dir = tempfile::tempdir().unwrap();
        let result = clear(dir.path(), "nope");
        assert!(matches!(result, Err(CommandError::CartNotFound(id)) if id == "nope"));
    }
}
