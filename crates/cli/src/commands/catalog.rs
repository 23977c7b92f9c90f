//! Catalog listing.

use std::io::Write;

use heirloom_core::CategoryFilter;
use heirloom_storefront::catalog::Catalog;

use super::CommandError;

/// Print the built-in catalog, one product per line.
///
/// # Errors
///
/// Returns an error if the category is unknown.
pub fn list(category: Option<&str>, out: &mut impl Write) -> Result<(), CommandError> {
    let filter: CategoryFilter = category.unwrap_or_default().parse()?;
    let catalog = Catalog::seeded()?;

    for product in catalog.products(filter) {
        writeln!(
            out,
            "{}\t{}\t{} {}\t{}",
            product.id,
            product.category.as_str(),
            product.brand,
            product.name,
            product.unit_price().display()
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_list_all() {
        let mut out = Vec::new();
        list(None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 8);
    }

    #[test]
    fn test_list_category() {
        let mut out = Vec::new();
        list(Some("bags"), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.lines().all(|line| line.contains("\tbags\t")));
        assert!(out.contains("$1,999.00"));
    }

    #[test]
    fn test_unknown_category() {
        let mut out = Vec::new();
        assert!(matches!(
            list(Some("shoes"), &mut out),
            Err(CommandError::Category(_))
        ));
    }
}
