//! File-backed cart persistence.
//!
//! Every cart gets its own directory under the data root:
//!
//! ```text
//! {data_dir}/
//!   {cart_id}/
//!     cart.json
//! ```
//!
//! Writes go to a temporary file that is then renamed over the target, so a
//! crash mid-write leaves the previous blob intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use heirloom_core::CartId;
use heirloom_core::cart::{CART_STORAGE_KEY, KeyValueStore, StorageError};

/// A directory of `{key}.json` files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store files directly in `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store for one cart under the data root.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart ID is not safe to use as a directory name.
    pub fn for_cart(data_dir: &Path, cart_id: &CartId) -> Result<Self, StorageError> {
        if !is_safe_name(cart_id.as_str()) {
            return Err(StorageError::Unavailable(format!(
                "invalid cart id: {cart_id:?}"
            )));
        }
        Ok(Self::new(data_dir.join(cart_id.as_str())))
    }

    /// The directory this store writes to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !is_safe_name(key) {
            return Err(StorageError::Unavailable(format!("invalid key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)?) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// IDs of every cart with a persisted blob under the data root, sorted.
///
/// A missing data root means no carts.
///
/// # Errors
///
/// Returns an error if the data root exists but cannot be listed.
pub fn persisted_cart_ids(data_dir: &Path) -> Result<Vec<CartId>, StorageError> {
    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry?;
        let has_blob = entry
            .path()
            .join(format!("{CART_STORAGE_KEY}.json"))
            .is_file();
        if let (true, Some(name)) = (has_blob, entry.file_name().to_str()) {
            ids.push(CartId::new(name));
        }
    }
    ids.sort();
    Ok(ids)
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.load("cart").unwrap(), None);
    }

    #[test]
    fn test_save_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("abc"));

        store.save("cart", "[1]").unwrap();
        store.save("cart", "[2]").unwrap();
        assert_eq!(store.load("cart").unwrap().as_deref(), Some("[2]"));
        assert!(!store.dir().join("cart.json.tmp").exists());

        store.remove("cart").unwrap();
        store.remove("cart").unwrap();
        assert_eq!(store.load("cart").unwrap(), None);
    }

    #[test]
    fn test_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.save("../escape", "x").is_err());
        assert!(FileStore::for_cart(dir.path(), &CartId::new("../etc")).is_err());
        assert!(FileStore::for_cart(dir.path(), &CartId::new("")).is_err());
    }

    #[test]
    fn test_persisted_cart_ids() {
        let dir = tempfile::tempdir().unwrap();
        assert!(persisted_cart_ids(&dir.path().join("missing")).unwrap().is_empty());

        for id in ["b-cart", "a-cart"] {
            FileStore::for_cart(dir.path(), &CartId::new(id))
                .unwrap()
                .save(CART_STORAGE_KEY, "[]")
                .unwrap();
        }
        fs::create_dir_all(dir.path().join("empty-dir")).unwrap();

        let ids = persisted_cart_ids(dir.path()).unwrap();
        assert_eq!(ids, [CartId::new("a-cart"), CartId::new("b-cart")]);
    }
}
