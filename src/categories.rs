// Category provider: read-through category set with seeded defaults

use crate::collection;
use crate::models::{Category, default_categories};
use crate::storage::KeyValueStore;
use eyre::Result;
use tracing::{debug, warn};

/// Category set loaded from the `categories` key
#[derive(Debug, Clone)]
pub struct CategoryProvider {
    categories: Vec<Category>,
}

impl CategoryProvider {
    /// Load from storage
    ///
    /// The defaults are used when the key is absent, or when the stored value
    /// is malformed and nothing in it is usable. A stored empty array stays empty.
    pub fn load<S: KeyValueStore + ?Sized>(storage: &S) -> Result<Self> {
        let categories = match collection::load::<Category, S>(storage)? {
            None => {
                debug!("No categories persisted, using defaults");
                default_categories()
            }
            Some(loaded) if loaded.lossy && loaded.records.is_empty() => {
                warn!("Persisted category set is malformed, using defaults");
                default_categories()
            }
            Some(loaded) => loaded.records,
        };

        Ok(Self { categories })
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str())
    }

    /// First category; drafts without a category fall back to it
    pub fn default_category(&self) -> Option<&Category> {
        self.categories.first()
    }

    /// Overwrite the persisted category set
    pub fn replace<S: KeyValueStore + ?Sized>(&mut self, storage: &mut S, categories: Vec<Category>) -> Result<()> {
        collection::save(storage, &categories)?;
        self.categories = categories;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, SqliteStorage};

    #[test]
    fn test_defaults_when_absent() {
        let storage = MemoryStorage::new();
        let provider = CategoryProvider::load(&storage).unwrap();

        assert_eq!(provider.all(), default_categories().as_slice());
        assert_eq!(provider.name_of("2"), Some("Work"));
        assert_eq!(provider.default_category().map(|c| c.name.as_str()), Some("Personal"));
        // Loading never writes the defaults back
        assert_eq!(storage.get("categories").unwrap(), None);
    }

    #[test]
    fn test_defaults_when_malformed() {
        let mut storage = MemoryStorage::new();
        storage.set("categories", "not json").unwrap();

        let provider = CategoryProvider::load(&storage).unwrap();
        assert_eq!(provider.all().len(), 3);
    }

    #[test]
    fn test_defaults_when_every_element_is_invalid() {
        let mut storage = MemoryStorage::new();
        storage.set("categories", r#"[{"id":"1"},42]"#).unwrap();

        let provider = CategoryProvider::load(&storage).unwrap();
        assert_eq!(provider.all(), default_categories().as_slice());
    }

    #[test]
    fn test_stored_empty_set_stays_empty() {
        let mut storage = MemoryStorage::new();
        storage.set("categories", "[]").unwrap();

        let provider = CategoryProvider::load(&storage).unwrap();
        assert!(provider.all().is_empty());
        assert!(provider.default_category().is_none());
    }

    #[test]
    fn test_replace_with_empty_set_round_trips() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let mut provider = CategoryProvider::load(&storage).unwrap();

        provider.replace(&mut storage, Vec::new()).unwrap();

        let reloaded = CategoryProvider::load(&storage).unwrap();
        assert!(reloaded.all().is_empty());
    }

    #[test]
    fn test_loads_persisted_set() {
        let mut storage = MemoryStorage::new();
        storage
            .set("categories", r##"[{"id":"home","name":"Home","color":"#000000"}]"##)
            .unwrap();

        let provider = CategoryProvider::load(&storage).unwrap();
        assert_eq!(provider.all().len(), 1);
        assert_eq!(provider.name_of("home"), Some("Home"));
        assert_eq!(provider.name_of("1"), None);
    }

    #[test]
    fn test_replace_persists() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        let mut provider = CategoryProvider::load(&storage).unwrap();

        provider
            .replace(&mut storage, vec![Category::new("x", "Errands", "#FFFFFF")])
            .unwrap();
        assert_eq!(provider.all().len(), 1);

        let reloaded = CategoryProvider::load(&storage).unwrap();
        assert_eq!(reloaded.get("x").map(|c| c.name.as_str()), Some("Errands"));
    }
}
