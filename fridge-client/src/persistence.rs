//! Durable client-side state: favorites, shopping list and language.
//!
//! Each key is loaded once at startup and rewritten in full whenever it changes.
use anyhow::{Context, Result};
use fridge::lists::{Favorites, ShoppingList};
use fridge::{Language, Recipe};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const FAVORITES_KEY: &str = "culinary-favs";
pub const SHOPPING_KEY: &str = "culinary-shopping";
pub const LANGUAGE_KEY: &str = "culinary-lang";

#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Could not create data directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Could not read {}", path.display())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key);
        std::fs::write(&path, value).with_context(|| format!("Could not write {}", path.display()))
    }
}

/// Keeps everything in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory store poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed access to the three persisted keys.
///
/// Loading never fails: missing or unreadable values fall back to defaults.
/// Saving failures are logged and otherwise ignored.
pub struct LocalPersistence<S> {
    store: S,
}

impl<S: KeyValueStore> LocalPersistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.store.get(key) {
            Ok(Some(text)) => serde_json::from_str(&text).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt {}: {}", key, e);
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!("Could not load {}: {:#}", key, e);
                T::default()
            }
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(anyhow::Error::from)
            .and_then(|text| self.store.set(key, &text));
        if let Err(e) = result {
            tracing::warn!("Could not save {}: {:#}", key, e);
        }
    }

    /// Entries that no longer decode are dropped one by one; the rest survive.
    pub fn load_favorites(&self) -> Favorites {
        let entries: Vec<serde_json::Value> = self.load_json(FAVORITES_KEY);
        let recipes = entries
            .into_iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                serde_json::from_value::<Recipe>(entry)
                    .map_err(|e| {
                        tracing::warn!("Dropping unreadable favorite #{}: {}", position, e)
                    })
                    .ok()
            })
            .collect();
        Favorites::new(recipes)
    }

    pub fn save_favorites(&self, favorites: &Favorites) {
        self.save_json(FAVORITES_KEY, favorites)
    }

    pub fn load_shopping_list(&self) -> ShoppingList {
        self.load_json(SHOPPING_KEY)
    }

    pub fn save_shopping_list(&self, list: &ShoppingList) {
        self.save_json(SHOPPING_KEY, list)
    }

    /// The stored two-letter code; anything unknown means English.
    pub fn load_language(&self) -> Language {
        match self.store.get(LANGUAGE_KEY) {
            Ok(Some(code)) => Language::from_code_or_default(code.trim()),
            Ok(None) => Language::default(),
            Err(e) => {
                tracing::warn!("Could not load {}: {:#}", LANGUAGE_KEY, e);
                Language::default()
            }
        }
    }

    pub fn save_language(&self, language: Language) {
        if let Err(e) = self.store.set(LANGUAGE_KEY, language.code()) {
            tracing::warn!("Could not save {}: {:#}", LANGUAGE_KEY, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::test_support::recipe;

    #[test]
    fn file_store_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(&dir.path().join("nested")).unwrap();
        assert_eq!(store.get(SHOPPING_KEY).unwrap(), None);
        store.set(SHOPPING_KEY, r#"["Milk"]"#).unwrap();
        assert_eq!(store.get(SHOPPING_KEY).unwrap().as_deref(), Some(r#"["Milk"]"#));
        assert!(dir.path().join("nested/culinary-shopping.json").exists());
    }

    #[test]
    fn state_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let persistence = LocalPersistence::new(FileStore::open(dir.path()).unwrap());
            let mut list = ShoppingList::default();
            list.add("Milk");
            list.add("Eggs");
            persistence.save_shopping_list(&list);
            persistence.save_language(Language::Id);
        }
        let persistence = LocalPersistence::new(FileStore::open(dir.path()).unwrap());
        assert_eq!(persistence.load_shopping_list().items(), ["Milk", "Eggs"]);
        assert_eq!(persistence.load_language(), Language::Id);
        assert!(persistence.load_favorites().is_empty());
    }

    #[test]
    fn corrupt_values_load_as_defaults() {
        let store = MemoryStore::default();
        store.set(FAVORITES_KEY, "{not json").unwrap();
        store.set(LANGUAGE_KEY, "fr").unwrap();
        let persistence = LocalPersistence::new(store);
        assert!(persistence.load_favorites().is_empty());
        assert_eq!(persistence.load_language(), Language::En);
    }

    #[test]
    fn failed_writes_are_not_fatal() {
        let mut store = MockKeyValueStore::new();
        store
            .expect_set()
            .withf(|key, value| key == LANGUAGE_KEY && value == "id")
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));
        store
            .expect_get()
            .returning(|_| Err(anyhow::anyhow!("unreadable")));
        let persistence = LocalPersistence::new(store);
        persistence.save_language(Language::Id);
        assert_eq!(persistence.load_language(), Language::En);
        assert!(persistence.load_shopping_list().is_empty());
    }

    #[test]
    fn one_bad_favorite_does_not_lose_the_others() {
        let kept = serde_json::to_value(recipe("r1", "Omelette", &["Beat eggs"])).unwrap();
        let mut broken = kept.clone();
        broken["id"] = "r2".into();
        broken["difficulty"] = "Expert".into();
        let stored = serde_json::json!([kept, broken, kept]).to_string();

        let store = MemoryStore::default();
        store.set(FAVORITES_KEY, &stored).unwrap();
        let persistence = LocalPersistence::new(store);
        let favorites = persistence.load_favorites();
        assert_eq!(favorites.len(), 1);
        assert!(favorites.contains("r1"));

        persistence.save_favorites(&favorites);
        assert_eq!(persistence.load_favorites(), favorites);
    }
}
