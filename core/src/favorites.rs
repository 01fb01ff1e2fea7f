//! Client-side favorites: full recipe snapshots kept in local storage.
//!
//! A snapshot is a copy taken when the user favorites a recipe. It is never
//! refreshed from the server, so it can drift from (or outlive) the live
//! record. Matching against live recipes is by id only.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::models::Recipe;

/// Storage key holding the serialized favorites collection.
pub const FAVORITES_KEY: &str = "favorites";

/// Key-value persistence for client state.
///
/// The CLI backs this with files in its data directory; tests use
/// [`MemoryStorage`].
pub trait LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One file per key under a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let value = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(value))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyFavorite,
}

pub struct FavoritesStore<S: LocalStorage> {
    storage: S,
    favorites: Vec<Recipe>,
}

impl<S: LocalStorage> FavoritesStore<S> {
    /// Read the persisted collection. Missing, unreadable or malformed data
    /// yields an empty collection.
    pub fn load(storage: S) -> Self {
        let favorites = match storage.get_item(FAVORITES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed favorites: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("could not read favorites: {e:#}");
                Vec::new()
            }
        };
        Self { storage, favorites }
    }

    pub fn list(&self) -> &[Recipe] {
        &self.favorites
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.favorites.iter().any(|f| f.id == id)
    }

    /// Snapshot `recipe` unless a favorite with the same id already exists.
    pub fn add(&mut self, recipe: &Recipe) -> Result<AddOutcome> {
        if self.contains(recipe.id) {
            return Ok(AddOutcome::AlreadyFavorite);
        }
        let mut next = self.favorites.clone();
        next.push(recipe.clone());
        self.persist(next)?;
        Ok(AddOutcome::Added)
    }

    /// Returns `false` when no snapshot had that id.
    pub fn remove(&mut self, id: Uuid) -> Result<bool> {
        if !self.contains(id) {
            return Ok(false);
        }
        let next: Vec<Recipe> = self
            .favorites
            .iter()
            .filter(|f| f.id != id)
            .cloned()
            .collect();
        self.persist(next)?;
        Ok(true)
    }

    // Whole-collection overwrite; in-memory state only changes once the write succeeded.
    fn persist(&mut self, next: Vec<Recipe>) -> Result<()> {
        let raw = serde_json::to_string(&next).context("failed to encode favorites")?;
        self.storage.set_item(FAVORITES_KEY, &raw)?;
        self.favorites = next;
        Ok(())
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}
