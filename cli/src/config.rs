use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use recipebox_core::favorites::{FavoritesStore, FileStorage};

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub storage_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("", "", "recipebox")
            .context("Could not determine home directory")?;
        Self::in_dir(proj_dirs.data_dir())
    }

    fn in_dir(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            db_path: data_dir.join("recipebox.db"),
            storage_dir: data_dir.join("local_storage"),
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn favorites(&self) -> Result<FavoritesStore<FileStorage>> {
        let storage = FileStorage::new(&self.storage_dir)?;
        Ok(FavoritesStore::load(storage))
    }
}
