//! The list of known snapshots, persisted as JSON.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NemoError, Result};
use crate::indexer::unix_now_millis;
use crate::store::{sanitize_label, snapshot_path};
use crate::types::format_timestamp;

pub const CATALOG_FILENAME: &str = "stores.json";

/// One catalogued snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    /// User-facing label.
    pub name: String,
    /// The indexed root directory.
    pub directory: String,
    /// When the snapshot was last built, in milliseconds since the Unix epoch.
    pub last_modified: i64,
}

impl StoreInfo {
    pub fn new(name: impl Into<String>, directory: impl Into<String>, last_modified: i64) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            last_modified,
        }
    }

    /// A store stamped with the current time, for a build that just finished.
    pub fn built_now(name: impl Into<String>, directory: impl Into<String>) -> Self {
        Self::new(name, directory, unix_now_millis())
    }
}

impl fmt::Display for StoreInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})  {}",
            self.name,
            self.directory,
            format_timestamp(self.last_modified)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub stores: Vec<StoreInfo>,
}

impl Catalog {
    /// Loads the catalog at `path`, or an empty one if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|error| {
            NemoError::Config(format!("failed to parse {}: {error}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|error| NemoError::Config(format!("failed to encode catalog: {error}")))?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        log::debug!("saved catalog with {} store(s) to {}", self.stores.len(), path.display());
        Ok(())
    }

    /// Case-insensitive label lookup.
    pub fn contains_store(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn find(&self, name: &str) -> Option<&StoreInfo> {
        self.stores
            .iter()
            .find(|store| store.name.to_lowercase() == name.to_lowercase())
    }

    /// Checks that `label` can be added.
    ///
    /// The label must produce a non-empty file name, and neither the label
    /// nor its file name may collide (case-insensitively) with a catalogued
    /// store.
    pub fn validate_new_label(&self, label: &str) -> Result<()> {
        let file_stem = sanitize_label(label);
        if file_stem.is_empty() {
            return Err(NemoError::InvalidInput("the store label is empty".to_string()));
        }

        let label_lower = label.to_lowercase();
        let stem_lower = file_stem.to_lowercase();
        let taken = self.stores.iter().any(|store| {
            store.name.to_lowercase() == label_lower
                || sanitize_label(&store.name).to_lowercase() == stem_lower
        });
        if taken {
            return Err(NemoError::InvalidInput(format!(
                "the store label '{label}' is already in use"
            )));
        }
        Ok(())
    }

    /// Validates and appends `info`.
    pub fn add(&mut self, info: StoreInfo) -> Result<()> {
        self.validate_new_label(&info.name)?;
        self.stores.push(info);
        Ok(())
    }

    /// Updates the build time of an existing store. Returns false if unknown.
    pub fn touch(&mut self, name: &str, last_modified: i64) -> bool {
        let name_lower = name.to_lowercase();
        match self
            .stores
            .iter_mut()
            .find(|store| store.name.to_lowercase() == name_lower)
        {
            Some(store) => {
                store.last_modified = last_modified;
                true
            }
            None => false,
        }
    }

    /// Removes a store by label, case-insensitively.
    pub fn remove(&mut self, name: &str) -> Option<StoreInfo> {
        let name_lower = name.to_lowercase();
        let index = self
            .stores
            .iter()
            .position(|store| store.name.to_lowercase() == name_lower)?;
        Some(self.stores.remove(index))
    }

    /// Location of the snapshot file for `name` inside `index_dir`.
    pub fn snapshot_path(&self, index_dir: &Path, name: &str) -> PathBuf {
        snapshot_path(index_dir, name)
    }

    /// `(label, path)` pairs for every store, in catalogue order.
    pub fn snapshot_files(&self, index_dir: &Path) -> Vec<(String, PathBuf)> {
        self.stores
            .iter()
            .map(|store| (store.name.clone(), snapshot_path(index_dir, &store.name)))
            .collect()
    }
}
