//! Snapshots: a named index of one directory subtree.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::storage::EntryTree;

/// File extension of persisted snapshot files.
pub const SNAPSHOT_EXTENSION: &str = "ser";

/// One indexed volume.
///
/// Created empty, populated once (by the builder or by decode), then only read.
#[derive(Debug, Clone)]
pub struct Snapshot {
    name: String,
    directory: String,
    root: Option<EntryTree>,
}

impl Snapshot {
    /// Creates a snapshot without a tree.
    pub fn new(name: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            root: None,
        }
    }

    /// Creates a snapshot owning `tree`.
    pub fn with_tree(name: impl Into<String>, directory: impl Into<String>, tree: EntryTree) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            root: Some(tree),
        }
    }

    /// The user-facing label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The indexed root path, as given at build time.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn tree(&self) -> Option<&EntryTree> {
        self.root.as_ref()
    }

    /// Number of indexed entries, root included.
    pub fn entry_count(&self) -> usize {
        self.root.as_ref().map_or(0, EntryTree::len)
    }

    /// Name of the file this snapshot persists to.
    pub fn file_name(&self) -> String {
        snapshot_file_name(&self.name)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name: '{}'   Directory: '{}'", self.name, self.directory)
    }
}

/// Replaces every character that is not a letter or digit with `-`.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '-' })
        .collect()
}

/// Derives the snapshot file name for a label, e.g. `"C: Drive"` → `"C--Drive.ser"`.
pub fn snapshot_file_name(label: &str) -> String {
    format!("{}.{SNAPSHOT_EXTENSION}", sanitize_label(label))
}

/// Location of the snapshot file for `label` inside `index_dir`.
pub fn snapshot_path(index_dir: &Path, label: &str) -> PathBuf {
    index_dir.join(snapshot_file_name(label))
}
