//! Entry types for snapshot trees.

use std::fs::Metadata;
use std::time::UNIX_EPOCH;

use super::index_types::EntryIndex;

/// Sentinel for an unknown timestamp or size.
pub const UNKNOWN: i64 = -1;

/// Metadata recorded for one filesystem object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Modification time in milliseconds since the Unix epoch, `-1` if unknown.
    pub last_modified: i64,
    /// Size in bytes, `-1` if unknown or a directory.
    pub size: i64,
    pub is_directory: bool,
}

impl EntryMetadata {
    /// Metadata for a file.
    pub fn file(last_modified: i64, size: i64) -> Self {
        Self {
            last_modified,
            size,
            is_directory: false,
        }
    }

    /// Metadata for a directory. Directories never carry a size.
    pub fn directory(last_modified: i64) -> Self {
        Self {
            last_modified,
            size: UNKNOWN,
            is_directory: true,
        }
    }

    /// Converts filesystem metadata, falling back to `-1` for missing fields.
    pub fn from_fs_metadata(metadata: &Metadata) -> Self {
        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|value| value.duration_since(UNIX_EPOCH).ok())
            .and_then(|value| i64::try_from(value.as_millis()).ok())
            .unwrap_or(UNKNOWN);

        if metadata.is_dir() {
            Self::directory(last_modified)
        } else {
            let size = i64::try_from(metadata.len()).unwrap_or(UNKNOWN);
            Self::file(last_modified, size)
        }
    }
}

/// One node of the snapshot tree.
///
/// The parent link is a lookup aid for path reconstruction. Ownership of
/// every entry belongs to the arena, never to the parent.
#[derive(Debug, Clone)]
pub struct Entry {
    name: Box<str>,
    metadata: EntryMetadata,
    parent: Option<EntryIndex>,
    pub(super) children: Vec<EntryIndex>,
}

impl Entry {
    pub(super) fn new(name: Box<str>, metadata: EntryMetadata, parent: Option<EntryIndex>) -> Self {
        Self {
            name,
            metadata,
            parent,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn metadata(&self) -> EntryMetadata {
        self.metadata
    }

    #[inline]
    pub fn last_modified(&self) -> i64 {
        self.metadata.last_modified
    }

    #[inline]
    pub fn size(&self) -> i64 {
        self.metadata.size
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        self.metadata.is_directory
    }

    #[inline]
    pub fn parent(&self) -> Option<EntryIndex> {
        self.parent
    }

    /// Number of children; always equal to `children().len()`.
    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[inline]
    pub fn children(&self) -> &[EntryIndex] {
        &self.children
    }
}
