//! Arena-backed snapshot tree.
//!
//! Entries live in a single `Vec`, addressed by [`EntryIndex`]. Each entry
//! keeps its parent's index instead of a reference, so the tree has a single
//! owner and no cycles while still supporting path reconstruction.

use std::ops::Index;
use std::path::PathBuf;

use super::index_types::EntryIndex;
use super::node::{Entry, EntryMetadata};
use crate::error::{NemoError, Result};

/// The entry tree of one snapshot. The root is always [`EntryIndex::ROOT`].
#[derive(Debug, Clone)]
pub struct EntryTree {
    entries: Vec<Entry>,
}

impl EntryTree {
    /// Creates a tree holding only a root entry.
    ///
    /// The root name is the full path of the indexed directory, not a bare name.
    pub fn with_root(name: impl Into<Box<str>>, metadata: EntryMetadata) -> Self {
        Self {
            entries: vec![Entry::new(name.into(), metadata, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> EntryIndex {
        EntryIndex::ROOT
    }

    #[inline]
    pub fn get(&self, index: EntryIndex) -> Option<&Entry> {
        self.entries.get(index.get())
    }

    /// Total number of entries, including the root.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a child to `parent` and returns its index.
    ///
    /// Fails if the parent is missing or is not a directory, which keeps the
    /// "files have no children" invariant.
    pub fn push_child(
        &mut self,
        parent: EntryIndex,
        name: impl Into<Box<str>>,
        metadata: EntryMetadata,
    ) -> Result<EntryIndex> {
        match self.entries.get(parent.get()) {
            Some(entry) if entry.is_directory() => {}
            Some(entry) => {
                return Err(NemoError::InvalidInput(format!(
                    "cannot add a child under file '{}'",
                    entry.name()
                )))
            }
            None => {
                return Err(NemoError::Internal(format!(
                    "parent index {} out of range",
                    parent.get()
                )))
            }
        }

        let index = EntryIndex::new(self.entries.len());
        self.entries
            .push(Entry::new(name.into(), metadata, Some(parent)));
        self.entries[parent.get()].children.push(index);
        Ok(index)
    }

    /// Iterates the direct children of `index` in stored order.
    pub fn children(&self, index: EntryIndex) -> impl Iterator<Item = (EntryIndex, &Entry)> + '_ {
        self.get(index)
            .map(Entry::children)
            .unwrap_or_default()
            .iter()
            .map(move |child| (*child, &self.entries[child.get()]))
    }

    /// Finds a direct child directory by exact, case-sensitive name.
    pub fn child_directory(&self, index: EntryIndex, name: &str) -> Option<EntryIndex> {
        self.children(index)
            .find(|(_, entry)| entry.is_directory() && entry.name() == name)
            .map(|(child, _)| child)
    }

    /// Pre-order traversal starting at the root.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![EntryIndex::ROOT],
        }
    }

    /// Reconstructs the path of the directory holding `index`.
    ///
    /// Ancestor names are joined from the root down. Because the root stores
    /// the full indexed path, the result is an absolute path for every entry
    /// below the root, and empty for the root itself.
    pub fn parent_path(&self, index: EntryIndex) -> String {
        let mut names = Vec::new();
        let mut current = self.get(index).and_then(Entry::parent);
        while let Some(ancestor) = current {
            let Some(entry) = self.get(ancestor) else {
                break;
            };
            names.push(entry.name());
            current = entry.parent();
        }

        let mut path = PathBuf::new();
        for name in names.into_iter().rev() {
            path.push(name);
        }
        path.to_string_lossy().into_owned()
    }

    /// Reconstructs the full path of `index`.
    pub fn full_path(&self, index: EntryIndex) -> String {
        let Some(entry) = self.get(index) else {
            return String::new();
        };
        if entry.parent().is_none() {
            return entry.name().to_string();
        }
        PathBuf::from(self.parent_path(index))
            .join(entry.name())
            .to_string_lossy()
            .into_owned()
    }
}

impl Index<EntryIndex> for EntryTree {
    type Output = Entry;

    fn index(&self, index: EntryIndex) -> &Entry {
        &self.entries[index.get()]
    }
}

/// Depth-first pre-order iterator over an [`EntryTree`].
pub struct Preorder<'a> {
    tree: &'a EntryTree,
    stack: Vec<EntryIndex>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (EntryIndex, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let entry = self.tree.get(index)?;
        self.stack.extend(entry.children().iter().rev().copied());
        Some((index, entry))
    }
}
