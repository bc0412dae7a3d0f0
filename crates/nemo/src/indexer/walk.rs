//! Filesystem walking that builds a tree structure.
//!
//! - Walk builds a `WalkNode` tree (not a flat list)
//! - Children are sorted case-insensitively by name before they are visited
//! - Subdirectories fan out over rayon; indexed collection keeps the order
//!
//! The tree is converted into an arena by `construct` afterwards.

use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;

use rayon::prelude::*;

use super::build::{has_line_break, IndexBuildProgress};
use super::rules::InclusionRules;
use crate::cancel::CancellationToken;
use crate::storage::EntryMetadata;

/// A node in the filesystem tree built during walking.
#[derive(Debug)]
pub struct WalkNode {
    /// Child nodes, in case-insensitive name order.
    pub children: Vec<WalkNode>,
    /// The bare name (the full path for the walk root).
    pub name: Box<str>,
    pub metadata: EntryMetadata,
}

impl WalkNode {
    fn leaf(name: Box<str>, metadata: EntryMetadata) -> Self {
        Self {
            children: Vec::new(),
            name,
            metadata,
        }
    }
}

/// Data shared by every step of one walk.
#[derive(Debug)]
pub struct WalkData<'a> {
    pub rules: &'a InclusionRules,
    pub cancel: &'a CancellationToken,
    pub progress: Option<&'a IndexBuildProgress>,
}

impl<'a> WalkData<'a> {
    pub fn new(rules: &'a InclusionRules, cancel: &'a CancellationToken) -> Self {
        Self {
            rules,
            cancel,
            progress: None,
        }
    }

    /// Sets the progress tracker.
    pub fn with_progress(mut self, progress: &'a IndexBuildProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    fn count_file(&self) {
        if let Some(progress) = self.progress {
            progress.scanned_files.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn count_dir(&self) {
        if let Some(progress) = self.progress {
            progress.scanned_dirs.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn count_unreadable(&self) {
        if let Some(progress) = self.progress {
            progress.unreadable_dirs.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn count_skipped(&self) {
        if let Some(progress) = self.progress {
            progress.skipped_entries.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Walks the directory at `root_path`, naming the root node `root_name`.
///
/// Returns `None` if cancelled. The root itself is always listed, whatever
/// its name; the inclusion rules only apply to its descendants.
pub fn walk_root(
    root_path: &Path,
    root_name: &str,
    metadata: EntryMetadata,
    walk_data: &WalkData,
) -> Option<WalkNode> {
    walk_data.cancel.check()?;
    walk_data.count_dir();
    walk_dir(root_path, root_name.into(), metadata, walk_data)
}

/// Lists one directory and recurses into its included children.
fn walk_dir(
    path: &Path,
    name: Box<str>,
    metadata: EntryMetadata,
    walk_data: &WalkData,
) -> Option<WalkNode> {
    let read_dir = match fs::read_dir(path) {
        Ok(iter) => iter,
        Err(error) => {
            // Can't list the directory; keep it without children.
            log::debug!("cannot list {}: {}", path.display(), error);
            walk_data.count_unreadable();
            return Some(WalkNode::leaf(name, metadata));
        }
    };

    let mut child_names: Vec<String> = read_dir
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    child_names.sort_by_cached_key(|child| child.to_lowercase());

    let children: Vec<WalkNode> = child_names
        .into_par_iter()
        .filter_map(|child_name| {
            walk_data.cancel.check()?;
            walk_child(&path.join(&child_name), child_name, walk_data)
        })
        .collect();

    // A cancelled walk may have dropped children; discard the whole subtree.
    walk_data.cancel.check()?;

    Some(WalkNode {
        children,
        name,
        metadata,
    })
}

/// Visits one child. Returns `None` for excluded or vanished entries, and on cancellation.
fn walk_child(path: &Path, name: String, walk_data: &WalkData) -> Option<WalkNode> {
    if has_line_break(&name) {
        log::debug!("skipping {:?}: name contains a line break", path);
        walk_data.count_skipped();
        return None;
    }

    // Symlinks are recorded, not followed.
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            log::debug!("skipping {}: {}", path.display(), error);
            return None;
        }
    };
    let is_directory = metadata.is_dir();
    if !walk_data.rules.includes(&name, is_directory) {
        return None;
    }

    let entry_metadata = EntryMetadata::from_fs_metadata(&metadata);
    if is_directory {
        walk_data.count_dir();
        walk_dir(path, name.into_boxed_str(), entry_metadata, walk_data)
    } else {
        walk_data.count_file();
        Some(WalkNode::leaf(name.into_boxed_str(), entry_metadata))
    }
}
