//! Path-scoped browsing of a decoded snapshot.

use serde::Serialize;

use super::engine::entry_match;
use crate::storage::{EntryIndex, EntryTree};
use crate::store::Snapshot;
use crate::types::Match;

/// Lists the file children of the directory reached by `segments`.
///
/// With no segments (or an empty list) the root's file children are
/// returned. Each segment selects a child directory by exact,
/// case-sensitive name; a missing segment yields an empty list.
pub fn list_file_children<S: AsRef<str>>(
    store: Option<&Snapshot>,
    segments: Option<&[S]>,
) -> Vec<Match> {
    let Some(store) = store else {
        return Vec::new();
    };
    let Some(tree) = store.tree() else {
        return Vec::new();
    };

    let mut current = tree.root();
    for segment in segments.unwrap_or_default() {
        match tree.child_directory(current, segment.as_ref()) {
            Some(child) => current = child,
            None => return Vec::new(),
        }
    }

    tree.children(current)
        .filter(|(_, entry)| !entry.is_directory())
        .map(|(index, _)| entry_match(tree, index, store.name()))
        .collect()
}

/// A directory in the browse tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    pub name: String,
    pub children: Vec<DirectoryNode>,
}

/// Directory-only view of a snapshot, one node per child directory of the root.
pub fn directory_tree(store: &Snapshot) -> Vec<DirectoryNode> {
    store
        .tree()
        .map(|tree| directory_children(tree, tree.root()))
        .unwrap_or_default()
}

fn directory_children(tree: &EntryTree, index: EntryIndex) -> Vec<DirectoryNode> {
    tree.children(index)
        .filter(|(_, entry)| entry.is_directory())
        .map(|(child, entry)| DirectoryNode {
            name: entry.name().to_string(),
            children: directory_children(tree, child),
        })
        .collect()
}

/// Segments leading from the snapshot root to the directory that shows `result`.
///
/// For a file that is its parent directory; a directory match also appends
/// its own name. Returns `None` if the match does not lie under `root_path`.
pub fn browse_segments(root_path: &str, result: &Match) -> Option<Vec<String>> {
    let relative = result.parent_path.strip_prefix(root_path)?;
    let on_boundary = relative.is_empty()
        || relative.starts_with(['/', '\\'])
        || root_path.ends_with(['/', '\\']);
    if !on_boundary {
        return None;
    }
    let mut segments: Vec<String> = relative
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    if result.is_directory {
        segments.push(result.name.clone());
    }
    Some(segments)
}
