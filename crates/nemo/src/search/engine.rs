//! Name search over decoded snapshots.

use std::path::PathBuf;
use std::time::Instant;

use crate::cancel::CancellationToken;
use crate::codec::load_snapshot_file;
use crate::error::Result;
use crate::query::TermFilter;
use crate::storage::{EntryIndex, EntryTree};
use crate::store::Snapshot;
use crate::types::Match;

/// Builds the result record for one entry of `tree`.
pub(crate) fn entry_match(tree: &EntryTree, index: EntryIndex, volume: &str) -> Match {
    let entry = &tree[index];
    Match {
        name: entry.name().to_string(),
        last_modified: entry.last_modified(),
        size: entry.size(),
        parent_path: tree.parent_path(index),
        volume: volume.to_string(),
        is_directory: entry.is_directory(),
    }
}

/// Searches the names of every entry below each snapshot's root.
///
/// Only entries whose kind is requested are tested. `max_results` caps the
/// combined result count across all snapshots, and traversal stops as soon
/// as it is reached. Returns `None` if cancelled; partial results are
/// discarded.
pub fn search<'a, I>(
    stores: I,
    filter: &TermFilter,
    include_files: bool,
    include_directories: bool,
    max_results: usize,
    cancel: &CancellationToken,
) -> Option<Vec<Match>>
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    let mut results = Vec::new();
    if (!include_files && !include_directories) || max_results == 0 {
        return Some(results);
    }

    for store in stores {
        cancel.check()?;
        if results.len() >= max_results {
            break;
        }
        search_store(
            store,
            filter,
            include_files,
            include_directories,
            max_results,
            cancel,
            &mut results,
        )?;
    }

    Some(results)
}

/// Appends matches from one snapshot. Returns `None` if cancelled.
fn search_store(
    store: &Snapshot,
    filter: &TermFilter,
    include_files: bool,
    include_directories: bool,
    max_results: usize,
    cancel: &CancellationToken,
    results: &mut Vec<Match>,
) -> Option<()> {
    let Some(tree) = store.tree() else {
        return Some(());
    };

    // Pre-order, skipping the root itself.
    let mut stack: Vec<EntryIndex> = tree[tree.root()].children().iter().rev().copied().collect();
    while let Some(index) = stack.pop() {
        cancel.check()?;
        if results.len() >= max_results {
            break;
        }

        let entry = &tree[index];
        let wanted = if entry.is_directory() {
            include_directories
        } else {
            include_files
        };
        if wanted && filter.matches(entry.name()) {
            results.push(entry_match(tree, index, store.name()));
        }
        stack.extend(entry.children().iter().rev().copied());
    }

    Some(())
}

/// Loads each `(label, path)` snapshot file in turn and searches it.
///
/// Files are loaded one at a time so only one decoded tree is held at once.
/// A file that fails to load fails the whole search.
pub fn search_snapshot_files(
    files: &[(String, PathBuf)],
    filter: &TermFilter,
    include_files: bool,
    include_directories: bool,
    max_results: usize,
    cancel: &CancellationToken,
) -> Result<Option<Vec<Match>>> {
    let mut results = Vec::new();
    if (!include_files && !include_directories) || max_results == 0 {
        return Ok(Some(results));
    }

    let started = Instant::now();
    for (label, path) in files {
        if cancel.check().is_none() {
            return Ok(None);
        }
        if results.len() >= max_results {
            break;
        }

        log::debug!("searching '{}' from {}", label, path.display());
        let snapshot = load_snapshot_file(path)?;
        let found = search_store(
            &snapshot,
            filter,
            include_files,
            include_directories,
            max_results,
            cancel,
            &mut results,
        );
        if found.is_none() {
            return Ok(None);
        }
    }

    log::info!(
        "search over {} snapshot(s) found {} match(es) in {:?}",
        files.len(),
        results.len(),
        started.elapsed()
    );
    Ok(Some(results))
}
