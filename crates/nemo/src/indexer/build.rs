//! Snapshot building and progress tracking.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use super::construct::construct_tree;
use super::rules::InclusionRules;
use super::walk::{walk_root, WalkData};
use crate::cancel::CancellationToken;
use crate::error::{NemoError, Result};
use crate::storage::EntryMetadata;
use crate::store::Snapshot;

/// Walks `root_dir` and builds a snapshot labelled `label`.
///
/// The root entry is named after `root_dir` exactly as given. Returns
/// `Ok(None)` if `cancel` fires before the walk finishes; nothing partial is
/// ever returned.
pub fn build_snapshot(
    label: &str,
    root_dir: &str,
    rules: &InclusionRules,
    cancel: &CancellationToken,
    progress: Option<&IndexBuildProgress>,
) -> Result<Option<Snapshot>> {
    let root_path = Path::new(root_dir);
    let metadata = match fs::metadata(root_path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(NemoError::PathNotFound(root_path.to_path_buf()))
        }
        Err(error) => return Err(error.into()),
    };
    if !metadata.is_dir() {
        return Err(NemoError::InvalidInput(format!(
            "'{root_dir}' is not a directory"
        )));
    }
    if has_line_break(label) || has_line_break(root_dir) {
        return Err(NemoError::InvalidInput(format!(
            "label '{}' and root '{}' must fit on one line",
            label.escape_debug(),
            root_dir.escape_debug()
        )));
    }

    if let Some(progress) = progress {
        progress.reset_for_build(unix_now_secs());
    }

    log::info!("indexing '{}' from {}", label, root_dir);
    let walk_start = Instant::now();
    let mut walk_data = WalkData::new(rules, cancel);
    if let Some(progress) = progress {
        walk_data = walk_data.with_progress(progress);
    }
    let Some(root) = walk_root(
        root_path,
        root_dir,
        EntryMetadata::from_fs_metadata(&metadata),
        &walk_data,
    ) else {
        log::info!("indexing '{}' cancelled after {:?}", label, walk_start.elapsed());
        return Ok(None);
    };
    let walk_elapsed = walk_start.elapsed();

    let construct_start = Instant::now();
    let tree = construct_tree(&root)?;
    log::info!(
        "indexed '{}': {} entries (walk {:?}, construct {:?})",
        label,
        tree.len(),
        walk_elapsed,
        construct_start.elapsed()
    );

    if let Some(progress) = progress {
        progress.mark_finished(unix_now_secs());
    }

    Ok(Some(Snapshot::with_tree(label, root_dir, tree)))
}

/// Progress counters for an index build, readable while the build runs.
#[derive(Debug, Default)]
pub struct IndexBuildProgress {
    pub scanned_files: AtomicUsize,
    pub scanned_dirs: AtomicUsize,
    /// Directories that could not be listed and were recorded without children.
    pub unreadable_dirs: AtomicUsize,
    /// Entries left out because their name cannot be stored in a snapshot.
    pub skipped_entries: AtomicUsize,
    pub started_at: AtomicU64,
    pub finished_at: AtomicU64,
}

impl IndexBuildProgress {
    /// Resets progress for a new build.
    pub fn reset_for_build(&self, started_at: u64) {
        self.scanned_files.store(0, Ordering::Relaxed);
        self.scanned_dirs.store(0, Ordering::Relaxed);
        self.unreadable_dirs.store(0, Ordering::Relaxed);
        self.skipped_entries.store(0, Ordering::Relaxed);
        self.started_at.store(started_at, Ordering::Relaxed);
        self.finished_at.store(0, Ordering::Relaxed);
    }

    pub fn mark_finished(&self, finished_at: u64) {
        self.finished_at.store(finished_at, Ordering::Relaxed);
    }

    /// Takes a snapshot of the progress values.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            scanned_files: self.scanned_files.load(Ordering::Relaxed),
            scanned_dirs: self.scanned_dirs.load(Ordering::Relaxed),
            unreadable_dirs: self.unreadable_dirs.load(Ordering::Relaxed),
            skipped_entries: self.skipped_entries.load(Ordering::Relaxed),
            started_at: zero_to_none(self.started_at.load(Ordering::Relaxed)),
            finished_at: zero_to_none(self.finished_at.load(Ordering::Relaxed)),
        }
    }
}

/// A snapshot of build progress values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub scanned_files: usize,
    pub scanned_dirs: usize,
    pub unreadable_dirs: usize,
    pub skipped_entries: usize,
    pub started_at: Option<u64>,
    pub finished_at: Option<u64>,
}

/// Returns the current Unix timestamp in seconds.
pub fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs())
        .unwrap_or(0)
}

/// Returns the current Unix timestamp in milliseconds.
pub fn unix_now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|value| i64::try_from(value.as_millis()).ok())
        .unwrap_or(0)
}

/// Snapshot records are one line each, so stored text cannot contain line breaks.
pub(crate) fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}

fn zero_to_none(value: u64) -> Option<u64> {
    if value == 0 {
        None
    } else {
        Some(value)
    }
}
