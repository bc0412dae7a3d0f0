//! SnapshotManager - runs builds and searches on worker threads.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use super::engine::search_snapshot_files;
use crate::cancel::CancellationToken;
use crate::codec::{load_snapshot_file, save_snapshot};
use crate::config::{IndexConfig, DEFAULT_MAX_RESULTS};
use crate::error::{NemoError, Result};
use crate::indexer::{build_snapshot, IndexBuildProgress, InclusionRules, ProgressSnapshot};
use crate::query::TermFilter;
use crate::store::{sanitize_label, snapshot_path, Snapshot};
use crate::types::Match;

/// A build or search running on a worker thread.
pub struct TaskHandle<T> {
    join: JoinHandle<Result<Option<T>>>,
    cancel: CancellationToken,
    progress: Option<Arc<IndexBuildProgress>>,
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.join.is_finished())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl<T> TaskHandle<T> {
    /// Requests cancellation. The worker stops at its next check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Progress counters, for builds.
    pub fn progress(&self) -> Option<ProgressSnapshot> {
        self.progress.as_ref().map(|progress| progress.snapshot())
    }

    /// Waits for the worker. `Ok(None)` means the task was cancelled.
    pub fn join(self) -> Result<Option<T>> {
        self.join
            .join()
            .map_err(|_| NemoError::Internal("worker thread panicked".to_string()))?
    }
}

/// Snapshots with a task in flight, keyed by [`in_flight_key`].
type InFlight = Arc<Mutex<HashSet<String>>>;

/// Labels that map to the same snapshot file share a key.
fn in_flight_key(label: &str) -> String {
    sanitize_label(label).to_lowercase()
}

/// Releases its labels when the task finishes, including on panic.
struct InFlightGuard {
    registry: InFlight,
    keys: Vec<String>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut registry = self.registry.lock();
        for key in &self.keys {
            registry.remove(key);
        }
    }
}

/// Builds and searches snapshots stored in one index directory.
///
/// At most one task may be in flight per snapshot file; starting a second
/// one, under any label that maps to the same file, fails with
/// [`NemoError::Busy`].
#[derive(Debug)]
pub struct SnapshotManager {
    index_dir: PathBuf,
    rules: InclusionRules,
    max_results: usize,
    in_flight: InFlight,
}

impl SnapshotManager {
    pub fn new(index_dir: impl Into<PathBuf>, rules: InclusionRules) -> Self {
        Self {
            index_dir: index_dir.into(),
            rules,
            max_results: DEFAULT_MAX_RESULTS,
            in_flight: Arc::default(),
        }
    }

    pub fn from_config(config: &IndexConfig) -> Self {
        Self {
            max_results: config.result_cap(),
            ..Self::new(config.index_dir.clone(), config.inclusion_rules())
        }
    }

    /// Cap applied to searches that do not pass their own.
    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    /// Location of the snapshot file for `label`.
    pub fn snapshot_path(&self, label: &str) -> PathBuf {
        snapshot_path(&self.index_dir, label)
    }

    /// Pairs each label with its snapshot file.
    pub fn snapshot_files<S: AsRef<str>>(&self, labels: &[S]) -> Vec<(String, PathBuf)> {
        labels
            .iter()
            .map(|label| (label.as_ref().to_string(), self.snapshot_path(label.as_ref())))
            .collect()
    }

    pub fn is_busy(&self, label: &str) -> bool {
        self.in_flight.lock().contains(&in_flight_key(label))
    }

    /// Loads the snapshot file for `label` on the calling thread.
    pub fn load(&self, label: &str) -> Result<Snapshot> {
        let path = self.snapshot_path(label);
        load_snapshot_file(&path).inspect_err(|error| {
            log::warn!("failed to load snapshot '{}': {}", label, error);
        })
    }

    /// Indexes `root_dir` under `label` on a worker thread.
    ///
    /// The snapshot file is written only if the build completes; a cancelled
    /// build leaves any previous file untouched.
    pub fn build_in_background(
        &self,
        label: &str,
        root_dir: impl Into<String>,
    ) -> Result<TaskHandle<Snapshot>> {
        self.build_with_cancel(label, root_dir, CancellationToken::new())
    }

    /// Like [`SnapshotManager::build_in_background`], stopping when `cancel` fires.
    pub fn build_with_cancel(
        &self,
        label: &str,
        root_dir: impl Into<String>,
        cancel: CancellationToken,
    ) -> Result<TaskHandle<Snapshot>> {
        let guard = self.reserve(&[label])?;
        let progress = Arc::new(IndexBuildProgress::default());

        let label = label.to_string();
        let root_dir = root_dir.into();
        let index_dir = self.index_dir.clone();
        let rules = self.rules.clone();
        let worker_cancel = cancel.clone();
        let worker_progress = progress.clone();

        let join = thread::Builder::new()
            .name(format!("nemo-build-{label}"))
            .spawn(move || -> Result<Option<Snapshot>> {
                let _guard = guard;
                let Some(snapshot) = build_snapshot(
                    &label,
                    &root_dir,
                    &rules,
                    &worker_cancel,
                    Some(&*worker_progress),
                )?
                else {
                    return Ok(None);
                };
                save_snapshot(&index_dir, &snapshot)?;
                Ok(Some(snapshot))
            })?;

        Ok(TaskHandle {
            join,
            cancel,
            progress: Some(progress),
        })
    }

    /// Searches the given `(label, path)` snapshot files on a worker thread.
    ///
    /// `max_results` falls back to the manager's configured cap.
    pub fn search_in_background(
        &self,
        files: Vec<(String, PathBuf)>,
        filter: TermFilter,
        include_files: bool,
        include_directories: bool,
        max_results: Option<usize>,
    ) -> Result<TaskHandle<Vec<Match>>> {
        let max_results = max_results.unwrap_or(self.max_results);
        let labels: Vec<&str> = files.iter().map(|(label, _)| label.as_str()).collect();
        let guard = self.reserve(&labels)?;
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        let join = thread::Builder::new()
            .name("nemo-search".to_string())
            .spawn(move || {
                let _guard = guard;
                search_snapshot_files(
                    &files,
                    &filter,
                    include_files,
                    include_directories,
                    max_results,
                    &worker_cancel,
                )
                .inspect_err(|error| log::warn!("search failed: {}", error))
            })?;

        Ok(TaskHandle {
            join,
            cancel,
            progress: None,
        })
    }

    /// Marks every label as in flight, or none of them if one is taken.
    fn reserve(&self, labels: &[&str]) -> Result<InFlightGuard> {
        let keys: Vec<String> = labels.iter().map(|label| in_flight_key(label)).collect();
        let mut registry = self.in_flight.lock();
        if let Some(index) = keys.iter().position(|key| registry.contains(key)) {
            return Err(NemoError::Busy(labels[index].to_string()));
        }
        registry.extend(keys.iter().cloned());
        drop(registry);

        Ok(InFlightGuard {
            registry: self.in_flight.clone(),
            keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterKind;
    use std::fs::{self, File};
    use tempfile::TempDir;

    fn manager(temp: &TempDir) -> SnapshotManager {
        SnapshotManager::new(temp.path().join("index"), InclusionRules::default())
    }

    fn source_dir(temp: &TempDir) -> String {
        let source = temp.path().join("source");
        fs::create_dir_all(source.join("docs")).unwrap();
        File::create(source.join("docs/report.txt")).unwrap();
        File::create(source.join("readme.md")).unwrap();
        source.to_string_lossy().into_owned()
    }

    #[test]
    fn build_writes_snapshot_file() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        let handle = manager
            .build_in_background("My Docs", source_dir(&temp))
            .unwrap();
        let snapshot = handle.join().unwrap().unwrap();

        assert_eq!(snapshot.entry_count(), 4);
        let path = manager.snapshot_path("My Docs");
        assert!(path.ends_with("My-Docs.ser"));
        assert!(path.exists());
        assert_eq!(manager.load("My Docs").unwrap().entry_count(), 4);
        assert!(!manager.is_busy("My Docs"));
    }

    #[test]
    fn build_error_is_reported_through_join() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        let missing = temp.path().join("missing").to_string_lossy().into_owned();
        let handle = manager.build_in_background("Gone", missing).unwrap();
        assert!(matches!(handle.join(), Err(NemoError::PathNotFound(_))));
        assert!(!manager.snapshot_path("Gone").exists());
    }

    #[test]
    fn second_task_for_same_label_is_busy() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        let guard = manager.reserve(&["Work"]).unwrap();

        assert!(manager.is_busy("work"));
        assert!(matches!(
            manager.build_in_background("WORK", source_dir(&temp)),
            Err(NemoError::Busy(_))
        ));
        let filter = TermFilter::new(FilterKind::Contains, "", false).unwrap();
        let files = manager.snapshot_files(&["Other", "Work"]);
        assert!(matches!(
            manager.search_in_background(files, filter, true, true, Some(10)),
            Err(NemoError::Busy(label)) if label == "Work"
        ));
        // A rejected reservation must not leave "Other" behind.
        assert!(!manager.is_busy("Other"));

        drop(guard);
        assert!(!manager.is_busy("Work"));
        let handle = manager.build_in_background("Work", source_dir(&temp)).unwrap();
        assert!(handle.join().unwrap().is_some());
    }

    #[test]
    fn search_runs_in_background() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        manager
            .build_in_background("Work", source_dir(&temp))
            .unwrap()
            .join()
            .unwrap()
            .unwrap();

        let filter = TermFilter::new(FilterKind::Wildcard, "*.txt", false).unwrap();
        let files = manager.snapshot_files(&["Work"]);
        let handle = manager
            .search_in_background(files, filter, true, false, None)
            .unwrap();
        let results = handle.join().unwrap().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "report.txt");
        assert_eq!(results[0].volume, "Work");
    }

    #[test]
    fn labels_sharing_a_snapshot_file_are_busy() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        assert_eq!(manager.snapshot_path("a b"), manager.snapshot_path("a-b"));

        let _guard = manager.reserve(&["a b"]).unwrap();
        assert!(manager.is_busy("A-B"));
        assert!(matches!(
            manager.reserve(&["a-b"]),
            Err(NemoError::Busy(label)) if label == "a-b"
        ));
        assert!(!manager.is_busy("ab"));
    }

    #[test]
    fn cancelled_build_keeps_previous_file() {
        let temp = TempDir::new().unwrap();
        let manager = manager(&temp);
        let source = source_dir(&temp);
        manager
            .build_in_background("Docs", source.clone())
            .unwrap()
            .join()
            .unwrap()
            .unwrap();
        let path = manager.snapshot_path("Docs");
        let before = fs::read_to_string(&path).unwrap();

        File::create(temp.path().join("source/added.txt")).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let handle = manager
            .build_with_cancel("Docs", source.clone(), cancel.clone())
            .unwrap();
        assert!(handle.join().unwrap().is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        let handle = manager.build_with_cancel("Fresh", source, cancel).unwrap();
        assert!(handle.join().unwrap().is_none());
        assert!(!manager.snapshot_path("Fresh").exists());
        assert!(!manager.is_busy("Fresh"));
    }

    #[test]
    fn search_cap_defaults_from_config() {
        let temp = TempDir::new().unwrap();
        let config = IndexConfig {
            index_dir: temp.path().join("index"),
            max_results: 1,
            ..IndexConfig::default()
        };
        let manager = SnapshotManager::from_config(&config);
        assert_eq!(manager.max_results(), 1);
        manager
            .build_in_background("Work", source_dir(&temp))
            .unwrap()
            .join()
            .unwrap()
            .unwrap();

        let filter = config.term_filter(FilterKind::Contains, "", false).unwrap();
        let files = manager.snapshot_files(&["Work"]);
        let results = manager
            .search_in_background(files.clone(), filter.clone(), true, true, None)
            .unwrap()
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(results.len(), 1);

        let results = manager
            .search_in_background(files, filter, true, true, Some(10))
            .unwrap()
            .join()
            .unwrap()
            .unwrap();
        assert_eq!(results.len(), 3);
    }
}
