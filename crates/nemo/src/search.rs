//! Search and browsing over snapshots.
//!
//! This module provides:
//! - Name search across one or more snapshots, capped and cancellable
//! - Path-scoped listing of file children for a browse pane
//! - The SnapshotManager API that runs builds and searches off-thread

mod browse;
mod engine;
mod manager;

pub use browse::{browse_segments, directory_tree, list_file_children, DirectoryNode};
pub use engine::{search, search_snapshot_files};
pub use manager::{SnapshotManager, TaskHandle};
