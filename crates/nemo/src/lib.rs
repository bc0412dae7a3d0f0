//! Directory snapshot indexing and search library.
//!
//! This crate provides the core of a file-name search tool:
//! - Parallel directory walks that build an arena-backed snapshot tree
//! - A compact line-oriented text codec for persisting snapshots
//! - Term filters (substring, wildcard, phonetic, approximate, regex)
//! - Capped, cancellable search and path-scoped browsing
//! - A store catalog and JSON configuration

pub mod cancel;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod indexer;
pub mod query;
pub mod search;
pub mod storage;
pub mod store;
pub mod types;

// Re-export main types
pub use cancel::CancellationToken;
pub use catalog::{Catalog, StoreInfo};
pub use config::{IndexConfig, SearchPreferences, SearchScope};
pub use error::{NemoError, Result};
pub use indexer::{build_snapshot, IndexBuildProgress, InclusionRules};
pub use query::{FilterKind, TermFilter};
pub use search::{
    browse_segments, directory_tree, list_file_children, search, search_snapshot_files,
    DirectoryNode, SnapshotManager, TaskHandle,
};
pub use storage::{Entry, EntryIndex, EntryMetadata, EntryTree};
pub use store::Snapshot;
pub use types::{Match, SortColumn, SortDirection, SortSpec};
