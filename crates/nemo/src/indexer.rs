//! Snapshot building.
//!
//! This module turns a directory on disk into a [`Snapshot`](crate::Snapshot):
//! - Walking the filesystem in parallel to build a node tree
//! - Applying the inclusion rules to every descendant of the root
//! - Constructing the arena-backed entry tree

mod build;
mod construct;
mod rules;
mod walk;

pub use build::{
    build_snapshot, unix_now_millis, unix_now_secs, IndexBuildProgress, ProgressSnapshot,
};
pub(crate) use build::has_line_break;
pub use rules::InclusionRules;
