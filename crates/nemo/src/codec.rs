//! Snapshot persistence.
//!
//! - `text` - the positional, length-prefixed line format
//! - `persistence` - atomic file writes and path-annotated loads

mod persistence;
mod text;

pub use persistence::{load_snapshot_file, save_snapshot, write_snapshot_file};
pub use text::{decode, encode};
