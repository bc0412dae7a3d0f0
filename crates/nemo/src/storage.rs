//! Storage layer for snapshot trees.
//!
//! This module provides the in-memory tree primitives:
//! - Compact arena indices
//! - Entry records with filesystem metadata
//! - The arena-owned tree with parent indices for path reconstruction

mod index_types;
mod node;
mod tree;

pub use index_types::EntryIndex;
pub use node::{Entry, EntryMetadata, UNKNOWN};
pub use tree::{EntryTree, Preorder};
