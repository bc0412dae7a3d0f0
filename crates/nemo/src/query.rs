//! Name matching for snapshot search.
//!
//! This module provides the term filters used by search:
//! - Substring and all-tokens matching
//! - Anchored `*`/`?` wildcards
//! - Soundex ("sounds like") and edit-distance ("similar") matching
//! - Regular expressions

mod filter;
mod phonetic;
mod wildcard;

pub use filter::{FilterKind, TermFilter, DEFAULT_APPROXIMATE_THRESHOLD};
pub use phonetic::soundex;
pub use wildcard::wildcard_matches;
