//! Index configuration.
//!
//! Stored as JSON. Every field has a default, so a partial file (or no file
//! at all) still yields a usable configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NemoError, Result};
use crate::indexer::InclusionRules;
use crate::query::{FilterKind, TermFilter, DEFAULT_APPROXIMATE_THRESHOLD};

pub const INDEX_CONFIG_FILENAME: &str = "nemo.json";

/// Default result cap for searches.
pub const DEFAULT_MAX_RESULTS: usize = 500;

/// Number of past queries kept in [`SearchPreferences::recent`].
pub const MAX_RECENT_SEARCHES: usize = 20;

/// Which kinds of entries a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    Both,
    Files,
    Directories,
}

impl SearchScope {
    pub fn includes_files(self) -> bool {
        matches!(self, Self::Both | Self::Files)
    }

    pub fn includes_directories(self) -> bool {
        matches!(self, Self::Both | Self::Directories)
    }
}

/// The last search settings, restored when the application starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPreferences {
    pub scope: SearchScope,
    pub filter: FilterKind,
    pub case_sensitive: bool,
    /// Whether [`IndexConfig::max_results`] caps searches at all.
    pub limit_results: bool,
    /// Past queries, most recent first.
    pub recent: Vec<String>,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        Self {
            scope: SearchScope::default(),
            filter: FilterKind::default(),
            case_sensitive: false,
            limit_results: true,
            recent: Vec::new(),
        }
    }
}

impl SearchPreferences {
    /// Moves `query` to the front of the history, dropping the oldest entry
    /// once the list is full. Blank queries are not recorded.
    pub fn record_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.recent.retain(|past| past != query);
        self.recent.insert(0, query.to_string());
        self.recent.truncate(MAX_RECENT_SEARCHES);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding the `.ser` snapshot files.
    pub index_dir: PathBuf,
    /// Directory names skipped during a build (case-insensitive).
    pub excluded_dir_names: Vec<String>,
    /// Directory name prefixes skipped during a build (case-insensitive).
    pub excluded_dir_prefixes: Vec<String>,
    /// File name suffixes skipped during a build (case-insensitive).
    pub excluded_file_suffixes: Vec<String>,
    /// Maximum edit distance for approximate matching.
    pub approximate_threshold: usize,
    /// Result cap used when the caller does not pass one.
    pub max_results: usize,
    pub search: SearchPreferences,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let rules = InclusionRules::default();
        Self {
            index_dir: PathBuf::from("index"),
            excluded_dir_names: rules.excluded_dir_names,
            excluded_dir_prefixes: rules.excluded_dir_prefixes,
            excluded_file_suffixes: rules.excluded_file_suffixes,
            approximate_threshold: DEFAULT_APPROXIMATE_THRESHOLD,
            max_results: DEFAULT_MAX_RESULTS,
            search: SearchPreferences::default(),
        }
    }
}

impl IndexConfig {
    /// Loads the config at `path`, or returns the defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|error| {
            NemoError::Config(format!("failed to parse {}: {error}", path.display()))
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|error| NemoError::Config(format!("failed to encode config: {error}")))?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        Ok(())
    }

    /// Builder inclusion rules derived from this config.
    pub fn inclusion_rules(&self) -> InclusionRules {
        InclusionRules::new(
            self.excluded_dir_names.clone(),
            self.excluded_dir_prefixes.clone(),
            self.excluded_file_suffixes.clone(),
        )
    }

    /// Builds a filter using the configured approximate-match threshold.
    pub fn term_filter(
        &self,
        kind: FilterKind,
        query: &str,
        case_sensitive: bool,
    ) -> Result<TermFilter> {
        TermFilter::with_threshold(kind, query, case_sensitive, self.approximate_threshold)
    }

    /// The result cap for searches that do not pass their own.
    pub fn result_cap(&self) -> usize {
        if self.search.limit_results {
            self.max_results
        } else {
            usize::MAX
        }
    }
}
