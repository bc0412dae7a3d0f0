//! Term filters applied to entry names.

use std::fmt;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::phonetic::soundex;
use super::wildcard::wildcard_matches;
use crate::error::{NemoError, Result};

/// Default maximum edit distance for [`FilterKind::Approximate`].
pub const DEFAULT_APPROXIMATE_THRESHOLD: usize = 3;

/// The matching strategy selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Contains,
    ContainsAll,
    Wildcard,
    Phonetic,
    Approximate,
    Regex,
}

impl FilterKind {
    /// Every kind, in menu order.
    pub const ALL: [FilterKind; 6] = [
        Self::Contains,
        Self::ContainsAll,
        Self::Wildcard,
        Self::Phonetic,
        Self::Approximate,
        Self::Regex,
    ];

    /// Maps a menu position to a kind, clamping out-of-range values.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Contains => "Contains",
            Self::ContainsAll => "Contains All",
            Self::Wildcard => "Wildcard",
            Self::Phonetic => "Sounds Like",
            Self::Approximate => "Similar",
            Self::Regex => "Regex",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A compiled name filter.
///
/// Case folding and pattern compilation happen once in [`TermFilter::new`];
/// [`TermFilter::matches`] only folds the candidate.
#[derive(Debug, Clone)]
pub enum TermFilter {
    /// An empty query; matches every candidate.
    Any,
    Contains {
        needle: String,
        case_sensitive: bool,
    },
    ContainsAll {
        tokens: Vec<String>,
        case_sensitive: bool,
    },
    Wildcard {
        pattern: String,
        case_sensitive: bool,
    },
    Phonetic {
        code: String,
    },
    Approximate {
        term: String,
        threshold: usize,
        case_sensitive: bool,
    },
    Regex(Regex),
}

impl TermFilter {
    /// Builds a filter of `kind` for `query`.
    ///
    /// Fails only for an invalid regular expression.
    pub fn new(kind: FilterKind, query: &str, case_sensitive: bool) -> Result<Self> {
        Self::with_threshold(kind, query, case_sensitive, DEFAULT_APPROXIMATE_THRESHOLD)
    }

    /// Like [`TermFilter::new`], with an explicit edit-distance threshold for
    /// approximate matching.
    pub fn with_threshold(
        kind: FilterKind,
        query: &str,
        case_sensitive: bool,
        threshold: usize,
    ) -> Result<Self> {
        if query.is_empty() {
            return Ok(Self::Any);
        }

        let folded = fold_case(query, case_sensitive);
        let filter = match kind {
            FilterKind::Contains => Self::Contains {
                needle: folded,
                case_sensitive,
            },
            FilterKind::ContainsAll => Self::ContainsAll {
                tokens: folded.split_whitespace().map(str::to_string).collect(),
                case_sensitive,
            },
            FilterKind::Wildcard => Self::Wildcard {
                pattern: folded,
                case_sensitive,
            },
            FilterKind::Phonetic => Self::Phonetic {
                code: soundex(query),
            },
            FilterKind::Approximate => Self::Approximate {
                term: folded,
                threshold,
                case_sensitive,
            },
            FilterKind::Regex => {
                let regex = RegexBuilder::new(query)
                    .case_insensitive(!case_sensitive)
                    .build()
                    .map_err(|source| NemoError::InvalidPattern {
                        pattern: query.to_string(),
                        source,
                    })?;
                Self::Regex(regex)
            }
        };
        Ok(filter)
    }

    /// Returns true if `candidate` satisfies the filter.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Contains {
                needle,
                case_sensitive,
            } => fold_case(candidate, *case_sensitive).contains(needle.as_str()),
            Self::ContainsAll {
                tokens,
                case_sensitive,
            } => {
                let candidate = fold_case(candidate, *case_sensitive);
                tokens.iter().all(|token| candidate.contains(token.as_str()))
            }
            Self::Wildcard {
                pattern,
                case_sensitive,
            } => wildcard_matches(pattern, &fold_case(candidate, *case_sensitive)),
            Self::Phonetic { code } => soundex(candidate) == *code,
            Self::Approximate {
                term,
                threshold,
                case_sensitive,
            } => strsim::levenshtein(term, &fold_case(candidate, *case_sensitive)) <= *threshold,
            Self::Regex(regex) => regex.is_match(candidate),
        }
    }
}

fn fold_case(value: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        value.to_string()
    } else {
        value.to_lowercase()
    }
}
