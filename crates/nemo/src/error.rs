use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NemoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Malformed snapshot record at line {line}: {reason}")]
    Decode { line: usize, reason: String },

    #[error("Failed to load snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: Box<NemoError>,
    },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation already in flight for store '{0}'")]
    Busy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, NemoError>;

impl NemoError {
    /// Creates a decode error for a 1-based line number.
    pub fn decode(line: usize, reason: impl Into<String>) -> Self {
        Self::Decode {
            line,
            reason: reason.into(),
        }
    }

    /// An I/O error on a known file.
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Attaches the snapshot file path to an error raised while loading it.
    pub fn in_snapshot(self, path: impl Into<PathBuf>) -> Self {
        Self::Snapshot {
            path: path.into(),
            source: Box::new(self),
        }
    }
}
