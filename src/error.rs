use std::path::PathBuf;

/// Errors surfaced by the maintenance cycle and the GPS stream.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Reading, truncating or rewriting a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed at the stream level (not a single malformed row).
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Writing to the GPS output stream failed, usually because the reader went away.
    #[error("GPS stream write failed: {0}")]
    Stream(#[source] std::io::Error),
}

impl BridgeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BridgeError::Io { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        BridgeError::Csv { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
