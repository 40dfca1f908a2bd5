use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing or loading the on-disk index. Every variant
/// names the file involved.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("invalid index format in {}: {reason}", .path.display())]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("unexpected end of file in {} while reading {what}", .path.display())]
    Truncated { path: PathBuf, what: &'static str },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;
