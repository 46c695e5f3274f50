//! Error types for snapshot loading and selector parsing

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LineageError {
    #[error("failed to read snapshot {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

pub type Result<T> = std::result::Result<T, LineageError>;
