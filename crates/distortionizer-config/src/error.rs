use std::path::PathBuf;

use distortionizer_session::SessionError;
use thiserror::Error;

/// Errors raised while reading or writing calibration and settings files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Load requested but the file does not exist.
    #[error("config file not found: {}", path.display())]
    MissingConfigFile { path: PathBuf },

    /// The document is missing an expected field or holds a value of the
    /// wrong type. Nothing has been applied.
    #[error("malformed config record: `{field}` {reason}")]
    MalformedConfigRecord { field: String, reason: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("session rejected record: {0}")]
    Session(#[from] SessionError),
}

impl ConfigError {
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::MalformedConfigRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
