//! Error types for mutant-scan.

use thiserror::Error;

/// Default result type for mutant-scan.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors surfaced by the analysis service.
///
/// Malformed grids are not part of this enum: they are reported as a
/// negative verdict (or [`crate::Verdict::Invalid`]), never as a failure.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record store unavailable: {0}")]
    Store(String),

    #[error("Fingerprint error: {0}")]
    Fingerprint(#[from] crate::fingerprint::FingerprintError),

    #[error("{0}")]
    Other(String),
}

impl ScanError {
    /// Creates a generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Creates a configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }
}
