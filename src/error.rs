//! Error types

use crate::id::ParseError;
use crate::Version;

/// Error type for UUID generation, formatting and export.
///
/// Validation problems are not errors; they are reported as data in
/// [`ValidationResult`](crate::ValidationResult).
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Version string that no encoder handles
    #[error("unsupported UUID version: {0}")]
    UnsupportedVersion(String),

    /// Unknown textual format name
    #[error("unsupported UUID format: {0}")]
    UnsupportedFormat(String),

    /// Unknown export format name
    #[error("unsupported export format: {0}")]
    UnsupportedExportFormat(String),

    /// Unknown hash strategy name in configuration
    #[error("unsupported hash strategy: {0}")]
    UnsupportedHashStrategy(String),

    #[error("latency smoothing must be a number in (0, 1]: {0}")]
    InvalidLatencySmoothing(String),

    #[error("namespace is required for {0} UUIDs")]
    MissingNamespace(Version),

    #[error("name is required for {0} UUIDs")]
    MissingName(Version),

    /// Namespace that is not itself a UUID
    #[error("invalid namespace UUID: {0}")]
    InvalidNamespace(String),

    #[error("count must be at least 1")]
    InvalidCount,

    #[error("invalid UUID: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to serialize records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
