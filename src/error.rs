//! Error types
//!
//! `ApiError` is the taxonomy surfaced to callers of the dictionary store, transfer and
//! settings operations. `StorageError` covers failures of the underlying persistence
//! primitives and collapses into `ApiError::StorageUnavailable` at the store boundary.

use thiserror::Error;

/// Errors from the persistence primitives (storage areas, sled, filesystem)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Embedded database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage area {area} exceeds platform quota: {size} bytes > {quota} bytes")]
    PlatformQuota { area: String, size: u64, quota: u64 },

    #[error("Corrupt data in {location}: {reason}")]
    Corrupt { location: String, reason: String },
}

/// Public error taxonomy
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown backend identifier passed to backend selection
    #[error("Invalid backend: {0} (expected one of: sync, local, embedded)")]
    InvalidBackend(String),

    /// Serialized dictionary does not fit a capped backend
    #[error("Data too large for {backend} backend: {size} bytes exceeds limit of {limit} bytes")]
    QuotaExceeded {
        backend: String,
        size: u64,
        limit: u64,
    },

    /// Platform-level persistence failure
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// Import file failed shape validation
    #[error("Malformed import: {0}")]
    MalformedImport(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Document error: {0}")]
    Document(#[from] DomError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

/// Errors from document tree access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("Node {0} is no longer part of the document")]
    StaleNode(String),

    #[error("Node {0} is not a text node")]
    NotText(String),

    #[error("Node {0} cannot have children")]
    NotElement(String),

    #[error("Node {0} cannot be inserted there")]
    HierarchyRequest(String),

    #[error("Body element cannot be removed")]
    RemoveBody,
}
