//! Error types for the document store, authentication and registration.

use thiserror::Error;

/// Failures raised by the storage medium or while decoding stored collections.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The value stored under `key` is not a valid JSON sequence of the expected entity.
    #[error("malformed data stored under '{key}': {reason}")]
    MalformedStoredData { key: String, reason: String },

    #[error("failed to write '{key}': {reason}")]
    StorageWriteFailure { key: String, reason: String },

    #[error("failed to read '{key}': {reason}")]
    StorageReadFailure { key: String, reason: String },

    /// The medium refused a write because it would exceed its quota.
    #[error("storage quota exceeded writing '{key}' ({needed} bytes needed, {quota} allowed)")]
    QuotaExceeded { key: String, needed: usize, quota: usize },

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    /// A field update would leave the record in a shape its entity type rejects.
    #[error("invalid value for field '{field}' on record '{id}': {reason}")]
    InvalidFieldValue { id: String, field: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] lmdb::Error),
}

/// Reasons a login attempt is rejected. Surfaced to the caller for field-level display.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No account found with this email")]
    UnknownEmail,

    #[error("Incorrect password")]
    WrongPassword,

    /// The configured session lifetime is not positive or overflows the clock.
    #[error("session lifetime of {0} hours is out of range")]
    InvalidSessionTtl(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("An account with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type StoreResult<T> = Result<T, StoreError>;
