//! Registry error types.

use std::path::PathBuf;

/// Errors that can occur while discovering, archiving or storing modules.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// No archive is stored under the computed key.
    #[error("module not found: {key}")]
    NotFound { key: String },

    /// An archive is already stored for this identity.
    #[error("module already exists: {key}")]
    AlreadyExists { key: String },

    /// A required identity field is missing or malformed.
    #[error("validation failed: {detail}")]
    Validation { detail: String },

    /// A module descriptor could not be parsed.
    #[error("invalid module spec {path}: {detail}")]
    InvalidSpec { path: PathBuf, detail: String },

    /// The directory to archive does not exist.
    #[error("archive source not found: {path}")]
    ArchiveSourceNotFound { path: PathBuf },

    /// Walking or copying the module tree failed.
    #[error("failed to archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the archive to the backend failed.
    #[error("upload of {key} failed: {detail}")]
    UploadFailed { key: String, detail: String },

    /// A semantic version or range expression could not be parsed.
    #[error("invalid version constraint input '{input}': {source}")]
    ConstraintParse {
        input: String,
        #[source]
        source: semver::Error,
    },

    /// The regex version constraint does not compile.
    #[error("invalid version regex: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A stored key does not follow the registry layout.
    #[error("failed to decode module key '{key}'")]
    KeyDecode { key: String },

    /// The version recorded in a stored key disagrees with the requested one.
    #[error("key {key} encodes {found}, expected {expected}")]
    KeyMismatch {
        key: String,
        expected: String,
        found: String,
    },

    /// The storage backend reported an error.
    #[error("storage error at {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: object_store::Error,
    },

    /// The backend configuration is incomplete.
    #[error("registry configuration error: {detail}")]
    Config { detail: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Whether this error only signals that an identity is not stored.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
