//! Error types for image trust operations.
//!
//! All errors are strongly typed and propagated without panicking.
//! Key material is never included in error messages.

/// Trust error types covering resolution, revocation, and repository access.
#[derive(Debug, thiserror::Error)]
pub enum TrustError {
    #[error("No trust data for {0}")]
    NoSuchTrustData(String),

    #[error("no valid signing keys for delegation roles")]
    NoSigningKeysForDelegations,

    #[error("{0}")]
    InvalidReference(String),

    #[error("failed to publish trust data for {reference}: {source}")]
    PublishFailed {
        reference: String,
        #[source]
        source: Box<TrustError>,
    },

    #[error("{source}")]
    Repository {
        reference: String,
        #[source]
        source: Box<TrustError>,
    },

    #[error("Invalid role name: {0}")]
    InvalidRoleName(String),

    #[error("Invalid key id: {0}")]
    InvalidKeyId(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Role not found: {0}")]
    UnknownRole(String),

    #[error("{0} does not have trust data")]
    NotInitialized(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrustError {
    /// Tag a repository error with the artifact reference it was raised for.
    ///
    /// Errors that belong to the revocation taxonomy are returned unchanged
    /// so callers can still match on them; everything else is wrapped in
    /// [`TrustError::Repository`].
    pub fn in_context(self, reference: &str) -> Self {
        match self {
            Self::NoSuchTrustData(_)
            | Self::NoSigningKeysForDelegations
            | Self::InvalidReference(_)
            | Self::PublishFailed { .. }
            | Self::Repository { .. } => self,
            other => Self::Repository {
                reference: reference.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, TrustError>;
