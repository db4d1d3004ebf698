//! Error types for keyloom.
//!
//! All errors are strongly typed and propagated without panicking.
//! Private key material is never included in error messages.

/// Coarse classification of a [`KeyloomError`].
///
/// Callers are expected to branch on the code, not on message text.
/// Verification and decryption failures deliberately classify as
/// [`ErrorCode::InvalidArgument`] with a constant message, so no error
/// distinguishes which candidate key "almost" matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A key manager, catalogue, wrapper, or key is absent.
    NotFound,
    /// A conflicting registration already exists.
    AlreadyExists,
    /// Malformed input, invariant violation, or failed verification.
    InvalidArgument,
    /// Explicit refusal without further classification.
    Unknown,
}

/// Framework error types covering registry, keyset, and primitive operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyloomError {
    #[error("No key manager registered for {0}")]
    ManagerNotFound(String),

    #[error("No catalogue registered under {0}")]
    CatalogueNotFound(String),

    #[error("No wrapper registered for primitive {0}")]
    WrapperNotFound(&'static str),

    #[error("No key with id {0} in keyset")]
    KeyNotFound(u32),

    #[error("Type URL {type_url} is already registered to {existing}")]
    ManagerConflict {
        type_url: String,
        existing: &'static str,
    },

    #[error("Catalogue name {name} is already taken by {existing}")]
    CatalogueConflict {
        name: String,
        existing: &'static str,
    },

    #[error("Wrapper for primitive {primitive} is already registered to {existing}")]
    WrapperConflict {
        primitive: &'static str,
        existing: &'static str,
    },

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("Invalid keyset: {0}")]
    InvalidKeyset(String),

    #[error("New key generation is disallowed for {0}")]
    NewKeyDisallowed(String),

    #[error("Key version {key_version} for {type_url} exceeds supported version {manager_version}")]
    VersionMismatch {
        type_url: String,
        key_version: u32,
        manager_version: u32,
    },

    #[error("Primitive set has no primary entry")]
    MissingPrimary,

    #[error("Verification failed")]
    VerificationFailed,

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Catalogue refused: {0}")]
    CatalogueRefused(String),
}

impl KeyloomError {
    /// Classification used by callers that branch on failure kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ManagerNotFound(_)
            | Self::CatalogueNotFound(_)
            | Self::WrapperNotFound(_)
            | Self::KeyNotFound(_) => ErrorCode::NotFound,
            Self::ManagerConflict { .. }
            | Self::CatalogueConflict { .. }
            | Self::WrapperConflict { .. } => ErrorCode::AlreadyExists,
            Self::CatalogueRefused(_) => ErrorCode::Unknown,
            _ => ErrorCode::InvalidArgument,
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, KeyloomError>;
