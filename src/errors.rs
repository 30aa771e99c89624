use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in RotaVault.
#[derive(Debug, Error)]
pub enum RotaVaultError {
    // --- Rotation errors ---
    #[error("Invalid passphrase — does not match the stored verifier")]
    InvalidPassphrase,

    #[error("New passphrase is identical to the old one — nothing to rotate")]
    NoOpRotation,

    #[error("Weak passphrase: {0}")]
    WeakPassphrase(String),

    #[error("A rotation is already in progress (held by '{holder}')")]
    RotationInProgress { holder: String },

    #[error("Record {id} failed to decrypt under the verified key — store may be corrupted")]
    RecordDecryption { id: u64 },

    #[error("Atomic commit failed ({0}) — the old key remains authoritative, retry once storage recovers")]
    StorageCommit(String),

    #[error("User vault could not be unwrapped ({0}) — wrong password or corrupt blob")]
    VaultUnwrap(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Store errors ---
    #[error("Store not found at {0}")]
    StoreNotFound(PathBuf),

    #[error("Store already exists at {0}")]
    StoreAlreadyExists(PathBuf),

    #[error("Invalid store format: {0}")]
    InvalidStoreFormat(String),

    #[error("HMAC verification failed — store file may be tampered")]
    HmacMismatch,

    #[error("HMAC error: {0}")]
    HmacError(String),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    #[error("Record '{0}' already exists")]
    RecordAlreadyExists(String),

    #[error("User '{0}' is already enrolled")]
    UserAlreadyEnrolled(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    // --- Audit errors ---
    #[error("Audit error: {0}")]
    AuditError(String),
}

impl RotaVaultError {
    /// A short stable identifier for this error, used in audit log
    /// entries and abort reports. Not meant for user display.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPassphrase => "invalid-passphrase",
            Self::NoOpRotation => "noop-rotation",
            Self::WeakPassphrase(_) => "weak-passphrase",
            Self::RotationInProgress { .. } => "rotation-in-progress",
            Self::RecordDecryption { .. } => "record-decryption",
            Self::StorageCommit(_) => "storage-commit",
            Self::VaultUnwrap(_) => "vault-unwrap",
            Self::EncryptionFailed(_) => "encryption-failed",
            Self::DecryptionFailed => "decryption-failed",
            Self::KeyDerivationFailed(_) => "key-derivation-failed",
            Self::StoreNotFound(_) => "store-not-found",
            Self::StoreAlreadyExists(_) => "store-already-exists",
            Self::InvalidStoreFormat(_) => "invalid-store-format",
            Self::HmacMismatch => "hmac-mismatch",
            Self::HmacError(_) => "hmac-error",
            Self::RecordNotFound(_) => "record-not-found",
            Self::RecordAlreadyExists(_) => "record-already-exists",
            Self::UserAlreadyEnrolled(_) => "user-already-enrolled",
            Self::ConfigError(_) => "config-error",
            Self::Io(_) => "io-error",
            Self::SerializationError(_) => "serialization-error",
            Self::CommandFailed(_) => "command-failed",
            Self::UserCancelled => "user-cancelled",
            Self::AuditError(_) => "audit-error",
        }
    }
}

/// Convenience type alias for RotaVault results.
pub type Result<T> = std::result::Result<T, RotaVaultError>;
