//! Record and user-vault types stored inside a store file.
//!
//! An `EncryptedRecord` holds an opaque ciphertext blob (nonce +
//! ciphertext + tag) for one credential; a `UserVault` holds one
//! user's wrapping of the master key.  Byte fields use custom serde
//! helpers so they serialize as base64 strings in JSON rather than
//! raw byte arrays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_encode};

/// A single encrypted credential.
///
/// Invariant: at rest, the ciphertext of every record is decryptable
/// with exactly the current master key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedRecord {
    /// Stable numeric id; rotation processes records in ascending id
    /// order so retries are reproducible.
    pub id: u64,

    /// Human-readable label (e.g. "prod-db-password").
    pub label: String,

    /// The encrypted payload (nonce + ciphertext + tag), base64 in JSON.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// When this record was first created.
    pub created_at: DateTime<Utc>,

    /// When this record was last updated (including re-encryption).
    pub updated_at: DateTime<Utc>,
}

/// A staged ciphertext replacement for one record, produced during the
/// rotating phase and committed as part of an atomic batch.
#[derive(Debug, Clone)]
pub struct RecordUpdate {
    pub id: u64,
    pub ciphertext: Vec<u8>,
}

/// One user's wrapping of the master key under their login password.
///
/// A rotation cannot re-wrap these (the server never holds user login
/// passwords), so the commit marks every vault `stale`; the wrapped
/// key is refreshed lazily at the user's next login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserVault {
    pub user_id: String,

    /// Envelope blob from `crypto::envelope`, base64 in JSON.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub wrapped_key: Vec<u8>,

    /// True when the wrapped key predates the current master key.
    pub stale: bool,

    pub updated_at: DateTime<Utc>,
}

/// Lightweight metadata about a record (no ciphertext).
///
/// Returned by `FileStore::list_records` so callers can display record
/// labels and timestamps without touching any ciphertext.
#[derive(Debug, Clone)]
pub struct RecordMetadata {
    pub id: u64,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
