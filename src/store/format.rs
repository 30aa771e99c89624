//! Binary store file format and HMAC integrity verification.
//!
//! A `.store` file has this layout:
//!
//! ```text
//! [RVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][body JSON][HMAC-SHA256: 32 bytes]
//! ```
//!
//! - **Magic** (`RVLT`): identifies the file as a RotaVault store.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the body JSON begins.
//! - **Header JSON**: serialized `StoreHeader` (contains the passphrase
//!   verifier — public data).
//! - **Body JSON**: serialized `StoreBody` (records + user vaults).
//! - **HMAC-SHA256**: 32-byte tag computed over header + body bytes,
//!   keyed by an HKDF sub-key of the master key.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::record::{EncryptedRecord, UserVault};
use crate::crypto::KeyVerifier;
use crate::errors::{Result, RotaVaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every store file.
const MAGIC: &[u8; 4] = b"RVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the HMAC tag appended to the file (SHA-256 = 32 bytes).
const HMAC_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// StoreHeader / StoreBody
// ---------------------------------------------------------------------------

/// Metadata stored at the beginning of a store file.
///
/// The verifier here and the records in the body are only ever
/// replaced together: `write_store` rewrites the whole file via
/// temp-file + rename, so readers never observe a mixed-key state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHeader {
    /// Format version.
    pub version: u8,

    /// Store name (e.g. "main").
    pub name: String,

    /// Verifier for the current master passphrase (salt, Argon2
    /// params, key digest).
    pub verifier: KeyVerifier,

    /// When this store was first created.
    pub created_at: DateTime<Utc>,
}

/// Everything after the header: the encrypted records and the
/// per-user master-key wrappings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreBody {
    pub records: Vec<EncryptedRecord>,
    pub vaults: Vec<UserVault>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Write a store file to disk **atomically**.
///
/// 1. Serialize header and body to JSON.
/// 2. Compute HMAC over header + body bytes.
/// 3. Write to a temp file in the same directory.
/// 4. Rename temp file over the target path.
///
/// The rename ensures readers never see a half-written file — this is
/// what makes `commit_batch` all-or-nothing.
pub fn write_store(
    path: &Path,
    header: &StoreHeader,
    body: &StoreBody,
    hmac_key: &[u8],
) -> Result<()> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| RotaVaultError::SerializationError(format!("header: {e}")))?;
    let body_bytes = serde_json::to_vec(body)
        .map_err(|e| RotaVaultError::SerializationError(format!("body: {e}")))?;

    let hmac_tag = compute_hmac(hmac_key, &header_bytes, &body_bytes)?;

    // Build the binary blob.
    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        RotaVaultError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;
    let total = PREFIX_LEN + header_bytes.len() + body_bytes.len() + HMAC_LEN;
    let mut buf = Vec::with_capacity(total);

    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header JSON
    buf.extend_from_slice(&body_bytes); // body JSON
    buf.extend_from_slice(&hmac_tag); // 32 bytes

    // Atomic write: write to a temp file, then rename.
    // The temp file is in the same directory so rename is guaranteed
    // to be atomic on the same filesystem.
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Raw data read from a store file on disk.
///
/// Keeps the original bytes so the HMAC can be verified over the
/// exact bytes that were written — no re-serialization needed.
pub struct RawStore {
    pub header: StoreHeader,
    pub body: StoreBody,
    /// The raw header JSON bytes exactly as stored on disk.
    pub header_bytes: Vec<u8>,
    /// The raw body JSON bytes exactly as stored on disk.
    pub body_bytes: Vec<u8>,
    /// The HMAC tag stored at the end of the file.
    pub stored_hmac: Vec<u8>,
}

/// Read a store file from disk and return its parts **with raw bytes**.
///
/// The caller should verify the HMAC over `header_bytes` and
/// `body_bytes` (the original bytes from disk) before trusting the
/// deserialized data.
pub fn read_store(path: &Path) -> Result<RawStore> {
    if !path.exists() {
        return Err(RotaVaultError::StoreNotFound(path.to_path_buf()));
    }

    let data = fs::read(path)?;

    // Minimum size: prefix + HMAC.
    let min_size = PREFIX_LEN + HMAC_LEN;
    if data.len() < min_size {
        return Err(RotaVaultError::InvalidStoreFormat(
            "file too small to be a valid store".into(),
        ));
    }

    // --- Parse the fixed-size prefix ---

    if &data[0..4] != MAGIC {
        return Err(RotaVaultError::InvalidStoreFormat(
            "missing RVLT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(RotaVaultError::InvalidStoreFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| RotaVaultError::InvalidStoreFormat("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        RotaVaultError::InvalidStoreFormat(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN + header_len;
    if header_end + HMAC_LEN > data.len() {
        return Err(RotaVaultError::InvalidStoreFormat(
            "header length exceeds file size".into(),
        ));
    }

    // --- Extract the three variable-length sections as raw bytes ---

    let header_bytes = data[PREFIX_LEN..header_end].to_vec();
    let body_end = data.len() - HMAC_LEN;
    let body_bytes = data[header_end..body_end].to_vec();
    let stored_hmac = data[body_end..].to_vec();

    // --- Deserialize from the raw bytes ---

    let header: StoreHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| RotaVaultError::InvalidStoreFormat(format!("header JSON: {e}")))?;

    let body: StoreBody = serde_json::from_slice(&body_bytes)
        .map_err(|e| RotaVaultError::InvalidStoreFormat(format!("body JSON: {e}")))?;

    Ok(RawStore {
        header,
        body,
        header_bytes,
        body_bytes,
        stored_hmac,
    })
}

/// Compute HMAC-SHA256 over header + body bytes.
pub fn compute_hmac(hmac_key: &[u8], header_bytes: &[u8], body_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| RotaVaultError::HmacError(format!("invalid HMAC key: {e}")))?;

    mac.update(header_bytes);
    mac.update(body_bytes);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify that the HMAC matches using constant-time comparison.
///
/// Uses `hmac::Mac::verify_slice` which is guaranteed constant-time,
/// preventing timing side-channel attacks.
pub fn verify_hmac(
    hmac_key: &[u8],
    header_bytes: &[u8],
    body_bytes: &[u8],
    expected_hmac: &[u8],
) -> Result<()> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| RotaVaultError::HmacError(format!("invalid HMAC key: {e}")))?;

    mac.update(header_bytes);
    mac.update(body_bytes);

    mac.verify_slice(expected_hmac)
        .map_err(|_| RotaVaultError::HmacMismatch)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
