//! File-backed store — the concrete Record/UserVault store the CLI uses.
//!
//! `FileStore` wraps the binary format layer and the crypto layer so
//! the rest of the application can work with simple method calls like
//! `store.add_record("prod-db-password", "hunter2")`.  It also
//! implements the collaborator traits the rotation coordinator
//! consumes; `commit_batch` performs exactly one atomic file write.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use zeroize::Zeroize;

use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::kdf::Argon2Params;
use crate::crypto::{envelope, verifier, KeyVerifier, MasterKey};
use crate::errors::{Result, RotaVaultError};

use super::format::{self, StoreBody, StoreHeader, CURRENT_VERSION};
use super::record::{EncryptedRecord, RecordMetadata, RecordUpdate, UserVault};
use super::{RecordStore, UserVaultStore};

/// The main store handle.  Create one with `FileStore::create` or
/// `FileStore::open`, then use its methods to manage records and
/// user vaults.
pub struct FileStore {
    /// Path to the `.store` file on disk.
    path: PathBuf,

    /// Header metadata (name, verifier, timestamps).
    header: StoreHeader,

    /// In-memory map of record id -> encrypted record.  BTreeMap keeps
    /// iteration in ascending id order, which the rotation contract
    /// requires.
    records: BTreeMap<u64, EncryptedRecord>,

    /// In-memory map of user id -> user vault.
    vaults: BTreeMap<String, UserVault>,

    /// The derived master key (zeroized on drop).
    master_key: MasterKey,
}

impl FileStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new store file at `path`.
    ///
    /// Derives a fresh master key + verifier from the passphrase and
    /// writes an empty store to disk.
    pub fn create(
        path: &Path,
        passphrase: &str,
        name: &str,
        argon2_params: &Argon2Params,
        min_passphrase_len: usize,
    ) -> Result<Self> {
        if path.exists() {
            return Err(RotaVaultError::StoreAlreadyExists(path.to_path_buf()));
        }

        let (master_key, key_verifier) =
            verifier::derive_key_pair(passphrase, argon2_params, min_passphrase_len)?;

        let header = StoreHeader {
            version: CURRENT_VERSION,
            name: name.to_string(),
            verifier: key_verifier,
            created_at: Utc::now(),
        };

        let mut store = Self {
            path: path.to_path_buf(),
            header,
            records: BTreeMap::new(),
            vaults: BTreeMap::new(),
            master_key,
        };

        store.save()?;

        Ok(store)
    }

    /// Open an existing store file, verifying its integrity.
    ///
    /// Re-derives the master key from the passphrase and the stored
    /// verifier (fails with `InvalidPassphrase` on digest mismatch),
    /// then verifies the HMAC **over the original bytes from disk**.
    pub fn open(path: &Path, passphrase: &str) -> Result<Self> {
        let raw = format::read_store(path)?;

        // The verifier check is the passphrase check: re-derive and
        // compare digests in constant time.
        let master_key = verifier::rederive(passphrase, &raw.header.verifier)?;

        // Verify the HMAC over the *original raw bytes* from disk.
        // This avoids the re-serialization round-trip bug where
        // serde_json might produce different byte output.
        let mut hmac_key = master_key.hmac_key()?;
        let hmac_result = format::verify_hmac(
            &hmac_key,
            &raw.header_bytes,
            &raw.body_bytes,
            &raw.stored_hmac,
        );
        hmac_key.zeroize();
        hmac_result?;

        let records: BTreeMap<u64, EncryptedRecord> =
            raw.body.records.into_iter().map(|r| (r.id, r)).collect();
        let vaults: BTreeMap<String, UserVault> = raw
            .body
            .vaults
            .into_iter()
            .map(|v| (v.user_id.clone(), v))
            .collect();

        Ok(Self {
            path: path.to_path_buf(),
            header: raw.header,
            records,
            vaults,
            master_key,
        })
    }

    /// Peek at a store file without a passphrase.
    ///
    /// Returns header metadata and record/vault counts for diagnostic
    /// display (`status`).  No HMAC verification — the caller must not
    /// trust the contents beyond display.
    pub fn inspect(path: &Path) -> Result<StoreInfo> {
        let raw = format::read_store(path)?;
        Ok(StoreInfo {
            name: raw.header.name,
            created_at: raw.header.created_at,
            record_count: raw.body.records.len(),
            vault_count: raw.body.vaults.len(),
            stale_vaults: raw.body.vaults.iter().filter(|v| v.stale).count(),
        })
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Add a new record, encrypting the plaintext under the master key.
    ///
    /// Returns the assigned record id.
    pub fn add_record(&mut self, label: &str, plaintext: &str) -> Result<u64> {
        Self::validate_label(label)?;
        if self.records.values().any(|r| r.label == label) {
            return Err(RotaVaultError::RecordAlreadyExists(label.to_string()));
        }

        let ciphertext = encrypt(self.master_key.as_bytes(), plaintext.as_bytes())?;

        // Ids are never reused; ascending assignment keeps rotation
        // order stable across the store's lifetime.
        let id = self.records.keys().next_back().map_or(1, |max| max + 1);
        let now = Utc::now();

        self.records.insert(
            id,
            EncryptedRecord {
                id,
                label: label.to_string(),
                ciphertext,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    /// Decrypt and return the plaintext of the record with `label`.
    pub fn record_plaintext(&self, label: &str) -> Result<String> {
        let record = self
            .records
            .values()
            .find(|r| r.label == label)
            .ok_or_else(|| RotaVaultError::RecordNotFound(label.to_string()))?;

        let plaintext_bytes = decrypt(self.master_key.as_bytes(), &record.ciphertext)?;

        // Convert to String via from_utf8 which takes ownership.
        // On error, zeroize the bytes inside the error before discarding.
        String::from_utf8(plaintext_bytes).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            RotaVaultError::SerializationError("record payload is not valid UTF-8".to_string())
        })
    }

    /// List metadata for all records, in ascending id order.
    pub fn list_records(&self) -> Vec<RecordMetadata> {
        self.records
            .values()
            .map(|r| RecordMetadata {
                id: r.id,
                label: r.label.clone(),
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // User vault operations
    // ------------------------------------------------------------------

    /// Enroll a user: wrap the current master key under their login
    /// password and store the vault blob.
    pub fn enroll_user(
        &mut self,
        user_id: &str,
        login_password: &str,
        params: &Argon2Params,
    ) -> Result<()> {
        if self.vaults.contains_key(user_id) {
            return Err(RotaVaultError::UserAlreadyEnrolled(user_id.to_string()));
        }

        let wrapped = envelope::wrap_master_key(&self.master_key, login_password, params)?;
        self.vaults.insert(
            user_id.to_string(),
            UserVault {
                user_id: user_id.to_string(),
                wrapped_key: wrapped,
                stale: false,
                updated_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Unwrap a user's vault with their login password.
    ///
    /// A stale vault (wrapped under a pre-rotation key) still unwraps,
    /// but the caller must treat the result as the *old* master key and
    /// re-wrap via `commit_vault_update` once re-authenticated.
    pub fn unwrap_user_vault(&self, user_id: &str, login_password: &str) -> Result<MasterKey> {
        let vault = self
            .vaults
            .get(user_id)
            .ok_or_else(|| RotaVaultError::VaultUnwrap(format!("no vault for '{user_id}'")))?;
        envelope::unwrap_master_key(&vault.wrapped_key, login_password)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the store and write it to disk atomically.
    ///
    /// Computes a fresh HMAC over the header + body JSON and writes the
    /// full binary envelope via temp-file + rename.
    pub fn save(&mut self) -> Result<()> {
        let body = StoreBody {
            records: self.records.values().cloned().collect(),
            vaults: self.vaults.values().cloned().collect(),
        };

        let mut hmac_key = self.master_key.hmac_key()?;
        let result = format::write_store(&self.path, &self.header, &body, &hmac_key);
        hmac_key.zeroize();

        result
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the store name (e.g. "main").
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Returns the verifier for the current master passphrase.
    pub fn verifier(&self) -> &KeyVerifier {
        &self.header.verifier
    }

    /// Returns the number of records in the store.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Validate that a record label is safe.
    ///
    /// Allowed: ASCII letters, digits, underscores, hyphens, periods.
    /// Must be non-empty and at most 256 characters.
    fn validate_label(label: &str) -> Result<()> {
        if label.is_empty() {
            return Err(RotaVaultError::CommandFailed(
                "record label cannot be empty".into(),
            ));
        }
        if label.len() > 256 {
            return Err(RotaVaultError::CommandFailed(
                "record label cannot exceed 256 characters".into(),
            ));
        }
        if !label
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
        {
            return Err(RotaVaultError::CommandFailed(format!(
                "record label '{label}' contains invalid characters — only ASCII letters, digits, underscores, hyphens, and periods are allowed"
            )));
        }
        Ok(())
    }
}

/// The master key must never leak through debug output.
impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("records", &self.records.len())
            .field("vaults", &self.vaults.len())
            .finish_non_exhaustive()
    }
}

/// Diagnostic summary returned by `FileStore::inspect`.
#[derive(Debug, Clone)]
pub struct StoreInfo {
    pub name: String,
    pub created_at: chrono::DateTime<Utc>,
    pub record_count: usize,
    pub vault_count: usize,
    pub stale_vaults: usize,
}

// ---------------------------------------------------------------------------
// Collaborator trait impls
// ---------------------------------------------------------------------------

impl RecordStore for FileStore {
    fn count_records(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    fn stream_records(&self) -> Result<Box<dyn Iterator<Item = Result<EncryptedRecord>> + '_>> {
        // BTreeMap iterates in ascending id order.
        Ok(Box::new(self.records.values().cloned().map(Ok)))
    }

    fn commit_batch(
        &mut self,
        updates: Vec<RecordUpdate>,
        new_key: MasterKey,
        new_verifier: KeyVerifier,
    ) -> Result<()> {
        // Stage the post-commit state in memory first; nothing below
        // touches `self` until the file write has succeeded.
        let now = Utc::now();
        let mut new_records = self.records.clone();
        for update in &updates {
            let record = new_records.get_mut(&update.id).ok_or_else(|| {
                RotaVaultError::StorageCommit(format!("unknown record id {}", update.id))
            })?;
            record.ciphertext = update.ciphertext.clone();
            record.updated_at = now;
        }

        // Every user vault now wraps the wrong key; mark them stale in
        // the same atomic write as the records and the verifier.
        let mut new_vaults = self.vaults.clone();
        for vault in new_vaults.values_mut() {
            vault.stale = true;
        }

        let new_header = StoreHeader {
            version: CURRENT_VERSION,
            name: self.header.name.clone(),
            verifier: new_verifier,
            created_at: self.header.created_at,
        };

        let body = StoreBody {
            records: new_records.values().cloned().collect(),
            vaults: new_vaults.values().cloned().collect(),
        };

        let mut hmac_key = new_key.hmac_key()?;
        let write_result = format::write_store(&self.path, &new_header, &body, &hmac_key);
        hmac_key.zeroize();
        write_result?;

        // The file rename succeeded — the new key is now authoritative.
        self.header = new_header;
        self.records = new_records;
        self.vaults = new_vaults;
        self.master_key = new_key;

        Ok(())
    }
}

impl UserVaultStore for FileStore {
    fn list_vaults(&self) -> Result<Vec<UserVault>> {
        Ok(self.vaults.values().cloned().collect())
    }

    fn commit_vault_update(&mut self, user_id: &str, wrapped_key: Vec<u8>) -> Result<()> {
        let vault = self
            .vaults
            .get_mut(user_id)
            .ok_or_else(|| RotaVaultError::VaultUnwrap(format!("no vault for '{user_id}'")))?;
        vault.wrapped_key = wrapped_key;
        vault.stale = false;
        vault.updated_at = Utc::now();
        self.save()
    }
}
