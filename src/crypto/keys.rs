//! The master key and its HKDF-SHA256 sub-keys.
//!
//! From a single master key we derive:
//! - A **verifier digest** — a one-way value stored in the clear so a
//!   passphrase can be confirmed later without storing the passphrase
//!   or the key itself.
//! - A dedicated **HMAC key** for store-file integrity checks.
//!
//! HKDF (RFC 5869) uses the master key as input keying material and a
//! context string (`info`) to produce independent sub-keys, so the
//! stored verifier digest reveals nothing about the encryption key.

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{Result, RotaVaultError};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

/// A wrapper around a 32-byte master key that automatically zeroes
/// its memory when dropped.
///
/// During a rotation the coordinator briefly holds two of these (the
/// old and the new key); both are wiped as soon as the rotation
/// completes or aborts.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to pass to encryption).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the verifier digest for this key.
    ///
    /// Stored in the clear in the store header; checking a passphrase
    /// means re-deriving the key and comparing digests in constant time.
    pub fn verifier_digest(&self) -> Result<[u8; KEY_LEN]> {
        hkdf_derive(&self.bytes, b"rotavault-verifier")
    }

    /// Derive the HMAC key used for store-file integrity checks.
    pub fn hmac_key(&self) -> Result<[u8; KEY_LEN]> {
        hkdf_derive(&self.bytes, b"rotavault-hmac-key")
    }
}

/// Key material must never leak through debug output.
impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Internal helper: run HKDF-SHA256 expand with the given `info`.
///
/// We skip the `extract` step and use the master key directly as the
/// pseudo-random key (PRK), because the master key already has high
/// entropy (it came from Argon2id).
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    // `salt` is None — HKDF will use a zero-filled salt internally.
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| RotaVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}
