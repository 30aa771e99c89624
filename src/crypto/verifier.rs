//! Passphrase verifier — derive a key and a checkable digest together.
//!
//! A `KeyVerifier` carries everything needed to confirm a passphrase
//! later (salt, Argon2 params, HKDF digest of the derived key) without
//! storing the passphrase or the key.  It is persisted in the clear in
//! the store header; the verifier and the active key are only ever
//! replaced together, atomically, at the end of a successful rotation.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::kdf::{self, Argon2Params};
use super::keys::MasterKey;
use crate::errors::{Result, RotaVaultError};
use crate::store::format::{base64_decode, base64_encode};

/// Stored companion of a master key: lets a passphrase be checked
/// without exposing the key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyVerifier {
    /// Salt used for Argon2id key derivation (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Argon2 params used at derivation time (stored so re-derivation
    /// uses the exact same settings).
    pub params: Argon2Params,

    /// HKDF digest of the derived key (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub digest: Vec<u8>,
}

/// Derive a fresh master key and its verifier from a passphrase.
///
/// Generates a new random salt.  Fails with `WeakPassphrase` if the
/// passphrase is empty or shorter than `min_len`.
pub fn derive_key_pair(
    passphrase: &str,
    params: &Argon2Params,
    min_len: usize,
) -> Result<(MasterKey, KeyVerifier)> {
    if passphrase.is_empty() {
        return Err(RotaVaultError::WeakPassphrase(
            "passphrase cannot be empty".into(),
        ));
    }
    if passphrase.len() < min_len {
        return Err(RotaVaultError::WeakPassphrase(format!(
            "passphrase must be at least {min_len} characters"
        )));
    }

    let salt = kdf::generate_salt();
    let mut key_bytes = kdf::derive_key(passphrase.as_bytes(), &salt, params)?;
    let key = MasterKey::new(key_bytes);
    key_bytes.zeroize();

    let digest = key.verifier_digest()?;
    let verifier = KeyVerifier {
        salt: salt.to_vec(),
        params: *params,
        digest: digest.to_vec(),
    };

    Ok((key, verifier))
}

/// Check a passphrase against a stored verifier.
///
/// Re-derives the key with the verifier's salt and params, then
/// compares digests in constant time.  Never fails for a wrong
/// passphrase — it just returns `false`.  Internal derivation errors
/// (e.g. corrupt stored params) are also reported as `false`.
pub fn verify(passphrase: &str, verifier: &KeyVerifier) -> bool {
    match rederive(passphrase, verifier) {
        Ok(_) => true,
        Err(_) => false,
    }
}

/// Re-derive the master key from a passphrase and a stored verifier.
///
/// Fails with `InvalidPassphrase` if the digest does not match — this
/// is the coordinator's authoritative passphrase check.
pub fn rederive(passphrase: &str, verifier: &KeyVerifier) -> Result<MasterKey> {
    let mut key_bytes = kdf::derive_key(passphrase.as_bytes(), &verifier.salt, &verifier.params)?;
    let key = MasterKey::new(key_bytes);
    key_bytes.zeroize();

    let digest = key.verifier_digest()?;
    if digest.ct_eq(verifier.digest.as_slice()).into() {
        Ok(key)
    } else {
        Err(RotaVaultError::InvalidPassphrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> Argon2Params {
        // Minimum-cost params so tests don't spend seconds in Argon2.
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn derive_then_verify_roundtrip() {
        let (_, verifier) = derive_key_pair("correct horse", &fast_params(), 8).unwrap();
        assert!(verify("correct horse", &verifier));
        assert!(!verify("battery staple", &verifier));
    }

    #[test]
    fn empty_passphrase_is_weak() {
        let err = derive_key_pair("", &fast_params(), 8).unwrap_err();
        assert!(matches!(err, RotaVaultError::WeakPassphrase(_)));
    }

    #[test]
    fn short_passphrase_is_weak() {
        let err = derive_key_pair("short", &fast_params(), 8).unwrap_err();
        assert!(matches!(err, RotaVaultError::WeakPassphrase(_)));
    }

    #[test]
    fn rederive_returns_same_key() {
        let (key, verifier) = derive_key_pair("correct horse", &fast_params(), 8).unwrap();
        let again = rederive("correct horse", &verifier).unwrap();
        assert_eq!(key.as_bytes(), again.as_bytes());
    }

    #[test]
    fn rederive_wrong_passphrase_fails() {
        let (_, verifier) = derive_key_pair("correct horse", &fast_params(), 8).unwrap();
        let err = rederive("battery staple", &verifier).unwrap_err();
        assert!(matches!(err, RotaVaultError::InvalidPassphrase));
    }

    #[test]
    fn two_derivations_use_different_salts() {
        let (_, v1) = derive_key_pair("correct horse", &fast_params(), 8).unwrap();
        let (_, v2) = derive_key_pair("correct horse", &fast_params(), 8).unwrap();
        assert_ne!(v1.salt, v2.salt);
        assert_ne!(v1.digest, v2.digest);
    }
}
