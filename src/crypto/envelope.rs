//! Key envelope — wrap the master key under a user's login password.
//!
//! Each enrolled user holds a `UserVault` blob: the master key
//! encrypted under a key derived from that user's login password.
//! After authenticating, the user can unwrap the blob and recover the
//! master key without the server ever storing it in the clear.
//!
//! Blob layout (self-describing, like the store header):
//!
//! ```text
//! [version: 1 byte][memory_kib: 4 LE][iterations: 4 LE][parallelism: 4 LE]
//! [salt: 32 bytes][nonce + ciphertext + tag]
//! ```
//!
//! Both transforms are pure — persistence belongs to the caller.

use zeroize::Zeroize;

use super::encryption::{decrypt, encrypt};
use super::kdf::{self, Argon2Params, SALT_LEN};
use super::keys::MasterKey;
use crate::errors::{Result, RotaVaultError};

/// Blob format version.
const VERSION: u8 = 1;

/// Fixed-size prefix: 1 (version) + 3 * 4 (params) + 32 (salt).
const PREFIX_LEN: usize = 13 + SALT_LEN;

/// Wrap `master_key` under a key derived from `user_password`.
///
/// Generates a fresh salt per wrap, so re-wrapping the same key for
/// the same user still produces a new blob.
pub fn wrap_master_key(
    master_key: &MasterKey,
    user_password: &str,
    params: &Argon2Params,
) -> Result<Vec<u8>> {
    let salt = kdf::generate_salt();
    let mut wrap_key = kdf::derive_key(user_password.as_bytes(), &salt, params)?;
    let sealed = encrypt(&wrap_key, master_key.as_bytes());
    wrap_key.zeroize();
    let sealed = sealed?;

    let mut blob = Vec::with_capacity(PREFIX_LEN + sealed.len());
    blob.push(VERSION);
    blob.extend_from_slice(&params.memory_kib.to_le_bytes());
    blob.extend_from_slice(&params.iterations.to_le_bytes());
    blob.extend_from_slice(&params.parallelism.to_le_bytes());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&sealed);
    Ok(blob)
}

/// Unwrap a blob produced by `wrap_master_key`.
///
/// Fails with `VaultUnwrap` if the password is wrong or the blob is
/// malformed — the two cases are indistinguishable by design.
pub fn unwrap_master_key(blob: &[u8], user_password: &str) -> Result<MasterKey> {
    if blob.len() < PREFIX_LEN {
        return Err(RotaVaultError::VaultUnwrap("blob too small".into()));
    }
    if blob[0] != VERSION {
        return Err(RotaVaultError::VaultUnwrap(format!(
            "unsupported blob version {}",
            blob[0]
        )));
    }

    let le_u32 = |bytes: &[u8]| -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        u32::from_le_bytes(buf)
    };
    let params = Argon2Params {
        memory_kib: le_u32(&blob[1..5]),
        iterations: le_u32(&blob[5..9]),
        parallelism: le_u32(&blob[9..13]),
    };
    let salt = &blob[13..PREFIX_LEN];
    let sealed = &blob[PREFIX_LEN..];

    let mut wrap_key = kdf::derive_key(user_password.as_bytes(), salt, &params)
        .map_err(|e| RotaVaultError::VaultUnwrap(format!("key derivation: {e}")))?;
    let opened = decrypt(&wrap_key, sealed);
    wrap_key.zeroize();

    let mut key_bytes = opened.map_err(|_| RotaVaultError::VaultUnwrap("auth failure".into()))?;
    if key_bytes.len() != 32 {
        key_bytes.zeroize();
        return Err(RotaVaultError::VaultUnwrap("bad key length".into()));
    }

    let mut raw = [0u8; 32];
    raw.copy_from_slice(&key_bytes);
    key_bytes.zeroize();
    let key = MasterKey::new(raw);
    raw.zeroize();
    Ok(key)
}
