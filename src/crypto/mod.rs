//! Cryptographic primitives for RotaVault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id passphrase-based key derivation (`kdf`)
//! - The master key and its HKDF sub-keys (`keys`)
//! - Passphrase verifiers for later confirmation (`verifier`)
//! - Master-key wrapping under a user login password (`envelope`)

pub mod encryption;
pub mod envelope;
pub mod kdf;
pub mod keys;
pub mod verifier;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key_pair, ...};
pub use encryption::{decrypt, encrypt};
pub use envelope::{unwrap_master_key, wrap_master_key};
pub use kdf::{generate_salt, Argon2Params};
pub use keys::MasterKey;
pub use verifier::{derive_key_pair, rederive, verify, KeyVerifier};
