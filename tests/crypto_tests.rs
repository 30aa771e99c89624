//! Integration tests for the RotaVault crypto module.

use rotavault::crypto::kdf::Argon2Params;
use rotavault::crypto::{
    decrypt, derive_key_pair, encrypt, rederive, unwrap_master_key, verify, wrap_master_key,
    MasterKey,
};
use rotavault::errors::RotaVaultError;

/// Minimum-cost Argon2 params so tests don't spend seconds hashing.
fn fast_params() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"db-password: hunter2";

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // Ciphertext must be longer than plaintext (12-byte nonce + 16-byte tag).
    assert!(ciphertext.len() > plaintext.len());

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"same plaintext";

    let ct1 = encrypt(&key, plaintext).expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext).expect("encrypt 2");

    // Because each call generates a new random nonce, the output must differ.
    assert_ne!(ct1, ct2, "two encryptions of the same plaintext must differ");
}

#[test]
fn decrypt_with_wrong_key_fails() {
    let key = [0x11u8; 32];
    let wrong_key = [0x22u8; 32];
    let ciphertext = encrypt(&key, b"secret").unwrap();

    let err = decrypt(&wrong_key, &ciphertext).unwrap_err();
    assert!(matches!(err, RotaVaultError::DecryptionFailed));
}

#[test]
fn decrypt_truncated_ciphertext_fails() {
    let key = [0x11u8; 32];
    let ciphertext = encrypt(&key, b"secret").unwrap();

    let err = decrypt(&key, &ciphertext[..8]).unwrap_err();
    assert!(matches!(err, RotaVaultError::DecryptionFailed));

    let err = decrypt(&key, &ciphertext[..ciphertext.len() - 1]).unwrap_err();
    assert!(matches!(err, RotaVaultError::DecryptionFailed));
}

#[test]
fn roundtrip_through_derived_key() {
    let (key, verifier) = derive_key_pair("oldpass123", &fast_params(), 8).unwrap();
    let ciphertext = encrypt(key.as_bytes(), b"payload").unwrap();

    // Re-deriving from the passphrase + verifier yields the same key.
    let again = rederive("oldpass123", &verifier).unwrap();
    let recovered = decrypt(again.as_bytes(), &ciphertext).unwrap();
    assert_eq!(recovered, b"payload");
}

// ---------------------------------------------------------------------------
// Verifier correctness
// ---------------------------------------------------------------------------

#[test]
fn verifier_accepts_own_passphrase() {
    let (_, verifier) = derive_key_pair("oldpass123", &fast_params(), 8).unwrap();
    assert!(verify("oldpass123", &verifier));
}

#[test]
fn verifier_rejects_other_passphrases() {
    let (_, verifier) = derive_key_pair("oldpass123", &fast_params(), 8).unwrap();
    for wrong in ["newpass456", "oldpass124", "OLDPASS123", "oldpass123 "] {
        assert!(!verify(wrong, &verifier), "{wrong:?} must not verify");
    }
}

#[test]
fn verifier_digest_differs_from_key() {
    // The verifier is a one-way derivation distinct from the key; the
    // stored digest must never equal the key bytes.
    let (key, verifier) = derive_key_pair("oldpass123", &fast_params(), 8).unwrap();
    assert_ne!(verifier.digest.as_slice(), key.as_bytes().as_slice());
}

#[test]
fn master_key_debug_is_redacted() {
    let key = MasterKey::new([0x5Au8; 32]);
    assert_eq!(format!("{key:?}"), "MasterKey(..)");
}

#[test]
fn weak_passphrase_rejected() {
    let err = derive_key_pair("short", &fast_params(), 8).unwrap_err();
    assert!(matches!(err, RotaVaultError::WeakPassphrase(_)));

    let err = derive_key_pair("", &fast_params(), 8).unwrap_err();
    assert!(matches!(err, RotaVaultError::WeakPassphrase(_)));
}

// ---------------------------------------------------------------------------
// Key envelope
// ---------------------------------------------------------------------------

#[test]
fn envelope_roundtrip() {
    let master = MasterKey::new([0x42u8; 32]);
    let blob = wrap_master_key(&master, "alice-login-pw", &fast_params()).unwrap();
    let opened = unwrap_master_key(&blob, "alice-login-pw").unwrap();
    assert_eq!(opened.as_bytes(), master.as_bytes());
}

#[test]
fn envelope_rejects_wrong_password_and_corruption() {
    let master = MasterKey::new([0x42u8; 32]);
    let blob = wrap_master_key(&master, "alice-login-pw", &fast_params()).unwrap();

    let err = unwrap_master_key(&blob, "bob-login-pw").unwrap_err();
    assert!(matches!(err, RotaVaultError::VaultUnwrap(_)));

    let mut corrupted = blob.clone();
    let last = corrupted.len() - 1;
    corrupted[last] ^= 0xFF;
    let err = unwrap_master_key(&corrupted, "alice-login-pw").unwrap_err();
    assert!(matches!(err, RotaVaultError::VaultUnwrap(_)));
}
