//! The value object describing one rotation attempt.

use zeroize::Zeroizing;

use crate::crypto::KeyVerifier;

/// Everything the coordinator needs for a single rotation attempt.
///
/// Both passphrases live only in memory, wrapped in `Zeroizing` so
/// they are wiped on drop; a request is consumed by one call to
/// `RotationCoordinator::rotate` and never persisted or logged.
pub struct RotationRequest {
    old_passphrase: Zeroizing<String>,
    new_passphrase: Zeroizing<String>,
    verifier: KeyVerifier,
}

impl RotationRequest {
    /// `verifier` is the stored verifier of the *current* master
    /// passphrase; the coordinator checks the old passphrase against
    /// it rather than trusting the caller.
    pub fn new(old_passphrase: &str, new_passphrase: &str, verifier: KeyVerifier) -> Self {
        Self {
            old_passphrase: Zeroizing::new(old_passphrase.to_string()),
            new_passphrase: Zeroizing::new(new_passphrase.to_string()),
            verifier,
        }
    }

    pub fn old_passphrase(&self) -> &str {
        &self.old_passphrase
    }

    pub fn new_passphrase(&self) -> &str {
        &self.new_passphrase
    }

    pub fn verifier(&self) -> &KeyVerifier {
        &self.verifier
    }

    /// A rotation that would not change the key.  Rejected before the
    /// guard is even acquired.
    pub fn is_noop(&self) -> bool {
        *self.old_passphrase == *self.new_passphrase
    }
}
