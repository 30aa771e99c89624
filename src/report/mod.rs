//! Progress and outcome reporting for rotations.
//!
//! The coordinator emits progress through this trait; implementations
//! must be best-effort.  Every method returns `()` — a reporter that
//! fails internally must swallow the failure rather than alter the
//! rotation's outcome.

use std::time::Duration;

use crate::errors::RotaVaultError;

/// Collaborator the coordinator calls as the rotation advances.
pub trait RotationReporter {
    /// Called once per re-encrypted record.
    fn on_progress(&self, processed: u64, total: u64);

    /// Called exactly once when every record has been committed under
    /// the new key.
    fn on_completed(&self, total: u64, elapsed: Duration);

    /// Called exactly once when the rotation aborts, with the typed
    /// reason.  The store is guaranteed untouched at this point.
    fn on_aborted(&self, error: &RotaVaultError);
}

/// Reporter that discards everything.  Useful for tests and embedding.
pub struct NullReporter;

impl RotationReporter for NullReporter {
    fn on_progress(&self, _processed: u64, _total: u64) {}
    fn on_completed(&self, _total: u64, _elapsed: Duration) {}
    fn on_aborted(&self, _error: &RotaVaultError) {}
}
