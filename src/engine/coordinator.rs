//! The rotation coordinator — verify, derive, re-encrypt, commit.
//!
//! State machine:
//!
//! ```text
//! Idle → Verifying → Deriving → Rotating → Committing → Completed
//!             \          \          \           \
//!              `----------`----------`-----------`→ Aborted
//! ```
//!
//! The coordinator never persists any record under the new key until
//! *every* record has been decrypted and re-encrypted in memory; the
//! staged batch then lands in one atomic `commit_batch`.  That turns N
//! independent re-encryptions into a single logical operation and
//! rules out the worst partial-failure mode: a store where some
//! records are readable under the old key and some under the new.
//!
//! On every exit path — success or any abort — the guard is released,
//! maintenance mode is exited, and both master keys are dropped (and
//! thereby zeroized).  Once the commit has landed the outcome is
//! `Completed` no matter what: a failure to exit maintenance or release
//! the guard after that point surfaces as a warning on the summary,
//! never as an abort, because the new key is already durably
//! authoritative and "retry with the old passphrase" would be wrong
//! advice.

use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::crypto::encryption::{decrypt, encrypt};
use crate::crypto::kdf::Argon2Params;
use crate::crypto::verifier;
use crate::errors::{Result, RotaVaultError};
use crate::guard::{LockStatus, RotationLock};
use crate::report::RotationReporter;
use crate::store::{ApplicationState, RecordStore, RecordUpdate, UserVaultStore};

use super::request::RotationRequest;

/// Phases of a rotation, for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Idle,
    Verifying,
    Deriving,
    Rotating,
    Committing,
    Completed,
    Aborted,
}

/// Coordinator policy knobs, sourced from `Settings`.
#[derive(Debug, Clone)]
pub struct RotationConfig {
    /// Identity recorded in the guard lock file (e.g. "cli:<pid>").
    pub holder: String,
    /// Argon2 params for deriving the new key.
    pub argon2_params: Argon2Params,
    /// Minimum length policy for the new passphrase.
    pub min_passphrase_len: usize,
}

/// Outcome of a completed rotation.
#[derive(Debug, Clone)]
pub struct RotationSummary {
    pub records_rotated: u64,
    /// User vaults marked stale by the commit (re-wrapped lazily at
    /// next login).
    pub vaults_invalidated: u64,
    pub elapsed: Duration,
    /// Non-fatal cleanup problems observed *after* the commit landed
    /// (guard release, maintenance exit).  The rotation itself is
    /// complete; these need operator attention, not a retry.
    pub cleanup_warnings: Vec<String>,
}

/// Orchestrates one rotation end to end.  Single-use: build one per
/// attempt, call `rotate`, inspect `state()` afterwards if needed.
pub struct RotationCoordinator<'a, S: RecordStore + UserVaultStore> {
    store: &'a mut S,
    lock: &'a dyn RotationLock,
    app: &'a mut dyn ApplicationState,
    reporter: &'a dyn RotationReporter,
    config: RotationConfig,
    state: RotationState,
}

impl<'a, S: RecordStore + UserVaultStore> RotationCoordinator<'a, S> {
    pub fn new(
        store: &'a mut S,
        lock: &'a dyn RotationLock,
        app: &'a mut dyn ApplicationState,
        reporter: &'a dyn RotationReporter,
        config: RotationConfig,
    ) -> Self {
        Self {
            store,
            lock,
            app,
            reporter,
            config,
            state: RotationState::Idle,
        }
    }

    /// The phase the last `rotate` call ended in.
    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Run a full rotation.  Consumes the request; passphrases are
    /// wiped when it drops.
    ///
    /// After an `Err` return the store is exactly as usable as before
    /// the call: same key, same verifier, same ciphertexts, guard
    /// free, maintenance exited.
    pub fn rotate(&mut self, request: RotationRequest) -> Result<RotationSummary> {
        let started = Instant::now();

        let outcome = self.try_rotate(&request, started);
        match outcome {
            Ok(summary) => {
                self.state = RotationState::Completed;
                self.reporter
                    .on_completed(summary.records_rotated, summary.elapsed);
                Ok(summary)
            }
            Err(error) => {
                self.state = RotationState::Aborted;
                self.reporter.on_aborted(&error);
                Err(error)
            }
        }
    }

    fn try_rotate(
        &mut self,
        request: &RotationRequest,
        started: Instant,
    ) -> Result<RotationSummary> {
        // Rejected before the guard is acquired: rotating to the same
        // passphrase would be pointless churn at best.
        if request.is_noop() {
            return Err(RotaVaultError::NoOpRotation);
        }

        self.state = RotationState::Verifying;
        if !self.lock.acquire(&self.config.holder)? {
            let holder = match self.lock.status()? {
                LockStatus::Held { holder, .. } => holder,
                LockStatus::Free => "unknown".to_string(),
            };
            return Err(RotaVaultError::RotationInProgress { holder });
        }

        // The guard is held from here on; release it on every path.
        match self.run_guarded(request, started) {
            Ok(mut summary) => {
                // The commit already landed; a release failure must not
                // turn the outcome into an abort.
                if let Err(e) = self.lock.release(&self.config.holder) {
                    summary
                        .cleanup_warnings
                        .push(format!("rotation lock release failed: {e}"));
                }
                Ok(summary)
            }
            Err(error) => {
                // Best effort; the abort reason outranks a release error.
                let _ = self.lock.release(&self.config.holder);
                Err(error)
            }
        }
    }

    fn run_guarded(
        &mut self,
        request: &RotationRequest,
        started: Instant,
    ) -> Result<RotationSummary> {
        self.app.enter_maintenance()?;

        // Maintenance is exited on success *and* failure; once the
        // commit has succeeded an exit failure is only a warning.
        match self.run_rotation(request, started) {
            Ok(mut summary) => {
                if let Err(e) = self.app.exit_maintenance() {
                    summary
                        .cleanup_warnings
                        .push(format!("maintenance exit failed: {e}"));
                }
                Ok(summary)
            }
            Err(error) => {
                let _ = self.app.exit_maintenance();
                Err(error)
            }
        }
    }

    fn run_rotation(
        &mut self,
        request: &RotationRequest,
        started: Instant,
    ) -> Result<RotationSummary> {
        // Verifying: the coordinator checks the old passphrase itself
        // rather than trusting the caller's earlier checks.
        let old_key = verifier::rederive(request.old_passphrase(), request.verifier())?;

        self.state = RotationState::Deriving;
        let (new_key, new_verifier) = verifier::derive_key_pair(
            request.new_passphrase(),
            &self.config.argon2_params,
            self.config.min_passphrase_len,
        )?;

        // Rotating: decrypt + re-encrypt every record in ascending id
        // order, staging the results.  Nothing is written yet.
        self.state = RotationState::Rotating;
        let total = self.store.count_records()?;
        let mut staged: Vec<RecordUpdate> = Vec::with_capacity(total as usize);
        let mut processed: u64 = 0;

        for record in self.store.stream_records()? {
            let record = record?;

            // A decrypt failure here means corruption (the old key was
            // just verified), so the whole rotation aborts with the
            // offending id for operator diagnosis.
            let plaintext = Zeroizing::new(
                decrypt(old_key.as_bytes(), &record.ciphertext)
                    .map_err(|_| RotaVaultError::RecordDecryption { id: record.id })?,
            );
            let new_ciphertext = encrypt(new_key.as_bytes(), &plaintext)?;

            staged.push(RecordUpdate {
                id: record.id,
                ciphertext: new_ciphertext,
            });
            processed += 1;
            self.reporter.on_progress(processed, total);
        }
        drop(old_key);

        // Committing: one atomic write covering every ciphertext, the
        // new verifier, and the vault staleness flags.
        self.state = RotationState::Committing;
        let vaults_invalidated = self.store.list_vaults()?.len() as u64;
        self.store
            .commit_batch(staged, new_key, new_verifier)
            .map_err(|e| match e {
                err @ RotaVaultError::StorageCommit(_) => err,
                other => RotaVaultError::StorageCommit(other.to_string()),
            })?;

        Ok(RotationSummary {
            records_rotated: processed,
            vaults_invalidated,
            elapsed: started.elapsed(),
            cleanup_warnings: Vec::new(),
        })
    }
}
