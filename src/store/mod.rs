//! Store module — encrypted record storage and collaborator contracts.
//!
//! The rotation coordinator only ever talks to the traits defined here
//! (`RecordStore`, `UserVaultStore`, `ApplicationState`); the
//! file-backed implementation in `file` is what the CLI wires in.

pub mod file;
pub mod format;
pub mod record;
pub mod state;

pub use file::FileStore;
pub use record::{EncryptedRecord, RecordMetadata, RecordUpdate, UserVault};
pub use state::FileAppState;

use crate::crypto::{KeyVerifier, MasterKey};
use crate::errors::Result;

/// Storage contract for the encrypted records a rotation re-encrypts.
pub trait RecordStore {
    /// Total number of encrypted records (for progress totals).
    fn count_records(&self) -> Result<u64>;

    /// Iterate all encrypted records in ascending id order.
    ///
    /// The sequence is finite and restartable only from the start; a
    /// failed rotation re-reads everything on retry.  The stable order
    /// makes repeated attempts produce reproducible progress logs.
    fn stream_records(&self) -> Result<Box<dyn Iterator<Item = Result<EncryptedRecord>> + '_>>;

    /// Persist a batch of re-encrypted records together with the new
    /// key's verifier as a single atomic unit.
    ///
    /// Either every update, the verifier, and the user-vault staleness
    /// flags land together, or none do.  On failure the old key remains
    /// authoritative and no update is visible.
    fn commit_batch(
        &mut self,
        updates: Vec<RecordUpdate>,
        new_key: MasterKey,
        new_verifier: KeyVerifier,
    ) -> Result<()>;
}

/// Storage contract for per-user wrappings of the master key.
pub trait UserVaultStore {
    /// All enrolled user vaults.
    fn list_vaults(&self) -> Result<Vec<UserVault>>;

    /// Replace one user's wrapped key (login-time re-wrap after a
    /// rotation marked it stale).
    fn commit_vault_update(&mut self, user_id: &str, wrapped_key: Vec<u8>) -> Result<()>;
}

/// Application-wide maintenance switch the coordinator toggles around
/// a rotation so normal traffic cannot read or write secrets mid-flight.
pub trait ApplicationState {
    fn enter_maintenance(&mut self) -> Result<()>;
    fn exit_maintenance(&mut self) -> Result<()>;
    fn is_maintenance(&self) -> bool;
}
