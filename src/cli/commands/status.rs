//! `rotavault status` — show store, lock, and maintenance state.
//!
//! Works without a passphrase: only header metadata and counts are
//! read, no ciphertext is touched.

use crate::cli::{lock_path, maintenance_path, output, store_path, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::guard::{FileLock, LockStatus, RotationLock};
use crate::store::{ApplicationState, FileAppState, FileStore};

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = store_path(cli)?;
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    let info = FileStore::inspect(&path)?;
    output::info(&format!(
        "Store '{}' — {} records, {} user vault(s) ({} stale), created {}",
        info.name,
        info.record_count,
        info.vault_count,
        info.stale_vaults,
        info.created_at.format("%Y-%m-%d %H:%M:%S"),
    ));

    let lock = FileLock::new(lock_path(cli)?, settings.lock_stale_secs);
    match lock.status()? {
        LockStatus::Free => output::info("Rotation lock: free"),
        LockStatus::Held {
            holder,
            acquired_at,
            stale,
        } => {
            if stale {
                output::warning(&format!(
                    "Rotation lock: held by '{holder}' since {} — STALE, run `rotavault unlock`",
                    acquired_at.format("%Y-%m-%d %H:%M:%S")
                ));
            } else {
                output::warning(&format!(
                    "Rotation lock: held by '{holder}' since {}",
                    acquired_at.format("%Y-%m-%d %H:%M:%S")
                ));
            }
        }
    }

    let app = FileAppState::new(maintenance_path(cli)?);
    if app.is_maintenance() {
        output::warning("Maintenance mode: ON — secret reads/writes are suspended");
    } else {
        output::info("Maintenance mode: off");
    }

    Ok(())
}
