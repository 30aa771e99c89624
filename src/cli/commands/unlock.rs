//! `rotavault unlock` — clear a rotation lock left behind by a crash.

use crate::cli::{lock_path, log_audit, maintenance_path, output, Cli};
use crate::config::Settings;
use crate::errors::{Result, RotaVaultError};
use crate::guard::{FileLock, LockStatus, RotationLock};
use crate::store::{ApplicationState, FileAppState};

/// Execute the `unlock` command.
///
/// Only clears a held lock when it is stale, unless `--force` is
/// given.  Also clears the maintenance marker, since a crashed
/// rotation leaves both behind.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let lock = FileLock::new(lock_path(cli)?, settings.lock_stale_secs);

    match lock.status()? {
        LockStatus::Free => {
            output::info("Rotation lock is already free.");
        }
        LockStatus::Held { holder, stale, .. } => {
            if !stale && !force {
                return Err(RotaVaultError::CommandFailed(format!(
                    "lock is held by '{holder}' and not yet stale — a rotation may still be running; use --force only if you are sure it is dead"
                )));
            }
            lock.force_release()?;
            log_audit(cli, "unlock", None, Some(&holder));
            output::success(&format!("Cleared rotation lock held by '{holder}'"));
        }
    }

    let mut app = FileAppState::new(maintenance_path(cli)?);
    if app.is_maintenance() {
        app.exit_maintenance()?;
        output::success("Cleared maintenance marker");
    }

    Ok(())
}
