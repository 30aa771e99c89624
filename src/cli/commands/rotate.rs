//! `rotavault rotate` — change the master passphrase.
//!
//! Collects the old and new passphrases, then hands a fully-formed
//! `RotationRequest` to the rotation coordinator.  All interactivity
//! lives here; the coordinator re-verifies the old passphrase itself
//! and never prompts.

use crate::cli::output::ConsoleReporter;
use crate::cli::{
    lock_path, log_audit, maintenance_path, output, prompt_new_passphrase, prompt_passphrase,
    store_path, Cli,
};
use crate::config::Settings;
use crate::engine::{RotationConfig, RotationCoordinator, RotationRequest};
use crate::errors::{Result, RotaVaultError};
use crate::guard::FileLock;
use crate::store::{ApplicationState, FileAppState, FileStore};

/// Execute the `rotate` command.
pub fn execute(cli: &Cli, yes: bool) -> Result<()> {
    let path = store_path(cli)?;
    if !path.exists() {
        return Err(RotaVaultError::StoreNotFound(path));
    }

    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    // Refuse up front if the store is already in maintenance — either a
    // rotation is running or a crashed one needs operator attention.
    let mut app = FileAppState::new(maintenance_path(cli)?);
    if app.is_maintenance() {
        return Err(RotaVaultError::CommandFailed(
            "store is in maintenance mode — a rotation may be running or crashed; run `rotavault status`".into(),
        ));
    }

    // 1. Open the store with the current passphrase.  This is an early
    //    courtesy check; the coordinator verifies again on its own.
    output::info("Enter your current master passphrase.");
    let old_passphrase = prompt_passphrase()?;
    let mut store = FileStore::open(&path, &old_passphrase)?;

    // 2. Prompt for the new passphrase.
    output::info("Choose the new master passphrase.");
    let new_passphrase = prompt_new_passphrase(settings.min_passphrase_len)?;

    // 3. Confirm.  Rotation is documented as "do not interrupt".
    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!(
                "Re-encrypt all {} records under the new passphrase? Do not interrupt once started.",
                store.record_count()
            ))
            .default(false)
            .interact()
            .map_err(|e| RotaVaultError::CommandFailed(format!("confirm prompt: {e}")))?;
        if !confirmed {
            return Err(RotaVaultError::UserCancelled);
        }
    }

    log_audit(cli, "rotate-begin", None, None);

    // 4. Run the coordinator.
    let lock = FileLock::new(lock_path(cli)?, settings.lock_stale_secs);
    let reporter = ConsoleReporter;
    let config = RotationConfig {
        holder: format!("cli:{}", std::process::id()),
        argon2_params: settings.argon2_params(),
        min_passphrase_len: settings.min_passphrase_len,
    };

    let request = RotationRequest::new(&old_passphrase, &new_passphrase, store.verifier().clone());

    let mut coordinator =
        RotationCoordinator::new(&mut store, &lock, &mut app, &reporter, config);

    match coordinator.rotate(request) {
        Ok(summary) => {
            log_audit(
                cli,
                "rotate-completed",
                None,
                Some(&format!(
                    "{} records re-encrypted, {} user vaults invalidated",
                    summary.records_rotated, summary.vaults_invalidated
                )),
            );
            for warning in &summary.cleanup_warnings {
                output::warning(warning);
            }
            if summary.vaults_invalidated > 0 {
                output::warning(&format!(
                    "{} user vault(s) marked stale — users must re-authenticate to refresh them",
                    summary.vaults_invalidated
                ));
            }
            Ok(())
        }
        Err(e) => {
            log_audit(cli, "rotate-aborted", None, Some(e.kind()));
            Err(e)
        }
    }
}
