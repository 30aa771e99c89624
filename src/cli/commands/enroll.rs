//! `rotavault enroll` — wrap the master key under a user's login password.
//!
//! After enrollment the user can recover the master key from their
//! vault entry by re-authenticating, without the store ever holding
//! the key in recoverable plaintext outside an active session.

use crate::cli::{log_audit, output, prompt_passphrase, store_path, Cli};
use crate::config::Settings;
use crate::errors::{Result, RotaVaultError};
use crate::store::FileStore;

/// Execute the `enroll` command.
pub fn execute(cli: &Cli, user_id: &str) -> Result<()> {
    let path = store_path(cli)?;
    let passphrase = prompt_passphrase()?;
    let mut store = FileStore::open(&path, &passphrase)?;

    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    let login_password = match std::env::var("ROTAVAULT_LOGIN_PASSWORD") {
        Ok(pw) if !pw.is_empty() => pw,
        _ => dialoguer::Password::new()
            .with_prompt(format!("Login password for '{user_id}'"))
            .with_confirmation("Confirm login password", "Passwords do not match, try again")
            .interact()
            .map_err(|e| RotaVaultError::CommandFailed(format!("password prompt: {e}")))?,
    };

    store.enroll_user(user_id, &login_password, &settings.argon2_params())?;
    store.save()?;

    log_audit(cli, "enroll", None, Some(user_id));

    output::success(&format!("Enrolled user '{user_id}'"));
    Ok(())
}
