//! `rotavault init` — create a new encrypted store.

use crate::cli::{log_audit, output, prompt_new_passphrase, store_path, Cli};
use crate::config::Settings;
use crate::errors::{Result, RotaVaultError};
use crate::store::FileStore;

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = store_path(cli)?;
    if path.exists() {
        return Err(RotaVaultError::StoreAlreadyExists(path));
    }

    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    output::info("Choose the master passphrase for the new store.");
    let passphrase = prompt_new_passphrase(settings.min_passphrase_len)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = FileStore::create(
        &path,
        &passphrase,
        &cli.name,
        &settings.argon2_params(),
        settings.min_passphrase_len,
    )?;

    log_audit(cli, "init", None, Some("store created"));

    output::success(&format!(
        "Created store '{}' at {}",
        store.name(),
        store.path().display()
    ));
    output::tip("Run `rotavault add <LABEL>` to add your first record.");

    Ok(())
}
