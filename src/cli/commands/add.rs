//! `rotavault add` — add an encrypted record to the store.

use crate::cli::{log_audit, output, prompt_passphrase, store_path, Cli};
use crate::errors::{Result, RotaVaultError};
use crate::store::FileStore;

/// Execute the `add` command.
///
/// If `value` is `None`, the value is read from a hidden prompt so it
/// never appears in shell history.
pub fn execute(cli: &Cli, label: &str, value: Option<&str>) -> Result<()> {
    let path = store_path(cli)?;
    let passphrase = prompt_passphrase()?;
    let mut store = FileStore::open(&path, &passphrase)?;

    let value = match value {
        Some(v) => v.to_string(),
        None => dialoguer::Password::new()
            .with_prompt(format!("Value for '{label}'"))
            .interact()
            .map_err(|e| RotaVaultError::CommandFailed(format!("value prompt: {e}")))?,
    };

    let id = store.add_record(label, &value)?;
    store.save()?;

    log_audit(cli, "add", Some(label), None);

    output::success(&format!("Added record '{label}' (id {id})"));
    Ok(())
}
