//! `rotavault show` — print a record's plaintext value.

use crate::cli::{log_audit, prompt_passphrase, store_path, Cli};
use crate::errors::Result;
use crate::store::FileStore;

/// Execute the `show` command.
///
/// Prints the raw value to stdout so it can be piped.
pub fn execute(cli: &Cli, label: &str) -> Result<()> {
    let path = store_path(cli)?;
    let passphrase = prompt_passphrase()?;
    let store = FileStore::open(&path, &passphrase)?;

    let value = store.record_plaintext(label)?;
    println!("{value}");

    log_audit(cli, "show", Some(label), None);

    Ok(())
}
