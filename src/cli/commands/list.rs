//! `rotavault list` — list record metadata.

use crate::cli::{output, prompt_passphrase, store_path, Cli};
use crate::errors::Result;
use crate::store::FileStore;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = store_path(cli)?;
    let passphrase = prompt_passphrase()?;
    let store = FileStore::open(&path, &passphrase)?;

    output::print_records_table(&store.list_records());
    Ok(())
}
