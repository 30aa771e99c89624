//! `rotavault completions` — generate shell completion scripts.

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{Result, RotaVaultError};

/// Execute the `completions` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell: Shell = shell.parse().map_err(|_| {
        RotaVaultError::CommandFailed(format!(
            "unknown shell '{shell}' — expected bash, zsh, fish, or powershell"
        ))
    })?;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
    Ok(())
}
