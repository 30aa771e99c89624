//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use clap::Parser;

use zeroize::Zeroizing;

use crate::errors::{Result, RotaVaultError};

/// RotaVault CLI: master-passphrase rotation for encrypted credential stores.
#[derive(Parser)]
#[command(
    name = "rotavault",
    about = "Encrypted credential store with master-passphrase rotation",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Store to use (default: main)
    #[arg(short, long, default_value = "main", global = true)]
    pub name: String,

    /// Store directory (default: .rotavault)
    #[arg(long, default_value = ".rotavault", global = true)]
    pub store_dir: String,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new store
    Init,

    /// Add an encrypted record
    Add {
        /// Record label (e.g. prod-db-password)
        label: String,
        /// Record value (omit for interactive prompt)
        value: Option<String>,
    },

    /// Show a record's plaintext value
    Show {
        /// Record label
        label: String,
    },

    /// List all records
    List,

    /// Enroll a user: wrap the master key under their login password
    Enroll {
        /// User identifier (e.g. alice)
        user_id: String,
    },

    /// Rotate the master passphrase, re-encrypting every record
    Rotate {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show store, lock, and maintenance status
    Status,

    /// Clear a stale rotation lock left behind by a crash
    Unlock {
        /// Clear the lock even if it is not yet stale
        #[arg(long)]
        force: bool,
    },

    /// View the audit log of store operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the current master passphrase, trying in order:
/// 1. `ROTAVAULT_PASSPHRASE` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_passphrase() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("ROTAVAULT_PASSPHRASE") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master passphrase")
        .interact()
        .map_err(|e| RotaVaultError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master passphrase with confirmation (used by
/// `init` and `rotate`).
///
/// Also respects `ROTAVAULT_NEW_PASSPHRASE` for scripted/CI usage.
/// Enforces the configured minimum passphrase length.
///
/// Returns `Zeroizing<String>` so the passphrase is wiped from memory on drop.
pub fn prompt_new_passphrase(min_len: usize) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("ROTAVAULT_NEW_PASSPHRASE") {
        if !pw.is_empty() {
            if pw.len() < min_len {
                return Err(RotaVaultError::WeakPassphrase(format!(
                    "passphrase must be at least {min_len} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let passphrase = dialoguer::Password::new()
            .with_prompt("Choose master passphrase")
            .with_confirmation(
                "Confirm master passphrase",
                "Passphrases do not match, try again",
            )
            .interact()
            .map_err(|e| RotaVaultError::CommandFailed(format!("passphrase prompt: {e}")))?;

        if passphrase.len() < min_len {
            output::warning(&format!(
                "Passphrase must be at least {min_len} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(passphrase));
    }
}

/// Build the full path to a store file from the CLI arguments.
///
/// Example: `<cwd>/.rotavault/main.store`
pub fn store_path(cli: &Cli) -> Result<std::path::PathBuf> {
    let cwd = std::env::current_dir()?;
    let name = &cli.name;
    Ok(cwd.join(&cli.store_dir).join(format!("{name}.store")))
}

/// Path of the rotation lock file for the selected store.
pub fn lock_path(cli: &Cli) -> Result<std::path::PathBuf> {
    let cwd = std::env::current_dir()?;
    let name = &cli.name;
    Ok(cwd.join(&cli.store_dir).join(format!("{name}.lock")))
}

/// Path of the maintenance marker for the selected store.
pub fn maintenance_path(cli: &Cli) -> Result<std::path::PathBuf> {
    let cwd = std::env::current_dir()?;
    let name = &cli.name;
    Ok(cwd.join(&cli.store_dir).join(format!("{name}.maintenance")))
}

/// Log an audit event if the `audit-log` feature is enabled.
#[cfg(feature = "audit-log")]
pub fn log_audit(cli: &Cli, op: &str, record_label: Option<&str>, details: Option<&str>) {
    crate::audit::log_audit(cli, op, record_label, details);
}

#[cfg(not(feature = "audit-log"))]
pub fn log_audit(_cli: &Cli, _op: &str, _record_label: Option<&str>, _details: Option<&str>) {}

/// Validate that a store name is safe and sensible.
///
/// Allowed: lowercase letters, digits, hyphens. Must not be empty
/// or start/end with a hyphen. Max length 64 characters.
/// This prevents accidental typos from silently creating new store files.
pub fn validate_store_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RotaVaultError::ConfigError(
            "store name cannot be empty".into(),
        ));
    }

    if name.len() > 64 {
        return Err(RotaVaultError::ConfigError(
            "store name cannot exceed 64 characters".into(),
        ));
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(RotaVaultError::ConfigError(format!(
            "store name '{name}' contains invalid characters — only lowercase letters, digits, and hyphens are allowed"
        )));
    }

    if name.starts_with('-') || name.ends_with('-') {
        return Err(RotaVaultError::ConfigError(
            "store name cannot start or end with a hyphen".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_store_names() {
        for name in ["main", "prod", "team-a", "store2"] {
            assert!(validate_store_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn invalid_store_names() {
        for name in ["", "Main", "has space", "-leading", "trailing-", "a..b"] {
            assert!(
                validate_store_name(name).is_err(),
                "{name:?} should be invalid"
            );
        }
    }
}
