use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RotaVaultError};

/// Project-level configuration, loaded from `.rotavault.toml`.
///
/// Every field has a sensible default so RotaVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) where store files live.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Which store to use when none is specified (e.g. "main").
    #[serde(default = "default_store_name")]
    pub default_store: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Minimum master-passphrase length (default: 8).
    #[serde(default = "default_min_passphrase_len")]
    pub min_passphrase_len: usize,

    /// Seconds after which a held rotation lock counts as stale
    /// (default: 3600 — one hour).
    #[serde(default = "default_lock_stale_secs")]
    pub lock_stale_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_store_dir() -> String {
    ".rotavault".to_string()
}

fn default_store_name() -> String {
    "main".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_min_passphrase_len() -> usize {
    8
}

fn default_lock_stale_secs() -> u64 {
    3_600
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            default_store: default_store_name(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            min_passphrase_len: default_min_passphrase_len(),
            lock_stale_secs: default_lock_stale_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".rotavault.toml";

    /// Load settings from `<project_dir>/.rotavault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            RotaVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Build the full path to a store file for a given name.
    ///
    /// Example: `project_dir/.rotavault/main.store`
    pub fn store_path(&self, project_dir: &Path, name: &str) -> PathBuf {
        project_dir.join(&self.store_dir).join(format!("{name}.store"))
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> crate::crypto::kdf::Argon2Params {
        crate::crypto::kdf::Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
