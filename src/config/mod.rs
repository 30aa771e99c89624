//! Configuration loading for `.rotavault.toml`.

pub mod settings;

pub use settings::Settings;
