pub mod cli;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod errors;
pub mod guard;
pub mod report;
pub mod store;

#[cfg(feature = "audit-log")]
pub mod audit;
