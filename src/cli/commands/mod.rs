//! Implementations of each CLI subcommand.

pub mod add;
pub mod audit_cmd;
pub mod completions;
pub mod enroll;
pub mod init;
pub mod list;
pub mod rotate;
pub mod show;
pub mod status;
pub mod unlock;
