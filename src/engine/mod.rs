//! Rotation engine — the coordinator and its request type.

pub mod coordinator;
pub mod request;

pub use coordinator::{RotationConfig, RotationCoordinator, RotationState, RotationSummary};
pub use request::RotationRequest;
