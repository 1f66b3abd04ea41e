//! Domain models for the NeuroKeep system.

mod bp;
mod demo_request;
mod event;
mod medication;
mod patient;

pub use bp::*;
pub use demo_request::*;
pub use event::*;
pub use medication::*;
pub use patient::*;

use thiserror::Error;

/// Validation errors raised while building models from untrusted input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid dosing window: {0}")]
    InvalidWindow(String),

    #[error("Invalid blood pressure reading: {0}")]
    InvalidReading(String),

    #[error("Unknown role: {0}")]
    InvalidRole(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
