//! Error types for the sound trigger scheduler

use thiserror::Error;

/// Core error type
///
/// Only authoring and setup paths return errors. Triggering a sound at
/// runtime never fails loudly; its outcomes are reported as values.
#[derive(Error, Debug)]
pub enum SfxError {
    #[error("Invalid range [{min}, {max}]")]
    InvalidRange { min: f32, max: f32 },

    #[error("Invalid descriptor '{name}': {reason}")]
    InvalidDescriptor { name: String, reason: String },

    #[error("Duplicate descriptor name: {0}")]
    DuplicateDescriptor(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Command queue full")]
    QueueFull,
}

impl SfxError {
    /// Shorthand for a descriptor validation failure
    pub fn invalid_descriptor(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
pub type SfxResult<T> = Result<T, SfxError>;
