//! Error types for the motion-field core.

use thiserror::Error;

/// Errors produced by field construction and its supporting helpers.
///
/// `ParticleField::step` never returns an error; everything here is raised
/// up front, before the first frame is rendered.
#[derive(Debug, Error)]
pub enum FieldError {
    /// A field configuration value was out of range (zero grid dimension,
    /// non-positive spacing, non-finite constant, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

impl FieldError {
    /// Shorthand for building a [`FieldError::InvalidConfiguration`].
    pub fn config(msg: impl Into<String>) -> Self {
        FieldError::InvalidConfiguration(msg.into())
    }
}
