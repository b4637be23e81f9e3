//! Error types shared by every processing stage

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Insufficient data: need at least {required} samples, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Transform failed: {0}")]
    Transform(String),
}

pub type Result<T> = std::result::Result<T, DspError>;

impl DspError {
    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        DspError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Reject sequences shorter than `required` samples
pub(crate) fn require_len(available: usize, required: usize) -> Result<()> {
    if available < required {
        return Err(DspError::InsufficientData {
            required,
            available,
        });
    }
    Ok(())
}
