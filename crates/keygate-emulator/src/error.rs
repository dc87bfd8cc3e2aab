use keygate_hardware::HardwareError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error(transparent)]
    Core(#[from] keygate_core::Error),

    #[error(transparent)]
    Hardware(#[from] HardwareError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Runtime stopped: {0}")]
    RuntimeStopped(String),
}

impl EmulatorError {
    /// Create a new invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
