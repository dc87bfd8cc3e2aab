//! Error types for hardware operations.
//!
//! The device seams themselves cannot fail; only alarm scheduling is checked.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Two mutually exclusive alarm channels would be armed together.
    #[error("Alarm channel {requested} cannot be armed while {active} is armed")]
    ChannelConflict { active: String, requested: String },

    /// An alarm was requested with a zero delay.
    #[error("Invalid alarm delay for {channel}: delay must be non-zero")]
    ZeroDelay { channel: String },
}

impl HardwareError {
    /// Create a new channel conflict error.
    pub fn channel_conflict(active: impl ToString, requested: impl ToString) -> Self {
        Self::ChannelConflict {
            active: active.to_string(),
            requested: requested.to_string(),
        }
    }

    /// Create a new zero delay error.
    pub fn zero_delay(channel: impl ToString) -> Self {
        Self::ZeroDelay {
            channel: channel.to_string(),
        }
    }
}
