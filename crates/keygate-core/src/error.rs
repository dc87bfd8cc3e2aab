use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Symbol errors
    #[error("Invalid symbol value: {value} (expected 0-15)")]
    InvalidSymbol { value: u8 },

    #[error("Invalid symbol character: {0:?}")]
    InvalidSymbolChar(char),

    // Credential errors
    #[error("Invalid credential: {message}")]
    InvalidCredential { message: String },

    #[error("Duplicate user id: {0}")]
    DuplicateUserId(String),

    #[error("User table too small: {count} records, at least {minimum} required")]
    UserTableTooSmall { count: usize, minimum: usize },

    // State machine errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new invalid credential error.
    pub fn invalid_credential(message: impl Into<String>) -> Self {
        Self::InvalidCredential {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
