//! Core types shared by every keygate crate.
//!
//! Keypad symbols, keystrokes, verification outcomes, timing constants and
//! the common error type live here so that the hardware, keypad, access and
//! emulator layers agree on a single vocabulary.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
