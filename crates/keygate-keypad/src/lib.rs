//! Interrupt-driven 4×4 matrix keypad front end.
//!
//! The keypad is read without polling: a periodic row-scan clock drives the
//! rows one at a time, a rising edge on any column captures the key, and a
//! slower debounce clock confirms the release before the next capture is
//! allowed.
//!
//! - [`KeyDecoder`]: pattern byte to symbol lookup
//! - [`RowScanner`]: one-hot row driver
//! - [`Debouncer`]: two-sample release confirmation
//! - [`EdgeCapture`]: column edge handler
//! - [`KeyHistory`]: ring buffer of the last ten keystrokes
//! - [`MatrixKeypad`]: the three state machines wired to the alarm channels

pub mod capture;
pub mod debouncer;
pub mod decoder;
pub mod history;
pub mod matrix;
pub mod scanner;

pub use capture::EdgeCapture;
pub use debouncer::{DebounceState, Debouncer, SampleOutcome};
pub use decoder::KeyDecoder;
pub use history::KeyHistory;
pub use matrix::MatrixKeypad;
pub use scanner::{RowScanner, ScanState};
