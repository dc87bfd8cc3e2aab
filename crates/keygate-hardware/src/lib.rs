//! Hardware abstraction layer for the keygate access-control device.
//!
//! This crate provides trait-based abstractions for the peripherals the
//! access-control core drives from its interrupt handlers: the matrix keypad
//! lines, the alarm channels of the timer peripheral and the LED panel. The
//! traits let the core run unchanged against real drivers or against the
//! mock implementations in [`mock`].
//!
//! # Design Philosophy
//!
//! - **Interrupt-safe**: every operation is synchronous and non-blocking,
//!   so it can be called from a handler that must run to completion.
//! - **Single context**: handlers are serialized by the dispatcher, so the
//!   traits take `&mut self` and need no internal locking.
//! - **Rules at the seam**: channel exclusivity (row scan vs debounce) is
//!   checked by [`AlarmService::check_schedule`] rather than left to callers.
//!
//! # Device Traits
//!
//! ## Keypad
//!
//! ```
//! use keygate_hardware::traits::KeypadPort;
//!
//! fn scan_step<K: KeypadPort>(keypad: &mut K, row: u8) -> Option<u8> {
//!     keypad.drive_rows(row);
//!     let columns = keypad.read_columns();
//!     (columns != 0).then_some(columns << 4 | row)
//! }
//! ```
//!
//! ## Alarms
//!
//! ```
//! use std::time::Duration;
//! use keygate_hardware::traits::AlarmService;
//! use keygate_hardware::{AlarmChannel, AlarmMode, Result};
//!
//! fn start_scanning<A: AlarmService>(alarms: &mut A) -> Result<()> {
//!     alarms.cancel(AlarmChannel::Debounce);
//!     alarms.schedule(AlarmChannel::RowScan, Duration::from_millis(2), AlarmMode::Periodic)
//! }
//! ```
//!
//! ## Indicators
//!
//! ```
//! use keygate_hardware::traits::IndicatorPanel;
//! use keygate_hardware::Indicator;
//!
//! fn show_ready<P: IndicatorPanel>(panel: &mut P) {
//!     panel.set(Indicator::Success, false);
//!     panel.set(Indicator::Failure, false);
//!     panel.set(Indicator::Status, true);
//! }
//! ```
//!
//! # Error Handling
//!
//! Fallible operations return [`Result<T>`][error::Result] with the
//! [`HardwareError`] error type.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{AlarmService, IndicatorPanel, KeypadPort};
pub use types::{AlarmChannel, AlarmMode, Indicator, Interrupt, LedColor};
