//! One-hot row scanner.
//!
//! On every row-scan tick the scanner advances to the next of the four rows
//! and drives its one-hot pattern on the row outputs. While a key is being
//! debounced the scanner is frozen, holding the row of the captured key so
//! that the debouncer samples the right contact.

use std::fmt;

use keygate_core::constants::{KEYPAD_ROWS, row_bit};
use keygate_hardware::KeypadPort;
use tracing::trace;

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Advancing one row per tick.
    Scanning,

    /// Holding the last driven row.
    Frozen,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanState::Scanning => write!(f, "Scanning"),
            ScanState::Frozen => write!(f, "Frozen"),
        }
    }
}

/// Periodic one-hot row driver.
///
/// # Examples
///
/// ```
/// use keygate_hardware::mock::MockKeypad;
/// use keygate_keypad::RowScanner;
///
/// let (mut keypad, handle) = MockKeypad::new();
/// let mut scanner = RowScanner::new();
///
/// scanner.start(&mut keypad);
/// assert_eq!(handle.driven_rows(), 0x08);
///
/// scanner.tick(&mut keypad);
/// assert_eq!(handle.driven_rows(), 0x04);
/// ```
#[derive(Debug, Clone)]
pub struct RowScanner {
    state: ScanState,
    row: usize,
}

impl RowScanner {
    /// Create a scanner positioned on row 0, scanning.
    pub fn new() -> Self {
        Self {
            state: ScanState::Scanning,
            row: 0,
        }
    }

    /// Drive the current row without advancing (power-on).
    pub fn start<K: KeypadPort>(&mut self, port: &mut K) {
        self.state = ScanState::Scanning;
        port.drive_rows(self.pattern());
    }

    /// Handle one row-scan tick.
    ///
    /// Returns `true` if the scanner advanced; a frozen scanner ignores the
    /// tick.
    pub fn tick<K: KeypadPort>(&mut self, port: &mut K) -> bool {
        if self.state == ScanState::Frozen {
            return false;
        }
        self.row = (self.row + 1) % KEYPAD_ROWS;
        port.drive_rows(self.pattern());
        trace!(row = self.row, "row scan");
        true
    }

    /// Stop advancing and hold the current row.
    pub fn freeze(&mut self) {
        self.state = ScanState::Frozen;
    }

    /// Resume advancing on the next tick.
    pub fn resume(&mut self) {
        self.state = ScanState::Scanning;
    }

    /// Current scanner state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Index of the row currently driven.
    pub fn row(&self) -> usize {
        self.row
    }

    /// One-hot row nibble currently driven.
    pub fn pattern(&self) -> u8 {
        row_bit(self.row)
    }
}

impl Default for RowScanner {
    fn default() -> Self {
        Self::new()
    }
}
