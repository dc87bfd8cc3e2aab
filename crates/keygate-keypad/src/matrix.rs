//! Keypad front end: scanner, capture and debouncer on two exclusive clocks.
//!
//! [`MatrixKeypad`] owns the three keypad state machines and keeps the
//! hardware resources consistent with them:
//!
//! ```text
//!            column edge                      two zero samples
//!   Scanning ───────────► Frozen/Debouncing ─────────────────► Scanning
//!   RowScan armed          RowScan cancelled                    Debounce cancelled
//!   edges enabled          Debounce armed                       RowScan armed
//!                          edges masked                         edges enabled
//! ```
//!
//! The row-scan and debounce channels are never armed at the same time, and
//! column edges stay masked for the whole capture-and-debounce cycle.

use std::time::Duration;

use keygate_core::Keystroke;
use keygate_hardware::{AlarmChannel, AlarmMode, AlarmService, KeypadPort, Result};
use tracing::debug;

use crate::capture::EdgeCapture;
use crate::debouncer::{Debouncer, SampleOutcome};
use crate::scanner::RowScanner;

/// Interrupt-driven matrix keypad front end.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use keygate_core::Symbol;
/// use keygate_hardware::mock::{ManualAlarms, MockKeypad};
/// use keygate_hardware::{AlarmChannel, AlarmService};
/// use keygate_keypad::MatrixKeypad;
///
/// let (mut port, handle) = MockKeypad::new();
/// let mut alarms = ManualAlarms::new();
/// let mut keypad = MatrixKeypad::new(Duration::from_millis(2), Duration::from_millis(100));
/// keypad.start(&mut port, &mut alarms).unwrap();
///
/// handle.press(Symbol::from_char('1').unwrap()); // row 0 is driven at power-on
/// let key = keypad.on_column_edge(&mut port, &mut alarms).unwrap();
///
/// assert_eq!(key.unwrap().to_string(), "1");
/// assert!(alarms.is_armed(AlarmChannel::Debounce));
/// assert!(!alarms.is_armed(AlarmChannel::RowScan));
/// ```
#[derive(Debug, Clone)]
pub struct MatrixKeypad {
    scanner: RowScanner,
    debouncer: Debouncer,
    capture: EdgeCapture,
    scan_period: Duration,
    debounce_period: Duration,
}

impl MatrixKeypad {
    /// Create a front end with the given row-scan and debounce periods.
    pub fn new(scan_period: Duration, debounce_period: Duration) -> Self {
        Self {
            scanner: RowScanner::new(),
            debouncer: Debouncer::new(),
            capture: EdgeCapture::new(),
            scan_period,
            debounce_period,
        }
    }

    /// Power-on: drive the first row, unmask edges, start the row-scan clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the row-scan channel cannot be armed.
    pub fn start<K: KeypadPort, A: AlarmService>(&mut self, port: &mut K, alarms: &mut A) -> Result<()> {
        alarms.cancel(AlarmChannel::Debounce);
        self.scanner.start(port);
        self.capture.rearm(port);
        alarms.schedule(AlarmChannel::RowScan, self.scan_period, AlarmMode::Periodic)
    }

    /// Row-scan tick handler.
    pub fn on_scan_tick<K: KeypadPort>(&mut self, port: &mut K) {
        self.scanner.tick(port);
    }

    /// Column edge handler.
    ///
    /// Returns the captured keystroke, or `None` for a spurious edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the debounce channel cannot be armed.
    pub fn on_column_edge<K: KeypadPort, A: AlarmService>(
        &mut self,
        port: &mut K,
        alarms: &mut A,
    ) -> Result<Option<Keystroke>> {
        let Some(keystroke) = self.capture.capture(port, &mut self.scanner, &mut self.debouncer)
        else {
            return Ok(None);
        };

        alarms.cancel(AlarmChannel::RowScan);
        alarms.schedule(AlarmChannel::Debounce, self.debounce_period, AlarmMode::Periodic)?;
        Ok(Some(keystroke))
    }

    /// Debounce sample handler.
    ///
    /// On confirmed release the debounce clock stops, the scanner resumes
    /// and column edges are unmasked again.
    ///
    /// # Errors
    ///
    /// Returns an error if the row-scan channel cannot be re-armed.
    pub fn on_debounce_sample<K: KeypadPort, A: AlarmService>(
        &mut self,
        port: &mut K,
        alarms: &mut A,
    ) -> Result<SampleOutcome> {
        let outcome = self.debouncer.sample(port.read_columns());

        if outcome == SampleOutcome::Released {
            alarms.cancel(AlarmChannel::Debounce);
            self.scanner.resume();
            alarms.schedule(AlarmChannel::RowScan, self.scan_period, AlarmMode::Periodic)?;
            self.capture.rearm(port);
            debug!("key release confirmed, scanning resumed");
        }

        Ok(outcome)
    }

    /// Row scanner state.
    pub fn scanner(&self) -> &RowScanner {
        &self.scanner
    }

    /// Debouncer state.
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Edge capture state.
    pub fn capture(&self) -> &EdgeCapture {
        &self.capture
    }
}
