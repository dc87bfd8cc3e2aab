//! Mock matrix keypad for testing and development.
//!
//! This module provides a simulated 4×4 matrix keypad. The device side
//! ([`MockKeypad`]) implements [`KeypadPort`] and is owned by the core; the
//! [`MockKeypadHandle`] side lets tests or a front end press and release
//! keys, make contacts chatter and script raw column readings.
//!
//! Column levels follow the electrical model of the real matrix: a pressed
//! key only shows up on its column while its row is driven. A rising edge is
//! latched whenever the column level goes from zero to non-zero with edge
//! interrupts enabled; edges that happen while interrupts are disabled are
//! lost.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use keygate_core::Symbol;
use keygate_core::constants::{column_bit, row_bit};

use crate::traits::KeypadPort;

/// Shared electrical state of the simulated matrix.
#[derive(Debug, Default)]
struct MatrixState {
    /// Keys currently held down, as `(row, column)`.
    pressed: Vec<(usize, usize)>,

    /// Row nibble currently driven by the scanner.
    driven_rows: u8,

    /// Column edge interrupt enable.
    edges_enabled: bool,

    /// Latched rising edge not yet acknowledged.
    edge_pending: bool,

    /// Last column level, used for edge detection.
    level: u8,

    /// Scripted readings returned by `read_columns` before the real level.
    scripted: VecDeque<u8>,

    /// Number of rising edges latched since creation.
    edges_latched: u64,
}

impl MatrixState {
    fn raw_columns(&self) -> u8 {
        self.pressed
            .iter()
            .filter(|(row, _)| row_bit(*row) & self.driven_rows != 0)
            .fold(0, |acc, (_, column)| acc | column_bit(*column))
    }

    fn set_level(&mut self, level: u8) {
        if self.edges_enabled && self.level == 0 && level != 0 {
            self.edge_pending = true;
            self.edges_latched += 1;
        }
        self.level = level;
    }

    fn refresh(&mut self) {
        let level = self.raw_columns();
        self.set_level(level);
    }
}

fn lock(state: &Mutex<MatrixState>) -> MutexGuard<'_, MatrixState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock keypad device for testing and development.
///
/// # Examples
///
/// ```
/// use keygate_core::Symbol;
/// use keygate_hardware::mock::MockKeypad;
/// use keygate_hardware::traits::KeypadPort;
///
/// let (mut keypad, handle) = MockKeypad::new();
/// keypad.set_edge_interrupts(true);
///
/// handle.press(Symbol::from_char('5').unwrap());
/// keypad.drive_rows(0x04); // row 1 carries 4 5 6 B
///
/// assert!(keypad.acknowledge_edge());
/// assert_eq!(keypad.read_columns(), 0x04); // column 1
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    state: Arc<Mutex<MatrixState>>,

    /// Device name
    name: String,
}

impl MockKeypad {
    /// Create a new mock keypad with the default name.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// is used to press and release keys.
    pub fn new() -> (Self, MockKeypadHandle) {
        Self::with_name("Mock Keypad".to_string())
    }

    /// Create a new mock keypad with a custom name.
    pub fn with_name(name: String) -> (Self, MockKeypadHandle) {
        let state = Arc::new(Mutex::new(MatrixState::default()));

        let keypad = Self {
            state: Arc::clone(&state),
            name: name.clone(),
        };

        let handle = MockKeypadHandle { state, name };

        (keypad, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for MockKeypad {
    fn default() -> Self {
        Self::new().0
    }
}

impl KeypadPort for MockKeypad {
    fn drive_rows(&mut self, pattern: u8) {
        let mut state = lock(&self.state);
        state.driven_rows = pattern;
        state.refresh();
    }

    fn read_columns(&mut self) -> u8 {
        let mut state = lock(&self.state);
        match state.scripted.pop_front() {
            Some(reading) => reading,
            None => state.raw_columns(),
        }
    }

    fn set_edge_interrupts(&mut self, enabled: bool) {
        let mut state = lock(&self.state);
        state.edges_enabled = enabled;
        if !enabled {
            state.edge_pending = false;
        }
    }

    fn edge_interrupts_enabled(&self) -> bool {
        lock(&self.state).edges_enabled
    }

    fn acknowledge_edge(&mut self) -> bool {
        std::mem::take(&mut lock(&self.state).edge_pending)
    }
}

/// Handle for controlling a mock keypad.
///
/// It can be cloned and shared across tasks; every clone acts on the same
/// simulated matrix.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    state: Arc<Mutex<MatrixState>>,

    /// Device name
    name: String,
}

impl MockKeypadHandle {
    /// Press a single key and hold it.
    ///
    /// Any key still held is released first.
    pub fn press(&self, symbol: Symbol) {
        self.press_keys(&[symbol]);
    }

    /// Press several keys at once and hold them.
    ///
    /// Two keys on the same row produce an undecodable column pattern.
    pub fn press_keys(&self, symbols: &[Symbol]) {
        let mut state = lock(&self.state);
        state.pressed = symbols.iter().map(Symbol::position).collect();
        state.refresh();
    }

    /// Release every held key.
    pub fn release(&self) {
        let mut state = lock(&self.state);
        state.pressed.clear();
        state.refresh();
    }

    /// Make the held contacts bounce `times` times (open then close again).
    pub fn chatter(&self, times: usize) {
        let mut state = lock(&self.state);
        for _ in 0..times {
            state.set_level(0);
            state.refresh();
        }
    }

    /// Queue raw column readings returned before the real level.
    ///
    /// This simulates a contact bouncing while the debouncer samples it.
    pub fn script_readings(&self, readings: &[u8]) {
        lock(&self.state).scripted.extend(readings.iter().copied());
    }

    /// Whether any key is currently held.
    pub fn is_pressed(&self) -> bool {
        !lock(&self.state).pressed.is_empty()
    }

    /// Row nibble currently driven by the device under test.
    pub fn driven_rows(&self) -> u8 {
        lock(&self.state).driven_rows
    }

    /// Whether the device under test has column edge interrupts enabled.
    pub fn edge_interrupts_enabled(&self) -> bool {
        lock(&self.state).edges_enabled
    }

    /// Number of rising edges latched so far.
    pub fn edges_latched(&self) -> u64 {
        lock(&self.state).edges_latched
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
