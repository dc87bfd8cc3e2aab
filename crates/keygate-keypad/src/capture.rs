//! Column edge capture.
//!
//! The capture runs inside the column edge interrupt. It masks further
//! column edges, freezes the row scanner on the row that produced the edge,
//! reads the combined row/column pattern, decodes it and arms the debouncer.
//! Edges stay masked until the debouncer confirms the release, so one press
//! produces exactly one keystroke however much the contact bounces.

use keygate_core::Keystroke;
use keygate_hardware::KeypadPort;
use tracing::{debug, warn};

use crate::debouncer::Debouncer;
use crate::decoder::KeyDecoder;
use crate::scanner::RowScanner;

/// Edge-triggered key capture.
#[derive(Debug, Clone, Default)]
pub struct EdgeCapture {
    last_pattern: Option<u8>,
    captures: u64,
}

impl EdgeCapture {
    /// Create a capture unit that has not seen any edge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the key behind a column edge.
    ///
    /// Returns `None` for an edge delivered while edges are masked, which
    /// only happens if the interrupt raced with the mask.
    pub fn capture<K: KeypadPort>(
        &mut self,
        port: &mut K,
        scanner: &mut RowScanner,
        debouncer: &mut Debouncer,
    ) -> Option<Keystroke> {
        if !port.edge_interrupts_enabled() {
            warn!("column edge while edges are masked, ignored");
            return None;
        }

        port.set_edge_interrupts(false);
        scanner.freeze();

        let columns = port.read_columns() & 0x0F;
        let pattern = (columns << 4) | scanner.pattern();
        let keystroke = KeyDecoder::decode(pattern);

        debouncer.arm();
        self.last_pattern = Some(pattern);
        self.captures += 1;

        // Key values and patterns stay out of the log.
        debug!(
            captures = self.captures,
            undecodable = keystroke.is_undecodable(),
            "key captured"
        );
        Some(keystroke)
    }

    /// Unmask column edges after a confirmed release.
    pub fn rearm<K: KeypadPort>(&mut self, port: &mut K) {
        port.set_edge_interrupts(true);
    }

    /// Pattern byte of the last capture.
    pub fn last_pattern(&self) -> Option<u8> {
        self.last_pattern
    }

    /// Number of captures since power-on.
    pub fn captures(&self) -> u64 {
        self.captures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debouncer::DebounceState;
    use crate::scanner::ScanState;
    use keygate_core::Symbol;
    use keygate_hardware::mock::MockKeypad;

    #[test]
    fn test_capture_decodes_and_masks() {
        let (mut keypad, handle) = MockKeypad::new();
        let mut scanner = RowScanner::new();
        let mut debouncer = Debouncer::new();
        let mut capture = EdgeCapture::new();

        keypad.set_edge_interrupts(true);
        scanner.start(&mut keypad);
        scanner.tick(&mut keypad);
        scanner.tick(&mut keypad); // row 2: 7 8 9 C
        handle.press(Symbol::from_char('9').unwrap());

        let key = capture.capture(&mut keypad, &mut scanner, &mut debouncer);

        assert_eq!(key, Some(Keystroke::Symbol(Symbol::new(9).unwrap())));
        assert_eq!(capture.last_pattern(), Some(0x22));
        assert_eq!(capture.captures(), 1);
        assert!(!keypad.edge_interrupts_enabled());
        assert_eq!(scanner.state(), ScanState::Frozen);
        assert_eq!(debouncer.state(), DebounceState::Armed);
    }

    #[test]
    fn test_two_keys_on_row_is_undecodable() {
        let (mut keypad, handle) = MockKeypad::new();
        let mut scanner = RowScanner::new();
        let mut debouncer = Debouncer::new();
        let mut capture = EdgeCapture::new();

        keypad.set_edge_interrupts(true);
        scanner.start(&mut keypad);
        handle.press_keys(&[Symbol::new(1).unwrap(), Symbol::new(2).unwrap()]);

        let key = capture.capture(&mut keypad, &mut scanner, &mut debouncer);
        assert_eq!(key, Some(Keystroke::Undecodable));
    }

    #[test]
    fn test_masked_edge_is_dropped() {
        let (mut keypad, _handle) = MockKeypad::new();
        let mut scanner = RowScanner::new();
        let mut debouncer = Debouncer::new();
        let mut capture = EdgeCapture::new();

        let key = capture.capture(&mut keypad, &mut scanner, &mut debouncer);
        assert_eq!(key, None);
        assert_eq!(scanner.state(), ScanState::Scanning);
        assert!(debouncer.is_idle());

        capture.rearm(&mut keypad);
        assert!(keypad.edge_interrupts_enabled());
    }
}
