//! Property-based tests for the keypad front end.
//!
//! These tests use proptest to generate keystroke streams and column
//! readings and check the ring buffer and debouncer invariants for all of
//! them.

use std::time::Duration;

use keygate_core::{Keystroke, Symbol};
use keygate_hardware::mock::{ManualAlarms, MockKeypad};
use keygate_hardware::{AlarmChannel, AlarmService, KeypadPort};
use keygate_keypad::{DebounceState, Debouncer, KeyHistory, MatrixKeypad, SampleOutcome};
use proptest::prelude::*;

/// Strategy for generating keystrokes, mostly decodable.
fn keystroke() -> impl Strategy<Value = Keystroke> {
    prop_oneof![
        9 => (0u8..16).prop_map(|value| Keystroke::Symbol(Symbol::new(value).unwrap())),
        1 => Just(Keystroke::Undecodable),
    ]
}

/// Strategy for generating raw column nibbles.
fn column_reading() -> impl Strategy<Value = u8> {
    prop_oneof![Just(0u8), 1u8..16]
}

proptest! {
    /// Property: the history holds the newest ten keystrokes, newest first.
    #[test]
    fn prop_history_keeps_last_ten(stream in prop::collection::vec(keystroke(), 0..40)) {
        let mut history = KeyHistory::new();
        for keystroke in &stream {
            history.push(*keystroke);
        }

        let expected: Vec<Keystroke> = stream.iter().rev().take(10).copied().collect();
        prop_assert_eq!(history.len(), expected.len());
        prop_assert_eq!(history.iter().collect::<Vec<_>>(), expected.clone());

        let mut oldest_first = expected;
        oldest_first.reverse();
        prop_assert_eq!(history.chronological(), oldest_first);
    }

    /// Property: release is reported exactly when two zero readings in a row
    /// follow the arm, and never before.
    #[test]
    fn prop_release_needs_two_consecutive_zeros(
        readings in prop::collection::vec(column_reading(), 1..60),
    ) {
        let mut debouncer = Debouncer::new();
        debouncer.arm();

        let mut previous_zero = false;
        for reading in readings {
            let outcome = debouncer.sample(reading);
            let zero = reading == 0;

            if zero && previous_zero {
                prop_assert_eq!(outcome, SampleOutcome::Released);
                prop_assert_eq!(debouncer.state(), DebounceState::Idle);
                break;
            }
            prop_assert_ne!(outcome, SampleOutcome::Released);
            previous_zero = zero;
        }
    }

    /// Property: a press yields one keystroke however much the contact
    /// chatters while it is held.
    #[test]
    fn prop_chatter_yields_single_capture(
        value in 0u8..16,
        bounces in 0usize..20,
    ) {
        let symbol = Symbol::new(value).unwrap();
        let (mut port, handle) = MockKeypad::new();
        let mut alarms = ManualAlarms::new();
        let mut keypad = MatrixKeypad::new(Duration::from_millis(2), Duration::from_millis(100));
        keypad.start(&mut port, &mut alarms).unwrap();

        handle.press(symbol);
        let mut captured = Vec::new();
        let limit = Duration::from_secs(2);

        let mut released = false;
        loop {
            if port.acknowledge_edge()
                && let Some(key) = keypad.on_column_edge(&mut port, &mut alarms).unwrap()
            {
                captured.push(key);
                handle.chatter(bounces);
                handle.release();
            }

            let Some(channel) = alarms.pop_due(limit) else {
                break;
            };
            match channel {
                AlarmChannel::RowScan => keypad.on_scan_tick(&mut port),
                AlarmChannel::Debounce => {
                    if keypad.on_debounce_sample(&mut port, &mut alarms).unwrap()
                        == SampleOutcome::Released
                    {
                        released = true;
                        break;
                    }
                }
                _ => {}
            }
        }

        prop_assert!(released);
        prop_assert_eq!(captured, vec![Keystroke::Symbol(symbol)]);
        prop_assert!(alarms.is_armed(AlarmChannel::RowScan));
    }
}
