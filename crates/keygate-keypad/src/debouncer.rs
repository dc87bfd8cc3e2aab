//! Two-sample release debouncer.
//!
//! After a capture, the debouncer samples the column lines at a slow period
//! and only declares the key released once two consecutive samples read all
//! columns at zero. A zero followed by a non-zero reading is contact bounce
//! and restarts the confirmation.

use std::fmt;

/// Debouncer state.
///
/// `Armed` and `FirstZero` together make up the armed phase of the
/// double-zero check. The confirming second zero is not a resting state: the
/// same sample reports [`SampleOutcome::Released`] and returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// Not watching any key.
    Idle,

    /// Watching a captured key, no zero reading yet.
    Armed,

    /// One zero reading seen; the next zero confirms release.
    FirstZero,
}

impl fmt::Display for DebounceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebounceState::Idle => write!(f, "Idle"),
            DebounceState::Armed => write!(f, "Armed"),
            DebounceState::FirstZero => write!(f, "FirstZero"),
        }
    }
}

/// Result of one debounce sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// The debouncer is idle; the sample was not used.
    Ignored,

    /// The key is still held (or bounced back).
    Held,

    /// First zero reading; release not yet confirmed.
    FirstZero,

    /// Second consecutive zero reading: release confirmed, back to idle.
    Released,
}

/// Release debouncer for one captured key.
///
/// # Examples
///
/// ```
/// use keygate_keypad::{Debouncer, SampleOutcome};
///
/// let mut debouncer = Debouncer::new();
/// debouncer.arm();
///
/// assert_eq!(debouncer.sample(0x04), SampleOutcome::Held);
/// assert_eq!(debouncer.sample(0x00), SampleOutcome::FirstZero);
/// assert_eq!(debouncer.sample(0x04), SampleOutcome::Held); // bounce
/// assert_eq!(debouncer.sample(0x00), SampleOutcome::FirstZero);
/// assert_eq!(debouncer.sample(0x00), SampleOutcome::Released);
/// assert!(debouncer.is_idle());
/// ```
#[derive(Debug, Clone)]
pub struct Debouncer {
    state: DebounceState,
}

impl Debouncer {
    /// Create an idle debouncer.
    pub fn new() -> Self {
        Self {
            state: DebounceState::Idle,
        }
    }

    /// Start watching a freshly captured key.
    pub fn arm(&mut self) {
        self.state = DebounceState::Armed;
    }

    /// Feed one column reading.
    pub fn sample(&mut self, columns: u8) -> SampleOutcome {
        let released = columns == 0;
        match (self.state, released) {
            (DebounceState::Idle, _) => SampleOutcome::Ignored,
            (DebounceState::Armed, true) => {
                self.state = DebounceState::FirstZero;
                SampleOutcome::FirstZero
            }
            (DebounceState::FirstZero, true) => {
                self.state = DebounceState::Idle;
                SampleOutcome::Released
            }
            (_, false) => {
                self.state = DebounceState::Armed;
                SampleOutcome::Held
            }
        }
    }

    /// Current state.
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Whether the debouncer is idle.
    pub fn is_idle(&self) -> bool {
        self.state == DebounceState::Idle
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}
