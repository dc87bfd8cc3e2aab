//! Deterministic discrete-event simulation of a complete device.
//!
//! The simulation wires an [`AccessController`] to the mock keypad, the
//! virtual-clock alarm service and the recording panel. Time only moves
//! inside [`Simulation::run_until`], which fires due alarms in order and
//! delivers latched column edges right after the interrupt that raised them,
//! so every timing assertion is exact.

use std::time::Duration;

use keygate_access::{CredentialStore, UserStatus, UserTableConfig};
use keygate_core::{Outcome, Symbol, parse_symbols};
use keygate_hardware::mock::{ManualAlarms, MockKeypad, MockKeypadHandle, MockPanel};
use keygate_hardware::{AlarmService, Indicator, IndicatorPanel, Interrupt};
use tracing::trace;

use crate::config::DeviceConfig;
use crate::controller::AccessController;
use crate::error::Result;

/// How long [`Simulation::tap`] holds a key.
pub const DEFAULT_HOLD: Duration = Duration::from_millis(150);

/// Pause after releasing a key in [`Simulation::tap`], long enough for the
/// debouncer to confirm the release.
pub const DEFAULT_GAP: Duration = Duration::from_millis(250);

type MockController = AccessController<MockKeypad, ManualAlarms, MockPanel>;

/// A device on a virtual clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use keygate_core::Outcome;
/// use keygate_emulator::Simulation;
/// use keygate_hardware::Indicator;
///
/// let mut sim = Simulation::with_defaults().unwrap();
/// sim.enter("1234123456").unwrap();
///
/// assert_eq!(sim.last_outcome(), Some(Outcome::Grant));
/// assert!(sim.is_lit(Indicator::Success));
///
/// sim.advance(Duration::from_secs(10)).unwrap();
/// assert_eq!(sim.lit(), vec![Indicator::Status]);
/// ```
#[derive(Debug)]
pub struct Simulation {
    controller: MockController,
    keypad: MockKeypadHandle,
    outcomes: Vec<(Duration, Outcome)>,
    hold: Duration,
    gap: Duration,
}

impl Simulation {
    /// Build and power on a device.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: DeviceConfig, credentials: CredentialStore) -> Result<Self> {
        config.validate()?;
        let (port, keypad) = MockKeypad::new();
        let mut controller =
            AccessController::new(port, ManualAlarms::new(), MockPanel::new(), credentials, config);
        controller.start()?;

        Ok(Self {
            controller,
            keypad,
            outcomes: Vec::new(),
            hold: DEFAULT_HOLD,
            gap: DEFAULT_GAP,
        })
    }

    /// Device with the default configuration and factory user table.
    ///
    /// # Errors
    ///
    /// Returns an error if the factory table fails validation.
    pub fn with_defaults() -> Result<Self> {
        let config = DeviceConfig::default();
        let credentials = UserTableConfig::default().into_store(config.lockout_threshold)?;
        Self::new(config, credentials)
    }

    /// Change how long [`tap`](Self::tap) holds a key and waits after it.
    pub fn with_timing(mut self, hold: Duration, gap: Duration) -> Self {
        self.hold = hold;
        self.gap = gap;
        self
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.controller.alarms().now()
    }

    /// Run every interrupt due up to and including `deadline`.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn run_until(&mut self, deadline: Duration) -> Result<()> {
        self.poll_edge()?;
        while let Some(channel) = self.controller.alarms_mut().pop_due(deadline) {
            let outcome = self.controller.handle(Interrupt::Alarm(channel))?;
            self.note(outcome);
            self.poll_edge()?;
        }
        self.controller.alarms_mut().advance_to(deadline);
        trace!(now_ms = deadline.as_millis() as u64, "simulation caught up");
        Ok(())
    }

    /// Run for `duration` of virtual time.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn advance(&mut self, duration: Duration) -> Result<()> {
        let deadline = self.now() + duration;
        self.run_until(deadline)
    }

    /// Press and hold a key.
    ///
    /// # Errors
    ///
    /// Returns a handler error raised by the resulting edge.
    pub fn press(&mut self, symbol: Symbol) -> Result<()> {
        self.keypad.press(symbol);
        self.poll_edge()
    }

    /// Press several keys at once.
    ///
    /// # Errors
    ///
    /// Returns a handler error raised by the resulting edge.
    pub fn press_keys(&mut self, symbols: &[Symbol]) -> Result<()> {
        self.keypad.press_keys(symbols);
        self.poll_edge()
    }

    /// Release every held key.
    pub fn release(&mut self) {
        self.keypad.release();
    }

    /// Press, hold, release and wait for the release to be confirmed.
    ///
    /// # Errors
    ///
    /// Returns the first handler error.
    pub fn tap(&mut self, symbol: Symbol) -> Result<()> {
        self.press(symbol)?;
        self.run_until(self.now() + self.hold)?;
        self.release();
        self.run_until(self.now() + self.gap)
    }

    /// Tap every symbol of `keys`, e.g. `"1234123456"`.
    ///
    /// # Errors
    ///
    /// Returns an error for a character outside `0-9A-F` or a handler error.
    pub fn enter(&mut self, keys: &str) -> Result<()> {
        for symbol in parse_symbols(keys)? {
            self.tap(symbol)?;
        }
        Ok(())
    }

    /// Every rendered outcome with its virtual time.
    pub fn outcomes(&self) -> &[(Duration, Outcome)] {
        &self.outcomes
    }

    /// The most recent rendered outcome.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.outcomes.last().map(|(_, outcome)| *outcome)
    }

    /// Whether an indicator is lit.
    pub fn is_lit(&self, indicator: Indicator) -> bool {
        self.controller.panel().is_on(indicator)
    }

    /// Indicators currently lit.
    pub fn lit(&self) -> Vec<Indicator> {
        self.controller.panel().lit()
    }

    /// Lockout state of a user.
    pub fn user_status(&self, index: usize) -> Option<UserStatus> {
        self.controller.state().credentials.status(index)
    }

    /// The controller under simulation.
    pub fn controller(&self) -> &MockController {
        &self.controller
    }

    /// Handle on the simulated keypad.
    pub fn keypad(&self) -> &MockKeypadHandle {
        &self.keypad
    }

    fn poll_edge(&mut self) -> Result<()> {
        let outcome = self.controller.poll_edge()?;
        self.note(outcome);
        Ok(())
    }

    fn note(&mut self, outcome: Option<Outcome>) {
        if let Some(outcome) = outcome {
            self.outcomes.push((self.now(), outcome));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_hardware::KeypadPort;

    #[test]
    fn test_idle_device_only_scans() {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.advance(Duration::from_secs(1)).unwrap();

        assert_eq!(sim.now(), Duration::from_secs(1));
        assert!(sim.outcomes().is_empty());
        assert_eq!(sim.lit(), vec![Indicator::Status]);
    }

    #[test]
    fn test_tap_records_one_keystroke() {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.tap(Symbol::from_char('7').unwrap()).unwrap();

        let history = sim.controller().state().sequencer.history();
        assert_eq!(history.to_string(), "7");
        assert!(sim.controller().port().edge_interrupts_enabled());
    }

    #[test]
    fn test_invalid_key_text_rejected() {
        let mut sim = Simulation::with_defaults().unwrap();
        assert!(sim.enter("12X4").is_err());
    }
}
