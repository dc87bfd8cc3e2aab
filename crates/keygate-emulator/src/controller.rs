//! Interrupt dispatch.
//!
//! [`AccessController`] owns the three devices and the
//! [`AccessControlState`], and runs one handler per [`Interrupt`] to
//! completion. Every interrupt source (column edges and the six alarm
//! channels) enters through [`AccessController::handle`], so handlers never
//! interleave.

use keygate_access::CredentialStore;
use keygate_core::{DenyReason, Outcome};
use keygate_hardware::{AlarmChannel, AlarmService, IndicatorPanel, Interrupt, KeypadPort};
use tracing::{debug, trace};

use crate::config::DeviceConfig;
use crate::error::Result;
use crate::sequencer::SequencerEvent;
use crate::state::{AccessControlState, AttemptRecord};

/// The access-control core wired to its devices.
///
/// # Examples
///
/// ```
/// use keygate_access::CredentialStore;
/// use keygate_emulator::{AccessController, DeviceConfig};
/// use keygate_hardware::mock::{ManualAlarms, MockKeypad, MockPanel};
/// use keygate_hardware::{AlarmChannel, AlarmService, Indicator, IndicatorPanel};
///
/// let (port, _handle) = MockKeypad::new();
/// let mut controller = AccessController::new(
///     port,
///     ManualAlarms::new(),
///     MockPanel::new(),
///     CredentialStore::with_default_users(),
///     DeviceConfig::default(),
/// );
/// controller.start().unwrap();
///
/// assert!(controller.alarms().is_armed(AlarmChannel::RowScan));
/// assert!(controller.panel().is_on(Indicator::Status));
/// ```
#[derive(Debug)]
pub struct AccessController<K, A, L> {
    port: K,
    alarms: A,
    panel: L,
    config: DeviceConfig,
    state: AccessControlState,
}

impl<K, A, L> AccessController<K, A, L>
where
    K: KeypadPort,
    A: AlarmService,
    L: IndicatorPanel,
{
    /// Wire the core to its devices. Nothing runs until [`start`](Self::start).
    pub fn new(port: K, alarms: A, panel: L, credentials: CredentialStore, config: DeviceConfig) -> Self {
        let state = AccessControlState::new(&config, credentials);
        Self {
            port,
            alarms,
            panel,
            config,
            state,
        }
    }

    /// Power-on: start scanning and show `Ready`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row-scan channel cannot be armed.
    pub fn start(&mut self) -> Result<()> {
        self.state.keypad.start(&mut self.port, &mut self.alarms)?;
        self.state.annunciator.start(&mut self.panel);
        debug!("access controller started");
        Ok(())
    }

    /// Run the handler for one interrupt.
    ///
    /// Returns the outcome rendered by this interrupt, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler violates a channel or state rule.
    pub fn handle(&mut self, interrupt: Interrupt) -> Result<Option<Outcome>> {
        match interrupt {
            Interrupt::ColumnEdge => self.on_column_edge(),
            Interrupt::Alarm(AlarmChannel::RowScan) => {
                self.state.keypad.on_scan_tick(&mut self.port);
                trace!(row = self.state.keypad.scanner().row(), "row scan tick");
                Ok(None)
            }
            Interrupt::Alarm(AlarmChannel::Debounce) => {
                self.state
                    .keypad
                    .on_debounce_sample(&mut self.port, &mut self.alarms)?;
                Ok(None)
            }
            Interrupt::Alarm(AlarmChannel::EntryTimeout) => self.on_entry_timeout(),
            Interrupt::Alarm(AlarmChannel::Blink) => {
                self.state.annunciator.on_blink(&mut self.panel);
                Ok(None)
            }
            Interrupt::Alarm(channel @ (AlarmChannel::GrantDisplay | AlarmChannel::DenyDisplay)) => {
                self.state
                    .annunciator
                    .display_ended(channel, &mut self.panel, &self.alarms)?;
                Ok(None)
            }
        }
    }

    /// Deliver a pending column edge, if the port latched one.
    ///
    /// # Errors
    ///
    /// Same as [`handle`](Self::handle).
    pub fn poll_edge(&mut self) -> Result<Option<Outcome>> {
        if self.port.acknowledge_edge() {
            self.handle(Interrupt::ColumnEdge)
        } else {
            Ok(None)
        }
    }

    fn on_column_edge(&mut self) -> Result<Option<Outcome>> {
        let Some(keystroke) = self
            .state
            .keypad
            .on_column_edge(&mut self.port, &mut self.alarms)?
        else {
            return Ok(None);
        };

        if self.state.annunciator.state().is_displaying_outcome() {
            debug!(state = %self.state.annunciator.state(), "keystroke ignored while outcome displayed");
            return Ok(None);
        }

        let event = self.state.sequencer.accept(
            keystroke,
            &mut self.state.credentials,
            &mut self.alarms,
            self.config.entry_timeout(),
        )?;

        match event {
            SequencerEvent::SessionStarted => {
                self.state
                    .annunciator
                    .entry_started(&mut self.panel, &self.alarms)?;
                Ok(None)
            }
            SequencerEvent::IdComplete => {
                self.state
                    .annunciator
                    .id_complete(&mut self.panel, &mut self.alarms)?;
                Ok(None)
            }
            SequencerEvent::Digit { .. } => Ok(None),
            SequencerEvent::Verified(verdict) => {
                self.render(verdict.outcome, verdict.user_index)?;
                Ok(Some(verdict.outcome))
            }
        }
    }

    fn on_entry_timeout(&mut self) -> Result<Option<Outcome>> {
        if !self.state.sequencer.expire() {
            return Ok(None);
        }
        let outcome = Outcome::Deny(DenyReason::Timeout);
        self.render(outcome, None)?;
        Ok(Some(outcome))
    }

    fn render(&mut self, outcome: Outcome, user_index: Option<usize>) -> Result<()> {
        self.state
            .annunciator
            .show_outcome(outcome, &mut self.panel, &mut self.alarms)?;
        self.state.record(AttemptRecord {
            outcome,
            user_index,
            at: self.alarms.now(),
        });
        Ok(())
    }

    pub fn state(&self) -> &AccessControlState {
        &self.state
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn port(&self) -> &K {
        &self.port
    }

    pub fn alarms(&self) -> &A {
        &self.alarms
    }

    pub fn alarms_mut(&mut self) -> &mut A {
        &mut self.alarms
    }

    pub fn panel(&self) -> &L {
        &self.panel
    }

    /// Release the devices.
    pub fn into_parts(self) -> (K, A, L, AccessControlState) {
        (self.port, self.alarms, self.panel, self.state)
    }
}
