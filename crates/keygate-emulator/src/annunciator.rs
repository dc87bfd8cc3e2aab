//! Three-LED annunciator state machine.
//!
//! # States
//!
//! - `Ready`: status indicator steady on, waiting for the first keystroke
//! - `EnteringId`: status indicator off while the id is typed
//! - `BlinkingPassword`: status indicator blinking while the password is typed
//! - `Granting`: success indicator on for the grant duration
//! - `Denying`: failure indicator on for the deny duration
//!
//! # Valid Transitions
//!
//! - Ready → EnteringId → BlinkingPassword → Granting/Denying → Ready
//! - EnteringId → Denying (entry timeout before the id is complete)
//!
//! Entering `Granting` or `Denying` stops the blink and forces the status
//! indicator off.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use keygate_core::{Error, Outcome};
use keygate_hardware::{AlarmChannel, AlarmMode, AlarmService, Indicator, IndicatorPanel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Maximum number of state transitions kept in history.
///
/// A complete entry goes through four transitions, so this covers the last
/// eight entries.
const MAX_HISTORY_SIZE: usize = 32;

/// Annunciator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnunciatorState {
    Ready,
    EnteringId,
    BlinkingPassword,
    Granting,
    Denying,
}

impl fmt::Display for AnnunciatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AnnunciatorState::Ready => "Ready",
            AnnunciatorState::EnteringId => "EnteringId",
            AnnunciatorState::BlinkingPassword => "BlinkingPassword",
            AnnunciatorState::Granting => "Granting",
            AnnunciatorState::Denying => "Denying",
        };
        write!(f, "{}", state_str)
    }
}

impl AnnunciatorState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use keygate_emulator::AnnunciatorState;
    ///
    /// assert!(AnnunciatorState::Ready.can_transition_to(&AnnunciatorState::EnteringId));
    /// assert!(!AnnunciatorState::Ready.can_transition_to(&AnnunciatorState::Granting));
    /// ```
    pub fn can_transition_to(&self, target: &AnnunciatorState) -> bool {
        matches!(
            (self, target),
            (AnnunciatorState::Ready, AnnunciatorState::EnteringId)
                | (
                    AnnunciatorState::EnteringId,
                    AnnunciatorState::BlinkingPassword | AnnunciatorState::Denying
                )
                | (
                    AnnunciatorState::BlinkingPassword,
                    AnnunciatorState::Granting | AnnunciatorState::Denying
                )
                | (
                    AnnunciatorState::Granting | AnnunciatorState::Denying,
                    AnnunciatorState::Ready
                )
        )
    }

    /// Whether an outcome is being displayed.
    pub fn is_displaying_outcome(&self) -> bool {
        matches!(self, AnnunciatorState::Granting | AnnunciatorState::Denying)
    }
}

/// A single state transition, stamped with alarm-service time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: AnnunciatorState,
    pub to: AnnunciatorState,
    pub at: Duration,
}

/// Drives the status, success and failure indicators.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use keygate_core::Outcome;
/// use keygate_emulator::{Annunciator, AnnunciatorState};
/// use keygate_hardware::mock::{ManualAlarms, MockPanel};
/// use keygate_hardware::{Indicator, IndicatorPanel};
///
/// let mut panel = MockPanel::new();
/// let mut alarms = ManualAlarms::new();
/// let mut annunciator = Annunciator::new(
///     Duration::from_millis(500),
///     Duration::from_secs(10),
///     Duration::from_secs(3),
/// );
///
/// annunciator.start(&mut panel);
/// annunciator.entry_started(&mut panel, &alarms).unwrap();
/// annunciator.id_complete(&mut panel, &mut alarms).unwrap();
/// annunciator.show_outcome(Outcome::Grant, &mut panel, &mut alarms).unwrap();
///
/// assert_eq!(annunciator.state(), AnnunciatorState::Granting);
/// assert_eq!(panel.lit(), vec![Indicator::Success]);
/// ```
#[derive(Debug, Clone)]
pub struct Annunciator {
    state: AnnunciatorState,
    history: VecDeque<StateTransition>,
    blink_half_period: Duration,
    grant_duration: Duration,
    deny_duration: Duration,
}

impl Annunciator {
    /// Create an annunciator in `Ready` with the given timings.
    pub fn new(blink_half_period: Duration, grant_duration: Duration, deny_duration: Duration) -> Self {
        Self {
            state: AnnunciatorState::Ready,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            blink_half_period,
            grant_duration,
            deny_duration,
        }
    }

    /// Power-on: only the status indicator lit.
    pub fn start<L: IndicatorPanel>(&mut self, panel: &mut L) {
        panel.set(Indicator::Success, false);
        panel.set(Indicator::Failure, false);
        panel.set(Indicator::Status, self.state == AnnunciatorState::Ready);
    }

    /// First keystroke of an entry.
    ///
    /// # Errors
    ///
    /// Returns an error unless the annunciator is `Ready`.
    pub fn entry_started<L: IndicatorPanel, A: AlarmService>(
        &mut self,
        panel: &mut L,
        alarms: &A,
    ) -> Result<()> {
        self.transition_to(AnnunciatorState::EnteringId, alarms.now())?;
        panel.set(Indicator::Status, false);
        Ok(())
    }

    /// Fourth keystroke: start blinking the status indicator.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid transition or if the blink channel
    /// cannot be armed.
    pub fn id_complete<L: IndicatorPanel, A: AlarmService>(
        &mut self,
        panel: &mut L,
        alarms: &mut A,
    ) -> Result<()> {
        self.transition_to(AnnunciatorState::BlinkingPassword, alarms.now())?;
        panel.set(Indicator::Status, true);
        alarms.schedule(AlarmChannel::Blink, self.blink_half_period, AlarmMode::Periodic)?;
        Ok(())
    }

    /// Blink tick. Stale ticks outside `BlinkingPassword` are ignored.
    pub fn on_blink<L: IndicatorPanel>(&mut self, panel: &mut L) {
        if self.state == AnnunciatorState::BlinkingPassword {
            panel.toggle(Indicator::Status);
        } else {
            debug!(state = %self.state, "stale blink tick ignored");
        }
    }

    /// Render a verification or timeout outcome.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid transition or if the display channel
    /// cannot be armed.
    pub fn show_outcome<L: IndicatorPanel, A: AlarmService>(
        &mut self,
        outcome: Outcome,
        panel: &mut L,
        alarms: &mut A,
    ) -> Result<()> {
        let (state, indicator, channel, duration) = if outcome.is_grant() {
            (
                AnnunciatorState::Granting,
                Indicator::Success,
                AlarmChannel::GrantDisplay,
                self.grant_duration,
            )
        } else {
            (
                AnnunciatorState::Denying,
                Indicator::Failure,
                AlarmChannel::DenyDisplay,
                self.deny_duration,
            )
        };

        self.transition_to(state, alarms.now())?;
        alarms.cancel(AlarmChannel::Blink);
        panel.set(Indicator::Status, false);
        panel.set(indicator, true);
        alarms.schedule(channel, duration, AlarmMode::OneShot)?;

        info!(%outcome, duration_ms = duration.as_millis() as u64, "outcome displayed");
        Ok(())
    }

    /// Grant or deny display expiry: back to `Ready`.
    ///
    /// Returns `false` for a stale expiry that does not match the state.
    ///
    /// # Errors
    ///
    /// Returns an error only if the state table rejects the transition.
    pub fn display_ended<L: IndicatorPanel, A: AlarmService>(
        &mut self,
        channel: AlarmChannel,
        panel: &mut L,
        alarms: &A,
    ) -> Result<bool> {
        let indicator = match (self.state, channel) {
            (AnnunciatorState::Granting, AlarmChannel::GrantDisplay) => Indicator::Success,
            (AnnunciatorState::Denying, AlarmChannel::DenyDisplay) => Indicator::Failure,
            _ => {
                debug!(%channel, state = %self.state, "stale display expiry ignored");
                return Ok(false);
            }
        };

        self.transition_to(AnnunciatorState::Ready, alarms.now())?;
        panel.set(indicator, false);
        panel.set(Indicator::Status, true);
        Ok(true)
    }

    /// Current state.
    pub fn state(&self) -> AnnunciatorState {
        self.state
    }

    /// Recent transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    fn transition_to(&mut self, new_state: AnnunciatorState, at: Duration) -> Result<StateTransition> {
        if !self.state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            }
            .into());
        }

        let transition = StateTransition {
            from: self.state,
            to: new_state,
            at,
        };

        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition);
        self.state = new_state;

        debug!(from = %transition.from, to = %transition.to, "annunciator transition");
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_core::DenyReason;
    use keygate_hardware::mock::{ManualAlarms, MockPanel};
    use rstest::rstest;

    fn annunciator() -> Annunciator {
        Annunciator::new(
            Duration::from_millis(500),
            Duration::from_secs(10),
            Duration::from_secs(3),
        )
    }

    fn blinking() -> (Annunciator, MockPanel, ManualAlarms) {
        let mut annunciator = annunciator();
        let mut panel = MockPanel::new();
        let mut alarms = ManualAlarms::new();
        annunciator.start(&mut panel);
        annunciator.entry_started(&mut panel, &alarms).unwrap();
        annunciator.id_complete(&mut panel, &mut alarms).unwrap();
        (annunciator, panel, alarms)
    }

    #[rstest]
    #[case(AnnunciatorState::Ready, AnnunciatorState::EnteringId, true)]
    #[case(AnnunciatorState::EnteringId, AnnunciatorState::BlinkingPassword, true)]
    #[case(AnnunciatorState::EnteringId, AnnunciatorState::Denying, true)]
    #[case(AnnunciatorState::EnteringId, AnnunciatorState::Granting, false)]
    #[case(AnnunciatorState::BlinkingPassword, AnnunciatorState::Granting, true)]
    #[case(AnnunciatorState::BlinkingPassword, AnnunciatorState::Ready, false)]
    #[case(AnnunciatorState::Granting, AnnunciatorState::Ready, true)]
    #[case(AnnunciatorState::Denying, AnnunciatorState::EnteringId, false)]
    #[case(AnnunciatorState::Ready, AnnunciatorState::Denying, false)]
    fn test_transition_table(
        #[case] from: AnnunciatorState,
        #[case] to: AnnunciatorState,
        #[case] valid: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_start_lights_status_only() {
        let mut annunciator = annunciator();
        let mut panel = MockPanel::new();
        annunciator.start(&mut panel);
        assert_eq!(panel.lit(), vec![Indicator::Status]);
    }

    #[test]
    fn test_blink_toggles_status() {
        let (mut annunciator, mut panel, alarms) = blinking();
        assert!(alarms.is_armed(AlarmChannel::Blink));
        assert!(panel.is_on(Indicator::Status));

        annunciator.on_blink(&mut panel);
        assert!(!panel.is_on(Indicator::Status));
        annunciator.on_blink(&mut panel);
        assert!(panel.is_on(Indicator::Status));
    }

    #[test]
    fn test_deny_stops_blink_and_lights_failure() {
        let (mut annunciator, mut panel, mut alarms) = blinking();
        annunciator
            .show_outcome(Outcome::Deny(DenyReason::BadPassword), &mut panel, &mut alarms)
            .unwrap();

        assert_eq!(annunciator.state(), AnnunciatorState::Denying);
        assert!(!alarms.is_armed(AlarmChannel::Blink));
        assert_eq!(panel.lit(), vec![Indicator::Failure]);
        assert_eq!(
            alarms.deadline(AlarmChannel::DenyDisplay),
            Some(Duration::from_secs(3))
        );

        // Blink tick that raced with the outcome changes nothing.
        annunciator.on_blink(&mut panel);
        assert_eq!(panel.lit(), vec![Indicator::Failure]);
    }

    #[test]
    fn test_display_end_returns_to_ready() {
        let (mut annunciator, mut panel, mut alarms) = blinking();
        annunciator
            .show_outcome(Outcome::Grant, &mut panel, &mut alarms)
            .unwrap();

        let ended = annunciator
            .display_ended(AlarmChannel::DenyDisplay, &mut panel, &alarms)
            .unwrap();
        assert!(!ended);
        assert_eq!(annunciator.state(), AnnunciatorState::Granting);

        let ended = annunciator
            .display_ended(AlarmChannel::GrantDisplay, &mut panel, &alarms)
            .unwrap();
        assert!(ended);
        assert_eq!(annunciator.state(), AnnunciatorState::Ready);
        assert_eq!(panel.lit(), vec![Indicator::Status]);
        assert_eq!(annunciator.history().len(), 4);
    }

    #[test]
    fn test_timeout_during_id_entry() {
        let mut annunciator = annunciator();
        let mut panel = MockPanel::new();
        let mut alarms = ManualAlarms::new();
        annunciator.start(&mut panel);
        annunciator.entry_started(&mut panel, &alarms).unwrap();

        annunciator
            .show_outcome(Outcome::Deny(DenyReason::Timeout), &mut panel, &mut alarms)
            .unwrap();
        assert_eq!(panel.lit(), vec![Indicator::Failure]);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut annunciator = annunciator();
        let mut panel = MockPanel::new();
        let mut alarms = ManualAlarms::new();
        assert!(annunciator.id_complete(&mut panel, &mut alarms).is_err());
        assert_eq!(annunciator.state(), AnnunciatorState::Ready);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut annunciator = annunciator();
        let mut panel = MockPanel::new();
        let mut alarms = ManualAlarms::new();

        for _ in 0..20 {
            annunciator.entry_started(&mut panel, &alarms).unwrap();
            annunciator
                .show_outcome(Outcome::Deny(DenyReason::Timeout), &mut panel, &mut alarms)
                .unwrap();
            annunciator
                .display_ended(AlarmChannel::DenyDisplay, &mut panel, &alarms)
                .unwrap();
        }

        assert_eq!(annunciator.history().len(), MAX_HISTORY_SIZE);
    }
}
