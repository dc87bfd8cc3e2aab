//! Entry sequencer: turns keystrokes into verification attempts.
//!
//! ```text
//!          1st key                  10th key
//!   Idle ───────────► Collecting ─────────────► verify ──► Idle
//!                          │
//!                          │ entry timeout
//!                          ▼
//!                       timed out ───────────────────────► Idle
//! ```
//!
//! The first keystroke arms the entry timeout. The fourth completes the id.
//! The tenth cancels the timeout and hands the last ten keystrokes (id
//! first, then password) to the [`Verifier`]. Undecodable keystrokes count
//! like any other.

use std::fmt;
use std::time::Duration;

use keygate_access::{CredentialStore, Credentials, Verdict, Verifier};
use keygate_core::constants::{ENTRY_LENGTH, ID_LENGTH};
use keygate_core::{Error, Keystroke};
use keygate_hardware::{AlarmChannel, AlarmMode, AlarmService};
use keygate_keypad::KeyHistory;
use tracing::{debug, info};

use crate::error::Result;

/// Sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Collecting,
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerState::Idle => write!(f, "Idle"),
            SequencerState::Collecting => write!(f, "Collecting"),
        }
    }
}

/// The entry in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySession {
    /// Keystrokes accepted so far (1..=10).
    pub digits_entered: usize,

    /// Alarm-service time of the first keystroke.
    pub started_at: Duration,

    /// Set when the entry timeout ended the session.
    pub timed_out: bool,
}

/// What a keystroke did to the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    /// First keystroke of a new entry.
    SessionStarted,

    /// Keystroke appended; `count` keystrokes so far.
    Digit { count: usize },

    /// Fourth keystroke: the id part is complete.
    IdComplete,

    /// Tenth keystroke: the entry was verified.
    Verified(Verdict),
}

/// Collects keystrokes under the entry timeout.
#[derive(Debug, Clone, Default)]
pub struct EntrySequencer {
    session: Option<EntrySession>,
    last_session: Option<EntrySession>,
    history: KeyHistory,
}

impl EntrySequencer {
    /// Create an idle sequencer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one captured keystroke.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry timeout cannot be armed.
    pub fn accept<A: AlarmService>(
        &mut self,
        keystroke: Keystroke,
        store: &mut CredentialStore,
        alarms: &mut A,
        timeout: Duration,
    ) -> Result<SequencerEvent> {
        let mut session = match self.session.take() {
            Some(session) => session,
            None => {
                self.history.clear();
                alarms.schedule(AlarmChannel::EntryTimeout, timeout, AlarmMode::OneShot)?;
                info!(timeout_ms = timeout.as_millis() as u64, "entry session started");
                EntrySession {
                    digits_entered: 0,
                    started_at: alarms.now(),
                    timed_out: false,
                }
            }
        };

        self.history.push(keystroke);
        session.digits_entered += 1;
        let count = session.digits_entered;
        debug!(count, undecodable = keystroke.is_undecodable(), "keystroke accepted");

        if count == ENTRY_LENGTH {
            alarms.cancel(AlarmChannel::EntryTimeout);
            self.last_session = Some(session);

            let keys = self.history.chronological();
            let credentials = Credentials::from_keystrokes(&keys)
                .ok_or_else(|| Error::invalid_credential("incomplete entry"))?;
            return Ok(SequencerEvent::Verified(Verifier::verify(store, &credentials)));
        }

        self.session = Some(session);
        match count {
            1 => Ok(SequencerEvent::SessionStarted),
            ID_LENGTH => {
                debug!("id complete");
                Ok(SequencerEvent::IdComplete)
            }
            _ => Ok(SequencerEvent::Digit { count }),
        }
    }

    /// Entry timeout expiry.
    ///
    /// Discards the partial entry. Returns `false` for a stale expiry that
    /// found no session.
    pub fn expire(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            debug!("stale entry timeout ignored");
            return false;
        };

        session.timed_out = true;
        self.last_session = Some(session);
        self.history.clear();
        info!(digits = session.digits_entered, "entry timed out");
        true
    }

    /// Current state.
    pub fn state(&self) -> SequencerState {
        if self.session.is_some() {
            SequencerState::Collecting
        } else {
            SequencerState::Idle
        }
    }

    /// The entry in progress, if any.
    pub fn session(&self) -> Option<&EntrySession> {
        self.session.as_ref()
    }

    /// The last entry that was verified or timed out.
    pub fn last_session(&self) -> Option<&EntrySession> {
        self.last_session.as_ref()
    }

    /// Keystrokes of the current (or last verified) entry.
    pub fn history(&self) -> &KeyHistory {
        &self.history
    }
}
