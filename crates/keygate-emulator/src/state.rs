//! The device's mutable state, bundled into one owned aggregate.

use std::collections::VecDeque;
use std::time::Duration;

use keygate_access::CredentialStore;
use keygate_core::Outcome;
use keygate_keypad::MatrixKeypad;
use serde::Serialize;

use crate::annunciator::Annunciator;
use crate::config::DeviceConfig;
use crate::sequencer::EntrySequencer;

/// Number of attempts kept in the journal.
pub const JOURNAL_CAPACITY: usize = 64;

/// One rendered outcome, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub outcome: Outcome,

    /// Matched user, `None` for unknown ids and timeouts.
    pub user_index: Option<usize>,

    /// Alarm-service time the outcome was rendered.
    pub at: Duration,
}

/// Everything the interrupt handlers read and write.
#[derive(Debug, Clone)]
pub struct AccessControlState {
    pub keypad: MatrixKeypad,
    pub sequencer: EntrySequencer,
    pub credentials: CredentialStore,
    pub annunciator: Annunciator,
    journal: VecDeque<AttemptRecord>,
}

impl AccessControlState {
    /// Fresh power-on state for `config` with the given user table.
    ///
    /// The lock policy of `config` replaces whatever threshold the store was
    /// built with.
    pub fn new(config: &DeviceConfig, mut credentials: CredentialStore) -> Self {
        credentials.set_lockout_threshold(config.lockout_threshold);
        Self {
            keypad: MatrixKeypad::new(config.scan_period(), config.debounce_period()),
            sequencer: EntrySequencer::new(),
            credentials,
            annunciator: Annunciator::new(
                config.blink_half_period(),
                config.grant_duration(),
                config.deny_duration(),
            ),
            journal: VecDeque::with_capacity(JOURNAL_CAPACITY),
        }
    }

    /// Append to the journal, dropping the oldest record when full.
    pub fn record(&mut self, record: AttemptRecord) {
        if self.journal.len() >= JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(record);
    }

    /// Recorded attempts, oldest first.
    pub fn journal(&self) -> &VecDeque<AttemptRecord> {
        &self.journal
    }
}
