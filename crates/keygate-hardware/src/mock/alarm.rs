//! Virtual-clock alarm service.
//!
//! [`ManualAlarms`] implements [`AlarmService`] over a simulated clock that
//! only moves when the owner asks it to. A discrete-event loop repeatedly
//! pops the earliest due channel with [`ManualAlarms::pop_due`] and
//! dispatches it, which makes timing assertions exact to the microsecond.

use std::time::Duration;

use tracing::trace;

use crate::error::Result;
use crate::traits::AlarmService;
use crate::types::{AlarmChannel, AlarmMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    due: Duration,
    period: Option<Duration>,
}

/// Alarm service driven by a manually advanced clock.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use keygate_hardware::mock::ManualAlarms;
/// use keygate_hardware::traits::AlarmService;
/// use keygate_hardware::{AlarmChannel, AlarmMode};
///
/// let mut alarms = ManualAlarms::new();
/// alarms
///     .schedule(AlarmChannel::Blink, Duration::from_millis(500), AlarmMode::Periodic)
///     .unwrap();
///
/// let limit = Duration::from_secs(1);
/// assert_eq!(alarms.pop_due(limit), Some(AlarmChannel::Blink));
/// assert_eq!(alarms.now(), Duration::from_millis(500));
/// assert_eq!(alarms.pop_due(limit), Some(AlarmChannel::Blink));
/// assert_eq!(alarms.pop_due(limit), None);
/// ```
#[derive(Debug, Default)]
pub struct ManualAlarms {
    now: Duration,
    slots: [Option<Armed>; AlarmChannel::ALL.len()],
}

impl ManualAlarms {
    /// Create an alarm service with the clock at zero and every channel idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest pending expiry, ties broken by channel priority.
    pub fn next_due(&self) -> Option<(Duration, AlarmChannel)> {
        AlarmChannel::ALL
            .iter()
            .filter_map(|&channel| self.slots[channel.index()].map(|armed| (armed.due, channel)))
            .min()
    }

    /// Absolute expiry time of `channel`, if armed.
    pub fn deadline(&self, channel: AlarmChannel) -> Option<Duration> {
        self.slots[channel.index()].map(|armed| armed.due)
    }

    /// Fire the earliest channel due at or before `limit`.
    ///
    /// The clock jumps to the expiry time; periodic channels are re-armed one
    /// period later, one-shot channels are disarmed.
    pub fn pop_due(&mut self, limit: Duration) -> Option<AlarmChannel> {
        let (due, channel) = self.next_due().filter(|(due, _)| *due <= limit)?;
        self.now = due;

        let slot = &mut self.slots[channel.index()];
        *slot = slot.and_then(|armed| {
            armed.period.map(|period| Armed {
                due: due + period,
                period: Some(period),
            })
        });

        trace!(%channel, at_us = due.as_micros() as u64, "alarm fired");
        Some(channel)
    }

    /// Move the clock forward to `time` without firing anything.
    ///
    /// The clock never goes backwards.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}

impl AlarmService for ManualAlarms {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, channel: AlarmChannel, delay: Duration, mode: AlarmMode) -> Result<()> {
        self.check_schedule(channel, delay)?;
        self.slots[channel.index()] = Some(Armed {
            due: self.now + delay,
            period: (mode == AlarmMode::Periodic).then_some(delay),
        });
        Ok(())
    }

    fn cancel(&mut self, channel: AlarmChannel) {
        self.slots[channel.index()] = None;
    }

    fn is_armed(&self, channel: AlarmChannel) -> bool {
        self.slots[channel.index()].is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HardwareError;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut alarms = ManualAlarms::new();
        alarms
            .schedule(AlarmChannel::EntryTimeout, ms(10_000), AlarmMode::OneShot)
            .unwrap();

        assert_eq!(alarms.pop_due(ms(9_999)), None);
        assert_eq!(alarms.pop_due(ms(10_000)), Some(AlarmChannel::EntryTimeout));
        assert!(!alarms.is_armed(AlarmChannel::EntryTimeout));
        assert_eq!(alarms.pop_due(ms(20_000)), None);
    }

    #[test]
    fn test_reschedule_overwrites_pending_expiry() {
        let mut alarms = ManualAlarms::new();
        alarms
            .schedule(AlarmChannel::DenyDisplay, ms(3_000), AlarmMode::OneShot)
            .unwrap();
        alarms.advance_to(ms(1_000));
        alarms
            .schedule(AlarmChannel::DenyDisplay, ms(3_000), AlarmMode::OneShot)
            .unwrap();

        assert_eq!(alarms.deadline(AlarmChannel::DenyDisplay), Some(ms(4_000)));
    }

    #[test]
    fn test_row_scan_and_debounce_are_exclusive() {
        let mut alarms = ManualAlarms::new();
        alarms
            .schedule(AlarmChannel::RowScan, ms(2), AlarmMode::Periodic)
            .unwrap();

        let result = alarms.schedule(AlarmChannel::Debounce, ms(100), AlarmMode::Periodic);
        assert!(matches!(result, Err(HardwareError::ChannelConflict { .. })));

        alarms.cancel(AlarmChannel::RowScan);
        alarms
            .schedule(AlarmChannel::Debounce, ms(100), AlarmMode::Periodic)
            .unwrap();
        assert!(alarms.is_armed(AlarmChannel::Debounce));
    }

    #[test]
    fn test_zero_delay_rejected() {
        let mut alarms = ManualAlarms::new();
        let result = alarms.schedule(AlarmChannel::Blink, Duration::ZERO, AlarmMode::Periodic);
        assert!(matches!(result, Err(HardwareError::ZeroDelay { .. })));
    }

    #[test]
    fn test_ties_resolved_by_channel_priority() {
        let mut alarms = ManualAlarms::new();
        alarms
            .schedule(AlarmChannel::GrantDisplay, ms(10), AlarmMode::OneShot)
            .unwrap();
        alarms
            .schedule(AlarmChannel::RowScan, ms(2), AlarmMode::Periodic)
            .unwrap();

        let mut fired = Vec::new();
        while let Some(channel) = alarms.pop_due(ms(10)) {
            fired.push(channel);
        }

        assert_eq!(fired.len(), 6);
        assert_eq!(fired[4], AlarmChannel::RowScan);
        assert_eq!(fired[5], AlarmChannel::GrantDisplay);
    }

    #[test]
    fn test_clock_never_goes_backwards() {
        let mut alarms = ManualAlarms::new();
        alarms.advance_to(ms(50));
        alarms.advance_to(ms(10));
        assert_eq!(alarms.now(), ms(50));
    }
}
