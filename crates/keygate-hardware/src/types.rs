//! Common types shared across hardware device implementations.
//!
//! This module defines the alarm channels of the timer peripheral, the
//! interrupt sources seen by the dispatcher and the three indicators of the
//! annunciator panel.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware alarm channels used by the access-control core.
///
/// Each channel is an independent timer source. Arming a channel that is
/// already armed replaces its pending expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmChannel {
    /// Periodic row-scan clock.
    RowScan,

    /// Periodic debounce sampler. Never armed together with `RowScan`.
    Debounce,

    /// One-shot entry timeout of the current session.
    EntryTimeout,

    /// Periodic toggle of the status indicator while the password is typed.
    Blink,

    /// One-shot end of the grant indication.
    GrantDisplay,

    /// One-shot end of the deny indication.
    DenyDisplay,
}

impl AlarmChannel {
    /// Every channel, in dispatch priority order.
    pub const ALL: [AlarmChannel; 6] = [
        AlarmChannel::RowScan,
        AlarmChannel::Debounce,
        AlarmChannel::EntryTimeout,
        AlarmChannel::Blink,
        AlarmChannel::GrantDisplay,
        AlarmChannel::DenyDisplay,
    ];

    /// Dense index of the channel, usable for per-channel arrays.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The channel that must be disarmed before this one may be armed.
    ///
    /// # Examples
    ///
    /// ```
    /// use keygate_hardware::AlarmChannel;
    ///
    /// assert_eq!(AlarmChannel::RowScan.exclusive_with(), Some(AlarmChannel::Debounce));
    /// assert_eq!(AlarmChannel::Blink.exclusive_with(), None);
    /// ```
    #[must_use]
    pub fn exclusive_with(self) -> Option<AlarmChannel> {
        match self {
            AlarmChannel::RowScan => Some(AlarmChannel::Debounce),
            AlarmChannel::Debounce => Some(AlarmChannel::RowScan),
            _ => None,
        }
    }
}

impl fmt::Display for AlarmChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlarmChannel::RowScan => "RowScan",
            AlarmChannel::Debounce => "Debounce",
            AlarmChannel::EntryTimeout => "EntryTimeout",
            AlarmChannel::Blink => "Blink",
            AlarmChannel::GrantDisplay => "GrantDisplay",
            AlarmChannel::DenyDisplay => "DenyDisplay",
        };
        write!(f, "{name}")
    }
}

/// Whether an alarm fires once or keeps firing at a fixed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmMode {
    OneShot,
    Periodic,
}

/// An interrupt request delivered to the access-control dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interrupt {
    /// Rising edge on one of the keypad column lines.
    ColumnEdge,

    /// Expiry of an alarm channel.
    Alarm(AlarmChannel),
}

/// LED colors of the annunciator panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedColor {
    Yellow,
    Green,
    Red,
}

/// The three indicators of the annunciator panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    /// Ready / entry-progress indicator (yellow).
    Status,

    /// Access granted indicator (green).
    Success,

    /// Access denied indicator (red).
    Failure,
}

impl Indicator {
    /// Every indicator of the panel.
    pub const ALL: [Indicator; 3] = [Indicator::Status, Indicator::Success, Indicator::Failure];

    /// Dense index of the indicator.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// LED color wired to this indicator.
    #[must_use]
    pub fn color(self) -> LedColor {
        match self {
            Indicator::Status => LedColor::Yellow,
            Indicator::Success => LedColor::Green,
            Indicator::Failure => LedColor::Red,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indicator::Status => write!(f, "status"),
            Indicator::Success => write!(f, "success"),
            Indicator::Failure => write!(f, "failure"),
        }
    }
}
