//! Hardware device trait definitions.
//!
//! This module defines the contract between the access-control core and the
//! peripherals it drives: the matrix keypad lines, the alarm service of the
//! timer peripheral and the indicator panel. The core never touches pins or
//! timer registers directly, so every handler can be exercised against the
//! fakes in [`mock`](crate::mock).
//!
//! All methods are synchronous and non-blocking: they are called from
//! interrupt handlers that must run to completion in bounded time.

use std::time::Duration;

use crate::error::{HardwareError, Result};
use crate::types::{AlarmChannel, AlarmMode, Indicator};

/// Matrix keypad line access.
///
/// Rows are outputs driven one-hot by the row scanner, columns are inputs
/// sensed through rising-edge interrupts. Both are exchanged as nibbles in
/// the layout of [`keygate_core::constants`]: bit 3 is row (or column) 0.
///
/// # Examples
///
/// ```
/// use keygate_hardware::traits::KeypadPort;
///
/// fn columns_idle<K: KeypadPort>(keypad: &mut K) -> bool {
///     keypad.read_columns() == 0
/// }
/// ```
pub trait KeypadPort {
    /// Drive the row outputs with a one-hot nibble.
    fn drive_rows(&mut self, pattern: u8);

    /// Sample the column inputs as a nibble.
    fn read_columns(&mut self) -> u8;

    /// Enable or disable rising-edge interrupts on every column line.
    fn set_edge_interrupts(&mut self, enabled: bool);

    /// Whether column edge interrupts are currently enabled.
    fn edge_interrupts_enabled(&self) -> bool;

    /// Acknowledge a pending column edge interrupt.
    ///
    /// Returns `true` if an edge was pending; the pending flag is cleared.
    fn acknowledge_edge(&mut self) -> bool;
}

/// Timer peripheral alarm service.
///
/// Channels are independent. Scheduling an armed channel overwrites its
/// pending expiry; cancelling an idle channel is a no-op. The expiry itself
/// is delivered to the dispatcher as
/// [`Interrupt::Alarm`](crate::types::Interrupt::Alarm).
pub trait AlarmService {
    /// Monotonic time since the service started.
    fn now(&self) -> Duration;

    /// Arm `channel` to expire after `delay`, once or periodically.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `delay` is zero
    /// - the channel's exclusive partner (see
    ///   [`AlarmChannel::exclusive_with`]) is currently armed
    fn schedule(&mut self, channel: AlarmChannel, delay: Duration, mode: AlarmMode) -> Result<()>;

    /// Disarm `channel`, dropping any pending expiry.
    fn cancel(&mut self, channel: AlarmChannel);

    /// Whether `channel` currently has a pending expiry.
    fn is_armed(&self, channel: AlarmChannel) -> bool;

    /// Validate a scheduling request against the channel rules.
    ///
    /// Implementations call this at the top of [`schedule`](Self::schedule).
    ///
    /// # Errors
    ///
    /// Same conditions as [`schedule`](Self::schedule).
    fn check_schedule(&self, channel: AlarmChannel, delay: Duration) -> Result<()> {
        if delay.is_zero() {
            return Err(HardwareError::zero_delay(channel));
        }
        if let Some(partner) = channel.exclusive_with()
            && self.is_armed(partner)
        {
            return Err(HardwareError::channel_conflict(partner, channel));
        }
        Ok(())
    }
}

/// Indicator panel (the three LEDs of the annunciator).
pub trait IndicatorPanel {
    /// Switch an indicator on or off.
    fn set(&mut self, indicator: Indicator, on: bool);

    /// Current state of an indicator.
    fn is_on(&self, indicator: Indicator) -> bool;

    /// Flip an indicator and return its new state.
    fn toggle(&mut self, indicator: Indicator) -> bool {
        let on = !self.is_on(indicator);
        self.set(indicator, on);
        on
    }
}
