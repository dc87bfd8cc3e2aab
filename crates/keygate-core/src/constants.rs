//! Core constants for the keypad access-control device.
//!
//! This module gathers the fixed geometry of the 4×4 matrix keypad, the
//! credential lengths, the lockout policy and the default timings of every
//! periodic and one-shot source used by the device.
//!
//! # Pattern Byte
//!
//! A captured key is identified by an 8-bit pattern combining the driven row
//! and the active column:
//!
//! ```text
//!  bit  7   6   5   4   3   2   1   0
//!      c0  c1  c2  c3  r0  r1  r2  r3
//!      \____________/  \____________/
//!       column nibble    row nibble
//! ```
//!
//! Exactly one row bit and one column bit are set for a valid key, so the top
//! left key (`1`) reads `0x88` and the bottom right key (`D`) reads `0x11`.
//!
//! # Usage
//!
//! ```
//! use keygate_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(ENTRY_LENGTH, ID_LENGTH + PASSWORD_LENGTH);
//! let timeout = Duration::from_millis(DEFAULT_ENTRY_TIMEOUT_MS);
//! assert_eq!(timeout.as_secs(), 10);
//! ```

// ============================================================================
// Keypad Geometry
// ============================================================================

/// Number of keypad rows driven by the row scanner.
pub const KEYPAD_ROWS: usize = 4;

/// Number of keypad columns sensed by the edge capture.
pub const KEYPAD_COLUMNS: usize = 4;

/// Mask selecting the row nibble of a pattern byte.
pub const ROW_MASK: u8 = 0x0F;

/// Mask selecting the column nibble of a pattern byte.
pub const COLUMN_MASK: u8 = 0xF0;

/// Printed legend of the keypad, row-major from the top left key.
///
/// `E` is the star key and `F` is the hash key.
///
/// # Examples
///
/// ```
/// use keygate_core::constants::KEY_LAYOUT;
///
/// assert_eq!(KEY_LAYOUT[0], ['1', '2', '3', 'A']);
/// assert_eq!(KEY_LAYOUT[3][1], '0');
/// ```
pub const KEY_LAYOUT: [[char; KEYPAD_COLUMNS]; KEYPAD_ROWS] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['E', '0', 'F', 'D'],
];

/// Row nibble bit for row `row` (row 0 is the most significant bit).
#[inline]
#[must_use]
pub const fn row_bit(row: usize) -> u8 {
    0x08 >> row
}

/// Column nibble bit for column `column` (column 0 is the most significant bit).
#[inline]
#[must_use]
pub const fn column_bit(column: usize) -> u8 {
    0x08 >> column
}

// ============================================================================
// Credentials
// ============================================================================

/// Number of symbols in a user id.
pub const ID_LENGTH: usize = 4;

/// Number of symbols in a user password.
pub const PASSWORD_LENGTH: usize = 6;

/// Number of keystrokes that complete one entry session.
pub const ENTRY_LENGTH: usize = ID_LENGTH + PASSWORD_LENGTH;

/// Capacity of the keystroke history.
pub const HISTORY_CAPACITY: usize = ENTRY_LENGTH;

/// Minimum number of records in the user table.
pub const MIN_USER_COUNT: usize = 10;

/// Failure count a user may reach without being locked.
///
/// The account is locked as soon as its counter exceeds this value, that is
/// on the fifth consecutive wrong password.
pub const DEFAULT_LOCKOUT_THRESHOLD: u32 = 4;

// ============================================================================
// Timing
// ============================================================================

/// Row scan period in milliseconds.
pub const DEFAULT_SCAN_PERIOD_MS: u64 = 2;

/// Debounce sampling period in milliseconds.
pub const DEFAULT_DEBOUNCE_PERIOD_MS: u64 = 100;

/// Maximum time to enter the 10 keystrokes, counted from the first one.
pub const DEFAULT_ENTRY_TIMEOUT_MS: u64 = 10_000;

/// Half period of the password blink (500 ms on, 500 ms off).
pub const DEFAULT_BLINK_HALF_PERIOD_MS: u64 = 500;

/// How long the success indicator stays on after a grant.
pub const DEFAULT_GRANT_DURATION_MS: u64 = 10_000;

/// How long the failure indicator stays on after a denial.
pub const DEFAULT_DENY_DURATION_MS: u64 = 3_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_and_column_bits_are_one_hot() {
        for index in 0..KEYPAD_ROWS {
            assert_eq!(row_bit(index).count_ones(), 1);
            assert_eq!(column_bit(index).count_ones(), 1);
            assert_eq!(row_bit(index) & !ROW_MASK, 0);
        }
        assert_eq!(row_bit(0), 0x08);
        assert_eq!(row_bit(3), 0x01);
    }

    #[test]
    fn test_layout_covers_all_sixteen_symbols() {
        let mut seen: Vec<char> = KEY_LAYOUT.iter().flatten().copied().collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_debounce_slower_than_scan() {
        assert!(DEFAULT_DEBOUNCE_PERIOD_MS > DEFAULT_SCAN_PERIOD_MS);
        assert!(DEFAULT_ENTRY_TIMEOUT_MS > DEFAULT_BLINK_HALF_PERIOD_MS);
    }
}
