//! Fixed-depth keystroke history.
//!
//! A ring buffer of the most recent keystrokes. Index 0 is always the newest
//! entry; once full, each push overwrites the oldest entry.

use keygate_core::Keystroke;
use keygate_core::constants::HISTORY_CAPACITY;

/// Most-recent-first record of captured keystrokes.
///
/// # Examples
///
/// ```
/// use keygate_core::{Keystroke, Symbol};
/// use keygate_keypad::KeyHistory;
///
/// let mut history = KeyHistory::new();
/// for value in 1..=3 {
///     history.push(Keystroke::Symbol(Symbol::new(value).unwrap()));
/// }
///
/// assert_eq!(history.len(), 3);
/// assert_eq!(history.get(0), Some(Keystroke::Symbol(Symbol::new(3).unwrap())));
/// assert_eq!(history.to_string(), "123");
/// ```
#[derive(Debug, Clone)]
pub struct KeyHistory {
    slots: [Keystroke; HISTORY_CAPACITY],
    /// Slot the next push writes to.
    head: usize,
    len: usize,
}

impl KeyHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            slots: [Keystroke::Undecodable; HISTORY_CAPACITY],
            head: 0,
            len: 0,
        }
    }

    /// Record a keystroke as the newest entry.
    pub fn push(&mut self, keystroke: Keystroke) {
        self.slots[self.head] = keystroke;
        self.head = (self.head + 1) % HISTORY_CAPACITY;
        self.len = (self.len + 1).min(HISTORY_CAPACITY);
    }

    /// Entry `index` counting back from the newest (0 = newest).
    pub fn get(&self, index: usize) -> Option<Keystroke> {
        if index >= self.len {
            return None;
        }
        let slot = (self.head + HISTORY_CAPACITY - 1 - index) % HISTORY_CAPACITY;
        Some(self.slots[slot])
    }

    /// Newest entry.
    pub fn latest(&self) -> Option<Keystroke> {
        self.get(0)
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = Keystroke> + '_ {
        (0..self.len).filter_map(|index| self.get(index))
    }

    /// Entries in the order they were typed (oldest first).
    pub fn chronological(&self) -> Vec<Keystroke> {
        let mut entries: Vec<Keystroke> = self.iter().collect();
        entries.reverse();
        entries
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no keystroke has been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the history holds `HISTORY_CAPACITY` entries.
    pub fn is_full(&self) -> bool {
        self.len == HISTORY_CAPACITY
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

impl Default for KeyHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for KeyHistory {
    /// Chronological rendering, undecodable entries shown as `?`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for keystroke in self.chronological() {
            write!(f, "{keystroke}")?;
        }
        Ok(())
    }
}
