//! In-memory user table with lockout counters.

use std::collections::HashSet;

use keygate_core::constants::{DEFAULT_LOCKOUT_THRESHOLD, MIN_USER_COUNT};
use keygate_core::{Error, Keystroke, Result};

use crate::user::{UserRecord, UserStatus};

/// Factory user table: `(id, password)` pairs.
pub const DEFAULT_USERS: [(&str, &str); 10] = [
    ("1234", "123456"),
    ("DCBA", "654321"),
    ("BEBE", "000000"),
    ("C4C4", "654321"),
    ("4321", "654321"),
    ("A5C0", "654321"),
    ("F3A5", "654321"),
    ("1982", "654321"),
    ("0007", "654321"),
    ("911E", "654321"),
];

/// The user table the verifier checks against.
///
/// Records are fixed after construction; only their failure counters and
/// lock bits change, and only through [`Verifier`](crate::Verifier).
///
/// # Examples
///
/// ```
/// use keygate_access::CredentialStore;
/// use keygate_core::{Keystroke, parse_symbols};
///
/// let store = CredentialStore::with_default_users();
/// let id: Vec<Keystroke> = parse_symbols("BEBE")
///     .unwrap()
///     .into_iter()
///     .map(Keystroke::from)
///     .collect();
///
/// assert_eq!(store.check_id(&id), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct CredentialStore {
    users: Vec<UserRecord>,
    lockout_threshold: u32,
}

impl CredentialStore {
    /// Create a store from a validated set of records.
    ///
    /// An account locks once its failure counter exceeds `lockout_threshold`.
    ///
    /// # Errors
    ///
    /// Returns an error if fewer than ten records are given or two records
    /// share an id.
    pub fn new(users: Vec<UserRecord>, lockout_threshold: u32) -> Result<Self> {
        if users.len() < MIN_USER_COUNT {
            return Err(Error::UserTableTooSmall {
                count: users.len(),
                minimum: MIN_USER_COUNT,
            });
        }

        let mut seen = HashSet::new();
        for user in &users {
            if !seen.insert(*user.id()) {
                return Err(Error::DuplicateUserId(user.id_text()));
            }
        }

        Ok(Self {
            users,
            lockout_threshold,
        })
    }

    /// Store holding the factory user table.
    pub fn with_default_users() -> Self {
        let users = DEFAULT_USERS
            .iter()
            .filter_map(|(id, password)| UserRecord::new(id, password).ok())
            .collect();

        Self {
            users,
            lockout_threshold: DEFAULT_LOCKOUT_THRESHOLD,
        }
    }

    /// Index of the user whose id was typed, if any.
    pub fn check_id(&self, id: &[Keystroke]) -> Option<usize> {
        self.users.iter().position(|user| user.matches_id(id))
    }

    /// Whether `password` matches the user at `index`.
    ///
    /// An out-of-range index never matches.
    pub fn check_password(&self, index: usize, password: &[Keystroke]) -> bool {
        self.users
            .get(index)
            .is_some_and(|user| user.verify_password(password))
    }

    /// Lockout state of the user at `index`.
    pub fn status(&self, index: usize) -> Option<UserStatus> {
        self.users.get(index).map(UserRecord::status)
    }

    /// Record at `index`.
    pub fn user(&self, index: usize) -> Option<&UserRecord> {
        self.users.get(index)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the table is empty (never true for a constructed store).
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Failure count above which an account locks.
    pub fn lockout_threshold(&self) -> u32 {
        self.lockout_threshold
    }

    /// Change the lock policy. Counters and locks already recorded stay as
    /// they are; the new threshold applies from the next failure.
    pub fn set_lockout_threshold(&mut self, threshold: u32) {
        self.lockout_threshold = threshold;
    }

    pub(crate) fn user_mut(&mut self, index: usize) -> Option<&mut UserRecord> {
        self.users.get_mut(index)
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::with_default_users()
    }
}
