//! Credential verification and lockout policy.
//!
//! The checks run in a fixed order and stop at the first denial:
//!
//! 1. **Id lookup**: no matching record → `Deny(unknown id)`, nothing changes
//! 2. **Lock**: locked account → `Deny(locked)`, whatever the password
//! 3. **Password**: match → `Grant`, failure counter reset
//! 4. **Failure**: counter incremented, lock engaged once it exceeds the
//!    threshold → `Deny(bad password)`

use keygate_core::constants::{ENTRY_LENGTH, ID_LENGTH};
use keygate_core::{DenyReason, Keystroke, Outcome};
use serde::Serialize;
use tracing::{info, warn};

use crate::store::CredentialStore;

/// A completed entry split into its id and password parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    keys: [Keystroke; ENTRY_LENGTH],
}

impl Credentials {
    /// Build credentials from exactly ten keystrokes, oldest first.
    pub fn from_keystrokes(keys: &[Keystroke]) -> Option<Self> {
        Some(Self {
            keys: keys.try_into().ok()?,
        })
    }

    /// The first four keystrokes.
    pub fn id(&self) -> &[Keystroke] {
        &self.keys[..ID_LENGTH]
    }

    /// The last six keystrokes.
    pub fn password(&self) -> &[Keystroke] {
        &self.keys[ID_LENGTH..]
    }
}

/// Result of one verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub outcome: Outcome,

    /// Index of the matched user, `None` for an unknown id.
    pub user_index: Option<usize>,
}

/// Stateless verifier over a [`CredentialStore`].
///
/// # Examples
///
/// ```
/// use keygate_access::{CredentialStore, Credentials, Verifier};
/// use keygate_core::{Keystroke, Outcome, parse_symbols};
///
/// let mut store = CredentialStore::with_default_users();
/// let keys: Vec<Keystroke> = parse_symbols("1234123456")
///     .unwrap()
///     .into_iter()
///     .map(Keystroke::from)
///     .collect();
///
/// let credentials = Credentials::from_keystrokes(&keys).unwrap();
/// let verdict = Verifier::verify(&mut store, &credentials);
/// assert_eq!(verdict.outcome, Outcome::Grant);
/// assert_eq!(verdict.user_index, Some(0));
/// ```
pub struct Verifier;

impl Verifier {
    /// Verify a completed entry and apply the lockout policy.
    pub fn verify(store: &mut CredentialStore, credentials: &Credentials) -> Verdict {
        let Some(index) = store.check_id(credentials.id()) else {
            info!("verification denied: unknown id");
            return Verdict {
                outcome: Outcome::Deny(DenyReason::UnknownId),
                user_index: None,
            };
        };

        let threshold = store.lockout_threshold();
        let password_ok = store.check_password(index, credentials.password());

        let Some(user) = store.user_mut(index) else {
            return Verdict {
                outcome: Outcome::Deny(DenyReason::UnknownId),
                user_index: None,
            };
        };

        let outcome = if user.is_locked() {
            Outcome::Deny(DenyReason::Locked)
        } else if password_ok {
            user.record_success();
            Outcome::Grant
        } else {
            if user.record_failure(threshold) {
                warn!(user = index, failures = user.failure_count(), "account locked");
            }
            Outcome::Deny(DenyReason::BadPassword)
        };

        info!(user = index, %outcome, failures = user.failure_count(), "verification complete");
        Verdict {
            outcome,
            user_index: Some(index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_core::parse_symbols;
    use rstest::rstest;

    fn credentials(text: &str) -> Credentials {
        let keys: Vec<Keystroke> = parse_symbols(text)
            .unwrap()
            .into_iter()
            .map(Keystroke::from)
            .collect();
        Credentials::from_keystrokes(&keys).unwrap()
    }

    #[test]
    fn test_credentials_need_ten_keystrokes() {
        let keys = vec![Keystroke::Undecodable; 9];
        assert!(Credentials::from_keystrokes(&keys).is_none());

        let creds = credentials("DCBA654321");
        assert_eq!(creds.id().len(), 4);
        assert_eq!(creds.password().len(), 6);
    }

    #[rstest]
    #[case("1234123456", Outcome::Grant, Some(0))]
    #[case("DCBA654321", Outcome::Grant, Some(1))]
    #[case("BEBE000000", Outcome::Grant, Some(2))]
    #[case("1234123457", Outcome::Deny(DenyReason::BadPassword), Some(0))]
    #[case("5555123456", Outcome::Deny(DenyReason::UnknownId), None)]
    fn test_verify_outcomes(
        #[case] entry: &str,
        #[case] outcome: Outcome,
        #[case] user_index: Option<usize>,
    ) {
        let mut store = CredentialStore::with_default_users();
        let verdict = Verifier::verify(&mut store, &credentials(entry));
        assert_eq!(verdict, Verdict { outcome, user_index });
    }

    #[test]
    fn test_unknown_id_changes_nothing() {
        let mut store = CredentialStore::with_default_users();
        Verifier::verify(&mut store, &credentials("5555123456"));
        for index in 0..store.len() {
            assert_eq!(store.status(index).unwrap().failure_count, 0);
        }
    }

    #[test]
    fn test_grant_resets_counter() {
        let mut store = CredentialStore::with_default_users();
        for _ in 0..3 {
            Verifier::verify(&mut store, &credentials("1234000000"));
        }
        assert_eq!(store.status(0).unwrap().failure_count, 3);

        let verdict = Verifier::verify(&mut store, &credentials("1234123456"));
        assert!(verdict.outcome.is_grant());
        assert_eq!(store.status(0).unwrap().failure_count, 0);
    }

    #[test]
    fn test_fifth_failure_locks_permanently() {
        let mut store = CredentialStore::with_default_users();
        for attempt in 1..=4 {
            let verdict = Verifier::verify(&mut store, &credentials("1234999999"));
            assert_eq!(verdict.outcome, Outcome::Deny(DenyReason::BadPassword));
            assert_eq!(store.status(0).unwrap().failure_count, attempt);
            assert!(!store.status(0).unwrap().locked);
        }

        let verdict = Verifier::verify(&mut store, &credentials("1234999999"));
        assert_eq!(verdict.outcome, Outcome::Deny(DenyReason::BadPassword));
        assert!(store.status(0).unwrap().locked);

        let verdict = Verifier::verify(&mut store, &credentials("1234123456"));
        assert_eq!(verdict.outcome, Outcome::Deny(DenyReason::Locked));
    }

    #[test]
    fn test_locked_failure_does_not_count() {
        let mut store = CredentialStore::with_default_users();
        for _ in 0..5 {
            Verifier::verify(&mut store, &credentials("DCBA000000"));
        }
        let before = store.status(1).unwrap();
        assert!(before.locked);

        let verdict = Verifier::verify(&mut store, &credentials("DCBA000000"));
        assert_eq!(verdict.outcome, Outcome::Deny(DenyReason::Locked));
        assert_eq!(store.status(1).unwrap(), before);
    }

    #[test]
    fn test_lock_is_per_user() {
        let mut store = CredentialStore::with_default_users();
        for _ in 0..5 {
            Verifier::verify(&mut store, &credentials("C4C4111111"));
        }
        assert!(store.status(3).unwrap().locked);

        let verdict = Verifier::verify(&mut store, &credentials("4321654321"));
        assert_eq!(verdict.outcome, Outcome::Grant);
    }

    #[test]
    fn test_undecodable_password_is_bad_password() {
        let mut store = CredentialStore::with_default_users();
        let mut keys: Vec<Keystroke> = parse_symbols("123412345")
            .unwrap()
            .into_iter()
            .map(Keystroke::from)
            .collect();
        keys.push(Keystroke::Undecodable);

        let verdict = Verifier::verify(&mut store, &Credentials::from_keystrokes(&keys).unwrap());
        assert_eq!(verdict.outcome, Outcome::Deny(DenyReason::BadPassword));
        assert_eq!(store.status(0).unwrap().failure_count, 1);
    }
}
