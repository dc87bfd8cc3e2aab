use keygate_core::constants::{ID_LENGTH, PASSWORD_LENGTH};
use keygate_core::{Error, Keystroke, Result, Symbol, format_symbols, parse_symbols};
use serde::Serialize;
use subtle::ConstantTimeEq;

/// Byte used for an undecodable keystroke when comparing passwords.
///
/// Outside the symbol range, so it never matches a stored symbol.
const UNDECODABLE_BYTE: u8 = 0xFF;

/// One entry of the user table.
///
/// The failure counter and lock bit live only for the process lifetime.
/// Once `locked` is set it is never cleared.
///
/// # Examples
///
/// ```
/// use keygate_access::UserRecord;
/// use keygate_core::{Keystroke, parse_symbols};
///
/// let user = UserRecord::new("1234", "123456").unwrap();
/// let typed: Vec<Keystroke> = parse_symbols("123456")
///     .unwrap()
///     .into_iter()
///     .map(Keystroke::from)
///     .collect();
///
/// assert!(user.verify_password(&typed));
/// assert!(!user.is_locked());
/// ```
#[derive(Debug, Clone)]
pub struct UserRecord {
    id: [Symbol; ID_LENGTH],
    password: [Symbol; PASSWORD_LENGTH],
    failure_count: u32,
    locked: bool,
}

/// Diagnostic snapshot of a user's lockout state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UserStatus {
    pub failure_count: u32,
    pub locked: bool,
}

impl UserRecord {
    /// Build a record from its textual id and password.
    ///
    /// # Errors
    ///
    /// Returns an error if either string has the wrong length or contains a
    /// character outside `0-9A-F`.
    pub fn new(id: &str, password: &str) -> Result<Self> {
        Ok(Self {
            id: fixed_symbols(id, "id")?,
            password: fixed_symbols(password, "password")?,
            failure_count: 0,
            locked: false,
        })
    }

    /// User id.
    pub fn id(&self) -> &[Symbol; ID_LENGTH] {
        &self.id
    }

    /// User id as text.
    pub fn id_text(&self) -> String {
        format_symbols(&self.id)
    }

    /// Whether the typed keystrokes spell this user's id.
    pub fn matches_id(&self, typed: &[Keystroke]) -> bool {
        typed.len() == ID_LENGTH
            && typed
                .iter()
                .zip(self.id.iter())
                .all(|(key, symbol)| key.symbol() == Some(*symbol))
    }

    /// Compare the typed keystrokes with the stored password.
    ///
    /// Every symbol takes part in the comparison, which runs in constant
    /// time over the symbol bytes.
    pub fn verify_password(&self, typed: &[Keystroke]) -> bool {
        let typed: Vec<u8> = typed
            .iter()
            .map(|key| key.symbol().map_or(UNDECODABLE_BYTE, |symbol| symbol.as_u8()))
            .collect();
        let stored = self.password.map(|symbol| symbol.as_u8());

        stored.as_slice().ct_eq(typed.as_slice()).into()
    }

    /// Consecutive failed password checks.
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    /// Whether the account is permanently locked.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lockout snapshot.
    pub fn status(&self) -> UserStatus {
        UserStatus {
            failure_count: self.failure_count,
            locked: self.locked,
        }
    }

    /// Count a failed password check, locking once `threshold` is exceeded.
    ///
    /// Returns `true` if this failure engaged the lock.
    pub(crate) fn record_failure(&mut self, threshold: u32) -> bool {
        self.failure_count = self.failure_count.saturating_add(1);
        if !self.locked && self.failure_count > threshold {
            self.locked = true;
            return true;
        }
        false
    }

    pub(crate) fn record_success(&mut self) {
        self.failure_count = 0;
    }
}

fn fixed_symbols<const N: usize>(text: &str, field: &str) -> Result<[Symbol; N]> {
    let symbols = parse_symbols(text)?;
    let count = symbols.len();
    symbols.try_into().map_err(|_| {
        Error::invalid_credential(format!("{field} must be {} symbols, got {count}", N))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn keys(text: &str) -> Vec<Keystroke> {
        parse_symbols(text)
            .unwrap()
            .into_iter()
            .map(Keystroke::from)
            .collect()
    }

    #[rstest]
    #[case("123", "123456")]
    #[case("12345", "123456")]
    #[case("1234", "12345")]
    #[case("1234", "1234567")]
    #[case("12G4", "123456")]
    fn test_malformed_record_rejected(#[case] id: &str, #[case] password: &str) {
        assert!(UserRecord::new(id, password).is_err());
    }

    #[test]
    fn test_id_match_is_exact() {
        let user = UserRecord::new("DCBA", "654321").unwrap();
        assert!(user.matches_id(&keys("DCBA")));
        assert!(!user.matches_id(&keys("DCBB")));
        assert!(!user.matches_id(&keys("DCB")));
        assert_eq!(user.id_text(), "DCBA");
    }

    #[test]
    fn test_undecodable_never_matches() {
        let user = UserRecord::new("1234", "123456").unwrap();
        let mut typed = keys("123");
        typed.push(Keystroke::Undecodable);
        assert!(!user.matches_id(&typed));

        let mut typed = keys("12345");
        typed.push(Keystroke::Undecodable);
        assert!(!user.verify_password(&typed));
    }

    #[rstest]
    #[case("123456", true)]
    #[case("123457", false)]
    #[case("923456", false)]
    #[case("123400", false)]
    #[case("12345", false)]
    fn test_password_compares_all_symbols(#[case] typed: &str, #[case] expected: bool) {
        let user = UserRecord::new("1234", "123456").unwrap();
        assert_eq!(user.verify_password(&keys(typed)), expected);
    }

    #[test]
    fn test_lock_engages_after_threshold() {
        let mut user = UserRecord::new("1234", "123456").unwrap();
        for _ in 0..4 {
            assert!(!user.record_failure(4));
        }
        assert_eq!(user.failure_count(), 4);
        assert!(!user.is_locked());

        assert!(user.record_failure(4));
        assert!(user.is_locked());

        user.record_success();
        assert_eq!(
            user.status(),
            UserStatus {
                failure_count: 0,
                locked: true
            }
        );
    }
}
