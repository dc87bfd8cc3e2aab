//! Property-based tests over whole entries.
//!
//! Every case runs a full simulated entry, so the case count is kept low.

use keygate_access::{CredentialStore, DEFAULT_USERS};
use keygate_core::{DenyReason, Outcome};
use keygate_emulator::Simulation;
use proptest::prelude::*;

/// Strategy for generating ids that are not in the factory table.
fn unknown_id() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9A-F]{4}")
        .expect("Failed to create id regex strategy")
        .prop_filter("id must be unknown", |id| {
            DEFAULT_USERS.iter().all(|(known, _)| known != id)
        })
}

/// Strategy for generating passwords.
fn password() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9A-F]{6}").expect("Failed to create password regex strategy")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: an unknown id is denied and leaves every counter untouched.
    #[test]
    fn prop_unknown_id_denied_without_side_effects(id in unknown_id(), password in password()) {
        let mut sim = Simulation::with_defaults().unwrap();
        sim.enter(&format!("{id}{password}")).unwrap();

        prop_assert_eq!(sim.last_outcome(), Some(Outcome::Deny(DenyReason::UnknownId)));
        for index in 0..DEFAULT_USERS.len() {
            prop_assert_eq!(sim.user_status(index).unwrap().failure_count, 0);
        }
    }

    /// Property: a known id with any password other than its own is a bad
    /// password and bumps exactly that user's counter.
    #[test]
    fn prop_wrong_password_counts_once(index in 0usize..10, password in password()) {
        let (id, real) = DEFAULT_USERS[index];
        prop_assume!(password != real);

        let mut sim = Simulation::with_defaults().unwrap();
        sim.enter(&format!("{id}{password}")).unwrap();

        prop_assert_eq!(sim.last_outcome(), Some(Outcome::Deny(DenyReason::BadPassword)));
        let store: &CredentialStore = &sim.controller().state().credentials;
        for other in 0..store.len() {
            let expected = u32::from(other == index);
            prop_assert_eq!(store.status(other).unwrap().failure_count, expected);
        }
    }
}
