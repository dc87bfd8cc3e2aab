//! Credential store and verifier for the keygate keypad.
//!
//! A completed entry of ten keystrokes is split into a four-symbol id and a
//! six-symbol password and checked against a fixed table of at least ten
//! users. Repeated password failures lock an account for the rest of the
//! process lifetime.
//!
//! # Security
//!
//! Password comparison runs in constant time via the `subtle` crate and the
//! typed password is never logged. Credentials are still stored in
//! plaintext; this is not a cryptographic authentication scheme.
//!
//! # Examples
//!
//! ```
//! use keygate_access::{CredentialStore, Credentials, Verifier};
//! use keygate_core::{DenyReason, Keystroke, Outcome, parse_symbols};
//!
//! let mut store = CredentialStore::with_default_users();
//! let wrong: Vec<Keystroke> = parse_symbols("1234000000")
//!     .unwrap()
//!     .into_iter()
//!     .map(Keystroke::from)
//!     .collect();
//! let wrong = Credentials::from_keystrokes(&wrong).unwrap();
//!
//! for _ in 0..5 {
//!     Verifier::verify(&mut store, &wrong);
//! }
//! assert!(store.status(0).unwrap().locked);
//! ```

pub mod config;
pub mod store;
pub mod user;
pub mod verifier;

pub use config::{UserEntry, UserTableConfig};
pub use store::{CredentialStore, DEFAULT_USERS};
pub use user::{UserRecord, UserStatus};
pub use verifier::{Credentials, Verdict, Verifier};
