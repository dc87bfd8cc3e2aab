//! JSON user table.
//!
//! ```json
//! [
//!   { "id": "1234", "password": "123456" },
//!   { "id": "DCBA", "password": "654321" }
//! ]
//! ```

use std::fs;
use std::path::Path;

use keygate_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::{CredentialStore, DEFAULT_USERS};
use crate::user::UserRecord;

/// One user as written in the table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub id: String,
    pub password: String,
}

/// User table loaded from (or saved to) a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserTableConfig {
    pub users: Vec<UserEntry>,
}

impl UserTableConfig {
    /// Load a table from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let table: Self = serde_json::from_str(&text)?;
        info!(path = %path.display(), users = table.users.len(), "user table loaded");
        Ok(table)
    }

    /// Save the table as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Validate the entries and build a credential store.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed id or password, a duplicate id or a
    /// table with fewer than ten users.
    pub fn into_store(self, lockout_threshold: u32) -> Result<CredentialStore> {
        let users = self
            .users
            .iter()
            .map(|entry| UserRecord::new(&entry.id, &entry.password))
            .collect::<Result<Vec<_>>>()?;
        CredentialStore::new(users, lockout_threshold)
    }
}

impl Default for UserTableConfig {
    /// The factory user table.
    fn default() -> Self {
        Self {
            users: DEFAULT_USERS
                .iter()
                .map(|(id, password)| UserEntry {
                    id: (*id).to_string(),
                    password: (*password).to_string(),
                })
                .collect(),
        }
    }
}
