//! Device timing and policy configuration.
//!
//! Durations are stored as milliseconds so the JSON form stays readable:
//!
//! ```json
//! {
//!   "scan_period_ms": 2,
//!   "debounce_period_ms": 100,
//!   "entry_timeout_ms": 10000,
//!   "blink_half_period_ms": 500,
//!   "grant_duration_ms": 10000,
//!   "deny_duration_ms": 3000,
//!   "lockout_threshold": 4
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use keygate_core::constants::{
    DEFAULT_BLINK_HALF_PERIOD_MS, DEFAULT_DEBOUNCE_PERIOD_MS, DEFAULT_DENY_DURATION_MS,
    DEFAULT_ENTRY_TIMEOUT_MS, DEFAULT_GRANT_DURATION_MS, DEFAULT_LOCKOUT_THRESHOLD,
    DEFAULT_SCAN_PERIOD_MS,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EmulatorError, Result};

/// Timing and lockout settings of one device.
///
/// Missing fields take their default value when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Row-scan tick period.
    pub scan_period_ms: u64,

    /// Debounce sample period.
    pub debounce_period_ms: u64,

    /// Time allowed from the first keystroke to the tenth.
    pub entry_timeout_ms: u64,

    /// Half period of the password blink.
    pub blink_half_period_ms: u64,

    /// How long the success indicator stays on.
    pub grant_duration_ms: u64,

    /// How long the failure indicator stays on.
    pub deny_duration_ms: u64,

    /// An account locks once its failure counter exceeds this value.
    pub lockout_threshold: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            scan_period_ms: DEFAULT_SCAN_PERIOD_MS,
            debounce_period_ms: DEFAULT_DEBOUNCE_PERIOD_MS,
            entry_timeout_ms: DEFAULT_ENTRY_TIMEOUT_MS,
            blink_half_period_ms: DEFAULT_BLINK_HALF_PERIOD_MS,
            grant_duration_ms: DEFAULT_GRANT_DURATION_MS,
            deny_duration_ms: DEFAULT_DENY_DURATION_MS,
            lockout_threshold: DEFAULT_LOCKOUT_THRESHOLD,
        }
    }
}

impl DeviceConfig {
    /// Load a configuration file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON or
    /// fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(keygate_core::Error::from)?;
        let config: Self = serde_json::from_str(&text).map_err(keygate_core::Error::from)?;
        config.validate()?;
        info!(path = %path.display(), "device configuration loaded");
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(keygate_core::Error::from)?;
        fs::write(path, text).map_err(keygate_core::Error::from)?;
        Ok(())
    }

    /// Check the settings for consistency.
    ///
    /// # Errors
    ///
    /// Returns an error if any duration is zero or the debounce period is
    /// not longer than the scan period.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("scan_period_ms", self.scan_period_ms),
            ("debounce_period_ms", self.debounce_period_ms),
            ("entry_timeout_ms", self.entry_timeout_ms),
            ("blink_half_period_ms", self.blink_half_period_ms),
            ("grant_duration_ms", self.grant_duration_ms),
            ("deny_duration_ms", self.deny_duration_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(EmulatorError::invalid_config(format!("{name} must be non-zero")));
        }

        if self.debounce_period_ms <= self.scan_period_ms {
            return Err(EmulatorError::invalid_config(format!(
                "debounce period ({} ms) must be longer than the scan period ({} ms)",
                self.debounce_period_ms, self.scan_period_ms
            )));
        }

        Ok(())
    }

    pub fn scan_period(&self) -> Duration {
        Duration::from_millis(self.scan_period_ms)
    }

    pub fn debounce_period(&self) -> Duration {
        Duration::from_millis(self.debounce_period_ms)
    }

    pub fn entry_timeout(&self) -> Duration {
        Duration::from_millis(self.entry_timeout_ms)
    }

    pub fn blink_half_period(&self) -> Duration {
        Duration::from_millis(self.blink_half_period_ms)
    }

    pub fn grant_duration(&self) -> Duration {
        Duration::from_millis(self.grant_duration_ms)
    }

    pub fn deny_duration(&self) -> Duration {
        Duration::from_millis(self.deny_duration_ms)
    }
}
