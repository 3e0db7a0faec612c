//! Configured ceilings for request validation.
//!
//! The core's cost is linear in window-minutes times candidate-event count
//! and otherwise unbounded, so the surrounding layer bounds both through
//! these limits before invoking it. Loaded from TOML; every field falls back
//! to its default when absent.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LimitsError;

/// Validation ceilings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Longest allowed event/slot duration.
    #[serde(default = "default_max_event_duration_minutes")]
    pub max_event_duration_minutes: u32,
    /// Longest allowed `before - after` search window.
    #[serde(default = "default_max_interval_duration_minutes")]
    pub max_interval_duration_minutes: i64,
    /// Most participants per free-spot request.
    #[serde(default = "default_max_participants")]
    pub max_participants: usize,
    /// Listing page size when the request does not specify one.
    #[serde(default = "default_default_page_limit")]
    pub default_page_limit: usize,
    /// Largest allowed listing page size.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: usize,
}

fn default_max_event_duration_minutes() -> u32 {
    24 * 60
}
fn default_max_interval_duration_minutes() -> i64 {
    31 * 24 * 60
}
fn default_max_participants() -> usize {
    100
}
fn default_default_page_limit() -> usize {
    10
}
fn default_max_page_limit() -> usize {
    50
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_event_duration_minutes: default_max_event_duration_minutes(),
            max_interval_duration_minutes: default_max_interval_duration_minutes(),
            max_participants: default_max_participants(),
            default_page_limit: default_default_page_limit(),
            max_page_limit: default_max_page_limit(),
        }
    }
}

impl Limits {
    /// Load limits from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LimitsError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LimitsError::LoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let limits: Limits = toml::from_str("max_participants = 5").unwrap();
        assert_eq!(limits.max_participants, 5);
        assert_eq!(limits.max_event_duration_minutes, 1440);
        assert_eq!(limits.max_interval_duration_minutes, 44640);
        assert_eq!(limits.default_page_limit, 10);
        assert_eq!(limits.max_page_limit, 50);
    }

    #[test]
    fn empty_config_equals_default() {
        let limits: Limits = toml::from_str("").unwrap();
        assert_eq!(limits, Limits::default());
    }
}
