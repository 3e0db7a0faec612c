//! Shared helpers for command implementations.

use std::error::Error;
use std::path::Path;

use chrono::{DateTime, FixedOffset};
use freeslot_core::{request::validate_instant, InMemoryEventSource, Limits};

/// Parse an RFC 3339 instant and enforce whole-minute precision. A timestamp
/// without an offset fails to parse at all.
pub fn parse_minute(
    field: &'static str,
    raw: &str,
) -> Result<DateTime<FixedOffset>, Box<dyn Error>> {
    let instant = DateTime::parse_from_rfc3339(raw).map_err(|e| {
        format!("invalid value for '{field}': {e} (expected RFC 3339 with timezone offset)")
    })?;
    validate_instant(field, instant)?;
    Ok(instant)
}

/// Load the JSON event file (users, events, invites).
pub fn load_source(path: &Path) -> Result<InMemoryEventSource, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(InMemoryEventSource::from_json(&raw)?)
}

/// Load limits from a TOML file, or fall back to defaults.
pub fn load_limits(path: Option<&Path>) -> Result<Limits, Box<dyn Error>> {
    match path {
        Some(path) => Ok(Limits::load(path)?),
        None => Ok(Limits::default()),
    }
}
