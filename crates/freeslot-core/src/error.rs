//! Core error types for freeslot-core.
//!
//! One thiserror enum per concern, aggregated into [`CoreError`] for callers
//! that only want a single error type.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;
use uuid::Uuid;

/// Core error type for freeslot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Event construction errors
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    /// Recurrence pattern errors
    #[error("Recurrence error: {0}")]
    Recurrence(#[from] RecurrenceError),

    /// Occupancy timeline errors
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Event source errors
    #[error("Event source error: {0}")]
    Source(#[from] SourceError),

    /// Limits configuration errors
    #[error("Limits error: {0}")]
    Limits(#[from] LimitsError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Request validation errors, surfaced before any core computation runs.
///
/// Every variant names the offending field so callers can report
/// field-level messages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Invalid value for a request field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },

    /// Invalid time range
    #[error("Invalid time range: `before` ({before}) must be greater than `after` ({after})")]
    InvalidTimeRange {
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
    },

    /// Referenced users that do not exist
    #[error("Invalid value for '{field}': users {ids:?} do not exist")]
    UnknownUsers { field: &'static str, ids: Vec<Uuid> },
}

/// Event construction errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventError {
    /// Event name must be non-empty
    #[error("Event name must not be empty")]
    EmptyName,

    /// Event duration must be at least one minute
    #[error("Event duration must be at least 1 minute, got {0}")]
    InvalidDuration(u32),

    /// Event duration exceeds the configured ceiling
    #[error("Event duration must not exceed {max} minutes, got {got}")]
    DurationTooLong { got: u32, max: u32 },

    /// Invalid recurrence pattern
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),
}

/// Recurrence pattern errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecurrenceError {
    /// Interval must be at least 1
    #[error("Recurrence interval must be at least 1, got {0}")]
    InvalidInterval(u32),

    /// Count, when given, must be at least 2
    #[error("Recurrence count must be at least 2, got {0}")]
    InvalidCount(u32),

    /// Weekly recurrence needs at least one weekday
    #[error("Weekly recurrence must carry at least one weekday")]
    EmptyWeekdays,
}

/// Occupancy timeline errors.
///
/// These indicate broken caller preconditions, not recoverable input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    /// Window bounds produce a negative timeline size
    #[error("Invalid range: `before` ({before}) must not precede `after` ({after})")]
    InvalidRange {
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
    },
}

/// Event source errors.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Underlying store failed to produce events
    #[error("Event source query failed: {0}")]
    QueryFailed(String),

    /// Failed to decode a serialized event set
    #[error("Failed to decode event set: {0}")]
    DecodeFailed(#[from] serde_json::Error),

    /// A decoded event violates its invariants
    #[error("Invalid event {id}: {source}")]
    InvalidEvent {
        id: i64,
        #[source]
        source: EventError,
    },
}

/// Limits configuration errors.
#[derive(Error, Debug)]
pub enum LimitsError {
    /// Failed to read the limits file
    #[error("Failed to load limits from {path}: {source}")]
    LoadFailed {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the limits file
    #[error("Failed to parse limits: {0}")]
    ParseFailed(#[from] toml::de::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
