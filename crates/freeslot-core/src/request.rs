//! Request/response shapes and external-boundary validation.
//!
//! Everything here runs before the core algorithms are invoked. All failures
//! are field-level [`ValidationError`]s; once a request passes, the core may
//! assume its preconditions hold.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};
use crate::limits::Limits;
use crate::service::EventSource;

/// Free-spot search request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSpotRequest {
    pub after: DateTime<FixedOffset>,
    pub before: DateTime<FixedOffset>,
    pub duration_minutes: u32,
    pub user_ids: BTreeSet<Uuid>,
}

impl FreeSpotRequest {
    /// Validate field ranges and window arithmetic against the configured
    /// limits.
    pub fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        validate_instant("after", self.after)?;
        validate_instant("before", self.before)?;

        if self.duration_minutes < 1 || self.duration_minutes > limits.max_event_duration_minutes
        {
            return Err(ValidationError::InvalidValue {
                field: "duration_minutes",
                message: format!(
                    "must be between 1 and {}",
                    limits.max_event_duration_minutes
                ),
            });
        }

        if self.user_ids.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "user_ids",
                message: "must name at least one user".into(),
            });
        }
        if self.user_ids.len() > limits.max_participants {
            return Err(ValidationError::InvalidValue {
                field: "user_ids",
                message: format!("must not exceed {} users", limits.max_participants),
            });
        }

        let delta = (self.before - self.after).num_minutes();
        if delta <= 0 {
            return Err(ValidationError::InvalidTimeRange {
                after: self.after,
                before: self.before,
            });
        }
        if delta > limits.max_interval_duration_minutes {
            return Err(ValidationError::InvalidValue {
                field: "before",
                message: format!(
                    "after-before interval should not exceed {} minutes",
                    limits.max_interval_duration_minutes
                ),
            });
        }
        if delta < i64::from(self.duration_minutes) {
            return Err(ValidationError::InvalidValue {
                field: "before",
                message: "`before` must be greater than `after + duration_minutes`".into(),
            });
        }
        Ok(())
    }
}

/// Free-spot search response. `timeslot: null` means no slot was found,
/// which is a normal outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSpotResponse {
    pub timeslot: Option<DateTime<FixedOffset>>,
}

/// Event listing request with keyset pagination: `offset` is the exclusive
/// lower bound on event id carried over from the previous page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEventsRequest {
    pub after: DateTime<FixedOffset>,
    pub before: DateTime<FixedOffset>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_page_limit")]
    pub limit: usize,
}

fn default_page_limit() -> usize {
    10
}

impl ListEventsRequest {
    pub fn validate(&self, limits: &Limits) -> Result<(), ValidationError> {
        validate_instant("after", self.after)?;
        validate_instant("before", self.before)?;

        if self.before <= self.after {
            return Err(ValidationError::InvalidTimeRange {
                after: self.after,
                before: self.before,
            });
        }
        if self.limit < 1 || self.limit > limits.max_page_limit {
            return Err(ValidationError::InvalidValue {
                field: "limit",
                message: format!("must be between 1 and {}", limits.max_page_limit),
            });
        }
        Ok(())
    }
}

/// Whole-minute check for window bounds. Offset presence is guaranteed by the
/// `DateTime<FixedOffset>` type itself; a naive timestamp fails at parse time.
pub fn validate_instant(
    field: &'static str,
    value: DateTime<FixedOffset>,
) -> Result<(), ValidationError> {
    if value.second() != 0 {
        return Err(ValidationError::InvalidValue {
            field,
            message: "seconds must be 0".into(),
        });
    }
    if value.nanosecond() != 0 {
        return Err(ValidationError::InvalidValue {
            field,
            message: "subseconds must be 0".into(),
        });
    }
    Ok(())
}

/// Check that every requested user id references an existing account.
pub fn validate_user_ids<S: EventSource>(
    source: &S,
    user_ids: &BTreeSet<Uuid>,
    field: &'static str,
) -> Result<(), CoreError> {
    let mut missing = Vec::new();
    for user_id in user_ids {
        if !source.user_exists(*user_id)? {
            missing.push(*user_id);
        }
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::UnknownUsers { field, ids: missing }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::InMemoryEventSource;
    use chrono::NaiveDate;

    fn stamp(d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        NaiveDate::from_ymd_opt(2022, 1, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    fn request() -> FreeSpotRequest {
        FreeSpotRequest {
            after: stamp(2, 0, 0, 0),
            before: stamp(20, 0, 0, 0),
            duration_minutes: 10,
            user_ids: [Uuid::new_v4()].into_iter().collect(),
        }
    }

    #[test]
    fn well_formed_request_passes() {
        assert_eq!(request().validate(&Limits::default()), Ok(()));
    }

    #[test]
    fn nonzero_seconds_are_rejected() {
        let mut bad = request();
        bad.after = stamp(2, 0, 0, 30);
        assert_eq!(
            bad.validate(&Limits::default()),
            Err(ValidationError::InvalidValue {
                field: "after",
                message: "seconds must be 0".into(),
            })
        );
    }

    #[test]
    fn empty_user_ids_are_rejected() {
        let mut bad = request();
        bad.user_ids.clear();
        assert_eq!(
            bad.validate(&Limits::default()),
            Err(ValidationError::InvalidValue {
                field: "user_ids",
                message: "must name at least one user".into(),
            })
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let mut bad = request();
        bad.before = stamp(1, 0, 0, 0);
        assert!(matches!(
            bad.validate(&Limits::default()),
            Err(ValidationError::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let limits = Limits {
            max_interval_duration_minutes: 60,
            ..Limits::default()
        };
        let result = request().validate(&limits);
        assert_eq!(
            result,
            Err(ValidationError::InvalidValue {
                field: "before",
                message: "after-before interval should not exceed 60 minutes".into(),
            })
        );
    }

    #[test]
    fn window_shorter_than_duration_is_rejected() {
        let mut bad = request();
        bad.before = stamp(2, 0, 5, 0); // 5-minute window, 10-minute slot
        assert_eq!(
            bad.validate(&Limits::default()),
            Err(ValidationError::InvalidValue {
                field: "before",
                message: "`before` must be greater than `after + duration_minutes`".into(),
            })
        );
    }

    #[test]
    fn zero_and_oversized_durations_are_rejected() {
        let limits = Limits::default();
        let mut bad = request();
        bad.duration_minutes = 0;
        assert!(bad.validate(&limits).is_err());
        bad.duration_minutes = limits.max_event_duration_minutes + 1;
        assert!(bad.validate(&limits).is_err());
    }

    #[test]
    fn list_request_defaults_and_limit_bounds() {
        let parsed: ListEventsRequest = serde_json::from_str(
            r#"{"after":"2022-01-01T00:00:00Z","before":"2022-01-12T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.offset, 0);
        assert_eq!(parsed.limit, 10);
        assert_eq!(parsed.validate(&Limits::default()), Ok(()));

        let oversized = ListEventsRequest {
            limit: 51,
            ..parsed
        };
        assert!(oversized.validate(&Limits::default()).is_err());
    }

    #[test]
    fn unknown_user_ids_are_reported_per_field() {
        let known = Uuid::new_v4();
        let unknown = Uuid::new_v4();
        let source = InMemoryEventSource {
            users: [known].into_iter().collect(),
            ..InMemoryEventSource::default()
        };

        let ids: BTreeSet<Uuid> = [known, unknown].into_iter().collect();
        let error = validate_user_ids(&source, &ids, "user_ids").unwrap_err();
        match error {
            CoreError::Validation(ValidationError::UnknownUsers { field, ids }) => {
                assert_eq!(field, "user_ids");
                assert_eq!(ids, vec![unknown]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
