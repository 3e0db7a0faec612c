//! Calendar events and per-event occurrence expansion.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventError;
use crate::recurrence::Recurrence;

/// A calendar event, one-off or recurring.
///
/// Immutable for the purposes of occurrence expansion: expansion is a pure
/// function of `(start, duration_minutes, recurrence)` plus the query window.
/// The event is the sole owner of its recurrence pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
    pub start: DateTime<FixedOffset>,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl Event {
    /// Create a new event.
    ///
    /// # Panics
    /// Panics on an empty name, zero duration, or an invalid recurrence
    /// pattern. Use [`try_new`](Self::try_new) for a non-panicking version.
    pub fn new(
        id: i64,
        owner_id: Uuid,
        name: impl Into<String>,
        start: DateTime<FixedOffset>,
        duration_minutes: u32,
        recurrence: Option<Recurrence>,
    ) -> Self {
        Self::try_new(id, owner_id, name, start, duration_minutes, recurrence)
            .expect("Event::new: invalid event")
    }

    /// Create a new event, returning a Result.
    ///
    /// # Errors
    /// Returns an error if the name is empty, the duration is zero, or the
    /// recurrence pattern violates its invariants.
    pub fn try_new(
        id: i64,
        owner_id: Uuid,
        name: impl Into<String>,
        start: DateTime<FixedOffset>,
        duration_minutes: u32,
        recurrence: Option<Recurrence>,
    ) -> Result<Self, EventError> {
        let event = Self {
            id,
            owner_id,
            name: name.into(),
            start,
            duration_minutes,
            recurrence,
        };
        event.validate()?;
        Ok(event)
    }

    /// Check the event's structural invariants. Deserialization does not run
    /// these checks, so sources decoding untrusted input must call this
    /// before handing events to occurrence expansion.
    ///
    /// # Errors
    /// Returns an error if the name is empty, the duration is zero, or the
    /// recurrence pattern violates its invariants.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.name.is_empty() {
            return Err(EventError::EmptyName);
        }
        if self.duration_minutes < 1 {
            return Err(EventError::InvalidDuration(self.duration_minutes));
        }
        if let Some(recurrence) = &self.recurrence {
            recurrence.validate()?;
        }
        Ok(())
    }

    /// End instant of an occurrence starting at `start`.
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Occurrence starts of this event relevant to `[after, before]`.
    ///
    /// A one-off event yields its start iff the start lies at or before
    /// `before` and either the start or the event's tail reaches `after`.
    /// A recurring event delegates to its pattern's window expansion.
    pub fn generate_for_timeperiod(
        &self,
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
    ) -> Vec<DateTime<FixedOffset>> {
        if self.start > before {
            return Vec::new();
        }

        if let Some(recurrence) = &self.recurrence {
            return recurrence.generate_for_timeperiod(
                after,
                before,
                self.start,
                self.duration_minutes,
            );
        }

        if self.start >= after || self.end() >= after {
            vec![self.start]
        } else {
            Vec::new()
        }
    }
}

/// An event annotated with its occurrence starts inside a query window.
/// Derived and ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWithOccurrences {
    #[serde(flatten)]
    pub event: Event,
    pub occurrences: Vec<DateTime<FixedOffset>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::{RecurrenceKind, Weekday};
    use chrono::NaiveDate;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    fn one_off(start: DateTime<FixedOffset>, duration_minutes: u32) -> Event {
        Event::new(1, Uuid::new_v4(), "standup", start, duration_minutes, None)
    }

    #[test]
    fn one_off_inside_window() {
        let event = one_off(utc(2022, 1, 5, 9, 0), 30);
        assert_eq!(
            event.generate_for_timeperiod(utc(2022, 1, 1, 0, 0), utc(2022, 1, 10, 0, 0)),
            vec![utc(2022, 1, 5, 9, 0)]
        );
    }

    #[test]
    fn one_off_after_window_yields_nothing() {
        let event = one_off(utc(2022, 1, 20, 9, 0), 30);
        assert!(event
            .generate_for_timeperiod(utc(2022, 1, 1, 0, 0), utc(2022, 1, 10, 0, 0))
            .is_empty());
    }

    #[test]
    fn one_off_start_on_before_edge_is_included() {
        let event = one_off(utc(2022, 1, 10, 0, 0), 30);
        assert_eq!(
            event.generate_for_timeperiod(utc(2022, 1, 1, 0, 0), utc(2022, 1, 10, 0, 0)),
            vec![utc(2022, 1, 10, 0, 0)]
        );
    }

    #[test]
    fn one_off_tail_overlapping_window_reports_real_start() {
        // Starts before the window but runs into it; the unclipped start
        // comes back so the caller can compute the overlap.
        let event = one_off(utc(2022, 1, 1, 23, 30), 60);
        assert_eq!(
            event.generate_for_timeperiod(utc(2022, 1, 2, 0, 0), utc(2022, 1, 10, 0, 0)),
            vec![utc(2022, 1, 1, 23, 30)]
        );
    }

    #[test]
    fn one_off_fully_before_window_yields_nothing() {
        let event = one_off(utc(2022, 1, 1, 10, 0), 60);
        assert!(event
            .generate_for_timeperiod(utc(2022, 1, 2, 0, 0), utc(2022, 1, 10, 0, 0))
            .is_empty());
    }

    #[test]
    fn recurring_event_with_start_past_before_yields_nothing() {
        let recurrence = Recurrence {
            description: RecurrenceKind::Weekly {
                interval: 1,
                count: None,
                until: None,
                weekdays: [Weekday::Mon].into_iter().collect(),
            },
        };
        let event = Event::new(
            2,
            Uuid::new_v4(),
            "retro",
            utc(2022, 2, 7, 9, 0),
            30,
            Some(recurrence),
        );
        assert!(event
            .generate_for_timeperiod(utc(2022, 1, 1, 0, 0), utc(2022, 1, 31, 0, 0))
            .is_empty());
    }

    #[test]
    fn try_new_rejects_invalid_events() {
        let start = utc(2022, 1, 1, 0, 0);
        assert_eq!(
            Event::try_new(1, Uuid::new_v4(), "", start, 30, None),
            Err(EventError::EmptyName)
        );
        assert_eq!(
            Event::try_new(1, Uuid::new_v4(), "x", start, 0, None),
            Err(EventError::InvalidDuration(0))
        );
    }

    #[test]
    fn event_json_includes_flattened_occurrences() {
        let event = one_off(utc(2022, 1, 5, 9, 0), 30);
        let annotated = EventWithOccurrences {
            occurrences: vec![event.start],
            event,
        };
        let value = serde_json::to_value(&annotated).unwrap();
        assert!(value.get("name").is_some());
        assert!(value.get("occurrences").is_some());
        assert!(value.get("event").is_none());
    }
}
