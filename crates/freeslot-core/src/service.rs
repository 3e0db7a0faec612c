//! Event service: orchestrates the free-spot search and window-restricted
//! event listing over an abstract event source.
//!
//! The [`EventSource`] trait is the seam where a real store attaches; the
//! core only sees already-filtered candidate events. [`InMemoryEventSource`]
//! is the Vec-backed implementation used by tests and the CLI.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EventError, SourceError};
use crate::event::{Event, EventWithOccurrences};
use crate::finder::FreeSpotFinder;
use crate::limits::Limits;

/// Supplier of candidate events; the boundary to whatever store holds them.
pub trait EventSource {
    /// Events where any of `user_ids` is the owner or an invitee with
    /// accepted status, and `event.start <= before`. Implementations must
    /// deduplicate by event id.
    fn events_for_users(
        &self,
        user_ids: &BTreeSet<Uuid>,
        before: DateTime<FixedOffset>,
    ) -> Result<Vec<Event>, SourceError>;

    /// Whether `user_id` references an existing account.
    fn user_exists(&self, user_id: Uuid) -> Result<bool, SourceError>;
}

/// An invitation linking a user to an event. `is_accepted: Some(true)` means
/// the invitee's schedule is bound by the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invite {
    pub event_id: i64,
    pub user_id: Uuid,
    #[serde(default)]
    pub is_accepted: Option<bool>,
}

/// In-memory event source for tests and the CLI event-file harness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryEventSource {
    #[serde(default)]
    pub users: BTreeSet<Uuid>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub invites: Vec<Invite>,
}

impl InMemoryEventSource {
    /// Decode a source from its JSON representation. Every decoded event is
    /// checked against its structural invariants; derive-based decoding alone
    /// accepts patterns (zero interval, empty weekday set) that occurrence
    /// expansion requires to be absent.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let source: Self = serde_json::from_str(json)?;
        for event in &source.events {
            event.validate().map_err(|e| SourceError::InvalidEvent {
                id: event.id,
                source: e,
            })?;
        }
        Ok(source)
    }

    /// Reject events whose duration exceeds the configured ceiling.
    pub fn enforce_limits(&self, limits: &Limits) -> Result<(), SourceError> {
        for event in &self.events {
            if event.duration_minutes > limits.max_event_duration_minutes {
                return Err(SourceError::InvalidEvent {
                    id: event.id,
                    source: EventError::DurationTooLong {
                        got: event.duration_minutes,
                        max: limits.max_event_duration_minutes,
                    },
                });
            }
        }
        Ok(())
    }

    fn invited(&self, event_id: i64, user_ids: &BTreeSet<Uuid>) -> bool {
        self.invites.iter().any(|invite| {
            invite.event_id == event_id
                && invite.is_accepted == Some(true)
                && user_ids.contains(&invite.user_id)
        })
    }
}

impl EventSource for InMemoryEventSource {
    fn events_for_users(
        &self,
        user_ids: &BTreeSet<Uuid>,
        before: DateTime<FixedOffset>,
    ) -> Result<Vec<Event>, SourceError> {
        // Each event appears once in `events`, so ownership and invitation
        // cannot double-report it.
        Ok(self
            .events
            .iter()
            .filter(|event| event.start <= before)
            .filter(|event| {
                user_ids.contains(&event.owner_id) || self.invited(event.id, user_ids)
            })
            .cloned()
            .collect())
    }

    fn user_exists(&self, user_id: Uuid) -> Result<bool, SourceError> {
        Ok(self.users.contains(&user_id))
    }
}

/// A keyset-paginated page of listed events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListPage {
    pub events_with_occurrences: Vec<EventWithOccurrences>,
    /// Id of the last returned event if more remain, else `None`.
    pub offset: Option<i64>,
}

/// Stateless orchestration over an [`EventSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EventService;

impl EventService {
    /// Earliest free slot of `duration_minutes` inside `[after, before]`
    /// across the schedules of all `user_ids`.
    ///
    /// # Panics
    /// Panics if `before <= after`; callers validate the window first.
    pub fn find_event_spot<S: EventSource>(
        &self,
        source: &S,
        user_ids: &BTreeSet<Uuid>,
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
        duration_minutes: u32,
    ) -> Result<Option<DateTime<FixedOffset>>, SourceError> {
        assert!(
            before > after,
            "find_event_spot: `before` must be greater than `after`"
        );

        let events = source.events_for_users(user_ids, before)?;
        debug!(
            users = user_ids.len(),
            candidates = events.len(),
            "searching for event spot"
        );
        Ok(FreeSpotFinder::new(after, before, duration_minutes).find(&events))
    }

    /// Events visible to `user_id` with at least one occurrence inside
    /// `[after, before]`, sorted by event id ascending.
    ///
    /// Ordering by id rather than by start time is deliberate: it keeps
    /// keyset pagination simple and stable. `event_id_gt` is the exclusive
    /// lower bound on event id carried between pages.
    pub fn list_events_for_user<S: EventSource>(
        &self,
        source: &S,
        user_id: Uuid,
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
        event_id_gt: i64,
    ) -> Result<Vec<EventWithOccurrences>, SourceError> {
        let user_ids: BTreeSet<Uuid> = [user_id].into_iter().collect();
        let mut events = source.events_for_users(&user_ids, before)?;
        events.retain(|event| event.id > event_id_gt);
        events.sort_by_key(|event| event.id);

        let mut annotated = Vec::new();
        for event in events {
            let occurrences = event.generate_for_timeperiod(after, before);
            if !occurrences.is_empty() {
                annotated.push(EventWithOccurrences { event, occurrences });
            }
        }
        debug!(user = %user_id, listed = annotated.len(), "listed events for user");
        Ok(annotated)
    }

    /// Cut one page out of a sorted listing. `offset` in the result is the id
    /// of the last returned event iff more events remained past the page.
    pub fn paginate(
        &self,
        mut events: Vec<EventWithOccurrences>,
        limit: usize,
    ) -> EventListPage {
        let more_remain = events.len() > limit;
        events.truncate(limit);
        let offset = if more_remain {
            events.last().map(|annotated| annotated.event.id)
        } else {
            None
        };
        EventListPage {
            events_with_occurrences: events,
            offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecurrenceError;
    use chrono::NaiveDate;

    fn utc(d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        NaiveDate::from_ymd_opt(2022, 1, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    fn event(id: i64, owner_id: Uuid, start: DateTime<FixedOffset>) -> Event {
        Event::new(id, owner_id, format!("event_{id}"), start, 10, None)
    }

    #[test]
    fn source_filters_by_owner_invite_and_start() {
        let owner = Uuid::new_v4();
        let invitee = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let source = InMemoryEventSource {
            users: [owner, invitee, stranger].into_iter().collect(),
            events: vec![
                event(1, owner, utc(1, 0, 0)),
                event(2, stranger, utc(1, 0, 0)),
                event(3, stranger, utc(1, 0, 0)),
                event(4, owner, utc(20, 0, 0)), // starts past `before`
            ],
            invites: vec![
                Invite {
                    event_id: 2,
                    user_id: invitee,
                    is_accepted: Some(true),
                },
                Invite {
                    event_id: 3,
                    user_id: invitee,
                    is_accepted: None, // pending, not binding
                },
            ],
        };

        let ids: BTreeSet<Uuid> = [owner, invitee].into_iter().collect();
        let found = source.events_for_users(&ids, utc(10, 0, 0)).unwrap();
        let mut found_ids: Vec<i64> = found.iter().map(|e| e.id).collect();
        found_ids.sort_unstable();
        assert_eq!(found_ids, vec![1, 2]);
    }

    #[test]
    fn owner_who_is_also_invited_sees_event_once() {
        let owner = Uuid::new_v4();
        let source = InMemoryEventSource {
            users: [owner].into_iter().collect(),
            events: vec![event(1, owner, utc(1, 0, 0))],
            invites: vec![Invite {
                event_id: 1,
                user_id: owner,
                is_accepted: Some(true),
            }],
        };

        let ids: BTreeSet<Uuid> = [owner].into_iter().collect();
        assert_eq!(source.events_for_users(&ids, utc(10, 0, 0)).unwrap().len(), 1);
    }

    #[test]
    fn from_json_rejects_empty_weekday_set() {
        let owner = Uuid::new_v4();
        let json = format!(
            r#"{{"users":["{owner}"],"events":[{{"id":7,"owner_id":"{owner}","name":"sync","start":"2022-01-03T09:00:00+00:00","duration_minutes":30,"recurrence":{{"description":{{"type":"weekly","interval":1,"weekdays":[]}}}}}}]}}"#
        );
        let error = InMemoryEventSource::from_json(&json).unwrap_err();
        assert!(matches!(
            error,
            SourceError::InvalidEvent {
                id: 7,
                source: EventError::Recurrence(RecurrenceError::EmptyWeekdays),
            }
        ));
    }

    #[test]
    fn from_json_rejects_zero_interval() {
        let owner = Uuid::new_v4();
        let json = format!(
            r#"{{"users":["{owner}"],"events":[{{"id":3,"owner_id":"{owner}","name":"sync","start":"2022-01-03T09:00:00+00:00","duration_minutes":30,"recurrence":{{"description":{{"type":"daily","interval":0}}}}}}]}}"#
        );
        let error = InMemoryEventSource::from_json(&json).unwrap_err();
        assert!(matches!(
            error,
            SourceError::InvalidEvent {
                id: 3,
                source: EventError::Recurrence(RecurrenceError::InvalidInterval(0)),
            }
        ));
    }

    #[test]
    fn from_json_accepts_well_formed_source() {
        let owner = Uuid::new_v4();
        let json = format!(
            r#"{{"users":["{owner}"],"events":[{{"id":1,"owner_id":"{owner}","name":"sync","start":"2022-01-03T09:00:00+00:00","duration_minutes":30,"recurrence":{{"description":{{"type":"daily","interval":1}}}}}}]}}"#
        );
        let source = InMemoryEventSource::from_json(&json).unwrap();
        assert_eq!(source.events.len(), 1);
    }

    #[test]
    fn enforce_limits_rejects_oversized_event_duration() {
        let owner = Uuid::new_v4();
        let source = InMemoryEventSource {
            users: [owner].into_iter().collect(),
            events: vec![Event::new(5, owner, "offsite", utc(1, 0, 0), 2000, None)],
            invites: Vec::new(),
        };

        let limits = Limits::default(); // ceiling is 1440 minutes
        let error = source.enforce_limits(&limits).unwrap_err();
        assert!(matches!(
            error,
            SourceError::InvalidEvent {
                id: 5,
                source: EventError::DurationTooLong { got: 2000, max: 1440 },
            }
        ));
        assert!(InMemoryEventSource::default().enforce_limits(&limits).is_ok());
    }

    #[test]
    fn paginate_reports_offset_only_when_more_remain() {
        let owner = Uuid::new_v4();
        let service = EventService;
        let annotated: Vec<EventWithOccurrences> = (1..=3)
            .map(|id| EventWithOccurrences {
                event: event(id, owner, utc(1, 0, 0)),
                occurrences: vec![utc(1, 0, 0)],
            })
            .collect();

        let page = service.paginate(annotated.clone(), 2);
        assert_eq!(page.events_with_occurrences.len(), 2);
        assert_eq!(page.offset, Some(2));

        let page = service.paginate(annotated, 3);
        assert_eq!(page.events_with_occurrences.len(), 3);
        assert_eq!(page.offset, None);
    }
}
