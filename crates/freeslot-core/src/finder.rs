//! Free-spot search over a set of candidate events.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::event::Event;
use crate::timeline::OccupancyTimeline;

/// Finder of free spots in the combined schedule of multiple events.
///
/// Works by expanding every candidate event's occurrences inside the window,
/// marking their spans into one occupancy timeline, then scanning for the
/// first sufficiently long free run. Each call allocates its own timeline,
/// so concurrent callers need no coordination.
#[derive(Debug, Clone, Copy)]
pub struct FreeSpotFinder {
    after: DateTime<FixedOffset>,
    before: DateTime<FixedOffset>,
    duration_minutes: u32,
}

impl FreeSpotFinder {
    /// Create a finder for the window `[after, before]` and a required slot
    /// length.
    ///
    /// # Panics
    /// Panics if `before <= after`. Callers are contracted to validate the
    /// window before invoking the core; violating this is a programming
    /// error, not recoverable input.
    pub fn new(
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
        duration_minutes: u32,
    ) -> Self {
        assert!(
            before > after,
            "FreeSpotFinder: `before` must be greater than `after`"
        );
        Self {
            after,
            before,
            duration_minutes,
        }
    }

    /// Earliest start of a free slot of the required length, or `None` if the
    /// window holds no such slot.
    ///
    /// Candidate events are expected to be pre-filtered to those relevant to
    /// the queried participants with `start <= before`; that filtering is the
    /// event source's responsibility.
    pub fn find(&self, events: &[Event]) -> Option<DateTime<FixedOffset>> {
        let mut timeline = OccupancyTimeline::new(self.after, self.before, self.duration_minutes);

        for event in events {
            for occurrence in event.generate_for_timeperiod(self.after, self.before) {
                timeline.mark_occupied(occurrence, event.duration_minutes);
            }
        }

        let spot = timeline.find_first_free_run(self.duration_minutes);
        debug!(
            candidates = events.len(),
            window_minutes = (self.before - self.after).num_minutes(),
            found = spot.is_some(),
            "free-spot search finished"
        );
        spot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn utc(d: u32, h: u32, mi: u32) -> DateTime<FixedOffset> {
        NaiveDate::from_ymd_opt(2022, 1, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    fn event(id: i64, start: DateTime<FixedOffset>, duration_minutes: u32) -> Event {
        Event::new(id, Uuid::new_v4(), "busy", start, duration_minutes, None)
    }

    #[test]
    fn empty_schedule_returns_window_start() {
        let finder = FreeSpotFinder::new(utc(2, 0, 0), utc(20, 0, 0), 10);
        assert_eq!(finder.find(&[]), Some(utc(2, 0, 0)));
    }

    #[test]
    fn gap_between_events_is_found() {
        let finder = FreeSpotFinder::new(utc(1, 0, 0), utc(2, 0, 0), 5);
        let events = [
            event(1, utc(1, 0, 0), 10),
            event(2, utc(1, 0, 9), 10),
            event(3, utc(1, 0, 19), 2),
        ];
        assert_eq!(finder.find(&events), Some(utc(1, 0, 21)));
    }

    #[test]
    fn event_spilling_into_window_blocks_its_overlap() {
        let finder = FreeSpotFinder::new(utc(1, 1, 0), utc(2, 0, 0), 1);
        let events = [event(1, utc(1, 0, 0), 120)];
        assert_eq!(finder.find(&events), Some(utc(1, 2, 0)));
    }

    #[test]
    #[should_panic(expected = "`before` must be greater than `after`")]
    fn inverted_window_panics() {
        let _ = FreeSpotFinder::new(utc(2, 0, 0), utc(1, 0, 0), 5);
    }
}
