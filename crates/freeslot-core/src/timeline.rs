//! Minute-resolution occupancy timeline over a query window.
//!
//! All inputs are constrained to whole minutes, so one minute is the natural
//! granularity: slot `i` stands for the minute starting at `after + i`.

use chrono::{DateTime, Duration, FixedOffset};

use crate::error::TimelineError;

/// Occupancy bitset for the window `[after, before]`.
///
/// Sized so that it covers exactly the positions where a free run of the
/// required length could still start and end at or before `before`: the span
/// `before - after` minus `required - 1` slack minutes. Marking is advisory,
/// not precision accounting -- spans are clipped at the window start and
/// clamped at the array end, never errors.
#[derive(Debug, Clone)]
pub struct OccupancyTimeline {
    after: DateTime<FixedOffset>,
    slots: Vec<bool>,
}

impl OccupancyTimeline {
    /// Create a timeline for `[after, before]` and a required run length.
    ///
    /// # Panics
    /// Panics if the computed size is negative (`before` precedes `after` by
    /// more than the slack); callers are contracted to validate the window
    /// first. Use [`try_new`](Self::try_new) for a non-panicking version.
    pub fn new(
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
        required_duration_minutes: u32,
    ) -> Self {
        Self::try_new(after, before, required_duration_minutes)
            .expect("OccupancyTimeline::new: invalid window")
    }

    /// Create a timeline, returning a Result.
    ///
    /// # Errors
    /// Returns `InvalidRange` if the computed size is negative.
    pub fn try_new(
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
        required_duration_minutes: u32,
    ) -> Result<Self, TimelineError> {
        let slack = Duration::minutes(i64::from(required_duration_minutes) - 1);
        let span = minutes_between(before - slack, after);
        let size =
            usize::try_from(span).map_err(|_| TimelineError::InvalidRange { after, before })?;
        Ok(Self {
            after,
            slots: vec![false; size],
        })
    }

    /// Number of minute slots covered.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Mark `[start, start + duration_minutes)` as occupied.
    ///
    /// A span starting before the window is clipped so only the portion
    /// inside it is marked; a span fully before the window marks nothing.
    /// Marking past the array end is clamped to the array bound.
    pub fn mark_occupied(&mut self, start: DateTime<FixedOffset>, duration_minutes: u32) {
        let mut bias = minutes_between(start, self.after);
        let mut duration = i64::from(duration_minutes);
        if bias < 0 {
            duration += bias;
            bias = 0;
        }
        if duration <= 0 {
            return;
        }

        let from = bias as usize;
        if from >= self.slots.len() {
            return;
        }
        let to = usize::try_from(bias + duration)
            .unwrap_or(usize::MAX)
            .min(self.slots.len());
        for slot in &mut self.slots[from..to] {
            *slot = true;
        }
    }

    /// First instant where `required_duration_minutes` consecutive free
    /// minutes begin, scanning left to right.
    ///
    /// `None` means no run ever reaches the required length -- a valid
    /// negative result, not an error.
    pub fn find_first_free_run(
        &self,
        required_duration_minutes: u32,
    ) -> Option<DateTime<FixedOffset>> {
        let required = required_duration_minutes as usize;
        if required == 0 {
            return Some(self.after);
        }

        let mut run = 0usize;
        let mut run_start = 0usize;
        for (index, occupied) in self.slots.iter().enumerate() {
            if *occupied {
                run = 0;
                continue;
            }
            if run == 0 {
                run_start = index;
            }
            run += 1;
            if run == required {
                return Some(self.after + Duration::minutes(run_start as i64));
            }
        }
        None
    }
}

fn minutes_between(a: DateTime<FixedOffset>, b: DateTime<FixedOffset>) -> i64 {
    (a - b).num_minutes()
}
