//! Recurrence patterns and occurrence expansion.
//!
//! A [`Recurrence`] describes how an event repeats (daily/weekly/monthly/yearly
//! with interval, count and until bounds) and expands into concrete occurrence
//! start instants inside a query window. Expansion is a pure function of the
//! pattern, the anchor start and the window: calling it twice with identical
//! arguments yields identical sequences.
//!
//! Calendar arithmetic runs on the anchor's wall clock and every generated
//! instant keeps the anchor's UTC offset; conversion to other zones is the
//! caller's responsibility. Dates that do not exist in a target month or year
//! (the 31st in a 30-day month, Feb 29 off leap years) are skipped, never
//! clamped to the nearest valid day.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::RecurrenceError;

/// Day of week. Ordering is Monday-first and locale-independent; weekly
/// expansion emits occurrences in this order within each week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    /// Offset from Monday in days (0..=6).
    pub fn days_from_monday(self) -> u32 {
        self as u32
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

/// How a monthly pattern picks its day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyMode {
    /// Same day-of-month as the anchor. Months too short for that day are
    /// skipped (an event on the 31st never fires in February).
    ByDay,
    /// Same Nth-weekday-of-month as the anchor (e.g. "first Saturday").
    ByWeekday,
}

/// One recurrence pattern kind. Tagged on `type` with lowercase names; this is
/// the wire/storage shape inside [`Recurrence::description`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily {
        interval: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<DateTime<FixedOffset>>,
    },
    Weekly {
        interval: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<DateTime<FixedOffset>>,
        weekdays: BTreeSet<Weekday>,
    },
    Monthly {
        interval: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<DateTime<FixedOffset>>,
        mode: MonthlyMode,
    },
    Yearly {
        interval: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        until: Option<DateTime<FixedOffset>>,
    },
}

impl RecurrenceKind {
    /// Check the pattern invariants: `interval >= 1`, `count >= 2` when given,
    /// weekly patterns carry at least one weekday.
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        let (interval, count) = match self {
            Self::Daily { interval, count, .. }
            | Self::Monthly { interval, count, .. }
            | Self::Yearly { interval, count, .. } => (*interval, *count),
            Self::Weekly {
                interval,
                count,
                weekdays,
                ..
            } => {
                if weekdays.is_empty() {
                    return Err(RecurrenceError::EmptyWeekdays);
                }
                (*interval, *count)
            }
        };

        if interval < 1 {
            return Err(RecurrenceError::InvalidInterval(interval));
        }
        if let Some(count) = count {
            if count < 2 {
                return Err(RecurrenceError::InvalidCount(count));
            }
        }
        Ok(())
    }

    /// Raw occurrences of the pattern anchored at `anchor`, bounded by
    /// count/until and filtered to `[lower, upper]` (both edges inclusive).
    fn occurrences_between(
        &self,
        lower: DateTime<FixedOffset>,
        upper: DateTime<FixedOffset>,
        anchor: DateTime<FixedOffset>,
    ) -> Vec<DateTime<FixedOffset>> {
        let offset = *anchor.offset();
        let anchor_local = anchor.naive_local();

        match self {
            Self::Daily {
                interval,
                count,
                until,
            } => {
                let mut collector = Collector::new(lower, upper, *until, *count);
                let step = Duration::days(i64::from(*interval));
                let mut term = anchor_local;
                while collector.push(rebase(term, offset)).is_continue() {
                    term += step;
                }
                collector.out
            }
            Self::Weekly {
                interval,
                count,
                until,
                weekdays,
            } => {
                let mut collector = Collector::new(lower, upper, *until, *count);
                let time = anchor_local.time();
                // Weeks are anchored to the Monday of the week containing the
                // anchor; every `interval`-th week emits one occurrence per
                // configured weekday at the anchor's time-of-day.
                let mut base = anchor_local.date()
                    - Duration::days(i64::from(anchor_local.weekday().num_days_from_monday()));
                let stride = Duration::days(7 * i64::from(*interval));
                'blocks: loop {
                    for weekday in weekdays {
                        let date = base + Duration::days(i64::from(weekday.days_from_monday()));
                        let candidate = date.and_time(time);
                        if candidate < anchor_local {
                            // Candidates before the anchor are never emitted
                            // and do not consume `count`.
                            continue;
                        }
                        if collector.push(rebase(candidate, offset)).is_break() {
                            break 'blocks;
                        }
                    }
                    base += stride;
                }
                collector.out
            }
            Self::Monthly {
                interval,
                count,
                until,
                mode,
            } => {
                let mut collector = Collector::new(lower, upper, *until, *count);
                match mode {
                    MonthlyMode::ByDay => {
                        monthly_by_day(&mut collector, anchor_local, offset, *interval);
                    }
                    MonthlyMode::ByWeekday => {
                        monthly_by_weekday(&mut collector, anchor_local, offset, *interval);
                    }
                }
                collector.out
            }
            Self::Yearly {
                interval,
                count,
                until,
            } => {
                let mut collector = Collector::new(lower, upper, *until, *count);
                let time = anchor_local.time();
                let mut year = anchor_local.year();
                loop {
                    let horizon = first_of_month(year, anchor_local.month(), offset);
                    if collector.horizon_passed(horizon) {
                        break;
                    }
                    // Feb 29 anchors skip non-leap years entirely.
                    if let Some(date) =
                        NaiveDate::from_ymd_opt(year, anchor_local.month(), anchor_local.day())
                    {
                        if collector.push(rebase(date.and_time(time), offset)).is_break() {
                            break;
                        }
                    }
                    year += *interval as i32;
                }
                collector.out
            }
        }
    }
}

/// Persisted recurrence representation: a tagged object
/// `{"description": {"type": "daily" | "weekly" | "monthly" | "yearly", ...}}`.
/// This exact shape is the wire/storage contract and round-trips losslessly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurrence {
    pub description: RecurrenceKind,
}

impl Recurrence {
    pub fn validate(&self) -> Result<(), RecurrenceError> {
        self.description.validate()
    }

    /// Occurrence starts relevant to `[after, before]` for a pattern anchored
    /// at `anchor_start`.
    ///
    /// The lower bound backs up by `duration_minutes`: an occurrence that
    /// starts before the window but overlaps into it must still be reported,
    /// and its real start is returned rather than a clipped one so the caller
    /// can compute the overlap. Both window edges are inclusive.
    pub fn generate_for_timeperiod(
        &self,
        after: DateTime<FixedOffset>,
        before: DateTime<FixedOffset>,
        anchor_start: DateTime<FixedOffset>,
        duration_minutes: u32,
    ) -> Vec<DateTime<FixedOffset>> {
        let lower = after - Duration::minutes(i64::from(duration_minutes));
        self.description.occurrences_between(lower, before, anchor_start)
    }
}

/// Shared count/until bounding and window filtering for all pattern kinds.
///
/// `count` is consumed by every raw occurrence from the anchor onward,
/// including those the window filter later drops; skipped calendar dates
/// never consume it.
struct Collector {
    lower: DateTime<FixedOffset>,
    upper: DateTime<FixedOffset>,
    until: Option<DateTime<FixedOffset>>,
    count: Option<u32>,
    emitted: u32,
    out: Vec<DateTime<FixedOffset>>,
}

impl Collector {
    fn new(
        lower: DateTime<FixedOffset>,
        upper: DateTime<FixedOffset>,
        until: Option<DateTime<FixedOffset>>,
        count: Option<u32>,
    ) -> Self {
        Self {
            lower,
            upper,
            until,
            count,
            emitted: 0,
            out: Vec::new(),
        }
    }

    /// Record one raw occurrence. Breaks once the term passes `until`
    /// (inclusive bound), passes the window upper edge, or exhausts `count`.
    fn push(&mut self, term: DateTime<FixedOffset>) -> ControlFlow<()> {
        if term > self.upper || self.until.is_some_and(|until| term > until) {
            return ControlFlow::Break(());
        }
        if term >= self.lower {
            self.out.push(term);
        }
        self.emitted += 1;
        if self.count.is_some_and(|count| self.emitted >= count) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// True once `instant` lies beyond every bound that could still admit an
    /// occurrence. Lets cycles that only hit skipped dates terminate instead
    /// of spinning past the window.
    fn horizon_passed(&self, instant: DateTime<FixedOffset>) -> bool {
        instant > self.upper || self.until.is_some_and(|until| instant > until)
    }
}

fn monthly_by_day(
    collector: &mut Collector,
    anchor_local: NaiveDateTime,
    offset: FixedOffset,
    interval: u32,
) {
    let time = anchor_local.time();
    for (year, month) in MonthCursor::new(anchor_local.date(), interval) {
        if collector.horizon_passed(first_of_month(year, month, offset)) {
            break;
        }
        let Some(date) = NaiveDate::from_ymd_opt(year, month, anchor_local.day()) else {
            continue; // month too short, skip the whole cycle
        };
        if collector.push(rebase(date.and_time(time), offset)).is_break() {
            break;
        }
    }
}

fn monthly_by_weekday(
    collector: &mut Collector,
    anchor_local: NaiveDateTime,
    offset: FixedOffset,
    interval: u32,
) {
    let time = anchor_local.time();
    let target = anchor_local.weekday().num_days_from_monday();
    // Zero-based ordinal of the anchor's weekday within its month: day 1..=7
    // is the first, 8..=14 the second, and so on.
    let ordinal = (anchor_local.day() - 1) / 7;

    for (year, month) in MonthCursor::new(anchor_local.date(), interval) {
        if collector.horizon_passed(first_of_month(year, month, offset)) {
            break;
        }
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            break; // unreachable for valid cursor output
        };
        let lead = (target + 7 - first.weekday().num_days_from_monday()) % 7;
        let day = 1 + lead + ordinal * 7;
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue; // no fifth such weekday this month
        };
        if collector.push(rebase(date.and_time(time), offset)).is_break() {
            break;
        }
    }
}

/// Infinite walk over (year, month) pairs starting at `start`'s month,
/// advancing `interval` months per step.
struct MonthCursor {
    // absolute month index: year * 12 + month0
    index: i32,
    step: i32,
}

impl MonthCursor {
    fn new(start: NaiveDate, interval: u32) -> Self {
        Self {
            index: start.year() * 12 + start.month0() as i32,
            step: interval as i32,
        }
    }
}

impl Iterator for MonthCursor {
    type Item = (i32, u32);

    fn next(&mut self) -> Option<(i32, u32)> {
        let year = self.index.div_euclid(12);
        let month = self.index.rem_euclid(12) as u32 + 1;
        self.index += self.step;
        Some((year, month))
    }
}

fn first_of_month(year: i32, month: u32, offset: FixedOffset) -> DateTime<FixedOffset> {
    // month is always 1..=12 here
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or(NaiveDate::MAX)
        .and_hms_opt(0, 0, 0)
        .unwrap_or(NaiveDateTime::MAX);
    rebase(date, offset)
}

/// Rebuild a fixed-offset instant from a wall-clock value, keeping the
/// anchor's offset on every generated occurrence.
fn rebase(local: NaiveDateTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}
