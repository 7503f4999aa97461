//! Time-range normalization and overlap detection.

use chrono::NaiveDate;

use crate::error::{HoldSyncError, HoldSyncResult};
use crate::event::{CalendarEvent, EventTime};

/// Half-open interval in epoch milliseconds: `[start_ms, end_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeInterval {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeInterval {
    /// True iff the two intervals intersect.
    ///
    /// Touching boundaries (`a.end == b.start`) do not count as overlap,
    /// so back-to-back holds are allowed.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }
}

/// Normalize an event's range to a millisecond interval.
///
/// Timed events use their instants; all-day events stand in midnight UTC
/// of their dates. A missing or mixed start/end pair cannot be reasoned
/// about and fails, naming the offending event.
pub fn event_interval(event: &CalendarEvent) -> HoldSyncResult<TimeInterval> {
    match (&event.start, &event.end) {
        (Some(EventTime::DateTime(start)), Some(EventTime::DateTime(end))) => Ok(TimeInterval {
            start_ms: start.timestamp_millis(),
            end_ms: end.timestamp_millis(),
        }),
        (Some(EventTime::Date(start)), Some(EventTime::Date(end))) => Ok(TimeInterval {
            start_ms: midnight_utc_ms(*start),
            end_ms: midnight_utc_ms(*end),
        }),
        _ => Err(HoldSyncError::InvalidTimeRange(event.id.clone())),
    }
}

fn midnight_utc_ms(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis()
}
