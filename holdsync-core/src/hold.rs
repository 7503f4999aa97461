//! Desired hold construction.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HoldSyncResult;
use crate::event::{CalendarEvent, Reminders, Transparency, Visibility};
use crate::overlap;
use crate::tag::{self, SourceRef};

/// A hold that should exist on the target calendar.
///
/// Recomputed fresh every cycle from current source data; never
/// persisted. The event is fully formed and ready to send to the
/// backend (its id is left empty, the provider assigns one on create).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredHold {
    pub source: SourceRef,
    pub event: CalendarEvent,
}

impl DesiredHold {
    /// Build the hold mirroring one source event.
    ///
    /// The hold copies the source time range verbatim (all-day stays
    /// all-day), hides the source details behind `summary`, and carries
    /// the encoded [`SourceRef`] in its description. Fails if the source
    /// range is incomplete.
    pub fn from_source_event(
        src_account: &str,
        src_calendar: &str,
        source_event: &CalendarEvent,
        summary: &str,
    ) -> HoldSyncResult<DesiredHold> {
        let interval = overlap::event_interval(source_event)?;

        let source = SourceRef {
            src_account: src_account.to_string(),
            src_calendar: src_calendar.to_string(),
            event_id: source_event.id.clone(),
            start: rfc3339_utc(interval.start_ms),
            end: rfc3339_utc(interval.end_ms),
            title: source_event.summary.clone().unwrap_or_default(),
        };

        let event = CalendarEvent {
            id: String::new(),
            status: None,
            summary: Some(summary.to_string()),
            description: Some(tag::encode(&source)),
            visibility: Some(Visibility::Private),
            transparency: Some(Transparency::Opaque),
            updated: None,
            etag: None,
            start: source_event.start.clone(),
            end: source_event.end.clone(),
            reminders: Some(Reminders::silent()),
        };

        Ok(DesiredHold { source, event })
    }

    /// The stable matching key of this hold.
    pub fn key(&self) -> String {
        self.source.key()
    }
}

fn rfc3339_utc(ms: i64) -> String {
    // The interval came from a valid chrono instant, so ms is in range.
    DateTime::<Utc>::from_timestamp_millis(ms)
        .expect("interval milliseconds come from a valid instant")
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}
