//! Provider-neutral calendar event types.
//!
//! Providers convert their API responses into these types, and the
//! planner works exclusively with them. Field names follow the common
//! provider wire shape so events round-trip through the JSON protocol
//! unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event (provider-neutral).
///
/// Most fields are optional: a target event only needs an id and a time
/// range to participate in planning. Whether an event is "managed" by
/// holdsync is decided solely by its description (see [`crate::tag`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub status: Option<EventStatus>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub transparency: Option<Transparency>,

    /// Last modification timestamp reported by the provider.
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    /// Provider change marker, opaque to holdsync.
    #[serde(default)]
    pub etag: Option<String>,

    /// Exactly one representation per endpoint: an instant or an
    /// all-day date.
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,

    #[serde(default)]
    pub reminders: Option<Reminders>,
}

/// An event endpoint: a precise instant or an all-day date.
///
/// Serializes as `{"dateTime": ...}` or `{"date": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

/// Who can see the event details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Default,
    Public,
    Private,
}

/// Whether the event blocks time (opaque) or shows as free (transparent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transparency {
    Opaque,
    Transparent,
}

/// Reminder settings carried by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    #[serde(default)]
    pub overrides: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub method: String,
    pub minutes: i64,
}

impl Reminders {
    /// Holds are placeholders; they should never ring.
    pub fn silent() -> Self {
        Reminders {
            use_default: false,
            overrides: Vec::new(),
        }
    }
}
