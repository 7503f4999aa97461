//! Provenance tag codec.
//!
//! Every hold written by holdsync carries an encoded [`SourceRef`] in its
//! description field. The tag is the only durable state in the system:
//! identity survives across runs because it lives inside the target
//! calendar itself, not in any local store.
//!
//! Wire format: `SYNCV1:` followed by unpadded base64url of a JSON object
//! with string fields `srcAccount`, `srcCalendar`, `eventId`, `start`,
//! `end`, `title`. The format is byte-for-byte stable so holds written by
//! one implementation are recognized by another.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

/// Literal marking the start of an encoded tag inside a description.
pub const TAG_PREFIX: &str = "SYNCV1:";

/// Joins key segments; not expected to occur inside any field.
const KEY_DELIMITER: &str = "::";

/// Provenance of a hold: which source event occurrence it mirrors.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub src_account: String,
    pub src_calendar: String,
    pub event_id: String,
    /// Normalized start instant (RFC 3339, UTC).
    pub start: String,
    /// Normalized end instant (RFC 3339, UTC).
    pub end: String,
    pub title: String,
}

impl SourceRef {
    /// Stable matching key for this source occurrence.
    ///
    /// The title is deliberately excluded: a pure title edit on the
    /// source is an update to the same hold, not a new identity.
    pub fn key(&self) -> String {
        [
            self.src_account.as_str(),
            self.src_calendar.as_str(),
            self.event_id.as_str(),
            self.start.as_str(),
            self.end.as_str(),
        ]
        .join(KEY_DELIMITER)
    }
}

/// Encode a source reference as a description tag.
pub fn encode(source: &SourceRef) -> String {
    // A struct of plain strings always serializes.
    let json = serde_json::to_string(source).expect("SourceRef serializes to JSON");
    format!("{TAG_PREFIX}{}", URL_SAFE_NO_PAD.encode(json))
}

/// Recover a source reference from free-form description text.
///
/// The prefix may appear at any offset (callers are allowed to prepend
/// their own text). Anything that does not decode cleanly — missing
/// prefix, malformed base64 or JSON, missing or non-string fields —
/// yields `None`: foreign description content means "not managed by this
/// tool", never an error.
pub fn decode(description: &str) -> Option<SourceRef> {
    let at = description.find(TAG_PREFIX)?;
    let rest = &description[at + TAG_PREFIX.len()..];
    let end = rest
        .find(|c: char| !is_base64url_char(c))
        .unwrap_or(rest.len());
    // Tolerate padded output from other implementations.
    let payload = rest[..end].trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn is_base64url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')
}
