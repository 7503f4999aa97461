//! Calendar backend client.
//!
//! Wraps a provider and an account identifier behind the four calls the
//! driver needs. The planner never touches this; all I/O stays at the
//! edges.

use serde_json::json;

use crate::error::HoldSyncResult;
use crate::event::CalendarEvent;
use crate::protocol::Command;
use crate::provider::Provider;

/// One provider account (e.g. google + alice@example.com).
pub struct Backend {
    provider: Provider,
    account: String,
}

impl Backend {
    pub fn new(provider_name: &str, account: &str) -> Backend {
        Backend {
            provider: Provider::from_name(provider_name),
            account: account.to_string(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// List events on a calendar within `[time_min, time_max]`
    /// (RFC 3339 instants).
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: &str,
        time_max: &str,
    ) -> HoldSyncResult<Vec<CalendarEvent>> {
        self.provider
            .call(
                Command::ListEvents,
                json!({
                    "account": self.account,
                    "calendar_id": calendar_id,
                    "time_min": time_min,
                    "time_max": time_max,
                }),
            )
            .await
    }

    pub async fn create_event(
        &self,
        calendar_id: &str,
        event: &CalendarEvent,
    ) -> HoldSyncResult<()> {
        self.provider
            .call(
                Command::CreateEvent,
                json!({
                    "account": self.account,
                    "calendar_id": calendar_id,
                    "event": event,
                }),
            )
            .await
    }

    pub async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &CalendarEvent,
    ) -> HoldSyncResult<()> {
        self.provider
            .call(
                Command::UpdateEvent,
                json!({
                    "account": self.account,
                    "calendar_id": calendar_id,
                    "event_id": event_id,
                    "event": event,
                }),
            )
            .await
    }

    pub async fn delete_event(&self, calendar_id: &str, event_id: &str) -> HoldSyncResult<()> {
        self.provider
            .call(
                Command::DeleteEvent,
                json!({
                    "account": self.account,
                    "calendar_id": calendar_id,
                    "event_id": event_id,
                }),
            )
            .await
    }
}
