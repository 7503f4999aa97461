//! Reconcile plan types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;
use crate::hold::DesiredHold;

/// One step of a reconcile plan. Each variant carries exactly the data
/// needed to execute or report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReconcileAction {
    /// Create a new hold on the target calendar.
    Create(DesiredHold),
    /// Rewrite an existing managed event to match the desired hold.
    Update {
        existing: CalendarEvent,
        desired: DesiredHold,
    },
    /// Remove a managed event (stale identity or duplicate).
    Delete(CalendarEvent),
    /// Hold not created because it would overlap an unmanaged event.
    SkipOverlap {
        desired: DesiredHold,
        blocking_event_id: String,
    },
}

impl ReconcileAction {
    /// Whether this action mutates the target calendar. Only mutations
    /// count against the per-run budget.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ReconcileAction::SkipOverlap { .. })
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ReconcileAction::Create(_) => "+",
            ReconcileAction::Update { .. } => "~",
            ReconcileAction::Delete(_) => "-",
            ReconcileAction::SkipOverlap { .. } => "!",
        }
    }
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileAction::Create(hold) => {
                write!(f, "+ hold for {}", hold.source.event_id)
            }
            ReconcileAction::Update { desired, .. } => {
                write!(f, "~ hold for {}", desired.source.event_id)
            }
            ReconcileAction::Delete(event) => write!(f, "- {}", event.id),
            ReconcileAction::SkipOverlap {
                desired,
                blocking_event_id,
            } => write!(
                f,
                "! hold for {} blocked by {}",
                desired.source.event_id, blocking_event_id
            ),
        }
    }
}

/// The ordered outcome of one planning pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub actions: Vec<ReconcileAction>,
    /// Number of desired holds given as input (before key dedup).
    pub desired_count: usize,
    /// Number of managed events found on the target.
    pub existing_managed_count: usize,
    /// True if the per-run change budget ran out before every required
    /// mutation could be scheduled.
    pub capped: bool,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// (created, updated, deleted, skipped) counts.
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        let mut created = 0;
        let mut updated = 0;
        let mut deleted = 0;
        let mut skipped = 0;

        for action in &self.actions {
            match action {
                ReconcileAction::Create(_) => created += 1,
                ReconcileAction::Update { .. } => updated += 1,
                ReconcileAction::Delete(_) => deleted += 1,
                ReconcileAction::SkipOverlap { .. } => skipped += 1,
            }
        }

        (created, updated, deleted, skipped)
    }
}
