//! Reconcile planning: diff desired holds against target calendar state.
//!
//! The planner is a pure, single-pass fold over sorted keys. Given the
//! same inputs it produces the same plan regardless of the order the
//! backend returned events in, which is what makes idempotence testable
//! and logs predictable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::HoldSyncResult;
use crate::event::CalendarEvent;
use crate::hold::DesiredHold;
use crate::overlap::{self, TimeInterval};
use crate::plan::{ReconcileAction, ReconcilePlan};
use crate::tag;

/// What to do when a new hold would overlap an unmanaged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Do not create the hold; report it as skipped.
    Skip,
    /// Create the hold regardless.
    Allow,
}

/// Hard per-run circuit breaker against runaway mutation.
struct Budget {
    remaining: usize,
    capped: bool,
}

impl Budget {
    fn new(limit: usize) -> Budget {
        Budget {
            remaining: limit,
            capped: false,
        }
    }

    /// Consume one unit. Returns false (and marks the plan capped) once
    /// the limit is exhausted.
    fn take(&mut self) -> bool {
        if self.remaining == 0 {
            self.capped = true;
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Compute the ordered, budget-capped set of actions that converges
/// `target_events` to `desired`.
///
/// Unmanaged target events (no decodable tag) are never mutated, only
/// consulted for overlap blocking under [`OverlapPolicy::Skip`]. Never
/// errors on well-formed inputs; a half-formed time range on any input
/// event fails before planning starts.
pub fn plan(
    desired: &[DesiredHold],
    target_events: &[CalendarEvent],
    policy: OverlapPolicy,
    max_changes_per_run: usize,
) -> HoldSyncResult<ReconcilePlan> {
    // Validate every range up front; a half-formed range cannot be
    // reasoned about.
    let mut desired_by_key: BTreeMap<String, (&DesiredHold, TimeInterval)> = BTreeMap::new();
    for hold in desired {
        let interval = overlap::event_interval(&hold.event)?;
        // Last-wins on key collisions in the desired input.
        desired_by_key.insert(hold.key(), (hold, interval));
    }

    let mut managed: BTreeMap<String, Vec<&CalendarEvent>> = BTreeMap::new();
    let mut unmanaged: Vec<(&CalendarEvent, TimeInterval)> = Vec::new();
    for event in target_events {
        let interval = overlap::event_interval(event)?;
        match event.description.as_deref().and_then(tag::decode) {
            Some(source) => managed.entry(source.key()).or_default().push(event),
            None => unmanaged.push((event, interval)),
        }
    }

    // Deterministic order within a bucket: the lexicographically-first
    // id is the primary, everything after it is a duplicate. Unmanaged
    // events are sorted so the blocking event choice is reproducible.
    for bucket in managed.values_mut() {
        bucket.sort_by(|a, b| a.id.cmp(&b.id));
    }
    unmanaged.sort_by(|a, b| a.0.id.cmp(&b.0.id));

    let existing_managed_count = managed.values().map(Vec::len).sum();

    let mut actions = Vec::new();
    let mut budget = Budget::new(max_changes_per_run);

    for (key, (hold, hold_interval)) in &desired_by_key {
        match managed.remove(key) {
            None => {
                if policy == OverlapPolicy::Skip {
                    let blocking = unmanaged
                        .iter()
                        .find(|(_, other)| other.overlaps(hold_interval));
                    if let Some((blocking, _)) = blocking {
                        actions.push(ReconcileAction::SkipOverlap {
                            desired: (*hold).clone(),
                            blocking_event_id: blocking.id.clone(),
                        });
                        continue;
                    }
                }
                if budget.take() {
                    actions.push(ReconcileAction::Create((*hold).clone()));
                }
            }
            Some(bucket) => {
                let primary = bucket[0];
                if !holds_equivalent(primary, &hold.event) && budget.take() {
                    actions.push(ReconcileAction::Update {
                        existing: primary.clone(),
                        desired: (*hold).clone(),
                    });
                }
                // Duplicates claiming the same identity always go.
                for &duplicate in &bucket[1..] {
                    if budget.take() {
                        actions.push(ReconcileAction::Delete(duplicate.clone()));
                    }
                }
            }
        }
    }

    // Stale holds: managed identities nothing desires anymore.
    for bucket in managed.values() {
        for &event in bucket {
            if budget.take() {
                actions.push(ReconcileAction::Delete(event.clone()));
            }
        }
    }

    Ok(ReconcilePlan {
        actions,
        desired_count: desired.len(),
        existing_managed_count,
        capped: budget.capped,
    })
}

/// Field-level equivalence for the update decision: only what the hold
/// owns is compared.
fn holds_equivalent(existing: &CalendarEvent, desired: &CalendarEvent) -> bool {
    existing.summary == desired.summary
        && existing.description == desired.description
        && existing.visibility == desired.visibility
        && existing.transparency == desired.transparency
        && existing.start == desired.start
        && existing.end == desired.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventTime, Transparency, Visibility};
    use chrono::{TimeZone, Utc};

    fn source_event(id: &str, day: u32, start_h: u32, end_h: u32) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            status: None,
            summary: Some(format!("source {id}")),
            description: None,
            visibility: None,
            transparency: None,
            updated: None,
            etag: None,
            start: Some(EventTime::DateTime(
                Utc.with_ymd_and_hms(2026, 3, day, start_h, 0, 0).unwrap(),
            )),
            end: Some(EventTime::DateTime(
                Utc.with_ymd_and_hms(2026, 3, day, end_h, 0, 0).unwrap(),
            )),
            reminders: None,
        }
    }

    fn desired(event_id: &str, day: u32, start_h: u32, end_h: u32) -> DesiredHold {
        DesiredHold::from_source_event(
            "alice@example.com",
            "primary",
            &source_event(event_id, day, start_h, end_h),
            "Busy",
        )
        .unwrap()
    }

    /// A target event exactly as the backend would hold it after this
    /// desired hold was created.
    fn applied(hold: &DesiredHold, target_id: &str) -> CalendarEvent {
        let mut event = hold.event.clone();
        event.id = target_id.to_string();
        event
    }

    fn unmanaged_event(id: &str, day: u32, start_h: u32, end_h: u32) -> CalendarEvent {
        let mut event = source_event(id, day, start_h, end_h);
        event.summary = Some("lunch".to_string());
        event.description = Some("table for two".to_string());
        event
    }

    #[test]
    fn test_identical_hold_yields_empty_plan() {
        let hold = desired("fresh", 20, 12, 13);
        let target = vec![applied(&hold, "t1")];

        let plan = plan(&[hold], &target, OverlapPolicy::Skip, 50).unwrap();
        assert!(plan.is_empty());
        assert!(!plan.capped);
        assert_eq!(plan.desired_count, 1);
        assert_eq!(plan.existing_managed_count, 1);
    }

    #[test]
    fn test_stale_delete_and_fresh_create_ordering() {
        // Desired: one hold for "fresh"; target holds a tag for "stale"
        // on a different day. New-key processing comes before stale
        // cleanup, so the create is emitted first.
        let fresh = desired("fresh", 20, 12, 13);
        let stale = applied(&desired("stale", 21, 9, 10), "t-stale");

        let plan = plan(
            &[fresh.clone()],
            &[stale.clone()],
            OverlapPolicy::Skip,
            50,
        )
        .unwrap();

        assert_eq!(
            plan.actions,
            vec![
                ReconcileAction::Create(fresh),
                ReconcileAction::Delete(stale),
            ]
        );
    }

    #[test]
    fn test_changed_hold_is_updated_in_place() {
        let hold = desired("evt", 20, 12, 13);
        // Same source occurrence, but the target copy was written with a
        // different summary.
        let mut existing = applied(&hold, "t1");
        existing.summary = Some("Block".to_string());

        let plan = plan(&[hold.clone()], &[existing.clone()], OverlapPolicy::Skip, 50).unwrap();
        assert_eq!(
            plan.actions,
            vec![ReconcileAction::Update {
                existing,
                desired: hold,
            }]
        );
    }

    #[test]
    fn test_duplicate_collapse_keeps_primary() {
        let hold = desired("evt", 20, 12, 13);
        // Two managed events claim the same identity; "a" wins as the
        // primary and matches, "b" must go. Never two updates.
        let target = vec![applied(&hold, "b"), applied(&hold, "a")];

        let plan = plan(&[hold], &target, OverlapPolicy::Skip, 50).unwrap();
        assert_eq!(plan.actions.len(), 1);
        match &plan.actions[0] {
            ReconcileAction::Delete(event) => assert_eq!(event.id, "b"),
            other => panic!("expected delete of duplicate, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_collapse_with_drifted_primary() {
        let hold = desired("evt", 20, 12, 13);
        let mut drifted = applied(&hold, "a");
        drifted.visibility = Some(Visibility::Default);
        let target = vec![applied(&hold, "b"), drifted.clone()];

        let plan = plan(&[hold.clone()], &target, OverlapPolicy::Skip, 50).unwrap();
        assert_eq!(
            plan.actions,
            vec![
                ReconcileAction::Update {
                    existing: drifted,
                    desired: hold.clone(),
                },
                ReconcileAction::Delete(applied(&hold, "b")),
            ]
        );
    }

    #[test]
    fn test_unmanaged_events_are_never_touched() {
        let target = vec![unmanaged_event("lunch", 20, 12, 13)];
        let plan = plan(&[], &target, OverlapPolicy::Skip, 50).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.existing_managed_count, 0);
    }

    #[test]
    fn test_skip_policy_blocks_overlapping_create() {
        let hold = desired("evt", 20, 12, 13);
        let blocking = unmanaged_event("lunch", 20, 12, 14);

        let plan = plan(
            &[hold.clone()],
            &[blocking],
            OverlapPolicy::Skip,
            50,
        )
        .unwrap();

        assert_eq!(
            plan.actions,
            vec![ReconcileAction::SkipOverlap {
                desired: hold,
                blocking_event_id: "lunch".to_string(),
            }]
        );
        assert!(!plan.capped);
    }

    #[test]
    fn test_allow_policy_creates_despite_overlap() {
        let hold = desired("evt", 20, 12, 13);
        let blocking = unmanaged_event("lunch", 20, 12, 14);

        let plan = plan(&[hold.clone()], &[blocking], OverlapPolicy::Allow, 50).unwrap();
        assert_eq!(plan.actions, vec![ReconcileAction::Create(hold)]);
    }

    #[test]
    fn test_back_to_back_unmanaged_does_not_block() {
        // Unmanaged event ends exactly when the hold starts.
        let hold = desired("evt", 20, 12, 13);
        let adjacent = unmanaged_event("lunch", 20, 11, 12);

        let plan = plan(&[hold.clone()], &[adjacent], OverlapPolicy::Skip, 50).unwrap();
        assert_eq!(plan.actions, vec![ReconcileAction::Create(hold)]);
    }

    #[test]
    fn test_budget_caps_mutations_but_not_skips() {
        // Three creates needed plus one skip, budget of two.
        let holds = vec![
            desired("a", 20, 8, 9),
            desired("b", 20, 9, 10),
            desired("c", 20, 10, 11),
            desired("d", 21, 9, 10),
        ];
        let blocking = unmanaged_event("lunch", 21, 9, 11);

        let plan = plan(&holds, &[blocking], OverlapPolicy::Skip, 2).unwrap();
        assert!(plan.capped);
        let mutations = plan.actions.iter().filter(|a| a.is_mutation()).count();
        assert_eq!(mutations, 2);
        let (_, _, _, skipped) = plan.counts();
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_capped_duplicates_persist_until_headroom() {
        let hold = desired("evt", 20, 12, 13);
        let target = vec![applied(&hold, "a"), applied(&hold, "b"), applied(&hold, "c")];

        let plan = plan(&[hold], &target, OverlapPolicy::Skip, 1).unwrap();
        assert!(plan.capped);
        // Only one of the two duplicates fits this run.
        assert_eq!(plan.actions.len(), 1);
        assert!(matches!(plan.actions[0], ReconcileAction::Delete(_)));
    }

    #[test]
    fn test_plan_is_deterministic_under_input_reordering() {
        let holds = vec![
            desired("b", 20, 9, 10),
            desired("a", 20, 8, 9),
            desired("c", 21, 9, 10),
        ];
        let target = vec![
            applied(&desired("stale2", 22, 9, 10), "t2"),
            applied(&desired("stale1", 22, 8, 9), "t1"),
            unmanaged_event("lunch", 21, 9, 11),
        ];

        let forward = plan(&holds, &target, OverlapPolicy::Skip, 50).unwrap();

        let mut holds_rev = holds.clone();
        holds_rev.reverse();
        let mut target_rev = target.clone();
        target_rev.reverse();
        let backward = plan(&holds_rev, &target_rev, OverlapPolicy::Skip, 50).unwrap();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_idempotence_after_apply() {
        let holds = vec![desired("a", 20, 8, 9), desired("b", 20, 9, 10)];
        let stale = applied(&desired("stale", 21, 9, 10), "t-stale");
        let mut drifted = applied(&holds[1], "t-b");
        drifted.summary = Some("Block".to_string());
        let target = vec![stale, drifted];

        let first = plan(&holds, &target, OverlapPolicy::Skip, 50).unwrap();
        assert!(!first.is_empty());

        // Simulate applying the plan against the target state.
        let mut next_target: Vec<CalendarEvent> = target.clone();
        let mut created = 0;
        for action in &first.actions {
            match action {
                ReconcileAction::Create(hold) => {
                    created += 1;
                    next_target.push(applied(hold, &format!("new-{created}")));
                }
                ReconcileAction::Update { existing, desired } => {
                    let slot = next_target.iter_mut().find(|e| e.id == existing.id).unwrap();
                    *slot = applied(desired, &existing.id);
                }
                ReconcileAction::Delete(event) => {
                    next_target.retain(|e| e.id != event.id);
                }
                ReconcileAction::SkipOverlap { .. } => {}
            }
        }

        let second = plan(&holds, &next_target, OverlapPolicy::Skip, 50).unwrap();
        assert!(second.is_empty(), "second pass was {:?}", second.actions);
    }

    #[test]
    fn test_last_desired_wins_on_key_collision() {
        let first = desired("evt", 20, 12, 13);
        let mut second = first.clone();
        second.source.title = "Renamed".to_string();
        second.event.description = Some(crate::tag::encode(&second.source));

        let plan = plan(
            &[first, second.clone()],
            &[],
            OverlapPolicy::Skip,
            50,
        )
        .unwrap();

        assert_eq!(plan.desired_count, 2);
        assert_eq!(plan.actions, vec![ReconcileAction::Create(second)]);
    }

    #[test]
    fn test_malformed_target_range_aborts_planning() {
        let mut broken = unmanaged_event("broken", 20, 12, 13);
        broken.end = None;
        assert!(plan(&[], &[broken], OverlapPolicy::Skip, 50).is_err());
    }

    #[test]
    fn test_blocking_event_choice_is_lexicographic() {
        let hold = desired("evt", 20, 12, 13);
        let target = vec![
            unmanaged_event("zz-late", 20, 12, 14),
            unmanaged_event("aa-early", 20, 11, 14),
        ];

        let plan = plan(&[hold], &target, OverlapPolicy::Skip, 50).unwrap();
        match &plan.actions[0] {
            ReconcileAction::SkipOverlap {
                blocking_event_id, ..
            } => assert_eq!(blocking_event_id, "aa-early"),
            other => panic!("expected skip, got {other:?}"),
        }
    }
}
