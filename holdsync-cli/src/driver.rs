//! The reconciliation driver: derive desired holds, plan, apply.
//!
//! Planning is pure (holdsync-core); this module owns all the I/O
//! around it. Plan application is strictly sequential — one backend
//! call at a time — so mutations within a pass never race against the
//! same calendar resource.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{Duration, SecondsFormat, Utc};
use tracing::{debug, info, warn};

use holdsync_core::backend::Backend;
use holdsync_core::event::{CalendarEvent, EventStatus, Transparency};
use holdsync_core::hold::DesiredHold;
use holdsync_core::plan::{ReconcileAction, ReconcilePlan};
use holdsync_core::{planner, signature, tag};

use crate::config::{Config, Mapping};

/// Per-kind apply counters.
#[derive(Debug, Default)]
pub struct ApplyStats {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
}

impl ApplyStats {
    pub fn add(&mut self, other: &ApplyStats) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
    }

    pub fn has_changes(&self) -> bool {
        self.created > 0 || self.updated > 0 || self.deleted > 0
    }
}

/// The mirroring window: now until now + `window_days`, as RFC 3339.
fn window(window_days: i64) -> (String, String) {
    let now = Utc::now();
    let to = now + Duration::days(window_days);
    (
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        to.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

/// A source event only earns a hold if it actually blocks time. Holds
/// written by this tool are excluded so two calendars mirroring each
/// other never feed on their own output.
fn mirrors_busy_time(event: &CalendarEvent) -> bool {
    if matches!(event.status, Some(EventStatus::Cancelled)) {
        return false;
    }
    if matches!(event.transparency, Some(Transparency::Transparent)) {
        return false;
    }
    if event.description.as_deref().and_then(tag::decode).is_some() {
        return false;
    }
    true
}

/// Compute the desired hold set for one mapping from current source
/// data.
pub async fn desired_holds(mapping: &Mapping, window_days: i64) -> Result<Vec<DesiredHold>> {
    let source = Backend::new(&mapping.source_provider, &mapping.source_account);
    let (time_min, time_max) = window(window_days);
    let events = source
        .list_events(&mapping.source_calendar, &time_min, &time_max)
        .await
        .with_context(|| format!("Failed to list source events for {}", mapping.id()))?;

    Ok(desired_holds_from(mapping, &events))
}

/// Turn listed source events into desired holds. Events with a missing
/// or mixed time endpoint pair earn no hold and must not wedge the
/// mapping: the source feed is not under our control.
fn desired_holds_from(mapping: &Mapping, events: &[CalendarEvent]) -> Vec<DesiredHold> {
    let mut holds = Vec::new();
    for event in events.iter().filter(|e| mirrors_busy_time(e)) {
        match DesiredHold::from_source_event(
            &mapping.source_account,
            &mapping.source_calendar,
            event,
            &mapping.hold_summary,
        ) {
            Ok(hold) => holds.push(hold),
            Err(e) => warn!(
                mapping = %mapping.id(),
                event = %event.id,
                "skipping source event: {e}"
            ),
        }
    }
    holds
}

/// Plan one mapping without applying anything.
pub async fn plan_mapping(mapping: &Mapping, window_days: i64) -> Result<ReconcilePlan> {
    let desired = desired_holds(mapping, window_days).await?;
    plan_against_target(mapping, window_days, &desired).await
}

async fn plan_against_target(
    mapping: &Mapping,
    window_days: i64,
    desired: &[DesiredHold],
) -> Result<ReconcilePlan> {
    let target = Backend::new(&mapping.target_provider, &mapping.target_account);
    let (time_min, time_max) = window(window_days);
    let events = target
        .list_events(&mapping.target_calendar, &time_min, &time_max)
        .await
        .with_context(|| format!("Failed to list target events for {}", mapping.id()))?;

    let plan = planner::plan(
        desired,
        &events,
        mapping.overlap_policy,
        mapping.max_changes_per_run,
    )?;
    Ok(plan)
}

/// Apply a plan's actions in emission order, awaiting each mutating
/// call before issuing the next. Backend failures propagate; skips are
/// only logged.
pub async fn apply_plan(mapping: &Mapping, plan: &ReconcilePlan) -> Result<ApplyStats> {
    let target = Backend::new(&mapping.target_provider, &mapping.target_account);
    let calendar_id = &mapping.target_calendar;
    let mut stats = ApplyStats::default();

    for action in &plan.actions {
        debug!(mapping = %mapping.id(), "{action}");
        match action {
            ReconcileAction::Create(hold) => {
                target.create_event(calendar_id, &hold.event).await?;
                stats.created += 1;
            }
            ReconcileAction::Update { existing, desired } => {
                target
                    .update_event(calendar_id, &existing.id, &desired.event)
                    .await?;
                stats.updated += 1;
            }
            ReconcileAction::Delete(event) => {
                target.delete_event(calendar_id, &event.id).await?;
                stats.deleted += 1;
            }
            ReconcileAction::SkipOverlap { .. } => {
                stats.skipped += 1;
            }
        }
    }

    Ok(stats)
}

/// Drives repeated reconciliation passes for `watch`.
///
/// Remembers each mapping's last applied desired-set signature so
/// unchanged mappings cost one listing call and nothing else.
#[derive(Default)]
pub struct Driver {
    last_signatures: HashMap<String, String>,
}

impl Driver {
    pub fn new() -> Driver {
        Driver::default()
    }

    /// One pass over every mapping.
    pub async fn run_cycle(&mut self, config: &Config) -> Result<ApplyStats> {
        let mut totals = ApplyStats::default();

        for mapping in &config.mappings {
            let desired = desired_holds(mapping, config.window_days).await?;
            let sig = signature::signature(&desired);

            if self
                .last_signatures
                .get(&mapping.id())
                .is_some_and(|prev| *prev == sig)
            {
                debug!(mapping = %mapping.id(), "source unchanged, skipping");
                continue;
            }

            let plan = plan_against_target(mapping, config.window_days, &desired).await?;
            if plan.is_empty() {
                debug!(mapping = %mapping.id(), "target already converged");
            } else {
                let stats = apply_plan(mapping, &plan).await?;
                info!(
                    mapping = %mapping.id(),
                    created = stats.created,
                    updated = stats.updated,
                    deleted = stats.deleted,
                    skipped = stats.skipped,
                    "applied plan"
                );
                totals.add(&stats);
            }

            if plan.capped {
                // Leave the signature unrecorded: the next cycle must
                // pick up the mutations that did not fit this run.
                warn!(
                    mapping = %mapping.id(),
                    budget = mapping.max_changes_per_run,
                    "change budget exhausted, remaining changes deferred to next cycle"
                );
            } else {
                self.last_signatures.insert(mapping.id(), sig);
            }
        }

        Ok(totals)
    }
}
