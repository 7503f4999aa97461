//! Terminal rendering for plans, colored with owo_colors.

use holdsync_core::event::{CalendarEvent, EventTime};
use holdsync_core::plan::{ReconcileAction, ReconcilePlan};
use owo_colors::OwoColorize;

pub fn render_action(action: &ReconcileAction) -> String {
    match action {
        ReconcileAction::Create(hold) => format!(
            "{} {} {}",
            action.symbol().green(),
            hold.event.summary.as_deref().unwrap_or("(hold)").green(),
            render_event_time(&hold.event).dimmed()
        ),
        ReconcileAction::Update { desired, .. } => format!(
            "{} {} {}",
            action.symbol().yellow(),
            desired.event.summary.as_deref().unwrap_or("(hold)").yellow(),
            render_event_time(&desired.event).dimmed()
        ),
        ReconcileAction::Delete(event) => format!(
            "{} {} {}",
            action.symbol().red(),
            event.summary.as_deref().unwrap_or(&event.id).red(),
            render_event_time(event).dimmed()
        ),
        ReconcileAction::SkipOverlap {
            desired,
            blocking_event_id,
        } => format!(
            "{} {} {} {}",
            action.symbol().dimmed(),
            desired.event.summary.as_deref().unwrap_or("(hold)").dimmed(),
            render_event_time(&desired.event).dimmed(),
            format!("(blocked by {blocking_event_id})").dimmed()
        ),
    }
}

pub fn render_plan(plan: &ReconcilePlan) -> String {
    if plan.is_empty() {
        return format!("   {}", "up to date".dimmed());
    }

    let mut lines: Vec<String> = plan
        .actions
        .iter()
        .map(|action| format!("   {}", render_action(action)))
        .collect();

    let (created, updated, deleted, skipped) = plan.counts();
    let mut summary = format!("   {created} to create, {updated} to update, {deleted} to delete");
    if skipped > 0 {
        summary.push_str(&format!(", {skipped} skipped"));
    }
    lines.push(summary);

    if plan.capped {
        lines.push(format!(
            "   {}",
            "change budget exhausted, more changes next run".yellow()
        ));
    }

    lines.join("\n")
}

fn render_event_time(event: &CalendarEvent) -> String {
    match (&event.start, &event.end) {
        (Some(EventTime::DateTime(start)), Some(EventTime::DateTime(end))) => format!(
            "{} - {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%H:%M")
        ),
        (Some(EventTime::Date(start)), Some(EventTime::Date(end))) => {
            format!("{start} - {end} (all day)")
        }
        _ => String::new(),
    }
}
