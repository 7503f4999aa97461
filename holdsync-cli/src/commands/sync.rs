use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::Config;
use crate::driver::{self, ApplyStats};
use crate::render;

pub async fn run(config: &Config) -> Result<()> {
    let mut totals = ApplyStats::default();

    for (i, mapping) in config.mappings.iter().enumerate() {
        println!("{}", mapping.id().bold());

        let plan = driver::plan_mapping(mapping, config.window_days).await?;
        println!("{}", render::render_plan(&plan));

        if !plan.is_empty() {
            let stats = driver::apply_plan(mapping, &plan).await?;
            totals.add(&stats);
        }

        if i < config.mappings.len() - 1 {
            println!();
        }
    }

    if totals.has_changes() {
        println!(
            "\nSynced: {} created, {} updated, {} deleted",
            totals.created, totals.updated, totals.deleted
        );
    }

    Ok(())
}
