use anyhow::Result;
use owo_colors::OwoColorize;

use crate::config::Config;
use crate::{driver, render};

pub async fn run(config: &Config) -> Result<()> {
    for (i, mapping) in config.mappings.iter().enumerate() {
        println!("{}", mapping.id().bold());

        match driver::plan_mapping(mapping, config.window_days).await {
            Ok(plan) => println!("{}", render::render_plan(&plan)),
            Err(e) => println!("   {}", e.to_string().red()),
        }

        if i < config.mappings.len() - 1 {
            println!();
        }
    }

    Ok(())
}
