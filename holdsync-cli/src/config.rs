//! Config file loading (holdsync.toml).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use holdsync_core::planner::OverlapPolicy;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// How often `watch` re-polls, as a humantime string ("30s", "5m").
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,

    /// How far ahead of now events are mirrored.
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    #[serde(rename = "mapping")]
    pub mappings: Vec<Mapping>,
}

/// One source calendar mirrored onto one target calendar.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mapping {
    #[serde(default = "default_provider")]
    pub source_provider: String,
    pub source_account: String,
    pub source_calendar: String,

    #[serde(default = "default_provider")]
    pub target_provider: String,
    pub target_account: String,
    pub target_calendar: String,

    /// Summary shown on created holds.
    #[serde(default = "default_hold_summary")]
    pub hold_summary: String,

    #[serde(default = "default_overlap_policy")]
    pub overlap_policy: OverlapPolicy,

    #[serde(default = "default_max_changes")]
    pub max_changes_per_run: usize,
}

impl Mapping {
    /// Stable identifier for logs and signature tracking.
    pub fn id(&self) -> String {
        format!(
            "{}/{} -> {}/{}",
            self.source_account, self.source_calendar, self.target_account, self.target_calendar
        )
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        humantime::parse_duration(&self.poll_interval)
            .with_context(|| format!("Invalid poll_interval '{}'", self.poll_interval))
    }

    fn validate(&self) -> Result<()> {
        if self.mappings.is_empty() {
            bail!("Config has no [[mapping]] entries");
        }
        for mapping in &self.mappings {
            if mapping.max_changes_per_run == 0 {
                bail!(
                    "max_changes_per_run must be at least 1 (mapping {})",
                    mapping.id()
                );
            }
        }
        if self.window_days <= 0 {
            bail!("window_days must be positive");
        }
        self.poll_interval()?;
        Ok(())
    }
}

fn default_poll_interval() -> String {
    "5m".to_string()
}

fn default_window_days() -> i64 {
    60
}

fn default_provider() -> String {
    "google".to_string()
}

fn default_hold_summary() -> String {
    "Busy".to_string()
}

fn default_overlap_policy() -> OverlapPolicy {
    OverlapPolicy::Skip
}

fn default_max_changes() -> usize {
    50
}
