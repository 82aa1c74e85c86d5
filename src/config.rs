// src/config.rs
//! Scout configuration: `[policy]` and `[scan]` sections, loaded from TOML or JSON.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::ingest::types::SearchConstraints;
use crate::policy::FilterPolicy;

pub const ENV_CONFIG_PATH: &str = "SCOUT_CONFIG_PATH";
pub const ENV_MIN_HOURLY_RATE: &str = "SCOUT_MIN_HOURLY_RATE";
pub const ENV_MIN_MONTHLY_RATE: &str = "SCOUT_MIN_MONTHLY_RATE";
pub const ENV_MIN_YEARLY_RATE: &str = "SCOUT_MIN_YEARLY_RATE";
pub const DEFAULT_CONFIG_PATH: &str = "config/scout.toml";

fn default_batch_size() -> usize {
    3
}
fn default_employer_pause_ms() -> u64 {
    2_000
}
fn default_batch_pause_ms() -> u64 {
    5_000
}

/// Fixed-interval pacing of provider calls plus the per-search constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_employer_pause_ms")]
    pub pause_between_employers_ms: u64,
    #[serde(default = "default_batch_pause_ms")]
    pub pause_between_batches_ms: u64,
    #[serde(default)]
    pub constraints: SearchConstraints,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            pause_between_employers_ms: default_employer_pause_ms(),
            pause_between_batches_ms: default_batch_pause_ms(),
            constraints: SearchConstraints::default(),
        }
    }
}

impl ScanSettings {
    /// Settings with no pauses; used by tests and fixture runs.
    pub fn unpaced() -> Self {
        Self {
            pause_between_employers_ms: 0,
            pause_between_batches_ms: 0,
            ..Default::default()
        }
    }

    pub fn employer_pause(&self) -> Duration {
        Duration::from_millis(self.pause_between_employers_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.pause_between_batches_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoutConfig {
    #[serde(default)]
    pub policy: FilterPolicy,
    #[serde(default)]
    pub scan: ScanSettings,
}

impl ScoutConfig {
    /// Load from an explicit path. `.json` is parsed as JSON, anything else as TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading scout config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = if ext == "json" {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        info!(path = %path.display(), "scout config loaded");
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ScoutConfig = toml::from_str(s).context("parsing scout config TOML")?;
        Ok(cfg.finish())
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: ScoutConfig = serde_json::from_str(s).context("parsing scout config JSON")?;
        Ok(cfg.finish())
    }

    /// Resolve config using env var + fallbacks:
    /// 1) $SCOUT_CONFIG_PATH
    /// 2) config/scout.toml
    /// 3) built-in defaults
    ///
    /// Rate overrides from the environment are applied last.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
            if fallback.exists() {
                Self::load_from(&fallback)?
            } else {
                Self::default().finish()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Override thresholds from SCOUT_MIN_{HOURLY,MONTHLY,YEARLY}_RATE.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_rate_env(ENV_MIN_HOURLY_RATE) {
            self.policy.min_hourly_rate = v;
        }
        if let Some(v) = parse_rate_env(ENV_MIN_MONTHLY_RATE) {
            self.policy.min_monthly_rate = v;
        }
        if let Some(v) = parse_rate_env(ENV_MIN_YEARLY_RATE) {
            self.policy.min_yearly_rate = v;
        }
    }

    fn finish(mut self) -> Self {
        self.policy = self.policy.sanitized();
        if self.scan.batch_size == 0 {
            self.scan.batch_size = default_batch_size();
        }
        self
    }
}

// non-negative finite float from env, None otherwise
fn parse_rate_env(name: &str) -> Option<f64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
        _ => {
            warn!(var = name, value = %raw, "ignoring invalid rate override");
            None
        }
    }
}
