//! Service-wide configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::tenant::DEFAULT_VISITOR_TIMEOUT_MINUTES;
use crate::core::AppResult;

/// Prefix of every environment variable read by [`ServiceConfig::from_env`].
pub const ENV_PREFIX: &str = "ISLAND_QUEUE_";

/// Root configuration for a queue service process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Seconds between sweep cycles.
    pub sweep_interval_secs: u64,
    /// Islands older than this many hours are closed by the sweep.
    pub max_island_age_hours: u64,
    /// Visitor timeout for tenants without a stored value.
    pub default_visitor_timeout_minutes: u64,
    /// Smallest timeout an admin may configure.
    pub min_visitor_timeout_minutes: u64,
    /// Largest timeout an admin may configure.
    pub max_visitor_timeout_minutes: u64,
    /// Width of generated island ids.
    pub island_id_digits: u32,
    /// Draws before id generation gives up.
    pub max_id_attempts: usize,
    /// Debug mode: owners may join their own queue.
    pub allow_self_join: bool,
    /// Skip re-posting a close announcement into the channel the close
    /// command came from.
    pub suppress_origin_echo: bool,
    /// Command prefix quoted in notification text.
    pub command_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 300,
            max_island_age_hours: 10,
            default_visitor_timeout_minutes: DEFAULT_VISITOR_TIMEOUT_MINUTES,
            min_visitor_timeout_minutes: 1,
            max_visitor_timeout_minutes: 240,
            island_id_digits: 3,
            max_id_attempts: 1000,
            allow_self_join: false,
            suppress_origin_echo: true,
            command_prefix: "!".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.sweep_interval_secs == 0 {
            return Err("sweep_interval_secs must be greater than 0".into());
        }
        if self.max_island_age_hours == 0 {
            return Err("max_island_age_hours must be greater than 0".into());
        }
        if self.min_visitor_timeout_minutes == 0 {
            return Err("min_visitor_timeout_minutes must be greater than 0".into());
        }
        if self.min_visitor_timeout_minutes > self.max_visitor_timeout_minutes {
            return Err("min_visitor_timeout_minutes exceeds max_visitor_timeout_minutes".into());
        }
        if !(self.min_visitor_timeout_minutes..=self.max_visitor_timeout_minutes)
            .contains(&self.default_visitor_timeout_minutes)
        {
            return Err("default_visitor_timeout_minutes outside the allowed timeout range".into());
        }
        if !(1..=9).contains(&self.island_id_digits) {
            return Err("island_id_digits must be between 1 and 9".into());
        }
        if self.max_id_attempts == 0 {
            return Err("max_id_attempts must be greater than 0".into());
        }
        if self.command_prefix.trim().is_empty() {
            return Err("command_prefix must not be empty".into());
        }
        Ok(())
    }

    /// Interval between sweep cycles.
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Parse configuration from a JSON string and validate. Missing keys take
    /// their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `ISLAND_QUEUE_*` environment variables, after
    /// loading a `.env` file if one exists. Unset variables keep defaults.
    pub fn from_env() -> AppResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env loaded: {e}");
        }
        let mut cfg = Self::default();
        override_from_env("SWEEP_INTERVAL_SECS", &mut cfg.sweep_interval_secs)?;
        override_from_env("MAX_ISLAND_AGE_HOURS", &mut cfg.max_island_age_hours)?;
        override_from_env(
            "DEFAULT_VISITOR_TIMEOUT_MINUTES",
            &mut cfg.default_visitor_timeout_minutes,
        )?;
        override_from_env("MIN_VISITOR_TIMEOUT_MINUTES", &mut cfg.min_visitor_timeout_minutes)?;
        override_from_env("MAX_VISITOR_TIMEOUT_MINUTES", &mut cfg.max_visitor_timeout_minutes)?;
        override_from_env("ISLAND_ID_DIGITS", &mut cfg.island_id_digits)?;
        override_from_env("MAX_ID_ATTEMPTS", &mut cfg.max_id_attempts)?;
        override_from_env("ALLOW_SELF_JOIN", &mut cfg.allow_self_join)?;
        override_from_env("SUPPRESS_ORIGIN_ECHO", &mut cfg.suppress_origin_echo)?;
        override_from_env("COMMAND_PREFIX", &mut cfg.command_prefix)?;
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn override_from_env<T>(key: &str, slot: &mut T) -> AppResult<()>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let name = format!("{ENV_PREFIX}{key}");
    if let Ok(raw) = env::var(&name) {
        *slot = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {name}: {raw:?}"))?;
    }
    Ok(())
}
