//! Scheduler configuration structures.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Prefix of the environment variables read by [`SchedulerConfig::from_env`].
pub const ENV_PREFIX: &str = "PRIORITY_GATE_";

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of tasks running at once.
    pub max_concurrency: usize,
    /// Completion watcher polling interval in milliseconds.
    pub poll_interval_ms: u64,
    /// How long the dispatcher idles when nothing is pending, in milliseconds.
    /// New admissions cut the idle short.
    pub idle_backoff_ms: u64,
    /// Start with promotions suspended until `resume()`.
    pub start_paused: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            poll_interval_ms: 500,
            idle_backoff_ms: 3000,
            start_paused: false,
        }
    }
}

impl SchedulerConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first field that is zero.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be greater than 0".into());
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".into());
        }
        if self.idle_backoff_ms == 0 {
            return Err("idle_backoff_ms must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate. Missing fields
    /// take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a message for malformed JSON or invalid values.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read configuration from `PRIORITY_GATE_*` environment variables,
    /// loading a `.env` file first if one exists. Unset variables keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Fails if a variable does not parse or the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, using the same keys
    /// as [`Self::from_env`].
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let cfg = Self {
            max_concurrency: parse_var(&lookup, "MAX_CONCURRENCY")?
                .unwrap_or(defaults.max_concurrency),
            poll_interval_ms: parse_var(&lookup, "POLL_INTERVAL_MS")?
                .unwrap_or(defaults.poll_interval_ms),
            idle_backoff_ms: parse_var(&lookup, "IDLE_BACKOFF_MS")?
                .unwrap_or(defaults.idle_backoff_ms),
            start_paused: parse_var(&lookup, "START_PAUSED")?.unwrap_or(defaults.start_paused),
        };
        cfg.validate()
            .map_err(anyhow::Error::msg)
            .context("invalid scheduler configuration")?;
        Ok(cfg)
    }

    /// Watcher polling interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Dispatcher idle backoff.
    #[must_use]
    pub const fn idle_backoff(&self) -> Duration {
        Duration::from_millis(self.idle_backoff_ms)
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    let key = format!("{ENV_PREFIX}{name}");
    lookup(&key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("{key}={raw:?} is not valid"))
        })
        .transpose()
}
