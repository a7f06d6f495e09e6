//! Layered runtime settings.
//!
//! Sources, lowest precedence first: built-in defaults, an optional TOML file,
//! `SLA_WATCH_*` environment variables, then command-line overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::data::HISTORY_LIMIT;
use crate::engine::{is_http_url, EngineConfig, PollSchedule};

const ENV_PREFIX: &str = "SLA_WATCH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the status API, e.g. `http://localhost:8000/api/v1`.
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub history_limit: usize,
    pub fast_interval_secs: u64,
    pub fast_window_secs: u64,
    pub slow_interval_secs: u64,
    pub roster_interval_secs: u64,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 10,
            history_limit: HISTORY_LIMIT,
            fast_interval_secs: 3,
            fast_window_secs: 20,
            slow_interval_secs: 30,
            roster_interval_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Load and validate settings.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_with_prefix(path, overrides, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, overrides: &Overrides, prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .set_override_option("api_url", overrides.api_url.clone())?
            .set_override_option("log_level", overrides.log_level.clone())?
            .build()
            .context("Failed to read configuration")?;

        let settings: Settings = config
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_http_url(&self.api_url) {
            bail!(
                "api_url must be an http:// or https:// URL, got {:?}",
                self.api_url
            );
        }

        let intervals = [
            ("request_timeout_secs", self.request_timeout_secs),
            ("fast_interval_secs", self.fast_interval_secs),
            ("slow_interval_secs", self.slow_interval_secs),
            ("roster_interval_secs", self.roster_interval_secs),
        ];
        for (name, value) in intervals {
            if value == 0 {
                bail!("{} must be greater than zero", name);
            }
        }

        if self.history_limit == 0 {
            bail!("history_limit must be greater than zero");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn roster_interval(&self) -> Duration {
        Duration::from_secs(self.roster_interval_secs)
    }

    pub fn poll_schedule(&self) -> PollSchedule {
        PollSchedule {
            fast_interval: Duration::from_secs(self.fast_interval_secs),
            fast_window: Duration::from_secs(self.fast_window_secs),
            slow_interval: Duration::from_secs(self.slow_interval_secs),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            schedule: self.poll_schedule(),
            roster_interval: self.roster_interval(),
            history_limit: self.history_limit,
        }
    }
}
