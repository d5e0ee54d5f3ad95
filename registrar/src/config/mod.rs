pub mod manager;
pub mod secrets;

use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{defaults, watch, window};
use crate::portal::PortalEndpoints;
use crate::scheduler::WindowOptions;
use crate::session::Credentials;

pub use manager::ConfigManager;
pub use secrets::{CredentialsFile, CredentialsLoader};

/// `config/main.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_portal_base_url")]
    pub portal_base_url: String,
    #[serde(default = "default_identity_provider_url")]
    pub identity_provider_url: String,
    #[serde(default = "default_sp_alias")]
    pub sp_alias: String,
    #[serde(default = "default_portal_timezone")]
    pub portal_timezone: String,
    pub registration_time_file: Option<String>,
    pub credentials_file: Option<String>,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

fn default_portal_base_url() -> String {
    defaults::PORTAL_BASE_URL.to_string()
}

fn default_identity_provider_url() -> String {
    defaults::IDENTITY_PROVIDER_URL.to_string()
}

fn default_sp_alias() -> String {
    defaults::SP_ALIAS.to_string()
}

fn default_portal_timezone() -> String {
    defaults::PORTAL_TIMEZONE.to_string()
}

/// Optional overrides of the scheduler and watcher timing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimingConfig {
    pub heartbeat_interval_seconds: Option<u64>,
    pub recheck_delay_seconds: Option<u64>,
    pub watch_poll_interval_seconds: Option<u64>,
    pub max_eligibility_checks: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Watch,
    Signup,
    Release,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "watch" => Ok(Mode::Watch),
            "signup" => Ok(Mode::Signup),
            "release" => Ok(Mode::Release),
            other => Err(format!("unknown mode '{}' (expected Watch, Signup or Release)", other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Watch => write!(f, "Watch"),
            Mode::Signup => write!(f, "Signup"),
            Mode::Release => write!(f, "Release"),
        }
    }
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CrnList {
    Joined(String),
    List(Vec<String>),
}

/// Accepts `"12345, 23456"` as well as `["12345", "23456"]`
fn deserialize_crns<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    let raw = match CrnList::deserialize(deserializer)? {
        CrnList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        CrnList::List(list) => list,
    };
    Ok(raw
        .iter()
        .map(|crn| crn.trim().trim_matches('"').to_string())
        .filter(|crn| !crn.is_empty())
        .collect())
}

/// One `[[tasks]]` entry as written in the file
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub term: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, deserialize_with = "deserialize_crns")]
    pub crns: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_crns")]
    pub drop_crns: Vec<String>,
    pub registration_time: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub webhook: Option<String>,
}

/// A task with credentials resolved, ready to run
#[derive(Debug, Clone)]
pub struct TaskSettings {
    pub term: String,
    pub subject: String,
    pub mode: Mode,
    pub crns: Vec<String>,
    pub drop_crns: Vec<String>,
    pub registration_time: Option<String>,
    pub credentials: Credentials,
    pub webhook_url: String,
}

/// Settings shared by every task of a run
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub endpoints: PortalEndpoints,
    pub window: WindowOptions,
    pub watch_poll_interval: Duration,
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.portal_timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Invalid portal_timezone '{}': {}", self.portal_timezone, e))
    }

    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let seconds = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_secs).unwrap_or(fallback)
        };

        let window = WindowOptions {
            timezone: self.timezone()?,
            heartbeat_interval: seconds(
                self.timing.heartbeat_interval_seconds,
                window::HEARTBEAT_INTERVAL,
            ),
            recheck_delay: seconds(self.timing.recheck_delay_seconds, window::RECHECK_DELAY),
            max_checks: self
                .timing
                .max_eligibility_checks
                .unwrap_or(window::MAX_ELIGIBILITY_CHECKS),
            registration_time_file: self.registration_time_file.as_ref().map(PathBuf::from),
            ..WindowOptions::default()
        };

        if window.heartbeat_interval.is_zero() {
            return Err(anyhow!("timing.heartbeat_interval_seconds must be positive"));
        }

        Ok(EngineSettings {
            endpoints: PortalEndpoints::new(
                &self.portal_base_url,
                &self.identity_provider_url,
                &self.sp_alias,
            ),
            window,
            watch_poll_interval: seconds(
                self.timing.watch_poll_interval_seconds,
                watch::POLL_INTERVAL,
            ),
        })
    }
}
