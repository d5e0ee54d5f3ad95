use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

use crate::constants::window::{TIMESTAMP_FORMAT, TIMESTAMP_PATTERN};
use crate::errors::{ParseError, Result};

/// `term/search` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermSearchResponse {
    #[serde(default, rename = "studentEligFailures", alias = "StudentEligFailures")]
    pub student_elig_failures: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEligibility {
    pub failures: Vec<String>,
    pub can_register: bool,
}

impl From<TermSearchResponse> for RegistrationEligibility {
    fn from(response: TermSearchResponse) -> Self {
        let failures = response.student_elig_failures.unwrap_or_default();
        Self {
            can_register: failures.is_empty(),
            failures,
        }
    }
}

/// What to do after one eligibility check
#[derive(Debug, Clone, PartialEq)]
pub enum WindowDecision {
    Open,
    /// Closed with no time to wait for
    Blocked { reason: String },
    /// Reported opening time has already passed
    Recheck { target: DateTime<Tz>, raw: String },
    /// Sleep for `wait`, then check again
    WaitUntil {
        target: DateTime<Tz>,
        wait: Duration,
        raw: String,
    },
}

fn timestamp_regex() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TIMESTAMP_PATTERN).ok()).as_ref()
}

/// First `MM/DD/YYYY HH:MM AM|PM` token in `text`
pub fn find_timestamp(text: &str) -> Option<&str> {
    timestamp_regex()?.find(text).map(|m| m.as_str())
}

/// Interpret a portal timestamp in the portal's zone
pub fn parse_portal_timestamp(value: &str, zone: Tz) -> Result<DateTime<Tz>> {
    let invalid = || ParseError::Timestamp {
        value: value.to_string(),
    };

    let naive = NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| invalid())?;
    // Fall-back DST hour is ambiguous; the portal means the first one.
    // A spring-forward gap time means the first instant after the gap.
    zone.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(naive + chrono::Duration::hours(1)))
                .earliest()
        })
        .ok_or_else(|| invalid().into())
}

/// Find and parse the first timestamp in `text`
pub fn extract_portal_timestamp(text: &str, zone: Tz) -> Option<(String, DateTime<Tz>)> {
    let raw = find_timestamp(text)?;
    parse_portal_timestamp(raw, zone)
        .ok()
        .map(|target| (raw.to_string(), target))
}

pub fn decide(eligibility: &RegistrationEligibility, now: DateTime<Tz>) -> WindowDecision {
    let Some(last) = eligibility.failures.last() else {
        return WindowDecision::Open;
    };

    let timestamp = eligibility
        .failures
        .iter()
        .find_map(|failure| extract_portal_timestamp(failure, now.timezone()));

    match timestamp {
        None => WindowDecision::Blocked {
            reason: last.clone(),
        },
        Some((raw, target)) if now >= target => WindowDecision::Recheck { target, raw },
        Some((raw, target)) => WindowDecision::WaitUntil {
            target,
            wait: (target - now).to_std().unwrap_or_default(),
            raw,
        },
    }
}

/// `1h 2m 3s` style rendering of a wait
pub fn format_wait(wait: Duration) -> String {
    let total = wait.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    match (hours, minutes) {
        (0, 0) => format!("{}s", seconds),
        (0, _) => format!("{}m {}s", minutes, seconds),
        _ => format!("{}h {}m {}s", hours, minutes, seconds),
    }
}
