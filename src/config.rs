//! Runtime configuration for a monitoring run.
//!
//! Every knob is a long flag backed by an environment variable, so the
//! binary works both from a shell and from schedulers that only set
//! env (cron, CI). `MonitorArgs` is the raw clap surface;
//! `MonitorConfig::resolve` validates it into the form the rest of the
//! crate consumes. Validation failures map to exit code 2.

use clap::Args;
use regex::{Regex, RegexBuilder};
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::AlertPolicy;

/// Configuration problems that abort the run before anything is probed
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No URLs configured; set URLS or pass --urls")]
    NoUrls,
    #[error("Invalid expect pattern '{pattern}': {source}")]
    InvalidExpectPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Raw command-line and environment surface
#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Comma-separated list of URLs to probe
    #[arg(long, env = "URLS", global = true)]
    pub urls: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "TIMEOUT", default_value_t = 10, global = true)]
    pub timeout: u64,

    /// Pattern the response body must match (case-insensitive)
    #[arg(long, env = "EXPECT", global = true)]
    pub expect: Option<String>,

    /// CallMeBot phone number for WhatsApp alerts
    #[arg(long, env = "CALLMEBOT_PHONE", global = true)]
    pub callmebot_phone: Option<String>,

    /// CallMeBot API key for WhatsApp alerts
    #[arg(long, env = "CALLMEBOT_APIKEY", global = true)]
    pub callmebot_apikey: Option<String>,

    /// Path of the snapshot file
    #[arg(
        long,
        env = "STATE_FILE",
        default_value = ".uptime_state/state.json",
        global = true
    )]
    pub state_file: PathBuf,

    /// Schema tag a previous snapshot must carry to be reused
    #[arg(
        long,
        env = "STATE_SCHEMA_VERSION",
        default_value = "v2",
        global = true
    )]
    pub state_schema_version: String,

    /// Consecutive failures before a URL is marked down
    #[arg(long, env = "FAILURE_THRESHOLD", default_value_t = 1, global = true)]
    pub failure_threshold: u32,

    /// Minutes between repeat alerts while a URL stays down (0 disables)
    #[arg(long, env = "REMIND_MIN", default_value_t = 10, global = true)]
    pub remind_min: u32,
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// URLs in probe order, trimmed, never empty
    pub urls: Vec<String>,
    pub timeout_secs: u64,
    /// Compiled body pattern, case-insensitive and multi-line
    pub expect: Option<Regex>,
    pub callmebot_phone: Option<String>,
    pub callmebot_apikey: Option<String>,
    pub state_file: PathBuf,
    pub schema_version: String,
    /// Always >= 1
    pub failure_threshold: u32,
    pub remind_min: u32,
}

impl MonitorConfig {
    /// Validate the raw arguments.
    ///
    /// - the URL list is split on commas, trimmed and must be non-empty
    /// - the expect pattern is compiled once, up front
    /// - blank credentials count as absent and disable alerting
    /// - the failure threshold is clamped to at least 1
    pub fn resolve(args: MonitorArgs) -> Result<Self, ConfigError> {
        let urls: Vec<String> = args
            .urls
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(String::from)
            .collect();
        if urls.is_empty() {
            return Err(ConfigError::NoUrls);
        }

        let expect = match args.expect.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                RegexBuilder::new(raw)
                    .case_insensitive(true)
                    .multi_line(true)
                    .build()
                    .map_err(|source| ConfigError::InvalidExpectPattern {
                        pattern: raw.to_string(),
                        source,
                    })?,
            ),
            _ => None,
        };

        Ok(Self {
            urls,
            timeout_secs: args.timeout,
            expect,
            callmebot_phone: non_blank(args.callmebot_phone),
            callmebot_apikey: non_blank(args.callmebot_apikey),
            state_file: args.state_file,
            schema_version: args.state_schema_version,
            failure_threshold: args.failure_threshold.max(1),
            remind_min: args.remind_min,
        })
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            failure_threshold: self.failure_threshold,
            remind_min: self.remind_min,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
