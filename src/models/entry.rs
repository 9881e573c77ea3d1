use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Availability status of a monitored URL
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    /// URL is reachable and passing checks (default for new entries)
    #[default]
    Up,
    /// URL has failed at least `failure_threshold` consecutive probes
    Down,
}

impl std::fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UrlStatus::Up => write!(f, "up"),
            UrlStatus::Down => write!(f, "down"),
        }
    }
}

impl std::str::FromStr for UrlStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(UrlStatus::Up),
            "down" => Ok(UrlStatus::Down),
            _ => anyhow::bail!("Invalid status: {s}. Use: up, down"),
        }
    }
}

/// Monitoring state for a single URL, persisted across runs.
///
/// Exactly one of `consecutive_failures` / `consecutive_successes` is
/// nonzero after a probe; both are zero only for a fresh entry.
/// Timestamps are epoch seconds, 0 meaning "never".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UrlEntry {
    pub status: UrlStatus,
    /// Consecutive failed probes, reset on any success
    #[serde(rename = "fail")]
    pub consecutive_failures: u32,
    /// Consecutive successful probes, reset on any failure
    #[serde(rename = "ok")]
    pub consecutive_successes: u32,
    /// When the status last flipped between up and down
    pub last_change: i64,
    /// When a down alert or reminder was last sent
    pub last_down_alert: i64,
}

impl UrlEntry {
    pub fn is_down(&self) -> bool {
        self.status == UrlStatus::Down
    }

    /// Length of the current probe streak (failures while down-trending,
    /// successes otherwise)
    pub fn streak(&self) -> u32 {
        if self.consecutive_failures > 0 {
            self.consecutive_failures
        } else {
            self.consecutive_successes
        }
    }
}

impl std::fmt::Display for UrlEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (fail={} ok={})",
            self.status, self.consecutive_failures, self.consecutive_successes
        )
    }
}

/// The complete persisted snapshot: a schema tag, a write timestamp and
/// one entry per monitored URL.
///
/// Entries are keyed by URL in a `BTreeMap` so the serialized form is
/// deterministic: two runs observing the same outcomes write the same
/// `urls` bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema tag; a snapshot with a different tag than the running
    /// configuration is discarded on load
    #[serde(rename = "_schema")]
    pub schema: String,
    /// Epoch seconds when the snapshot was written
    pub saved_at: i64,
    pub urls: BTreeMap<String, UrlEntry>,
}

impl Snapshot {
    pub fn new(schema: String, saved_at: i64, urls: BTreeMap<String, UrlEntry>) -> Self {
        Self {
            schema,
            saved_at,
            urls,
        }
    }
}
