//! Up/down transition logic for monitored URLs.
//!
//! One probe outcome moves one entry through the state machine:
//! consecutive failures debounce into a down transition, the first
//! success while down recovers immediately, and a configurable cadence
//! re-alerts for URLs that stay down. The functions here are pure:
//! callers supply the clock and perform all I/O.

use crate::models::{UrlEntry, UrlStatus};
use crate::probe::CheckOutcome;

/// When alerts fire: how many consecutive failures mark a URL down and
/// how often to repeat the alert while it stays down.
#[derive(Debug, Clone, Copy)]
pub struct AlertPolicy {
    /// Consecutive failures required before an up URL is marked down.
    /// Always >= 1; configuration clamps lower values.
    pub failure_threshold: u32,
    /// Minutes between repeat alerts for a URL that stays down.
    /// 0 disables reminders entirely; the initial down alert still fires.
    pub remind_min: u32,
}

impl AlertPolicy {
    fn remind_secs(&self) -> i64 {
        i64::from(self.remind_min) * 60
    }
}

/// An alert produced by a single transition, carrying the text to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// URL just crossed the failure threshold
    Down(String),
    /// URL is still down and the reminder cadence elapsed
    Reminder(String),
    /// URL just came back up
    Recovery(String),
}

impl Alert {
    pub fn text(&self) -> &str {
        match self {
            Alert::Down(text) | Alert::Reminder(text) | Alert::Recovery(text) => text,
        }
    }

    pub fn is_recovery(&self) -> bool {
        matches!(self, Alert::Recovery(_))
    }
}

/// Apply one probe outcome to an entry.
///
/// Returns the updated entry and the alert this transition produced,
/// if any. At most one alert is produced per probe:
/// - up -> down when the failure streak reaches the policy threshold
/// - a reminder when the URL is already down and the cadence elapsed
/// - down -> up on the first success, regardless of any threshold
///
/// `now` is epoch seconds. A reminder is due only when `now` has moved
/// at least the cadence past the last alert; a clock that moved
/// backwards therefore never triggers one.
pub fn apply(
    url: &str,
    entry: &UrlEntry,
    outcome: &CheckOutcome,
    now: i64,
    policy: &AlertPolicy,
) -> (UrlEntry, Option<Alert>) {
    let mut next = entry.clone();

    if outcome.is_ok() {
        next.consecutive_successes = next.consecutive_successes.saturating_add(1);
        next.consecutive_failures = 0;

        if entry.is_down() {
            next.status = UrlStatus::Up;
            next.last_change = now;
            return (next, Some(Alert::Recovery(format!("{url} recovered ✅"))));
        }
        return (next, None);
    }

    next.consecutive_failures = next.consecutive_failures.saturating_add(1);
    next.consecutive_successes = 0;

    if !entry.is_down() {
        if next.consecutive_failures >= policy.failure_threshold {
            next.status = UrlStatus::Down;
            next.last_change = now;
            next.last_down_alert = now;
            return (next, Some(Alert::Down(outcome.message().to_string())));
        }
        return (next, None);
    }

    if policy.remind_min > 0 && now - next.last_down_alert >= policy.remind_secs() {
        next.last_down_alert = now;
        let text = format!("{} (still down)", outcome.message());
        return (next, Some(Alert::Reminder(text)));
    }

    (next, None)
}
