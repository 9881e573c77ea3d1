//! The monitoring pass: probe every configured URL once, apply the
//! up/down transitions, send batched alerts and persist the snapshot.

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use std::collections::BTreeMap;

use crate::config::MonitorConfig;
use crate::engine::{self, Alert};
use crate::models::UrlEntry;
use crate::notify::Notifier;
use crate::probe::Prober;
use crate::state::StateStore;

/// Aggregate result of one pass; the binary maps it to the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub total: usize,
    pub down: usize,
}

impl CheckReport {
    pub fn all_up(&self) -> bool {
        self.down == 0
    }
}

/// Run one monitoring pass.
///
/// URLs are probed sequentially in configured order, all transitions
/// sharing one clock reading. Down and reminder texts are batched into
/// a single notification and recoveries into a second one, so a pass
/// sends at most two messages. The snapshot is written
/// unconditionally, even when nothing changed.
pub fn execute(
    config: &MonitorConfig,
    prober: &dyn Prober,
    notifier: &dyn Notifier,
) -> Result<CheckReport> {
    let store = StateStore::new(config.state_file.clone(), config.schema_version.clone());
    let previous = store.load();
    let policy = config.alert_policy();
    let now = Utc::now().timestamp();

    let mut updated: BTreeMap<String, UrlEntry> = BTreeMap::new();
    let mut down_alerts: Vec<String> = Vec::new();
    let mut recovery_alerts: Vec<String> = Vec::new();

    for url in &config.urls {
        let entry = previous.get(url).cloned().unwrap_or_default();
        let outcome = prober.check(url);

        let mark = if outcome.is_ok() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("{} {}", mark, outcome.message());

        let (next, alert) = engine::apply(url, &entry, &outcome, now, &policy);
        println!("  {}", format!("{entry} -> {next}").dimmed());

        match alert {
            Some(Alert::Down(text)) | Some(Alert::Reminder(text)) => down_alerts.push(text),
            Some(Alert::Recovery(text)) => recovery_alerts.push(text),
            None => {}
        }

        updated.insert(url.clone(), next);
    }

    if !down_alerts.is_empty() {
        notifier.send(&format!("⚠️ Uptime alert:\n{}", down_alerts.join("\n")));
    }
    if !recovery_alerts.is_empty() {
        notifier.send(&format!("✅ Recovery:\n{}", recovery_alerts.join("\n")));
    }

    store.save(&updated, Utc::now().timestamp())?;

    let down = updated.values().filter(|entry| entry.is_down()).count();
    let report = CheckReport {
        total: updated.len(),
        down,
    };

    if report.all_up() {
        println!("All checks passed ✅");
    } else {
        println!(
            "{} {} of {} URLs down",
            "✗".red(),
            report.down,
            report.total
        );
    }

    Ok(report)
}
