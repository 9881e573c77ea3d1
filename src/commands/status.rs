//! Read-only view of the persisted snapshot.
//!
//! Renders the entries the last monitoring pass wrote, without probing
//! anything or touching the file. Useful to inspect what the next pass
//! will start from.

use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use std::path::PathBuf;

use crate::models::UrlStatus;
use crate::state::StateStore;

pub fn execute(state_file: PathBuf, schema_version: String) -> Result<()> {
    let store = StateStore::new(state_file, schema_version);

    let snapshot = match store.read() {
        Some(snapshot) => snapshot,
        None => {
            println!(
                "{} No usable snapshot at {}",
                "ℹ".blue(),
                store.path().display()
            );
            return Ok(());
        }
    };

    let age = Utc::now().timestamp() - snapshot.saved_at;
    println!(
        "Snapshot written {} ({} ago), {} URLs",
        format_epoch(snapshot.saved_at),
        format_age(age),
        snapshot.urls.len()
    );
    println!();

    println!(
        "{:50} {:6} {:8} {:22} {:22}",
        "URL".bold(),
        "STATUS".bold(),
        "STREAK".bold(),
        "LAST CHANGE".bold(),
        "LAST ALERT".bold()
    );
    println!("{}", "─".repeat(112));

    for (url, entry) in &snapshot.urls {
        let status = match entry.status {
            UrlStatus::Up => "up".green(),
            UrlStatus::Down => "down".red(),
        };

        println!(
            "{:50} {:6} {:8} {:22} {:22}",
            url.cyan(),
            status,
            entry.streak(),
            format_epoch(entry.last_change),
            format_epoch(entry.last_down_alert)
        );
    }

    Ok(())
}

/// Render epoch seconds for display; 0 means "never" and shows as `-`.
fn format_epoch(ts: i64) -> String {
    if ts == 0 {
        return "-".to_string();
    }
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => "-".to_string(),
    }
}

fn format_age(secs: i64) -> String {
    if secs < 60 {
        format!("{}s", secs.max(0))
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86_400)
    }
}
