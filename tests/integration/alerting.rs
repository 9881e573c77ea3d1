//! Alerting behavior of full monitoring passes: debouncing, recovery,
//! reminder cadence and batching.

use chrono::Utc;
use tempfile::TempDir;

use upwatch::commands::check;

use crate::helpers::{
    down_entry, load_state, seed_state, test_config, RecordingNotifier, ScriptedProber,
};

const URL_A: &str = "https://a.example";
const URL_B: &str = "https://b.example";

#[test]
fn test_down_alert_only_after_threshold() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A], 2, 10);

    // First failure stays below the threshold: no alert, still up
    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A);
    let report = check::execute(&config, &prober, &notifier).unwrap();

    assert!(report.all_up());
    assert!(notifier.messages().is_empty());
    let state = load_state(&config);
    assert!(!state[URL_A].is_down());
    assert_eq!(state[URL_A].consecutive_failures, 1);

    // Second failure reaches the threshold: exactly one alert
    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A);
    let report = check::execute(&config, &prober, &notifier).unwrap();

    assert_eq!(report.down, 1);
    assert_eq!(
        notifier.messages(),
        vec![format!("⚠️ Uptime alert:\n{URL_A} returned 503")]
    );
    let state = load_state(&config);
    assert!(state[URL_A].is_down());
    assert_eq!(state[URL_A].consecutive_failures, 2);
}

#[test]
fn test_still_down_stays_silent_within_cadence() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A], 1, 10);
    seed_state(&config, &[(URL_A, down_entry(3, Utc::now().timestamp()))]);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A);
    let report = check::execute(&config, &prober, &notifier).unwrap();

    assert_eq!(report.down, 1);
    assert!(notifier.messages().is_empty());
}

#[test]
fn test_reminder_fires_after_cadence() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A], 1, 10);
    let stale = Utc::now().timestamp() - 3600;
    seed_state(&config, &[(URL_A, down_entry(3, stale))]);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A);
    check::execute(&config, &prober, &notifier).unwrap();

    assert_eq!(
        notifier.messages(),
        vec![format!("⚠️ Uptime alert:\n{URL_A} returned 503 (still down)")]
    );

    // The reminder re-arms the cadence
    let state = load_state(&config);
    assert!(state[URL_A].last_down_alert > stale);
}

#[test]
fn test_reminders_disabled_with_zero_cadence() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A], 1, 0);
    let stale = Utc::now().timestamp() - 86_400;
    seed_state(&config, &[(URL_A, down_entry(9, stale))]);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A);
    check::execute(&config, &prober, &notifier).unwrap();

    assert!(notifier.messages().is_empty());
    let state = load_state(&config);
    assert_eq!(state[URL_A].last_down_alert, stale);
}

#[test]
fn test_recovery_sends_separate_notification() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A], 1, 10);
    seed_state(&config, &[(URL_A, down_entry(5, Utc::now().timestamp()))]);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().ok(URL_A);
    let report = check::execute(&config, &prober, &notifier).unwrap();

    assert!(report.all_up());
    assert_eq!(
        notifier.messages(),
        vec![format!("✅ Recovery:\n{URL_A} recovered ✅")]
    );
    let state = load_state(&config);
    assert!(!state[URL_A].is_down());
    assert_eq!(state[URL_A].consecutive_successes, 1);
    assert_eq!(state[URL_A].consecutive_failures, 0);
}

#[test]
fn test_mixed_pass_batches_at_most_two_messages() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A, URL_B], 1, 10);
    seed_state(&config, &[(URL_B, down_entry(2, Utc::now().timestamp()))]);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A).ok(URL_B);
    let report = check::execute(&config, &prober, &notifier).unwrap();

    assert_eq!(report.down, 1);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0],
        format!("⚠️ Uptime alert:\n{URL_A} returned 503")
    );
    assert_eq!(messages[1], format!("✅ Recovery:\n{URL_B} recovered ✅"));
}

#[test]
fn test_down_batch_joins_in_configured_order() {
    let temp_dir = TempDir::new().unwrap();
    // B before A, so the batch order is probe order, not key order
    let config = test_config(temp_dir.path(), &[URL_B, URL_A], 1, 10);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A).fail(URL_B);
    check::execute(&config, &prober, &notifier).unwrap();

    assert_eq!(
        notifier.messages(),
        vec![format!(
            "⚠️ Uptime alert:\n{URL_B} returned 503\n{URL_A} returned 503"
        )]
    );
}

#[test]
fn test_flapping_url_alerts_on_each_transition() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A], 1, 10);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A);
    check::execute(&config, &prober, &notifier).unwrap();
    assert_eq!(notifier.messages().len(), 1);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().ok(URL_A);
    check::execute(&config, &prober, &notifier).unwrap();
    assert_eq!(
        notifier.messages(),
        vec![format!("✅ Recovery:\n{URL_A} recovered ✅")]
    );

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().fail(URL_A);
    check::execute(&config, &prober, &notifier).unwrap();
    assert_eq!(
        notifier.messages(),
        vec![format!("⚠️ Uptime alert:\n{URL_A} returned 503")]
    );
}

#[test]
fn test_fresh_url_starting_up_is_silent() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(temp_dir.path(), &[URL_A], 1, 10);

    let notifier = RecordingNotifier::new();
    let prober = ScriptedProber::new().ok(URL_A);
    let report = check::execute(&config, &prober, &notifier).unwrap();

    assert!(report.all_up());
    assert!(notifier.messages().is_empty());
    let state = load_state(&config);
    assert_eq!(state[URL_A].consecutive_successes, 1);
    assert_eq!(state[URL_A].last_change, 0);
}
