//! Best-effort WhatsApp alerting through the CallMeBot API.
//!
//! Delivery is fire-and-forget: a failed or rejected request is logged
//! and dropped, never propagated. A run that cannot alert still probes
//! and persists normally.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::{debug, warn};

const CALLMEBOT_ENDPOINT: &str = "https://api.callmebot.com/whatsapp.php";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Response bodies are logged when delivery fails, truncated to this
/// many characters.
const LOGGED_BODY_CHARS: usize = 200;

/// Trait for alert delivery backends
pub trait Notifier {
    /// Deliver one alert text, best-effort
    fn send(&self, text: &str);
}

struct Credentials {
    phone: String,
    apikey: String,
}

/// WhatsApp notifier backed by the CallMeBot gateway.
///
/// Credentials are optional: without both phone and API key the
/// notifier is disabled and `send` is a no-op.
pub struct CallMeBotNotifier {
    client: Client,
    credentials: Option<Credentials>,
}

impl CallMeBotNotifier {
    pub fn new(phone: Option<String>, apikey: Option<String>) -> Result<Self> {
        let credentials = match (phone, apikey) {
            (Some(phone), Some(apikey)) => Some(Credentials { phone, apikey }),
            _ => None,
        };

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create notification HTTP client")?;

        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }
}

impl Notifier for CallMeBotNotifier {
    fn send(&self, text: &str) {
        let credentials = match &self.credentials {
            Some(credentials) => credentials,
            None => {
                debug!("Notification credentials not configured; skipping alert");
                return;
            }
        };

        let result = self
            .client
            .get(CALLMEBOT_ENDPOINT)
            .query(&[
                ("phone", credentials.phone.as_str()),
                ("text", text),
                ("apikey", credentials.apikey.as_str()),
            ])
            .send();

        match result {
            Ok(response) if response.status().as_u16() >= 300 => {
                let status = response.status().as_u16();
                let body = response.text().unwrap_or_default();
                warn!(
                    status,
                    body = %truncate_chars(&body, LOGGED_BODY_CHARS),
                    "CallMeBot rejected alert"
                );
            }
            Ok(_) => debug!("Alert delivered"),
            Err(e) => warn!(error = %e, "CallMeBot request failed"),
        }
    }
}

/// Truncate on a character boundary so logged bodies stay valid UTF-8.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
