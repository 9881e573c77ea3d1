//! HTTP availability probing.
//!
//! A probe is a single GET with a timeout and an optional body-content
//! check. Every failure mode (HTTP error status, missing content,
//! timeout, DNS, refused connection) collapses into a failed outcome
//! carrying a human-readable message; probing never returns an error.

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;

/// Some origins serve bot-looking clients a 403; probes present as a
/// regular browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml";

/// Result of probing one URL: did the check pass, and the message
/// describing what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed { message: String },
    Failed { message: String },
}

impl CheckOutcome {
    pub fn passed(message: String) -> Self {
        CheckOutcome::Passed { message }
    }

    pub fn failed(message: String) -> Self {
        CheckOutcome::Failed { message }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CheckOutcome::Passed { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CheckOutcome::Passed { message } | CheckOutcome::Failed { message } => message,
        }
    }
}

/// Trait for URL probing backends
///
/// The monitoring pass only consumes outcomes, so tests can script
/// probes without a network.
pub trait Prober {
    /// Probe a single URL once
    fn check(&self, url: &str) -> CheckOutcome;
}

/// Production prober: blocking GET with browser headers, following
/// redirects, with the configured request timeout.
pub struct HttpProber {
    client: Client,
    expect: Option<Regex>,
}

impl HttpProber {
    /// Build the prober with a per-request timeout in seconds and an
    /// optional pattern the response body must match.
    pub fn new(timeout_secs: u64, expect: Option<Regex>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeout_secs))
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .context("Failed to create probe HTTP client")?;

        Ok(Self { client, expect })
    }
}

impl Prober for HttpProber {
    fn check(&self, url: &str) -> CheckOutcome {
        let response = match self.client.get(url).header(ACCEPT, ACCEPT_HTML).send() {
            Ok(response) => response,
            Err(e) => return CheckOutcome::failed(format!("{url} error: {e}")),
        };

        let status = response.status().as_u16();

        // The body is only needed for the content check
        let body = if self.expect.is_some() && status < 400 {
            match response.text() {
                Ok(body) => body,
                Err(e) => return CheckOutcome::failed(format!("{url} error: {e}")),
            }
        } else {
            String::new()
        };

        evaluate_response(url, status, &body, self.expect.as_ref())
    }
}

/// Classify a response: error statuses fail first, then the expected
/// content is required when a pattern is configured.
pub fn evaluate_response(
    url: &str,
    status: u16,
    body: &str,
    expect: Option<&Regex>,
) -> CheckOutcome {
    if status >= 400 {
        return CheckOutcome::failed(format!("{url} returned {status}"));
    }

    if let Some(pattern) = expect {
        if !pattern.is_match(body) {
            return CheckOutcome::failed(format!("{url} missing expected content"));
        }
    }

    CheckOutcome::passed(format!("{url} OK ({status})"))
}
