use std::env;
use std::time::Duration;

use anyhow::Result;

use crate::toxicity::perspective::DEFAULT_PERSPECTIVE_URL;

/// Central configuration loaded from environment variables.
///
/// Secrets come from env vars (never hardcoded). The .env file is loaded at
/// startup via dotenvy.
#[derive(Clone)]
pub struct Config {
    pub db_path: String,
    pub perspective_api_key: String,
    /// Perspective API base URL (overridable for testing against a stub)
    pub perspective_url: String,
    /// Upper bound on a single classifier request
    pub classifier_timeout: Duration,
    /// HTTP mail relay endpoint. Messages cannot be delivered without one.
    pub mail_relay_url: Option<String>,
    pub mail_relay_token: Option<String>,
    pub mail_from: String,
    /// Upper bound on a single hand-off to the mail relay
    pub mail_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let classifier_timeout =
            parse_timeout("CLASSIFIER_TIMEOUT_SECS", env::var("CLASSIFIER_TIMEOUT_SECS").ok())?;
        let mail_timeout = parse_timeout("MAIL_TIMEOUT_SECS", env::var("MAIL_TIMEOUT_SECS").ok())?;

        Ok(Self {
            db_path: env::var("NAMELESS_DB_PATH").unwrap_or_else(|_| "./nameless.db".to_string()),
            perspective_api_key: env::var("PERSPECTIVE_API_KEY").unwrap_or_default(),
            perspective_url: env::var("PERSPECTIVE_URL")
                .unwrap_or_else(|_| DEFAULT_PERSPECTIVE_URL.to_string()),
            classifier_timeout,
            mail_relay_url: env::var("MAIL_RELAY_URL").ok().filter(|u| !u.is_empty()),
            mail_relay_token: env::var("MAIL_RELAY_TOKEN").ok(),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@nameless.local".to_string()),
            mail_timeout,
        })
    }

    /// Check that the Perspective API key is configured.
    /// Call this before any operation that classifies messages.
    pub fn require_perspective(&self) -> Result<()> {
        if self.perspective_api_key.is_empty() {
            anyhow::bail!(
                "PERSPECTIVE_API_KEY not set. Add it to your .env file.\n\
                 Messages cannot be screened (or delivered) without it."
            );
        }
        Ok(())
    }

    /// The mail relay endpoint, or an error if none is configured.
    /// Call this before any operation that delivers messages.
    pub fn require_mail_relay(&self) -> Result<&str> {
        match self.mail_relay_url.as_deref() {
            Some(url) => Ok(url),
            None => anyhow::bail!(
                "MAIL_RELAY_URL not set. Add it to your .env file.\n\
                 Accepted messages cannot be delivered without a mail transport."
            ),
        }
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Parse a `*_TIMEOUT_SECS` value, defaulting when unset.
fn parse_timeout(name: &str, raw: Option<String>) -> Result<Duration> {
    let secs = match raw {
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            anyhow::anyhow!("{name} must be a whole number of seconds, got {raw:?}")
        })?,
        None => DEFAULT_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs))
}
