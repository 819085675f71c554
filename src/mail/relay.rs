// HTTP mail relay client.
//
// POSTs {from, to, subject, body} as JSON to the configured relay endpoint,
// with an optional bearer token. Any non-2xx status is a transport failure.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::traits::{Email, Mailer};
use crate::error::{FeedbackError, FeedbackResult};

pub struct RelayMailer {
    client: Client,
    url: String,
    token: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

impl RelayMailer {
    pub fn new(url: &str, token: Option<String>, from: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
            token: token.filter(|t| !t.is_empty()),
            from,
        })
    }
}

#[async_trait]
impl Mailer for RelayMailer {
    async fn send(&self, email: &Email) -> FeedbackResult<()> {
        let request = RelayRequest {
            from: &self.from,
            to: &email.to,
            subject: &email.subject,
            body: &email.body,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            FeedbackError::DeliveryTransportFailure(format!("Mail relay request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedbackError::DeliveryTransportFailure(format!(
                "Mail relay returned {status}: {body}"
            )));
        }

        debug!(to = %email.to, "Mail relay accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_ignored() {
        let mailer = RelayMailer::new(
            "http://localhost:8025/send",
            Some(String::new()),
            "noreply@nameless.local".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(mailer.token.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transport_failure() {
        let mailer = RelayMailer::new(
            "http://127.0.0.1:9/send",
            None,
            "noreply@nameless.local".to_string(),
            Duration::from_secs(2),
        )
        .unwrap();
        let email = Email {
            to: "j.smith@northeastern.edu".to_string(),
            subject: "hi".to_string(),
            body: "hello".to_string(),
        };
        let err = mailer.send(&email).await.unwrap_err();
        assert!(matches!(err, FeedbackError::DeliveryTransportFailure(_)));
    }
}
