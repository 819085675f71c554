// Google Perspective API implementation of the Classifier trait.
//
// Every message body is sent once with the full MONITORED_ATTRIBUTES set.
// The API key and endpoint are passed in by the caller; the HTTP client
// carries a request timeout so a stalled call surfaces as
// ClassificationUnavailable instead of hanging the submission.
//
// API docs: https://developers.perspectiveapi.com/s/about-the-api-methods

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ClassificationScores, Classifier, MONITORED_ATTRIBUTES};
use crate::error::{FeedbackError, FeedbackResult};
use crate::output::truncate_chars;

pub const DEFAULT_PERSPECTIVE_URL: &str = "https://commentanalyzer.googleapis.com";

/// Perspective API classifier.
pub struct PerspectiveClassifier {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PerspectiveClassifier {
    /// Create a classifier for `base_url` authenticated with `api_key`.
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("nameless/0.1 (feedback-moderation)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/v1alpha1/comments:analyze?key={}",
            self.base_url, self.api_key
        )
    }
}

#[async_trait]
impl Classifier for PerspectiveClassifier {
    async fn classify(&self, text: &str) -> FeedbackResult<ClassificationScores> {
        if text.trim().is_empty() {
            return Err(FeedbackError::EmptyMessage);
        }

        let response = self
            .client
            .post(self.analyze_url())
            .json(&build_request(text))
            .send()
            .await
            .map_err(|e| unavailable(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| unavailable(&e))?;
        check_status(status, &body)?;

        let scores = parse_response(&body)?;

        debug!(
            categories = scores.len(),
            max = ?scores.max(),
            text_preview = %truncate_chars(text, 50),
            "Classified message"
        );

        Ok(scores)
    }
}

fn unavailable(e: &reqwest::Error) -> FeedbackError {
    let reason = if e.is_timeout() {
        "Perspective API request timed out".to_string()
    } else {
        format!("Failed to call Perspective API: {e}")
    };
    FeedbackError::ClassificationUnavailable(reason)
}

/// A non-2xx reply (bad key, quota, outage) means no scores.
pub fn check_status(status: StatusCode, body: &str) -> FeedbackResult<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(FeedbackError::ClassificationUnavailable(format!(
        "Perspective API returned {status}: {}",
        truncate_chars(body, 200)
    )))
}

/// Build the analyze request body for `text`.
pub fn build_request(text: &str) -> PerspectiveRequest {
    PerspectiveRequest {
        comment: Comment {
            text: text.to_string(),
        },
        requested_attributes: MONITORED_ATTRIBUTES
            .iter()
            .map(|attr| (attr.to_string(), AttributeConfig {}))
            .collect(),
        languages: vec!["en".to_string()],
    }
}

/// Parse a raw analyze response into per-category summary scores.
///
/// Every monitored attribute must be scored; a response missing any of them
/// is treated as unavailable rather than as benign.
pub fn parse_response(body: &str) -> FeedbackResult<ClassificationScores> {
    let response: PerspectiveResponse = serde_json::from_str(body).map_err(|e| {
        FeedbackError::ClassificationUnavailable(format!(
            "Failed to parse Perspective API response: {e}"
        ))
    })?;

    let missing: Vec<&str> = MONITORED_ATTRIBUTES
        .iter()
        .copied()
        .filter(|attr| !response.attribute_scores.contains_key(*attr))
        .collect();
    if !missing.is_empty() {
        return Err(FeedbackError::ClassificationUnavailable(format!(
            "Perspective API response missing scores for {}",
            missing.join(", ")
        )));
    }

    Ok(response
        .attribute_scores
        .into_iter()
        .map(|(category, score)| (category, score.summary_score.value))
        .collect())
}

// --- Perspective API request/response types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectiveRequest {
    comment: Comment,
    requested_attributes: HashMap<String, AttributeConfig>,
    languages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Comment {
    text: String,
}

#[derive(Debug, Serialize)]
struct AttributeConfig {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PerspectiveResponse {
    attribute_scores: HashMap<String, AttributeScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_asks_for_every_monitored_attribute() {
        let json = serde_json::to_value(build_request("hello")).unwrap();
        assert_eq!(json["comment"]["text"], "hello");
        assert_eq!(json["languages"][0], "en");
        let attrs = json["requestedAttributes"].as_object().unwrap();
        assert_eq!(attrs.len(), MONITORED_ATTRIBUTES.len());
        assert!(attrs.contains_key("IDENTITY_ATTACK"));
    }

    fn full_response(toxicity: f64, insult: f64) -> String {
        let mut scores = serde_json::Map::new();
        for attr in MONITORED_ATTRIBUTES {
            let value = match attr {
                "TOXICITY" => toxicity,
                "INSULT" => insult,
                _ => 0.02,
            };
            scores.insert(
                attr.to_string(),
                serde_json::json!({"spanScores": [], "summaryScore": {"value": value, "type": "PROBABILITY"}}),
            );
        }
        serde_json::json!({"attributeScores": scores, "languages": ["en"]}).to_string()
    }

    #[test]
    fn test_parse_summary_scores() {
        let scores = parse_response(&full_response(0.91, 0.12)).unwrap();
        assert_eq!(scores.len(), MONITORED_ATTRIBUTES.len());
        assert_eq!(scores.get("TOXICITY"), Some(0.91));
        assert_eq!(scores.get("INSULT"), Some(0.12));
    }

    #[test]
    fn test_empty_scores_are_unavailable() {
        let err = parse_response(r#"{"attributeScores": {}}"#).unwrap_err();
        assert!(matches!(err, FeedbackError::ClassificationUnavailable(_)));
    }

    #[test]
    fn test_missing_attribute_is_unavailable() {
        let body = r#"{
            "attributeScores": {
                "TOXICITY": {"summaryScore": {"value": 0.05, "type": "PROBABILITY"}}
            }
        }"#;
        let FeedbackError::ClassificationUnavailable(reason) = parse_response(body).unwrap_err()
        else {
            panic!("expected ClassificationUnavailable");
        };
        assert!(reason.contains("THREAT"));
        assert!(reason.contains("INSULT"));
    }

    #[test]
    fn test_non_success_status_is_unavailable() {
        assert!(check_status(StatusCode::OK, "{}").is_ok());
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let err = check_status(status, "API key not valid").unwrap_err();
            assert!(matches!(err, FeedbackError::ClassificationUnavailable(_)));
        }
    }

    #[test]
    fn test_malformed_response_is_unavailable() {
        let err = parse_response(r#"{"error": "bad key"}"#).unwrap_err();
        assert!(matches!(err, FeedbackError::ClassificationUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_a_request() {
        // Port 9 (discard) would fail the request if one were made.
        let classifier =
            PerspectiveClassifier::new("http://127.0.0.1:9", "key".into(), Duration::from_secs(1))
                .unwrap();
        let err = classifier.classify("   ").await.unwrap_err();
        assert!(matches!(err, FeedbackError::EmptyMessage));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let classifier =
            PerspectiveClassifier::new("http://127.0.0.1:9", "key".into(), Duration::from_secs(2))
                .unwrap();
        let err = classifier.classify("hello there").await.unwrap_err();
        assert!(matches!(err, FeedbackError::ClassificationUnavailable(_)));
    }

    /// Serve one canned HTTP reply on a local port and return its base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Drain the request (headers, then Content-Length bytes of body)
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let reply = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_rejected_key_is_unavailable() {
        let url = serve_once(
            "403 Forbidden",
            r#"{"error": {"code": 403, "message": "API key not valid"}}"#,
        )
        .await;
        let classifier =
            PerspectiveClassifier::new(&url, "bad-key".into(), Duration::from_secs(5)).unwrap();
        let FeedbackError::ClassificationUnavailable(reason) =
            classifier.classify("hello there").await.unwrap_err()
        else {
            panic!("expected ClassificationUnavailable");
        };
        assert!(reason.contains("403"));
    }

    #[tokio::test]
    async fn test_scored_reply_is_parsed() {
        let url = serve_once(
            "200 OK",
            r#"{"attributeScores": {
                "TOXICITY": {"summaryScore": {"value": 0.8}},
                "SEVERE_TOXICITY": {"summaryScore": {"value": 0.1}},
                "IDENTITY_ATTACK": {"summaryScore": {"value": 0.1}},
                "INSULT": {"summaryScore": {"value": 0.6}},
                "PROFANITY": {"summaryScore": {"value": 0.1}},
                "THREAT": {"summaryScore": {"value": 0.1}}
            }}"#,
        )
        .await;
        let classifier =
            PerspectiveClassifier::new(&url, "key".into(), Duration::from_secs(5)).unwrap();
        let scores = classifier.classify("hello there").await.unwrap();
        assert_eq!(scores.get("TOXICITY"), Some(0.8));
        assert_eq!(scores.len(), 6);
    }
}
