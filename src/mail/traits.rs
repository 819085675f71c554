// Mailer trait and the email envelope.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::FeedbackResult;

/// A single outgoing email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Sends email. Each call is attempted once; a failure is reported as
/// `FeedbackError::DeliveryTransportFailure`.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> FeedbackResult<()>;
}
