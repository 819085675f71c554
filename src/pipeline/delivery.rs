// Message delivery pipeline.
//
// Every submitted message is stored, classified exactly once, and then takes
// exactly one of two paths:
//   reject  -> flag the message malicious, add an infraction to the sender
//   accept  -> email the body to the teacher, stamp the delivery time
//
// Failures are closed: if the classifier is unavailable nothing is sent and
// nobody is penalized; if the mail transport fails the caller is told so.
// Nothing is retried.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::db::models::NewMessage;
use crate::db::Database;
use crate::error::{FeedbackError, FeedbackResult};
use crate::ledger::InfractionLedger;
use crate::mail::{Email, Mailer};
use crate::moderation::{self, Verdict};
use crate::toxicity::Classifier;

/// Subject line of every forwarded message.
pub const MESSAGE_SUBJECT: &str = "Message from one of your students";

/// Outcome of a submission that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryResult {
    /// Flagged as malicious; not forwarded. Carries the sender's updated count.
    Rejected {
        message_id: i64,
        new_infraction_count: i64,
    },
    /// Forwarded to the teacher's email address.
    Delivered { message_id: i64 },
}

#[derive(Clone)]
pub struct DeliveryPipeline {
    db: Arc<dyn Database>,
    classifier: Arc<dyn Classifier>,
    mailer: Arc<dyn Mailer>,
    ledger: InfractionLedger,
}

impl DeliveryPipeline {
    pub fn new(
        db: Arc<dyn Database>,
        classifier: Arc<dyn Classifier>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let ledger = InfractionLedger::new(db.clone());
        Self {
            db,
            classifier,
            mailer,
            ledger,
        }
    }

    pub fn ledger(&self) -> &InfractionLedger {
        &self.ledger
    }

    /// Screen a message and deliver it or reject it.
    pub async fn submit(&self, message: NewMessage) -> FeedbackResult<DeliveryResult> {
        if message.body.trim().is_empty() {
            return Err(FeedbackError::EmptyMessage);
        }
        if self.db.get_account(message.student_id).await?.is_none() {
            return Err(FeedbackError::UnknownAccount(message.student_id));
        }
        let teacher = self
            .db
            .get_teacher(message.teacher_id)
            .await?
            .ok_or(FeedbackError::UnknownTeacher(message.teacher_id))?;

        let stored = self.db.insert_message(&message).await?;

        let scores = match self.classifier.classify(&stored.body).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!(message_id = stored.id, error = %e, "Classification failed; message held");
                return Err(e);
            }
        };

        match moderation::decide(&scores) {
            Verdict::Reject => {
                let new_infraction_count = self
                    .ledger
                    .record_rejection(stored.id, stored.student_id)
                    .await?;
                warn!(
                    message_id = stored.id,
                    top_category = ?scores.max(),
                    infractions = new_infraction_count,
                    "Rejected malicious message"
                );
                Ok(DeliveryResult::Rejected {
                    message_id: stored.id,
                    new_infraction_count,
                })
            }
            Verdict::Accept => {
                let email = Email {
                    to: teacher.email.clone(),
                    subject: MESSAGE_SUBJECT.to_string(),
                    body: stored.body.clone(),
                };
                if let Err(e) = self.mailer.send(&email).await {
                    warn!(message_id = stored.id, error = %e, "Email transport failed");
                    return Err(e);
                }
                self.db.mark_delivered(stored.id).await?;
                info!(message_id = stored.id, teacher_id = teacher.id, "Delivered message");
                Ok(DeliveryResult::Delivered {
                    message_id: stored.id,
                })
            }
        }
    }

    /// Submit many independent messages, up to `concurrency` at a time.
    /// Results come back in input order.
    pub async fn submit_batch(
        &self,
        messages: Vec<NewMessage>,
        concurrency: usize,
    ) -> Vec<FeedbackResult<DeliveryResult>> {
        stream::iter(messages.into_iter().map(|m| self.submit(m)))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
