// Infraction ledger — per-account count of rejected messages.
//
// Counts only go up. There is no decrement and no automatic consequence;
// the count is exposed so a suspension policy can be added on top later.

use std::sync::Arc;

use tracing::info;

use crate::db::Database;
use crate::error::{FeedbackError, FeedbackResult};

#[derive(Clone)]
pub struct InfractionLedger {
    db: Arc<dyn Database>,
}

impl InfractionLedger {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Record one infraction against `account_id` and return the new count.
    ///
    /// The storage layer performs the increment as a single atomic update,
    /// so concurrent rejections for the same sender are all counted.
    pub async fn increment(&self, account_id: i64) -> FeedbackResult<i64> {
        let count = self
            .db
            .increment_infractions(account_id)
            .await?
            .ok_or(FeedbackError::UnknownAccount(account_id))?;
        info!(account_id, infractions = count, "Recorded infraction");
        Ok(count)
    }

    /// Flag `message_id` malicious and charge its sender, in one storage
    /// transaction, returning the sender's new count.
    pub async fn record_rejection(&self, message_id: i64, account_id: i64) -> FeedbackResult<i64> {
        let count = self
            .db
            .reject_message(message_id, account_id)
            .await?
            .ok_or(FeedbackError::UnknownAccount(account_id))?;
        info!(account_id, message_id, infractions = count, "Recorded infraction");
        Ok(count)
    }

    /// Current infraction count for `account_id`.
    pub async fn count(&self, account_id: i64) -> FeedbackResult<i64> {
        self.db
            .get_account(account_id)
            .await?
            .map(|a| a.infraction_count)
            .ok_or(FeedbackError::UnknownAccount(account_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn test_increment_is_monotonic() {
        let db = db::open_in_memory().unwrap();
        let account = db
            .create_account("j.smith@northeastern.edu", "hash", false)
            .await
            .unwrap();
        let ledger = InfractionLedger::new(db);

        assert_eq!(ledger.count(account.id).await.unwrap(), 0);
        assert_eq!(ledger.increment(account.id).await.unwrap(), 1);
        assert_eq!(ledger.increment(account.id).await.unwrap(), 2);
        assert_eq!(ledger.count(account.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_record_rejection_flags_message() {
        use crate::db::models::{NewMessage, NewTeacher};

        let db = db::open_in_memory().unwrap();
        let account = db
            .create_account("j.smith@northeastern.edu", "hash", false)
            .await
            .unwrap();
        let teacher = db
            .create_teacher(&NewTeacher {
                name: "Amy Jones".to_string(),
                college: "Khoury".to_string(),
                email: "a.jones@northeastern.edu".to_string(),
            })
            .await
            .unwrap();
        let message = db
            .insert_message(&NewMessage {
                student_id: account.id,
                teacher_id: teacher.id,
                body: "nasty".to_string(),
            })
            .await
            .unwrap();
        let ledger = InfractionLedger::new(db.clone());

        assert_eq!(ledger.record_rejection(message.id, account.id).await.unwrap(), 1);
        assert!(db.get_message(message.id).await.unwrap().unwrap().is_malicious);

        let err = ledger.record_rejection(message.id, 999).await.unwrap_err();
        assert!(matches!(err, FeedbackError::UnknownAccount(999)));
        assert_eq!(ledger.count(account.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let ledger = InfractionLedger::new(db::open_in_memory().unwrap());
        let err = ledger.increment(42).await.unwrap_err();
        assert!(matches!(err, FeedbackError::UnknownAccount(42)));
    }
}
