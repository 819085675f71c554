// Domain errors surfaced by the moderation pipeline and account registration.
//
// Storage and CLI plumbing use anyhow like the rest of the crate; these are
// the outcomes callers need to tell apart (the web layer maps each one to a
// status code).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedbackError {
    /// The address is not a valid institutional email.
    #[error("Must give a valid Northeastern email address: {0}")]
    InvalidAccountIdentity(String),

    /// Email or password was empty at registration.
    #[error("{0} required")]
    MissingCredential(&'static str),

    #[error("An account already exists for {0}")]
    DuplicateAccount(String),

    #[error("No student account with id {0}")]
    UnknownAccount(i64),

    #[error("No teacher with id {0}")]
    UnknownTeacher(i64),

    #[error("Message body is empty")]
    EmptyMessage,

    /// A search query that cannot be turned into a name pattern.
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// The toxicity classifier could not produce scores (network, auth,
    /// timeout or malformed response). Messages are never delivered unscored.
    #[error("Toxicity classifier unavailable: {0}")]
    ClassificationUnavailable(String),

    /// The email transport refused or failed to take the message.
    #[error("Email delivery failed: {0}")]
    DeliveryTransportFailure(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type FeedbackResult<T> = std::result::Result<T, FeedbackError>;
