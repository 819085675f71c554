// Student account registration.
//
// Only institutional addresses may register. Passwords are stored as
// "{salt_hex}${sha256_hex}" where the digest covers salt || password.

use std::sync::OnceLock;

use rand::RngCore;
use regex_lite::Regex;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::db::models::StudentAccount;
use crate::db::Database;
use crate::error::{FeedbackError, FeedbackResult};

fn institutional_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z]+\.[a-zA-Z]+@(northeastern|husky\.neu)\.edu$")
            .expect("institutional email pattern is valid")
    })
}

/// Is `email` a Northeastern address of the form first.last@northeastern.edu
/// (or @husky.neu.edu)?
pub fn is_institutional_email(email: &str) -> bool {
    institutional_email().is_match(email)
}

/// Create a student account.
pub async fn register(
    db: &dyn Database,
    email: &str,
    password: &str,
    is_superuser: bool,
) -> FeedbackResult<StudentAccount> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FeedbackError::MissingCredential("Email address"));
    }
    if password.is_empty() {
        return Err(FeedbackError::MissingCredential("Password"));
    }
    if !is_institutional_email(email) {
        return Err(FeedbackError::InvalidAccountIdentity(email.to_string()));
    }
    if db.get_account_by_email(email).await?.is_some() {
        return Err(FeedbackError::DuplicateAccount(email.to_string()));
    }

    let account = db
        .create_account(email, &hash_password(password), is_superuser)
        .await?;
    info!(account_id = account.id, superuser = is_superuser, "Registered account");
    Ok(account)
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);
    format!("{salt_hex}${}", digest(&salt_hex, password))
}

/// Check `password` against a stored account's hash.
pub fn verify_password(account: &StudentAccount, password: &str) -> bool {
    match account.password_hash.split_once('$') {
        Some((salt_hex, expected)) => constant_time_eq(&digest(salt_hex, password), expected),
        None => false,
    }
}

fn digest(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_institutional_email_pattern() {
        assert!(is_institutional_email("j.smith@northeastern.edu"));
        assert!(is_institutional_email("sepulveda.s@husky.neu.edu"));
        assert!(!is_institutional_email("x@gmail.com"));
        assert!(!is_institutional_email("jsmith@northeastern.edu"));
        assert!(!is_institutional_email("j.smith@northeasternXedu"));
        assert!(!is_institutional_email("j.smith@northeastern.edu.evil.com"));
    }

    #[test]
    fn test_password_hash_verifies() {
        let account = StudentAccount {
            id: 1,
            email: "j.smith@northeastern.edu".to_string(),
            password_hash: hash_password("hunter2"),
            infraction_count: 0,
            is_superuser: false,
            is_active: true,
            created_at: String::new(),
        };
        assert!(verify_password(&account, "hunter2"));
        assert!(!verify_password(&account, "hunter3"));
        // Salted: the same password hashes differently each time
        assert_ne!(hash_password("hunter2"), hash_password("hunter2"));
    }

    #[tokio::test]
    async fn test_register_validates_credentials() {
        let db = db::open_in_memory().unwrap();

        let err = register(db.as_ref(), "", "pw", false).await.unwrap_err();
        assert!(matches!(err, FeedbackError::MissingCredential(_)));

        let err = register(db.as_ref(), "j.smith@northeastern.edu", "", false)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::MissingCredential(_)));

        let err = register(db.as_ref(), "x@gmail.com", "pw", false)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::InvalidAccountIdentity(_)));

        let account = register(db.as_ref(), "j.smith@northeastern.edu", "pw", false)
            .await
            .unwrap();
        assert_eq!(account.infraction_count, 0);
        assert!(verify_password(&account, "pw"));

        let err = register(db.as_ref(), "J.Smith@northeastern.edu", "pw", false)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::DuplicateAccount(_)));
    }
}
