// Database trait — backend-agnostic async interface for all DB operations.
//
// The pipeline, ledger, search and web layers only see `Arc<dyn Database>`.
// Methods are async so a blocking backend (rusqlite behind a Mutex) and a
// natively async one fit the same interface.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{
    Course, Message, NewCourse, NewMessage, NewTeacher, StoreStats, StudentAccount, Teacher,
};
use crate::search::NamePattern;

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Student accounts ---

    /// Store a new account (email must be validated by the caller).
    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        is_superuser: bool,
    ) -> Result<StudentAccount>;

    async fn get_account(&self, id: i64) -> Result<Option<StudentAccount>>;

    async fn get_account_by_email(&self, email: &str) -> Result<Option<StudentAccount>>;

    /// Atomically add one infraction and return the new count.
    /// None if the account doesn't exist.
    async fn increment_infractions(&self, account_id: i64) -> Result<Option<i64>>;

    // --- Teachers and courses ---

    async fn create_teacher(&self, teacher: &NewTeacher) -> Result<Teacher>;

    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>>;

    /// Teachers whose name matches the pattern, in storage order.
    async fn find_teachers_by_name(&self, pattern: &NamePattern) -> Result<Vec<Teacher>>;

    async fn create_course(&self, course: &NewCourse) -> Result<Course>;

    async fn link_course_teacher(&self, course_id: i64, teacher_id: i64) -> Result<()>;

    /// Courses whose name matches the pattern, in storage order.
    async fn find_courses_by_name(&self, pattern: &NamePattern) -> Result<Vec<Course>>;

    async fn get_course_teachers(&self, course_id: i64) -> Result<Vec<Teacher>>;

    // --- Messages ---

    async fn insert_message(&self, message: &NewMessage) -> Result<Message>;

    async fn get_message(&self, id: i64) -> Result<Option<Message>>;

    /// Flag the message malicious and add one infraction to `account_id`
    /// atomically; both happen or neither does. Returns the new count, or
    /// None if the message or account doesn't exist.
    async fn reject_message(&self, message_id: i64, account_id: i64) -> Result<Option<i64>>;

    async fn mark_delivered(&self, message_id: i64) -> Result<bool>;

    // --- Stats ---

    async fn store_stats(&self) -> Result<StoreStats>;
}
