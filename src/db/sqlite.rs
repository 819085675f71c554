// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// The lock is never held across an .await, and every write holds it for the
// whole statement, so increments on one account are serialized.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{
    Course, Message, NewCourse, NewMessage, NewTeacher, StoreStats, StudentAccount, Teacher,
};
use super::queries;
use super::traits::Database;
use crate::search::NamePattern;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        is_superuser: bool,
    ) -> Result<StudentAccount> {
        let conn = self.conn.lock().await;
        let id = queries::insert_account(&conn, email, password_hash, is_superuser)?;
        queries::get_account(&conn, id)?.context("Account vanished after insert")
    }

    async fn get_account(&self, id: i64) -> Result<Option<StudentAccount>> {
        let conn = self.conn.lock().await;
        queries::get_account(&conn, id)
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<StudentAccount>> {
        let conn = self.conn.lock().await;
        queries::get_account_by_email(&conn, email)
    }

    async fn increment_infractions(&self, account_id: i64) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        queries::increment_infractions(&conn, account_id)
    }

    async fn create_teacher(&self, teacher: &NewTeacher) -> Result<Teacher> {
        let conn = self.conn.lock().await;
        let id = queries::insert_teacher(&conn, teacher)?;
        queries::get_teacher(&conn, id)?.context("Teacher vanished after insert")
    }

    async fn get_teacher(&self, id: i64) -> Result<Option<Teacher>> {
        let conn = self.conn.lock().await;
        queries::get_teacher(&conn, id)
    }

    async fn find_teachers_by_name(&self, pattern: &NamePattern) -> Result<Vec<Teacher>> {
        let conn = self.conn.lock().await;
        queries::find_teachers_by_name(&conn, pattern)
    }

    async fn create_course(&self, course: &NewCourse) -> Result<Course> {
        let conn = self.conn.lock().await;
        let id = queries::insert_course(&conn, course)?;
        Ok(Course {
            id,
            name: course.name.clone(),
            semester: course.semester,
            year: course.year,
            course_num: course.course_num,
            subject: course.subject.clone(),
        })
    }

    async fn link_course_teacher(&self, course_id: i64, teacher_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        queries::link_course_teacher(&conn, course_id, teacher_id)
    }

    async fn find_courses_by_name(&self, pattern: &NamePattern) -> Result<Vec<Course>> {
        let conn = self.conn.lock().await;
        queries::find_courses_by_name(&conn, pattern)
    }

    async fn get_course_teachers(&self, course_id: i64) -> Result<Vec<Teacher>> {
        let conn = self.conn.lock().await;
        queries::get_course_teachers(&conn, course_id)
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message> {
        let conn = self.conn.lock().await;
        queries::insert_message(&conn, message)
    }

    async fn get_message(&self, id: i64) -> Result<Option<Message>> {
        let conn = self.conn.lock().await;
        queries::get_message(&conn, id)
    }

    async fn reject_message(&self, message_id: i64, account_id: i64) -> Result<Option<i64>> {
        let conn = self.conn.lock().await;
        queries::reject_message(&conn, message_id, account_id)
    }

    async fn mark_delivered(&self, message_id: i64) -> Result<bool> {
        let conn = self.conn.lock().await;
        queries::mark_delivered(&conn, message_id)
    }

    async fn store_stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().await;
        queries::store_stats(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::create_tables;
    use std::sync::Arc;

    async fn test_db() -> SqliteDatabase {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        SqliteDatabase::new(conn)
    }

    #[tokio::test]
    async fn test_trait_table_count() {
        let db = test_db().await;
        assert_eq!(db.table_count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_trait_account_roundtrip() {
        let db = test_db().await;
        let account = db
            .create_account("j.smith@northeastern.edu", "hash", false)
            .await
            .unwrap();
        assert_eq!(account.infraction_count, 0);
        let loaded = db.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(loaded.email, "j.smith@northeastern.edu");
        assert!(db.get_account(account.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_trait_concurrent_increments_are_not_lost() {
        let db = Arc::new(test_db().await);
        let account = db
            .create_account("j.smith@northeastern.edu", "hash", false)
            .await
            .unwrap();

        let id = account.id;
        let mut handles = Vec::new();
        for _ in 0..50 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                db.increment_infractions(id).await.unwrap()
            }));
        }
        let mut counts = Vec::new();
        for h in handles {
            counts.push(h.await.unwrap().unwrap());
        }
        counts.sort();

        // Every increment saw a distinct value: 1..=50
        assert_eq!(counts, (1..=50).collect::<Vec<i64>>());
        let account = db.get_account(id).await.unwrap().unwrap();
        assert_eq!(account.infraction_count, 50);
    }

    #[tokio::test]
    async fn test_trait_teacher_search() {
        let db = test_db().await;
        for (name, email) in [
            ("John Smith", "j.smith@northeastern.edu"),
            ("Samuel Jo", "s.jo@northeastern.edu"),
        ] {
            db.create_teacher(&NewTeacher {
                name: name.to_string(),
                college: "Khoury".to_string(),
                email: email.to_string(),
            })
            .await
            .unwrap();
        }
        let found = db
            .find_teachers_by_name(&NamePattern::build("jo sm").unwrap())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "John Smith");
    }
}
