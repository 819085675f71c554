// Database queries — CRUD operations for all tables.
//
// Every SQL statement lives here; the rest of the crate goes through the
// Database trait, which the SQLite backend implements by calling these.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::models::{
    Course, Message, NewCourse, NewMessage, NewTeacher, Semester, StoreStats, StudentAccount,
    Teacher,
};
use crate::search::NamePattern;

// --- Student accounts ---

/// Insert a new account and return its id. Fails on duplicate email.
pub fn insert_account(
    conn: &Connection,
    email: &str,
    password_hash: &str,
    is_superuser: bool,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO student_accounts (email, password_hash, is_superuser)
         VALUES (?1, ?2, ?3)",
        params![email, password_hash, is_superuser],
    )
    .with_context(|| format!("Failed to create account for {email}"))?;
    Ok(conn.last_insert_rowid())
}

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, infraction_count, is_superuser, is_active, created_at";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<StudentAccount> {
    Ok(StudentAccount {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        infraction_count: row.get(3)?,
        is_superuser: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

pub fn get_account(conn: &Connection, id: i64) -> Result<Option<StudentAccount>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM student_accounts WHERE id = ?1");
    let account = conn
        .query_row(&sql, params![id], account_from_row)
        .optional()?;
    Ok(account)
}

/// Look up an account by email (case-insensitive).
pub fn get_account_by_email(conn: &Connection, email: &str) -> Result<Option<StudentAccount>> {
    let sql =
        format!("SELECT {ACCOUNT_COLUMNS} FROM student_accounts WHERE LOWER(email) = LOWER(?1)");
    let account = conn
        .query_row(&sql, params![email], account_from_row)
        .optional()?;
    Ok(account)
}

/// Add one infraction to an account and return the new count.
///
/// A single UPDATE ... RETURNING, so the read and the write cannot be
/// interleaved with another increment. Returns None for an unknown account.
pub fn increment_infractions(conn: &Connection, account_id: i64) -> Result<Option<i64>> {
    let count = conn
        .query_row(
            "UPDATE student_accounts
             SET infraction_count = infraction_count + 1
             WHERE id = ?1
             RETURNING infraction_count",
            params![account_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(count)
}

// --- Teachers ---

pub fn insert_teacher(conn: &Connection, teacher: &NewTeacher) -> Result<i64> {
    conn.execute(
        "INSERT INTO teachers (name, college, email) VALUES (?1, ?2, ?3)",
        params![teacher.name, teacher.college, teacher.email],
    )
    .with_context(|| format!("Failed to add teacher {}", teacher.name))?;
    Ok(conn.last_insert_rowid())
}

fn teacher_from_row(row: &Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: row.get(0)?,
        name: row.get(1)?,
        college: row.get(2)?,
        email: row.get(3)?,
    })
}

pub fn get_teacher(conn: &Connection, id: i64) -> Result<Option<Teacher>> {
    let teacher = conn
        .query_row(
            "SELECT id, name, college, email FROM teachers WHERE id = ?1",
            params![id],
            teacher_from_row,
        )
        .optional()?;
    Ok(teacher)
}

/// All teachers whose name matches `pattern`, in id order.
///
/// SQLite has no built-in REGEXP, so rows are filtered in Rust.
pub fn find_teachers_by_name(conn: &Connection, pattern: &NamePattern) -> Result<Vec<Teacher>> {
    let mut stmt = conn.prepare("SELECT id, name, college, email FROM teachers ORDER BY id")?;
    let rows = stmt.query_map([], teacher_from_row)?;

    let mut teachers = Vec::new();
    for row in rows {
        let teacher = row?;
        if pattern.is_match(&teacher.name) {
            teachers.push(teacher);
        }
    }
    Ok(teachers)
}

// --- Courses ---

pub fn insert_course(conn: &Connection, course: &NewCourse) -> Result<i64> {
    conn.execute(
        "INSERT INTO courses (name, semester, year, course_num, subject)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            course.name,
            course.semester.code(),
            course.year,
            course.course_num,
            course.subject,
        ],
    )
    .with_context(|| format!("Failed to add course {}", course.name))?;
    Ok(conn.last_insert_rowid())
}

/// Record that `teacher_id` teaches `course_id`. Linking twice is a no-op.
pub fn link_course_teacher(conn: &Connection, course_id: i64, teacher_id: i64) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO course_teachers (course_id, teacher_id) VALUES (?1, ?2)",
        params![course_id, teacher_id],
    )?;
    Ok(())
}

fn course_from_row(row: &Row<'_>) -> rusqlite::Result<Course> {
    let code: String = row.get(2)?;
    let semester = Semester::from_code(&code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown semester code {code}").into(),
        )
    })?;
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        semester,
        year: row.get(3)?,
        course_num: row.get(4)?,
        subject: row.get(5)?,
    })
}

/// All courses whose name matches `pattern`, in id order.
pub fn find_courses_by_name(conn: &Connection, pattern: &NamePattern) -> Result<Vec<Course>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, semester, year, course_num, subject FROM courses ORDER BY id",
    )?;
    let rows = stmt.query_map([], course_from_row)?;

    let mut courses = Vec::new();
    for row in rows {
        let course = row?;
        if pattern.is_match(&course.name) {
            courses.push(course);
        }
    }
    Ok(courses)
}

/// Teachers linked to a course, in id order.
pub fn get_course_teachers(conn: &Connection, course_id: i64) -> Result<Vec<Teacher>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.college, t.email
         FROM teachers t
         JOIN course_teachers ct ON ct.teacher_id = t.id
         WHERE ct.course_id = ?1
         ORDER BY t.id",
    )?;
    let rows = stmt.query_map(params![course_id], teacher_from_row)?;

    let mut teachers = Vec::new();
    for row in rows {
        teachers.push(row?);
    }
    Ok(teachers)
}

// --- Messages ---

/// Store a submitted message (not malicious, not delivered) and return it.
pub fn insert_message(conn: &Connection, message: &NewMessage) -> Result<Message> {
    conn.execute(
        "INSERT INTO messages (student_id, teacher_id, body) VALUES (?1, ?2, ?3)",
        params![message.student_id, message.teacher_id, message.body],
    )
    .context("Failed to store message")?;
    let id = conn.last_insert_rowid();
    get_message(conn, id)?.context("Message vanished after insert")
}

pub fn get_message(conn: &Connection, id: i64) -> Result<Option<Message>> {
    let message = conn
        .query_row(
            "SELECT id, student_id, teacher_id, body, is_malicious, delivered_at, created_at
             FROM messages WHERE id = ?1",
            params![id],
            |row| {
                Ok(Message {
                    id: row.get(0)?,
                    student_id: row.get(1)?,
                    teacher_id: row.get(2)?,
                    body: row.get(3)?,
                    is_malicious: row.get(4)?,
                    delivered_at: row.get(5)?,
                    created_at: row.get(6)?,
                })
            },
        )
        .optional()?;
    Ok(message)
}

/// Flag a message as malicious. There is no statement that clears the flag.
/// Returns false if the message doesn't exist.
pub fn mark_malicious(conn: &Connection, message_id: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE messages SET is_malicious = 1 WHERE id = ?1",
        params![message_id],
    )?;
    Ok(updated > 0)
}

/// Flag a message malicious and charge its sender one infraction, as one
/// transaction. Returns the sender's new count, or None (and changes
/// nothing) if either the message or the account is missing.
pub fn reject_message(conn: &Connection, message_id: i64, account_id: i64) -> Result<Option<i64>> {
    let tx = conn.unchecked_transaction()?;
    if !mark_malicious(&tx, message_id)? {
        return Ok(None);
    }
    let Some(count) = increment_infractions(&tx, account_id)? else {
        return Ok(None);
    };
    tx.commit().context("Failed to commit rejection")?;
    Ok(Some(count))
}

/// Stamp the delivery time on a message the transport accepted.
pub fn mark_delivered(conn: &Connection, message_id: i64) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE messages SET delivered_at = datetime('now')
         WHERE id = ?1 AND delivered_at IS NULL AND is_malicious = 0",
        params![message_id],
    )?;
    Ok(updated > 0)
}

// --- Stats ---

pub fn store_stats(conn: &Connection) -> Result<StoreStats> {
    let stats = conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM student_accounts),
            (SELECT COUNT(*) FROM teachers),
            (SELECT COUNT(*) FROM courses),
            (SELECT COUNT(*) FROM messages),
            (SELECT COUNT(*) FROM messages WHERE is_malicious = 1),
            (SELECT COUNT(*) FROM messages WHERE delivered_at IS NOT NULL),
            (SELECT COALESCE(SUM(infraction_count), 0) FROM student_accounts)",
        [],
        |row| {
            Ok(StoreStats {
                accounts: row.get(0)?,
                teachers: row.get(1)?,
                courses: row.get(2)?,
                messages: row.get(3)?,
                malicious_messages: row.get(4)?,
                delivered_messages: row.get(5)?,
                total_infractions: row.get(6)?,
            })
        },
    )?;
    Ok(stats)
}
