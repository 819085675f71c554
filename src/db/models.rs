// Data models — Rust structs that map to database rows.
//
// Kept apart from the queries so the pipeline, search and web layers can use
// them without depending on rusqlite.

use serde::{Deserialize, Serialize};

/// A registered student account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentAccount {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Number of messages rejected as malicious. Only ever increases.
    pub infraction_count: i64,
    pub is_superuser: bool,
    /// Always true today; reserved for a future suspension policy.
    pub is_active: bool,
    pub created_at: String,
}

/// A teacher who can receive messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub college: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeacher {
    pub name: String,
    pub college: String,
    pub email: String,
}

/// Academic term a course runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    #[serde(rename = "FA")]
    Fall,
    #[serde(rename = "SP")]
    Spring,
    #[serde(rename = "S1")]
    Summer1,
    #[serde(rename = "S2")]
    Summer2,
}

impl Semester {
    pub fn code(&self) -> &'static str {
        match self {
            Semester::Fall => "FA",
            Semester::Spring => "SP",
            Semester::Summer1 => "S1",
            Semester::Summer2 => "S2",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "FA" => Some(Semester::Fall),
            "SP" => Some(Semester::Spring),
            "S1" => Some(Semester::Summer1),
            "S2" => Some(Semester::Summer2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Semester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub semester: Semester,
    pub year: Option<i32>,
    pub course_num: Option<i32>,
    pub subject: String,
}

impl Course {
    /// Display label: course number and name, e.g. "3500 Object-Oriented Design".
    pub fn label(&self) -> String {
        match self.course_num {
            Some(num) => format!("{num} {}", self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub semester: Semester,
    pub year: Option<i32>,
    pub course_num: Option<i32>,
    pub subject: String,
}

/// An anonymous message from a student to a teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub student_id: i64,
    pub teacher_id: i64,
    pub body: String,
    /// Set once when the classifier flags the message; never cleared.
    pub is_malicious: bool,
    /// When the email transport accepted the message (None if never sent).
    pub delivered_at: Option<String>,
    pub created_at: String,
}

/// A submitted message before it is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub student_id: i64,
    pub teacher_id: i64,
    pub body: String,
}

/// Aggregate counts for the status display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    pub accounts: i64,
    pub teachers: i64,
    pub courses: i64,
    pub messages: i64,
    pub malicious_messages: i64,
    pub delivered_messages: i64,
    pub total_infractions: i64,
}
