pub mod messages;
pub mod search;
pub mod teachers;
