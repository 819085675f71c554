// Fuzzy name search for teachers and courses.
//
// A query like "jo sm" becomes the pattern `.*jo.*sm.*`: every
// whitespace-separated token must appear in the name, in order, with
// anything in between. Tokens are escaped so punctuation matches literally.
//
// regex-lite only folds ASCII case, so both the query and each name are
// lowercased with Unicode rules before matching ("JOSÉ" finds "José").

use regex_lite::{Regex, RegexBuilder};

use crate::db::models::{Course, Teacher};
use crate::db::Database;
use crate::error::{FeedbackError, FeedbackResult};

/// Longest query (in characters) accepted for a name search.
pub const MAX_QUERY_CHARS: usize = 256;

/// Split a query into its non-empty whitespace-separated tokens.
pub fn tokenize(query: &str) -> Vec<&str> {
    query.split_whitespace().collect()
}

/// A compiled match predicate built from a free-text query.
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    /// Build the pattern for `query`. A query with no tokens matches any name.
    pub fn build(query: &str) -> FeedbackResult<Self> {
        let length = query.chars().count();
        if length > MAX_QUERY_CHARS {
            return Err(FeedbackError::InvalidQuery(format!(
                "{length} characters (limit {MAX_QUERY_CHARS})"
            )));
        }

        let source = pattern_source(&query.to_lowercase());
        let regex = RegexBuilder::new(&source)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| FeedbackError::InvalidQuery(e.to_string()))?;
        Ok(Self { regex })
    }

    /// Does this pattern match anywhere within `name`?
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(&name.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// The regex source for a query: `.*` then each escaped token followed by `.*`.
pub fn pattern_source(query: &str) -> String {
    tokenize(query)
        .into_iter()
        .fold(String::from(".*"), |mut acc, token| {
            acc.push_str(&regex_lite::escape(token));
            acc.push_str(".*");
            acc
        })
}

/// Keep the entities whose name (as read by `name_of`) matches `query`,
/// preserving input order.
pub fn search<T, F>(
    entities: impl IntoIterator<Item = T>,
    name_of: F,
    query: &str,
) -> FeedbackResult<Vec<T>>
where
    F: Fn(&T) -> &str,
{
    let pattern = NamePattern::build(query)?;
    Ok(filter_by_pattern(entities, name_of, &pattern))
}

/// Like [`search`], with a pattern that has already been built.
pub fn filter_by_pattern<T, F>(
    entities: impl IntoIterator<Item = T>,
    name_of: F,
    pattern: &NamePattern,
) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    entities
        .into_iter()
        .filter(|e| pattern.is_match(name_of(e)))
        .collect()
}

/// Teachers whose name fuzzily matches `query`, in storage order.
pub async fn search_teachers(db: &dyn Database, query: &str) -> FeedbackResult<Vec<Teacher>> {
    let pattern = NamePattern::build(query)?;
    Ok(db.find_teachers_by_name(&pattern).await?)
}

/// Courses whose name fuzzily matches `query`, in storage order.
pub async fn search_courses(db: &dyn Database, query: &str) -> FeedbackResult<Vec<Course>> {
    let pattern = NamePattern::build(query)?;
    Ok(db.find_courses_by_name(&pattern).await?)
}
