// Unit tests for the fuzzy name matcher.
//
// Ordered-token matching, empty queries, literal punctuation, and the
// storage-order guarantee.

use nameless::error::FeedbackError;
use nameless::search::{pattern_source, search, tokenize, NamePattern, MAX_QUERY_CHARS};

fn names(list: &[&'static str]) -> Vec<&'static str> {
    list.to_vec()
}

#[test]
fn ordered_tokens_with_gaps() {
    let entities = names(&["John Smith", "Amy Jones", "Joanna Smithson"]);
    let found = search(entities, |n| *n, "jo sm").unwrap();
    assert_eq!(found, vec!["John Smith", "Joanna Smithson"]);
}

#[test]
fn token_order_matters() {
    let entities = names(&["Samuel Jo", "John Smith"]);
    let found = search(entities, |n| *n, "jo sm").unwrap();
    assert_eq!(found, vec!["John Smith"]);
}

#[test]
fn missing_token_rejects() {
    let found = search(names(&["Amy Jones"]), |n| *n, "jo sm").unwrap();
    assert!(found.is_empty());
}

#[test]
fn empty_query_matches_everything() {
    let entities = names(&["John Smith", "Amy Jones", ""]);
    assert_eq!(search(entities.clone(), |n| *n, "").unwrap().len(), 3);
    assert_eq!(search(entities, |n| *n, "   \t ").unwrap().len(), 3);
}

#[test]
fn empty_query_tokenizes_to_nothing() {
    assert!(tokenize("").is_empty());
    assert_eq!(pattern_source("  "), ".*");
}

#[test]
fn match_is_case_insensitive() {
    let found = search(names(&["JOHN SMITH", "john smith"]), |n| *n, "John Smith").unwrap();
    assert_eq!(found.len(), 2);
}

#[test]
fn accented_names_fold_case() {
    let found = search(names(&["JOSÉ ÁLVAREZ", "Jose Alvarez"]), |n| *n, "josé álvarez").unwrap();
    assert_eq!(found, vec!["JOSÉ ÁLVAREZ"]);
}

#[test]
fn very_long_query_is_an_error_not_a_panic() {
    let query = "ab ".repeat(83_333);
    let err = search(names(&["Amy Jones"]), |n| *n, &query).unwrap_err();
    assert!(matches!(err, FeedbackError::InvalidQuery(_)));

    let just_over = "x".repeat(MAX_QUERY_CHARS + 1);
    assert!(NamePattern::build(&just_over).is_err());
}

#[test]
fn apostrophe_matches_literally() {
    let entities = names(&["Conor O'Brien", "Conor OBrien"]);
    let found = search(entities, |n| *n, "O'Brien").unwrap();
    assert_eq!(found, vec!["Conor O'Brien"]);
}

#[test]
fn regex_metacharacters_match_literally() {
    let entities = names(&["Intro to C++", "Intro to C", "Topics (Advanced)", "Topics Advanced"]);

    assert_eq!(search(entities.clone(), |n| *n, "c++").unwrap(), vec!["Intro to C++"]);
    assert_eq!(
        search(entities.clone(), |n| *n, "(advanced)").unwrap(),
        vec!["Topics (Advanced)"]
    );
    // "." is a literal dot, not "any character"
    assert!(search(entities, |n| *n, "c.").unwrap().is_empty());
}

#[test]
fn star_and_dollar_are_literal() {
    let pattern = NamePattern::build("a*b $5").unwrap();
    assert!(pattern.is_match("xa*b costs $5 now"));
    assert!(!pattern.is_match("aaab costs 5"));
}

#[test]
fn match_is_not_anchored() {
    let pattern = NamePattern::build("smith").unwrap();
    assert!(pattern.is_match("Dr. John Smith III"));
}

#[test]
fn input_order_is_preserved() {
    let entities = names(&["Joanna Smithson", "John Smith", "Jo Smart"]);
    let found = search(entities, |n| *n, "jo sm").unwrap();
    assert_eq!(found, vec!["Joanna Smithson", "John Smith", "Jo Smart"]);
}

#[derive(Debug, Clone, PartialEq)]
struct Course {
    code: u32,
    title: String,
}

#[test]
fn works_over_any_name_field() {
    let courses = vec![
        Course {
            code: 3500,
            title: "Object-Oriented Design".to_string(),
        },
        Course {
            code: 2500,
            title: "Fundamentals of Computer Science".to_string(),
        },
    ];
    let found = search(courses, |c| c.title.as_str(), "obj des").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, 3500);
}
