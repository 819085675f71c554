// Toxicity classification — trait-based abstraction over the scoring service.
//
// The Classifier trait is what the delivery pipeline depends on.
// PerspectiveClassifier implements it with Google's Perspective API; tests
// plug in fixed-score fakes.

pub mod perspective;
pub mod traits;

pub use perspective::PerspectiveClassifier;
pub use traits::{ClassificationScores, Classifier, MONITORED_ATTRIBUTES};
