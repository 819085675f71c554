// Moderation decision — turns classifier scores into accept / reject.
//
// The policy is fixed: a message is malicious when any monitored category
// scores strictly above MALICIOUS_THRESHOLD.

use serde::{Deserialize, Serialize};

use crate::toxicity::ClassificationScores;

/// Scores strictly above this value mark a message as malicious.
pub const MALICIOUS_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accept => "accept",
            Verdict::Reject => "reject",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decide whether a message with these scores may be delivered.
pub fn decide(scores: &ClassificationScores) -> Verdict {
    if scores.iter().any(|(_, score)| score > MALICIOUS_THRESHOLD) {
        Verdict::Reject
    } else {
        Verdict::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> ClassificationScores {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_exact_threshold_is_accepted() {
        assert_eq!(decide(&scores(&[("TOXICITY", 0.7)])), Verdict::Accept);
    }

    #[test]
    fn test_any_category_over_threshold_rejects() {
        let s = scores(&[("TOXICITY", 0.1), ("THREAT", 0.71), ("INSULT", 0.0)]);
        assert_eq!(decide(&s), Verdict::Reject);
    }

    #[test]
    fn test_no_scores_accepts() {
        assert_eq!(decide(&ClassificationScores::new()), Verdict::Accept);
    }
}
