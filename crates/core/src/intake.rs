//! Learning-request intake classification.
//!
//! Reads the learner's opening request and derives a starting profile:
//! preferred presentation style and initial difficulty band. The policy is
//! an ordered table of substring cues rather than branching code, so the
//! wording the classifier reacts to is data. First matching rule wins,
//! mirroring how a request like "explain it like I'm a kid with an example"
//! should resolve to the kid-oriented outcome, not the example-oriented one.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assessment::Difficulty;

/// How material should be presented to this learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LearningStyle {
    /// Default presentation: descriptions and imagery.
    Visual,
    /// Lean on analogies and relatable comparisons.
    Analogical,
}

/// Starting profile derived from the learner's own words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LearnerProfile {
    pub style: LearningStyle,
    pub starting_difficulty: Difficulty,
    /// Whether the first explanation should open with an analogy.
    pub wants_analogy: bool,
}

/// One intake rule: if any cue appears in the request, the outcome applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRule {
    pub cues: Vec<String>,
    pub style: Option<LearningStyle>,
    pub difficulty: Option<Difficulty>,
}

/// Ordered rule table for classifying opening requests.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    rules: Vec<IntakeRule>,
    default_style: LearningStyle,
    default_difficulty: Difficulty,
}

impl Default for RequestClassifier {
    /// The production rule set: audience cues first, then presentation
    /// cues, then depth cues.
    fn default() -> Self {
        let rule = |cues: &[&str], style, difficulty| IntakeRule {
            cues: cues.iter().map(|c| c.to_string()).collect(),
            style,
            difficulty,
        };
        Self {
            rules: vec![
                rule(
                    &["10-year-old", "kid", "child"],
                    Some(LearningStyle::Analogical),
                    Some(Difficulty::Beginner),
                ),
                rule(
                    &["example", "simple"],
                    Some(LearningStyle::Analogical),
                    None,
                ),
                rule(
                    &["detailed", "technical"],
                    None,
                    Some(Difficulty::Advanced),
                ),
            ],
            default_style: LearningStyle::Visual,
            default_difficulty: Difficulty::Intermediate,
        }
    }
}

impl RequestClassifier {
    pub fn new(
        rules: Vec<IntakeRule>,
        default_style: LearningStyle,
        default_difficulty: Difficulty,
    ) -> Self {
        Self {
            rules,
            default_style,
            default_difficulty,
        }
    }

    /// Classifies an opening request. Unmatched text falls through to the
    /// defaults; this never fails.
    pub fn classify(&self, request: &str) -> LearnerProfile {
        let lower = request.to_lowercase();
        let matched = self
            .rules
            .iter()
            .find(|rule| rule.cues.iter().any(|cue| lower.contains(cue.as_str())));

        let style = matched
            .and_then(|r| r.style)
            .unwrap_or(self.default_style);
        let starting_difficulty = matched
            .and_then(|r| r.difficulty)
            .unwrap_or(self.default_difficulty);
        let wants_analogy =
            lower.contains("analogy") || starting_difficulty == Difficulty::Beginner;

        LearnerProfile {
            style,
            starting_difficulty,
            wants_analogy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_cues_win_over_later_rules() {
        let c = RequestClassifier::default();
        let p = c.classify("Can you explain quantum entanglement to a 10-year-old with examples?");
        assert_eq!(p.style, LearningStyle::Analogical);
        assert_eq!(p.starting_difficulty, Difficulty::Beginner);
        assert!(p.wants_analogy);
    }

    #[test]
    fn simple_request_keeps_default_difficulty() {
        let c = RequestClassifier::default();
        let p = c.classify("Give me a simple explanation please");
        assert_eq!(p.style, LearningStyle::Analogical);
        assert_eq!(p.starting_difficulty, Difficulty::Intermediate);
        assert!(!p.wants_analogy);
    }

    #[test]
    fn technical_request_starts_advanced() {
        let c = RequestClassifier::default();
        let p = c.classify("I want the detailed technical treatment");
        assert_eq!(p.style, LearningStyle::Visual);
        assert_eq!(p.starting_difficulty, Difficulty::Advanced);
    }

    #[test]
    fn unmatched_text_falls_through_to_defaults() {
        let c = RequestClassifier::default();
        let p = c.classify("Teach me about gravity");
        assert_eq!(p.style, LearningStyle::Visual);
        assert_eq!(p.starting_difficulty, Difficulty::Intermediate);
        assert!(!p.wants_analogy);
    }

    #[test]
    fn explicit_analogy_request_is_honored() {
        let c = RequestClassifier::default();
        let p = c.classify("Explain it with an analogy");
        assert!(p.wants_analogy);
    }
}
