//! Assessment outcome types.
//!
//! One [`AssessmentRecord`] is produced per question-answer exchange and
//! appended to the session history in chronological order. Records are
//! immutable once created; the strategy selector only ever reads them.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Content difficulty band for a session or a single question.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Moves one band in the direction of `delta`, saturating at the ends.
    pub fn stepped(self, delta: DifficultyDelta) -> Difficulty {
        use Difficulty::*;
        match delta {
            DifficultyDelta::Maintain => self,
            DifficultyDelta::Increase => match self {
                Beginner => Intermediate,
                Intermediate | Advanced => Advanced,
            },
            DifficultyDelta::Decrease => match self {
                Advanced => Intermediate,
                Intermediate | Beginner => Beginner,
            },
        }
    }
}

/// Requested adjustment to the session difficulty, emitted by the selector
/// and applied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyDelta {
    Increase,
    Maintain,
    Decrease,
}

/// How confident the classifier is that the learner understood the material.
///
/// For open-ended answers this is derived from key-term overlap, which is a
/// coarse proxy for understanding, not language comprehension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Partial,
    Low,
}

/// The evaluated outcome of one question-answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssessmentRecord {
    /// Whether the answer was judged correct.
    pub correct: bool,
    /// Classifier confidence in the judgement.
    pub confidence: Confidence,
    /// Ordering key; insertion order equals chronological order.
    pub timestamp: DateTime<Utc>,
    /// Difficulty band the question was asked at.
    pub question_difficulty: Difficulty,
}

impl AssessmentRecord {
    pub fn new(correct: bool, confidence: Confidence, question_difficulty: Difficulty) -> Self {
        Self {
            correct,
            confidence,
            timestamp: Utc::now(),
            question_difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_steps_up_and_saturates() {
        assert_eq!(
            Difficulty::Beginner.stepped(DifficultyDelta::Increase),
            Difficulty::Intermediate
        );
        assert_eq!(
            Difficulty::Intermediate.stepped(DifficultyDelta::Increase),
            Difficulty::Advanced
        );
        assert_eq!(
            Difficulty::Advanced.stepped(DifficultyDelta::Increase),
            Difficulty::Advanced
        );
    }

    #[test]
    fn difficulty_steps_down_and_saturates() {
        assert_eq!(
            Difficulty::Advanced.stepped(DifficultyDelta::Decrease),
            Difficulty::Intermediate
        );
        assert_eq!(
            Difficulty::Beginner.stepped(DifficultyDelta::Decrease),
            Difficulty::Beginner
        );
    }

    #[test]
    fn maintain_is_identity() {
        for d in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Advanced,
        ] {
            assert_eq!(d.stepped(DifficultyDelta::Maintain), d);
        }
    }

    #[test]
    fn difficulty_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Beginner).unwrap(),
            "\"beginner\""
        );
        let d: Difficulty = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(d, Difficulty::Advanced);
    }
}
