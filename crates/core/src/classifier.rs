//! Response classification.
//!
//! Turns a learner's raw answer into an [`AssessmentRecord`]. Multiple-choice
//! answers are graded by exact case-insensitive match against the canonical
//! key; open-ended answers are scored by counting configured key-terms in the
//! free text. The scoring policy is an ordered rule table
//! ([`ScoringBand`]s), not scattered conditionals, so it can be tested and
//! tuned independently of wording choices.
//!
//! Key-term overlap is a coarse proxy for understanding. It is explicitly
//! not natural-language understanding; unmatched text scores as zero terms
//! rather than failing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::CoachError;
use crate::assessment::{AssessmentRecord, Confidence, Difficulty};

/// The shape of question being graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    OpenEnded,
}

impl FromStr for QuestionType {
    type Err = CoachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multiple_choice" => Ok(QuestionType::MultipleChoice),
            "open_ended" => Ok(QuestionType::OpenEnded),
            other => Err(CoachError::InvalidInput(format!(
                "unrecognized question type: '{other}'"
            ))),
        }
    }
}

/// One row of the open-ended scoring table: matching at least `min_terms`
/// key-terms yields this outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringBand {
    pub min_terms: usize,
    pub confidence: Confidence,
    pub correct: bool,
}

/// Grades learner answers against a configured key-term set.
#[derive(Debug, Clone)]
pub struct ResponseClassifier {
    key_terms: Vec<String>,
    bands: Vec<ScoringBand>,
}

impl ResponseClassifier {
    /// Builds a classifier with the production scoring bands: three or more
    /// matched terms count as solid understanding, one or two as partial
    /// (still graded incorrect), none as a miss.
    pub fn new(key_terms: Vec<String>) -> Self {
        Self::with_bands(
            key_terms,
            vec![
                ScoringBand {
                    min_terms: 3,
                    confidence: Confidence::High,
                    correct: true,
                },
                ScoringBand {
                    min_terms: 1,
                    confidence: Confidence::Partial,
                    correct: false,
                },
                ScoringBand {
                    min_terms: 0,
                    confidence: Confidence::Low,
                    correct: false,
                },
            ],
        )
    }

    /// Builds a classifier with a custom rule table. Bands are evaluated in
    /// order; the first whose `min_terms` is met wins, so they should be
    /// listed from strictest to loosest.
    pub fn with_bands(key_terms: Vec<String>, bands: Vec<ScoringBand>) -> Self {
        Self { key_terms, bands }
    }

    /// Grades one answer and stamps the record with the difficulty band the
    /// question was asked at.
    pub fn classify(
        &self,
        answer: &str,
        key: &str,
        question_type: QuestionType,
        question_difficulty: Difficulty,
    ) -> AssessmentRecord {
        match question_type {
            QuestionType::MultipleChoice => {
                // Exact match, no partial credit.
                let correct = answer.trim().eq_ignore_ascii_case(key.trim());
                let confidence = if correct {
                    Confidence::High
                } else {
                    Confidence::Low
                };
                AssessmentRecord::new(correct, confidence, question_difficulty)
            }
            QuestionType::OpenEnded => {
                let matched = self.matched_terms(answer);
                let band = self
                    .bands
                    .iter()
                    .find(|b| matched >= b.min_terms)
                    .cloned()
                    .unwrap_or(ScoringBand {
                        min_terms: 0,
                        confidence: Confidence::Low,
                        correct: false,
                    });
                AssessmentRecord::new(band.correct, band.confidence, question_difficulty)
            }
        }
    }

    /// Counts how many configured key-terms appear in the answer.
    pub fn matched_terms(&self, answer: &str) -> usize {
        let lower = answer.to_lowercase();
        self.key_terms
            .iter()
            .filter(|term| lower.contains(&term.to_lowercase()))
            .count()
    }
}
