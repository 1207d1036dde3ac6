//! Per-learner session state.
//!
//! A [`SessionState`] is created when a learner session starts and destroyed
//! when it ends; there is no cross-session persistence of learner models.
//! The state is mutated in exactly two places: appending a freshly classified
//! [`AssessmentRecord`], and applying the [`Action`] the strategy selector
//! returned for that history.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentRecord, Difficulty};
use crate::selector::{Action, ActionKind};

/// The pedagogical mode selected for the next teaching phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Mix approaches turn by turn; the default and the reinforcement mode.
    Adaptive,
    /// Guide through questions rather than statements.
    Socratic,
    /// Fully worked, maximally concrete examples.
    WorkedExamples,
    /// Let the learner explore and form hypotheses.
    Discovery,
    /// Plain stepwise exposition.
    DirectInstruction,
}

/// Mutable aggregate for one learner session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SessionState {
    /// The subject being taught (e.g. "Quantum Entanglement").
    pub topic: String,
    /// Ordered focus points produced by the lesson planner at session start.
    #[serde(default)]
    pub plan: Vec<String>,
    /// Chronological assessment history; never reordered.
    pub history: Vec<AssessmentRecord>,
    /// Current difficulty band.
    pub difficulty: Difficulty,
    /// Current teaching strategy.
    pub strategy: Strategy,
    /// Consecutive correct answers, reset on the first incorrect one.
    pub streak_correct: u32,
    /// Consecutive incorrect answers, reset on the first correct one.
    pub streak_incorrect: u32,
}

impl SessionState {
    /// Creates a fresh session. Difficulty starts at [`Difficulty::Beginner`]
    /// unless the intake classification chose otherwise.
    pub fn new(topic: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            topic: topic.into(),
            plan: Vec::new(),
            history: Vec::new(),
            difficulty,
            strategy: Strategy::Adaptive,
            streak_correct: 0,
            streak_incorrect: 0,
        }
    }

    /// Appends one assessment outcome and updates the streak counters.
    pub fn record(&mut self, record: AssessmentRecord) {
        if record.correct {
            self.streak_correct += 1;
            self.streak_incorrect = 0;
        } else {
            self.streak_incorrect += 1;
            self.streak_correct = 0;
        }
        self.history.push(record);
    }

    /// Applies a selector decision: steps the difficulty band and adopts the
    /// hinted strategy. A `start` action only sets the strategy.
    pub fn apply(&mut self, action: &Action) {
        if action.kind != ActionKind::Start {
            self.difficulty = self.difficulty.stepped(action.difficulty_delta);
        }
        self.strategy = action.strategy_hint;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{Confidence, DifficultyDelta};
    use crate::selector::decide;

    fn rec(correct: bool) -> AssessmentRecord {
        AssessmentRecord::new(correct, Confidence::High, Difficulty::Beginner)
    }

    #[test]
    fn new_session_has_defaults() {
        let s = SessionState::new("Gravity", Difficulty::Beginner);
        assert!(s.history.is_empty());
        assert_eq!(s.strategy, Strategy::Adaptive);
        assert_eq!(s.streak_correct, 0);
        assert_eq!(s.streak_incorrect, 0);
    }

    #[test]
    fn streaks_track_consecutive_outcomes() {
        let mut s = SessionState::new("Gravity", Difficulty::Beginner);
        s.record(rec(true));
        s.record(rec(true));
        assert_eq!(s.streak_correct, 2);
        assert_eq!(s.streak_incorrect, 0);

        s.record(rec(false));
        assert_eq!(s.streak_correct, 0);
        assert_eq!(s.streak_incorrect, 1);

        s.record(rec(true));
        assert_eq!(s.streak_correct, 1);
        assert_eq!(s.streak_incorrect, 0);
        assert_eq!(s.history.len(), 4);
    }

    #[test]
    fn apply_steps_difficulty_and_adopts_strategy() {
        let mut s = SessionState::new("Gravity", Difficulty::Beginner);
        for _ in 0..4 {
            s.record(rec(true));
        }
        let action = decide(&s.history, &s);
        s.apply(&action);
        assert_eq!(s.difficulty, Difficulty::Intermediate);
        assert_eq!(s.strategy, action.strategy_hint);
    }

    #[test]
    fn apply_saturates_at_band_edges() {
        use crate::selector::DecisionPolicy;
        let mut s = SessionState::new("Gravity", Difficulty::Beginner);
        s.record(rec(false));
        let action = DecisionPolicy::default().decide(&s.history, &s);
        assert_eq!(action.difficulty_delta, DifficultyDelta::Decrease);
        s.apply(&action);
        assert_eq!(s.difficulty, Difficulty::Beginner);
    }

    #[test]
    fn state_round_trips_through_json() {
        let mut s = SessionState::new("Gravity", Difficulty::Intermediate);
        s.plan = vec!["What gravity is".into(), "Orbits".into()];
        s.record(rec(true));
        let json = serde_json::to_string(&s).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
