//! Mastery tracker / strategy selector.
//!
//! This is the adaptive-difficulty decision loop: a pure function from an
//! ordered assessment history to the next pedagogical action. It owns no
//! state, performs no I/O, and contains no randomness, so replaying the same
//! history always yields the same action. The caller applies the returned
//! difficulty delta to its [`SessionState`](crate::session::SessionState)
//! and decides how much history to pass in (this module does not window).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::assessment::{AssessmentRecord, Difficulty, DifficultyDelta};
use crate::session::{SessionState, Strategy};

/// The kind of pedagogical move to make next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// No history yet; open the session. The only initial-state transition.
    Start,
    /// Understanding is strong; move to harder material.
    Advance,
    /// Understanding is partial; restate at the same difficulty.
    Reinforce,
    /// The learner is struggling; drop to more concrete material.
    Simplify,
}

/// The selector's verdict for one decision point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Action {
    pub kind: ActionKind,
    /// Adjustment the caller should apply to the session difficulty.
    pub difficulty_delta: DifficultyDelta,
    /// Suggested teaching strategy for the next phase.
    pub strategy_hint: Strategy,
    /// Short human-readable justification, suitable for logs and for the
    /// content generator to expand into learner-facing text.
    pub rationale: String,
}

/// Classification thresholds and strategy hints as plain data.
///
/// Keeping the policy in a value rather than scattered conditionals lets the
/// bands be unit-tested (and eventually configured) independently of the
/// selector mechanics. The defaults carry the production numbers: closed
/// lower bounds at 0.8 and 0.5, evaluated in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    /// Success rate at or above which the learner advances.
    pub advance_at: f64,
    /// Success rate at or above which material is reinforced instead.
    pub reinforce_at: f64,
    /// Hint for the session-start action.
    pub start_hint: Strategy,
    /// Hint when advancing below the top difficulty band.
    pub advance_hint: Strategy,
    /// Hint when advancing while already at [`Difficulty::Advanced`]:
    /// difficulty saturates, so autonomy comes from the questioning mode.
    pub advance_hint_at_top: Strategy,
    pub reinforce_hint: Strategy,
    pub simplify_hint: Strategy,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            advance_at: 0.8,
            reinforce_at: 0.5,
            start_hint: Strategy::Adaptive,
            advance_hint: Strategy::Discovery,
            advance_hint_at_top: Strategy::Socratic,
            reinforce_hint: Strategy::Adaptive,
            simplify_hint: Strategy::WorkedExamples,
        }
    }
}

impl DecisionPolicy {
    /// Decides the next pedagogical action for the supplied history.
    ///
    /// The success rate is computed over the whole slice; an empty slice is
    /// the defined start case, never an error. Bands are evaluated top-down
    /// with closed lower bounds, so a rate of exactly 0.8 advances and
    /// exactly 0.5 reinforces.
    pub fn decide(&self, history: &[AssessmentRecord], session: &SessionState) -> Action {
        if history.is_empty() {
            return Action {
                kind: ActionKind::Start,
                difficulty_delta: DifficultyDelta::Maintain,
                strategy_hint: self.start_hint,
                rationale: "no assessments yet; beginning the learning session".to_string(),
            };
        }

        let total = history.len();
        let correct = history.iter().filter(|r| r.correct).count();
        let success_rate = correct as f64 / total as f64;

        if success_rate >= self.advance_at {
            let strategy_hint = if session.difficulty == Difficulty::Advanced {
                self.advance_hint_at_top
            } else {
                self.advance_hint
            };
            Action {
                kind: ActionKind::Advance,
                difficulty_delta: DifficultyDelta::Increase,
                strategy_hint,
                rationale: format!(
                    "{correct}/{total} correct; understanding is strong, introduce harder material"
                ),
            }
        } else if success_rate >= self.reinforce_at {
            Action {
                kind: ActionKind::Reinforce,
                difficulty_delta: DifficultyDelta::Maintain,
                strategy_hint: self.reinforce_hint,
                rationale: format!(
                    "{correct}/{total} correct; understanding is partial, restate with different examples"
                ),
            }
        } else {
            Action {
                kind: ActionKind::Simplify,
                difficulty_delta: DifficultyDelta::Decrease,
                strategy_hint: self.simplify_hint,
                rationale: format!(
                    "{correct}/{total} correct; the learner is struggling, break the concept down"
                ),
            }
        }
    }
}

/// Convenience wrapper over [`DecisionPolicy::default`].
pub fn decide(history: &[AssessmentRecord], session: &SessionState) -> Action {
    DecisionPolicy::default().decide(history, session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Confidence;

    fn session(difficulty: Difficulty) -> SessionState {
        SessionState::new("Quantum Entanglement", difficulty)
    }

    fn history(outcomes: &[bool]) -> Vec<AssessmentRecord> {
        outcomes
            .iter()
            .map(|&correct| {
                AssessmentRecord::new(correct, Confidence::High, Difficulty::Beginner)
            })
            .collect()
    }

    #[test]
    fn empty_history_starts_regardless_of_session() {
        let mut s = session(Difficulty::Advanced);
        s.streak_incorrect = 7;
        let action = decide(&[], &s);
        assert_eq!(action.kind, ActionKind::Start);
        assert_eq!(action.difficulty_delta, DifficultyDelta::Maintain);
        assert_eq!(action.strategy_hint, Strategy::Adaptive);
    }

    #[test]
    fn high_success_rate_advances() {
        let h = history(&[true, true, true, true, false]);
        let action = decide(&h, &session(Difficulty::Beginner));
        assert_eq!(action.kind, ActionKind::Advance);
        assert_eq!(action.difficulty_delta, DifficultyDelta::Increase);
        assert_eq!(action.strategy_hint, Strategy::Discovery);
    }

    #[test]
    fn advance_at_top_band_hints_socratic() {
        let h = history(&[true, true, true, true]);
        let action = decide(&h, &session(Difficulty::Advanced));
        assert_eq!(action.kind, ActionKind::Advance);
        assert_eq!(action.strategy_hint, Strategy::Socratic);
    }

    #[test]
    fn low_success_rate_simplifies() {
        let h = history(&[false, true, false, false]);
        let action = decide(&h, &session(Difficulty::Intermediate));
        assert_eq!(action.kind, ActionKind::Simplify);
        assert_eq!(action.difficulty_delta, DifficultyDelta::Decrease);
        assert_eq!(action.strategy_hint, Strategy::WorkedExamples);
    }

    #[test]
    fn exact_advance_boundary_is_closed() {
        // 4/5 = 0.8 exactly.
        let h = history(&[true, true, true, true, false]);
        let action = decide(&h, &session(Difficulty::Beginner));
        assert_eq!(action.kind, ActionKind::Advance);
        assert_eq!(action.difficulty_delta, DifficultyDelta::Increase);
    }

    #[test]
    fn exact_reinforce_boundary_is_closed() {
        // 1/2 = 0.5 exactly.
        let h = history(&[true, false]);
        let action = decide(&h, &session(Difficulty::Beginner));
        assert_eq!(action.kind, ActionKind::Reinforce);
        assert_eq!(action.difficulty_delta, DifficultyDelta::Maintain);
    }

    #[test]
    fn three_of_four_correct_reinforces() {
        // 0.75 sits inside the reinforce band.
        let h = history(&[true, true, true, false]);
        let action = decide(&h, &session(Difficulty::Beginner));
        assert_eq!(action.kind, ActionKind::Reinforce);
        assert_eq!(action.strategy_hint, Strategy::Adaptive);
    }

    #[test]
    fn identical_inputs_yield_identical_actions() {
        let h = history(&[true, false, true, true, false, true]);
        let s = session(Difficulty::Intermediate);
        let first = decide(&h, &s);
        let second = decide(&h, &s);
        assert_eq!(first, second);
    }

    #[test]
    fn single_record_histories_hit_the_outer_bands() {
        let s = session(Difficulty::Beginner);
        assert_eq!(decide(&history(&[true]), &s).kind, ActionKind::Advance);
        assert_eq!(decide(&history(&[false]), &s).kind, ActionKind::Simplify);
    }
}
