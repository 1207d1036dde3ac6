//! Coach tool service.
//!
//! Exposes the decision core to an external LLM runtime through MCP tools.
//! The model drives the tutoring loop by calling these tools; the service
//! owns the per-session state and is the single place that mutates it. All
//! heavy lifting (phrasing explanations, picking analogies) stays with the
//! model; the tools only classify, track, and decide.

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use crate::CoachError;
use crate::classifier::{QuestionType, ResponseClassifier};
use crate::intake::RequestClassifier;
use crate::selector::DecisionPolicy;
use crate::session::SessionState;

// --- Tool argument types ---

/// Arguments for the `analyze_learning_request` tool.
#[derive(Deserialize, JsonSchema, Debug)]
pub struct AnalyzeRequestArgs {
    /// The learner's opening request, in their own words.
    #[schemars(description = "The learner's initial question or request, verbatim")]
    pub request: String,
}

/// Arguments for the `record_assessment` tool.
#[derive(Deserialize, JsonSchema, Debug)]
pub struct RecordAssessmentArgs {
    /// The learner's answer, verbatim.
    #[schemars(description = "The learner's answer, verbatim")]
    pub answer: String,
    /// Canonical answer key; required for multiple-choice questions.
    #[schemars(description = "The canonical correct answer (required for multiple_choice)")]
    pub key: Option<String>,
    /// Question shape: 'multiple_choice' or 'open_ended'.
    #[schemars(description = "The question type: 'multiple_choice' or 'open_ended'")]
    pub question_type: String,
}

// --- Service and handler implementation ---

/// MCP service giving the LLM runtime access to one session's learning state.
pub struct CoachService {
    /// Shared session state, mutated only through these tools.
    pub session: Arc<tokio::sync::Mutex<SessionState>>,
    /// Optional channel broadcasting state changes to subscribers.
    pub state_tx: Option<mpsc::Sender<SessionState>>,
    classifier: ResponseClassifier,
    intake: RequestClassifier,
    policy: DecisionPolicy,
    tool_router: ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for CoachService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tool_router]
impl CoachService {
    /// Creates a service over shared session state. The classifier carries
    /// the injected key-term set for the session's topic.
    pub fn new(
        session: Arc<tokio::sync::Mutex<SessionState>>,
        state_tx: Option<mpsc::Sender<SessionState>>,
        classifier: ResponseClassifier,
    ) -> Self {
        Self {
            session,
            state_tx,
            classifier,
            intake: RequestClassifier::default(),
            policy: DecisionPolicy::default(),
            tool_router: Self::tool_router(),
        }
    }

    async fn broadcast(&self, state: SessionState) {
        if let Some(tx) = &self.state_tx {
            if tx.send(state).await.is_err() {
                tracing::warn!("Failed to broadcast state update: receiver dropped.");
            }
        }
    }

    /// Snapshot of the session: plan, difficulty, strategy, history, streaks.
    #[tool(
        description = "Get the current session state: teaching plan, difficulty, strategy, assessment history and streaks."
    )]
    pub async fn get_session_status(&self) -> Result<String, String> {
        info!("Executing tool 'get_session_status'");
        let session = self.session.lock().await;
        serde_json::to_string(&*session)
            .map_err(|e| format!("Failed to serialize session state: {}", e))
    }

    /// Classifies the learner's opening request into a starting profile and,
    /// if no questions have been asked yet, seeds the session difficulty
    /// from it.
    #[tool(
        description = "Analyze the learner's opening request to pick a presentation style and starting difficulty."
    )]
    pub async fn analyze_learning_request(
        &self,
        args: Parameters<AnalyzeRequestArgs>,
    ) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'analyze_learning_request'");
        let profile = self.intake.classify(&args.0.request);

        let mut session = self.session.lock().await;
        // The intake override only applies before the first assessment.
        if session.history.is_empty() {
            session.difficulty = profile.starting_difficulty;
            let snapshot = session.clone();
            drop(session);
            self.broadcast(snapshot).await;
        }

        serde_json::to_string(&profile).map_err(|e| e.to_string())
    }

    /// Grades one answer and appends the outcome to the session history.
    #[tool(
        description = "Grade the learner's answer (multiple_choice or open_ended) and record the outcome in the session history."
    )]
    pub async fn record_assessment(
        &self,
        args: Parameters<RecordAssessmentArgs>,
    ) -> Result<String, String> {
        info!(args = ?args.0, "Executing tool 'record_assessment'");
        let args = args.0;

        let question_type: QuestionType =
            args.question_type.parse().map_err(|e: CoachError| e.to_string())?;
        let key = match (question_type, args.key.as_deref()) {
            (QuestionType::MultipleChoice, None) => {
                return Err(CoachError::InvalidInput(
                    "multiple_choice grading requires a 'key'".to_string(),
                )
                .to_string());
            }
            (_, key) => key.unwrap_or_default(),
        };

        let mut session = self.session.lock().await;
        let record =
            self.classifier
                .classify(&args.answer, key, question_type, session.difficulty);
        let reply = json!({
            "correct": record.correct,
            "confidence": record.confidence,
            "question_difficulty": record.question_difficulty,
        });
        session.record(record);
        info!(
            assessments = session.history.len(),
            streak_correct = session.streak_correct,
            streak_incorrect = session.streak_incorrect,
            "Assessment recorded"
        );

        let snapshot = session.clone();
        drop(session);
        self.broadcast(snapshot).await;

        serde_json::to_string(&reply).map_err(|e| e.to_string())
    }

    /// Runs the strategy selector over the full session history and applies
    /// its verdict to the session.
    #[tool(
        description = "Decide the next pedagogical action (start, advance, reinforce or simplify) from the assessment history, and adjust difficulty accordingly."
    )]
    pub async fn next_learning_action(&self) -> Result<String, String> {
        info!("Executing tool 'next_learning_action'");
        let mut session = self.session.lock().await;
        let action = self.policy.decide(&session.history, &session);
        session.apply(&action);
        info!(
            kind = ?action.kind,
            difficulty = ?session.difficulty,
            strategy = ?session.strategy,
            "Learning action decided"
        );

        let snapshot = session.clone();
        drop(session);
        self.broadcast(snapshot).await;

        serde_json::to_string(&action).map_err(|e| e.to_string())
    }

    /// Gives the model a clean way to end the lesson; session bookkeeping is
    /// handled elsewhere (e.g. the REST status endpoint).
    #[tool(description = "Ends the tutoring session once the learner is done.")]
    pub async fn conclude_session(&self) -> Result<String, String> {
        info!("Executing tool 'conclude_session'");
        Ok("OK. Session will be concluded.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Difficulty;
    use crate::selector::ActionKind;
    use crate::session::Strategy;

    fn service() -> (CoachService, Arc<tokio::sync::Mutex<SessionState>>) {
        let session = Arc::new(tokio::sync::Mutex::new(SessionState::new(
            "Quantum Entanglement",
            Difficulty::Beginner,
        )));
        let classifier = ResponseClassifier::new(vec![
            "entangled".into(),
            "connected".into(),
            "instant".into(),
            "particles".into(),
            "measurement".into(),
        ]);
        (
            CoachService::new(session.clone(), None, classifier),
            session,
        )
    }

    #[tokio::test]
    async fn next_action_on_fresh_session_is_start() {
        let (svc, session) = service();
        let reply = svc.next_learning_action().await.unwrap();
        assert!(reply.contains("\"start\""));
        assert_eq!(session.lock().await.difficulty, Difficulty::Beginner);
    }

    #[tokio::test]
    async fn recorded_assessments_drive_the_selector() {
        let (svc, session) = service();
        for _ in 0..4 {
            svc.record_assessment(Parameters(RecordAssessmentArgs {
                answer: "a".into(),
                key: Some("A".into()),
                question_type: "multiple_choice".into(),
            }))
            .await
            .unwrap();
        }

        let reply = svc.next_learning_action().await.unwrap();
        let action: crate::selector::Action = serde_json::from_str(&reply).unwrap();
        assert_eq!(action.kind, ActionKind::Advance);

        let session = session.lock().await;
        assert_eq!(session.difficulty, Difficulty::Intermediate);
        assert_eq!(session.strategy, Strategy::Discovery);
        assert_eq!(session.streak_correct, 4);
    }

    #[tokio::test]
    async fn open_ended_answers_are_scored_by_key_terms() {
        let (svc, session) = service();
        let reply = svc
            .record_assessment(Parameters(RecordAssessmentArgs {
                answer: "The particles are entangled, so a measurement on one is instant on the other."
                    .into(),
                key: None,
                question_type: "open_ended".into(),
            }))
            .await
            .unwrap();
        assert!(reply.contains("\"correct\":true"));
        assert_eq!(session.lock().await.history.len(), 1);
    }

    #[tokio::test]
    async fn unknown_question_type_is_invalid_input() {
        let (svc, session) = service();
        let err = svc
            .record_assessment(Parameters(RecordAssessmentArgs {
                answer: "whatever".into(),
                key: None,
                question_type: "essay".into(),
            }))
            .await
            .unwrap_err();
        assert!(err.contains("invalid input"));
        // Nothing was recorded.
        assert!(session.lock().await.history.is_empty());
    }

    #[tokio::test]
    async fn multiple_choice_without_key_is_invalid_input() {
        let (svc, _) = service();
        let err = svc
            .record_assessment(Parameters(RecordAssessmentArgs {
                answer: "b".into(),
                key: None,
                question_type: "multiple_choice".into(),
            }))
            .await
            .unwrap_err();
        assert!(err.contains("invalid input"));
    }

    #[tokio::test]
    async fn intake_seeds_difficulty_only_before_first_assessment() {
        let (svc, session) = service();
        svc.analyze_learning_request(Parameters(AnalyzeRequestArgs {
            request: "Give me the detailed technical version".into(),
        }))
        .await
        .unwrap();
        assert_eq!(session.lock().await.difficulty, Difficulty::Advanced);

        svc.record_assessment(Parameters(RecordAssessmentArgs {
            answer: "b".into(),
            key: Some("b".into()),
            question_type: "multiple_choice".into(),
        }))
        .await
        .unwrap();

        svc.analyze_learning_request(Parameters(AnalyzeRequestArgs {
            request: "explain it for a kid".into(),
        }))
        .await
        .unwrap();
        // History exists, so the override no longer applies.
        assert_eq!(session.lock().await.difficulty, Difficulty::Advanced);
    }

    #[tokio::test]
    async fn status_reports_the_full_state() {
        let (svc, _) = service();
        let status = svc.get_session_status().await.unwrap();
        let state: SessionState = serde_json::from_str(&status).unwrap();
        assert_eq!(state.topic, "Quantum Entanglement");
        assert!(state.history.is_empty());
    }
}
