pub mod agent;
pub mod assessment;
pub mod classifier;
pub mod content;
pub mod intake;
pub mod llm_client;
pub mod planner;
pub mod selector;
pub mod session;

/// Errors produced by the decision core.
///
/// The core deliberately has a single failure mode: malformed input at the
/// tool boundary, where loosely-typed arguments from the LLM runtime are
/// parsed into records. An empty assessment history is *not* an error; it is
/// the defined session-start case and is handled by the strategy selector.
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    /// A record or tool argument was malformed (missing field, unknown
    /// question type). Never produced for well-typed inputs.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
