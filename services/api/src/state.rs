//! Shared Application State
//!
//! The `AppState` struct holds all shared, clonable resources: the database
//! wrapper, the lesson planner, the LLM client, and startup-loaded content.

use crate::config::Config;
use coach_core::{content::TopicLibrary, llm_client::LLMClient, planner::LessonPlanner};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<crate::db::Db>,
    pub planner: Arc<dyn LessonPlanner>,
    pub llm_client: Arc<dyn LLMClient>,
    pub system_prompt: Arc<String>,
    pub topics: Arc<TopicLibrary>,
    pub config: Arc<Config>,
}
