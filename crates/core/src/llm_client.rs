//! LLM runtime client.
//!
//! The coach delegates all content generation to an external model. One
//! non-streaming call decides the next move (answer directly or call tools);
//! after tools run, a streaming call narrates the result to the learner.

use anyhow::{Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionTool, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// A tool invocation requested by the model.
pub type ToolCall = async_openai::types::ChatCompletionMessageToolCall;

/// Events yielded while streaming a text response.
#[derive(Debug, Clone)]
pub enum LLMStreamEvent {
    TextChunk(String),
}

/// A stream of narration chunks from the model.
pub type LLMStream = Pin<Box<dyn Stream<Item = Result<LLMStreamEvent, OpenAIError>> + Send>>;

/// Outcome of the model's decision turn.
#[derive(Debug, Clone)]
pub enum LLMAction {
    /// The model answered directly.
    TextResponse(String),
    /// The model asked for one or more tool invocations.
    ToolCall(Vec<ToolCall>),
}

/// Generic chat-completion client the orchestrator drives the session with.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// One non-streaming call deciding the next action for the turn.
    async fn decide_action(
        &self,
        system_prompt: String,
        history_with_user_message: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<LLMAction>;

    /// Streams the narration turn that follows tool execution.
    async fn stream_after_tools(
        &self,
        system_prompt: String,
        history_with_tool_results: Vec<ChatCompletionRequestMessage>,
    ) -> Result<LLMStream>;
}

/// [`LLMClient`] for any OpenAI-compatible chat API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn decide_action(
        &self,
        _system_prompt: String,
        history_with_user_message: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<LLMAction> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(history_with_user_message)
            .tools(tools)
            .tool_choice("auto")
            .build()?;

        let response = self.client.chat().create(request).await?;
        let choice = response
            .choices
            .first()
            .ok_or_else(|| anyhow!("LLM response contained no choices."))?;

        if let Some(tool_calls) = &choice.message.tool_calls {
            tracing::debug!(count = tool_calls.len(), "model requested tool calls");
            Ok(LLMAction::ToolCall(tool_calls.clone()))
        } else if let Some(content) = &choice.message.content {
            Ok(LLMAction::TextResponse(content.clone()))
        } else {
            Err(anyhow!(
                "LLM response had neither text content nor tool calls."
            ))
        }
    }

    async fn stream_after_tools(
        &self,
        _system_prompt: String,
        history_with_tool_results: Vec<ChatCompletionRequestMessage>,
    ) -> Result<LLMStream> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(history_with_tool_results)
            .stream(true)
            .build()?;

        let stream = self.client.chat().create_stream(request).await?;

        Ok(Box::pin(stream.filter_map(|result| async {
            match result {
                Ok(response) => response
                    .choices
                    .first()
                    .and_then(|choice| choice.delta.content.as_ref())
                    .filter(|content| !content.is_empty())
                    .map(|content| Ok(LLMStreamEvent::TextChunk(content.clone()))),
                Err(e) => Some(Err(e)),
            }
        })))
    }
}
