//! Teaching-plan templating.
//!
//! A plan is an ordered list of focus points for a topic. The production
//! implementation asks an OpenAI-compatible model to template the list and
//! parses the numbered items out of the reply; the mock gives deterministic
//! output for tests and offline development. Plan text is guidance for the
//! content generator, not learner-facing material.

use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Contract for anything that can produce a teaching plan for a topic.
#[async_trait]
pub trait LessonPlanner: Send + Sync {
    /// Returns the ordered focus points to teach `topic` through.
    async fn plan(&self, topic: &str) -> Result<Vec<String>>;
}

/// Plan templating backed by an OpenAI-compatible chat API.
pub struct LLMLessonPlanner {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: HashMap<String, String>,
}

impl LLMLessonPlanner {
    /// `prompts` must contain a `"lesson_plan"` template with a `{topic}`
    /// placeholder.
    pub fn new(config: OpenAIConfig, model: String, prompts: HashMap<String, String>) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            prompts,
        }
    }
}

#[async_trait]
impl LessonPlanner for LLMLessonPlanner {
    async fn plan(&self, topic: &str) -> Result<Vec<String>> {
        let template = self
            .prompts
            .get("lesson_plan")
            .context("Missing prompt template: 'lesson_plan'")?;
        let prompt = template.replace("{topic}", topic);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content("You are a tutoring assistant that outlines teaching plans.")
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;
        let answer = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .as_ref()
            .context("No content in LLM response")?;

        let points = parse_plan_items(answer);
        if points.is_empty() {
            tracing::warn!(%topic, "lesson plan reply contained no list items");
        }
        Ok(points)
    }
}

/// Extracts list items of the form `1. point` or `1) point` from a reply.
pub fn parse_plan_items(answer: &str) -> Vec<String> {
    answer
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            line.find(|c: char| c == '.' || c == ')').and_then(|idx| {
                let (prefix, rest) = line.split_at(idx);
                if !prefix.chars().all(|c| c.is_ascii_digit()) || prefix.is_empty() {
                    return None;
                }
                let item = rest[1..].trim();
                (!item.is_empty()).then(|| item.to_string())
            })
        })
        .collect()
}

/// Deterministic planner for tests and offline development.
pub struct MockLessonPlanner;

#[async_trait]
impl LessonPlanner for MockLessonPlanner {
    async fn plan(&self, topic: &str) -> Result<Vec<String>> {
        Ok(vec![
            format!("What {} is", topic),
            "The core mechanism".to_string(),
            "A concrete everyday example".to_string(),
            "Where it shows up in practice".to_string(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbered_items_with_dot_or_paren() {
        let reply = "Here is the plan:\n1. What it is\n2) How it works\n3. An example\n";
        assert_eq!(
            parse_plan_items(reply),
            vec!["What it is", "How it works", "An example"]
        );
    }

    #[test]
    fn ignores_prose_and_sentences_with_periods() {
        let reply = "I suggest this plan. It has depth.\n1. Definitions\nThanks!";
        assert_eq!(parse_plan_items(reply), vec!["Definitions"]);
    }

    #[test]
    fn empty_reply_parses_to_no_items() {
        assert!(parse_plan_items("").is_empty());
        assert!(parse_plan_items("no list here").is_empty());
    }

    #[tokio::test]
    async fn mock_planner_is_deterministic() {
        let planner = MockLessonPlanner;
        let a = planner.plan("Gravity").await.unwrap();
        let b = planner.plan("Gravity").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0], "What Gravity is");
        assert_eq!(a.len(), 4);
    }
}
