//! Research assistant engine
//!
//! Drives the tool-calling loop: send the conversation to the model with
//! the tool catalog in the system prompt, scan the reply for ```tool_call
//! blocks, execute them, feed results back, and repeat until the model
//! answers in plain text.

pub mod tools;

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::prompts;
use crate::conversation::Message;
use crate::providers::{ChatModel, ProviderError};

pub use tools::{ToolDefinition, ToolError, ToolResult, Toolbox};

/// Upper bound on tool round-trips per user turn.
const MAX_TOOL_ITERATIONS: usize = 10;

#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("Max tool iterations exceeded")]
    MaxIterationsExceeded,
}

/// A tool call requested by the model.
#[derive(Debug, Clone)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
}

pub struct ResearchEngine {
    model: Arc<dyn ChatModel>,
    toolbox: Toolbox,
    history: Vec<Message>,
}

impl ResearchEngine {
    pub fn new(model: Arc<dyn ChatModel>, toolbox: Toolbox) -> Self {
        Self {
            model,
            toolbox,
            history: Vec::new(),
        }
    }

    /// Process one user query to completion, tools included, and return
    /// the final answer text.
    pub async fn run_turn(&mut self, input: &str) -> Result<String, ResearchError> {
        let system = self.system_prompt();

        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(Message::system(&system));
        messages.extend(self.history.iter().cloned());
        messages.push(Message::user(input));

        for _ in 0..MAX_TOOL_ITERATIONS {
            let outcome = self.model.run(&messages).await?;

            let Some(calls) = extract_tool_calls(&outcome.reply) else {
                // Plain answer: keep the provider's transcript as history.
                self.history = outcome.transcript;
                return Ok(outcome.reply);
            };

            messages = rebuild_with_system(&system, outcome.transcript);
            for call in calls {
                tracing::debug!("Executing tool {}", call.name);
                let result = match self.toolbox.execute(&call.name, call.arguments.clone()).await {
                    Ok(result) => result,
                    Err(e) => ToolResult::failure(e.to_string()),
                };
                messages.push(Message::user(format!(
                    "Tool result for {}: {}",
                    call.name,
                    serde_json::to_string(&result).unwrap_or_default()
                )));
            }
        }

        Err(ResearchError::MaxIterationsExceeded)
    }

    /// The research prompt plus the tool catalog and calling convention.
    fn system_prompt(&self) -> String {
        let definitions = self.toolbox.definitions();

        let catalog = definitions
            .iter()
            .map(|d| format!("- {}: {}", d.name, d.description))
            .collect::<Vec<_>>()
            .join("\n");

        let schemas = serde_json::to_string_pretty(&definitions).unwrap_or_default();

        format!(
            "{}\n\n## Available Tools\n\nYou have access to the following tools:\n\n{}\n\n\
            To use a tool, respond with a JSON block in this format:\n\
            ```tool_call\n{{\n  \"name\": \"tool_name\",\n  \"arguments\": {{}}\n}}\n```\n\n\
            Tool schemas:\n```json\n{}\n```",
            prompts::RESEARCH_ASSISTANT,
            catalog,
            schemas
        )
    }
}

/// Prepend the system prompt to a provider transcript.
fn rebuild_with_system(system: &str, transcript: Vec<Message>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(Message::system(system));
    messages.extend(transcript);
    messages
}

/// Scan a reply for ```tool_call fenced JSON blocks.
fn extract_tool_calls(content: &str) -> Option<Vec<ToolCall>> {
    let mut calls = Vec::new();

    for block in content.split("```tool_call").skip(1) {
        let Some(end) = block.find("```") else {
            continue;
        };
        let json_str = block[..end].trim();
        let Ok(value) = serde_json::from_str::<Value>(json_str) else {
            continue;
        };
        if let (Some(name), Some(arguments)) = (
            value.get("name").and_then(Value::as_str),
            value.get("arguments"),
        ) {
            calls.push(ToolCall {
                name: name.to_string(),
                arguments: arguments.clone(),
            });
        }
    }

    if calls.is_empty() {
        None
    } else {
        Some(calls)
    }
}
