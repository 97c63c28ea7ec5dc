//! Gemini provider implementation
//!
//! Calls the `generateContent` REST endpoint. Gemini has no "system" chat
//! role; system messages are lifted into the `system_instruction` field and
//! the rest of the transcript maps user/assistant onto user/model.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::conversation::{Message, Role};

use super::{ChatModel, ChatOutcome, ProviderError};

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: GeminiContent,
}

impl GeminiProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        if config.gemini_api_key.is_empty() {
            return Err(ProviderError::NotConfigured("gemini".into()));
        }
        Ok(Self {
            client: Client::new(),
            base_url: config.gemini_url.clone(),
            api_key: config.gemini_api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn build_request(messages: &[Message]) -> GenerateRequest {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();

        for message in messages {
            match message.role {
                Role::System => system_parts.push(GeminiPart {
                    text: message.content.clone(),
                }),
                Role::User | Role::Assistant => contents.push(GeminiContent {
                    role: Some(gemini_role(message.role).to_string()),
                    parts: vec![GeminiPart {
                        text: message.content.clone(),
                    }],
                }),
            }
        }

        GenerateRequest {
            system_instruction: if system_parts.is_empty() {
                None
            } else {
                Some(GeminiContent {
                    role: None,
                    parts: system_parts,
                })
            },
            contents,
        }
    }
}

fn gemini_role(role: Role) -> &'static str {
    match role {
        Role::Assistant => "model",
        _ => "user",
    }
}

#[async_trait]
impl ChatModel for GeminiProvider {
    async fn run(&self, messages: &[Message]) -> Result<ChatOutcome, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = Self::build_request(messages);

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_upstream(format!("HTTP {}: {}", status, body)));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let reply = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| ProviderError::InvalidResponse("No candidates in response".into()))?;

        // Updated transcript: what we sent (minus system) plus the reply.
        let mut transcript: Vec<Message> = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect();
        transcript.push(Message::assistant(reply.clone()));

        Ok(ChatOutcome { reply, transcript })
    }
}
