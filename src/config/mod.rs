//! Application configuration

pub mod prompts;

use std::env;

use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Default Gemini API endpoint
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for both assistants
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_url: String,
    pub model: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let Ok(raw_key) = env::var("GEMINI_API_KEY") else {
            bail!("GEMINI_API_KEY not found in environment. Please check your .env file");
        };

        let gemini_api_key = clean_api_key(&raw_key);
        if gemini_api_key.is_empty() {
            bail!("GEMINI_API_KEY not found in environment. Please check your .env file");
        }
        if !gemini_api_key.starts_with("AIza") {
            let prefix: String = gemini_api_key.chars().take(6).collect();
            bail!("Invalid Gemini API key format: keys start with 'AIza', got '{}...'", prefix);
        }

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5004),
            gemini_api_key,
            gemini_url: env::var("GEMINI_URL").unwrap_or_else(|_| DEFAULT_GEMINI_URL.into()),
            model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
        })
    }
}

/// Strip stray whitespace and quotes that editors tend to leave in .env files.
fn clean_api_key(raw: &str) -> String {
    raw.trim().trim_matches('"').trim_matches('\'').to_string()
}
