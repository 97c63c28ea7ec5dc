//! Research tools
//!
//! Concrete, independent utilities the research agent can call: Wikipedia
//! search, DuckDuckGo search, date/time, and saving findings to disk.
//! Each returns a `ToolResult` with display-ready text; recoverable
//! problems (no results, network hiccups) come back as failed results
//! rather than errors so the model can react to them.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;
use tokio::fs;

/// Where saved research reports land.
const OUTPUT_DIR: &str = "research_outputs";

/// Width of the ruled lines in a report header.
const HEADER_RULE_WIDTH: usize = 70;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Definition of a tool the model can call.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Result of executing a tool.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: impl Into<Value>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: Value::Null,
            error: Some(error.into()),
        }
    }
}

/// The research agent's tool set.
pub struct Toolbox {
    client: Client,
    output_dir: PathBuf,
}

impl Default for Toolbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolbox {
    pub fn new() -> Self {
        Self::with_output_dir(OUTPUT_DIR)
    }

    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "web_search".into(),
                description: "Search Wikipedia for comprehensive information".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query to look up" }
                    },
                    "required": ["query"]
                }),
            },
            ToolDefinition {
                name: "duck_search".into(),
                description: "Perform a DuckDuckGo web search for general information".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "The search query to look up" }
                    },
                    "required": ["query"]
                }),
            },
            ToolDefinition {
                name: "get_date_time".into(),
                description: "Get the current date and time".into(),
                parameters: json!({ "type": "object", "properties": {} }),
            },
            ToolDefinition {
                name: "save_research".into(),
                description: "Save research findings to a file in the research_outputs folder".into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "filename": { "type": "string", "description": "Name of the file (without extension)" },
                        "content": { "type": "string", "description": "The research content to save" }
                    },
                    "required": ["filename", "content"]
                }),
            },
        ]
    }

    pub async fn execute(&self, tool: &str, params: Value) -> Result<ToolResult, ToolError> {
        match tool {
            "web_search" => {
                let query = required_str(&params, "query")?;
                Ok(self.web_search(query).await)
            }
            "duck_search" => {
                let query = required_str(&params, "query")?;
                Ok(self.duck_search(query).await)
            }
            "get_date_time" => Ok(get_date_time()),
            "save_research" => {
                let filename = required_str(&params, "filename")?.to_string();
                let content = required_str(&params, "content")?.to_string();
                self.save_research(&filename, &content).await
            }
            _ => Err(ToolError::ToolNotFound(tool.to_string())),
        }
    }

    /// Wikipedia OpenSearch: top three titled results with description
    /// and URL.
    async fn web_search(&self, query: &str) -> ToolResult {
        let response = self
            .client
            .get("https://en.wikipedia.org/w/api.php")
            .query(&[
                ("action", "opensearch"),
                ("search", query),
                ("limit", "3"),
                ("namespace", "0"),
                ("format", "json"),
            ])
            .send()
            .await;

        let data: Value = match response {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(data) => data,
                Err(e) => return ToolResult::failure(format!("Search error: {}", e)),
            },
            Ok(resp) => return ToolResult::failure(format!("Search error: HTTP {}", resp.status())),
            Err(e) => return ToolResult::failure(format!("Search error: {}", e)),
        };

        // OpenSearch replies [query, [titles], [descriptions], [urls]]
        let titles = data.get(1).and_then(Value::as_array);
        let descriptions = data.get(2).and_then(Value::as_array);
        let urls = data.get(3).and_then(Value::as_array);

        let Some(titles) = titles.filter(|t| !t.is_empty()) else {
            return ToolResult::success(format!("No Wikipedia results found for '{}'", query));
        };

        let mut lines = vec!["📚 **Wikipedia Results:**".to_string()];
        for (i, title) in titles.iter().take(3).enumerate() {
            let Some(title) = title.as_str().filter(|t| !t.is_empty()) else {
                continue;
            };
            lines.push(format!("{}. **{}**", i + 1, title));
            if let Some(desc) = descriptions
                .and_then(|d| d.get(i))
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty())
            {
                lines.push(format!("   {}", desc));
            }
            if let Some(url) = urls.and_then(|u| u.get(i)).and_then(Value::as_str) {
                lines.push(format!("   🔗 {}", url));
            }
        }

        ToolResult::success(lines.join("\n"))
    }

    /// DuckDuckGo Instant Answer API: abstract plus related topics.
    async fn duck_search(&self, query: &str) -> ToolResult {
        let response = self
            .client
            .get("https://api.duckduckgo.com/")
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await;

        let data: Value = match response {
            Ok(resp) if resp.status().is_success() => match resp.json().await {
                Ok(data) => data,
                Err(e) => return ToolResult::failure(format!("DuckDuckGo search error: {}", e)),
            },
            Ok(resp) => {
                return ToolResult::failure(format!("DuckDuckGo search error: HTTP {}", resp.status()))
            }
            Err(e) => return ToolResult::failure(format!("DuckDuckGo search error: {}", e)),
        };

        let mut sections = Vec::new();

        if let Some(abstract_text) = data.get("AbstractText").and_then(Value::as_str) {
            if !abstract_text.is_empty() {
                let heading = data
                    .get("Heading")
                    .and_then(Value::as_str)
                    .unwrap_or(query);
                let url = data.get("AbstractURL").and_then(Value::as_str).unwrap_or("");
                sections.push(format!("**{}**\n{}\n🔗 {}", heading, abstract_text, url));
            }
        }

        if let Some(topics) = data.get("RelatedTopics").and_then(Value::as_array) {
            for topic in topics.iter().take(3) {
                let Some(text) = topic.get("Text").and_then(Value::as_str) else {
                    continue;
                };
                let url = topic.get("FirstURL").and_then(Value::as_str).unwrap_or("");
                sections.push(format!("{}\n🔗 {}", text, url));
            }
        }

        if sections.is_empty() {
            ToolResult::success(format!("No DuckDuckGo results found for '{}'", query))
        } else {
            ToolResult::success(format!(
                "🦆 **DuckDuckGo Results:**\n\n{}",
                sections.join("\n\n")
            ))
        }
    }

    /// Write a report to `<output_dir>/<sanitized>_<timestamp>.txt` with a
    /// fixed-width header naming the topic and generation time.
    async fn save_research(&self, filename: &str, content: &str) -> Result<ToolResult, ToolError> {
        fs::create_dir_all(&self.output_dir).await?;

        let clean = sanitize_topic(filename);
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = self.output_dir.join(format!("{}_{}.txt", clean, timestamp));

        let full_content = format!("{}{}", report_header(filename), content);
        fs::write(&path, full_content).await?;

        Ok(ToolResult::success(format!(
            "✅ **Research saved successfully!**\n📁 File: {}\n📊 Size: {} characters",
            path.display(),
            content.chars().count()
        )))
    }
}

fn required_str<'a>(params: &'a Value, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::InvalidParameters(format!("{} is required", key)))
}

/// Current local date and time, verbosely formatted.
fn get_date_time() -> ToolResult {
    let now = Local::now();
    ToolResult::success(format!(
        "📅 **Current Date & Time:**\n{}",
        now.format("%A, %B %d, %Y at %I:%M:%S %p")
    ))
}

/// Keep only word characters, spaces, and hyphens.
fn sanitize_topic(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | ' ' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}

fn report_header(topic: &str) -> String {
    let rule = "=".repeat(HEADER_RULE_WIDTH);
    format!(
        "\n{rule}\nRESEARCH REPORT\n{rule}\nTopic: {}\nGenerated: {}\n{rule}\n\n",
        topic,
        Local::now().format("%A, %B %d, %Y at %I:%M:%S %p")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_topic() {
        assert_eq!(sanitize_topic("Climate Change!"), "Climate Change");
        assert_eq!(sanitize_topic("rust/async: a survey?"), "rustasync a survey");
        assert_eq!(sanitize_topic("self-driving cars"), "self-driving cars");
        assert_eq!(sanitize_topic("  <<>>  "), "");
    }

    #[test]
    fn test_report_header_shape() {
        let header = report_header("Rust");
        assert!(header.contains("RESEARCH REPORT"));
        assert!(header.contains("Topic: Rust"));
        assert!(header.contains("Generated: "));
        assert_eq!(header.matches(&"=".repeat(HEADER_RULE_WIDTH)).count(), 3);
    }

    #[test]
    fn test_definitions_cover_all_tools() {
        let toolbox = Toolbox::new();
        let names: Vec<String> = toolbox.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            ["web_search", "duck_search", "get_date_time", "save_research"]
        );
    }

    #[test]
    fn test_date_time_formatted() {
        let result = get_date_time();
        assert!(result.success);
        let text = result.output.as_str().unwrap();
        assert!(text.contains("Current Date & Time"));
        // Weekday, month name, and AM/PM marker are all spelled out.
        assert!(text.contains("AM") || text.contains("PM"));
    }

    #[tokio::test]
    async fn test_unknown_tool_rejected() {
        let toolbox = Toolbox::new();
        let result = toolbox.execute("format_disk", json!({})).await;
        assert!(matches!(result, Err(ToolError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_parameter_rejected() {
        let toolbox = Toolbox::new();
        let result = toolbox.execute("save_research", json!({"filename": "x"})).await;
        assert!(matches!(result, Err(ToolError::InvalidParameters(_))));
    }

    #[tokio::test]
    async fn test_save_research_writes_report() {
        let dir = std::env::temp_dir().join(format!("research_test_{}", uuid::Uuid::new_v4()));
        let toolbox = Toolbox::with_output_dir(&dir);

        let result = toolbox
            .execute(
                "save_research",
                json!({"filename": "Rust: Memory Safety", "content": "Findings here."}),
            )
            .await
            .unwrap();
        assert!(result.success);

        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        let entry = entries.next_entry().await.unwrap().expect("one report file");
        let name = entry.file_name().to_string_lossy().to_string();
        assert!(name.starts_with("Rust Memory Safety_"));
        assert!(name.ends_with(".txt"));

        let saved = tokio::fs::read_to_string(entry.path()).await.unwrap();
        assert!(saved.contains("RESEARCH REPORT"));
        assert!(saved.contains("Topic: Rust: Memory Safety"));
        assert!(saved.ends_with("Findings here."));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}
