//! Web search tool backed by the Serper.dev API

use super::{Tool, ToolOutput};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const SERPER_URL: &str = "https://google.serper.dev/search";

/// Maximum organic results rendered into the tool output
const MAX_RESULTS: usize = 8;

#[derive(Debug, Deserialize)]
struct WebSearchInput {
    query: String,
}

/// Web search tool
pub struct WebSearchTool {
    client: Client,
    api_key: String,
}

impl WebSearchTool {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    async fn search(&self, query: &str) -> Result<String, String> {
        let response = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&json!({ "q": query, "num": MAX_RESULTS }))
            .send()
            .await
            .map_err(|e| format!("Search request failed: {e}"))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("Failed to read search response: {e}"))?;

        if !status.is_success() {
            return Err(format!("Search API returned HTTP {status}: {body}"));
        }

        let parsed: SerperResponse = serde_json::from_str(&body)
            .map_err(|e| format!("Failed to parse search response: {e}"))?;

        Ok(format_results(&parsed))
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> String {
        "Search the web for current information, such as up-to-date clinical \
         guidance, treatment research, or provider resources. Returns titled \
         result snippets with source links."
            .to_string()
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["query"],
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query."
                }
            }
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        let input: WebSearchInput = match serde_json::from_value(input) {
            Ok(i) => i,
            Err(e) => return ToolOutput::error(format!("Invalid input: {e}")),
        };

        if input.query.trim().is_empty() {
            return ToolOutput::error("Search query must not be empty");
        }

        match self.search(&input.query).await {
            Ok(results) => ToolOutput::success(results),
            Err(e) => {
                tracing::warn!(error = %e, "Web search failed");
                ToolOutput::error(e)
            }
        }
    }
}

fn format_results(response: &SerperResponse) -> String {
    if response.organic.is_empty() {
        return "No search results found.".to_string();
    }

    let mut lines = Vec::new();
    if let Some(answer) = &response.answer_box {
        if let Some(snippet) = &answer.snippet {
            lines.push(format!("Answer: {snippet}"));
        }
    }

    for (index, result) in response.organic.iter().take(MAX_RESULTS).enumerate() {
        lines.push(format!(
            "{}. {}\n   {}\n   {}",
            index + 1,
            result.title,
            result.link,
            result.snippet.as_deref().unwrap_or("(no snippet)")
        ));
    }

    lines.join("\n")
}

// Serper API types

#[derive(Debug, Default, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
    #[serde(rename = "answerBox")]
    answer_box: Option<AnswerBox>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: String,
    link: String,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnswerBox {
    snippet: Option<String>,
}
