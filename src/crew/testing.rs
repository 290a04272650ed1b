//! Test doubles for crew and session tests

use crate::llm::{
    ContentBlock, LlmError, LlmRequest, LlmResponse, LlmService, Usage,
};
use crate::tools::{Tool, ToolOutput};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// An `LlmService` that replays scripted responses and records the user
/// text of every request it receives.
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<LlmResponse>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Handle onto the request log; clone before moving the service into a
    /// registry.
    pub fn request_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.requests.clone()
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let rendered = request
            .messages
            .iter()
            .flat_map(|message| &message.content)
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::ToolResult { content, .. } => Some(content.as_str()),
                ContentBlock::ToolUse { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        self.requests.lock().unwrap().push(rendered);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::unknown("scripted llm ran out of responses"))
    }

    fn model_id(&self) -> &str {
        "test-model"
    }

    fn context_window(&self) -> usize {
        128_000
    }
}

/// A text-only response that ends the turn
pub fn text_response(text: &str) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::text(text)],
        end_turn: true,
        usage: Usage::default(),
    }
}

/// A response requesting a single tool call
pub fn tool_call_response(id: &str, name: &str, input: Value) -> LlmResponse {
    LlmResponse {
        content: vec![ContentBlock::ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input,
        }],
        end_turn: false,
        usage: Usage::default(),
    }
}

/// A tool that echoes its input text back
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> String {
        "Echoes the given text".to_string()
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["text"],
            "properties": {"text": {"type": "string"}}
        })
    }

    async fn run(&self, input: Value) -> ToolOutput {
        match input.get("text").and_then(Value::as_str) {
            Some(text) => ToolOutput::success(format!("echo: {text}")),
            None => ToolOutput::error("missing text"),
        }
    }
}
