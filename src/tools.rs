//! Tools available to the intake agents
//!
//! Each tool exposes a JSON schema to the LLM and executes against an
//! external capability: web search for current clinical guidance, and
//! retrieval over the local reference-document directory.

mod knowledge;
mod web_search;

pub use knowledge::KnowledgeSearchTool;
pub use web_search::WebSearchTool;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Result from tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
        }
    }
}

/// Trait for tools that can be executed by the agents
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &'static str;

    /// Tool description for the LLM
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn run(&self, input: Value) -> ToolOutput;
}

/// Collection of tools available to the crew
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Registry with no tools, for tests and degraded configurations
    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    /// Get all tool definitions for the LLM
    pub fn definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        self.tools
            .iter()
            .map(|t| crate::llm::ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, input: Value) -> Option<ToolOutput> {
        for tool in &self.tools {
            if tool.name() == name {
                return Some(tool.run(input).await);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn description(&self) -> String {
            "Uppercases text".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        async fn run(&self, input: Value) -> ToolOutput {
            match input.get("text").and_then(Value::as_str) {
                Some(text) => ToolOutput::success(text.to_uppercase()),
                None => ToolOutput::error("missing text"),
            }
        }
    }

    #[tokio::test]
    async fn registry_executes_by_name() {
        let registry = ToolRegistry::new(vec![Arc::new(UpperTool)]);
        let output = registry
            .execute("upper", json!({"text": "hello"}))
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.output, "HELLO");
    }

    #[tokio::test]
    async fn unknown_tool_returns_none() {
        let registry = ToolRegistry::new(vec![Arc::new(UpperTool)]);
        assert!(registry.execute("missing", json!({})).await.is_none());
    }

    #[test]
    fn definitions_expose_schemas() {
        let registry = ToolRegistry::new(vec![Arc::new(UpperTool)]);
        let defs = registry.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "upper");
        assert_eq!(defs[0].input_schema["type"], "object");
    }
}
