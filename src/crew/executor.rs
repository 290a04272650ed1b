//! Task execution loop
//!
//! Runs one task to completion: the agent's LLM is called with the tool
//! definitions, requested tools are executed serially, and their results
//! are fed back until the model produces a text-only turn or the
//! iteration cap is reached.

use super::agents::AgentSpec;
use super::CrewError;
use crate::llm::{ContentBlock, LlmMessage, LlmRequest, LlmService};
use crate::tools::{ToolOutput, ToolRegistry};
use std::sync::Arc;

const MAX_RESPONSE_TOKENS: u32 = 4096;

pub(super) async fn run_task(
    llm: Arc<dyn LlmService>,
    tools: &ToolRegistry,
    agent: &AgentSpec,
    task_content: &str,
) -> Result<String, CrewError> {
    let mut messages = vec![LlmMessage::user(vec![ContentBlock::text(task_content)])];
    let mut last_text = String::new();

    for iteration in 0..agent.max_iterations {
        let request = LlmRequest {
            system: agent.system_prompt(),
            messages: messages.clone(),
            tools: tools.definitions(),
            max_tokens: Some(MAX_RESPONSE_TOKENS),
            temperature: Some(agent.temperature),
        };

        let response = llm.complete(&request).await?;

        let text = response.text();
        if !text.is_empty() {
            last_text = text;
        }

        let tool_uses: Vec<(String, String, serde_json::Value)> = response
            .tool_uses()
            .into_iter()
            .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
            .collect();

        if tool_uses.is_empty() {
            return Ok(last_text);
        }

        messages.push(LlmMessage::assistant(response.content.clone()));

        let mut results = Vec::new();
        for (id, name, input) in tool_uses {
            tracing::debug!(tool = %name, iteration, "Executing tool");
            let output = tools
                .execute(&name, input)
                .await
                .unwrap_or_else(|| ToolOutput::error(format!("Unknown tool: {name}")));
            results.push(ContentBlock::tool_result(id, output.output, !output.success));
        }
        messages.push(LlmMessage::user(results));
    }

    tracing::warn!(
        agent = agent.role,
        max_iterations = agent.max_iterations,
        "Task hit the iteration cap before finishing"
    );
    Ok(last_text)
}
