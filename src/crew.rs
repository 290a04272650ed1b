//! Agent crew orchestration
//!
//! The crew is the collaborator that does the actual language-model work:
//! two agents (a diagnostic coordinator and a treatment-plan writer) run
//! their tasks sequentially per kickoff, with web-search and
//! knowledge-retrieval tools available through a tool-use loop. The session
//! driver only depends on the [`CrewService`] trait, so the whole layer can
//! be swapped or faked.

mod agents;
mod executor;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use agents::{intake_agents, intake_tasks, interpolate, AgentSpec, TaskSpec};
pub use store::{RunRecord, RunStore, StoreError};

use crate::llm::{LlmConfig, LlmError, ModelRegistry};
use crate::tools::{KnowledgeSearchTool, Tool, ToolRegistry, WebSearchTool};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// Inputs handed to the crew for one kickoff.
///
/// The per-message fields are absent for the one-shot console flow, which
/// seeds only the patient's concerns and lets the agents drive everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KickoffInputs {
    pub user_message: Option<String>,
    pub current_step: Option<u8>,
    pub conversation_context: Option<String>,
    pub patient_concerns: String,
    pub diagnosed_condition: String,
    pub selected_treatment_option: String,
}

impl KickoffInputs {
    /// Inputs for a fresh one-shot assessment seeded from the patient's
    /// opening statement
    pub fn initial(patient_concerns: impl Into<String>) -> Self {
        Self {
            patient_concerns: patient_concerns.into(),
            diagnosed_condition: "To be determined through interactive assessment".to_string(),
            selected_treatment_option: "To be selected through patient interaction".to_string(),
            ..Self::default()
        }
    }

    /// Placeholder inputs for training and test iterations
    pub fn sample() -> Self {
        Self {
            patient_concerns: "sample_value".to_string(),
            diagnosed_condition: "sample_value".to_string(),
            selected_treatment_option: "sample_value".to_string(),
            ..Self::default()
        }
    }
}

/// Output of a single task within a kickoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRun {
    pub task: String,
    pub output: String,
}

/// Result of one crew kickoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickoffOutput {
    pub task_id: String,
    /// Final task's textual output, when one was produced
    pub raw: Option<String>,
    pub task_runs: Vec<TaskRun>,
}

impl KickoffOutput {
    /// The reply text shown to the user: the raw output when present,
    /// otherwise the whole result serialized to JSON.
    pub fn text(&self) -> String {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => serde_json::to_string(self).unwrap_or_default(),
        }
    }
}

/// Errors from crew invocation
#[derive(Debug, Error)]
pub enum CrewError {
    #[error("no language model is configured")]
    NoModel,
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error("no agent registered for role: {0}")]
    MissingAgent(String),
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),
    #[error("run store error: {0}")]
    Store(#[from] StoreError),
    #[error("run not found: {0}")]
    RunNotFound(String),
    #[error("stored run could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// The seam the session driver depends on
#[async_trait]
pub trait CrewService: Send + Sync {
    async fn kickoff(&self, inputs: &KickoffInputs) -> Result<KickoffOutput, CrewError>;
}

/// One iteration of a `test` run
#[derive(Debug, Serialize)]
pub struct TestIteration {
    pub iteration: u32,
    pub task_id: String,
    pub duration_ms: u128,
}

/// The intake crew: agents, tasks, models, tools, and the run store
pub struct Crew {
    agents: Vec<AgentSpec>,
    tasks: Vec<TaskSpec>,
    llm: Arc<ModelRegistry>,
    tools: Arc<ToolRegistry>,
    store: RunStore,
}

impl Crew {
    /// Build the psychological-intake crew over the given models and tools
    pub fn psychological_intake(
        llm: Arc<ModelRegistry>,
        tools: Arc<ToolRegistry>,
        store: RunStore,
    ) -> Self {
        Self {
            agents: intake_agents(),
            tasks: intake_tasks(),
            llm,
            tools,
            store,
        }
    }

    /// Wire the crew from environment configuration: `OPENAI_API_KEY`,
    /// `SERPER_API_KEY`, `COMPASS_STORAGE_DIR`, `COMPASS_KNOWLEDGE_DIR`.
    pub fn from_env() -> Result<Self, CrewError> {
        let llm_config = LlmConfig::from_env();
        let registry = Arc::new(ModelRegistry::new(&llm_config));
        if registry.has_models() {
            tracing::info!(
                models = ?registry.available_models(),
                default = %registry.default_model_id(),
                "LLM registry initialized"
            );
        } else {
            tracing::warn!("No LLM API key configured. Set OPENAI_API_KEY.");
        }

        let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
        match std::env::var("SERPER_API_KEY") {
            Ok(key) if !key.is_empty() => tools.push(Arc::new(WebSearchTool::new(key))),
            _ => tracing::warn!("No SERPER_API_KEY configured; web search disabled"),
        }

        let knowledge_dir = std::env::var("COMPASS_KNOWLEDGE_DIR")
            .map_or_else(|_| PathBuf::from("knowledge"), PathBuf::from);
        tools.push(Arc::new(KnowledgeSearchTool::new(knowledge_dir)));

        let storage_dir = storage_dir();
        std::fs::create_dir_all(&storage_dir)?;
        let store = RunStore::open(storage_dir.join("runs.db"))?;

        Ok(Self::psychological_intake(
            registry,
            Arc::new(ToolRegistry::new(tools)),
            store,
        ))
    }

    /// Run a stored kickoff again with its recorded inputs
    pub async fn replay(&self, task_id: &str) -> Result<KickoffOutput, CrewError> {
        let record = self
            .store
            .get_run(task_id)?
            .ok_or_else(|| CrewError::RunNotFound(task_id.to_string()))?;
        let inputs: KickoffInputs = serde_json::from_str(&record.inputs)?;
        self.run_recorded("replay", &inputs, None).await
    }

    /// Run `iterations` kickoffs and write the transcript to `path`
    pub async fn train(
        &self,
        iterations: u32,
        path: &std::path::Path,
        inputs: &KickoffInputs,
    ) -> Result<(), CrewError> {
        let mut transcript = Vec::new();
        for iteration in 1..=iterations {
            let output = self.run_recorded("train", inputs, None).await?;
            tracing::info!(iteration, task_id = %output.task_id, "Training iteration complete");
            transcript.push(serde_json::json!({
                "iteration": iteration,
                "task_id": output.task_id,
                "output": output.raw,
            }));
        }
        std::fs::write(path, serde_json::to_string_pretty(&transcript)?)?;
        Ok(())
    }

    /// Run `iterations` kickoffs against a specific model, timing each
    pub async fn test(
        &self,
        iterations: u32,
        model_id: &str,
        inputs: &KickoffInputs,
    ) -> Result<Vec<TestIteration>, CrewError> {
        let mut results = Vec::new();
        for iteration in 1..=iterations {
            let start = Instant::now();
            let output = self.run_recorded("test", inputs, Some(model_id)).await?;
            results.push(TestIteration {
                iteration,
                task_id: output.task_id,
                duration_ms: start.elapsed().as_millis(),
            });
        }
        Ok(results)
    }

    async fn run_recorded(
        &self,
        kind: &str,
        inputs: &KickoffInputs,
        model_override: Option<&str>,
    ) -> Result<KickoffOutput, CrewError> {
        let output = self.run_tasks(inputs, model_override).await?;
        self.store.record_run(
            &output.task_id,
            kind,
            &serde_json::to_string(inputs)?,
            &serde_json::to_string(&output)?,
        )?;
        Ok(output)
    }

    /// Run the task pipeline sequentially; each task sees the previous
    /// task's output.
    async fn run_tasks(
        &self,
        inputs: &KickoffInputs,
        model_override: Option<&str>,
    ) -> Result<KickoffOutput, CrewError> {
        let llm = match model_override {
            Some(model_id) => self
                .llm
                .get(model_id)
                .ok_or_else(|| CrewError::UnknownModel(model_id.to_string()))?,
            None => self.llm.default().ok_or(CrewError::NoModel)?,
        };

        let mut task_runs = Vec::new();
        let mut previous_output: Option<String> = None;

        for task in &self.tasks {
            let agent = self
                .agents
                .iter()
                .find(|agent| agent.role == task.agent_role)
                .ok_or_else(|| CrewError::MissingAgent(task.agent_role.to_string()))?;

            let mut content = interpolate(task.description, inputs);
            if let Some(previous) = &previous_output {
                content.push_str("\n\nOutput of the previous task:\n");
                content.push_str(previous);
            }
            content.push_str("\n\nExpected output: ");
            content.push_str(task.expected_output);

            tracing::debug!(task = task.name, agent = agent.role, "Running crew task");
            let output = executor::run_task(llm.clone(), &self.tools, agent, &content).await?;

            previous_output = Some(output.clone());
            task_runs.push(TaskRun {
                task: task.name.to_string(),
                output,
            });
        }

        Ok(KickoffOutput {
            task_id: Uuid::new_v4().to_string(),
            raw: task_runs.last().map(|run| run.output.clone()),
            task_runs,
        })
    }
}

#[async_trait]
impl CrewService for Crew {
    async fn kickoff(&self, inputs: &KickoffInputs) -> Result<KickoffOutput, CrewError> {
        self.run_recorded("kickoff", inputs, None).await
    }
}

/// Directory the crew persists its runs under
pub fn storage_dir() -> PathBuf {
    std::env::var("COMPASS_STORAGE_DIR").map_or_else(
        |_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".compass")
        },
        PathBuf::from,
    )
}
