//! Model registry for the available LLM providers

use super::{LlmService, LoggingService, OpenAIModel, OpenAIService};
use std::collections::HashMap;
use std::sync::Arc;

/// Models offered to the crew; the first entry is the preferred default.
const KNOWN_MODELS: &[OpenAIModel] = &[OpenAIModel::Gpt4oMini, OpenAIModel::Gpt4o];

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            default_model: std::env::var("COMPASS_DEFAULT_MODEL").ok(),
        }
    }
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    /// Create an empty registry for testing purposes
    pub fn new_empty() -> Self {
        Self {
            services: HashMap::new(),
            default_model: "test-model".to_string(),
        }
    }

    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        if let Some(api_key) = config
            .openai_api_key
            .as_ref()
            .filter(|key| !key.is_empty())
        {
            for model in KNOWN_MODELS {
                let service = OpenAIService::new(api_key.clone(), *model);
                services.insert(
                    model.model_id().to_string(),
                    Arc::new(LoggingService::new(Arc::new(service))),
                );
            }
        }

        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| OpenAIModel::Gpt4oMini.model_id().to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    /// Get the default model ID
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    /// Check if any models are available
    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }

    /// Register a service under an arbitrary ID (test seam)
    #[cfg(test)]
    pub(crate) fn insert_for_tests(&mut self, model_id: &str, service: Arc<dyn LlmService>) {
        self.default_model = model_id.to_string();
        self.services.insert(model_id.to_string(), service);
    }
}
