//! LLM client configuration.
//!
//! The service only configures the chat model (base URL, key, model names);
//! generation itself happens elsewhere in the graph pipeline. Keeping the
//! config as a plain struct lets the factory override individual fields
//! without rebuilding the whole client.

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default model for cheap auxiliary calls.
pub const DEFAULT_SMALL_MODEL: &str = "gpt-4o-mini";

/// Connection and model configuration for the chat LLM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API; upstream default when unset.
    pub base_url: Option<String>,
    pub model: String,
    /// Model used for summarization and other cheap auxiliary calls.
    pub small_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            small_model: DEFAULT_SMALL_MODEL.to_string(),
        }
    }
}
