//! Environment-derived settings for the recall service.
//!
//! Loaded from (in priority order):
//! 1. Environment variables (`NEO4J_URI`, `OPENAI_API_KEY`, `MODEL_NAME`, …)
//! 2. Config file (`recall.toml`)
//! 3. Defaults
//!
//! The shared client reads these exactly once, on first access.

use serde::Deserialize;

/// Connection and model configuration for the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Bolt URI of the Neo4j instance.
    #[serde(default = "default_neo4j_uri")]
    pub neo4j_uri: String,

    #[serde(default = "default_neo4j_user")]
    pub neo4j_user: String,

    #[serde(default = "default_neo4j_password")]
    pub neo4j_password: String,

    /// Base URL of an OpenAI-compatible API. When unset, the upstream default.
    #[serde(default)]
    pub openai_base_url: Option<String>,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Chat model name; applied to both the model and small-model slots.
    #[serde(default)]
    pub model_name: Option<String>,

    /// Embedding model name. When set, the embedder is rebuilt to use it
    /// together with the chat model's base URL and key.
    #[serde(default)]
    pub embedding_model_name: Option<String>,
}

impl Settings {
    /// Load settings from `recall.toml` (if present) and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("recall").required(false))
            .add_source(config::Environment::default())
            .build()?;
        Self::from_config(cfg)
    }

    /// Deserialize settings out of an already-built config source.
    pub fn from_config(cfg: config::Config) -> Result<Self, config::ConfigError> {
        cfg.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            neo4j_uri: default_neo4j_uri(),
            neo4j_user: default_neo4j_user(),
            neo4j_password: default_neo4j_password(),
            openai_base_url: None,
            openai_api_key: None,
            model_name: None,
            embedding_model_name: None,
        }
    }
}

fn default_neo4j_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_neo4j_user() -> String {
    "neo4j".to_string()
}

fn default_neo4j_password() -> String {
    "recall-dev".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(settings.neo4j_user, "neo4j");
        assert!(settings.openai_base_url.is_none());
        assert!(settings.model_name.is_none());
        assert!(settings.embedding_model_name.is_none());
    }

    #[test]
    fn test_settings_from_file_source() {
        let toml = r#"
            neo4j_uri = "bolt://db:7687"
            neo4j_password = "secret"
            openai_base_url = "http://ollama:11434/v1"
            model_name = "llama3.1"
            embedding_model_name = "nomic-embed-text"
        "#;
        let cfg = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap();

        let settings = Settings::from_config(cfg).unwrap();
        assert_eq!(settings.neo4j_uri, "bolt://db:7687");
        assert_eq!(settings.neo4j_user, "neo4j");
        assert_eq!(settings.neo4j_password, "secret");
        assert_eq!(
            settings.openai_base_url.as_deref(),
            Some("http://ollama:11434/v1")
        );
        assert_eq!(settings.model_name.as_deref(), Some("llama3.1"));
        assert_eq!(
            settings.embedding_model_name.as_deref(),
            Some("nomic-embed-text")
        );
        assert!(settings.openai_api_key.is_none());
    }

    #[test]
    fn test_empty_source_falls_back_to_defaults() {
        let cfg = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap();

        let settings = Settings::from_config(cfg).unwrap();
        assert_eq!(settings.neo4j_uri, "bolt://localhost:7687");
        assert_eq!(settings.neo4j_password, "recall-dev");
    }
}
