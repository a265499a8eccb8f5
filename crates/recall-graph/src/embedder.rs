//! OpenAI-compatible embedding client.
//!
//! Used by the service to embed entity names before persisting them. The
//! base URL is configurable so the same client works against OpenAI proper
//! or a local endpoint such as Ollama.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig, error::OpenAIError, types::CreateEmbeddingRequestArgs, Client,
};
use backoff::{future::retry, ExponentialBackoffBuilder};

/// Default embedding model when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Maximum number of inputs per embeddings API call.
const BATCH_CHUNK_SIZE: usize = 2048;

/// Errors from the embedding client.
#[derive(Debug, thiserror::Error)]
pub enum EmbedderError {
    #[error("embedding API error: {0}")]
    Api(String),

    #[error("empty response from embedding API")]
    EmptyResponse,
}

/// Configuration for the embedding client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedderConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API; upstream default when unset.
    pub base_url: Option<String>,
    pub model: String,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

/// Embedding client over `async-openai`.
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    config: EmbedderConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbedderConfig) -> Self {
        let mut api_config = OpenAIConfig::new().with_api_key(config.api_key.clone());
        if let Some(base_url) = &config.base_url {
            api_config = api_config.with_api_base(base_url.clone());
        }
        Self {
            client: Client::with_config(api_config),
            config,
        }
    }

    /// The configuration this embedder was built from.
    pub fn config(&self) -> &EmbedderConfig {
        &self.config
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Embed a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        let mut embeddings = self.embed_chunk(&[text]).await?;
        embeddings.pop().ok_or(EmbedderError::EmptyResponse)
    }

    /// Embed multiple texts, splitting into API-sized chunks.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let mut result = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(BATCH_CHUNK_SIZE) {
            result.extend(self.embed_chunk(chunk).await?);
        }
        Ok(result)
    }

    /// One embeddings API call, retried on transient network failures with
    /// exponential back-off (initial 500 ms, cap 10 s, budget 60 s).
    async fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        let backoff_policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(500))
            .with_max_interval(Duration::from_secs(10))
            .with_max_elapsed_time(Some(Duration::from_secs(60)))
            .build();

        let input: Vec<String> = texts.iter().map(|s| (*s).to_owned()).collect();
        let model = self.config.model.clone();
        let client = self.client.clone();

        retry(backoff_policy, move || {
            let input = input.clone();
            let model = model.clone();
            let client = client.clone();
            async move {
                let request = CreateEmbeddingRequestArgs::default()
                    .model(model.as_str())
                    .input(input)
                    .build()
                    .map_err(|e| backoff::Error::permanent(EmbedderError::Api(e.to_string())))?;

                let response = client
                    .embeddings()
                    .create(request)
                    .await
                    .map_err(classify_error)?;

                let embeddings: Vec<Vec<f32>> = response
                    .data
                    .into_iter()
                    .map(|item| item.embedding)
                    .collect();

                Ok(embeddings)
            }
        })
        .await
    }
}

/// Transient failures (timeouts, connection refused) retry; anything else
/// (auth errors, bad requests) fails immediately.
fn classify_error(err: OpenAIError) -> backoff::Error<EmbedderError> {
    let msg = err.to_string();
    match &err {
        OpenAIError::Reqwest(e) if e.is_timeout() || e.is_connect() => {
            backoff::Error::transient(EmbedderError::Api(msg))
        }
        _ => backoff::Error::permanent(EmbedderError::Api(msg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn make_response(count: usize, dim: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                serde_json::json!({
                    "object": "embedding",
                    "index": i,
                    "embedding": vec![0.25_f32; dim],
                })
            })
            .collect();
        serde_json::json!({
            "object": "list",
            "data": data,
            "model": DEFAULT_EMBEDDING_MODEL,
            "usage": { "prompt_tokens": 4, "total_tokens": 4 },
        })
    }

    fn embedder(server: &MockServer) -> OpenAiEmbedder {
        OpenAiEmbedder::new(EmbedderConfig {
            api_key: "sk-test".to_string(),
            base_url: Some(server.uri()),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        })
    }

    #[tokio::test]
    async fn test_embed_returns_vector_of_expected_length() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(make_response(1, 8)))
            .mount(&server)
            .await;

        let embedding = embedder(&server).embed("Alice").await.unwrap();
        assert_eq!(embedding.len(), 8);
        assert!((embedding[0] - 0.25).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_embed_batch_returns_one_embedding_per_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(make_response(3, 4)))
            .mount(&server)
            .await;

        let embeddings = embedder(&server)
            .embed_batch(&["a", "b", "c"])
            .await
            .unwrap();
        assert_eq!(embeddings.len(), 3);
    }

    #[tokio::test]
    async fn test_embed_batch_empty_input_makes_no_call() {
        let server = MockServer::start().await;
        let embeddings = embedder(&server).embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }

    #[tokio::test]
    async fn test_empty_data_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [],
                "model": DEFAULT_EMBEDDING_MODEL,
                "usage": { "prompt_tokens": 0, "total_tokens": 0 },
            })))
            .mount(&server)
            .await;

        let result = embedder(&server).embed("Alice").await;
        assert!(matches!(result, Err(EmbedderError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_auth_failure_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {
                    "message": "Incorrect API key provided.",
                    "type": "authentication_error",
                    "param": null,
                    "code": "invalid_api_key",
                }
            })))
            .mount(&server)
            .await;

        let result = embedder(&server).embed("Alice").await;
        assert!(matches!(result, Err(EmbedderError::Api(_))));
    }

    #[test]
    fn test_default_config_uses_default_model() {
        let config = EmbedderConfig::default();
        assert_eq!(config.model, DEFAULT_EMBEDDING_MODEL);
        assert!(config.base_url.is_none());
    }
}
