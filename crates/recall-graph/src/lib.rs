//! recall-graph — Neo4j persistence for the recall knowledge graph.
//!
//! This crate is the persistence surface the service delegates forward to:
//! entity nodes, entity edges, and episodic nodes, plus the OpenAI-compatible
//! embedder and the LLM client configuration slot. All graph reads and writes
//! flow through [`GraphClient`].

pub mod client;
pub mod edges;
pub mod embedder;
pub mod llm;
pub mod nodes;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use embedder::{EmbedderConfig, EmbedderError, OpenAiEmbedder};
pub use llm::LlmConfig;
