//! The configured graph client and its delegate operations.
//!
//! [`RecallClient::connect`] is the single place settings become a client.
//! It applies the chat-model overrides and rebuilds the embedder from the
//! same base URL and key, so a configured `EMBEDDING_MODEL_NAME` is actually
//! honored instead of falling back to the upstream default.

use std::sync::Arc;

use uuid::Uuid;

use recall_core::{EntityEdge, EntityNode, FactResult, Settings};
use recall_graph::{
    EmbedderConfig, GraphClient, GraphConfig, GraphError, LlmConfig, OpenAiEmbedder,
};

use crate::error::ServiceError;

struct ClientInner {
    graph: GraphClient,
    embedder: OpenAiEmbedder,
    llm: LlmConfig,
}

/// The long-lived graph client. Clone is cheap (inner Arc); all clones share
/// one connection pool and embedder.
#[derive(Clone)]
pub struct RecallClient {
    inner: Arc<ClientInner>,
}

impl RecallClient {
    /// Connect to Neo4j and build the fully-configured client.
    pub async fn connect(settings: &Settings) -> Result<Self, ServiceError> {
        let graph_config = GraphConfig {
            uri: settings.neo4j_uri.clone(),
            user: settings.neo4j_user.clone(),
            password: settings.neo4j_password.clone(),
            ..Default::default()
        };
        let graph = GraphClient::connect(&graph_config).await?;

        let llm = llm_config_from(settings);
        let embedder = OpenAiEmbedder::new(embedder_config_from(settings));

        Ok(Self {
            inner: Arc::new(ClientInner {
                graph,
                embedder,
                llm,
            }),
        })
    }

    /// Direct access to the underlying graph client.
    pub fn graph(&self) -> &GraphClient {
        &self.inner.graph
    }

    pub fn embedder(&self) -> &OpenAiEmbedder {
        &self.inner.embedder
    }

    pub fn llm_config(&self) -> &LlmConfig {
        &self.inner.llm
    }

    /// Whether two handles refer to the same underlying client.
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    // ── Delegate Operations ──────────────────────────────────────

    /// Embed and persist an entity node, returning the saved node.
    pub async fn save_entity_node(
        &self,
        name: &str,
        uuid: Uuid,
        group_id: &str,
        summary: &str,
    ) -> Result<EntityNode, ServiceError> {
        let mut node = EntityNode::new(name, uuid, group_id, summary);
        node.name_embedding = Some(self.inner.embedder.embed(name).await?);
        self.inner
            .graph
            .upsert_entity_node(&node)
            .await
            .map_err(ServiceError::from_graph)?;
        Ok(node)
    }

    /// Fetch an entity edge by uuid; a missing edge is a not-found failure.
    pub async fn get_entity_edge(&self, uuid: Uuid) -> Result<EntityEdge, ServiceError> {
        self.inner
            .graph
            .get_entity_edge(uuid)
            .await
            .map_err(ServiceError::from_graph)
    }

    /// Delete everything belonging to a group: edges first, then entity
    /// nodes, then episodes. A group with no edges is not an error.
    pub async fn delete_group(&self, group_id: &str) -> Result<(), ServiceError> {
        let group_ids = vec![group_id.to_string()];

        let edges = match self.inner.graph.entity_edges_by_group(&group_ids).await {
            Ok(edges) => edges,
            Err(GraphError::GroupsEdgesNotFound(_)) => {
                tracing::warn!(group_id, "No edges found for group");
                Vec::new()
            }
            Err(e) => return Err(ServiceError::from_graph(e)),
        };

        let nodes = self
            .inner
            .graph
            .entity_nodes_by_group(&group_ids)
            .await
            .map_err(ServiceError::from_graph)?;

        let episodes = self
            .inner
            .graph
            .episodic_nodes_by_group(&group_ids)
            .await
            .map_err(ServiceError::from_graph)?;

        for edge in &edges {
            self.inner
                .graph
                .delete_entity_edge(edge.uuid)
                .await
                .map_err(ServiceError::from_graph)?;
        }
        for node in &nodes {
            self.inner
                .graph
                .delete_entity_node(node.uuid)
                .await
                .map_err(ServiceError::from_graph)?;
        }
        for episode in &episodes {
            self.inner
                .graph
                .delete_episodic_node(episode.uuid)
                .await
                .map_err(ServiceError::from_graph)?;
        }

        tracing::info!(
            group_id,
            edges = edges.len(),
            nodes = nodes.len(),
            episodes = episodes.len(),
            "Deleted group"
        );
        Ok(())
    }

    /// Delete an entity edge by uuid; a missing edge is a not-found failure.
    pub async fn delete_entity_edge(&self, uuid: Uuid) -> Result<(), ServiceError> {
        // Fetch first so a missing edge surfaces as not-found rather than a
        // silent no-op delete.
        let edge = self
            .inner
            .graph
            .get_entity_edge(uuid)
            .await
            .map_err(ServiceError::from_graph)?;
        self.inner
            .graph
            .delete_entity_edge(edge.uuid)
            .await
            .map_err(ServiceError::from_graph)
    }

    /// Delete an episodic node by uuid; a missing episode is a not-found
    /// failure.
    pub async fn delete_episodic_node(&self, uuid: Uuid) -> Result<(), ServiceError> {
        let episode = self
            .inner
            .graph
            .get_episodic_node(uuid)
            .await
            .map_err(ServiceError::from_graph)?;
        self.inner
            .graph
            .delete_episodic_node(episode.uuid)
            .await
            .map_err(ServiceError::from_graph)
    }

    /// Shape an edge for transport.
    pub fn fact_result(&self, edge: &EntityEdge) -> FactResult {
        FactResult::from(edge)
    }
}

// ── Factory Configuration ────────────────────────────────────────

/// Chat-model configuration with environment overrides applied.
pub(crate) fn llm_config_from(settings: &Settings) -> LlmConfig {
    let mut llm = LlmConfig::default();
    if let Some(base_url) = &settings.openai_base_url {
        llm.base_url = Some(base_url.clone());
    }
    if let Some(api_key) = &settings.openai_api_key {
        llm.api_key = Some(api_key.clone());
    }
    if let Some(model) = &settings.model_name {
        llm.model = model.clone();
        llm.small_model = model.clone();
    }
    llm
}

/// Embedder configuration sharing the chat model's base URL and key.
///
/// When no embedding model is configured the default model is used, still
/// against the configured endpoint.
pub(crate) fn embedder_config_from(settings: &Settings) -> EmbedderConfig {
    let mut config = EmbedderConfig {
        api_key: settings.openai_api_key.clone().unwrap_or_default(),
        base_url: settings.openai_base_url.clone(),
        ..Default::default()
    };
    if let Some(model) = &settings.embedding_model_name {
        config.model = model.clone();
        if config.api_key.is_empty() {
            // Local endpoints (Ollama) require a non-empty key.
            config.api_key = "ollama".to_string();
        }
    }
    config
}
