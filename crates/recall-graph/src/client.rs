//! Neo4j connection management and shared graph client.

use neo4rs::{ConfigBuilder, Graph, Query};
use uuid::Uuid;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("edge {0} not found")]
    EdgeNotFound(Uuid),

    #[error("node {0} not found")]
    NodeNotFound(Uuid),

    #[error("no edges found for group ids {0:?}")]
    GroupsEdgesNotFound(Vec<String>),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "recall-dev".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Clone is cheap (inner Arc); every persistence call in this crate goes
/// through one of the query helpers below.
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }

    /// Create the uniqueness constraints and range indexes the graph schema
    /// relies on. Idempotent; run once at service startup.
    pub async fn build_indices_and_constraints(&self) -> Result<(), GraphError> {
        let statements = [
            "CREATE CONSTRAINT entity_uuid IF NOT EXISTS
             FOR (n:Entity) REQUIRE n.uuid IS UNIQUE",
            "CREATE CONSTRAINT episodic_uuid IF NOT EXISTS
             FOR (n:Episodic) REQUIRE n.uuid IS UNIQUE",
            "CREATE INDEX entity_group_id IF NOT EXISTS
             FOR (n:Entity) ON (n.group_id)",
            "CREATE INDEX episodic_group_id IF NOT EXISTS
             FOR (n:Episodic) ON (n.group_id)",
            "CREATE INDEX relates_to_group_id IF NOT EXISTS
             FOR ()-[r:RELATES_TO]-() ON (r.group_id)",
        ];

        for statement in statements {
            self.run(neo4rs::query(statement)).await?;
        }
        tracing::info!("Graph indices and constraints in place");
        Ok(())
    }
}
