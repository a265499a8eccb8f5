//! Persistence for entity and episodic nodes.
//!
//! All writes use MERGE (upsert) semantics keyed on uuid. Timestamps are
//! stored as RFC 3339 strings, embeddings as float lists.

use chrono::{DateTime, Utc};
use neo4rs::query;
use uuid::Uuid;

use recall_core::{EntityNode, EpisodeType, EpisodicNode};

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    // ── Entity Nodes ─────────────────────────────────────────────

    /// Upsert an entity node keyed on its uuid.
    pub async fn upsert_entity_node(&self, node: &EntityNode) -> Result<(), GraphError> {
        let q = query(
            "MERGE (n:Entity {uuid: $uuid})
             ON CREATE SET
               n.name = $name, n.group_id = $group_id, n.summary = $summary,
               n.name_embedding = $name_embedding, n.created_at = $created_at
             ON MATCH SET
               n.name = $name, n.group_id = $group_id, n.summary = $summary,
               n.name_embedding = $name_embedding",
        )
        .param("uuid", node.uuid.to_string())
        .param("name", node.name.clone())
        .param("group_id", node.group_id.clone())
        .param("summary", node.summary.clone())
        .param("name_embedding", embedding_param(&node.name_embedding))
        .param("created_at", node.created_at.to_rfc3339());

        self.run(q).await
    }

    /// List all entity nodes belonging to the given groups.
    pub async fn entity_nodes_by_group(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<EntityNode>, GraphError> {
        let q = query(
            "MATCH (n:Entity)
             WHERE n.group_id IN $group_ids
             RETURN n",
        )
        .param("group_ids", group_ids.to_vec());

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize entity node: {e}"))
            })?;
            results.push(entity_node_from_neo4j(&node)?);
        }
        Ok(results)
    }

    /// Delete an entity node and any relationships attached to it.
    pub async fn delete_entity_node(&self, uuid: Uuid) -> Result<(), GraphError> {
        let q = query(
            "MATCH (n:Entity {uuid: $uuid})
             DETACH DELETE n",
        )
        .param("uuid", uuid.to_string());

        self.run(q).await
    }

    // ── Episodic Nodes ───────────────────────────────────────────

    /// Upsert an episodic node keyed on its uuid.
    pub async fn upsert_episodic_node(&self, episode: &EpisodicNode) -> Result<(), GraphError> {
        let q = query(
            "MERGE (n:Episodic {uuid: $uuid})
             ON CREATE SET
               n.name = $name, n.group_id = $group_id, n.source = $source,
               n.source_description = $source_description, n.content = $content,
               n.created_at = $created_at, n.valid_at = $valid_at,
               n.entity_edges = $entity_edges
             ON MATCH SET
               n.name = $name, n.group_id = $group_id, n.source = $source,
               n.source_description = $source_description, n.content = $content,
               n.valid_at = $valid_at, n.entity_edges = $entity_edges",
        )
        .param("uuid", episode.uuid.to_string())
        .param("name", episode.name.clone())
        .param("group_id", episode.group_id.clone())
        .param("source", ser(&episode.source))
        .param("source_description", episode.source_description.clone())
        .param("content", episode.content.clone())
        .param("created_at", episode.created_at.to_rfc3339())
        .param("valid_at", episode.valid_at.to_rfc3339())
        .param(
            "entity_edges",
            episode
                .entity_edges
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>(),
        );

        self.run(q).await
    }

    /// Fetch an episodic node by uuid.
    pub async fn get_episodic_node(&self, uuid: Uuid) -> Result<EpisodicNode, GraphError> {
        let q = query(
            "MATCH (n:Episodic {uuid: $uuid})
             RETURN n",
        )
        .param("uuid", uuid.to_string());

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("n").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize episodic node: {e}"))
                })?;
                episodic_node_from_neo4j(&node)
            }
            None => Err(GraphError::NodeNotFound(uuid)),
        }
    }

    /// List all episodic nodes belonging to the given groups.
    pub async fn episodic_nodes_by_group(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<EpisodicNode>, GraphError> {
        let q = query(
            "MATCH (n:Episodic)
             WHERE n.group_id IN $group_ids
             RETURN n",
        )
        .param("group_ids", group_ids.to_vec());

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize episodic node: {e}"))
            })?;
            results.push(episodic_node_from_neo4j(&node)?);
        }
        Ok(results)
    }

    /// Delete an episodic node.
    pub async fn delete_episodic_node(&self, uuid: Uuid) -> Result<(), GraphError> {
        let q = query(
            "MATCH (n:Episodic {uuid: $uuid})
             DETACH DELETE n",
        )
        .param("uuid", uuid.to_string());

        self.run(q).await
    }
}

// ── Row Conversion ───────────────────────────────────────────────

fn entity_node_from_neo4j(node: &neo4rs::Node) -> Result<EntityNode, GraphError> {
    Ok(EntityNode {
        uuid: parse_uuid(&required_string(node, "uuid")?)?,
        name: node.get::<String>("name").unwrap_or_default(),
        group_id: node.get::<String>("group_id").unwrap_or_default(),
        summary: node.get::<String>("summary").unwrap_or_default(),
        name_embedding: read_embedding(node, "name_embedding"),
        created_at: parse_dt(&required_string(node, "created_at")?)?,
    })
}

fn episodic_node_from_neo4j(node: &neo4rs::Node) -> Result<EpisodicNode, GraphError> {
    let source = parse_episode_source(&required_string(node, "source")?)?;
    let entity_edges = node
        .get::<Vec<String>>("entity_edges")
        .unwrap_or_default()
        .iter()
        .map(|s| parse_uuid(s))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(EpisodicNode {
        uuid: parse_uuid(&required_string(node, "uuid")?)?,
        name: node.get::<String>("name").unwrap_or_default(),
        group_id: node.get::<String>("group_id").unwrap_or_default(),
        source,
        source_description: node.get::<String>("source_description").unwrap_or_default(),
        content: node.get::<String>("content").unwrap_or_default(),
        created_at: parse_dt(&required_string(node, "created_at")?)?,
        valid_at: parse_dt(&required_string(node, "valid_at")?)?,
        entity_edges,
    })
}

fn required_string(node: &neo4rs::Node, key: &str) -> Result<String, GraphError> {
    node.get::<String>(key)
        .map_err(|e| GraphError::Serialization(format!("Missing node property {key}: {e}")))
}

// ── Shared Helpers ───────────────────────────────────────────────

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, GraphError> {
    Uuid::parse_str(s).map_err(|e| GraphError::Serialization(format!("Invalid uuid {s}: {e}")))
}

pub(crate) fn parse_dt(s: &str) -> Result<DateTime<Utc>, GraphError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| GraphError::Serialization(format!("Invalid timestamp {s}: {e}")))
}

/// Optional timestamps are stored as empty strings when absent.
pub(crate) fn parse_opt_dt(s: &str) -> Result<Option<DateTime<Utc>>, GraphError> {
    if s.is_empty() {
        Ok(None)
    } else {
        parse_dt(s).map(Some)
    }
}

pub(crate) fn opt_dt(opt: &Option<DateTime<Utc>>) -> String {
    opt.map(|dt| dt.to_rfc3339()).unwrap_or_default()
}

/// Embeddings go over the wire as f64 lists; an empty list means no embedding.
pub(crate) fn embedding_param(opt: &Option<Vec<f32>>) -> Vec<f64> {
    opt.as_ref()
        .map(|v| v.iter().map(|&x| x as f64).collect())
        .unwrap_or_default()
}

pub(crate) fn read_embedding(node: &neo4rs::Node, key: &str) -> Option<Vec<f32>> {
    let values = node.get::<Vec<f64>>(key).unwrap_or_default();
    if values.is_empty() {
        None
    } else {
        Some(values.into_iter().map(|x| x as f32).collect())
    }
}

fn ser<T: serde::Serialize>(val: &T) -> String {
    serde_json::to_string(val).unwrap_or_default()
}

/// A stored source that no longer parses is corrupt data, not a default.
fn parse_episode_source(s: &str) -> Result<EpisodeType, GraphError> {
    serde_json::from_str(s)
        .map_err(|e| GraphError::Serialization(format!("Invalid episode source {s}: {e}")))
}
