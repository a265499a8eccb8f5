//! Core domain types for the recall knowledge graph.
//!
//! These mirror the graph library's data model: entity nodes and edges carry
//! bi-temporal metadata (real-world validity plus graph transaction time),
//! episodic nodes record discrete ingested events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Entity Nodes ──────────────────────────────────────────────────

/// A vertex in the knowledge graph representing a real-world entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityNode {
    pub uuid: Uuid,
    pub name: String,
    pub group_id: String,
    pub summary: String,
    /// Embedding of `name`, populated before save.
    pub name_embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}

impl EntityNode {
    /// Build a new node with no embedding yet.
    pub fn new(
        name: impl Into<String>,
        uuid: Uuid,
        group_id: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            uuid,
            name: name.into(),
            group_id: group_id.into(),
            summary: summary.into(),
            name_embedding: None,
            created_at: Utc::now(),
        }
    }
}

// ── Entity Edges ──────────────────────────────────────────────────

/// A factual relationship between two entity nodes.
///
/// - Valid time (`valid_at` / `invalid_at`): when the fact held in the
///   real world.
/// - Transaction time (`created_at` / `expired_at`): when the edge exists
///   in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityEdge {
    pub uuid: Uuid,
    pub source_node_uuid: Uuid,
    pub target_node_uuid: Uuid,
    /// Relationship label (e.g. "WORKS_AT").
    pub name: String,
    /// Human-readable fact string.
    pub fact: String,
    pub fact_embedding: Option<Vec<f32>>,
    pub group_id: String,
    pub created_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
    pub valid_at: Option<DateTime<Utc>>,
    pub invalid_at: Option<DateTime<Utc>>,
}

// ── Episodic Nodes ────────────────────────────────────────────────

/// The source type of an ingested episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeType {
    Message,
    Json,
    Text,
}

/// A graph record representing a discrete ingested event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodicNode {
    pub uuid: Uuid,
    pub name: String,
    pub group_id: String,
    pub source: EpisodeType,
    pub source_description: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub valid_at: DateTime<Utc>,
    /// Uuids of entity edges extracted from this episode.
    pub entity_edges: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_node_has_no_embedding() {
        let node = EntityNode::new("Alice", Uuid::new_v4(), "group-1", "a person");
        assert!(node.name_embedding.is_none());
        assert_eq!(node.group_id, "group-1");
    }

    #[test]
    fn test_episode_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&EpisodeType::Message).unwrap(),
            "\"message\""
        );
        assert_eq!(serde_json::to_string(&EpisodeType::Json).unwrap(), "\"json\"");
    }
}
