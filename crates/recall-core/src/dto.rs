//! Transport DTOs for the hosting service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::EntityEdge;

/// An entity edge flattened into the shape the service returns to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactResult {
    pub uuid: Uuid,
    pub name: String,
    pub fact: String,
    pub valid_at: Option<DateTime<Utc>>,
    pub invalid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl From<&EntityEdge> for FactResult {
    fn from(edge: &EntityEdge) -> Self {
        Self {
            uuid: edge.uuid,
            name: edge.name.clone(),
            fact: edge.fact.clone(),
            valid_at: edge.valid_at,
            invalid_at: edge.invalid_at,
            created_at: edge.created_at,
            expired_at: edge.expired_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_result_from_edge() {
        let now = Utc::now();
        let edge = EntityEdge {
            uuid: Uuid::new_v4(),
            source_node_uuid: Uuid::new_v4(),
            target_node_uuid: Uuid::new_v4(),
            name: "WORKS_AT".to_string(),
            fact: "Alice works at Acme".to_string(),
            fact_embedding: None,
            group_id: "group-1".to_string(),
            created_at: now,
            expired_at: None,
            valid_at: Some(now),
            invalid_at: None,
        };

        let fact = FactResult::from(&edge);
        assert_eq!(fact.uuid, edge.uuid);
        assert_eq!(fact.name, "WORKS_AT");
        assert_eq!(fact.fact, "Alice works at Acme");
        assert_eq!(fact.valid_at, Some(now));
        assert!(fact.expired_at.is_none());
    }

    #[test]
    fn test_fact_result_drops_embedding() {
        let edge = EntityEdge {
            uuid: Uuid::new_v4(),
            source_node_uuid: Uuid::new_v4(),
            target_node_uuid: Uuid::new_v4(),
            name: "KNOWS".to_string(),
            fact: "Alice knows Bob".to_string(),
            fact_embedding: Some(vec![0.1, 0.2]),
            group_id: "group-1".to_string(),
            created_at: Utc::now(),
            expired_at: None,
            valid_at: None,
            invalid_at: None,
        };

        let json = serde_json::to_value(FactResult::from(&edge)).unwrap();
        assert!(json.get("fact_embedding").is_none());
    }
}
