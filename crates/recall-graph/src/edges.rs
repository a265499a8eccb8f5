//! Persistence for entity edges (RELATES_TO relationships).

use neo4rs::query;
use uuid::Uuid;

use recall_core::EntityEdge;

use crate::client::{GraphClient, GraphError};
use crate::nodes::{embedding_param, opt_dt, parse_dt, parse_opt_dt, parse_uuid};

impl GraphClient {
    /// Upsert an entity edge between two existing entity nodes, keyed on its
    /// uuid. Both endpoints must already be in the graph.
    pub async fn upsert_entity_edge(&self, edge: &EntityEdge) -> Result<(), GraphError> {
        let q = query(
            "MATCH (a:Entity {uuid: $source_uuid})
             MATCH (b:Entity {uuid: $target_uuid})
             MERGE (a)-[r:RELATES_TO {uuid: $uuid}]->(b)
             ON CREATE SET
               r.name = $name, r.fact = $fact, r.fact_embedding = $fact_embedding,
               r.group_id = $group_id, r.created_at = $created_at,
               r.expired_at = $expired_at, r.valid_at = $valid_at,
               r.invalid_at = $invalid_at
             ON MATCH SET
               r.name = $name, r.fact = $fact, r.fact_embedding = $fact_embedding,
               r.group_id = $group_id, r.expired_at = $expired_at,
               r.valid_at = $valid_at, r.invalid_at = $invalid_at",
        )
        .param("source_uuid", edge.source_node_uuid.to_string())
        .param("target_uuid", edge.target_node_uuid.to_string())
        .param("uuid", edge.uuid.to_string())
        .param("name", edge.name.clone())
        .param("fact", edge.fact.clone())
        .param("fact_embedding", embedding_param(&edge.fact_embedding))
        .param("group_id", edge.group_id.clone())
        .param("created_at", edge.created_at.to_rfc3339())
        .param("expired_at", opt_dt(&edge.expired_at))
        .param("valid_at", opt_dt(&edge.valid_at))
        .param("invalid_at", opt_dt(&edge.invalid_at));

        self.run(q).await
    }

    /// Fetch an entity edge by uuid.
    pub async fn get_entity_edge(&self, uuid: Uuid) -> Result<EntityEdge, GraphError> {
        let q = query(
            "MATCH (a:Entity)-[r:RELATES_TO {uuid: $uuid}]->(b:Entity)
             RETURN r, a.uuid AS source_uuid, b.uuid AS target_uuid",
        )
        .param("uuid", uuid.to_string());

        match self.query_one(q).await? {
            Some(row) => entity_edge_from_row(&row),
            None => Err(GraphError::EdgeNotFound(uuid)),
        }
    }

    /// List all entity edges belonging to the given groups.
    ///
    /// An empty result is reported as [`GraphError::GroupsEdgesNotFound`],
    /// matching the library's behavior for group lookups.
    pub async fn entity_edges_by_group(
        &self,
        group_ids: &[String],
    ) -> Result<Vec<EntityEdge>, GraphError> {
        let q = query(
            "MATCH (a:Entity)-[r:RELATES_TO]->(b:Entity)
             WHERE r.group_id IN $group_ids
             RETURN r, a.uuid AS source_uuid, b.uuid AS target_uuid",
        )
        .param("group_ids", group_ids.to_vec());

        let rows = self.query_rows(q).await?;
        if rows.is_empty() {
            return Err(GraphError::GroupsEdgesNotFound(group_ids.to_vec()));
        }

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(entity_edge_from_row(&row)?);
        }
        Ok(results)
    }

    /// Delete an entity edge.
    pub async fn delete_entity_edge(&self, uuid: Uuid) -> Result<(), GraphError> {
        let q = query(
            "MATCH ()-[r:RELATES_TO {uuid: $uuid}]->()
             DELETE r",
        )
        .param("uuid", uuid.to_string());

        self.run(q).await
    }
}

// ── Row Conversion ───────────────────────────────────────────────

fn entity_edge_from_row(row: &neo4rs::Row) -> Result<EntityEdge, GraphError> {
    let rel: neo4rs::Relation = row
        .get("r")
        .map_err(|e| GraphError::Serialization(format!("Failed to deserialize edge: {e}")))?;
    let source_uuid: String = row
        .get("source_uuid")
        .map_err(|e| GraphError::Serialization(format!("Missing edge source uuid: {e}")))?;
    let target_uuid: String = row
        .get("target_uuid")
        .map_err(|e| GraphError::Serialization(format!("Missing edge target uuid: {e}")))?;

    let fact_embedding = {
        let values = rel.get::<Vec<f64>>("fact_embedding").unwrap_or_default();
        if values.is_empty() {
            None
        } else {
            Some(values.into_iter().map(|x| x as f32).collect())
        }
    };

    Ok(EntityEdge {
        uuid: parse_uuid(&required_string(&rel, "uuid")?)?,
        source_node_uuid: parse_uuid(&source_uuid)?,
        target_node_uuid: parse_uuid(&target_uuid)?,
        name: rel.get::<String>("name").unwrap_or_default(),
        fact: rel.get::<String>("fact").unwrap_or_default(),
        fact_embedding,
        group_id: rel.get::<String>("group_id").unwrap_or_default(),
        created_at: parse_dt(&required_string(&rel, "created_at")?)?,
        expired_at: parse_opt_dt(&rel.get::<String>("expired_at").unwrap_or_default())?,
        valid_at: parse_opt_dt(&rel.get::<String>("valid_at").unwrap_or_default())?,
        invalid_at: parse_opt_dt(&rel.get::<String>("invalid_at").unwrap_or_default())?,
    })
}

fn required_string(rel: &neo4rs::Relation, key: &str) -> Result<String, GraphError> {
    rel.get::<String>(key)
        .map_err(|e| GraphError::Serialization(format!("Missing edge property {key}: {e}")))
}
