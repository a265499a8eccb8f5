//! Error surface the hosting service maps onto HTTP responses.

use thiserror::Error;

use recall_graph::{EmbedderError, GraphError};

/// Errors returned by the delegate operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A missing edge or episode, carrying the library's own message text.
    #[error("{0}")]
    NotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Embedder(#[from] EmbedderError),
}

impl ServiceError {
    /// HTTP status the hosting service should respond with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// Translate graph-level not-found variants into a user-facing
    /// not-found failure; everything else passes through unchanged.
    pub(crate) fn from_graph(err: GraphError) -> Self {
        match err {
            GraphError::EdgeNotFound(_) | GraphError::NodeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            other => Self::Graph(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_missing_edge_maps_to_404_with_message() {
        let uuid = Uuid::new_v4();
        let err = ServiceError::from_graph(GraphError::EdgeNotFound(uuid));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), format!("edge {uuid} not found"));
    }

    #[test]
    fn test_missing_node_maps_to_404_with_message() {
        let uuid = Uuid::new_v4();
        let err = ServiceError::from_graph(GraphError::NodeNotFound(uuid));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), format!("node {uuid} not found"));
    }

    #[test]
    fn test_other_graph_errors_stay_internal() {
        let err = ServiceError::from_graph(GraphError::Connection("refused".to_string()));
        assert_eq!(err.status_code(), 500);
        assert!(matches!(err, ServiceError::Graph(_)));
    }

    #[test]
    fn test_group_edges_not_found_is_not_a_404() {
        // delete_group handles this variant itself; if it ever leaks, it is
        // an internal error, not a user-facing not-found.
        let err = ServiceError::from_graph(GraphError::GroupsEdgesNotFound(vec![
            "g1".to_string(),
        ]));
        assert_eq!(err.status_code(), 500);
    }
}
