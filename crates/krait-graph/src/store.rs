//! Graph storage boundary
//!
//! Persistence lives outside this crate; the [`GraphStore`] trait is
//! the contract the external storage service implements. The in-memory
//! implementation here exists for tests and for harness code that
//! wants graph semantics without a backing database.
//!
//! Contract: batches are ID-keyed upserts, and nodes are processed
//! before relationships so relationship endpoints resolve against the
//! batch's own nodes as well as already-stored ones.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Batch, GraphNode, Relationship};

/// Storage contract for mission knowledge graphs
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Atomically upsert a batch of nodes and relationships
    ///
    /// Nodes are keyed by id: a second upsert of the same id updates
    /// the stored node in place instead of duplicating it.
    async fn upsert_batch(&self, batch: &Batch) -> Result<()>;

    /// Get a node by id
    async fn get_node(&self, id: &str) -> Result<Option<GraphNode>>;

    /// List the relationships touching a node, as source or target
    async fn get_relationships(&self, node_id: &str) -> Result<Vec<Relationship>>;

    /// Number of stored nodes
    async fn node_count(&self) -> Result<u64>;

    /// Number of stored relationships
    async fn relationship_count(&self) -> Result<u64>;
}

/// Relationships are deduplicated on (from, to, type)
type RelationshipKey = (String, String, String);

/// In-memory [`GraphStore`] for tests and storage-less harness runs
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    nodes: RwLock<HashMap<String, GraphNode>>,
    relationships: RwLock<HashMap<RelationshipKey, Relationship>>,
}

impl MemoryGraphStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn upsert_batch(&self, batch: &Batch) -> Result<()> {
        batch.validate()?;
        for node in &batch.nodes {
            if node.id.trim().is_empty() {
                return Err(Error::validation(
                    "GraphNode",
                    format!(
                        "node of type '{}' has no id; storage upserts are ID-keyed",
                        node.node_type
                    ),
                ));
            }
        }

        // Nodes first, so the batch's own relationships can resolve
        // against them.
        {
            let mut nodes = self.nodes.write().unwrap();
            for node in &batch.nodes {
                match nodes.get_mut(&node.id) {
                    Some(existing) => {
                        existing.properties = node.properties.clone();
                        existing.content = node.content.clone();
                        existing.mission_id = node.mission_id.clone();
                        existing.agent_name = node.agent_name.clone();
                        existing.touch();
                    }
                    None => {
                        nodes.insert(node.id.clone(), node.clone());
                    }
                }
            }
        }

        {
            let nodes = self.nodes.read().unwrap();
            let mut relationships = self.relationships.write().unwrap();
            for relationship in &batch.relationships {
                for endpoint in [&relationship.from_id, &relationship.to_id] {
                    if !nodes.contains_key(endpoint.as_str()) {
                        return Err(Error::UnresolvedEndpoint {
                            relationship_type: relationship.rel_type.clone(),
                            endpoint_id: endpoint.clone(),
                        });
                    }
                }
                let key = (
                    relationship.from_id.clone(),
                    relationship.to_id.clone(),
                    relationship.rel_type.clone(),
                );
                relationships.insert(key, relationship.clone());
            }
        }

        debug!(
            batch_id = %batch.batch_id,
            nodes = batch.nodes.len(),
            relationships = batch.relationships.len(),
            "Upserted batch"
        );
        Ok(())
    }

    async fn get_node(&self, id: &str) -> Result<Option<GraphNode>> {
        Ok(self.nodes.read().unwrap().get(id).cloned())
    }

    async fn get_relationships(&self, node_id: &str) -> Result<Vec<Relationship>> {
        Ok(self
            .relationships
            .read()
            .unwrap()
            .values()
            .filter(|r| r.from_id == node_id || r.to_id == node_id)
            .cloned()
            .collect())
    }

    async fn node_count(&self) -> Result<u64> {
        Ok(self.nodes.read().unwrap().len() as u64)
    }

    async fn relationship_count(&self) -> Result<u64> {
        Ok(self.relationships.read().unwrap().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::relationship_types;

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryGraphStore::new();
        let host = GraphNode::host("10.0.0.1").unwrap();
        let (port, link) = GraphNode::port_for(&host, 443, "tcp").unwrap();

        let batch = Batch::new()
            .with_node(host.clone())
            .with_node(port)
            .with_relationship(link);

        store.upsert_batch(&batch).await.unwrap();
        store.upsert_batch(&batch).await.unwrap();

        assert_eq!(store.node_count().await.unwrap(), 2);
        assert_eq!(store.relationship_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let store = MemoryGraphStore::new();
        let first = GraphNode::host("10.0.0.1").unwrap();
        store
            .upsert_batch(&Batch::new().with_node(first.clone()))
            .await
            .unwrap();

        let second = GraphNode::host("10.0.0.1")
            .unwrap()
            .with_property("os", "linux");
        store
            .upsert_batch(&Batch::new().with_node(second))
            .await
            .unwrap();

        assert_eq!(store.node_count().await.unwrap(), 1);
        let stored = store.get_node(&first.id).await.unwrap().unwrap();
        assert!(stored.properties.contains_key("os"));
        assert_eq!(stored.created_at, first.created_at);
    }

    #[tokio::test]
    async fn test_relationship_endpoints_resolve_within_batch() {
        let store = MemoryGraphStore::new();
        let host = GraphNode::host("10.0.0.1").unwrap();
        let (port, link) = GraphNode::port_for(&host, 22, "tcp").unwrap();

        // Host and port arrive in the same batch as the edge.
        let batch = Batch::new()
            .with_node(host.clone())
            .with_node(port.clone())
            .with_relationship(link);
        store.upsert_batch(&batch).await.unwrap();

        let edges = store.get_relationships(&host.id).await.unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to_id, port.id);
    }

    #[tokio::test]
    async fn test_unresolved_endpoint_is_an_error() {
        let store = MemoryGraphStore::new();
        let batch = Batch::new().with_relationship(Relationship::new(
            "host:missing",
            "port:missing",
            relationship_types::HAS_PORT,
        ));

        let err = store.upsert_batch(&batch).await.unwrap_err();
        assert!(matches!(err, Error::UnresolvedEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_node_without_id_is_rejected() {
        let store = MemoryGraphStore::new();
        let batch = Batch::new().with_node(GraphNode::new("host"));
        assert!(store.upsert_batch(&batch).await.is_err());
    }
}
