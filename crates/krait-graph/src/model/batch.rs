//! Atomic batches of nodes and relationships
//!
//! Extraction accumulates the entities of one tool run into a batch
//! and hands it to the storage collaborator for a single atomic
//! upsert. Storage processes nodes before relationships so endpoints
//! resolve; the batch preserves insertion order of each list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::model::node::GraphNode;
use crate::model::relationship::Relationship;

/// An ordered collection of nodes and relationships submitted together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Provenance id for logging and audit, not content-addressed
    pub batch_id: Uuid,
    /// Nodes, in insertion order
    pub nodes: Vec<GraphNode>,
    /// Relationships, in insertion order
    pub relationships: Vec<Relationship>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            nodes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// Add a node
    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.push(node);
    }

    /// Add a relationship
    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
    }

    /// Add a node, chaining
    pub fn with_node(mut self, node: GraphNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add a relationship, chaining
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Absorb another batch's entities, preserving order
    pub fn merge(&mut self, other: Batch) {
        self.nodes.extend(other.nodes);
        self.relationships.extend(other.relationships);
    }

    /// Total number of entities in the batch
    pub fn len(&self) -> usize {
        self.nodes.len() + self.relationships.len()
    }

    /// Whether the batch holds no entities
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    /// Validate every entity in the batch
    ///
    /// Reports the first failure. Mandatory before handing the batch
    /// to storage.
    pub fn validate(&self) -> Result<()> {
        for node in &self.nodes {
            node.validate()?;
        }
        for relationship in &self.relationships {
            relationship.validate()?;
        }
        Ok(())
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::relationship::relationship_types;

    #[test]
    fn test_batch_accumulates_in_order() {
        let host = GraphNode::host("10.0.0.1").unwrap();
        let (port, link) = GraphNode::port_for(&host, 443, "tcp").unwrap();

        let mut batch = Batch::new();
        batch.add_node(host.clone());
        batch.add_node(port.clone());
        batch.add_relationship(link);

        assert_eq!(batch.len(), 3);
        assert!(!batch.is_empty());
        assert_eq!(batch.nodes[0].id, host.id);
        assert_eq!(batch.nodes[1].id, port.id);
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_batch_chaining() {
        let host = GraphNode::host("10.0.0.2").unwrap();
        let batch = Batch::new()
            .with_node(host.clone())
            .with_relationship(Relationship::new(
                host.id.clone(),
                host.id.clone(),
                relationship_types::RELATED_TO,
            ));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_validate_surfaces_invalid_member() {
        let batch = Batch::new().with_node(GraphNode::new(""));
        assert!(batch.validate().is_err());

        let batch = Batch::new().with_relationship(Relationship::new("", "x", "Y"));
        assert!(batch.validate().is_err());
    }

    #[test]
    fn test_merge() {
        let mut first = Batch::new().with_node(GraphNode::host("10.0.0.1").unwrap());
        let second = Batch::new().with_node(GraphNode::host("10.0.0.2").unwrap());
        first.merge(second);
        assert_eq!(first.nodes.len(), 2);
    }
}
