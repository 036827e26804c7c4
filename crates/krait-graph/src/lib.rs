//! Krait Graph Core Library
//!
//! This crate provides the knowledge-graph identity core for Krait:
//! - Node-type registry (natural-key schema and validation)
//! - Deterministic, content-addressable ID generation
//! - Taxonomy governance (canonical vocabulary + runtime extensions)
//! - Graph value objects (nodes, relationships, batches)
//! - Storage collaborator boundary (trait + in-memory reference)
//!
//! The point of the core is idempotence: re-extracting the same
//! real-world fact (from a repeated tool run, a retried agent, or a
//! parallel agent) always produces the identical node identifier, so
//! storage can upsert instead of duplicate and relationships reference
//! nodes reliably. Everything here is synchronous, in-memory, and safe
//! under heavy concurrent read access from simultaneously running
//! agents.

pub mod error;
pub mod ident;
pub mod model;
pub mod registry;
pub mod store;
pub mod taxonomy;
pub mod value;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::ident::{NodeIdGenerator, content_fingerprint, generate_id};
    pub use crate::model::{Batch, GraphNode, Relationship, relationship_types};
    pub use crate::registry::{NodeTypeRegistry, node_types};
    pub use crate::store::{GraphStore, MemoryGraphStore};
    pub use crate::value::{PropertyMap, PropertyValue, properties};
}
