//! Graph value objects: nodes, relationships, batches
//!
//! Plain data carried from extraction to storage. All three types
//! follow the same contract: fluent construction that never fails, an
//! explicit `validate()` gate, and logical immutability once handed to
//! the storage collaborator.

mod batch;
mod node;
mod relationship;

pub use batch::Batch;
pub use node::GraphNode;
pub use relationship::{Relationship, relationship_types};
