//! Relationships between graph nodes
//!
//! Edges reference nodes by their deterministic ids, so a relationship
//! built from two independently re-extracted nodes still lands on the
//! same endpoints. Construction never fails; validation is the
//! explicit gate before storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{PropertyMap, PropertyValue};

/// Canonical relationship-type names
pub mod relationship_types {
    /// host → port
    pub const HAS_PORT: &str = "HAS_PORT";
    /// port → service
    pub const RUNS_SERVICE: &str = "RUNS_SERVICE";
    /// service → endpoint
    pub const EXPOSES_ENDPOINT: &str = "EXPOSES_ENDPOINT";
    /// domain → subdomain
    pub const HAS_SUBDOMAIN: &str = "HAS_SUBDOMAIN";
    /// domain or subdomain → host
    pub const RESOLVES_TO: &str = "RESOLVES_TO";
    /// service, endpoint, or api → technology
    pub const USES_TECHNOLOGY: &str = "USES_TECHNOLOGY";
    /// service → certificate
    pub const PRESENTS_CERTIFICATE: &str = "PRESENTS_CERTIFICATE";
    /// host → cloud_asset
    pub const HOSTED_ON: &str = "HOSTED_ON";
    /// finding → affected asset
    pub const AFFECTS: &str = "AFFECTS";
    /// finding → evidence
    pub const HAS_EVIDENCE: &str = "HAS_EVIDENCE";
    /// finding → mitigation
    pub const MITIGATED_BY: &str = "MITIGATED_BY";
    /// finding → agent_run
    pub const DISCOVERED_BY: &str = "DISCOVERED_BY";
    /// finding or tool_execution → technique
    pub const USES_TECHNIQUE: &str = "USES_TECHNIQUE";
    /// technique → tactic
    pub const PART_OF_TACTIC: &str = "PART_OF_TACTIC";
    /// agent_run → tool_execution
    pub const EXECUTED: &str = "EXECUTED";
    /// agent_run → llm_call
    pub const INVOKED: &str = "INVOKED";
    /// agent_run → mission
    pub const PART_OF: &str = "PART_OF";
    /// mission or agent_run → intelligence
    pub const PRODUCED: &str = "PRODUCED";
    /// generic association, bidirectional
    pub const RELATED_TO: &str = "RELATED_TO";
}

/// A typed edge between two nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Source node id
    pub from_id: String,
    /// Target node id
    pub to_id: String,
    /// Relationship type name (canonical or custom)
    pub rel_type: String,
    /// Named properties on the edge
    pub properties: PropertyMap,
    /// Whether the edge reads in both directions
    pub bidirectional: bool,
    /// When the relationship was created
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new relationship between two node ids
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        rel_type: impl Into<String>,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            rel_type: rel_type.into(),
            properties: PropertyMap::new(),
            bidirectional: false,
            created_at: Utc::now(),
        }
    }

    /// Set a property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Mark the relationship as bidirectional
    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    /// Validate this relationship before handing it to storage
    ///
    /// Both endpoint ids and the type must be non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.from_id.trim().is_empty() {
            return Err(Error::validation(
                "Relationship",
                "from_id must not be empty",
            ));
        }
        if self.to_id.trim().is_empty() {
            return Err(Error::validation("Relationship", "to_id must not be empty"));
        }
        if self.rel_type.trim().is_empty() {
            return Err(Error::validation(
                "Relationship",
                "relationship type must not be empty",
            ));
        }
        Ok(())
    }
}
