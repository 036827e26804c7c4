//! Taxonomy governance: the vocabulary of node and relationship types
//!
//! The canonical taxonomy is the governance-approved vocabulary of
//! entity types, relationship types, and attack techniques, with the
//! metadata an LLM-driven agent needs to decide how to structure newly
//! discovered data. Conformance is advisory by design: agents must be
//! free to record entity types the vocabulary has not caught up with,
//! so validation always succeeds and non-canonical names only emit a
//! warning for governance review.
//!
//! Custom vocabularies are layered on additively through named
//! [`TaxonomyExtension`] bundles, one per agent or plugin.

mod catalog;
mod extension;
mod schema;

use std::sync::{Arc, OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub use catalog::{CanonicalTaxonomy, TAXONOMY_VERSION};
pub use extension::{ExtensionRegistry, TaxonomyExtension};
pub use schema::{render_json_catalog, render_node_type_schema, render_prompt_catalog};

/// Display category of a node type
///
/// Categories group types for listings and prompt catalogues; they
/// carry no identity or validation semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Infrastructure discovered on the target (hosts, ports, domains)
    Asset,
    /// Security findings and their supporting material
    Finding,
    /// Mission and agent execution provenance
    Execution,
    /// Attack techniques and tactics
    Attack,
    /// Analyst-grade intelligence notes
    Intelligence,
}

impl NodeCategory {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Finding => "finding",
            Self::Execution => "execution",
            Self::Attack => "attack",
            Self::Intelligence => "intelligence",
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "finding" => Some(Self::Finding),
            "execution" => Some(Self::Execution),
            "attack" => Some(Self::Attack),
            "intelligence" => Some(Self::Intelligence),
            _ => None,
        }
    }

    /// Get all categories
    pub fn all() -> &'static [NodeCategory] {
        &[
            Self::Asset,
            Self::Finding,
            Self::Execution,
            Self::Attack,
            Self::Intelligence,
        ]
    }
}

impl std::fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value kind of a schema property, for display and schema rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    /// Free-form text
    String,
    /// Whole number
    Integer,
    /// Floating-point number
    Float,
    /// True/false flag
    Boolean,
    /// Point in time (RFC 3339 text or epoch integer)
    Timestamp,
    /// Nested document
    Map,
    /// Ordered list
    List,
}

impl PropertyKind {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Map => "map",
            Self::List => "list",
        }
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schema metadata for one property of a node or relationship type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDef {
    /// Property name
    pub name: String,
    /// Value kind
    pub kind: PropertyKind,
    /// What the property holds
    pub description: String,
}

impl PropertyDef {
    /// Create a property definition
    pub fn new(
        name: impl Into<String>,
        kind: PropertyKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
        }
    }
}

/// Schema metadata for a node type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeTypeDef {
    /// Type name as stored in the graph
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Display category
    pub category: NodeCategory,
    /// What the type represents
    pub description: String,
    /// Identifying properties: the type's natural key
    pub required_properties: Vec<PropertyDef>,
    /// Commonly attached auxiliary properties
    pub optional_properties: Vec<PropertyDef>,
}

/// Schema metadata for a relationship type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipTypeDef {
    /// Type name as stored in the graph
    pub name: String,
    /// What the relationship expresses
    pub description: String,
    /// Node types permitted as the source
    pub from_types: Vec<String>,
    /// Node types permitted as the target
    pub to_types: Vec<String>,
    /// Whether the edge reads in both directions
    pub bidirectional: bool,
}

/// Metadata for an attack technique
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueDef {
    /// Technique id (ATT&CK-style, e.g. `T1046`)
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Owning tactic id (e.g. `TA0007`)
    pub tactic_id: String,
    /// What the technique covers
    pub description: String,
}

/// Read-only, advisory view over the canonical vocabulary
pub trait TaxonomyReader: Send + Sync {
    /// Version of the loaded vocabulary
    fn version(&self) -> &str;

    /// Whether a node type belongs to the canonical vocabulary
    fn is_canonical_node_type(&self, name: &str) -> bool;

    /// Whether a relationship type belongs to the canonical vocabulary
    fn is_canonical_relationship_type(&self, name: &str) -> bool;

    /// Advisory node-type validation
    ///
    /// Always returns `true`; a non-canonical name only emits a
    /// warning. Taxonomy conformance is a governance signal, not a
    /// gate.
    fn validate_node_type(&self, name: &str) -> bool {
        if !self.is_canonical_node_type(name) {
            warn!(
                node_type = %name,
                taxonomy_version = %self.version(),
                "Node type is not in the canonical taxonomy"
            );
        }
        true
    }

    /// Advisory relationship-type validation; see
    /// [`TaxonomyReader::validate_node_type`]
    fn validate_relationship_type(&self, name: &str) -> bool {
        if !self.is_canonical_relationship_type(name) {
            warn!(
                relationship_type = %name,
                taxonomy_version = %self.version(),
                "Relationship type is not in the canonical taxonomy"
            );
        }
        true
    }
}

/// Full structured view over the vocabulary, for schema generation
pub trait TaxonomyIntrospector: TaxonomyReader {
    /// All node-type definitions, ascending by name
    fn node_type_defs(&self) -> Vec<NodeTypeDef>;

    /// Look up one node-type definition
    fn node_type_def(&self, name: &str) -> Option<NodeTypeDef>;

    /// All relationship-type definitions, ascending by name
    fn relationship_type_defs(&self) -> Vec<RelationshipTypeDef>;

    /// Look up one relationship-type definition
    fn relationship_type_def(&self, name: &str) -> Option<RelationshipTypeDef>;

    /// All technique definitions, ascending by id
    fn techniques(&self) -> Vec<TechniqueDef>;

    /// Look up one technique by id
    fn technique(&self, id: &str) -> Option<TechniqueDef>;

    /// All technique ids, ascending
    fn technique_ids(&self) -> Vec<String> {
        self.techniques().into_iter().map(|t| t.id).collect()
    }
}

fn taxonomy_slot() -> &'static RwLock<Option<Arc<dyn TaxonomyIntrospector>>> {
    static SLOT: OnceLock<RwLock<Option<Arc<dyn TaxonomyIntrospector>>>> = OnceLock::new();
    SLOT.get_or_init(|| RwLock::new(None))
}

/// Install (or clear) the process-wide taxonomy
///
/// Called once during harness initialization, and by tests. `None` is
/// a fully legal state: consumers skip advisory validation when no
/// taxonomy is configured.
pub fn set_taxonomy(taxonomy: Option<Arc<dyn TaxonomyIntrospector>>) {
    *taxonomy_slot().write().unwrap() = taxonomy;
}

/// Get the process-wide taxonomy, if one is configured
pub fn taxonomy() -> Option<Arc<dyn TaxonomyIntrospector>> {
    taxonomy_slot().read().unwrap().clone()
}

/// Advisory node-type validation against the process-wide taxonomy
///
/// Skips validation (returns `true` silently) when no taxonomy is
/// configured.
pub fn validate_node_type(name: &str) -> bool {
    match taxonomy() {
        Some(taxonomy) => taxonomy.validate_node_type(name),
        None => true,
    }
}

/// Advisory relationship-type validation against the process-wide
/// taxonomy; see [`validate_node_type`]
pub fn validate_relationship_type(name: &str) -> bool {
    match taxonomy() {
        Some(taxonomy) => taxonomy.validate_relationship_type(name),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in NodeCategory::all() {
            assert_eq!(NodeCategory::parse(category.as_str()), Some(*category));
        }
        assert_eq!(NodeCategory::parse("ASSET"), Some(NodeCategory::Asset));
        assert_eq!(NodeCategory::parse("unknown"), None);
    }

    // Single test for the process-global slot so parallel test
    // threads cannot observe each other's set/clear.
    #[test]
    fn test_global_slot_lifecycle() {
        let previous = taxonomy();

        set_taxonomy(None);
        assert!(taxonomy().is_none());
        // Unset is a legal state: validation is skipped, not failed.
        assert!(validate_node_type("anything"));
        assert!(validate_relationship_type("ANYTHING"));

        set_taxonomy(Some(Arc::new(CanonicalTaxonomy::new())));
        let loaded = taxonomy().expect("taxonomy just set");
        assert_eq!(loaded.version(), TAXONOMY_VERSION);
        assert!(validate_node_type("host"));
        // Non-canonical names still validate; advisory only.
        assert!(validate_node_type("wifi_network"));

        set_taxonomy(None);
        assert!(taxonomy().is_none());

        set_taxonomy(previous);
    }
}
