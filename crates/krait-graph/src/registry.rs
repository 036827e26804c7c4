//! Node-type registry: the natural-key schema for graph entities
//!
//! Every node type has a set of identifying properties that form its
//! natural key. Two property maps that agree on that key denote the
//! same logical entity and must receive the same deterministic ID, so
//! the registry's table is authoritative: changing an entry changes
//! every ID derived for that type.
//!
//! The registry is read-heavy. Agents running in parallel consult it
//! on every extracted entity, while writes happen only at process or
//! test setup, so a single reader-writer lock guards the map.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::value::PropertyMap;

/// Canonical node-type names
pub mod node_types {
    /// A network host, keyed by IP address
    pub const HOST: &str = "host";
    /// A transport-layer port on a host
    pub const PORT: &str = "port";
    /// A service listening on a port
    pub const SERVICE: &str = "service";
    /// An HTTP endpoint exposed by a service
    pub const ENDPOINT: &str = "endpoint";
    /// A registered domain name
    pub const DOMAIN: &str = "domain";
    /// A subdomain of a parent domain
    pub const SUBDOMAIN: &str = "subdomain";
    /// An API surface, keyed by base URL
    pub const API: &str = "api";
    /// A detected technology (product + version)
    pub const TECHNOLOGY: &str = "technology";
    /// A TLS certificate, keyed by fingerprint
    pub const CERTIFICATE: &str = "certificate";
    /// A cloud resource (provider + resource id)
    pub const CLOUD_ASSET: &str = "cloud_asset";
    /// A security finding within a mission
    pub const FINDING: &str = "finding";
    /// Evidence attached to a finding
    pub const EVIDENCE: &str = "evidence";
    /// A mitigation proposed for a finding
    pub const MITIGATION: &str = "mitigation";
    /// A security-testing campaign
    pub const MISSION: &str = "mission";
    /// One agent execution within a mission
    pub const AGENT_RUN: &str = "agent_run";
    /// An agent execution scoped to a specific mission run
    pub const MISSION_RUN_AGENT: &str = "mission_run_agent";
    /// One tool invocation within an agent run
    pub const TOOL_EXECUTION: &str = "tool_execution";
    /// One LLM completion call within an agent run
    pub const LLM_CALL: &str = "llm_call";
    /// An attack technique (ATT&CK-style id)
    pub const TECHNIQUE: &str = "technique";
    /// An attack tactic (ATT&CK-style id)
    pub const TACTIC: &str = "tactic";
    /// An intelligence note produced during a mission
    pub const INTELLIGENCE: &str = "intelligence";
}

/// The canonical node-type → identifying-properties table
///
/// Reproduced exactly for interoperability with already-generated IDs.
const CANONICAL_TABLE: &[(&str, &[&str])] = &[
    (node_types::HOST, &["ip"]),
    (node_types::PORT, &["host_id", "number", "protocol"]),
    (node_types::SERVICE, &["port_id", "name"]),
    (node_types::ENDPOINT, &["service_id", "url", "method"]),
    (node_types::DOMAIN, &["name"]),
    (node_types::SUBDOMAIN, &["parent_domain", "name"]),
    (node_types::API, &["base_url"]),
    (node_types::TECHNOLOGY, &["name", "version"]),
    (node_types::CERTIFICATE, &["fingerprint"]),
    (node_types::CLOUD_ASSET, &["provider", "resource_id"]),
    (node_types::FINDING, &["mission_id", "fingerprint"]),
    (node_types::EVIDENCE, &["finding_id", "type", "fingerprint"]),
    (node_types::MITIGATION, &["finding_id", "title"]),
    (node_types::MISSION, &["name", "timestamp"]),
    (node_types::AGENT_RUN, &["mission_id", "agent_name", "run_number"]),
    (node_types::MISSION_RUN_AGENT, &["mission_run_id", "agent_name"]),
    (node_types::TOOL_EXECUTION, &["agent_run_id", "tool_name", "sequence"]),
    (node_types::LLM_CALL, &["agent_run_id", "sequence"]),
    (node_types::TECHNIQUE, &["id"]),
    (node_types::TACTIC, &["id"]),
    (node_types::INTELLIGENCE, &["mission_id", "title", "timestamp"]),
];

/// Registry mapping node types to their identifying properties
///
/// Thread-safe for arbitrarily many concurrent readers. The key set of
/// a registered type is immutable; tests that need a different schema
/// replace the whole registry via [`NodeTypeRegistry::replace_default`].
#[derive(Debug)]
pub struct NodeTypeRegistry {
    types: RwLock<HashMap<String, Vec<String>>>,
}

impl NodeTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry pre-loaded with the canonical table
    pub fn canonical() -> Self {
        let registry = Self::new();
        {
            let mut types = registry.types.write().unwrap();
            for (name, props) in CANONICAL_TABLE {
                types.insert(
                    (*name).to_string(),
                    props.iter().map(|p| (*p).to_string()).collect(),
                );
            }
        }
        registry
    }

    /// Register a node type with its identifying properties
    ///
    /// Intended for setup-time use (loading extensions, building test
    /// registries); never called on the per-entity extraction path.
    /// Re-registering an existing type replaces its key set wholesale.
    pub fn register(
        &self,
        node_type: impl Into<String>,
        identifying_properties: Vec<String>,
    ) -> Result<()> {
        let node_type = node_type.into();
        if node_type.trim().is_empty() {
            return Err(Error::InvalidInput(
                "node type name must not be empty".into(),
            ));
        }
        if identifying_properties.is_empty() {
            return Err(Error::InvalidInput(format!(
                "node type '{}' must have at least one identifying property",
                node_type
            )));
        }
        debug!(node_type = %node_type, "Registering node type");
        self.types
            .write()
            .unwrap()
            .insert(node_type, identifying_properties);
        Ok(())
    }

    /// Get the identifying properties for a node type
    ///
    /// Returns an independent copy; mutating it never affects registry
    /// state on subsequent calls.
    pub fn identifying_properties(&self, node_type: &str) -> Result<Vec<String>> {
        self.types
            .read()
            .unwrap()
            .get(node_type)
            .cloned()
            .ok_or_else(|| Error::NodeTypeNotRegistered(node_type.to_string()))
    }

    /// Check whether a node type is registered
    ///
    /// Never errors; unknown and empty names are simply `false`.
    pub fn is_registered(&self, node_type: &str) -> bool {
        self.types.read().unwrap().contains_key(node_type)
    }

    /// Collect the identifying properties missing from a property map
    ///
    /// A property counts as present only if the key exists, the value
    /// is not null, and a string value is non-empty after trimming.
    pub fn missing_properties(
        &self,
        node_type: &str,
        properties: &PropertyMap,
    ) -> Result<Vec<String>> {
        let identifying = self.identifying_properties(node_type)?;
        Ok(identifying
            .into_iter()
            .filter(|name| !properties.get(name).is_some_and(|v| v.is_present()))
            .collect())
    }

    /// Validate that a property map carries every identifying property
    ///
    /// Unknown types fail with [`Error::NodeTypeNotRegistered`]; any
    /// absent, null, or blank identifying property fails with
    /// [`Error::MissingIdentifyingProperties`] carrying the full list
    /// of missing names.
    pub fn validate_properties(&self, node_type: &str, properties: &PropertyMap) -> Result<()> {
        let missing = self.missing_properties(node_type, properties)?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MissingIdentifyingProperties {
                node_type: node_type.to_string(),
                missing,
            })
        }
    }

    /// List every registered node type
    ///
    /// Strict ascending lexicographic order, no duplicates. Used for
    /// deterministic UI listings and LLM-facing schema descriptions.
    pub fn node_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered node types
    pub fn len(&self) -> usize {
        self.types.read().unwrap().len()
    }

    /// Whether the registry has no registered types
    pub fn is_empty(&self) -> bool {
        self.types.read().unwrap().is_empty()
    }

    /// Get the process-wide default registry
    ///
    /// Lazily initialized with the canonical table. Extraction code
    /// that does not take an injected registry uses this instance.
    pub fn default_instance() -> Arc<NodeTypeRegistry> {
        default_slot().read().unwrap().clone()
    }

    /// Replace the process-wide default registry, returning the
    /// previous instance
    ///
    /// Setup/teardown only; tests use this to install a schema and
    /// restore the canonical one afterwards.
    pub fn replace_default(registry: Arc<NodeTypeRegistry>) -> Arc<NodeTypeRegistry> {
        let mut slot = default_slot().write().unwrap();
        std::mem::replace(&mut *slot, registry)
    }
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        Self::canonical()
    }
}

fn default_slot() -> &'static RwLock<Arc<NodeTypeRegistry>> {
    static DEFAULT: OnceLock<RwLock<Arc<NodeTypeRegistry>>> = OnceLock::new();
    DEFAULT.get_or_init(|| RwLock::new(Arc::new(NodeTypeRegistry::canonical())))
}
