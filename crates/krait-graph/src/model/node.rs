//! Graph nodes discovered during security-testing missions
//!
//! A node carries a type, its properties, optional content for the
//! external embedding service, and provenance (which mission, which
//! agent). Construction never fails; [`GraphNode::validate`] is the
//! explicit gate before an entity is handed to storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ident::{NodeIdGenerator, generate_id};
use crate::model::relationship::{Relationship, relationship_types};
use crate::registry::node_types;
use crate::value::{PropertyMap, PropertyValue};

/// A node in the mission knowledge graph
///
/// The `id` is either caller-supplied or derived from the node's
/// identifying properties via [`GraphNode::identified`]. Once an ID has
/// been deterministically derived, it never changes for the same
/// logical entity; storage upserts on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique identifier (content-addressed for identified nodes)
    pub id: String,
    /// Node type name (canonical or custom)
    pub node_type: String,
    /// Named properties extracted from tool output
    pub properties: PropertyMap,
    /// Optional text content, consumed externally for embedding
    pub content: Option<String>,
    /// Mission this node was discovered in
    pub mission_id: Option<String>,
    /// Agent that discovered this node
    pub agent_name: Option<String>,
    /// When the node was created
    pub created_at: DateTime<Utc>,
    /// When the node was last updated
    pub updated_at: DateTime<Utc>,
}

impl GraphNode {
    /// Create a new node of the given type with no id
    ///
    /// Use [`GraphNode::identified`] when the identifying properties
    /// are known; this constructor is for caller-supplied ids.
    pub fn new(node_type: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            node_type: node_type.into(),
            properties: PropertyMap::new(),
            content: None,
            mission_id: None,
            agent_name: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a node with a deterministic content-addressed id
    ///
    /// Validates the identifying properties against the default
    /// registry and derives the id from them. The remaining properties
    /// ride along unchanged.
    pub fn identified(node_type: impl Into<String>, properties: PropertyMap) -> Result<Self> {
        let node_type = node_type.into();
        let id = generate_id(&node_type, &properties)?;
        Ok(Self {
            id,
            properties,
            ..Self::new(node_type)
        })
    }

    /// Create a node with a deterministic id from an injected generator
    pub fn identified_with(
        generator: &NodeIdGenerator,
        node_type: impl Into<String>,
        properties: PropertyMap,
    ) -> Result<Self> {
        let node_type = node_type.into();
        let id = generator.generate(&node_type, &properties)?;
        Ok(Self {
            id,
            properties,
            ..Self::new(node_type)
        })
    }

    /// Set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set a property
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Set the text content used for embedding
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the mission provenance
    pub fn with_mission(mut self, mission_id: impl Into<String>) -> Self {
        self.mission_id = Some(mission_id.into());
        self
    }

    /// Set the agent provenance
    pub fn with_agent(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    /// Refresh the updated-at timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate this node before handing it to storage
    ///
    /// A node must have a non-empty type. Validation is mandatory
    /// before storage; construction itself never fails.
    pub fn validate(&self) -> Result<()> {
        if self.node_type.trim().is_empty() {
            return Err(Error::validation("GraphNode", "node type must not be empty"));
        }
        Ok(())
    }

    // ========== Typed asset constructors ==========

    /// Create an identified host node from its IP address
    pub fn host(ip: impl Into<PropertyValue>) -> Result<Self> {
        let mut props = PropertyMap::new();
        props.insert("ip".into(), ip.into());
        Self::identified(node_types::HOST, props)
    }

    /// Create an identified domain node from its name
    pub fn domain(name: impl Into<PropertyValue>) -> Result<Self> {
        let mut props = PropertyMap::new();
        props.insert("name".into(), name.into());
        Self::identified(node_types::DOMAIN, props)
    }

    /// Create an identified port node under a host, plus the
    /// host→port `HAS_PORT` relationship
    ///
    /// # Panics
    ///
    /// Panics if the host node's `id` is empty. That is a wrong
    /// construction order, not a data condition: build the host with
    /// [`GraphNode::host`] / [`GraphNode::identified`], or set its id
    /// manually, before deriving ports from it.
    pub fn port_for(
        host: &GraphNode,
        number: u16,
        protocol: impl Into<PropertyValue>,
    ) -> Result<(Self, Relationship)> {
        let parent_id = require_parent_id(host, "port");
        let mut props = PropertyMap::new();
        props.insert("host_id".into(), PropertyValue::from(parent_id.clone()));
        props.insert("number".into(), PropertyValue::from(number));
        props.insert("protocol".into(), protocol.into());
        let port = Self::identified(node_types::PORT, props)?;
        let link = Relationship::new(parent_id, port.id.clone(), relationship_types::HAS_PORT);
        Ok((port, link))
    }

    /// Create an identified service node under a port, plus the
    /// port→service `RUNS_SERVICE` relationship
    ///
    /// # Panics
    ///
    /// Panics if the port node's `id` is empty; see
    /// [`GraphNode::port_for`].
    pub fn service_for(
        port: &GraphNode,
        name: impl Into<PropertyValue>,
    ) -> Result<(Self, Relationship)> {
        let parent_id = require_parent_id(port, "service");
        let mut props = PropertyMap::new();
        props.insert("port_id".into(), PropertyValue::from(parent_id.clone()));
        props.insert("name".into(), name.into());
        let service = Self::identified(node_types::SERVICE, props)?;
        let link = Relationship::new(
            parent_id,
            service.id.clone(),
            relationship_types::RUNS_SERVICE,
        );
        Ok((service, link))
    }

    /// Create an identified endpoint node under a service, plus the
    /// service→endpoint `EXPOSES_ENDPOINT` relationship
    ///
    /// # Panics
    ///
    /// Panics if the service node's `id` is empty; see
    /// [`GraphNode::port_for`].
    pub fn endpoint_for(
        service: &GraphNode,
        url: impl Into<PropertyValue>,
        method: impl Into<PropertyValue>,
    ) -> Result<(Self, Relationship)> {
        let parent_id = require_parent_id(service, "endpoint");
        let mut props = PropertyMap::new();
        props.insert("service_id".into(), PropertyValue::from(parent_id.clone()));
        props.insert("url".into(), url.into());
        props.insert("method".into(), method.into());
        let endpoint = Self::identified(node_types::ENDPOINT, props)?;
        let link = Relationship::new(
            parent_id,
            endpoint.id.clone(),
            relationship_types::EXPOSES_ENDPOINT,
        );
        Ok((endpoint, link))
    }

    /// Create an identified subdomain node under a domain, plus the
    /// domain→subdomain `HAS_SUBDOMAIN` relationship
    ///
    /// The subdomain keys on the parent domain's *name*, not its id,
    /// so `parent_domain` must be present in the domain's properties.
    ///
    /// # Panics
    ///
    /// Panics if the domain node's `id` is empty; see
    /// [`GraphNode::port_for`].
    pub fn subdomain_for(
        domain: &GraphNode,
        name: impl Into<PropertyValue>,
    ) -> Result<(Self, Relationship)> {
        let parent_id = require_parent_id(domain, "subdomain");
        let parent_name = domain
            .properties
            .get("name")
            .cloned()
            .unwrap_or(PropertyValue::Null);
        let mut props = PropertyMap::new();
        props.insert("parent_domain".into(), parent_name);
        props.insert("name".into(), name.into());
        let subdomain = Self::identified(node_types::SUBDOMAIN, props)?;
        let link = Relationship::new(
            parent_id,
            subdomain.id.clone(),
            relationship_types::HAS_SUBDOMAIN,
        );
        Ok((subdomain, link))
    }
}

/// Return the parent's id or halt on wrong construction order
fn require_parent_id(parent: &GraphNode, child_kind: &str) -> String {
    assert!(
        !parent.id.is_empty(),
        "cannot derive a {} from a '{}' node with no id: construct the parent with \
         GraphNode::identified (or a typed constructor), or set its id manually first",
        child_kind,
        parent.node_type,
    );
    parent.id.clone()
}
