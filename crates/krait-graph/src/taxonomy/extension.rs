//! Runtime taxonomy extensions
//!
//! An agent or plugin can contribute its own vocabulary at load time:
//! a named, additive bundle of node-type and relationship-type
//! definitions layered atop the canonical taxonomy. Names are unique;
//! registering over an existing name is an error rather than a silent
//! override, and unregistering an unknown name is an error too.
//!
//! Registering an extension also teaches the node-type registry the
//! natural keys of the custom types, so deterministic IDs work for
//! them immediately.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::registry::NodeTypeRegistry;

use super::{NodeTypeDef, RelationshipTypeDef};

/// A named bundle of custom type definitions from one agent or plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyExtension {
    /// Unique registration name, conventionally the agent/plugin name
    pub name: String,
    /// Custom node types contributed by this extension
    pub node_types: Vec<NodeTypeDef>,
    /// Custom relationship types contributed by this extension
    pub relationship_types: Vec<RelationshipTypeDef>,
}

impl TaxonomyExtension {
    /// Create an empty extension under the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_types: Vec::new(),
            relationship_types: Vec::new(),
        }
    }

    /// Add a node-type definition
    pub fn with_node_type(mut self, def: NodeTypeDef) -> Self {
        self.node_types.push(def);
        self
    }

    /// Add a relationship-type definition
    pub fn with_relationship_type(mut self, def: RelationshipTypeDef) -> Self {
        self.relationship_types.push(def);
        self
    }
}

/// Registry of taxonomy extensions, keyed by extension name
///
/// Read-heavy and thread-safe like the node-type registry. Reads hand
/// back snapshot copies; mutating a returned extension never affects
/// registered state.
#[derive(Debug)]
pub struct ExtensionRegistry {
    node_registry: Arc<NodeTypeRegistry>,
    extensions: RwLock<HashMap<String, TaxonomyExtension>>,
}

impl ExtensionRegistry {
    /// Create a registry that applies natural keys to the given
    /// node-type registry
    pub fn new(node_registry: Arc<NodeTypeRegistry>) -> Self {
        Self {
            node_registry,
            extensions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry bound to the process-wide default node-type
    /// registry
    pub fn with_default_registry() -> Self {
        Self::new(NodeTypeRegistry::default_instance())
    }

    /// Register an extension
    ///
    /// Fails with [`Error::ExtensionAlreadyRegistered`] if the name is
    /// taken. Each contributed node type's required properties are
    /// registered as its natural key so ID generation works for it.
    pub fn register(&self, extension: TaxonomyExtension) -> Result<()> {
        if extension.name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "extension name must not be empty".into(),
            ));
        }

        // Check key sets up front so a rejected definition cannot
        // leave the node-type registry partially updated.
        for def in &extension.node_types {
            if def.required_properties.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "extension '{}' defines node type '{}' with no required properties",
                    extension.name, def.name
                )));
            }
        }

        let mut extensions = self.extensions.write().unwrap();
        if extensions.contains_key(&extension.name) {
            return Err(Error::ExtensionAlreadyRegistered(extension.name));
        }

        for def in &extension.node_types {
            self.node_registry.register(
                def.name.clone(),
                def.required_properties
                    .iter()
                    .map(|p| p.name.clone())
                    .collect(),
            )?;
        }

        info!(
            extension = %extension.name,
            node_types = extension.node_types.len(),
            relationship_types = extension.relationship_types.len(),
            "Registered taxonomy extension"
        );
        extensions.insert(extension.name.clone(), extension);
        Ok(())
    }

    /// Unregister an extension by name, returning its definition
    ///
    /// Fails with [`Error::ExtensionNotRegistered`] for unknown names.
    /// Natural keys already taught to the node-type registry remain
    /// for the process lifetime, so IDs generated under the extension
    /// keep validating.
    pub fn unregister(&self, name: &str) -> Result<TaxonomyExtension> {
        let removed = self
            .extensions
            .write()
            .unwrap()
            .remove(name)
            .ok_or_else(|| Error::ExtensionNotRegistered(name.to_string()))?;
        info!(extension = %name, "Unregistered taxonomy extension");
        Ok(removed)
    }

    /// Check whether an extension name is registered
    pub fn is_registered(&self, name: &str) -> bool {
        self.extensions.read().unwrap().contains_key(name)
    }

    /// Get a snapshot copy of one extension
    pub fn get(&self, name: &str) -> Option<TaxonomyExtension> {
        self.extensions.read().unwrap().get(name).cloned()
    }

    /// Snapshot of all extensions, ascending by name
    pub fn list(&self) -> Vec<TaxonomyExtension> {
        let mut all: Vec<TaxonomyExtension> =
            self.extensions.read().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// All registered extension names, ascending
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.extensions.read().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the process-wide default extension registry
    pub fn default_instance() -> &'static ExtensionRegistry {
        static DEFAULT: OnceLock<ExtensionRegistry> = OnceLock::new();
        DEFAULT.get_or_init(ExtensionRegistry::with_default_registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{NodeCategory, PropertyDef, PropertyKind};

    fn wifi_extension(name: &str) -> TaxonomyExtension {
        TaxonomyExtension::new(name).with_node_type(NodeTypeDef {
            name: format!("{name}_network"),
            display_name: "Wireless network".into(),
            category: NodeCategory::Asset,
            description: "A wireless network observed in range".into(),
            required_properties: vec![PropertyDef::new(
                "bssid",
                PropertyKind::String,
                "Access-point MAC address",
            )],
            optional_properties: vec![],
        })
    }

    #[test]
    fn test_register_and_get() {
        let registry = ExtensionRegistry::new(Arc::new(NodeTypeRegistry::canonical()));
        registry.register(wifi_extension("wifi")).unwrap();

        assert!(registry.is_registered("wifi"));
        let ext = registry.get("wifi").unwrap();
        assert_eq!(ext.node_types.len(), 1);
        assert_eq!(registry.names(), vec!["wifi"]);
    }

    #[test]
    fn test_duplicate_name_is_an_error() {
        let registry = ExtensionRegistry::new(Arc::new(NodeTypeRegistry::canonical()));
        registry.register(wifi_extension("wifi")).unwrap();

        let err = registry.register(wifi_extension("wifi")).unwrap_err();
        assert!(matches!(err, Error::ExtensionAlreadyRegistered(_)));
    }

    #[test]
    fn test_unregister_unknown_is_an_error() {
        let registry = ExtensionRegistry::new(Arc::new(NodeTypeRegistry::canonical()));
        let err = registry.unregister("ghost").unwrap_err();
        assert!(matches!(err, Error::ExtensionNotRegistered(_)));
    }

    #[test]
    fn test_unregister_frees_the_name() {
        let registry = ExtensionRegistry::new(Arc::new(NodeTypeRegistry::canonical()));
        registry.register(wifi_extension("wifi")).unwrap();
        registry.unregister("wifi").unwrap();
        assert!(!registry.is_registered("wifi"));
        registry.register(wifi_extension("wifi")).unwrap();
    }

    #[test]
    fn test_register_teaches_natural_keys() {
        let node_registry = Arc::new(NodeTypeRegistry::canonical());
        let registry = ExtensionRegistry::new(node_registry.clone());
        registry.register(wifi_extension("wifi")).unwrap();

        assert_eq!(
            node_registry.identifying_properties("wifi_network").unwrap(),
            vec!["bssid"]
        );
    }

    #[test]
    fn test_snapshot_isolation() {
        let registry = ExtensionRegistry::new(Arc::new(NodeTypeRegistry::canonical()));
        registry.register(wifi_extension("wifi")).unwrap();

        let mut snapshot = registry.get("wifi").unwrap();
        snapshot.node_types.clear();
        snapshot.name = "tampered".into();

        let fresh = registry.get("wifi").unwrap();
        assert_eq!(fresh.name, "wifi");
        assert_eq!(fresh.node_types.len(), 1);
    }

    #[test]
    fn test_list_sorted_by_name() {
        let registry = ExtensionRegistry::new(Arc::new(NodeTypeRegistry::canonical()));
        registry.register(wifi_extension("zigbee")).unwrap();
        registry.register(wifi_extension("bluetooth")).unwrap();

        let names: Vec<String> = registry.list().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["bluetooth", "zigbee"]);
    }
}
