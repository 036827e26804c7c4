//! Deterministic, content-addressable node identifiers
//!
//! Re-extracting the same real-world fact must always produce the same
//! node ID so that storage can upsert instead of duplicate, no matter
//! which agent produced it, how often a tool re-ran, or how the
//! property map happened to be assembled. IDs are therefore a pure
//! function of `(node type, identifying property values)`:
//!
//! ```text
//! canonical = "<type>:<name1>=<v1>|<name2>=<v2>|..."   (names sorted)
//! id        = "<type>:" + base64url(sha256(canonical)[..12])
//! ```
//!
//! The digest is truncated to 96 bits. This is a deliberate ID-length
//! versus collision-risk trade-off sized for per-mission entity counts
//! (a mission discovers thousands of entities, not 2^48), not a full
//! 256-bit guarantee. The truncation is load-bearing: changing it
//! orphans every previously persisted identifier.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::registry::NodeTypeRegistry;
use crate::value::PropertyMap;

/// Number of SHA-256 digest bytes kept in an ID (96 bits)
const ID_DIGEST_BYTES: usize = 12;

/// Deterministic ID generator bound to a node-type registry
#[derive(Debug, Clone)]
pub struct NodeIdGenerator {
    registry: Arc<NodeTypeRegistry>,
}

impl NodeIdGenerator {
    /// Create a generator using the given registry
    pub fn new(registry: Arc<NodeTypeRegistry>) -> Self {
        Self { registry }
    }

    /// Create a generator using the process-wide default registry
    pub fn with_default_registry() -> Self {
        Self::new(NodeTypeRegistry::default_instance())
    }

    /// Generate the deterministic ID for a node
    ///
    /// Identical `(node_type, properties content)` always yields an
    /// identical ID, independent of map construction or iteration
    /// order. Fails with [`Error::NodeTypeNotRegistered`] for unknown
    /// types and [`Error::MissingIdentifyingProperties`] when any
    /// natural-key property is absent, null, or blank.
    pub fn generate(&self, node_type: &str, properties: &PropertyMap) -> Result<String> {
        let canonical = self.canonical_string(node_type, properties)?;
        let digest = Sha256::digest(canonical.as_bytes());
        let encoded = URL_SAFE_NO_PAD.encode(&digest[..ID_DIGEST_BYTES]);
        let id = format!("{}:{}", node_type, encoded);
        debug!(node_type = %node_type, id = %id, "Generated node id");
        Ok(id)
    }

    /// Build the canonical string an ID is derived from
    ///
    /// Exposed for diagnostics and interoperability tests; the string
    /// itself is never persisted.
    pub fn canonical_string(&self, node_type: &str, properties: &PropertyMap) -> Result<String> {
        self.registry.validate_properties(node_type, properties)?;

        let mut names = self.registry.identifying_properties(node_type)?;
        names.sort();

        let mut pairs = Vec::with_capacity(names.len());
        for name in &names {
            // validate_properties guarantees presence
            let value = &properties[name];
            let normalized = value.canonical_string().map_err(|e| match e {
                Error::CanonicalSerialization { message, .. } => Error::CanonicalSerialization {
                    property: name.clone(),
                    message,
                },
                other => other,
            })?;
            pairs.push(format!("{}={}", name, normalized));
        }

        Ok(format!("{}:{}", node_type, pairs.join("|")))
    }
}

impl Default for NodeIdGenerator {
    fn default() -> Self {
        Self::with_default_registry()
    }
}

/// Generate a deterministic node ID using the default registry
///
/// Convenience wrapper over [`NodeIdGenerator`] for extraction sites
/// that do not carry an injected registry.
pub fn generate_id(node_type: &str, properties: &PropertyMap) -> Result<String> {
    NodeIdGenerator::with_default_registry().generate(node_type, properties)
}

/// Compute the hex SHA-256 fingerprint of a piece of content
///
/// Findings, evidence, and certificates key on a `fingerprint`
/// property; extraction sites derive it from raw content (a response
/// body, a certificate's DER bytes rendered to text, a finding's
/// normalized description) with this helper so the same content always
/// lands on the same natural key.
pub fn content_fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{PropertyValue, properties};

    fn generator() -> NodeIdGenerator {
        NodeIdGenerator::new(Arc::new(NodeTypeRegistry::canonical()))
    }

    #[test]
    fn test_canonical_string_format() {
        let generator = generator();
        let props = properties([
            ("protocol", PropertyValue::from("TCP")),
            ("number", PropertyValue::Int(443)),
            ("host_id", PropertyValue::from("host:abc")),
        ]);
        let canonical = generator.canonical_string("port", &props).unwrap();
        assert_eq!(canonical, "port:host_id=host:abc|number=443|protocol=tcp");
    }

    #[test]
    fn test_id_format() {
        let generator = generator();
        let props = properties([("ip", "10.0.0.1")]);
        let id = generator.generate("host", &props).unwrap();

        let (prefix, hash) = id.split_once(':').unwrap();
        assert_eq!(prefix, "host");
        // 12 bytes of digest encode to 16 unpadded base64url chars
        assert_eq!(hash.len(), 16);
        assert!(
            hash.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_known_answer() {
        // Locks the full pipeline: canonical string, SHA-256,
        // 12-byte truncation, unpadded base64url.
        let digest = Sha256::digest("host:ip=10.0.0.1".as_bytes());
        let expected = format!("host:{}", URL_SAFE_NO_PAD.encode(&digest[..12]));

        let id = generator()
            .generate("host", &properties([("ip", "10.0.0.1")]))
            .unwrap();
        assert_eq!(id, expected);
    }

    #[test]
    fn test_determinism() {
        let generator = generator();
        let props = properties([
            ("mission_id", PropertyValue::from("mission:xyz")),
            ("fingerprint", PropertyValue::from("deadbeef")),
        ]);
        let first = generator.generate("finding", &props).unwrap();
        for _ in 0..10 {
            assert_eq!(generator.generate("finding", &props).unwrap(), first);
        }
    }

    #[test]
    fn test_order_independence() {
        let generator = generator();
        let forward = properties([
            ("host_id", PropertyValue::from("host:abc")),
            ("number", PropertyValue::Int(22)),
            ("protocol", PropertyValue::from("tcp")),
        ]);
        let reverse = properties([
            ("protocol", PropertyValue::from("tcp")),
            ("number", PropertyValue::Int(22)),
            ("host_id", PropertyValue::from("host:abc")),
        ]);
        assert_eq!(
            generator.generate("port", &forward).unwrap(),
            generator.generate("port", &reverse).unwrap()
        );
    }

    #[test]
    fn test_string_normalization_equality() {
        let generator = generator();
        let upper = generator
            .generate("domain", &properties([("name", "Example.COM")]))
            .unwrap();
        let lower = generator
            .generate("domain", &properties([("name", "example.com")]))
            .unwrap();
        let padded = generator
            .generate("domain", &properties([("name", "  example.com  ")]))
            .unwrap();
        assert_eq!(upper, lower);
        assert_eq!(lower, padded);
    }

    #[test]
    fn test_value_sensitivity() {
        let generator = generator();
        let a = generator
            .generate("host", &properties([("ip", "10.0.0.1")]))
            .unwrap();
        let b = generator
            .generate("host", &properties([("ip", "10.0.0.2")]))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_type() {
        let err = generator()
            .generate("nonexistent", &PropertyMap::new())
            .unwrap_err();
        assert!(matches!(err, Error::NodeTypeNotRegistered(_)));
        assert!(err.to_string().contains("nonexistent"));
    }

    #[test]
    fn test_missing_properties_carry_names() {
        let err = generator()
            .generate("port", &properties([("number", PropertyValue::Int(80))]))
            .unwrap_err();
        match err {
            Error::MissingIdentifyingProperties { mut missing, .. } => {
                missing.sort();
                assert_eq!(missing, vec!["host_id", "protocol"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_extra_properties_do_not_change_id() {
        let generator = generator();
        let bare = properties([("ip", "10.0.0.1")]);
        let mut annotated = bare.clone();
        annotated.insert("os".into(), PropertyValue::from("linux"));
        annotated.insert("uptime_days".into(), PropertyValue::Int(42));

        assert_eq!(
            generator.generate("host", &bare).unwrap(),
            generator.generate("host", &annotated).unwrap()
        );
    }

    #[test]
    fn test_composite_identifying_value() {
        let registry = Arc::new(NodeTypeRegistry::new());
        registry
            .register("scan_profile", vec!["options".into()])
            .unwrap();
        let generator = NodeIdGenerator::new(registry);

        let props = properties([(
            "options",
            PropertyValue::Map(
                [
                    ("ports".to_string(), PropertyValue::from("1-1024")),
                    ("aggressive".to_string(), PropertyValue::Bool(false)),
                ]
                .into_iter()
                .collect(),
            ),
        )]);
        let id = generator.generate("scan_profile", &props).unwrap();
        assert_eq!(generator.generate("scan_profile", &props).unwrap(), id);
    }

    #[test]
    fn test_pathological_composite_is_an_error() {
        let registry = Arc::new(NodeTypeRegistry::new());
        registry.register("sample", vec!["payload".into()]).unwrap();
        let generator = NodeIdGenerator::new(registry);

        let props = properties([(
            "payload",
            PropertyValue::List(vec![PropertyValue::Float(f64::INFINITY)]),
        )]);
        let err = generator.generate("sample", &props).unwrap_err();
        match err {
            Error::CanonicalSerialization { property, .. } => {
                assert_eq!(property, "payload");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_content_fingerprint() {
        let fp = content_fingerprint("SSH-2.0-OpenSSH_9.6");
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, content_fingerprint("SSH-2.0-OpenSSH_9.6"));
        assert_ne!(fp, content_fingerprint("SSH-2.0-OpenSSH_9.7"));
    }
}
