//! Error types for the Krait graph core

use thiserror::Error;

/// Result type alias using the graph core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Graph core error types with helpful messages and remedies
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Registry errors (G001-G099)
    #[error("Node type '{0}' is not registered. Register a taxonomy extension or use a canonical node type.")]
    NodeTypeNotRegistered(String),

    #[error("Node type '{node_type}' is missing identifying properties: {}", .missing.join(", "))]
    MissingIdentifyingProperties {
        node_type: String,
        missing: Vec<String>,
    },

    // Generation errors (G100-G199)
    #[error("Canonical serialization failed for property '{property}': {message}")]
    CanonicalSerialization { property: String, message: String },

    // Entity validation errors (G200-G299)
    #[error("Invalid {entity}: {message}")]
    Validation { entity: String, message: String },

    // Taxonomy extension errors (G300-G399)
    #[error("Taxonomy extension '{0}' is already registered. Unregister it first or pick a unique name.")]
    ExtensionAlreadyRegistered(String),

    #[error("Taxonomy extension '{0}' is not registered.")]
    ExtensionNotRegistered(String),

    // Storage contract errors (G400-G499)
    #[error("Relationship '{relationship_type}' references unknown node '{endpoint_id}'. Add the node to the batch before its relationships.")]
    UnresolvedEndpoint {
        relationship_type: String,
        endpoint_id: String,
    },

    // Input errors (G800-G899)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Get the stable error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::NodeTypeNotRegistered(_) => "G001",
            Self::MissingIdentifyingProperties { .. } => "G002",
            Self::CanonicalSerialization { .. } => "G100",
            Self::Validation { .. } => "G200",
            Self::ExtensionAlreadyRegistered(_) => "G300",
            Self::ExtensionNotRegistered(_) => "G301",
            Self::UnresolvedEndpoint { .. } => "G400",
            Self::InvalidInput(_) => "G800",
        }
    }

    /// Create a validation error for a named entity kind
    pub fn validation(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            entity: entity.into(),
            message: message.into(),
        }
    }
}
