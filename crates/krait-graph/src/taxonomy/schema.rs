//! Rendering the taxonomy for LLM consumption
//!
//! Agents decide how to structure newly discovered data from a
//! catalogue of the vocabulary: either a natural-language block
//! injected into a system prompt, or a JSON document for structured
//! tool definitions. Both renderings are deterministic (listings come
//! out sorted), so prompts are cache-friendly across agent runs.

use std::fmt::Write;

use super::{NodeTypeDef, PropertyDef, TaxonomyIntrospector};

/// Render the vocabulary as a natural-language catalogue
pub fn render_prompt_catalog(taxonomy: &dyn TaxonomyIntrospector) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Knowledge-graph vocabulary (version {})",
        taxonomy.version()
    );

    let _ = writeln!(out, "\nNode types:");
    for def in taxonomy.node_type_defs() {
        let _ = writeln!(
            out,
            "- {} ({}): {}",
            def.name,
            def.category.as_str(),
            def.description
        );
        let _ = writeln!(out, "  Identifying: {}", render_properties(&def.required_properties));
        if !def.optional_properties.is_empty() {
            let _ = writeln!(out, "  Optional: {}", render_properties(&def.optional_properties));
        }
    }

    let _ = writeln!(out, "\nRelationship types:");
    for def in taxonomy.relationship_type_defs() {
        let endpoints = if def.from_types.is_empty() && def.to_types.is_empty() {
            "any -> any".to_string()
        } else {
            format!("{} -> {}", def.from_types.join("|"), def.to_types.join("|"))
        };
        let direction = if def.bidirectional {
            ", bidirectional"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "- {} ({}{}): {}",
            def.name, endpoints, direction, def.description
        );
    }

    let _ = writeln!(out, "\nAttack techniques:");
    for def in taxonomy.techniques() {
        let _ = writeln!(
            out,
            "- {} {} ({}): {}",
            def.id, def.name, def.tactic_id, def.description
        );
    }

    out
}

fn render_properties(properties: &[PropertyDef]) -> String {
    properties
        .iter()
        .map(|p| format!("{} ({})", p.name, p.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the vocabulary as a JSON catalogue
pub fn render_json_catalog(taxonomy: &dyn TaxonomyIntrospector) -> serde_json::Value {
    serde_json::json!({
        "version": taxonomy.version(),
        "node_types": taxonomy.node_type_defs(),
        "relationship_types": taxonomy.relationship_type_defs(),
        "techniques": taxonomy.techniques(),
    })
}

/// Render one node type as a JSON-schema-shaped object
///
/// Useful for per-type structured-output definitions where the full
/// catalogue is too much prompt.
pub fn render_node_type_schema(def: &NodeTypeDef) -> serde_json::Value {
    let mut schema_props = serde_json::Map::new();
    for p in def.required_properties.iter().chain(&def.optional_properties) {
        schema_props.insert(
            p.name.clone(),
            serde_json::json!({
                "type": json_type(p),
                "description": p.description,
            }),
        );
    }
    serde_json::json!({
        "title": def.display_name,
        "description": def.description,
        "type": "object",
        "properties": schema_props,
        "required": def
            .required_properties
            .iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>(),
    })
}

fn json_type(p: &PropertyDef) -> &'static str {
    use super::PropertyKind as K;
    match p.kind {
        K::String | K::Timestamp => "string",
        K::Integer => "integer",
        K::Float => "number",
        K::Boolean => "boolean",
        K::Map => "object",
        K::List => "array",
    }
}
