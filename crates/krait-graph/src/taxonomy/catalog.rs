//! The compiled-in canonical taxonomy
//!
//! One declarative catalog: node types with their natural keys and
//! common auxiliary properties, the relationship vocabulary with
//! endpoint constraints, and the attack techniques agents tag findings
//! with. Loaded once per process; consumers read through the
//! [`TaxonomyReader`]/[`TaxonomyIntrospector`] traits.

use crate::registry::node_types as nt;
use crate::model::relationship_types as rt;

use super::{
    NodeCategory, NodeTypeDef, PropertyDef, PropertyKind, RelationshipTypeDef, TaxonomyIntrospector,
    TaxonomyReader, TechniqueDef,
};

/// Version of the compiled-in catalog
pub const TAXONOMY_VERSION: &str = "2025.2";

fn prop(name: &str, kind: PropertyKind, description: &str) -> PropertyDef {
    PropertyDef::new(name, kind, description)
}

fn node(
    name: &str,
    display_name: &str,
    category: NodeCategory,
    description: &str,
    required: Vec<PropertyDef>,
    optional: Vec<PropertyDef>,
) -> NodeTypeDef {
    NodeTypeDef {
        name: name.to_string(),
        display_name: display_name.to_string(),
        category,
        description: description.to_string(),
        required_properties: required,
        optional_properties: optional,
    }
}

fn rel(
    name: &str,
    description: &str,
    from_types: &[&str],
    to_types: &[&str],
    bidirectional: bool,
) -> RelationshipTypeDef {
    RelationshipTypeDef {
        name: name.to_string(),
        description: description.to_string(),
        from_types: from_types.iter().map(|t| (*t).to_string()).collect(),
        to_types: to_types.iter().map(|t| (*t).to_string()).collect(),
        bidirectional,
    }
}

fn tech(id: &str, name: &str, tactic_id: &str, description: &str) -> TechniqueDef {
    TechniqueDef {
        id: id.to_string(),
        name: name.to_string(),
        tactic_id: tactic_id.to_string(),
        description: description.to_string(),
    }
}

/// The canonical taxonomy, backed by the compiled-in catalog
#[derive(Debug)]
pub struct CanonicalTaxonomy {
    node_types: Vec<NodeTypeDef>,
    relationship_types: Vec<RelationshipTypeDef>,
    techniques: Vec<TechniqueDef>,
}

impl CanonicalTaxonomy {
    /// Build the canonical taxonomy
    pub fn new() -> Self {
        let mut node_types = Self::build_node_types();
        node_types.sort_by(|a, b| a.name.cmp(&b.name));
        let mut relationship_types = Self::build_relationship_types();
        relationship_types.sort_by(|a, b| a.name.cmp(&b.name));
        let mut techniques = Self::build_techniques();
        techniques.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            node_types,
            relationship_types,
            techniques,
        }
    }

    fn build_node_types() -> Vec<NodeTypeDef> {
        use NodeCategory::{Asset, Attack, Execution, Finding, Intelligence};
        use PropertyKind as K;

        vec![
            node(
                nt::HOST,
                "Host",
                Asset,
                "A network host reachable from the engagement perimeter",
                vec![prop("ip", K::String, "IPv4 or IPv6 address")],
                vec![
                    prop("hostname", K::String, "Reverse-resolved or banner-advertised name"),
                    prop("os", K::String, "Operating system guess"),
                    prop("state", K::String, "up or down at last observation"),
                ],
            ),
            node(
                nt::PORT,
                "Port",
                Asset,
                "A transport-layer port observed on a host",
                vec![
                    prop("host_id", K::String, "Id of the owning host node"),
                    prop("number", K::Integer, "Port number, 1-65535"),
                    prop("protocol", K::String, "Transport protocol, tcp or udp"),
                ],
                vec![
                    prop("state", K::String, "open, closed, or filtered"),
                    prop("banner", K::String, "Raw banner grabbed on connect"),
                ],
            ),
            node(
                nt::SERVICE,
                "Service",
                Asset,
                "A service listening on a port",
                vec![
                    prop("port_id", K::String, "Id of the owning port node"),
                    prop("name", K::String, "Service name, e.g. http or ssh"),
                ],
                vec![
                    prop("product", K::String, "Product name from fingerprinting"),
                    prop("version", K::String, "Product version from fingerprinting"),
                ],
            ),
            node(
                nt::ENDPOINT,
                "Endpoint",
                Asset,
                "An HTTP endpoint exposed by a service",
                vec![
                    prop("service_id", K::String, "Id of the owning service node"),
                    prop("url", K::String, "Path or full URL of the endpoint"),
                    prop("method", K::String, "HTTP method"),
                ],
                vec![
                    prop("status_code", K::Integer, "Last observed response status"),
                    prop("content_type", K::String, "Last observed content type"),
                ],
            ),
            node(
                nt::DOMAIN,
                "Domain",
                Asset,
                "A registered domain in scope",
                vec![prop("name", K::String, "Fully qualified domain name")],
                vec![
                    prop("registrar", K::String, "Registrar from WHOIS"),
                    prop("name_servers", K::List, "Authoritative name servers"),
                ],
            ),
            node(
                nt::SUBDOMAIN,
                "Subdomain",
                Asset,
                "A subdomain discovered under a parent domain",
                vec![
                    prop("parent_domain", K::String, "Name of the parent domain"),
                    prop("name", K::String, "Subdomain label or FQDN"),
                ],
                vec![prop("resolved_ips", K::List, "IPs the name resolves to")],
            ),
            node(
                nt::API,
                "API",
                Asset,
                "An API surface, keyed by its base URL",
                vec![prop("base_url", K::String, "Base URL of the API")],
                vec![
                    prop("spec_url", K::String, "OpenAPI or similar spec location"),
                    prop("auth_scheme", K::String, "Observed authentication scheme"),
                ],
            ),
            node(
                nt::TECHNOLOGY,
                "Technology",
                Asset,
                "A software product detected on an asset",
                vec![
                    prop("name", K::String, "Product name"),
                    prop("version", K::String, "Detected version"),
                ],
                vec![
                    prop("cpe", K::String, "CPE identifier when known"),
                    prop("confidence", K::Float, "Detection confidence, 0.0-1.0"),
                ],
            ),
            node(
                nt::CERTIFICATE,
                "Certificate",
                Asset,
                "A TLS certificate presented by a service",
                vec![prop("fingerprint", K::String, "Hex SHA-256 of the DER encoding")],
                vec![
                    prop("subject", K::String, "Subject distinguished name"),
                    prop("issuer", K::String, "Issuer distinguished name"),
                    prop("not_after", K::Timestamp, "Expiry time"),
                ],
            ),
            node(
                nt::CLOUD_ASSET,
                "Cloud asset",
                Asset,
                "A resource hosted with a cloud provider",
                vec![
                    prop("provider", K::String, "Provider, e.g. aws or gcp"),
                    prop("resource_id", K::String, "Provider-scoped resource id"),
                ],
                vec![prop("region", K::String, "Provider region")],
            ),
            node(
                nt::FINDING,
                "Finding",
                Finding,
                "A security finding produced during a mission",
                vec![
                    prop("mission_id", K::String, "Id of the owning mission node"),
                    prop("fingerprint", K::String, "Hex SHA-256 of the normalized finding content"),
                ],
                vec![
                    prop("title", K::String, "Short finding title"),
                    prop("severity", K::String, "info, low, medium, high, or critical"),
                    prop("cvss", K::Float, "CVSS base score"),
                    prop("description", K::String, "Full finding description"),
                ],
            ),
            node(
                nt::EVIDENCE,
                "Evidence",
                Finding,
                "A piece of evidence supporting a finding",
                vec![
                    prop("finding_id", K::String, "Id of the owning finding node"),
                    prop("type", K::String, "Evidence kind, e.g. request, screenshot, log"),
                    prop("fingerprint", K::String, "Hex SHA-256 of the evidence content"),
                ],
                vec![prop("captured_at", K::Timestamp, "When the evidence was captured")],
            ),
            node(
                nt::MITIGATION,
                "Mitigation",
                Finding,
                "A remediation proposed for a finding",
                vec![
                    prop("finding_id", K::String, "Id of the finding being mitigated"),
                    prop("title", K::String, "Short mitigation title"),
                ],
                vec![
                    prop("description", K::String, "Remediation detail"),
                    prop("effort", K::String, "Estimated remediation effort"),
                ],
            ),
            node(
                nt::MISSION,
                "Mission",
                Execution,
                "One security-testing campaign",
                vec![
                    prop("name", K::String, "Mission name"),
                    prop("timestamp", K::Timestamp, "Mission start time"),
                ],
                vec![
                    prop("scope", K::String, "Engagement scope description"),
                    prop("status", K::String, "Mission lifecycle status"),
                ],
            ),
            node(
                nt::AGENT_RUN,
                "Agent run",
                Execution,
                "One agent execution within a mission",
                vec![
                    prop("mission_id", K::String, "Id of the owning mission node"),
                    prop("agent_name", K::String, "Name of the executing agent"),
                    prop("run_number", K::Integer, "Ordinal of this run within the mission"),
                ],
                vec![prop("status", K::String, "Run lifecycle status")],
            ),
            node(
                nt::MISSION_RUN_AGENT,
                "Mission-run agent",
                Execution,
                "An agent execution scoped to a specific mission run",
                vec![
                    prop("mission_run_id", K::String, "Id of the owning mission run"),
                    prop("agent_name", K::String, "Name of the executing agent"),
                ],
                vec![prop("status", K::String, "Run lifecycle status")],
            ),
            node(
                nt::TOOL_EXECUTION,
                "Tool execution",
                Execution,
                "One tool invocation within an agent run",
                vec![
                    prop("agent_run_id", K::String, "Id of the owning agent run"),
                    prop("tool_name", K::String, "Name of the invoked tool"),
                    prop("sequence", K::Integer, "Ordinal of the invocation within the run"),
                ],
                vec![
                    prop("exit_code", K::Integer, "Tool exit code"),
                    prop("duration_ms", K::Integer, "Wall-clock duration in milliseconds"),
                ],
            ),
            node(
                nt::LLM_CALL,
                "LLM call",
                Execution,
                "One LLM completion call within an agent run",
                vec![
                    prop("agent_run_id", K::String, "Id of the owning agent run"),
                    prop("sequence", K::Integer, "Ordinal of the call within the run"),
                ],
                vec![
                    prop("model", K::String, "Model identifier"),
                    prop("prompt_tokens", K::Integer, "Prompt token count"),
                    prop("completion_tokens", K::Integer, "Completion token count"),
                ],
            ),
            node(
                nt::TECHNIQUE,
                "Technique",
                Attack,
                "An attack technique, keyed by its ATT&CK-style id",
                vec![prop("id", K::String, "Technique id, e.g. T1046")],
                vec![prop("name", K::String, "Technique name")],
            ),
            node(
                nt::TACTIC,
                "Tactic",
                Attack,
                "An attack tactic, keyed by its ATT&CK-style id",
                vec![prop("id", K::String, "Tactic id, e.g. TA0007")],
                vec![prop("name", K::String, "Tactic name")],
            ),
            node(
                nt::INTELLIGENCE,
                "Intelligence",
                Intelligence,
                "An analyst-grade intelligence note from a mission",
                vec![
                    prop("mission_id", K::String, "Id of the owning mission node"),
                    prop("title", K::String, "Note title"),
                    prop("timestamp", K::Timestamp, "When the note was produced"),
                ],
                vec![
                    prop("summary", K::String, "Note body"),
                    prop("confidence", K::Float, "Analyst confidence, 0.0-1.0"),
                ],
            ),
        ]
    }

    fn build_relationship_types() -> Vec<RelationshipTypeDef> {
        vec![
            rel(
                rt::HAS_PORT,
                "A host exposes a transport-layer port",
                &[nt::HOST],
                &[nt::PORT],
                false,
            ),
            rel(
                rt::RUNS_SERVICE,
                "A port carries a listening service",
                &[nt::PORT],
                &[nt::SERVICE],
                false,
            ),
            rel(
                rt::EXPOSES_ENDPOINT,
                "A service exposes an HTTP endpoint",
                &[nt::SERVICE],
                &[nt::ENDPOINT],
                false,
            ),
            rel(
                rt::HAS_SUBDOMAIN,
                "A domain has a discovered subdomain",
                &[nt::DOMAIN],
                &[nt::SUBDOMAIN],
                false,
            ),
            rel(
                rt::RESOLVES_TO,
                "A name resolves to a host",
                &[nt::DOMAIN, nt::SUBDOMAIN],
                &[nt::HOST],
                false,
            ),
            rel(
                rt::USES_TECHNOLOGY,
                "An asset is built on a detected technology",
                &[nt::SERVICE, nt::ENDPOINT, nt::API],
                &[nt::TECHNOLOGY],
                false,
            ),
            rel(
                rt::PRESENTS_CERTIFICATE,
                "A service presents a TLS certificate",
                &[nt::SERVICE],
                &[nt::CERTIFICATE],
                false,
            ),
            rel(
                rt::HOSTED_ON,
                "A host is backed by a cloud resource",
                &[nt::HOST],
                &[nt::CLOUD_ASSET],
                false,
            ),
            rel(
                rt::AFFECTS,
                "A finding affects an asset",
                &[nt::FINDING],
                &[
                    nt::HOST,
                    nt::PORT,
                    nt::SERVICE,
                    nt::ENDPOINT,
                    nt::DOMAIN,
                    nt::SUBDOMAIN,
                    nt::API,
                    nt::TECHNOLOGY,
                    nt::CERTIFICATE,
                    nt::CLOUD_ASSET,
                ],
                false,
            ),
            rel(
                rt::HAS_EVIDENCE,
                "A finding is supported by captured evidence",
                &[nt::FINDING],
                &[nt::EVIDENCE],
                false,
            ),
            rel(
                rt::MITIGATED_BY,
                "A finding is addressed by a proposed mitigation",
                &[nt::FINDING],
                &[nt::MITIGATION],
                false,
            ),
            rel(
                rt::DISCOVERED_BY,
                "A finding was produced by an agent run",
                &[nt::FINDING],
                &[nt::AGENT_RUN, nt::MISSION_RUN_AGENT],
                false,
            ),
            rel(
                rt::USES_TECHNIQUE,
                "A finding or tool execution applies an attack technique",
                &[nt::FINDING, nt::TOOL_EXECUTION],
                &[nt::TECHNIQUE],
                false,
            ),
            rel(
                rt::PART_OF_TACTIC,
                "A technique belongs to a tactic",
                &[nt::TECHNIQUE],
                &[nt::TACTIC],
                false,
            ),
            rel(
                rt::EXECUTED,
                "An agent run executed a tool",
                &[nt::AGENT_RUN, nt::MISSION_RUN_AGENT],
                &[nt::TOOL_EXECUTION],
                false,
            ),
            rel(
                rt::INVOKED,
                "An agent run made an LLM call",
                &[nt::AGENT_RUN, nt::MISSION_RUN_AGENT],
                &[nt::LLM_CALL],
                false,
            ),
            rel(
                rt::PART_OF,
                "An agent run belongs to a mission",
                &[nt::AGENT_RUN, nt::MISSION_RUN_AGENT],
                &[nt::MISSION],
                false,
            ),
            rel(
                rt::PRODUCED,
                "A mission or agent run produced an intelligence note",
                &[nt::MISSION, nt::AGENT_RUN, nt::MISSION_RUN_AGENT],
                &[nt::INTELLIGENCE],
                false,
            ),
            rel(
                rt::RELATED_TO,
                "Two entities are associated without a more specific type",
                &[],
                &[],
                true,
            ),
        ]
    }

    fn build_techniques() -> Vec<TechniqueDef> {
        vec![
            tech(
                "T1595",
                "Active Scanning",
                "TA0043",
                "Probing target infrastructure over the network",
            ),
            tech(
                "T1595.002",
                "Vulnerability Scanning",
                "TA0043",
                "Scanning targets for known vulnerable software",
            ),
            tech(
                "T1590",
                "Gather Victim Network Information",
                "TA0043",
                "Collecting DNS, netblock, and topology information",
            ),
            tech(
                "T1046",
                "Network Service Discovery",
                "TA0007",
                "Enumerating services running on remote hosts",
            ),
            tech(
                "T1190",
                "Exploit Public-Facing Application",
                "TA0001",
                "Exploiting an internet-exposed application for access",
            ),
            tech(
                "T1133",
                "External Remote Services",
                "TA0001",
                "Using exposed remote-access services to gain a foothold",
            ),
            tech(
                "T1078",
                "Valid Accounts",
                "TA0001",
                "Authenticating with obtained legitimate credentials",
            ),
            tech(
                "T1110",
                "Brute Force",
                "TA0006",
                "Guessing or cracking credentials against a service",
            ),
            tech(
                "T1552",
                "Unsecured Credentials",
                "TA0006",
                "Harvesting credentials stored in files, configs, or history",
            ),
            tech(
                "T1059",
                "Command and Scripting Interpreter",
                "TA0002",
                "Executing commands through a shell or interpreter",
            ),
            tech(
                "T1505.003",
                "Web Shell",
                "TA0003",
                "Planting a script on a web server for persistent access",
            ),
            tech(
                "T1068",
                "Exploitation for Privilege Escalation",
                "TA0004",
                "Exploiting a local vulnerability to gain higher privileges",
            ),
            tech(
                "T1021",
                "Remote Services",
                "TA0008",
                "Moving laterally over SSH, SMB, RDP, or similar",
            ),
            tech(
                "T1071",
                "Application Layer Protocol",
                "TA0011",
                "Blending command-and-control into common protocols",
            ),
            tech(
                "T1041",
                "Exfiltration Over C2 Channel",
                "TA0010",
                "Exfiltrating data over the established control channel",
            ),
        ]
    }
}

impl Default for CanonicalTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonomyReader for CanonicalTaxonomy {
    fn version(&self) -> &str {
        TAXONOMY_VERSION
    }

    fn is_canonical_node_type(&self, name: &str) -> bool {
        self.node_types.iter().any(|def| def.name == name)
    }

    fn is_canonical_relationship_type(&self, name: &str) -> bool {
        self.relationship_types.iter().any(|def| def.name == name)
    }
}

impl TaxonomyIntrospector for CanonicalTaxonomy {
    fn node_type_defs(&self) -> Vec<NodeTypeDef> {
        self.node_types.clone()
    }

    fn node_type_def(&self, name: &str) -> Option<NodeTypeDef> {
        self.node_types.iter().find(|def| def.name == name).cloned()
    }

    fn relationship_type_defs(&self) -> Vec<RelationshipTypeDef> {
        self.relationship_types.clone()
    }

    fn relationship_type_def(&self, name: &str) -> Option<RelationshipTypeDef> {
        self.relationship_types
            .iter()
            .find(|def| def.name == name)
            .cloned()
    }

    fn techniques(&self) -> Vec<TechniqueDef> {
        self.techniques.clone()
    }

    fn technique(&self, id: &str) -> Option<TechniqueDef> {
        self.techniques.iter().find(|def| def.id == id).cloned()
    }
}
