//! Krait Graph Core Integration Tests

use std::sync::Arc;
use std::thread;

use rand::Rng;

use krait_graph::prelude::*;

/// Build the batch an extraction pass produces for one scan result
/// shaped like `{host: "...", ports: [{portid, protocol}, ...]}`.
fn extract_scan(raw: &serde_json::Value) -> Batch {
    let host_ip = raw["host"].as_str().expect("scan has a host");
    let host = GraphNode::host(host_ip).expect("host extraction");

    let mut batch = Batch::new();
    batch.add_node(host.clone());

    for entry in raw["ports"].as_array().expect("scan has ports") {
        let number = entry["portid"].as_u64().expect("portid") as u16;
        let protocol = entry["protocol"].as_str().expect("protocol");
        let (port, link) = GraphNode::port_for(&host, number, protocol).expect("port extraction");
        batch.add_node(port);
        batch.add_relationship(link);
    }

    batch
}

#[tokio::test]
async fn test_end_to_end_idempotence() {
    let scan = serde_json::json!({
        "host": "10.0.0.1",
        "ports": [{"portid": 443, "protocol": "tcp"}],
    });

    // Two independent extraction runs over the same tool output, as
    // if a retried agent re-processed the same scan.
    let first = extract_scan(&scan);
    let second = extract_scan(&scan);

    assert_eq!(first.nodes[0].id, second.nodes[0].id);
    assert_eq!(first.nodes[1].id, second.nodes[1].id);
    assert_eq!(first.relationships[0].from_id, second.relationships[0].from_id);
    assert_eq!(first.relationships[0].to_id, second.relationships[0].to_id);
    assert_eq!(first.relationships[0].rel_type, relationship_types::HAS_PORT);

    let store = MemoryGraphStore::new();
    store.upsert_batch(&first).await.unwrap();
    store.upsert_batch(&second).await.unwrap();

    assert_eq!(store.node_count().await.unwrap(), 2);
    assert_eq!(store.relationship_count().await.unwrap(), 1);

    let host = store.get_node(&first.nodes[0].id).await.unwrap().unwrap();
    let edges = store.get_relationships(&host.id).await.unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].to_id, first.nodes[1].id);
}

#[test]
fn test_registry_concurrent_reads() {
    let registry = Arc::new(NodeTypeRegistry::canonical());
    let expected_types = registry.node_types();

    let handles: Vec<_> = (0..100)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            let expected_types = expected_types.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    match (worker + i) % 4 {
                        0 => {
                            assert!(registry.is_registered("host"));
                            assert!(!registry.is_registered("nonexistent"));
                        }
                        1 => {
                            let props = registry.identifying_properties("port").unwrap();
                            assert_eq!(props, vec!["host_id", "number", "protocol"]);
                        }
                        2 => {
                            assert_eq!(registry.node_types(), expected_types);
                        }
                        _ => {
                            let props = properties([("ip", "10.0.0.1")]);
                            registry.validate_properties("host", &props).unwrap();
                            assert!(
                                registry
                                    .validate_properties("port", &props)
                                    .is_err()
                            );
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("reader thread panicked");
    }
}

#[test]
fn test_concurrent_generation_is_deterministic() {
    let generator = Arc::new(NodeIdGenerator::with_default_registry());
    let reference = generator
        .generate("domain", &properties([("name", "example.com")]))
        .unwrap();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let generator = Arc::clone(&generator);
            let reference = reference.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let id = generator
                        .generate("domain", &properties([("name", "example.com")]))
                        .unwrap();
                    assert_eq!(id, reference);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("generator thread panicked");
    }
}

#[test]
fn test_single_property_mutations_change_the_id() {
    let generator = NodeIdGenerator::with_default_registry();
    let mut rng = rand::thread_rng();

    let base = properties([
        ("host_id", PropertyValue::from("host:abc123")),
        ("number", PropertyValue::Int(443)),
        ("protocol", PropertyValue::from("tcp")),
    ]);
    let base_id = generator.generate("port", &base).unwrap();

    for _ in 0..200 {
        let mut mutated = base.clone();
        match rng.gen_range(0..3) {
            0 => {
                let suffix: u32 = rng.gen_range(1..1_000_000);
                mutated.insert(
                    "host_id".into(),
                    PropertyValue::from(format!("host:abc{suffix}")),
                );
            }
            1 => {
                let number: i64 = rng.gen_range(1..=65535);
                if number == 443 {
                    continue;
                }
                mutated.insert("number".into(), PropertyValue::Int(number));
            }
            _ => {
                mutated.insert("protocol".into(), PropertyValue::from("udp"));
            }
        }
        let mutated_id = generator.generate("port", &mutated).unwrap();
        assert_ne!(
            mutated_id, base_id,
            "mutation left the id unchanged: {mutated:?}"
        );
    }
}

#[test]
fn test_fingerprinted_finding_ids_are_stable() {
    let evidence = "HTTP/1.1 200 OK\nServer: Apache/2.4.49\n\ndirectory traversal proof";
    let fingerprint = content_fingerprint(evidence);

    let first = GraphNode::identified(
        node_types::FINDING,
        properties([
            ("mission_id", PropertyValue::from("mission:m1")),
            ("fingerprint", PropertyValue::from(fingerprint.clone())),
        ]),
    )
    .unwrap();
    let second = GraphNode::identified(
        node_types::FINDING,
        properties([
            ("mission_id", PropertyValue::from("mission:m1")),
            ("fingerprint", PropertyValue::from(fingerprint)),
        ]),
    )
    .unwrap();

    assert_eq!(first.id, second.id);
}
