//! End-to-end tests for the hand-off formats: row snapshot, domain graph
//! view, affinity CSV, Cypher dump and JSON.

use pretty_assertions::assert_eq;
use tether::export::{export_affinity_csv, export_cypher_dump, write_json};
use tether::{
    DomainGraph, ExportConfig, GraphSnapshot, HashingEncoder, Hdbscan, MemorySource, Pipeline,
    PipelineConfig, PipelineOutput,
};

fn corpus() -> MemorySource {
    let emails = vec!["ada@example.org", "alan@example.org", "grace@example.org", "ada@example.org", ""];
    let cities = vec!["London", "Manchester", "Leeds", "Bristol"];
    let zips = vec!["90210", "10001", "60614", "73301"];
    let phones = vec!["+44 20 7946 0018", "+44 161 496 0734", "+1 212 555 0147"];

    let mut s = MemorySource::new();
    for ds in ["d1", "d2", "d3"] {
        s.add_dataset("crm", ds, vec![("email", emails.clone()), ("city", cities.clone())]);
    }
    for ds in ["d4", "d5", "d6"] {
        s.add_dataset("geo", ds, vec![("zip", zips.clone()), ("phone", phones.clone())]);
    }
    s
}

fn run(source: &MemorySource) -> PipelineOutput {
    Pipeline::new(HashingEncoder::new(64).unwrap(), Hdbscan::default(), PipelineConfig::default())
        .unwrap()
        .run(source)
        .unwrap()
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn test_snapshot_ids_are_one_based() {
    let source = corpus();
    let out = run(&source);
    let snap = GraphSnapshot::build(&out, &source, &ExportConfig::default()).unwrap();

    let packages: Vec<(u64, &str)> = snap.packages.iter().map(|p| (p.id, p.name.as_str())).collect();
    assert_eq!(packages, vec![(1, "crm"), (2, "geo")]);

    assert_eq!(snap.datasets.len(), 6);
    assert_eq!(snap.datasets[0].package_id, 1);
    assert_eq!(snap.datasets[5].package_id, 2);

    assert_eq!(snap.domains.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(snap.columns.len(), 12);
    for (i, row) in snap.columns.iter().enumerate() {
        assert_eq!(row.id, i as u64 + 1);
        let expected = out.assignment.get(&out.columns[i].key).map(|d| d.0 as u64 + 1);
        assert_eq!(row.domain_id, expected);
    }
    assert_eq!(snap.columns[0].domain_id, Some(1));
}

#[test]
fn test_snapshot_examples_are_distinct() {
    let source = corpus();
    let out = run(&source);
    let snap = GraphSnapshot::build(&out, &source, &ExportConfig::default()).unwrap();

    // d1.email: duplicate and blank values dropped
    let examples: Vec<&str> = snap.examples_of(1).collect();
    assert_eq!(examples, vec!["ada@example.org", "alan@example.org", "grace@example.org"]);
    assert_eq!(snap.examples.iter().map(|e| e.id).max(), Some(snap.examples.len() as u64));
}

#[test]
fn test_snapshot_example_limits() {
    let source = corpus();
    let out = run(&source);
    let config = ExportConfig { num_examples: 10, example_rows: 2, example_max_chars: 3 };
    let snap = GraphSnapshot::build(&out, &source, &config).unwrap();

    assert_eq!(snap.examples_of(1).collect::<Vec<_>>(), vec!["ada", "ala"]);
    assert!(snap.examples.iter().all(|e| e.value.chars().count() <= 3));
}

// ============================================================================
// Domain graph view
// ============================================================================

#[test]
fn test_domain_graph_nodes_sorted_by_name() {
    let source = corpus();
    let out = run(&source);
    let snap = GraphSnapshot::build(&out, &source, &ExportConfig::default()).unwrap();
    let graph = DomainGraph::build(&snap, &out, 10, 0.5, 2).unwrap();

    let names: Vec<Option<&str>> = graph.nodes.iter().map(|n| n.name.as_deref()).collect();
    assert_eq!(names, vec![Some("CITY"), Some("EMAIL"), Some("PHONE"), Some("ZIP")]);

    let email = graph.node(1).unwrap();
    assert_eq!(email.columns.len(), 3);
    assert_eq!(email.columns[0].dataset.name, "d1");
    assert_eq!(email.columns[0].dataset.package.name, "crm");
    assert_eq!(email.columns[0].examples, vec!["ada@example.org", "alan@example.org"]);
}

#[test]
fn test_domain_graph_edges_use_query_parameters() {
    let source = corpus();
    let out = run(&source);
    let snap = GraphSnapshot::build(&out, &source, &ExportConfig::default()).unwrap();

    let graph = DomainGraph::build(&snap, &out, 10, 0.5, 10).unwrap();
    let mut edges: Vec<(&str, &str)> = graph.edges.iter().map(|e| (e.source.as_str(), e.target.as_str())).collect();
    edges.sort();
    assert_eq!(edges, vec![("1", "2"), ("2", "1"), ("3", "4"), ("4", "3")]);

    let strict = DomainGraph::build(&snap, &out, 10, 1.0, 10).unwrap();
    assert!(strict.edges.is_empty());

    let none = DomainGraph::build(&snap, &out, 0, 0.0, 10).unwrap();
    assert!(none.edges.is_empty());
}

// ============================================================================
// CSV / Cypher / JSON
// ============================================================================

#[test]
fn test_affinity_csv() {
    let out = run(&corpus());
    let mut buf = Vec::new();
    export_affinity_csv(&out.affinity, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with(",1,2,3,4"));
    assert_eq!(lines[1], "1,0.69,0.69,0.00,0.00");
    assert_eq!(lines[4], "4,0.00,0.00,0.69,0.69");
}

#[test]
fn test_cypher_dump() {
    let source = corpus();
    let out = run(&source);
    let snap = GraphSnapshot::build(&out, &source, &ExportConfig::default()).unwrap();

    let mut buf = Vec::new();
    export_cypher_dump(&snap, &out, 10, 0.5, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.contains("CREATE (:Domain {_id: 1, name: 'EMAIL', size: 3});"));
    assert!(text.contains("CREATE (:Column {_id: 1, name: 'email', dataset: 'd1', package: 'crm'});"));
    assert!(text.contains("MATCH (c:Column {_id: 1}), (d:Domain {_id: 1}) CREATE (c)-[:MEMBER_OF]->(d);"));

    let count = |needle: &str| text.lines().filter(|l| l.contains(needle)).count();
    assert_eq!(count("CREATE (:Domain"), 4);
    assert_eq!(count("CREATE (:Column"), 12);
    assert_eq!(count(":MEMBER_OF"), 12);
    assert_eq!(count("(a:Domain"), 4);
    assert_eq!(count("(a:Column"), out.column_relations.nonzero_count());
}

#[test]
fn test_json_round_trip() {
    let source = corpus();
    let out = run(&source);
    let snap = GraphSnapshot::build(&out, &source, &ExportConfig::default()).unwrap();

    let mut buf = Vec::new();
    write_json(&snap, &mut buf).unwrap();
    let back: GraphSnapshot = serde_json::from_slice(&buf).unwrap();
    assert_eq!(back, snap);

    let graph = DomainGraph::build(&snap, &out, 10, 0.5, 10).unwrap();
    let value = serde_json::to_value(&graph).unwrap();
    assert_eq!(value["edges"][0]["source"], "1");
    assert!(value["nodes"].as_array().unwrap().len() == 4);
}
