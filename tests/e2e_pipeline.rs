//! End-to-end tests for the full pipeline.
//!
//! Each test exercises: source -> represent -> distances -> cluster ->
//! domain affinity -> edges -> column relations, using `HashingEncoder` and
//! `Hdbscan` unless a test needs a scripted clusterer.
//!
//! Columns of the same kind carry identical value lists, so their summaries
//! coincide and the clustering outcome does not depend on encoder details.

use pretty_assertions::assert_eq;
use tether::cluster::cluster_columns;
use tether::divergence::divergence;
use tether::represent::represent_columns;
use tether::{
    ColumnKey, DensityClusterer, DistanceMatrix, DomainId, Error, HashingEncoder, Hdbscan,
    MemorySource, Pipeline, PipelineConfig, ValueSource,
};

const EMAILS: &[&str] = &["ada@example.org", "alan@example.org", "grace@example.org", "linus@example.org"];
const CITIES: &[&str] = &["London", "Manchester", "Leeds", "Bristol"];
const ZIPS: &[&str] = &["90210", "10001", "60614", "73301"];
const PHONES: &[&str] = &["+44 20 7946 0018", "+44 161 496 0734", "+1 212 555 0147", "+1 415 555 0199"];

/// crm/d1..d3 hold (email, city); geo/d4..d6 hold (zip, phone).
fn corpus() -> MemorySource {
    let mut s = MemorySource::new();
    for ds in ["d1", "d2", "d3"] {
        s.add_dataset("crm", ds, vec![("email", EMAILS.to_vec()), ("city", CITIES.to_vec())]);
    }
    for ds in ["d4", "d5", "d6"] {
        s.add_dataset("geo", ds, vec![("zip", ZIPS.to_vec()), ("phone", PHONES.to_vec())]);
    }
    s
}

/// Stage logs go to the test writer; filter with `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pipeline() -> Pipeline<HashingEncoder, Hdbscan> {
    init_tracing();
    Pipeline::new(HashingEncoder::new(64).unwrap(), Hdbscan::default(), PipelineConfig::default()).unwrap()
}

// ============================================================================
// 1. Domains form per column kind
// ============================================================================

#[test]
fn test_four_domains_named_by_members() {
    let out = pipeline().run(&corpus()).unwrap();

    assert_eq!(out.represented, 12);
    assert_eq!(out.domains.len(), 4);

    let names: Vec<Option<&str>> = out.domains.iter().map(|d| d.name.as_deref()).collect();
    assert_eq!(names, vec![Some("EMAIL"), Some("CITY"), Some("ZIP"), Some("PHONE")]);

    for domain in &out.domains {
        assert_eq!(domain.len(), 3);
        let first = domain.columns[0].name();
        assert!(domain.columns.iter().all(|c| c.name() == first));
    }
}

#[test]
fn test_every_column_assigned_once() {
    let out = pipeline().run(&corpus()).unwrap();

    assert_eq!(out.assignment.len(), 12);
    for column in &out.columns {
        let id = out.assignment.get(&column.key).expect("assigned");
        assert!(out.domains[id.0].contains(&column.key));
        let holders = out.domains.iter().filter(|d| d.contains(&column.key)).count();
        assert_eq!(holders, 1);
    }
    assert_eq!(out.domain_of(&ColumnKey::new("d1", "email")).unwrap().id, DomainId(0));
}

// ============================================================================
// 2. Domain affinity and edges
// ============================================================================

#[test]
fn test_affinity_links_co_occurring_domains() {
    let out = pipeline().run(&corpus()).unwrap();
    let a = &out.affinity;

    assert_eq!(a.rows(), 4);
    assert!(a.is_symmetric(0.0));
    // C = 3 for co-occurring pairs, row sums 6, total 24 → ln(3 / 1.5)
    let ln2 = 2f64.ln();
    assert!((a.get(0, 1) - ln2).abs() < 1e-6);
    assert!((a.get(2, 3) - ln2).abs() < 1e-6);
    assert_eq!(a.get(0, 2), 0.0);
    assert_eq!(a.get(1, 3), 0.0);

    let mut edges: Vec<(usize, usize)> = out.edges.iter().map(|e| (e.source.0, e.target.0)).collect();
    edges.sort();
    assert_eq!(edges, vec![(0, 1), (1, 0), (2, 3), (3, 2)]);
}

#[test]
fn test_nlargest_and_min_weight_forwarded() {
    let mut config = PipelineConfig::default();
    config.relation.min_weight = 0.8;
    let p = Pipeline::new(HashingEncoder::new(64).unwrap(), Hdbscan::default(), config).unwrap();
    let out = p.run(&corpus()).unwrap();
    assert!(out.edges.is_empty());
}

// ============================================================================
// 3. Column relations
// ============================================================================

#[test]
fn test_column_relations_follow_domains() {
    let out = pipeline().run(&corpus()).unwrap();
    let idx = |ds: &str, name: &str| {
        out.columns.iter().position(|c| c.key == ColumnKey::new(ds, name)).unwrap()
    };

    let email1 = idx("d1", "email");
    let city3 = idx("d3", "city");
    let email2 = idx("d2", "email");
    let zip4 = idx("d4", "zip");

    assert!((out.column_relations.get(email1, city3) - 2f64.ln()).abs() < 1e-6);
    assert_eq!(out.column_relations.get(email1, email2), 0.0);
    assert_eq!(out.column_relations.get(email1, zip4), 0.0);

    for i in 0..out.columns.len() {
        let row = out.column_relations.row(i);
        assert_eq!(row.len(), 3);
        assert!(row.iter().all(|r| r.score > 0.5));
    }
}

#[test]
fn test_max_relations_caps_rows() {
    let mut config = PipelineConfig::default();
    config.relation.max_relations = 2;
    let p = Pipeline::new(HashingEncoder::new(64).unwrap(), Hdbscan::default(), config).unwrap();
    let out = p.run(&corpus()).unwrap();
    assert!((0..out.columns.len()).all(|i| out.column_relations.row(i).len() == 2));
}

// ============================================================================
// 4. Concrete scenario: identical columns, min_cluster_size = 2
// ============================================================================

#[test]
fn test_identical_columns_share_summary_and_domain() {
    let mut s = MemorySource::new();
    s.add_dataset("zoo", "a", vec![("word", vec!["cat", "car", "can"]), ("code", vec!["101", "202", "303"])]);
    s.add_dataset("zoo", "b", vec![("token", vec!["cat", "car", "can"]), ("num", vec!["101", "202", "303"])]);

    let encoder = HashingEncoder::new(32).unwrap();
    let samples = s.column_samples().unwrap();
    let represented = represent_columns(&encoder, &samples, &Default::default()).unwrap();

    let (word, _) = &represented[0];
    let (token, _) = &represented[2];
    assert_eq!(word.mean(), token.mean());
    assert_eq!(word.variance(), token.variance());
    assert_eq!(divergence(word, token).unwrap(), 0.0);

    let clustering = cluster_columns(&Hdbscan::default(), &represented, 2).unwrap();
    let word_domain = clustering.assignment.get(&ColumnKey::new("a", "word"));
    assert!(word_domain.is_some());
    assert_eq!(word_domain, clustering.assignment.get(&ColumnKey::new("b", "token")));
    assert_ne!(word_domain, clustering.assignment.get(&ColumnKey::new("a", "code")));
}

#[test]
fn test_two_identical_columns_alone_form_one_domain() {
    let mut s = MemorySource::new();
    s.add_dataset("zoo", "a", vec![("word", vec!["cat", "car", "can"])]);
    s.add_dataset("zoo", "b", vec![("token", vec!["cat", "car", "can"])]);

    let mut config = PipelineConfig::default();
    config.cluster.min_cluster_size = 2;
    let p = Pipeline::new(HashingEncoder::new(32).unwrap(), Hdbscan::default(), config).unwrap();
    let out = p.run(&s).unwrap();

    assert_eq!(out.domains.len(), 1);
    assert_eq!(out.assignment.get(&ColumnKey::new("a", "word")), Some(DomainId(0)));
    assert_eq!(out.assignment.get(&ColumnKey::new("b", "token")), Some(DomainId(0)));
}

#[test]
fn test_single_cluster_mode_respects_min_cluster_size() {
    let mut s = MemorySource::new();
    s.add_dataset("zoo", "a", vec![("word", vec!["cat", "car", "can"])]);
    s.add_dataset("zoo", "b", vec![("token", vec!["cat", "car", "can"])]);

    let clusterer = Hdbscan::default().with_single_cluster(true);
    let p = Pipeline::new(HashingEncoder::new(32).unwrap(), clusterer, PipelineConfig::default()).unwrap();
    let out = p.run(&s).unwrap();

    assert!(out.domains.is_empty());
    assert!(out.assignment.is_empty());
}

// ============================================================================
// 5. Noise, empty corpora, contract violations
// ============================================================================

/// Labels every row as noise.
struct AllNoise;

impl DensityClusterer for AllNoise {
    fn cluster(&self, d: &DistanceMatrix, _m: usize) -> tether::Result<Vec<i64>> {
        Ok(vec![-1; d.rows()])
    }
}

#[test]
fn test_all_noise_yields_empty_outputs() {
    let p = Pipeline::new(HashingEncoder::new(16).unwrap(), AllNoise, PipelineConfig::default()).unwrap();
    let out = p.run(&corpus()).unwrap();
    assert!(out.domains.is_empty());
    assert!(out.assignment.is_empty());
    assert!(out.edges.is_empty());
    assert_eq!(out.affinity.rows(), 0);
    assert_eq!(out.column_relations.nonzero_count(), 0);
    assert_eq!(out.column_relations.len(), 12);
}

#[test]
fn test_empty_corpus() {
    let out = pipeline().run(&MemorySource::new()).unwrap();
    assert!(out.columns.is_empty());
    assert!(out.domains.is_empty());
    assert!(out.edges.is_empty());
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = PipelineConfig::default();
    config.represent.max_items = 0;
    let err = Pipeline::new(HashingEncoder::new(8).unwrap(), Hdbscan::default(), config).err().unwrap();
    assert!(matches!(err, Error::Config(_)));
}

/// A source whose dataset list misses a dataset its columns belong to.
struct TruncatedSource(MemorySource);

impl ValueSource for TruncatedSource {
    fn packages(&self) -> tether::Result<Vec<tether::Package>> {
        self.0.packages()
    }

    fn dataset_ids(&self) -> tether::Result<Vec<tether::DatasetId>> {
        let mut ids = self.0.dataset_ids()?;
        ids.pop();
        Ok(ids)
    }

    fn datasets(&self) -> tether::Result<Vec<tether::Dataset>> {
        self.0.datasets()
    }

    fn column_samples(&self) -> tether::Result<Vec<tether::ColumnSample>> {
        self.0.column_samples()
    }
}

#[test]
fn test_missing_dataset_id_fails_fast() {
    let err = pipeline().run(&TruncatedSource(corpus())).unwrap_err();
    assert!(matches!(err, Error::UnknownDataset(ref d) if d == "d6"));
}
