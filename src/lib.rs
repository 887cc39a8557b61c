//! # tether: Semantic Column Domains for Tabular Corpora
//!
//! Groups columns from many datasets into semantic *domains* ("EMAIL",
//! "ZIPCODE", ...) and scores how strongly domains, and transitively their
//! columns, relate to one another.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `ValueEncoder`, `DensityClusterer` and `ValueSource` are
//!    the contracts with everything the pipeline does not own
//! 2. **Clean DTOs**: `Column`, `ColumnSummary`, `Domain`, `Matrix` cross all
//!    stage boundaries
//! 3. **Explicit hand-off**: clustering returns a `DomainAssignment`; later
//!    stages read it instead of mutated columns
//! 4. **Stateless stages**: every stage is a pure function of its inputs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether::{Pipeline, PipelineConfig, MemorySource, HashingEncoder, Hdbscan};
//!
//! # fn example() -> tether::Result<()> {
//! let mut source = MemorySource::new();
//! source.add_dataset("crm", "contacts", vec![
//!     ("email", vec!["ada@example.org", "alan@example.org"]),
//!     ("city", vec!["London", "Manchester"]),
//! ]);
//!
//! let pipeline = Pipeline::new(
//!     HashingEncoder::new(64)?,
//!     Hdbscan::default(),
//!     PipelineConfig::default(),
//! )?;
//! let output = pipeline.run(&source)?;
//!
//! for edge in &output.edges {
//!     println!("{} -> {} ({:.2})", edge.source, edge.target, edge.weight);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Column Representer | `represent` | `ColumnSummary` per column |
//! | Divergence Metric | `divergence` | `DistanceMatrix` |
//! | Domain Clusterer | `cluster` | `Vec<Domain>` + `DomainAssignment` |
//! | Domain Relation Engine | `relation::domain` | `AffinityMatrix` + edges |
//! | Column Relation Propagator | `relation::column` | `ColumnRelations` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod config;
pub mod source;
pub mod encoder;
pub mod represent;
pub mod divergence;
pub mod cluster;
pub mod relation;
pub mod export;

use tracing::info;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Column, ColumnKey, ColumnSample, Dataset, DatasetId, Package,
    ColumnSummary, VARIANCE_FLOOR,
    Matrix, DistanceMatrix, AffinityMatrix,
    Domain, DomainId, DomainAssignment, NOISE_LABEL,
    RelationEdge, ColumnRelation, ColumnRelations,
};

// ============================================================================
// Re-exports: Contracts and reference implementations
// ============================================================================

pub use config::{PipelineConfig, RepresentConfig, ClusterConfig, RelationConfig, ExportConfig, Sampling};
pub use source::{ValueSource, MemorySource};
pub use encoder::{ValueEncoder, OneHotItem, HashingEncoder};
pub use cluster::{DensityClusterer, Clustering, Hdbscan};
pub use export::{GraphSnapshot, DomainGraph};

// ============================================================================
// Pipeline handle
// ============================================================================

/// Everything one pipeline run hands to the persistence/serving side.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Every sampled column, in source order. Relation tables index into this.
    pub columns: Vec<Column>,
    /// Number of columns that produced a summary and entered clustering.
    pub represented: usize,
    pub domains: Vec<Domain>,
    pub assignment: DomainAssignment,
    /// PPMI affinity between domains, indexed by `DomainId`.
    pub affinity: AffinityMatrix,
    /// Directed top-k domain edges (may be asymmetric).
    pub edges: Vec<RelationEdge>,
    pub column_relations: ColumnRelations,
}

impl PipelineOutput {
    /// Domain of a column, if it was clustered.
    pub fn domain_of(&self, column: &ColumnKey) -> Option<&Domain> {
        self.assignment.get(column).and_then(|id| self.domains.get(id.0))
    }
}

/// The primary entry point. A `Pipeline` wires an encoder and a clustering
/// primitive into the representation-and-relation stages.
pub struct Pipeline<E: ValueEncoder, C: DensityClusterer> {
    encoder: E,
    clusterer: C,
    config: PipelineConfig,
}

impl<E: ValueEncoder, C: DensityClusterer> Pipeline<E, C> {
    /// Create a pipeline. Fails if the configuration is invalid.
    pub fn new(encoder: E, clusterer: C, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { encoder, clusterer, config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Run every stage against a value source.
    pub fn run<S: ValueSource + ?Sized>(&self, source: &S) -> Result<PipelineOutput> {
        let samples = source.column_samples()?;
        let dataset_ids = source.dataset_ids()?;
        info!(columns = samples.len(), datasets = dataset_ids.len(), "pipeline run started");

        // Stage 1: represent
        let represented = represent::represent_columns(&self.encoder, &samples, &self.config.represent)?;

        // Stage 2+3: distances, clustering
        let clustering = cluster::cluster_columns(
            &self.clusterer,
            &represented,
            self.config.cluster.min_cluster_size,
        )?;

        // Stage 4: domain relations
        let relation_cfg = &self.config.relation;
        let affinity = relation::domain_affinity(&clustering.domains, &dataset_ids)?;
        let edges = relation::top_edges(&affinity, relation_cfg.nlargest, relation_cfg.min_weight);

        // Stage 5: column relations
        let columns: Vec<Column> = samples.into_iter().map(|s| s.column).collect();
        let column_relations = relation::column_relations(
            &affinity,
            &columns,
            &clustering.assignment,
            relation_cfg.max_relations,
            relation_cfg.min_score,
        )?;

        info!(
            domains = clustering.domains.len(),
            noise = clustering.noise,
            edges = edges.len(),
            column_relations = column_relations.nonzero_count(),
            "pipeline run finished"
        );

        Ok(PipelineOutput {
            columns,
            represented: represented.len(),
            domains: clustering.domains,
            assignment: clustering.assignment,
            affinity,
            edges,
            column_relations,
        })
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Value source error: {0}")]
    Source(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Clustering error: {0}")]
    Clustering(String),

    #[error("Dataset {0} is not in the corpus dataset list")]
    UnknownDataset(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
