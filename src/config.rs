//! Pipeline configuration.
//!
//! Every field has a default matching the reference pipeline, so an empty
//! JSON object is a valid configuration:
//!
//! ```json
//! {
//!   "represent": { "max_items": 1000, "max_length": 100, "sampling": "head" },
//!   "cluster":   { "min_cluster_size": 3 },
//!   "relation":  { "nlargest": 10, "min_weight": 0.5, "max_relations": 10, "min_score": 0.5 },
//!   "export":    { "num_examples": 10, "example_rows": 100, "example_max_chars": 50 }
//! }
//! ```

use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};

/// Top-level configuration for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub represent: RepresentConfig,
    pub cluster: ClusterConfig,
    pub relation: RelationConfig,
    pub export: ExportConfig,
}

/// How column values are chosen before encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// First `max_items` values in source order. Biased if the source is sorted.
    #[default]
    Head,
    /// Seeded uniform subset of `max_items` values, kept in source order.
    Random { seed: u64 },
}

/// Column Representer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepresentConfig {
    /// Maximum number of values encoded per column.
    pub max_items: usize,
    /// Fixed one-hot sequence length; longer values are truncated.
    pub max_length: usize,
    pub sampling: Sampling,
}

impl Default for RepresentConfig {
    fn default() -> Self {
        Self { max_items: 1000, max_length: 100, sampling: Sampling::Head }
    }
}

/// Domain Clusterer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub min_cluster_size: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self { min_cluster_size: 3 }
    }
}

/// Domain and column relation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationConfig {
    /// Edges kept per source domain before the weight filter.
    pub nlargest: usize,
    /// Minimum edge weight (inclusive).
    pub min_weight: f64,
    /// Relations kept per column.
    pub max_relations: usize,
    /// Column relation scores must be strictly greater than this.
    pub min_score: f64,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self { nlargest: 10, min_weight: 0.5, max_relations: 10, min_score: 0.5 }
    }
}

/// Snapshot and graph-view settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Examples shown per column in the domain graph view.
    pub num_examples: usize,
    /// Leading values scanned per column when collecting examples.
    pub example_rows: usize,
    /// Examples are truncated to this many characters.
    pub example_max_chars: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { num_examples: 10, example_rows: 100, example_max_chars: 50 }
    }
}

impl PipelineConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings no stage can run with.
    pub fn validate(&self) -> Result<()> {
        let r = &self.represent;
        if r.max_items == 0 {
            return Err(Error::Config("represent.max_items must be > 0".into()));
        }
        if r.max_length == 0 {
            return Err(Error::Config("represent.max_length must be > 0".into()));
        }
        if self.cluster.min_cluster_size < 2 {
            return Err(Error::Config("cluster.min_cluster_size must be >= 2".into()));
        }
        let rel = &self.relation;
        if !(rel.min_weight.is_finite() && rel.min_weight >= 0.0) {
            return Err(Error::Config(format!("relation.min_weight must be finite and >= 0, got {}", rel.min_weight)));
        }
        if !(rel.min_score.is_finite() && rel.min_score >= 0.0) {
            return Err(Error::Config(format!("relation.min_score must be finite and >= 0, got {}", rel.min_score)));
        }
        Ok(())
    }
}
