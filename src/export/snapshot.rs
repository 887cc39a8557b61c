//! Row snapshot and domain graph view.
//!
//! `GraphSnapshot` flattens a run into relational rows with 1-based ids, the
//! shape a catalog database stores. `DomainGraph` regroups those rows into
//! the node/edge payload a graph UI consumes. Both only reshape pipeline
//! output; query parameters are forwarded to `relation::top_edges`.

use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExportConfig;
use crate::model::ColumnKey;
use crate::relation::top_edges;
use crate::source::ValueSource;
use crate::{Error, PipelineOutput, Result};

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRow {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub id: u64,
    pub name: String,
    pub package_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRow {
    pub id: u64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub id: u64,
    pub name: String,
    pub dataset_id: u64,
    /// `DomainId + 1`, `None` for unassigned columns.
    pub domain_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleRow {
    pub id: u64,
    pub column_id: u64,
    pub value: String,
}

/// A pipeline run as relational rows.
///
/// Column row `i` describes `PipelineOutput::columns[i]` and has id `i + 1`;
/// domain row `k` has id `k + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub generated_at: DateTime<Utc>,
    pub packages: Vec<PackageRow>,
    pub datasets: Vec<DatasetRow>,
    pub domains: Vec<DomainRow>,
    pub columns: Vec<ColumnRow>,
    pub examples: Vec<ExampleRow>,
}

impl GraphSnapshot {
    pub fn build<S: ValueSource + ?Sized>(
        output: &PipelineOutput,
        source: &S,
        config: &ExportConfig,
    ) -> Result<Self> {
        let packages: Vec<PackageRow> = source
            .packages()?
            .into_iter()
            .enumerate()
            .map(|(i, p)| PackageRow { id: i as u64 + 1, name: p.name })
            .collect();
        let package_id: HashMap<String, u64> = packages.iter().map(|p| (p.name.clone(), p.id)).collect();

        let mut datasets = Vec::new();
        for (i, ds) in source.datasets()?.into_iter().enumerate() {
            let pid = *package_id
                .get(ds.package.as_str())
                .ok_or_else(|| Error::Source(format!("dataset {} names unknown package {}", ds.id, ds.package)))?;
            datasets.push(DatasetRow { id: i as u64 + 1, name: ds.id.0, package_id: pid });
        }
        let dataset_id: HashMap<String, u64> = datasets.iter().map(|d| (d.name.clone(), d.id)).collect();

        let domains: Vec<DomainRow> = output
            .domains
            .iter()
            .map(|d| DomainRow { id: d.id.0 as u64 + 1, name: d.name.clone() })
            .collect();

        let mut columns = Vec::with_capacity(output.columns.len());
        for (i, col) in output.columns.iter().enumerate() {
            let did = *dataset_id
                .get(col.dataset().0.as_str())
                .ok_or_else(|| Error::UnknownDataset(col.dataset().to_string()))?;
            columns.push(ColumnRow {
                id: i as u64 + 1,
                name: col.name().to_string(),
                dataset_id: did,
                domain_id: output.assignment.get(&col.key).map(|d| d.0 as u64 + 1),
            });
        }

        let values: HashMap<ColumnKey, Vec<String>> = source
            .column_samples()?
            .into_iter()
            .map(|s| (s.column.key, s.values))
            .collect();

        let mut examples = Vec::new();
        for (i, col) in output.columns.iter().enumerate() {
            let Some(vals) = values.get(&col.key) else { continue };
            for value in pick_examples(vals, config.example_rows, config.example_max_chars) {
                examples.push(ExampleRow {
                    id: examples.len() as u64 + 1,
                    column_id: i as u64 + 1,
                    value,
                });
            }
        }

        debug!(
            packages = packages.len(),
            datasets = datasets.len(),
            columns = columns.len(),
            examples = examples.len(),
            "snapshot built"
        );

        Ok(Self { generated_at: Utc::now(), packages, datasets, domains, columns, examples })
    }

    /// Examples of one column, in insertion order.
    pub fn examples_of(&self, column_id: u64) -> impl Iterator<Item = &str> {
        self.examples
            .iter()
            .filter(move |e| e.column_id == column_id)
            .map(|e| e.value.as_str())
    }

    /// Examples grouped by column id in one pass, each group in insertion
    /// order.
    pub fn examples_by_column(&self) -> HashMap<u64, Vec<&str>> {
        let mut grouped: HashMap<u64, Vec<&str>> = HashMap::new();
        for e in &self.examples {
            grouped.entry(e.column_id).or_default().push(e.value.as_str());
        }
        grouped
    }
}

/// Distinct non-blank values among the first `rows` sampled values,
/// truncated to `max_chars` characters.
///
/// Samples arrive with nulls already dropped, so the window counts non-null
/// values: a sparse column scans `rows` values, not `rows` source rows.
fn pick_examples(values: &[String], rows: usize, max_chars: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .take(rows)
        .map(|v| v.chars().take(max_chars).collect::<String>())
        .filter(|v| !v.trim().is_empty())
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

// ============================================================================
// Domain graph view
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageView {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetView {
    pub id: u64,
    pub name: String,
    pub package: PackageView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnView {
    pub id: u64,
    pub name: String,
    pub dataset: DatasetView,
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainNode {
    pub id: u64,
    pub name: Option<String>,
    pub columns: Vec<ColumnView>,
}

/// Edge with 1-based domain ids rendered as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Domains with their member columns, plus directed top-k edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainGraph {
    pub nodes: Vec<DomainNode>,
    pub edges: Vec<DomainEdge>,
}

impl DomainGraph {
    /// Nodes are ordered by name (unnamed last), then id. Each column shows
    /// at most `num_examples` examples.
    ///
    /// Fails with `Error::Source` when a column row names a dataset, or a
    /// dataset names a package, that the snapshot does not hold.
    pub fn build(
        snapshot: &GraphSnapshot,
        output: &PipelineOutput,
        nlargest: usize,
        min_weight: f64,
        num_examples: usize,
    ) -> Result<Self> {
        let packages: HashMap<u64, &PackageRow> = snapshot.packages.iter().map(|p| (p.id, p)).collect();
        let datasets: HashMap<u64, &DatasetRow> = snapshot.datasets.iter().map(|d| (d.id, d)).collect();

        let mut nodes: Vec<DomainNode> = snapshot
            .domains
            .iter()
            .map(|d| DomainNode { id: d.id, name: d.name.clone(), columns: Vec::new() })
            .collect();
        let node_index: HashMap<u64, usize> = nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();
        let examples = snapshot.examples_by_column();

        for col in &snapshot.columns {
            let Some(&idx) = col.domain_id.and_then(|d| node_index.get(&d)) else { continue };
            let ds = datasets.get(&col.dataset_id).ok_or_else(|| {
                Error::Source(format!("column {} names unknown dataset row {}", col.id, col.dataset_id))
            })?;
            let p = packages.get(&ds.package_id).ok_or_else(|| {
                Error::Source(format!("dataset {} names unknown package row {}", ds.name, ds.package_id))
            })?;

            nodes[idx].columns.push(ColumnView {
                id: col.id,
                name: col.name.clone(),
                dataset: DatasetView {
                    id: ds.id,
                    name: ds.name.clone(),
                    package: PackageView { id: p.id, name: p.name.clone() },
                },
                examples: examples
                    .get(&col.id)
                    .map(|vals| vals.iter().take(num_examples).map(|v| v.to_string()).collect())
                    .unwrap_or_default(),
            });
        }

        nodes.sort_by(|a, b| match (&a.name, &b.name) {
            (Some(x), Some(y)) => x.cmp(y).then(a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });

        let edges = top_edges(&output.affinity, nlargest, min_weight)
            .into_iter()
            .map(|e| DomainEdge {
                source: (e.source.0 + 1).to_string(),
                target: (e.target.0 + 1).to_string(),
                weight: e.weight,
            })
            .collect();

        Ok(Self { nodes, edges })
    }

    pub fn node(&self, id: u64) -> Option<&DomainNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
