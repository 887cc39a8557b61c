//! # Exports
//!
//! Hand-off formats for the persistence/serving side. Nothing here feeds back
//! into the pipeline.
//!
//! | Format | Function | Contents |
//! |--------|----------|----------|
//! | Row snapshot | `GraphSnapshot::build` | packages, datasets, domains, columns, examples (1-based ids) |
//! | Graph view | `DomainGraph::build` | domains with member columns + directed edges |
//! | CSV | `export_affinity_csv` | domain affinity matrix, 2 decimals |
//! | Cypher | `export_cypher_dump` | `CREATE` script for a Neo4j-compatible store |
//! | JSON | `write_json` | any of the serializable views |

pub mod snapshot;
pub mod cypher;

pub use snapshot::{
    GraphSnapshot, PackageRow, DatasetRow, DomainRow, ColumnRow, ExampleRow,
    DomainGraph, DomainNode, DomainEdge, ColumnView, DatasetView, PackageView,
};
pub use cypher::export_cypher_dump;

use std::io::Write;
use serde::Serialize;

use crate::model::AffinityMatrix;
use crate::Result;

/// Write the affinity matrix as CSV. Header and index are 1-based domain
/// ids; values are rounded to two decimals.
pub fn export_affinity_csv<W: Write>(affinity: &AffinityMatrix, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let n = affinity.rows();

    let mut header = Vec::with_capacity(n + 1);
    header.push(String::new());
    header.extend((1..=n).map(|id| id.to_string()));
    out.write_record(&header)?;

    for k in 0..n {
        let mut record = Vec::with_capacity(n + 1);
        record.push((k + 1).to_string());
        record.extend(affinity.row(k).iter().map(|v| format!("{:.2}", v)));
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
