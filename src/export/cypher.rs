//! Cypher DUMP export: the knowledge graph as Cypher statements.
//!
//! Produces a script that loads domains, columns and their relations into
//! Neo4j or any Cypher-compatible store:
//!
//! ```text
//! (:Domain {_id, name, size})
//! (:Column {_id, name, dataset, package})
//! (:Column)-[:MEMBER_OF]->(:Domain)
//! (:Domain)-[:RELATED_TO {weight}]->(:Domain)     top-k domain edges
//! (:Column)-[:RELATED_TO {weight}]->(:Column)     propagated column relations
//! ```
//!
//! `_id` values are the snapshot's 1-based row ids.

use std::io::Write;

use crate::export::GraphSnapshot;
use crate::relation::top_edges;
use crate::{PipelineOutput, Result};

/// Cypher literal for a property value.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Null,
    Int(i64),
    Float(f64),
    String(String),
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<Option<&str>> for Literal {
    fn from(s: Option<&str>) -> Self {
        s.map_or(Literal::Null, Literal::from)
    }
}

/// Export a pipeline run as a Cypher DUMP script.
///
/// Domain edges use `nlargest` / `min_weight` exactly as the serving layer
/// would; column relations are written as computed.
pub fn export_cypher_dump(
    snapshot: &GraphSnapshot,
    output: &PipelineOutput,
    nlargest: usize,
    min_weight: f64,
    writer: &mut dyn Write,
) -> Result<()> {
    let edges = top_edges(&output.affinity, nlargest, min_weight);

    // Header
    writeln!(writer, "// tether Cypher DUMP")?;
    writeln!(writer, "// Domains: {}", snapshot.domains.len())?;
    writeln!(writer, "// Columns: {}", snapshot.columns.len())?;
    writeln!(writer, "// Domain relations: {}", edges.len())?;
    writeln!(writer, "// Column relations: {}", output.column_relations.nonzero_count())?;
    writeln!(writer)?;

    for domain in &snapshot.domains {
        let size = (domain.id as usize)
            .checked_sub(1)
            .and_then(|k| output.domains.get(k))
            .map_or(0, |d| d.len());
        let props = format_properties(&[
            ("_id", Literal::Int(domain.id as i64)),
            ("name", Literal::from(domain.name.as_deref())),
            ("size", Literal::Int(size as i64)),
        ]);
        writeln!(writer, "CREATE (:Domain {{{}}});", props)?;
    }

    writeln!(writer)?;
    writeln!(writer, "// Columns")?;

    for (row, column) in snapshot.columns.iter().zip(&output.columns) {
        let props = format_properties(&[
            ("_id", Literal::Int(row.id as i64)),
            ("name", Literal::from(row.name.as_str())),
            ("dataset", Literal::from(column.dataset().0.as_str())),
            ("package", Literal::from(column.package.as_str())),
        ]);
        writeln!(writer, "CREATE (:Column {{{}}});", props)?;
    }

    writeln!(writer)?;
    writeln!(writer, "// Relationships")?;

    for row in &snapshot.columns {
        if let Some(domain_id) = row.domain_id {
            writeln!(
                writer,
                "MATCH (c:Column {{_id: {}}}), (d:Domain {{_id: {}}}) CREATE (c)-[:MEMBER_OF]->(d);",
                row.id, domain_id,
            )?;
        }
    }

    for edge in &edges {
        writeln!(
            writer,
            "MATCH (a:Domain {{_id: {}}}), (b:Domain {{_id: {}}}) CREATE (a)-[:RELATED_TO {{{}}}]->(b);",
            edge.source.0 + 1,
            edge.target.0 + 1,
            format_properties(&[("weight", Literal::Float(edge.weight))]),
        )?;
    }

    for (src, dst, score) in output.column_relations.iter() {
        writeln!(
            writer,
            "MATCH (a:Column {{_id: {}}}), (b:Column {{_id: {}}}) CREATE (a)-[:RELATED_TO {{{}}}]->(b);",
            src + 1,
            dst + 1,
            format_properties(&[("weight", Literal::Float(score))]),
        )?;
    }

    Ok(())
}

/// Format properties as a Cypher property string (key: value, ...).
fn format_properties(props: &[(&str, Literal)]) -> String {
    props
        .iter()
        .map(|(key, value)| format!("{}: {}", key, format_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a Literal as Cypher source.
fn format_value(value: &Literal) -> String {
    match value {
        Literal::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => format!("{}", f),
        Literal::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Literal::from("hello")), "'hello'");
        assert_eq!(format_value(&Literal::from("O'Brien")), "'O\\'Brien'");
        assert_eq!(format_value(&Literal::Int(42)), "42");
        assert_eq!(format_value(&Literal::Float(0.75)), "0.75");
        assert_eq!(format_value(&Literal::from(None)), "null");
    }

    #[test]
    fn test_domain_row_zero_does_not_underflow() {
        use crate::export::DomainRow;
        use crate::model::Matrix;

        let snapshot = GraphSnapshot {
            generated_at: chrono::Utc::now(),
            packages: Vec::new(),
            datasets: Vec::new(),
            domains: vec![DomainRow { id: 0, name: None }],
            columns: Vec::new(),
            examples: Vec::new(),
        };
        let output = PipelineOutput {
            columns: Vec::new(),
            represented: 0,
            domains: Vec::new(),
            assignment: Default::default(),
            affinity: Matrix::square(0),
            edges: Vec::new(),
            column_relations: Default::default(),
        };

        let mut buf = Vec::new();
        export_cypher_dump(&snapshot, &output, 10, 0.5, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("CREATE (:Domain {_id: 0, name: null, size: 0});"));
    }

    #[test]
    fn test_format_properties() {
        let result = format_properties(&[("name", Literal::from("EMAIL")), ("size", Literal::Int(3))]);
        assert_eq!(result, "name: 'EMAIL', size: 3");
    }
}
