//! # Relations
//!
//! Domain-level affinity from dataset co-occurrence, and its projection onto
//! column pairs.
//!
//! | Stage | Module | Input | Output |
//! |-------|--------|-------|--------|
//! | Domain Relation Engine | `domain` | domains + dataset ids | `AffinityMatrix`, `RelationEdge`s |
//! | Column Relation Propagator | `column` | affinity + assignment | `ColumnRelations` |

pub mod domain;
pub mod column;

pub use domain::{incidence_matrix, co_occurrence, ppmi, domain_affinity, top_edges, PMI_SMOOTHING};
pub use column::column_relations;
