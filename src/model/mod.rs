//! # Corpus Model
//!
//! Plain DTOs shared by every pipeline stage:
//! source → representer → clusterer → relation engine → export.
//!
//! Design rule: NO encoder types, NO clustering internals here.
//! This module is pure data: no I/O, no global state.

pub mod column;
pub mod summary;
pub mod matrix;
pub mod domain;
pub mod relation;

pub use column::{Column, ColumnKey, ColumnSample, Dataset, DatasetId, Package};
pub use summary::{ColumnSummary, VARIANCE_FLOOR};
pub use matrix::{Matrix, DistanceMatrix, AffinityMatrix};
pub use domain::{Domain, DomainId, DomainAssignment, NOISE_LABEL};
pub use relation::{RelationEdge, ColumnRelation, ColumnRelations};
