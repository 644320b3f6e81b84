//! Per-record transformation engine.
//!
//! The four core transforms, all pure and stateless per record or per
//! schema, safe to run embarrassingly parallel:
//!
//! - schema inspection (primitive vs. nested-record partition)
//! - single-level flattening with null preservation
//! - column projection with renames
//! - ordered threshold classification

pub mod classify;
pub mod flatten;
pub mod inspect;
pub mod project;

pub use classify::{CategoryClassifier, Comparison, Predicate, Rule, RuleSet};
pub use flatten::{flatten_dataset, flatten_schema};
pub use inspect::{partition_fields, FieldPartition};
pub use project::project_dataset;
