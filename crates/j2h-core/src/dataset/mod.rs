//! Dataset model and ingestion boundary.
//!
//! This module provides the typed view of a record collection:
//!
//! - `Schema` / `FieldDescriptor` / `FieldType` — ordered, uniquely named
//!   fields, primitive or nested-record
//! - `Value` / `Record` — per-row values checked against the schema
//! - `Dataset` — a schema plus its records
//! - NDJSON reading with schema inference at the boundary

pub mod json;
mod schema;
mod value;

pub use schema::{FieldDescriptor, FieldType, Schema};
pub use value::{Dataset, Record, Value};
