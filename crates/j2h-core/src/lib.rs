//! j2h core - JSON dataset conversion and Hive registration engine
//!
//! This library converts newline-delimited JSON record collections into
//! queryable delimited-text tables:
//!
//! - Schema inspection and single-level flattening with null preservation
//! - Column projection with renames
//! - Ordered threshold classification into categorical labels
//! - Single-artifact CSV output with header
//! - Idempotent external-table registration against a Hive Metastore

pub mod catalog;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod transform;
pub mod writer;

// Re-export commonly used types
pub use config::Config;
pub use error::{RegistrationError, SchemaError, WriteError};
pub use error::{Error, Result};
