//! Configuration structures for j2h.
//!
//! Configuration is loaded from TOML files and can be overridden via CLI
//! flags. All collaborator settings (catalog connection, output layout) are
//! explicit here; core logic never reads ambient state.

use crate::error::{Error, Result};
use crate::transform::Comparison;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Dataset descriptors, one per logical dataset
    pub datasets: Vec<DatasetDescriptor>,

    /// Output layout and CSV rendering
    #[serde(default)]
    pub output: OutputConfig,

    /// Catalog connection; registration is skipped when absent
    pub catalog: Option<CatalogConfig>,

    /// Monitoring configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

/// One logical dataset: where it comes from and what happens to it.
///
/// Purely configuration; never mutated by the core.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetDescriptor {
    /// Logical name (e.g. "business")
    pub name: String,

    /// Source NDJSON file
    pub source: PathBuf,

    /// Optional projection/classification/registration stage
    pub transform: Option<TransformConfig>,
}

/// Projection, labeling, and registration settings for one dataset.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformConfig {
    /// Columns to keep (post-flatten names)
    pub keep: Vec<String>,

    /// Renames applied to kept columns
    #[serde(default)]
    pub rename: HashMap<String, String>,

    /// Derived label column
    pub label: Option<LabelConfig>,

    /// External table registration
    pub register: Option<RegisterConfig>,
}

/// Derived categorical label settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LabelConfig {
    /// Numeric column the rules read
    pub field: String,

    /// Output column the label is written to
    #[serde(default = "default_label_output")]
    pub output: String,

    /// Threshold comparison mode; "lexical" reproduces legacy string
    /// ordering
    #[serde(default)]
    pub comparison: Comparison,
}

/// External table registration settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegisterConfig {
    /// Catalog table name
    pub table: String,

    /// Storage location URI; defaults to the transformed output directory
    pub location: Option<String>,
}

/// Output layout and CSV rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory for flat (converted) CSV output
    #[serde(default = "default_flat_dir")]
    pub flat_dir: PathBuf,

    /// Directory for transformed CSV output
    #[serde(default = "default_transformed_dir")]
    pub transformed_dir: PathBuf,

    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Rendering of null values
    #[serde(default)]
    pub null_token: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            flat_dir: default_flat_dir(),
            transformed_dir: default_transformed_dir(),
            delimiter: default_delimiter(),
            null_token: String::new(),
        }
    }
}

impl OutputConfig {
    /// Flat CSV directory for a named dataset.
    pub fn flat_dataset_dir(&self, name: &str) -> PathBuf {
        self.flat_dir.join(format!("df_{}", name))
    }

    /// Transformed CSV directory for a named dataset.
    pub fn transformed_dataset_dir(&self, name: &str) -> PathBuf {
        self.transformed_dir.join(format!("df_{}", name))
    }
}

/// Hive Metastore connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Metastore URI (thrift://host:port)
    pub metastore_uri: String,

    /// Target database (namespace)
    #[serde(default = "default_database")]
    pub database: String,

    /// Optional username
    pub username: Option<String>,

    /// Optional password
    pub password: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

/// Monitoring configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log format
    #[serde(default)]
    pub log_format: LogFormat,
}

/// Log level.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    Warn,
    /// Error level
    Error,
}

impl LogLevel {
    /// Filter directive string for tracing-subscriber.
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// Plain text format
    Text,
}

// Default value functions
fn default_flat_dir() -> PathBuf {
    PathBuf::from("./converted_dataset")
}
fn default_transformed_dir() -> PathBuf {
    PathBuf::from("./transformed_dataset")
}
fn default_delimiter() -> char {
    ','
}
fn default_database() -> String {
    "default".to_string()
}
fn default_request_timeout_seconds() -> u64 {
    30
}
fn default_label_output() -> String {
    "conclusion".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(Error::Config("At least one dataset required".into()));
        }

        let mut seen = std::collections::HashSet::new();
        for dataset in &self.datasets {
            if dataset.name.is_empty() {
                return Err(Error::Config("Dataset name is required".into()));
            }
            if !seen.insert(dataset.name.as_str()) {
                return Err(Error::Config(format!(
                    "Duplicate dataset name: {}",
                    dataset.name
                )));
            }
            if dataset.source.as_os_str().is_empty() {
                return Err(Error::Config(format!(
                    "Dataset {} has no source path",
                    dataset.name
                )));
            }
            if let Some(transform) = &dataset.transform {
                if transform.keep.is_empty() {
                    return Err(Error::Config(format!(
                        "Transform for dataset {} keeps no columns",
                        dataset.name
                    )));
                }
                if transform.register.is_some() && self.catalog.is_none() {
                    return Err(Error::Config(format!(
                        "Dataset {} requests registration but no [catalog] is configured",
                        dataset.name
                    )));
                }
            }
        }

        if !self.output.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "Delimiter must be a single ASCII character, got {:?}",
                self.output.delimiter
            )));
        }

        if let Some(catalog) = &self.catalog {
            if catalog.metastore_uri.is_empty() {
                return Err(Error::Config("Catalog metastore_uri is required".into()));
            }
        }

        Ok(())
    }
}
