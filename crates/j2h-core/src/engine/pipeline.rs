//! Pipeline orchestration.
//!
//! Sequences the transforms over each configured dataset:
//!
//! raw NDJSON → flatten → flat CSV
//! (with transform) → project → classify → transformed CSV → registration
//!
//! Failure isolation follows the error taxonomy: schema and write failures
//! abort the affected dataset but never its siblings; registration failures
//! never abort anything. Every dataset produces a structured outcome.

use crate::catalog::{CatalogRegistrar, ExternalTableSpec, HiveClientConfig, HiveMetastoreClient};
use crate::config::{Config, DatasetDescriptor, RegisterConfig, TransformConfig};
use crate::dataset::{json, Dataset, Schema};
use crate::error::Result;
use crate::transform::{flatten_dataset, project_dataset, CategoryClassifier, RuleSet};
use crate::writer::{CsvWriteOptions, TableWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Apply a dataset's configured projection and labeling to its flattened
/// form.
pub fn apply_transform(flat: &Dataset, transform: &TransformConfig) -> Result<Dataset> {
    let projected = project_dataset(flat, &transform.keep, &transform.rename)?;

    let Some(label) = &transform.label else {
        return Ok(projected);
    };

    let classifier = CategoryClassifier {
        field: label.field.clone(),
        output: label.output.clone(),
        rules: RuleSet::star_rules(),
        comparison: label.comparison,
    };
    classifier.apply(&projected)
}

/// Build the registration spec a pipeline run would issue for a
/// transformed dataset.
pub fn build_table_spec(
    config: &Config,
    register: &RegisterConfig,
    schema: &Schema,
    out_dir: &Path,
) -> ExternalTableSpec {
    let database = config
        .catalog
        .as_ref()
        .map(|c| c.database.clone())
        .unwrap_or_else(|| "default".to_string());

    let location = register.location.clone().unwrap_or_else(|| {
        std::fs::canonicalize(out_dir)
            .unwrap_or_else(|_| out_dir.to_path_buf())
            .display()
            .to_string()
    });

    ExternalTableSpec {
        database,
        table: register.table.clone(),
        columns: ExternalTableSpec::columns_from_schema(schema),
        field_delimiter: config.output.delimiter,
        location,
    }
}

/// Outcome of processing one dataset.
#[derive(Debug)]
pub struct DatasetOutcome {
    /// Logical dataset name
    pub dataset: String,
    /// Processing status
    pub status: DatasetStatus,
    /// Registration result, when attempted
    pub registration: Option<RegistrationOutcome>,
}

/// Terminal status of a dataset's pipeline run.
#[derive(Debug)]
pub enum DatasetStatus {
    /// All configured stages completed
    Completed {
        /// Rows written to the flat output
        flat_rows: usize,
        /// Rows written to the transformed output, when configured
        transformed_rows: Option<usize>,
    },
    /// A fatal stage failed; siblings are unaffected
    Failed {
        /// Error classification (schema, write, io, ...)
        kind: &'static str,
        /// Human-readable message
        message: String,
    },
}

impl DatasetStatus {
    /// Whether the dataset completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, DatasetStatus::Completed { .. })
    }
}

/// Advisory registration result.
#[derive(Debug)]
pub enum RegistrationOutcome {
    /// Table registered (or already present)
    Registered {
        /// Fully qualified table name
        table: String,
    },
    /// Registration failed; the written data remains valid
    Failed {
        /// Fully qualified table name
        table: String,
        /// Failure message
        message: String,
    },
}

/// The dataset conversion pipeline.
pub struct Pipeline {
    config: Config,
    writer: TableWriter,
    registrar: Option<CatalogRegistrar>,
}

impl Pipeline {
    /// Build a pipeline from configuration, connecting the catalog client
    /// when one is configured.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let registrar = match &config.catalog {
            Some(catalog) => {
                let client = HiveMetastoreClient::new(HiveClientConfig {
                    metastore_uri: catalog.metastore_uri.clone(),
                    username: catalog.username.clone(),
                    password: catalog.password.clone(),
                    timeout: Duration::from_secs(catalog.request_timeout_seconds),
                })
                .await?;
                Some(CatalogRegistrar::new(Arc::new(client)))
            }
            None => {
                info!("No catalog configured, table registration disabled");
                None
            }
        };

        Ok(Self::assemble(config, registrar))
    }

    /// Build a pipeline with a caller-supplied registrar (or none).
    ///
    /// Lets tests and embedders swap the catalog transport.
    pub fn with_registrar(config: Config, registrar: Option<CatalogRegistrar>) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, registrar))
    }

    fn assemble(config: Config, registrar: Option<CatalogRegistrar>) -> Self {
        let writer = TableWriter::new(CsvWriteOptions {
            delimiter: config.output.delimiter as u8,
            null_token: config.output.null_token.clone(),
        });
        Self {
            config,
            writer,
            registrar,
        }
    }

    /// Process every configured dataset, returning one outcome each.
    ///
    /// Never fails as a whole: per-dataset errors land in that dataset's
    /// outcome and processing continues with the next dataset.
    pub async fn run(&self) -> Vec<DatasetOutcome> {
        let mut outcomes = Vec::with_capacity(self.config.datasets.len());
        for descriptor in &self.config.datasets {
            let outcome = self.process_dataset(descriptor).await;
            match &outcome.status {
                DatasetStatus::Completed {
                    flat_rows,
                    transformed_rows,
                } => info!(
                    dataset = %outcome.dataset,
                    flat_rows,
                    transformed_rows = ?transformed_rows,
                    "Dataset completed"
                ),
                DatasetStatus::Failed { kind, message } => error!(
                    dataset = %outcome.dataset,
                    kind,
                    message = %message,
                    "Dataset failed"
                ),
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn process_dataset(&self, descriptor: &DatasetDescriptor) -> DatasetOutcome {
        match self.convert_and_transform(descriptor).await {
            Ok((flat_rows, transformed_rows, registration)) => DatasetOutcome {
                dataset: descriptor.name.clone(),
                status: DatasetStatus::Completed {
                    flat_rows,
                    transformed_rows,
                },
                registration,
            },
            Err(e) => DatasetOutcome {
                dataset: descriptor.name.clone(),
                status: DatasetStatus::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                },
                registration: None,
            },
        }
    }

    async fn convert_and_transform(
        &self,
        descriptor: &DatasetDescriptor,
    ) -> Result<(usize, Option<usize>, Option<RegistrationOutcome>)> {
        info!(dataset = %descriptor.name, source = %descriptor.source.display(), "Processing dataset");

        let raw = json::read_path(&descriptor.source)?;
        let flat = flatten_dataset(&raw)?;

        let flat_summary = self
            .writer
            .write(&flat, &self.config.output.flat_dataset_dir(&descriptor.name))?;

        let Some(transform) = &descriptor.transform else {
            return Ok((flat_summary.row_count, None, None));
        };

        let transformed = apply_transform(&flat, transform)?;
        let out_dir = self.config.output.transformed_dataset_dir(&descriptor.name);
        let summary = self.writer.write(&transformed, &out_dir)?;

        let registration = match &transform.register {
            Some(register) => {
                self.register_table(&transformed, register, &out_dir).await
            }
            None => None,
        };

        Ok((
            flat_summary.row_count,
            Some(summary.row_count),
            registration,
        ))
    }

    async fn register_table(
        &self,
        transformed: &Dataset,
        register: &RegisterConfig,
        out_dir: &Path,
    ) -> Option<RegistrationOutcome> {
        let registrar = self.registrar.as_ref()?;

        let spec = build_table_spec(&self.config, register, &transformed.schema, out_dir);
        let table = format!("{}.{}", spec.database, spec.table);
        match registrar.register(&spec).await {
            Ok(()) => Some(RegistrationOutcome::Registered { table }),
            Err(e) => {
                // Advisory: the written data stays valid and queryable
                warn!(table = %table, error = %e, "Table registration failed");
                Some(RegistrationOutcome::Failed {
                    table,
                    message: e.to_string(),
                })
            }
        }
    }
}
