//! External catalog registration.
//!
//! Makes written datasets discoverable by name: an `ExternalTableSpec`
//! describes the table (columns, delimiter, storage location), a
//! `CatalogClient` talks to a concrete metastore, and the
//! `CatalogRegistrar` issues one idempotent registration per spec.
//!
//! Registration is best-effort and advisory. The registrar returns a typed
//! `RegistrationError` and performs no logging-and-swallowing of its own;
//! the caller decides whether to log, retry, or ignore. Written data stays
//! valid and queryable by other means when registration fails.

mod hive;

pub use hive::{HiveClientConfig, HiveMetastoreClient};

use crate::dataset::Schema;
use crate::error::RegistrationError;
use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// A single column of an external table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name
    pub name: String,
    /// Hive column type (string, double, boolean, ...)
    pub hive_type: String,
}

/// Everything needed to register one delimited-text external table.
#[derive(Debug, Clone)]
pub struct ExternalTableSpec {
    /// Target database (namespace)
    pub database: String,
    /// Table name
    pub table: String,
    /// Explicit flat column list
    pub columns: Vec<ColumnSpec>,
    /// Field delimiter of the underlying text files
    pub field_delimiter: char,
    /// Storage location URI
    pub location: String,
}

impl ExternalTableSpec {
    /// Derive the column list from a flat schema.
    pub fn columns_from_schema(schema: &Schema) -> Vec<ColumnSpec> {
        schema
            .fields()
            .iter()
            .map(|f| ColumnSpec {
                name: f.name.clone(),
                hive_type: f.field_type.to_hive_type().to_string(),
            })
            .collect()
    }

    /// Render the logical registration DDL.
    ///
    /// This is the contract the registration performs against the catalog,
    /// independent of transport; used for logs and the `ddl` CLI command.
    pub fn to_ddl(&self) -> String {
        let mut ddl = format!(
            "CREATE EXTERNAL TABLE IF NOT EXISTS {}.{} (\n",
            self.database, self.table
        );
        for (i, column) in self.columns.iter().enumerate() {
            let separator = if i + 1 < self.columns.len() { "," } else { "" };
            let _ = writeln!(ddl, "    {} {}{}", column.name, column.hive_type, separator);
        }
        let _ = write!(
            ddl,
            ")\nROW FORMAT DELIMITED\nFIELDS TERMINATED BY '{}'\nSTORED AS TEXTFILE\nLOCATION '{}'",
            self.field_delimiter, self.location
        );
        ddl
    }

    fn validate(&self) -> Result<(), RegistrationError> {
        if self.table.is_empty() {
            return Err(RegistrationError::InvalidSpec("table name is empty".into()));
        }
        if self.database.is_empty() {
            return Err(RegistrationError::InvalidSpec("database is empty".into()));
        }
        if self.columns.is_empty() {
            return Err(RegistrationError::InvalidSpec(format!(
                "table {} has no columns",
                self.table
            )));
        }
        if self.location.is_empty() {
            return Err(RegistrationError::InvalidSpec(format!(
                "table {} has no storage location",
                self.table
            )));
        }
        Ok(())
    }
}

/// Operations a concrete metastore client must provide.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Whether the database (namespace) exists.
    async fn database_exists(&self, database: &str) -> Result<bool, RegistrationError>;

    /// Create a database; succeeds if it already exists.
    async fn create_database(&self, database: &str) -> Result<(), RegistrationError>;

    /// Whether the table exists in the database.
    async fn table_exists(&self, database: &str, table: &str) -> Result<bool, RegistrationError>;

    /// Create the external table; succeeds if it already exists.
    async fn register_external_table(
        &self,
        spec: &ExternalTableSpec,
    ) -> Result<(), RegistrationError>;

    /// Close the connection gracefully.
    async fn close(&self) -> Result<(), RegistrationError>;
}

/// Issues idempotent external-table registrations against a catalog.
pub struct CatalogRegistrar {
    client: Arc<dyn CatalogClient>,
}

impl CatalogRegistrar {
    /// Registrar over the given client.
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }

    /// Register one external table.
    ///
    /// Validates the spec, ensures the database exists, and issues a single
    /// create-if-not-exists. One blocking round trip, no retry; callers
    /// wanting resilience wrap this in their own timeout and retry budget.
    pub async fn register(&self, spec: &ExternalTableSpec) -> Result<(), RegistrationError> {
        spec.validate()?;

        if !self.client.database_exists(&spec.database).await? {
            self.client.create_database(&spec.database).await?;
        }

        if self.client.table_exists(&spec.database, &spec.table).await? {
            debug!(
                database = %spec.database,
                table = %spec.table,
                "Table already registered"
            );
            return Ok(());
        }

        self.client.register_external_table(spec).await
    }
}
