//! Hive Metastore catalog client.
//!
//! Registers delimited-text external tables through the HMS Thrift protocol
//! via the `hive_metastore` crate. Registration maps the logical
//! `CREATE EXTERNAL TABLE ... ROW FORMAT DELIMITED ... STORED AS TEXTFILE`
//! contract onto a metastore `Table` object: LazySimpleSerDe with the
//! configured field delimiter, text input/output formats, and an
//! `EXTERNAL_TABLE` type.

use crate::error::RegistrationError;
use async_trait::async_trait;
use hive_metastore::{
    Database, FieldSchema, SerDeInfo, StorageDescriptor, Table, ThriftHiveMetastoreClient,
    ThriftHiveMetastoreClientBuilder,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{CatalogClient, ExternalTableSpec};

const TEXT_INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
const TEXT_OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
const LAZY_SIMPLE_SERDE: &str = "org.apache.hadoop.hive.serde2.lazy.LazySimpleSerDe";

/// Hive Metastore client configuration.
///
/// Constructed once from the application config and passed in explicitly;
/// the client performs no ambient configuration lookup.
#[derive(Debug, Clone)]
pub struct HiveClientConfig {
    /// Metastore URI (thrift://host:port)
    pub metastore_uri: String,
    /// Optional username, accepted for parity with legacy deployments
    pub username: Option<String>,
    /// Optional password, accepted for parity with legacy deployments
    pub password: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

/// Hive Metastore catalog client.
pub struct HiveMetastoreClient {
    client: RwLock<Option<ThriftHiveMetastoreClient>>,
    config: HiveClientConfig,
    connected: AtomicBool,
}

impl HiveMetastoreClient {
    /// Create a client and attempt an initial connection.
    ///
    /// A failed initial connection is not fatal; the client reconnects on
    /// the first operation.
    pub async fn new(config: HiveClientConfig) -> Result<Self, RegistrationError> {
        // Fail fast on an unparseable URI rather than on first use
        Self::parse_thrift_uri(&config.metastore_uri)?;

        if config.username.is_some() || config.password.is_some() {
            warn!("Thrift metastore transport is unauthenticated; configured credentials are ignored");
        }

        let client = Self {
            client: RwLock::new(None),
            config,
            connected: AtomicBool::new(false),
        };

        if let Err(e) = client.connect().await {
            warn!(error = %e, "Initial connection to Hive Metastore failed, will retry on first operation");
        }

        info!(uri = %client.config.metastore_uri, "Hive Metastore catalog client initialized");
        Ok(client)
    }

    async fn ensure_connected(&self) -> Result<(), RegistrationError> {
        if self.connected.load(Ordering::Acquire) {
            return Ok(());
        }
        self.connect().await
    }

    async fn connect(&self) -> Result<(), RegistrationError> {
        let (host, port) = Self::parse_thrift_uri(&self.config.metastore_uri)?;

        debug!(host = %host, port = port, "Connecting to Hive Metastore");

        let address_str = format!("{}:{}", host, port);
        let socket_addr: std::net::SocketAddr = address_str.parse().map_err(|e| {
            RegistrationError::Connection(format!(
                "Failed to parse Hive Metastore address {}: {}",
                address_str, e
            ))
        })?;

        let thrift_client = ThriftHiveMetastoreClientBuilder::new("j2h-catalog")
            .address(socket_addr)
            .build();

        *self.client.write().await = Some(thrift_client);
        self.connected.store(true, Ordering::Release);

        info!(uri = %self.config.metastore_uri, "Connected to Hive Metastore");
        Ok(())
    }

    /// Parse a Thrift URI (thrift://host:port) into host and port.
    fn parse_thrift_uri(uri: &str) -> Result<(String, u16), RegistrationError> {
        let uri = uri.strip_prefix("thrift://").unwrap_or(uri);

        let parts: Vec<&str> = uri.split(':').collect();
        if parts.len() != 2 {
            return Err(RegistrationError::Connection(format!(
                "Invalid Hive Metastore URI format: {}. Expected thrift://host:port",
                uri
            )));
        }

        let host = parts[0].to_string();
        let port = parts[1].parse::<u16>().map_err(|_| {
            RegistrationError::Connection(format!(
                "Invalid port in Hive Metastore URI: {}",
                parts[1]
            ))
        })?;

        Ok((host, port))
    }

    fn mark_disconnected(&self) {
        self.connected.store(false, Ordering::Release);
    }

    /// Build the delimited-text storage descriptor for an external table.
    fn build_storage_descriptor(spec: &ExternalTableSpec) -> StorageDescriptor {
        let columns: Vec<FieldSchema> = spec
            .columns
            .iter()
            .map(|c| FieldSchema {
                name: Some(c.name.clone().into()),
                r#type: Some(c.hive_type.clone().into()),
                comment: None,
            })
            .collect();

        let mut serde_parameters = ahash::AHashMap::new();
        serde_parameters.insert(
            faststr::FastStr::from_static_str("field.delim"),
            faststr::FastStr::from(spec.field_delimiter.to_string()),
        );
        serde_parameters.insert(
            faststr::FastStr::from_static_str("serialization.format"),
            faststr::FastStr::from(spec.field_delimiter.to_string()),
        );

        StorageDescriptor {
            cols: Some(columns),
            location: Some(spec.location.clone().into()),
            input_format: Some(TEXT_INPUT_FORMAT.into()),
            output_format: Some(TEXT_OUTPUT_FORMAT.into()),
            serde_info: Some(SerDeInfo {
                name: None,
                serialization_lib: Some(LAZY_SIMPLE_SERDE.into()),
                parameters: Some(serde_parameters),
            }),
            compressed: Some(false),
            num_buckets: Some(-1),
            bucket_cols: None,
            sort_cols: None,
            parameters: None,
            skewed_info: None,
            stored_as_sub_directories: Some(false),
        }
    }
}

/// The metastore surfaces "not found" as a NoSuchObjectException somewhere
/// in the response or error payload.
fn is_missing(text: &str) -> bool {
    text.contains("NoSuchObjectException")
}

fn already_exists(text: &str) -> bool {
    text.contains("AlreadyExistsException")
}

#[async_trait]
impl CatalogClient for HiveMetastoreClient {
    async fn database_exists(&self, database: &str) -> Result<bool, RegistrationError> {
        self.ensure_connected().await?;

        let client_guard = self.client.read().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| RegistrationError::Connection("client not connected".into()))?;

        match client.get_database(database.to_string().into()).await {
            Ok(response) => Ok(!is_missing(&format!("{:?}", response))),
            Err(e) => {
                let text = e.to_string();
                if is_missing(&text) {
                    Ok(false)
                } else {
                    self.mark_disconnected();
                    Err(RegistrationError::Connection(format!(
                        "Failed to check Hive database: {}",
                        e
                    )))
                }
            }
        }
    }

    async fn create_database(&self, database: &str) -> Result<(), RegistrationError> {
        self.ensure_connected().await?;

        let client_guard = self.client.read().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| RegistrationError::Connection("client not connected".into()))?;

        let db = Database {
            name: Some(database.to_string().into()),
            description: Some("Database created by j2h".into()),
            location_uri: None,
            parameters: None,
            privileges: None,
            owner_name: None,
            owner_type: None,
            catalog_name: None,
        };

        match client.create_database(db).await {
            Ok(response) => {
                let text = format!("{:?}", response);
                if already_exists(&text) {
                    debug!(database = %database, "Hive database already exists");
                } else {
                    info!(database = %database, "Created Hive database");
                }
                Ok(())
            }
            Err(e) => {
                let text = e.to_string();
                if already_exists(&text) {
                    debug!(database = %database, "Hive database already exists");
                    Ok(())
                } else {
                    self.mark_disconnected();
                    Err(RegistrationError::Connection(format!(
                        "Failed to create Hive database: {}",
                        e
                    )))
                }
            }
        }
    }

    async fn table_exists(&self, database: &str, table: &str) -> Result<bool, RegistrationError> {
        self.ensure_connected().await?;

        let client_guard = self.client.read().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| RegistrationError::Connection("client not connected".into()))?;

        match client
            .get_table(database.to_string().into(), table.to_string().into())
            .await
        {
            Ok(response) => Ok(!is_missing(&format!("{:?}", response))),
            Err(e) => {
                let text = e.to_string();
                if is_missing(&text) {
                    Ok(false)
                } else {
                    self.mark_disconnected();
                    Err(RegistrationError::Connection(format!(
                        "Failed to check Hive table: {}",
                        e
                    )))
                }
            }
        }
    }

    async fn register_external_table(
        &self,
        spec: &ExternalTableSpec,
    ) -> Result<(), RegistrationError> {
        self.ensure_connected().await?;

        let client_guard = self.client.read().await;
        let client = client_guard
            .as_ref()
            .ok_or_else(|| RegistrationError::Connection("client not connected".into()))?;

        let storage_descriptor = Self::build_storage_descriptor(spec);

        let mut parameters = ahash::AHashMap::new();
        parameters.insert(
            faststr::FastStr::from_static_str("EXTERNAL"),
            faststr::FastStr::from_static_str("TRUE"),
        );

        let hive_table = Table {
            table_name: Some(spec.table.clone().into()),
            db_name: Some(spec.database.clone().into()),
            owner: None,
            create_time: Some(chrono::Utc::now().timestamp() as i32),
            last_access_time: Some(0),
            retention: Some(0),
            sd: Some(storage_descriptor),
            partition_keys: None,
            parameters: Some(parameters),
            view_original_text: None,
            view_expanded_text: None,
            table_type: Some("EXTERNAL_TABLE".into()),
            privileges: None,
            temporary: Some(false),
            rewrite_enabled: None,
            cat_name: None,
        };

        match client.create_table(hive_table).await {
            Ok(response) => {
                let text = format!("{:?}", response);
                if already_exists(&text) {
                    debug!(
                        database = %spec.database,
                        table = %spec.table,
                        "Table already registered"
                    );
                } else {
                    info!(
                        database = %spec.database,
                        table = %spec.table,
                        location = %spec.location,
                        "Registered external table"
                    );
                }
                Ok(())
            }
            Err(e) => {
                let text = e.to_string();
                if already_exists(&text) {
                    debug!(
                        database = %spec.database,
                        table = %spec.table,
                        "Table already registered"
                    );
                    Ok(())
                } else {
                    self.mark_disconnected();
                    Err(RegistrationError::Rejected(format!(
                        "Failed to register external table: {}",
                        e
                    )))
                }
            }
        }
    }

    async fn close(&self) -> Result<(), RegistrationError> {
        *self.client.write().await = None;
        self.mark_disconnected();
        info!("Hive Metastore catalog client closed");
        Ok(())
    }
}
