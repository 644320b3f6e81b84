//! Integration tests for j2h-core.
//!
//! These run the pipeline end-to-end against NDJSON fixtures in temporary
//! directories. Registration is exercised through an in-process mock
//! catalog client; tests against a live Hive Metastore would require
//! Docker and are out of scope here.

use async_trait::async_trait;
use j2h_core::catalog::{CatalogClient, CatalogRegistrar, ExternalTableSpec};
use j2h_core::config::{
    Config, DatasetDescriptor, LabelConfig, OutputConfig, RegisterConfig, TransformConfig,
};
use j2h_core::engine::{DatasetStatus, Pipeline, RegistrationOutcome};
use j2h_core::error::RegistrationError;
use j2h_core::transform::Comparison;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const BUSINESS_NDJSON: &str = r#"{"business_id": "b1", "name": "Cafe", "stars": "5.0", "attributes": {"wifi": null}}
{"business_id": "b2", "name": "Diner", "stars": "3.5", "attributes": {"wifi": "free"}}
{"business_id": "b3", "name": "Bar", "stars": "2.0", "attributes": null}
"#;

fn business_descriptor(source: &Path) -> DatasetDescriptor {
    DatasetDescriptor {
        name: "business".into(),
        source: source.to_path_buf(),
        transform: Some(TransformConfig {
            keep: vec!["business_id".into(), "name".into(), "stars".into()],
            rename: HashMap::from([("name".to_string(), "business_name".to_string())]),
            label: Some(LabelConfig {
                field: "stars".into(),
                output: "conclusion".into(),
                comparison: Comparison::Numeric,
            }),
            register: None,
        }),
    }
}

fn write_fixture(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn base_config(out: &Path, datasets: Vec<DatasetDescriptor>) -> Config {
    Config {
        datasets,
        output: OutputConfig {
            flat_dir: out.join("converted"),
            transformed_dir: out.join("transformed"),
            ..OutputConfig::default()
        },
        catalog: None,
        monitoring: Default::default(),
    }
}

mod end_to_end {
    use super::*;

    #[tokio::test]
    async fn test_flatten_project_classify_round() {
        let dir = TempDir::new().unwrap();
        let source = write_fixture(dir.path(), "business.json", BUSINESS_NDJSON);

        let config = base_config(dir.path(), vec![business_descriptor(&source)]);
        let pipeline = Pipeline::with_registrar(config, None).unwrap();
        let outcomes = pipeline.run().await;

        assert_eq!(outcomes.len(), 1);
        match &outcomes[0].status {
            DatasetStatus::Completed {
                flat_rows,
                transformed_rows,
            } => {
                assert_eq!(*flat_rows, 3);
                assert_eq!(*transformed_rows, Some(3));
            }
            other => panic!("expected completion, got {:?}", other),
        }

        // Flat output flattens attributes without dropping the null row
        let flat = std::fs::read_to_string(
            dir.path().join("converted/df_business/part-00000.csv"),
        )
        .unwrap();
        let mut lines = flat.lines();
        assert_eq!(
            lines.next(),
            Some("business_id,name,stars,attributes_wifi")
        );
        assert_eq!(lines.next(), Some("b1,Cafe,5.0,"));
        assert_eq!(lines.next(), Some("b2,Diner,3.5,free"));
        assert_eq!(lines.next(), Some("b3,Bar,2.0,"));

        // Transformed output carries exactly the projected + derived columns
        let transformed = std::fs::read_to_string(
            dir.path().join("transformed/df_business/part-00000.csv"),
        )
        .unwrap();
        let mut lines = transformed.lines();
        assert_eq!(
            lines.next(),
            Some("business_id,business_name,stars,conclusion")
        );
        assert_eq!(lines.next(), Some("b1,Cafe,5.0,very recommend"));
        assert_eq!(lines.next(), Some("b2,Diner,3.5,average"));
        assert_eq!(lines.next(), Some("b3,Bar,2.0,not recommend"));
    }

    #[tokio::test]
    async fn test_failing_dataset_does_not_halt_siblings() {
        let dir = TempDir::new().unwrap();
        let good = write_fixture(dir.path(), "review.json", "{\"review_id\": \"r1\"}\n");

        let mut datasets = vec![business_descriptor(Path::new("missing/business.json"))];
        datasets.push(DatasetDescriptor {
            name: "review".into(),
            source: good,
            transform: None,
        });

        let config = base_config(dir.path(), datasets);
        let pipeline = Pipeline::with_registrar(config, None).unwrap();
        let outcomes = pipeline.run().await;

        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[0].status.is_completed());
        assert!(outcomes[1].status.is_completed());
    }

    #[tokio::test]
    async fn test_flat_only_dataset_skips_transform_stage() {
        let dir = TempDir::new().unwrap();
        let source = write_fixture(dir.path(), "tip.json", "{\"user_id\": \"u1\", \"text\": \"ok\"}\n");

        let config = base_config(
            dir.path(),
            vec![DatasetDescriptor {
                name: "tip".into(),
                source,
                transform: None,
            }],
        );
        let pipeline = Pipeline::with_registrar(config, None).unwrap();
        let outcomes = pipeline.run().await;

        assert!(outcomes[0].status.is_completed());
        assert!(dir.path().join("converted/df_tip/part-00000.csv").exists());
        assert!(!dir.path().join("transformed/df_tip").exists());
    }
}

mod registration {
    use super::*;

    /// Mock catalog client: counts calls, optionally fails registration.
    struct MockCatalog {
        fail: bool,
        registered: AtomicUsize,
        last_ddl: std::sync::Mutex<Option<String>>,
    }

    impl MockCatalog {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                registered: AtomicUsize::new(0),
                last_ddl: std::sync::Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CatalogClient for MockCatalog {
        async fn database_exists(&self, _database: &str) -> Result<bool, RegistrationError> {
            Ok(true)
        }

        async fn create_database(&self, _database: &str) -> Result<(), RegistrationError> {
            Ok(())
        }

        async fn table_exists(
            &self,
            _database: &str,
            _table: &str,
        ) -> Result<bool, RegistrationError> {
            Ok(false)
        }

        async fn register_external_table(
            &self,
            spec: &ExternalTableSpec,
        ) -> Result<(), RegistrationError> {
            if self.fail {
                return Err(RegistrationError::Connection("metastore unreachable".into()));
            }
            self.registered.fetch_add(1, Ordering::SeqCst);
            *self.last_ddl.lock().unwrap() = Some(spec.to_ddl());
            Ok(())
        }

        async fn close(&self) -> Result<(), RegistrationError> {
            Ok(())
        }
    }

    fn registering_config(dir: &Path, source: &Path) -> Config {
        let mut descriptor = business_descriptor(source);
        descriptor.transform.as_mut().unwrap().register = Some(RegisterConfig {
            table: "trix__df_business".into(),
            location: Some("oss://ack-bucket/datasets/yelp/transformed_dataset/df_business/".into()),
        });
        let mut config = base_config(dir, vec![descriptor]);
        config.catalog = Some(j2h_core::config::CatalogConfig {
            metastore_uri: "thrift://localhost:9083".into(),
            database: "default".into(),
            username: None,
            password: None,
            request_timeout_seconds: 30,
        });
        config
    }

    #[tokio::test]
    async fn test_successful_registration_records_table() {
        let dir = TempDir::new().unwrap();
        let source = write_fixture(dir.path(), "business.json", BUSINESS_NDJSON);

        let mock = Arc::new(MockCatalog::new(false));
        let registrar = CatalogRegistrar::new(mock.clone());
        let pipeline =
            Pipeline::with_registrar(registering_config(dir.path(), &source), Some(registrar))
                .unwrap();
        let outcomes = pipeline.run().await;

        assert!(outcomes[0].status.is_completed());
        match outcomes[0].registration.as_ref().unwrap() {
            RegistrationOutcome::Registered { table } => {
                assert_eq!(table, "default.trix__df_business");
            }
            other => panic!("expected registration, got {:?}", other),
        }
        assert_eq!(mock.registered.load(Ordering::SeqCst), 1);

        // The issued spec carries the projected schema and location
        let ddl = mock.last_ddl.lock().unwrap().clone().unwrap();
        assert!(ddl.contains("business_name string"));
        assert!(ddl.contains("conclusion string"));
        assert!(ddl.contains("LOCATION 'oss://ack-bucket/"));
    }

    #[tokio::test]
    async fn test_registration_failure_does_not_fail_dataset() {
        let dir = TempDir::new().unwrap();
        let source = write_fixture(dir.path(), "business.json", BUSINESS_NDJSON);

        let registrar = CatalogRegistrar::new(Arc::new(MockCatalog::new(true)));
        let pipeline =
            Pipeline::with_registrar(registering_config(dir.path(), &source), Some(registrar))
                .unwrap();
        let outcomes = pipeline.run().await;

        // The dataset run succeeded; the failure is an advisory outcome
        assert!(outcomes[0].status.is_completed());
        match outcomes[0].registration.as_ref().unwrap() {
            RegistrationOutcome::Failed { table, message } => {
                assert_eq!(table, "default.trix__df_business");
                assert!(message.contains("unreachable"));
            }
            other => panic!("expected failed registration, got {:?}", other),
        }

        // The transformed CSV was still written
        assert!(dir
            .path()
            .join("transformed/df_business/part-00000.csv")
            .exists());
    }
}
