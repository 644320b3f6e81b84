//! Error types for the j2h core library.
//!
//! Uses hierarchical domain-specific errors following the thiserror pattern.
//! The propagation policy is encoded in the types: schema and write errors
//! abort the affected dataset, registration errors are advisory and are
//! surfaced to the caller as outcomes rather than raised past the pipeline.

use thiserror::Error;

/// Result type alias for j2h operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for j2h.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema-related error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Output write error
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// Catalog registration error
    #[error("Registration error: {0}")]
    Registration(#[from] RegistrationError),

    /// Rule set error
    #[error("Rule error: {0}")]
    Rule(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Schema-specific errors. Fatal for the affected dataset.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Duplicate field name at a single nesting level
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// Flattening produced a column name that already exists
    #[error("Flattened column name collision: {0}")]
    NameCollision(String),

    /// A record value does not match its declared field type
    #[error("Type mismatch for field {field}: expected {expected}")]
    TypeMismatch { field: String, expected: String },

    /// Input line could not be parsed as a JSON object
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },
}

/// Output write errors. Fatal for the affected dataset, no retry.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Destination directory could not be created or written
    #[error("Destination unusable: {path}: {message}")]
    Destination { path: String, message: String },

    /// Serializing a row failed
    #[error("Row serialization failed: {0}")]
    Serialization(String),
}

/// Catalog registration errors. Non-fatal, advisory.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Metastore connection failed
    #[error("Metastore connection failed: {0}")]
    Connection(String),

    /// DDL execution was rejected by the metastore
    #[error("Registration rejected: {0}")]
    Rejected(String),

    /// Invalid registration target
    #[error("Invalid table spec: {0}")]
    InvalidSpec(String),
}

impl Error {
    /// Short classification of the error, used in structured outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Schema(_) => "schema",
            Error::Write(_) => "write",
            Error::Registration(_) => "registration",
            Error::Rule(_) => "rule",
            Error::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Schema(SchemaError::MalformedRecord {
            line: 0,
            message: err.to_string(),
        })
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("missing datasets".into());
        assert_eq!(err.to_string(), "Configuration error: missing datasets");

        let schema_err = SchemaError::NameCollision("attributes_wifi".into());
        let err: Error = schema_err.into();
        assert!(err.to_string().contains("collision"));
    }

    #[test]
    fn test_registration_error() {
        let err = RegistrationError::Connection("thrift://localhost:9083 refused".into());
        assert!(err.to_string().contains("Metastore connection failed"));
    }

    #[test]
    fn test_write_error() {
        let err = WriteError::Destination {
            path: "/no/such/dir".into(),
            message: "permission denied".into(),
        };
        assert!(err.to_string().contains("/no/such/dir"));
    }
}
