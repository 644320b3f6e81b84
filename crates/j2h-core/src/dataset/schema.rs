//! Schema model: ordered field descriptors with primitive or nested types.

use crate::error::{Result, SchemaError};
use std::collections::HashSet;
use std::fmt;

/// Type tag for a schema field.
///
/// `Record` carries its own sub-schema; everything else is primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit float
    Double,
    /// Boolean
    Boolean,
    /// Nested record with its own sub-schema
    Record(Schema),
}

impl FieldType {
    /// Whether this field is a nested record.
    pub fn is_record(&self) -> bool {
        matches!(self, FieldType::Record(_))
    }

    /// Hive column type string for external table registration.
    pub fn to_hive_type(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            // Residual nested columns serialize as JSON text
            FieldType::Record(_) => "string",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Double => write!(f, "double"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Record(schema) => {
                write!(f, "record<")?;
                for (i, field) in schema.fields().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.field_type)?;
                }
                write!(f, ">")
            }
        }
    }
}

/// A named, typed schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Field name, unique within its nesting level
    pub name: String,
    /// Field type tag
    pub field_type: FieldType,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// An ordered sequence of field descriptors.
///
/// Field names are unique at a single nesting level; the constructor
/// rejects duplicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Build a schema, enforcing the unique-name invariant.
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()).into());
            }
        }
        Ok(Self { fields })
    }

    /// The ordered field descriptors.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Ordered field names.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a field with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}
