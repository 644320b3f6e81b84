//! Typed record values.
//!
//! A `Value` is either a primitive scalar, null, or a nested record. Records
//! are checked against their schema at the ingestion boundary; downstream
//! transforms can rely on conformance.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::schema::Schema;

/// A single field value within a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or explicit null
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar
    Number(f64),
    /// String scalar
    Str(String),
    /// Nested record
    Record(Record),
}

impl Value {
    /// Whether this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it has one.
    ///
    /// Strings are parsed; booleans and records have no numeric view.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Render the value as delimited-text cell content.
    ///
    /// Nulls render as the given token; nested records render as JSON text.
    pub fn render(&self, null_token: &str) -> String {
        match self {
            Value::Null => null_token.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => render_number(*n),
            Value::Str(s) => s.clone(),
            Value::Record(r) => r.render_json(),
        }
    }
}

/// Render a float without the noise of `Debug` formatting.
fn render_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.1}", n)
    } else {
        n.to_string()
    }
}

/// A mapping from field name to value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, replacing any existing one.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Get a field value. Missing fields read as absent, not null.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no populated fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render as a JSON object text, field order unspecified.
    ///
    /// Used only for residual nested columns the single-level flatten
    /// does not unfold.
    fn render_json(&self) -> String {
        let mut out = String::from("{");
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{:?}:", name);
            match &self.values[name.as_str()] {
                Value::Null => out.push_str("null"),
                Value::Bool(b) => {
                    let _ = write!(out, "{}", b);
                }
                Value::Number(n) => {
                    let _ = write!(out, "{}", n);
                }
                Value::Str(s) => {
                    let _ = write!(out, "{:?}", s);
                }
                Value::Record(r) => out.push_str(&r.render_json()),
            }
        }
        out.push('}');
        out
    }
}

/// A schema together with the records that conform to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Schema all records conform to
    pub schema: Schema,
    /// Record collection
    pub records: Vec<Record>,
}

impl Dataset {
    /// Create a dataset from a schema and conforming records.
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// The first `n` records, for previewing.
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..self.records.len().min(n)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_number_parses_strings() {
        assert_eq!(Value::Str("4.5".into()).as_number(), Some(4.5));
        assert_eq!(Value::Str(" 5.0 ".into()).as_number(), Some(5.0));
        assert_eq!(Value::Str("free".into()).as_number(), None);
        assert_eq!(Value::Number(3.0).as_number(), Some(3.0));
        assert_eq!(Value::Null.as_number(), None);
        assert_eq!(Value::Bool(true).as_number(), None);
    }

    #[test]
    fn test_render_null_uses_token() {
        assert_eq!(Value::Null.render(""), "");
        assert_eq!(Value::Null.render("NULL"), "NULL");
    }

    #[test]
    fn test_render_number_keeps_decimal_point() {
        assert_eq!(Value::Number(5.0).render(""), "5.0");
        assert_eq!(Value::Number(4.5).render(""), "4.5");
        assert_eq!(Value::Number(-2.0).render(""), "-2.0");
    }

    #[test]
    fn test_record_get_missing_is_none() {
        let record = Record::new();
        assert!(record.get("stars").is_none());
    }

    #[test]
    fn test_dataset_head() {
        let schema = Schema::default();
        let records = vec![Record::new(), Record::new(), Record::new()];
        let dataset = Dataset::new(schema, records);
        assert_eq!(dataset.head(2).len(), 2);
        assert_eq!(dataset.head(10).len(), 3);
    }
}
