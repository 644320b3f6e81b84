//! NDJSON ingestion boundary.
//!
//! Reads newline-delimited JSON, infers a schema, and converts every record
//! into typed values checked against that schema. Inference rules:
//!
//! - Field order is first-seen order across the collection
//! - Field type comes from the values observed; conflicting kinds degrade
//!   to string
//! - JSON objects become nested record fields with recursively inferred
//!   sub-schemas
//! - A field that is null in every record is typed as string

use crate::error::{Result, SchemaError};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

use super::schema::{FieldDescriptor, FieldType, Schema};
use super::value::{Dataset, Record, Value};

/// Read a newline-delimited JSON file into a typed dataset.
pub fn read_path(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    let dataset = read_from(BufReader::new(file))?;
    debug!(
        path = %path.display(),
        rows = dataset.row_count(),
        fields = dataset.schema.len(),
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Read newline-delimited JSON from any reader into a typed dataset.
pub fn read_from<R: Read>(reader: R) -> Result<Dataset> {
    let mut objects = Vec::new();
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed: JsonValue =
            serde_json::from_str(&line).map_err(|e| SchemaError::MalformedRecord {
                line: idx + 1,
                message: e.to_string(),
            })?;
        match parsed {
            JsonValue::Object(map) => objects.push(map),
            other => {
                return Err(SchemaError::MalformedRecord {
                    line: idx + 1,
                    message: format!("expected a JSON object, got {}", kind_name(&other)),
                }
                .into())
            }
        }
    }

    let refs: Vec<&Map<String, JsonValue>> = objects.iter().collect();
    let schema = infer_schema(&refs)?;

    let mut records = Vec::with_capacity(objects.len());
    for map in &objects {
        records.push(convert_record(map, &schema)?);
    }

    Ok(Dataset::new(schema, records))
}

/// Kinds of JSON values observed for a field during inference.
#[derive(Default)]
struct FieldKinds {
    bool_seen: bool,
    number_seen: bool,
    string_seen: bool,
    object_seen: bool,
    other_seen: bool,
}

impl FieldKinds {
    fn observe(&mut self, value: &JsonValue) {
        match value {
            JsonValue::Null => {}
            JsonValue::Bool(_) => self.bool_seen = true,
            JsonValue::Number(_) => self.number_seen = true,
            JsonValue::String(_) => self.string_seen = true,
            JsonValue::Object(_) => self.object_seen = true,
            JsonValue::Array(_) => self.other_seen = true,
        }
    }

    fn only_objects(&self) -> bool {
        self.object_seen
            && !self.bool_seen
            && !self.number_seen
            && !self.string_seen
            && !self.other_seen
    }

    fn only_numbers(&self) -> bool {
        self.number_seen
            && !self.bool_seen
            && !self.string_seen
            && !self.object_seen
            && !self.other_seen
    }

    fn only_bools(&self) -> bool {
        self.bool_seen
            && !self.number_seen
            && !self.string_seen
            && !self.object_seen
            && !self.other_seen
    }
}

/// Infer an ordered schema from a batch of JSON objects.
fn infer_schema(objects: &[&Map<String, JsonValue>]) -> Result<Schema> {
    let mut order: Vec<String> = Vec::new();
    let mut kinds: HashMap<String, FieldKinds> = HashMap::new();

    for object in objects {
        for (name, value) in object.iter() {
            if !kinds.contains_key(name) {
                order.push(name.clone());
            }
            kinds.entry(name.clone()).or_default().observe(value);
        }
    }

    let mut fields = Vec::with_capacity(order.len());
    for name in order {
        let field_kinds = &kinds[&name];
        let field_type = if field_kinds.only_objects() {
            let sub_objects: Vec<&Map<String, JsonValue>> = objects
                .iter()
                .filter_map(|o| o.get(&name))
                .filter_map(|v| v.as_object())
                .collect();
            FieldType::Record(infer_schema(&sub_objects)?)
        } else if field_kinds.only_numbers() {
            FieldType::Double
        } else if field_kinds.only_bools() {
            FieldType::Boolean
        } else {
            // Mixed kinds or all-null degrade to string
            FieldType::String
        };
        fields.push(FieldDescriptor::new(name, field_type));
    }

    Schema::new(fields)
}

/// Convert a JSON object to a typed record conforming to `schema`.
fn convert_record(object: &Map<String, JsonValue>, schema: &Schema) -> Result<Record> {
    let mut record = Record::new();
    for field in schema.fields() {
        let value = match object.get(&field.name) {
            None | Some(JsonValue::Null) => Value::Null,
            Some(json) => convert_value(json, &field.field_type, &field.name)?,
        };
        record.insert(field.name.clone(), value);
    }
    Ok(record)
}

fn convert_value(json: &JsonValue, field_type: &FieldType, field: &str) -> Result<Value> {
    let value = match (field_type, json) {
        (FieldType::Double, JsonValue::Number(n)) => {
            Value::Number(n.as_f64().unwrap_or(f64::NAN))
        }
        (FieldType::Boolean, JsonValue::Bool(b)) => Value::Bool(*b),
        (FieldType::Record(sub), JsonValue::Object(map)) => {
            Value::Record(convert_record(map, sub)?)
        }
        // String fields absorb whatever the degrade rule sent their way
        (FieldType::String, JsonValue::String(s)) => Value::Str(s.clone()),
        (FieldType::String, JsonValue::Number(n)) => Value::Str(n.to_string()),
        (FieldType::String, JsonValue::Bool(b)) => Value::Str(b.to_string()),
        (FieldType::String, other) => Value::Str(other.to_string()),
        (expected, _) => {
            return Err(SchemaError::TypeMismatch {
                field: field.to_string(),
                expected: expected.to_string(),
            }
            .into())
        }
    };
    Ok(value)
}

fn kind_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(ndjson: &str) -> Dataset {
        read_from(ndjson.as_bytes()).unwrap()
    }

    #[test]
    fn test_infers_field_order_first_seen() {
        let ds = dataset(
            r#"{"business_id": "b1", "stars": 4.5}
{"business_id": "b2", "stars": 3.0, "city": "X"}"#,
        );
        assert_eq!(
            ds.schema.field_names(),
            vec!["business_id", "stars", "city"]
        );
    }

    #[test]
    fn test_infers_types() {
        let ds = dataset(r#"{"id": "a", "stars": 4.5, "open": true, "attributes": {"wifi": "free"}}"#);
        assert_eq!(
            ds.schema.field("stars").unwrap().field_type,
            FieldType::Double
        );
        assert_eq!(
            ds.schema.field("open").unwrap().field_type,
            FieldType::Boolean
        );
        assert!(ds.schema.field("attributes").unwrap().field_type.is_record());
    }

    #[test]
    fn test_mixed_kinds_degrade_to_string() {
        let ds = dataset(
            r#"{"stars": 4.5}
{"stars": "5.0"}"#,
        );
        assert_eq!(
            ds.schema.field("stars").unwrap().field_type,
            FieldType::String
        );
        // Numbers under a string field are rendered, not dropped
        assert_eq!(
            ds.records[0].get("stars"),
            Some(&Value::Str("4.5".to_string()))
        );
    }

    #[test]
    fn test_all_null_field_is_string() {
        let ds = dataset(
            r#"{"id": "a", "note": null}
{"id": "b", "note": null}"#,
        );
        assert_eq!(
            ds.schema.field("note").unwrap().field_type,
            FieldType::String
        );
        assert!(ds.records[0].get("note").unwrap().is_null());
    }

    #[test]
    fn test_missing_field_reads_as_null() {
        let ds = dataset(
            r#"{"id": "a", "city": "X"}
{"id": "b"}"#,
        );
        assert!(ds.records[1].get("city").unwrap().is_null());
    }

    #[test]
    fn test_nested_null_preserved() {
        let ds = dataset(
            r#"{"id": "a", "attributes": {"wifi": "free", "parking": null}}
{"id": "b", "attributes": null}"#,
        );
        assert!(ds.records[1].get("attributes").unwrap().is_null());
        match ds.records[0].get("attributes").unwrap() {
            Value::Record(r) => {
                assert_eq!(r.get("wifi"), Some(&Value::Str("free".to_string())));
                assert!(r.get("parking").unwrap().is_null());
            }
            other => panic!("expected nested record, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_line_is_rejected() {
        let err = read_from("[1, 2, 3]".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_bad_json_names_line() {
        let err = read_from("{\"a\": 1}\nnot json".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let ds = dataset("{\"a\": 1}\n\n{\"a\": 2}\n");
        assert_eq!(ds.row_count(), 2);
    }
}
