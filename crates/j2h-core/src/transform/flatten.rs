//! Single-level schema flattening.
//!
//! Rewrites every nested-record field `nc` into one sibling column per leaf
//! sub-field `c`, named `nc_c`. Values are copied verbatim, nulls included:
//! a row whose nested field is null produces one row with every derived
//! `nc_*` column null. Rows are never dropped or suppressed.
//!
//! Flattening is one pass deep. A sub-schema that itself contains records
//! yields `Record`-typed flattened columns.

use crate::dataset::{Dataset, FieldDescriptor, FieldType, Record, Schema, Value};
use crate::error::{Result, SchemaError};
use std::collections::HashSet;
use tracing::debug;

use super::inspect::partition_fields;

/// Flatten a dataset's nested-record fields into derived columns.
///
/// A dataset without nested fields passes through unchanged. Derived column
/// names that collide with an existing column or with each other are a
/// `SchemaError`.
pub fn flatten_dataset(dataset: &Dataset) -> Result<Dataset> {
    let partition = partition_fields(&dataset.schema);
    if partition.nested_fields.is_empty() {
        return Ok(dataset.clone());
    }

    let schema = flatten_schema(&dataset.schema)?;
    let records = dataset
        .records
        .iter()
        .map(|record| flatten_record(record, &dataset.schema))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        nested_fields = partition.nested_fields.len(),
        columns_before = dataset.schema.len(),
        columns_after = schema.len(),
        "Schema flattened"
    );

    Ok(Dataset::new(schema, records))
}

/// Rewrite a schema with one level of nesting removed.
///
/// Primitive fields pass through in original order, followed by the derived
/// fields: for each nested field in original order, its sub-fields in
/// sub-schema order.
pub fn flatten_schema(schema: &Schema) -> Result<Schema> {
    let mut fields = Vec::new();
    let mut names = HashSet::new();

    for field in schema.fields() {
        if !field.field_type.is_record() {
            names.insert(field.name.clone());
            fields.push(field.clone());
        }
    }

    for field in schema.fields() {
        if let FieldType::Record(sub) = &field.field_type {
            for sub_field in sub.fields() {
                let derived = derived_name(&field.name, &sub_field.name);
                if !names.insert(derived.clone()) {
                    return Err(SchemaError::NameCollision(derived).into());
                }
                fields.push(FieldDescriptor::new(derived, sub_field.field_type.clone()));
            }
        }
    }

    Schema::new(fields)
}

/// Flatten one record against its (pre-flatten) schema.
fn flatten_record(record: &Record, schema: &Schema) -> Result<Record> {
    let mut out = Record::new();

    for field in schema.fields() {
        if !field.field_type.is_record() {
            let value = record.get(&field.name).cloned().unwrap_or(Value::Null);
            out.insert(field.name.clone(), value);
        }
    }

    for field in schema.fields() {
        if let FieldType::Record(sub) = &field.field_type {
            match record.get(&field.name) {
                // Null nested value: every derived column is null, the row
                // itself survives
                None | Some(Value::Null) => {
                    for sub_field in sub.fields() {
                        out.insert(derived_name(&field.name, &sub_field.name), Value::Null);
                    }
                }
                Some(Value::Record(nested)) => {
                    for sub_field in sub.fields() {
                        let value = nested.get(&sub_field.name).cloned().unwrap_or(Value::Null);
                        out.insert(derived_name(&field.name, &sub_field.name), value);
                    }
                }
                Some(_) => {
                    return Err(SchemaError::TypeMismatch {
                        field: field.name.clone(),
                        expected: field.field_type.to_string(),
                    }
                    .into())
                }
            }
        }
    }

    Ok(out)
}

fn derived_name(parent: &str, child: &str) -> String {
    format!("{}_{}", parent, child)
}
