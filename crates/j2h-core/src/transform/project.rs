//! Column projection: keep-set restriction with renames.

use crate::dataset::{Dataset, FieldDescriptor, Record, Schema, Value};
use crate::error::Result;
use std::collections::HashMap;
use tracing::debug;

/// Restrict a dataset to a keep-set of columns, renaming retained columns
/// per the rename map.
///
/// Columns outside the keep-set are dropped. Keep-set entries absent from
/// the schema are silently ignored; projection only drops, it never invents
/// columns. Renames apply only to retained columns.
pub fn project_dataset(
    dataset: &Dataset,
    keep: &[String],
    rename: &HashMap<String, String>,
) -> Result<Dataset> {
    let mut fields = Vec::new();
    for field in dataset.schema.fields() {
        if !keep.iter().any(|k| k == &field.name) {
            continue;
        }
        let name = rename
            .get(&field.name)
            .cloned()
            .unwrap_or_else(|| field.name.clone());
        fields.push(FieldDescriptor::new(name, field.field_type.clone()));
    }
    let schema = Schema::new(fields)?;

    let records = dataset
        .records
        .iter()
        .map(|record| {
            let mut out = Record::new();
            for field in dataset.schema.fields() {
                if !keep.iter().any(|k| k == &field.name) {
                    continue;
                }
                let name = rename
                    .get(&field.name)
                    .cloned()
                    .unwrap_or_else(|| field.name.clone());
                let value = record.get(&field.name).cloned().unwrap_or(Value::Null);
                out.insert(name, value);
            }
            out
        })
        .collect();

    debug!(
        columns_before = dataset.schema.len(),
        columns_after = schema.len(),
        "Columns projected"
    );

    Ok(Dataset::new(schema, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FieldType;

    fn dataset() -> Dataset {
        let schema = Schema::new(vec![
            FieldDescriptor::new("business_id", FieldType::String),
            FieldDescriptor::new("name", FieldType::String),
            FieldDescriptor::new("stars", FieldType::Double),
            FieldDescriptor::new("city", FieldType::String),
        ])
        .unwrap();

        let mut record = Record::new();
        record.insert("business_id", Value::Str("b1".into()));
        record.insert("name", Value::Str("Cafe".into()));
        record.insert("stars", Value::Number(4.0));
        record.insert("city", Value::Str("X".into()));

        Dataset::new(schema, vec![record])
    }

    fn keep(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_projection_drops_and_renames() {
        let rename = HashMap::from([("name".to_string(), "business_name".to_string())]);
        let projected =
            project_dataset(&dataset(), &keep(&["business_id", "name", "stars"]), &rename).unwrap();

        assert_eq!(
            projected.schema.field_names(),
            vec!["business_id", "business_name", "stars"]
        );
        let row = &projected.records[0];
        assert_eq!(row.get("business_name"), Some(&Value::Str("Cafe".into())));
        assert_eq!(row.get("stars"), Some(&Value::Number(4.0)));
        assert!(row.get("city").is_none());
    }

    #[test]
    fn test_unknown_keep_entry_silently_ignored() {
        let projected = project_dataset(
            &dataset(),
            &keep(&["business_id", "no_such_column"]),
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(projected.schema.field_names(), vec!["business_id"]);
    }

    #[test]
    fn test_rename_of_dropped_column_has_no_effect() {
        let rename = HashMap::from([("city".to_string(), "town".to_string())]);
        let projected = project_dataset(&dataset(), &keep(&["business_id"]), &rename).unwrap();
        assert_eq!(projected.schema.field_names(), vec!["business_id"]);
    }

    #[test]
    fn test_empty_keep_set_yields_empty_schema() {
        let projected = project_dataset(&dataset(), &[], &HashMap::new()).unwrap();
        assert!(projected.schema.is_empty());
        assert_eq!(projected.row_count(), 1);
    }
}
