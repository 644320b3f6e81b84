//! Schema inspection: partition fields into primitive and nested-record.

use crate::dataset::Schema;

/// The two disjoint, order-preserving halves of a schema's field list.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPartition {
    /// Names of primitive fields, in schema order
    pub flat_fields: Vec<String>,
    /// Names of nested-record fields, in schema order
    pub nested_fields: Vec<String>,
}

/// Partition a schema's fields by type tag.
///
/// Every field lands in exactly one list; order within each list follows
/// the schema.
pub fn partition_fields(schema: &Schema) -> FieldPartition {
    let mut flat_fields = Vec::new();
    let mut nested_fields = Vec::new();
    for field in schema.fields() {
        if field.field_type.is_record() {
            nested_fields.push(field.name.clone());
        } else {
            flat_fields.push(field.name.clone());
        }
    }
    FieldPartition {
        flat_fields,
        nested_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{FieldDescriptor, FieldType};

    fn business_schema() -> Schema {
        let attributes = Schema::new(vec![
            FieldDescriptor::new("wifi", FieldType::String),
            FieldDescriptor::new("parking", FieldType::String),
        ])
        .unwrap();
        Schema::new(vec![
            FieldDescriptor::new("business_id", FieldType::String),
            FieldDescriptor::new("attributes", FieldType::Record(attributes)),
            FieldDescriptor::new("stars", FieldType::Double),
        ])
        .unwrap()
    }

    #[test]
    fn test_partition_is_disjoint_and_total() {
        let schema = business_schema();
        let partition = partition_fields(&schema);

        assert_eq!(partition.flat_fields, vec!["business_id", "stars"]);
        assert_eq!(partition.nested_fields, vec!["attributes"]);
        assert_eq!(
            partition.flat_fields.len() + partition.nested_fields.len(),
            schema.len()
        );
        for name in &partition.flat_fields {
            assert!(!partition.nested_fields.contains(name));
        }
    }

    #[test]
    fn test_partition_empty_schema() {
        let partition = partition_fields(&Schema::default());
        assert!(partition.flat_fields.is_empty());
        assert!(partition.nested_fields.is_empty());
    }

    #[test]
    fn test_partition_all_flat() {
        let schema = Schema::new(vec![
            FieldDescriptor::new("a", FieldType::String),
            FieldDescriptor::new("b", FieldType::Boolean),
        ])
        .unwrap();
        let partition = partition_fields(&schema);
        assert_eq!(partition.flat_fields, vec!["a", "b"]);
        assert!(partition.nested_fields.is_empty());
    }
}
