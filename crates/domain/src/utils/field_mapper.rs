//! Source-column to Marketo field mapping
//!
//! Records exported from the source database use their own column names;
//! the REST API expects Marketo field API names. The store-generated `_id`
//! column has no counterpart and is dropped.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::errors::{MktoError, Result};
use crate::types::Record;

/// Column that is never forwarded
pub const SOURCE_ID_FIELD: &str = "_id";

const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    ("First_Name", "firstName"),
    ("Last_Name", "lastName"),
    ("Email", "email"),
    ("Office_Phone", "phone"),
    ("Cell_Phone", "mobilePhone"),
    ("Company", "company"),
    ("Address", "address"),
    ("City", "city"),
    ("Zip", "postalCode"),
    ("Num_Products", "numProductsOwned"),
    ("Custom_Field", "customField"),
];

/// Static rename table from source columns to API field names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    mappings: HashMap<String, String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_MAPPINGS.iter().copied())
    }
}

impl FieldMapping {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mappings = pairs.into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Self { mappings }
    }

    /// API name for a single source column
    ///
    /// # Errors
    /// Returns `MktoError::InvalidInput` for a column with no mapping.
    pub fn map_field(&self, field: &str) -> Result<&str> {
        self.mappings
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| MktoError::InvalidInput(format!("No mapping for field '{field}'")))
    }

    /// Rename every key of a record, dropping `_id`.
    ///
    /// # Errors
    /// Returns `MktoError::InvalidInput` if the record is not a JSON object
    /// or contains an unmapped column.
    pub fn map_record(&self, record: Record) -> Result<Record> {
        let Value::Object(fields) = record else {
            return Err(MktoError::InvalidInput(format!(
                "Expected a JSON object, got {}",
                kind_of(&record)
            )));
        };

        let mut mapped = Map::with_capacity(fields.len());
        for (key, value) in fields {
            if key == SOURCE_ID_FIELD {
                continue;
            }
            mapped.insert(self.map_field(&key)?.to_string(), value);
        }
        Ok(Value::Object(mapped))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn maps_known_columns_and_drops_source_id() {
        let mapping = FieldMapping::default();
        let mapped = mapping
            .map_record(json!({
                "_id": {"$oid": "5f1"},
                "First_Name": "Ada",
                "Email": "ada@example.com",
                "Zip": "94105"
            }))
            .unwrap();

        assert_eq!(
            mapped,
            json!({"firstName": "Ada", "email": "ada@example.com", "postalCode": "94105"})
        );
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = FieldMapping::default().map_record(json!({"Fax": "555"})).unwrap_err();
        assert!(matches!(err, MktoError::InvalidInput(msg) if msg.contains("Fax")));
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = FieldMapping::default().map_record(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn custom_table() {
        let mapping = FieldMapping::from_pairs([("mail", "email")]);
        assert_eq!(mapping.map_field("mail").unwrap(), "email");
        assert!(mapping.map_field("Email").is_err());
    }
}
