//! Schemaless documents backed by a JSON object.
//!
//! The id lives in the `_id` field and must be a string. Updates are
//! top-level field overwrites; writing a new string `_id` renames the
//! document. A change set whose `_id` is not a string is dropped whole.

use crate::document::Document;
use crate::error::{DocStateError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Name of the identity field.
pub const ID_FIELD: &str = "_id";

/// A document made of arbitrary JSON fields plus a string `_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonDocument {
    id: String,
    fields: Map<String, Value>,
}

impl JsonDocument {
    /// Build a document from a JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Self::from_map(fields),
            other => Err(DocStateError::NotAnObject(json_kind(&other).to_string())),
        }
    }

    /// Build a document from a JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Result<Self> {
        let id = match fields.get(ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(other) => return Err(DocStateError::InvalidIdField(json_kind(other).to_string())),
            None => return Err(DocStateError::MissingId),
        };
        Ok(Self { id, fields })
    }

    /// Create a document with only an id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut fields = Map::new();
        fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        Self { id, fields }
    }

    /// Builder-style field setter. Setting `_id` to a string renames.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set a field value. A non-string `_id` is ignored.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        if field == ID_FIELD {
            match &value {
                Value::String(id) => self.id = id.clone(),
                _ => return,
            }
        }
        self.fields.insert(field, value);
    }

    /// All fields, including `_id`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl Document for JsonDocument {
    type Id = String;
    type Changes = Map<String, Value>;

    fn id(&self) -> &String {
        &self.id
    }

    /// Overwrite top-level fields. Nothing is applied when `_id` is present
    /// but not a string.
    fn apply_changes(&mut self, changes: &Map<String, Value>) {
        if matches!(changes.get(ID_FIELD), Some(id) if !id.is_string()) {
            return;
        }
        for (field, value) in changes {
            self.set(field.clone(), value.clone());
        }
    }
}

impl Serialize for JsonDocument {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonDocument {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::deserialize(deserializer)?;
        Self::from_map(fields).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for JsonDocument {
    type Error = DocStateError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value() {
        let doc = JsonDocument::from_value(json!({"_id": "1", "v": "a"})).unwrap();
        assert_eq!(doc.key(), "1");
        assert_eq!(doc.get("v"), Some(&json!("a")));
    }

    #[test]
    fn test_from_value_errors() {
        assert_eq!(
            JsonDocument::from_value(json!([1, 2])),
            Err(DocStateError::NotAnObject("array".into()))
        );
        assert_eq!(
            JsonDocument::from_value(json!({"v": 1})),
            Err(DocStateError::MissingId)
        );
        assert_eq!(
            JsonDocument::from_value(json!({"_id": 5})),
            Err(DocStateError::InvalidIdField("number".into()))
        );
    }

    #[test]
    fn test_apply_changes_is_shallow() {
        let mut doc = JsonDocument::with_id("1")
            .with("v", "a")
            .with("nested", json!({"x": 1, "y": 2}));

        let mut changes = Map::new();
        changes.insert("nested".into(), json!({"x": 5}));
        doc.apply_changes(&changes);

        // Nested objects are replaced, not merged.
        assert_eq!(doc.get("nested"), Some(&json!({"x": 5})));
        assert_eq!(doc.get("v"), Some(&json!("a")));
    }

    #[test]
    fn test_apply_changes_renames() {
        let mut doc = JsonDocument::with_id("1").with("v", "a");

        let mut changes = Map::new();
        changes.insert(ID_FIELD.into(), json!("9"));
        doc.apply_changes(&changes);

        assert_eq!(doc.key(), "9");
        assert_eq!(doc.into_value(), json!({"_id": "9", "v": "a"}));
    }

    #[test]
    fn test_non_string_id_change_is_ignored() {
        let mut doc = JsonDocument::with_id("1");
        doc.set(ID_FIELD, 42);
        assert_eq!(doc.key(), "1");
        assert_eq!(doc.get(ID_FIELD), Some(&json!("1")));
    }

    #[test]
    fn test_changes_with_non_string_id_are_dropped() {
        let mut doc = JsonDocument::with_id("1").with("v", "a");

        let mut changes = Map::new();
        changes.insert("v".into(), json!("b"));
        changes.insert(ID_FIELD.into(), json!(null));
        doc.apply_changes(&changes);

        assert_eq!(doc.into_value(), json!({"_id": "1", "v": "a"}));
    }

    #[test]
    fn test_serde_round_trip_validates_id() {
        let doc = JsonDocument::with_id("a").with("n", 1);
        let json = serde_json::to_string(&doc).unwrap();
        let back: JsonDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);

        assert!(serde_json::from_str::<JsonDocument>(r#"{"n": 1}"#).is_err());
    }
}
