//! Firestore REST wire types and the serde_json bridge.
//!
//! Model types in this workspace serialize through serde_json; this module
//! converts between `serde_json::Value` and the Firestore typed-value
//! encoding so repositories never hand-map individual fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Firestore document value types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    NullValue(()),
    BooleanValue(bool),
    // Firestore sends integers as strings
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(String),
    StringValue(String),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrayValue {
    pub values: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapValue {
    pub fields: Option<HashMap<String, Value>>,
}

/// Firestore document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name
    pub name: Option<String>,
    /// Document fields
    pub fields: Option<HashMap<String, Value>>,
    /// Create time
    pub create_time: Option<String>,
    /// Update time
    pub update_time: Option<String>,
}

impl Document {
    /// Create a new document with the given fields.
    pub fn new(fields: HashMap<String, Value>) -> Self {
        Self {
            name: None,
            fields: Some(fields),
            create_time: None,
            update_time: None,
        }
    }

    /// Document ID, the last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref().and_then(|n| n.rsplit('/').next())
    }

    /// Convert this document's fields back into a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        match &self.fields {
            Some(fields) => fields_to_json(fields),
            None => serde_json::Value::Object(Default::default()),
        }
    }
}

/// Convert a JSON object into Firestore document fields.
///
/// Non-object roots are rejected by callers; every model persisted through
/// this crate serializes to a JSON object.
pub fn json_to_fields(json: &serde_json::Value) -> HashMap<String, Value> {
    match json {
        serde_json::Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), json_to_value(v)))
            .collect(),
        _ => HashMap::new(),
    }
}

fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::NullValue(()),
        serde_json::Value::Bool(b) => Value::BooleanValue(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::IntegerValue(i.to_string())
            } else {
                Value::DoubleValue(n.as_f64().unwrap_or(0.0))
            }
        }
        serde_json::Value::String(s) => Value::StringValue(s.clone()),
        serde_json::Value::Array(items) => Value::ArrayValue(ArrayValue {
            values: Some(items.iter().map(json_to_value).collect()),
        }),
        serde_json::Value::Object(map) => Value::MapValue(MapValue {
            fields: Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), json_to_value(v)))
                    .collect(),
            ),
        }),
    }
}

/// Convert Firestore document fields into a JSON object.
pub fn fields_to_json(fields: &HashMap<String, Value>) -> serde_json::Value {
    let map = fields
        .iter()
        .map(|(k, v)| (k.clone(), value_to_json(v)))
        .collect();
    serde_json::Value::Object(map)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::NullValue(()) => serde_json::Value::Null,
        Value::BooleanValue(b) => serde_json::Value::Bool(*b),
        Value::IntegerValue(s) => s
            .parse::<i64>()
            .map(|i| serde_json::Value::Number(i.into()))
            .unwrap_or(serde_json::Value::Null),
        Value::DoubleValue(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::TimestampValue(s) | Value::StringValue(s) => {
            serde_json::Value::String(s.clone())
        }
        Value::ArrayValue(arr) => serde_json::Value::Array(
            arr.values
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(value_to_json)
                .collect(),
        ),
        Value::MapValue(map) => match &map.fields {
            Some(fields) => fields_to_json(fields),
            None => serde_json::Value::Object(Default::default()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roundtrip_nested_object() {
        let original = json!({
            "topic": "Agents in production",
            "isNews": true,
            "targetDurationSec": 480,
            "vtr": 72.5,
            "tags": ["ai", "agents"],
            "metadata": { "title": "T", "thumbnailConcept": "C" },
            "trendId": null
        });

        let fields = json_to_fields(&original);
        let back = fields_to_json(&fields);
        assert_eq!(back, original);
    }

    #[test]
    fn test_integers_encoded_as_strings() {
        let fields = json_to_fields(&json!({ "views": 12345 }));
        match fields.get("views") {
            Some(Value::IntegerValue(s)) => assert_eq!(s, "12345"),
            other => panic!("expected integer value, got {:?}", other),
        }
    }

    #[test]
    fn test_document_id_from_name() {
        let doc = Document {
            name: Some(
                "projects/p/databases/(default)/documents/contentPlans/u1/items/item-7"
                    .to_string(),
            ),
            fields: None,
            create_time: None,
            update_time: None,
        };
        assert_eq!(doc.id(), Some("item-7"));
    }
}
