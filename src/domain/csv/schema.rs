// ============================================================
// STREAM SCHEMA
// ============================================================
// Ordered column list describing the records a stream produces

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Declared type of a schema property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
}

impl PropertyType {
    pub fn json_type(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
        }
    }
}

/// A single column in a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProperty {
    pub name: String,

    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

impl SchemaProperty {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property_type: PropertyType::String,
        }
    }
}

/// Column-ordered schema. Every column is declared as a string,
/// whatever the sampled values look like; consumers re-type downstream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    pub properties: Vec<SchemaProperty>,
}

impl Schema {
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: columns.into_iter().map(SchemaProperty::string).collect(),
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// JSON Schema object advertised to the harness. Properties are
    /// nullable strings, listed in column order.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": [p.property_type.json_type(), "null"] }),
                )
            })
            .collect();

        json!({
            "type": "object",
            "properties": properties,
        })
    }
}
