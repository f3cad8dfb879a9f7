use serde::{Deserialize, Serialize};

use crate::model::{EdgeType, PropertyValue};

/// Declared type of one edge property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    Bool,
    Int,
    Float,
    String,
    Bytes,
}

impl PropertyType {
    /// Whether a concrete value inhabits this type.
    pub fn matches(&self, value: &PropertyValue) -> bool {
        matches!(
            (self, value),
            (PropertyType::Bool, PropertyValue::Bool(_))
                | (PropertyType::Int, PropertyValue::Int(_))
                | (PropertyType::Float, PropertyValue::Float(_))
                | (PropertyType::String, PropertyValue::String(_))
                | (PropertyType::Bytes, PropertyValue::Bytes(_))
        )
    }
}

/// One named, typed field of an edge schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub prop_type: PropertyType,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, prop_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            prop_type,
        }
    }
}

/// Schema for one edge type. Both directions of an edge type (positive and
/// negative ids) share the schema registered under the absolute id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSchema {
    pub edge_type: EdgeType,
    pub fields: Vec<FieldDef>,
}

impl EdgeSchema {
    pub fn new(edge_type: EdgeType, fields: Vec<FieldDef>) -> Self {
        Self { edge_type, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Secondary index definition over a subset of an edge type's properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexItem {
    pub index_id: u32,
    pub edge_type: EdgeType,
    pub fields: Vec<String>,
}

impl IndexItem {
    pub fn new(index_id: u32, edge_type: EdgeType, fields: Vec<String>) -> Self {
        Self {
            index_id,
            edge_type,
            fields,
        }
    }
}
