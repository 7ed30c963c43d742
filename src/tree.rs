//! Import of a columnar file's schema tree into the flat [`Schema`] model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::{ColumnSpec, Schema, TypeCode};

/// One node of a nested schema description.
///
/// Leaves carry a storage (physical) type and an optional logical annotation;
/// groups carry children. The root is a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub physical_type: Option<String>,
    #[serde(rename = "logical", skip_serializing_if = "Option::is_none", default)]
    pub logical_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<SchemaNode>,
}

impl SchemaNode {
    pub fn leaf(name: impl Into<String>, physical_type: &str, logical_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            physical_type: Some(physical_type.to_string()),
            logical_type: logical_type.map(str::to_string),
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        Self {
            name: name.into(),
            physical_type: None,
            logical_type: None,
            children,
        }
    }

    pub fn is_group(&self) -> bool {
        self.physical_type.is_none()
    }
}

/// Output-only renames for column names the storage layer reserves.
///
/// Applied when column names are rendered (CSV header, dump keys); the
/// imported [`Schema`] keeps the upper-cased original names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedNames {
    renames: HashMap<String, String>,
}

impl ReservedNames {
    /// No renames at all.
    pub fn none() -> Self {
        Self {
            renames: HashMap::new(),
        }
    }

    /// Add or replace a rename. Matching is on the upper-cased name.
    pub fn with(mut self, reserved: &str, replacement: &str) -> Self {
        self.renames
            .insert(reserved.to_ascii_uppercase(), replacement.to_string());
        self
    }

    pub fn render_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.renames
            .get(&name.to_ascii_uppercase())
            .map(String::as_str)
            .unwrap_or(name)
    }
}

impl Default for ReservedNames {
    fn default() -> Self {
        Self::none()
            .with("TIME", "TIME_FIELD")
            .with("DATE", "DATE_FIELD")
    }
}

fn logical_type_code(logical: &str) -> Option<TypeCode> {
    match logical.to_ascii_uppercase().as_str() {
        "INT" | "INT32" | "INT_32" => Some(TypeCode::Int32),
        "INT64" | "INT_64" => Some(TypeCode::Int64),
        "FLOAT" | "FLOAT32" => Some(TypeCode::Float32),
        "DOUBLE" | "FLOAT64" => Some(TypeCode::Double),
        "VARCHAR" | "UTF" | "UTF8" | "BYTE_ARRAY" | "STRING" => Some(TypeCode::ByteArray),
        "DATE" => Some(TypeCode::Date),
        "TIMESTAMP" | "TIMESTAMP_MILLIS" => Some(TypeCode::TimestampMillis),
        _ => None,
    }
}

fn physical_type_code(physical: &str) -> Option<TypeCode> {
    match physical.to_ascii_uppercase().as_str() {
        "INT" | "INT32" => Some(TypeCode::Int32),
        "INT64" => Some(TypeCode::Int64),
        "FLOAT" | "FLOAT32" => Some(TypeCode::Float32),
        "DOUBLE" | "FLOAT64" => Some(TypeCode::Double),
        "BYTE_ARRAY" => Some(TypeCode::ByteArray),
        _ => None,
    }
}

/// Pick the type code for one leaf: logical annotation first, storage type
/// second.
pub fn resolve_type_code(node: &SchemaNode) -> Result<TypeCode> {
    let from_logical = node.logical_type.as_deref().and_then(logical_type_code);
    let from_physical = node.physical_type.as_deref().and_then(physical_type_code);

    from_logical.or(from_physical).ok_or_else(|| {
        Error::SchemaError(format!(
            "Invalid type for field {}: {} {}",
            node.name,
            node.physical_type.as_deref().unwrap_or("-"),
            node.logical_type.as_deref().unwrap_or("-")
        ))
    })
}

/// Flatten the root's children into a [`Schema`] with upper-cased names.
///
/// Nested groups and unknown storage types are fatal.
pub fn import_schema(root: &SchemaNode) -> Result<Schema> {
    let mut columns = Vec::with_capacity(root.children.len());

    for child in &root.children {
        if child.is_group() {
            return Err(Error::SchemaError(format!(
                "Nested field {} is not supported",
                child.name
            )));
        }

        let type_code = resolve_type_code(child)?;
        log::debug!(
            "\t{}\t{}\t{}",
            child.name,
            child.physical_type.as_deref().unwrap_or(""),
            child.logical_type.as_deref().unwrap_or("")
        );
        columns.push(ColumnSpec::new(child.name.to_uppercase(), type_code));
    }

    Schema::new(columns)
}
