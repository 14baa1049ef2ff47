//! Raw response payload tree and its JSON boundary.
//!
//! The endpoint answers stored procedure calls with a self-describing
//! dataset of tables, rows and named fields. A field is either leaf text
//! or a group of further fields (the lookup shape). The distinction is
//! made once, here, when the payload is lifted out of JSON; the decoder
//! only ever matches on [`RawNode`].
//!
//! # JSON Shape
//!
//! ```text
//! {"dataset": [
//!     [ {"Contact_ID": "12", "Display_Name": "Doe, Jane"} ],      business table
//!     [ {"Genders": [ {"Gender_ID": "1", "Gender": "Male"},       lookup table
//!                     {"Gender_ID": "2", "Gender": "Female"} ]} ]
//! ]}
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ProcedureError;

/// Top-level key holding the tables.
pub const DATASET_KEY: &str = "dataset";

/// A field value: leaf text, or a group of named fields one level down.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Leaf(String),
    Group(Vec<RawField>),
}

/// A named field within a row or group.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub value: RawNode,
}

impl RawField {
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: RawNode::Leaf(value.into()),
        }
    }

    pub fn group(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            name: name.into(),
            value: RawNode::Group(fields),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.value, RawNode::Leaf(_))
    }
}

/// One row of a raw table, fields in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub fields: Vec<RawField>,
}

impl RawRow {
    pub fn new(fields: Vec<RawField>) -> Self {
        Self { fields }
    }

    /// Text of the first leaf field with the given name.
    pub fn leaf(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|f| match &f.value {
            RawNode::Leaf(text) if f.name == name => Some(text.as_str()),
            _ => None,
        })
    }
}

/// One table of the dataset, rows in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

/// The whole dataset as delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct RawResponsePayload {
    pub tables: Vec<RawTable>,
}

impl RawResponsePayload {
    pub fn new(tables: Vec<RawTable>) -> Self {
        Self { tables }
    }

    /// Parse a payload from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ProcedureError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| ProcedureError::MalformedPayload(format!("Invalid JSON: {}", e)))?;
        Self::try_from(&value)
    }
}

impl TryFrom<&Value> for RawResponsePayload {
    type Error = ProcedureError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let dataset = value
            .get(DATASET_KEY)
            .ok_or_else(|| malformed("missing \"dataset\" key"))?;

        let tables = dataset
            .as_array()
            .ok_or_else(|| malformed("\"dataset\" is not an array"))?
            .iter()
            .enumerate()
            .map(|(index, table)| parse_table(index, table))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tables })
    }
}

impl TryFrom<Value> for RawResponsePayload {
    type Error = ProcedureError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}

fn malformed(detail: impl Into<String>) -> ProcedureError {
    ProcedureError::MalformedPayload(detail.into())
}

/// A table is a list of rows; a lone row object counts as a one-row table.
fn parse_table(index: usize, table: &Value) -> Result<RawTable, ProcedureError> {
    match table {
        Value::Array(rows) => rows
            .iter()
            .map(|row| parse_row(index, row))
            .collect::<Result<Vec<_>, _>>()
            .map(RawTable::new),
        Value::Object(_) => Ok(RawTable::new(vec![parse_row(index, table)?])),
        other => Err(malformed(format!(
            "table {} is a {}, expected an array of rows",
            index,
            json_kind(other)
        ))),
    }
}

fn parse_row(table: usize, row: &Value) -> Result<RawRow, ProcedureError> {
    let object = row.as_object().ok_or_else(|| {
        malformed(format!(
            "row in table {} is a {}, expected an object",
            table,
            json_kind(row)
        ))
    })?;

    let mut fields = Vec::with_capacity(object.len());
    for (name, value) in object {
        match value {
            Value::Null => {}
            Value::Object(group) => fields.push(RawField::group(name, parse_group(name, group)?)),
            Value::Array(items) => {
                for item in items {
                    let group = item.as_object().ok_or_else(|| {
                        malformed(format!(
                            "field {:?} in table {} lists a {}, expected objects",
                            name,
                            table,
                            json_kind(item)
                        ))
                    })?;
                    fields.push(RawField::group(name, parse_group(name, group)?));
                }
            }
            scalar => fields.push(RawField::leaf(name, leaf_text(scalar))),
        }
    }
    Ok(RawRow::new(fields))
}

/// Fields of a group must be leaves; lookup nesting is one level deep.
fn parse_group(parent: &str, group: &Map<String, Value>) -> Result<Vec<RawField>, ProcedureError> {
    let mut fields = Vec::with_capacity(group.len());
    for (name, value) in group {
        match value {
            Value::Null => {}
            Value::Object(_) | Value::Array(_) => {
                return Err(malformed(format!(
                    "field {:?} under {:?} nests deeper than one level",
                    name, parent
                )))
            }
            scalar => fields.push(RawField::leaf(name, leaf_text(scalar))),
        }
    }
    Ok(fields)
}

fn leaf_text(scalar: &Value) -> String {
    match scalar {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
