//! Tabular result decoding.
//!
//! A stored procedure answers with zero or more tables. Before anything is
//! materialized the first row of the first table is checked for an
//! `ErrorMessage` sentinel; when present the call failed and no result is
//! produced, however the rest of the payload looks.

use serde::Serialize;
use serde_json::Value;

use super::infer::infer;
use super::payload::{RawField, RawNode, RawResponsePayload, RawRow, DATASET_KEY};
use crate::error::{ProcedureError, Result};
use crate::models::{Row, Table};
use crate::util::split_pipes;

/// Field carrying the in-band error triad on the first row of table 0.
pub const ERROR_FIELD: &str = "ErrorMessage";

/// Decoded, read-only result of one stored procedure call.
///
/// Tables are addressed by position only. Asking for a position past the
/// end is an error, never an empty table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredProcedureResult {
    tables: Vec<Table>,
}

impl StoredProcedureResult {
    /// Number of tables in the dataset, empty ones included.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Table at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ProcedureError::TableNotFound` when `index >= table_count()`.
    pub fn table(&self, index: usize) -> Result<&Table> {
        self.tables.get(index).ok_or(ProcedureError::TableNotFound {
            index,
            table_count: self.tables.len(),
        })
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }
}

/// Decode a dataset payload into typed tables.
///
/// # Errors
///
/// - `ProcedureError::RemoteProcedure` when the error sentinel is present
pub fn decode(payload: &RawResponsePayload) -> Result<StoredProcedureResult> {
    let sentinel = payload
        .tables
        .first()
        .and_then(|table| table.rows.first())
        .and_then(|row| row.leaf(ERROR_FIELD));
    check_sentinel(sentinel)?;

    let tables: Vec<Table> = payload
        .tables
        .iter()
        .map(|raw| Table::new(raw.rows.iter().flat_map(materialize_row).collect()))
        .collect();

    tracing::trace!(tables = tables.len(), "decoded stored procedure dataset");

    Ok(StoredProcedureResult { tables })
}

/// Decode straight from the JSON handed over by the transport.
///
/// The error sentinel is probed on the raw JSON first, so a failed call
/// whose remaining payload is malformed still reports the remote error.
///
/// # Errors
///
/// - `ProcedureError::RemoteProcedure` when the error sentinel is present
/// - `ProcedureError::MalformedPayload` when the JSON is not a dataset
pub fn decode_value(value: &Value) -> Result<StoredProcedureResult> {
    check_sentinel(probe_sentinel(value))?;
    decode(&RawResponsePayload::try_from(value)?)
}

fn check_sentinel(sentinel: Option<&str>) -> Result<()> {
    match sentinel {
        Some(text) if !text.trim().is_empty() => {
            let parts = split_pipes(text);
            Err(ProcedureError::from_triad(
                parts.get(1).copied(),
                parts.get(2).copied(),
                text,
            ))
        }
        _ => Ok(()),
    }
}

/// Locate `dataset[0][0].ErrorMessage` without validating anything else.
fn probe_sentinel(value: &Value) -> Option<&str> {
    let first_table = value.get(DATASET_KEY)?.get(0)?;
    let first_row = match first_table {
        Value::Array(rows) => rows.first()?,
        row => row,
    };
    first_row.get(ERROR_FIELD)?.as_str()
}

/// Rows produced by one raw row.
///
/// A row made entirely of groups is the lookup shape and yields one row
/// per group. Any other row yields a single row of its leaf fields.
fn materialize_row(raw: &RawRow) -> Vec<Row> {
    let is_lookup = !raw.fields.is_empty()
        && raw
            .fields
            .iter()
            .all(|f| matches!(f.value, RawNode::Group(_)));

    if is_lookup {
        raw.fields
            .iter()
            .filter_map(|f| match &f.value {
                RawNode::Group(children) => Some(typed_row(children)),
                RawNode::Leaf(_) => None,
            })
            .collect()
    } else {
        vec![typed_row(&raw.fields)]
    }
}

fn typed_row(fields: &[RawField]) -> Row {
    fields
        .iter()
        .filter_map(|f| match &f.value {
            RawNode::Leaf(text) => Some((f.name.as_str(), infer(text))),
            RawNode::Group(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::payload::RawTable;
    use crate::models::TypedValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn business_payload() -> RawResponsePayload {
        RawResponsePayload::new(vec![
            RawTable::new(vec![RawRow::new(vec![
                RawField::leaf("User_Account", "42"),
                RawField::leaf("Display_Name", "Doe, Jane"),
                RawField::leaf("Can_Impersonate", "false"),
            ])]),
            RawTable::new(vec![]),
        ])
    }

    #[test]
    fn test_decode_business_rows() {
        let result = decode(&business_payload()).unwrap();

        assert_eq!(result.table_count(), 2);
        let row = result.table(0).unwrap().first().unwrap();
        assert_eq!(row.get("User_Account"), Some(&TypedValue::Integer(42)));
        assert_eq!(row.get("Display_Name"), Some(&TypedValue::from("Doe, Jane")));
        assert_eq!(row.get("Can_Impersonate"), Some(&TypedValue::Boolean(false)));
        assert!(result.table(1).unwrap().is_empty());
    }

    #[test]
    fn test_decode_lookup_rows() {
        let payload = RawResponsePayload::new(vec![RawTable::new(vec![RawRow::new(vec![
            RawField::group(
                "Prefixes",
                vec![RawField::leaf("Prefix_ID", "1"), RawField::leaf("Prefix", "Mr.")],
            ),
            RawField::group(
                "Prefixes",
                vec![RawField::leaf("Prefix_ID", "2"), RawField::leaf("Prefix", "Ms.")],
            ),
        ])])]);

        let result = decode(&payload).unwrap();
        let table = result.table(0).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].get("Prefix_ID"), Some(&TypedValue::Integer(2)));
        assert_eq!(table.rows()[1].get("Prefix"), Some(&TypedValue::from("Ms.")));
    }

    #[test]
    fn test_mixed_row_keeps_leaves_only() {
        let payload = RawResponsePayload::new(vec![RawTable::new(vec![RawRow::new(vec![
            RawField::leaf("ID", "1"),
            RawField::group("Extra", vec![RawField::leaf("X", "y")]),
        ])])]);

        let result = decode(&payload).unwrap();
        let table = result.table(0).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].len(), 1);
        assert!(table.rows()[0].get("X").is_none());
    }

    #[test]
    fn test_error_sentinel_wins_over_valid_tables() {
        let payload = RawResponsePayload::new(vec![
            RawTable::new(vec![RawRow::new(vec![RawField::leaf(
                ERROR_FIELD,
                "0|512|Contact not found",
            )])]),
            business_payload().tables[0].clone(),
        ]);

        let err = decode(&payload).unwrap_err();
        assert_eq!(
            err,
            ProcedureError::RemoteProcedure {
                code: 512,
                message: "Contact not found".to_string()
            }
        );
    }

    #[test]
    fn test_empty_sentinel_is_ignored() {
        let payload = RawResponsePayload::new(vec![RawTable::new(vec![RawRow::new(vec![
            RawField::leaf(ERROR_FIELD, ""),
            RawField::leaf("ID", "3"),
        ])])]);

        let result = decode(&payload).unwrap();
        assert_eq!(result.table(0).unwrap().len(), 1);
    }

    #[test]
    fn test_sentinel_without_triad_uses_whole_text() {
        let err = decode_value(&json!({
            "dataset": [[{"ErrorMessage": "Procedure timed out"}]]
        }))
        .unwrap_err();

        assert_eq!(
            err,
            ProcedureError::RemoteProcedure {
                code: 0,
                message: "Procedure timed out".to_string()
            }
        );
    }

    #[test]
    fn test_sentinel_beats_malformed_remainder() {
        let err = decode_value(&json!({
            "dataset": [
                [{"ErrorMessage": "0|7|Invalid user"}],
                "garbage"
            ]
        }))
        .unwrap_err();

        assert_eq!(
            err,
            ProcedureError::RemoteProcedure {
                code: 7,
                message: "Invalid user".to_string()
            }
        );
    }

    #[test]
    fn test_decode_value_malformed() {
        let err = decode_value(&json!({"rows": []})).unwrap_err();
        assert!(matches!(err, ProcedureError::MalformedPayload(_)));
    }

    #[test]
    fn test_table_out_of_range() {
        let result = decode(&business_payload()).unwrap();
        assert_eq!(
            result.table(5).unwrap_err(),
            ProcedureError::TableNotFound {
                index: 5,
                table_count: 2
            }
        );
    }

    #[test]
    fn test_decode_twice_is_identical() {
        let payload = business_payload();
        let first = decode(&payload).unwrap();
        let second = decode(&payload).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_result_serializes_as_nested_arrays() {
        let result = decode(&business_payload()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({"tables": [
                [{"User_Account": 42, "Display_Name": "Doe, Jane", "Can_Impersonate": false}],
                []
            ]})
        );
    }
}
