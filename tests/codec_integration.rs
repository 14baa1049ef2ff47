//! End-to-end checks of the codec through the public API: request
//! encoding, dataset decoding, lookup projection and status decoding.

use pretty_assertions::assert_eq;
use serde_json::json;

use sproc_bridge::codec::{
    as_key_value, decode, decode_status, decode_value, encode, infer, new_id_failure,
    zero_flag_failure, RawField, RawResponsePayload, RawRow, RawTable,
};
use sproc_bridge::error::ProcedureError;
use sproc_bridge::models::{ParameterSet, StatusArray, TypedValue};

fn user_info_payload() -> serde_json::Value {
    json!({
        "dataset": [
            [{
                "User_Account": "42",
                "User_Name": "jdoe",
                "Display_Name": "Doe, Jane",
                "Contact_ID": "1001",
                "Email_Address": "jane@example.com",
                "Can_Impersonate": "false"
            }],
            [{"Prefixes": [
                {"Prefix_ID": "1", "Prefix": "Mr."},
                {"Prefix_ID": "2", "Prefix": "Mrs."},
                {"Prefix_ID": "3", "Prefix": "Dr."}
            ]}],
            [{"Suffix": "Jr."}, {"Suffix": "Sr."}, {"Suffix": "III"}],
            []
        ]
    })
}

#[test]
fn test_user_info_dataset() {
    let result = decode_value(&user_info_payload()).unwrap();
    assert_eq!(result.table_count(), 4);

    let user = result.table(0).unwrap().first().unwrap();
    assert_eq!(user.get("User_Account"), Some(&TypedValue::Integer(42)));
    assert_eq!(user.get("Email_Address"), Some(&TypedValue::from("jane@example.com")));
    assert_eq!(
        user.get("Can_Impersonate").and_then(TypedValue::as_flag),
        Some(false)
    );
    assert!(user.get("Middle_Name").is_none());

    let prefixes = as_key_value(result.table(1).unwrap());
    let labels: Vec<String> = prefixes.pairs().iter().map(|(_, v)| v.to_string()).collect();
    assert_eq!(labels, vec!["Mr.", "Mrs.", "Dr."]);

    let suffixes = as_key_value(result.table(2).unwrap());
    assert_eq!(
        suffixes.values(),
        &[TypedValue::from("Jr."), TypedValue::from("Sr."), TypedValue::from("III")]
    );

    assert!(result.table(3).unwrap().is_empty());
    assert!(matches!(
        result.table(4),
        Err(ProcedureError::TableNotFound { index: 4, table_count: 4 })
    ));
}

#[test]
fn test_decode_is_repeatable() {
    let payload = RawResponsePayload::try_from(&user_info_payload()).unwrap();
    let first = decode(&payload).unwrap();
    let second = decode(&payload).unwrap();

    assert_eq!(first.table_count(), second.table_count());
    assert_eq!(first, second);
}

#[test]
fn test_error_precedence_over_valid_tables() {
    let payload = RawResponsePayload::new(vec![
        RawTable::new(vec![RawRow::new(vec![RawField::leaf(
            "ErrorMessage",
            "0|1205|Deadlock victim",
        )])]),
        RawTable::new(vec![RawRow::new(vec![RawField::leaf("Contact_ID", "1")])]),
    ]);

    assert_eq!(
        decode(&payload).unwrap_err(),
        ProcedureError::RemoteProcedure {
            code: 1205,
            message: "Deadlock victim".to_string()
        }
    );
}

#[test]
fn test_table_index_out_of_range() {
    let result = decode_value(&json!({"dataset": [[{"A": "1"}], [{"B": "2"}]]})).unwrap();
    assert_eq!(
        result.table(5).unwrap_err(),
        ProcedureError::TableNotFound {
            index: 5,
            table_count: 2
        }
    );
}

#[test]
fn test_type_inference_examples() {
    assert_eq!(infer("42"), TypedValue::Integer(42));
    assert_eq!(infer("3.5"), TypedValue::Float(3.5));
    assert_eq!(infer("true"), TypedValue::Boolean(true));
    assert_eq!(infer("false"), TypedValue::Boolean(false));
    assert_eq!(infer(""), TypedValue::String(String::new()));
    assert_eq!(infer("abc"), TypedValue::String("abc".to_string()));
}

#[test]
fn test_encode_round_trip_and_escaping() {
    let plain = ParameterSet::new()
        .with("UserID", 42)
        .with("PageID", 292)
        .with("SelectionID", 17);
    let encoded = encode(&plain);
    let pairs: Vec<(&str, &str)> = encoded
        .split('&')
        .map(|pair| pair.split_once('=').unwrap())
        .collect();
    assert_eq!(pairs, vec![("UserID", "42"), ("PageID", "292"), ("SelectionID", "17")]);

    let reserved = ParameterSet::new().with("Notes", "A&B=C#D?");
    let encoded = encode(&reserved);
    let value = encoded.strip_prefix("Notes=").unwrap();
    assert!(!value.contains(['&', '=', '#', '?']));
    assert_eq!(value, "Adp_AmpBdp_EqualCdp_PoundDdp_Qmark");
}

#[test]
fn test_status_examples() {
    assert_eq!(
        decode_status("0|100|Save failed", zero_flag_failure).unwrap_err(),
        ProcedureError::RemoteProcedure {
            code: 100,
            message: "Save failed".to_string()
        }
    );

    let status = decode_status("57||", new_id_failure).unwrap();
    assert_eq!(status, StatusArray::from_segments(["57", "", ""]));
}
