//! Pipe-delimited status decoding for write operations.
//!
//! Add, update and attach calls answer with `id_or_flag|code|message`.
//! What counts as failure depends on the call family, so the caller
//! supplies the predicate applied to position 0:
//!
//! | Call family        | Position 0        | Predicate             |
//! |--------------------|-------------------|-----------------------|
//! | create (AddRecord) | new numeric ID    | [`new_id_failure`]    |
//! | attach / update    | GUID or `"0"`     | [`zero_flag_failure`] |

use crate::error::{ProcedureError, Result};
use crate::models::StatusArray;
use crate::util::split_pipes;

/// Decode a status triad, failing when `is_failure` rejects position 0.
///
/// Fewer than three segments are accepted; missing positions stay `None`.
/// A missing position 0 is passed to the predicate as the empty string.
///
/// # Errors
///
/// Returns `ProcedureError::RemoteProcedure` with position 1 as the code
/// and position 2 as the message when the predicate reports failure.
///
/// # Example
///
/// ```ignore
/// let status = decode_status("57||", new_id_failure)?;
/// assert_eq!(status.id(), Some("57"));
/// ```
pub fn decode_status<F>(raw: &str, is_failure: F) -> Result<StatusArray>
where
    F: Fn(&str) -> bool,
{
    let status = StatusArray::from_segments(split_pipes(raw));

    if is_failure(status.id().unwrap_or("")) {
        return Err(ProcedureError::from_triad(status.code(), status.message(), ""));
    }

    Ok(status)
}

/// Creation-style failure: position 0 is not a positive identifier.
pub fn new_id_failure(id: &str) -> bool {
    match id.trim().parse::<i64>() {
        Ok(value) => value <= 0,
        Err(_) => true,
    }
}

/// Attach/update-style failure: position 0 is the literal `"0"`.
pub fn zero_flag_failure(flag: &str) -> bool {
    flag.trim() == "0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_flag_failure_raises() {
        let err = decode_status("0|100|Save failed", zero_flag_failure).unwrap_err();
        assert_eq!(
            err,
            ProcedureError::RemoteProcedure {
                code: 100,
                message: "Save failed".to_string()
            }
        );
    }

    #[test]
    fn test_new_id_success() {
        let status = decode_status("57||", new_id_failure).unwrap();
        assert_eq!(status, StatusArray::from_segments(["57", "", ""]));
        assert_eq!(status.id_as_i64(), Some(57));
    }

    #[test]
    fn test_new_id_failure_on_non_positive() {
        assert!(decode_status("0|3|Duplicate", new_id_failure).is_err());
        assert!(decode_status("-1|3|Duplicate", new_id_failure).is_err());
        assert!(decode_status("|3|Missing", new_id_failure).is_err());
        assert!(decode_status("abc", new_id_failure).is_err());
    }

    #[test]
    fn test_new_id_failure_on_non_integer_numbers() {
        for raw in ["inf|3|x", "Infinity|3|x", "NaN|3|x", "1e3|3|x", "12.5|3|x"] {
            assert!(decode_status(raw, new_id_failure).is_err(), "{} should fail", raw);
        }
        assert!(decode_status(" 42 |0|ok", new_id_failure).is_ok());
    }

    #[test]
    fn test_zero_flag_success_with_guid() {
        let status = decode_status(
            "7a1f.c2e4-0b9d|0|File attached",
            zero_flag_failure,
        )
        .unwrap();
        assert_eq!(status.id(), Some("7a1f.c2e4-0b9d"));
        assert_eq!(status.message(), Some("File attached"));
    }

    #[test]
    fn test_short_success_leaves_positions_empty() {
        let status = decode_status("1", zero_flag_failure).unwrap();
        assert_eq!(status.id(), Some("1"));
        assert_eq!(status.code(), None);
        assert_eq!(status.message(), None);
    }

    #[test]
    fn test_failure_with_missing_segments() {
        let err = decode_status("0", zero_flag_failure).unwrap_err();
        assert_eq!(
            err,
            ProcedureError::RemoteProcedure {
                code: 0,
                message: String::new()
            }
        );
    }

    #[test]
    fn test_caller_supplied_predicate() {
        let rejects_pending = |flag: &str| flag == "PENDING";
        assert!(decode_status("PENDING|9|Queued", rejects_pending).is_err());
        assert!(decode_status("0|0|ok", rejects_pending).is_ok());
    }
}
