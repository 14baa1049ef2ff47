//! Error types for request encoding and result decoding.
//!
//! Every variant is returned to the immediate caller. Nothing in the codec
//! logs or swallows these; presentation belongs to whoever made the call.

use thiserror::Error;

/// Failures produced while decoding a stored procedure or status response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcedureError {
    /// The remote side reported a business or validation failure through
    /// its in-band sentinel (dataset error row or status array).
    #[error("Remote procedure error {code}: {message}")]
    RemoteProcedure {
        /// Numeric code from position 1 of the pipe triad (0 when absent)
        code: i64,
        /// Human-readable message from position 2
        message: String,
    },

    /// A table position beyond what the payload contained was requested.
    #[error("Table {index} not found (result has {table_count} tables)")]
    TableNotFound {
        /// Requested table position
        index: usize,
        /// Number of tables actually present
        table_count: usize,
    },

    /// The payload could not be read as a dataset of tables and rows.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

impl ProcedureError {
    /// Build a remote error from the segments of a pipe-delimited triad.
    ///
    /// Position 1 is read as an integer code (unparsable or missing → 0).
    /// Position 2 is the message; when it is missing `fallback` is used.
    pub(crate) fn from_triad(code: Option<&str>, message: Option<&str>, fallback: &str) -> Self {
        let code = code
            .and_then(|c| c.trim().parse::<i64>().ok())
            .unwrap_or(0);
        let message = message.unwrap_or(fallback).to_string();
        ProcedureError::RemoteProcedure { code, message }
    }

    /// Returns true when the remote side reported the failure.
    pub fn is_remote(&self) -> bool {
        matches!(self, ProcedureError::RemoteProcedure { .. })
    }
}

/// Convenience alias for codec results.
pub type Result<T, E = ProcedureError> = std::result::Result<T, E>;
