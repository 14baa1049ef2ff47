//! Invocation orchestrator for the remote procedural API.
//!
//! `ProcedureBridge` pairs a [`ConnectionConfig`] with a [`Transport`] and
//! exposes the remote functions built on the codec: stored procedure
//! execution, record add/update, and file attachment. It assembles the
//! named arguments each function expects, hands them to the transport, and
//! decodes whatever comes back.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

use crate::codec::{
    as_key_value, decode_status, decode_value, encode, new_id_failure, zero_flag_failure,
    StoredProcedureResult,
};
use crate::config::ConnectionConfig;
use crate::error::ProcedureError;
use crate::ipc::{IpcClient, IpcError};
use crate::models::{LookupMap, ParameterSet, StatusArray};

// =============================================================================
// Transport Trait for Dependency Injection
// =============================================================================

/// Sends a remote function call and returns its raw result.
///
/// Abstracts the gateway connection so the orchestrator can be driven by
/// a mock in tests.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn invoke(&mut self, function: &str, params: Value) -> Result<Value, IpcError>;
}

impl Transport for IpcClient {
    async fn invoke(&mut self, function: &str, params: Value) -> Result<Value, IpcError> {
        self.call(function, params).await
    }
}

/// Failures of an orchestrated call.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Transport(#[from] IpcError),

    #[error(transparent)]
    Procedure(#[from] ProcedureError),
}

impl BridgeError {
    /// The remote-reported failure, if that is what this is.
    pub fn as_remote(&self) -> Option<(i64, &str)> {
        match self {
            BridgeError::Procedure(ProcedureError::RemoteProcedure { code, message }) => {
                Some((*code, message.as_str()))
            }
            _ => None,
        }
    }
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Remote function names.
pub mod functions {
    pub const EXECUTE_STORED_PROCEDURE: &str = "ExecuteStoredProcedure";
    pub const ADD_RECORD: &str = "AddRecord";
    pub const UPDATE_RECORD: &str = "UpdateRecord";
    pub const ATTACH_FILE: &str = "AttachFile";
    pub const UPDATE_DEFAULT_IMAGE: &str = "UpdateDefaultImage";
}

/// A file to attach to a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FileAttachment {
    pub name: String,
    pub description: String,
    pub contents: Vec<u8>,
    pub page_id: i64,
    pub record_id: i64,
    pub is_image: bool,
    /// Resize the longest side of an image to this many pixels; 0 keeps
    /// the original dimensions.
    pub resize_longest: u32,
}

/// Outcome of a successful attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedFile {
    pub guid: String,
    pub message: String,
}

/// Orchestrates remote calls for one configured installation.
pub struct ProcedureBridge<T> {
    config: ConnectionConfig,
    transport: T,
    user_id: i64,
}

impl<T: Transport> ProcedureBridge<T> {
    pub fn new(config: ConnectionConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            user_id: 0,
        }
    }

    /// Set the acting user recorded by write operations for auditing.
    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a stored procedure and decode its dataset.
    ///
    /// # Errors
    ///
    /// - `BridgeError::Transport` when the call does not complete
    /// - `BridgeError::Procedure` for an error sentinel or malformed dataset
    pub async fn stored_procedure(
        &mut self,
        name: &str,
        params: &ParameterSet,
    ) -> BridgeResult<StoredProcedureResult> {
        let args = self
            .credentials()
            .with("StoredProcedureName", name)
            .with("RequestString", encode(params));

        let raw = self.invoke(functions::EXECUTE_STORED_PROCEDURE, &args).await?;
        let result = decode_value(&raw).inspect_err(|e| log_failure(name, e))?;

        tracing::debug!(
            procedure = name,
            tables = result.table_count(),
            "stored procedure completed"
        );
        Ok(result)
    }

    /// Execute a stored procedure and project one of its tables as a lookup.
    pub async fn lookup(
        &mut self,
        name: &str,
        params: &ParameterSet,
        table_index: usize,
    ) -> BridgeResult<LookupMap> {
        let result = self.stored_procedure(name, params).await?;
        Ok(as_key_value(result.table(table_index)?))
    }

    /// Insert a record; position 0 of the result is the new primary key.
    pub async fn add_record(
        &mut self,
        table: &str,
        primary_key: &str,
        fields: &ParameterSet,
    ) -> BridgeResult<StatusArray> {
        let args = self.record_args(table, primary_key, fields);
        let raw = self.invoke(functions::ADD_RECORD, &args).await?;
        decode_status_result(functions::ADD_RECORD, &raw, new_id_failure)
    }

    /// Update a record; `fields` must carry the primary key value.
    pub async fn update_record(
        &mut self,
        table: &str,
        primary_key: &str,
        fields: &ParameterSet,
    ) -> BridgeResult<StatusArray> {
        let args = self.record_args(table, primary_key, fields);
        let raw = self.invoke(functions::UPDATE_RECORD, &args).await?;
        decode_status_result(functions::UPDATE_RECORD, &raw, zero_flag_failure)
    }

    /// Attach a file to a record.
    ///
    /// The returned GUID has its `.` separators removed.
    pub async fn attach_file(&mut self, file: &FileAttachment) -> BridgeResult<AttachedFile> {
        let args = self
            .credentials()
            .with("FileContents", BASE64.encode(&file.contents))
            .with("FileName", file.name.as_str())
            .with("PageID", file.page_id)
            .with("RecordID", file.record_id)
            .with("FileDescription", file.description.as_str())
            .with("IsImage", file.is_image)
            .with("ResizeLongestDimension", file.resize_longest);

        let raw = self.invoke(functions::ATTACH_FILE, &args).await?;
        let status = decode_status_result(functions::ATTACH_FILE, &raw, zero_flag_failure)?;

        Ok(AttachedFile {
            guid: status.id().unwrap_or_default().replace('.', ""),
            message: status.message().unwrap_or_default().to_string(),
        })
    }

    /// Make an attached image the default image of its record.
    pub async fn update_default_image(&mut self, file_guid: &str) -> BridgeResult<StatusArray> {
        let args = self.credentials().with("UniqueFileId", file_guid);
        let raw = self.invoke(functions::UPDATE_DEFAULT_IMAGE, &args).await?;
        decode_status_result(functions::UPDATE_DEFAULT_IMAGE, &raw, zero_flag_failure)
    }

    fn credentials(&self) -> ParameterSet {
        ParameterSet::new()
            .with("GUID", self.config.domain_guid.as_str())
            .with("Password", self.config.api_password.as_str())
    }

    fn record_args(&self, table: &str, primary_key: &str, fields: &ParameterSet) -> ParameterSet {
        self.credentials()
            .with("UserID", self.user_id)
            .with("TableName", table)
            .with("PrimaryKeyField", primary_key)
            .with("RequestString", encode(fields))
    }

    async fn invoke(&mut self, function: &str, args: &ParameterSet) -> BridgeResult<Value> {
        let params = serde_json::to_value(args)
            .map_err(|e| IpcError::Protocol(format!("Failed to serialize parameters: {}", e)))?;

        tracing::debug!(function, "invoking remote function");
        Ok(self.transport.invoke(function, params).await?)
    }
}

/// Decode a status result delivered either as a bare string or as an
/// object carrying `<Function>Result`.
fn decode_status_result<F>(function: &str, raw: &Value, is_failure: F) -> BridgeResult<StatusArray>
where
    F: Fn(&str) -> bool,
{
    let result_key = format!("{}Result", function);
    let text = match raw {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get(&result_key)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProcedureError::MalformedPayload(format!("{} response lacks {}", function, result_key))
            })?,
        other => {
            return Err(ProcedureError::MalformedPayload(format!(
                "{} response is not a status string: {}",
                function, other
            ))
            .into())
        }
    };

    Ok(decode_status(text, is_failure).inspect_err(|e| log_failure(function, e))?)
}

fn log_failure(call: &str, err: &ProcedureError) {
    if let ProcedureError::RemoteProcedure { code, message } = err {
        tracing::warn!(call, code, "remote call failed: {}", message);
    }
}
