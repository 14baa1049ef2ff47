//! IPC client for JSON-RPC 2.0 communication with the API gateway.
//!
//! `IpcClient` connects to the gateway over a Unix domain socket, sends one
//! request at a time and waits for the matching response with a timeout.
//! The gateway performs the actual remote API call; this side only frames
//! requests and unwraps responses.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::io::BufReader;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::time::timeout;

use super::framing::{read_message, write_message};
use super::protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the gateway socket path.
pub const SOCKET_ENV: &str = "SPROC_GATEWAY_SOCKET";

const SOCKET_FILE: &str = "sproc-gateway.sock";

/// Transport-level failures talking to the gateway.
#[derive(Debug, Error)]
pub enum IpcError {
    /// Failed to connect to the gateway socket.
    #[error("Connection failed: {0}")]
    ConnectionFailed(#[source] std::io::Error),

    /// Request timed out waiting for response.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Framing or encoding problem.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Gateway returned a JSON-RPC error response.
    #[error("Gateway error {code}: {message}")]
    ServerError {
        code: i32,
        message: String,
        data: Option<serde_json::Value>,
    },

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),
}

impl From<std::io::Error> for IpcError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused => {
                IpcError::ConnectionFailed(err)
            }
            _ => IpcError::Io(err),
        }
    }
}

impl From<JsonRpcError> for IpcError {
    fn from(err: JsonRpcError) -> Self {
        IpcError::ServerError {
            code: err.code,
            message: err.message,
            data: err.data,
        }
    }
}

/// Resolve the gateway socket path.
///
/// Resolution order:
/// 1. `$SPROC_GATEWAY_SOCKET`
/// 2. `$XDG_RUNTIME_DIR/sproc-gateway.sock` (Linux standard)
/// 3. `~/Library/Caches/sproc-gateway.sock` (macOS)
/// 4. `/tmp/sproc-gateway.sock` (fallback)
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(SOCKET_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(SOCKET_FILE);
    }

    if let Some(cache_dir) = dirs::cache_dir() {
        return cache_dir.join(SOCKET_FILE);
    }

    PathBuf::from("/tmp").join(SOCKET_FILE)
}

/// Persistent connection to the gateway.
///
/// # Example
///
/// ```ignore
/// let mut client = IpcClient::connect(&default_socket_path()).await?;
/// let result = client.call("GetUserInfo", json!({"UserID": 42})).await?;
/// ```
pub struct IpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_id: u64,
    timeout: Duration,
    /// Set once a request was abandoned mid-exchange; the stream may still
    /// hold its response, so no later reply can be trusted.
    desynced: bool,
}

impl IpcClient {
    /// Connect to the gateway at the given socket path.
    ///
    /// # Errors
    ///
    /// Returns `IpcError::ConnectionFailed` if the socket is missing, the
    /// connection is refused, or permission is denied.
    pub async fn connect(socket_path: &Path) -> Result<Self, IpcError> {
        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(IpcError::ConnectionFailed)?;

        tracing::info!("Connected to gateway at {}", socket_path.display());
        Ok(Self::from_stream(stream))
    }

    /// Wrap an already-connected stream.
    pub fn from_stream(stream: UnixStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            next_id: 1,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            desynced: false,
        }
    }

    /// Set the request timeout duration. Default is 30 seconds.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Whether the connection can still carry requests.
    ///
    /// Turns false after a timeout or a failed send/read; reconnect to
    /// recover.
    pub fn is_usable(&self) -> bool {
        !self.desynced
    }

    /// Send a request and wait for its result.
    ///
    /// # Errors
    ///
    /// - `IpcError::Timeout` when no response arrives in time
    /// - `IpcError::ServerError` when the gateway answers with an error
    /// - `IpcError::Protocol` on framing, encoding or id mismatch
    /// - `IpcError::ConnectionFailed` once an earlier request was abandoned
    pub async fn call(
        &mut self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, IpcError> {
        if self.desynced {
            return Err(IpcError::ConnectionFailed(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "gateway connection abandoned after an earlier failed request",
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        let request = JsonRpcRequest::new(method, params, id);
        let request_json = serde_json::to_string(&request)
            .map_err(|e| IpcError::Protocol(format!("Failed to serialize request: {}", e)))?;

        tracing::debug!(method, id, "sending gateway request");

        let response_json = match timeout(self.timeout, self.send_receive(&request_json)).await {
            Ok(Ok(json)) => json,
            Ok(Err(e)) => {
                self.desynced = true;
                return Err(e);
            }
            Err(_) => {
                self.desynced = true;
                tracing::warn!(method, id, "gateway request timed out; dropping connection");
                return Err(IpcError::Timeout(self.timeout));
            }
        };

        let response: JsonRpcResponse = serde_json::from_str(&response_json)
            .map_err(|e| IpcError::Protocol(format!("Failed to parse response: {}", e)))?;
        process_response(id, response)
    }

    async fn send_receive(&mut self, request_json: &str) -> Result<String, IpcError> {
        write_message(&mut self.writer, request_json)
            .await
            .map_err(|e| IpcError::Protocol(format!("Failed to send request: {:#}", e)))?;

        read_message(&mut self.reader)
            .await
            .map_err(|e| IpcError::Protocol(format!("Failed to read response: {:#}", e)))
    }
}

/// Extract the result of a response, or its error.
fn process_response(id: u64, response: JsonRpcResponse) -> Result<serde_json::Value, IpcError> {
    if let Some(err) = response.error {
        return Err(err.into());
    }

    if response.id != Some(id) {
        return Err(IpcError::Protocol(format!(
            "Response id {:?} does not match request id {}",
            response.id, id
        )));
    }

    response
        .result
        .ok_or_else(|| IpcError::Protocol("Response missing both result and error".to_string()))
}
