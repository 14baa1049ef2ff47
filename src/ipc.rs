//! IPC transport to the API gateway.
//!
//! The remote procedural API is reached through a gateway process that owns
//! the session with the endpoint. This module speaks to it over a Unix
//! domain socket using JSON-RPC 2.0:
//!
//! ```text
//! ┌──────────────────┐         Unix Socket          ┌──────────────────┐
//! │ ProcedureBridge  │  ◄──────────────────────────►│     gateway      │ ──► remote API
//! │   (IpcClient)    │    JSON-RPC 2.0 + framing    │                  │
//! └──────────────────┘                              └──────────────────┘
//! ```
//!
//! Messages use HTTP-style Content-Length framing:
//!
//! ```text
//! Content-Length: 84\r\n
//! \r\n
//! {"jsonrpc":"2.0","method":"ExecuteStoredProcedure","params":{...},"id":1}
//! ```
//!
//! The JSON-RPC method is the remote function name; params are the
//! function's named arguments.

mod client;
mod framing;
mod protocol;

pub use client::{default_socket_path, IpcClient, IpcError, SOCKET_ENV};
pub use framing::{read_message, write_message, MAX_MESSAGE_SIZE};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
