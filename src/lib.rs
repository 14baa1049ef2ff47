//! Stored procedure client library.
//!
//! This library encodes calls to a remote procedural API and decodes its
//! responses into typed, indexable tables:
//!
//! - `codec` - request encoding, dataset and status decoding, lookups
//! - `models` - parameter sets, typed rows and tables, status arrays
//! - `error` - the error taxonomy of the codec
//! - `bridge` - orchestrates remote calls over a `Transport`
//! - `ipc` - JSON-RPC transport to the API gateway
//! - `config` - connection settings
//!
//! # Usage
//!
//! ```ignore
//! use sproc_bridge::bridge::ProcedureBridge;
//! use sproc_bridge::config::ConnectionConfig;
//! use sproc_bridge::ipc::{default_socket_path, IpcClient};
//! use sproc_bridge::models::ParameterSet;
//!
//! let client = IpcClient::connect(&default_socket_path()).await?;
//! let mut bridge = ProcedureBridge::new(ConnectionConfig::from_env()?, client);
//!
//! let params = ParameterSet::new().with("ApplicationCode", "COMMON");
//! let result = bridge.stored_procedure("api_Common_GetConfigurationSettings", &params).await?;
//! let settings = sproc_bridge::codec::as_key_value(result.table(0)?);
//! ```

pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod ipc;
pub mod models;
pub mod util;
