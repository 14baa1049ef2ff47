//! sproc - command-line front end for the stored procedure codec.
//!
//! ```text
//! sproc encode Key=Value ...                 print the encoded request string
//! sproc decode <payload.json>                decode a saved dataset payload
//! sproc status <raw> [--new-id|--zero-flag]  decode a pipe status triad
//! sproc call <procedure> Key=Value ...       execute through the gateway
//! ```

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sproc_bridge::bridge::ProcedureBridge;
use sproc_bridge::codec::{self, StoredProcedureResult};
use sproc_bridge::config::ConnectionConfig;
use sproc_bridge::ipc::{default_socket_path, IpcClient};
use sproc_bridge::models::{ParameterSet, StatusArray};

const USAGE: &str = "\
Usage:
  sproc encode Key=Value ...
  sproc decode <payload.json>
  sproc status <raw> [--new-id|--zero-flag]
  sproc call <procedure> Key=Value ...";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "sproc=info,sproc_bridge=info".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "encode" => {
            println!("{}", codec::encode(&parse_pairs(rest)?));
        }
        "decode" => {
            let path = rest.first().context("decode needs a payload file")?;
            let result = decode_file(Path::new(path))?;
            print_tables(&result)?;
        }
        "status" => {
            let raw = rest.first().context("status needs a raw status string")?;
            let status = match rest.get(1).map(String::as_str) {
                Some("--new-id") => codec::decode_status(raw, codec::new_id_failure),
                Some("--zero-flag") | None => codec::decode_status(raw, codec::zero_flag_failure),
                Some(other) => bail!("Unknown status rule: {}", other),
            }?;
            print_status(&status);
        }
        "call" => {
            let (procedure, pairs) = rest.split_first().context("call needs a procedure name")?;
            let params = parse_pairs(pairs)?;
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            let result = runtime.block_on(call(procedure, &params))?;
            print_tables(&result)?;
        }
        "help" | "--help" | "-h" => println!("{}", USAGE),
        other => bail!("Unknown command: {}\n{}", other, USAGE),
    }

    Ok(())
}

/// Parse `Key=Value` arguments, keeping their order.
fn parse_pairs(pairs: &[String]) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Expected Key=Value, got {:?}", pair))?;
        params.insert(key, value);
    }
    Ok(params)
}

fn decode_file(path: &Path) -> Result<StoredProcedureResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let result = codec::decode_value(&value)?;
    tracing::info!("Decoded {} table(s) from {}", result.table_count(), path.display());
    Ok(result)
}

async fn call(procedure: &str, params: &ParameterSet) -> Result<StoredProcedureResult> {
    let config = ConnectionConfig::from_env()?;
    let socket = default_socket_path();
    let client = IpcClient::connect(&socket)
        .await
        .with_context(|| format!("Is the gateway running at {}?", socket.display()))?;

    let mut bridge = ProcedureBridge::new(config, client);
    Ok(bridge.stored_procedure(procedure, params).await?)
}

fn print_tables(result: &StoredProcedureResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result.tables())?;
    println!("{}", json);
    Ok(())
}

fn print_status(status: &StatusArray) {
    for (label, position) in ["id", "code", "message"].iter().zip(0..) {
        println!("{:<8}{}", label, status.get(position).unwrap_or("-"));
    }
}
