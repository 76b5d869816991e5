//! CLI entry point for sentinel-ops — a Microsoft Sentinel API connector.
//!
//! Loads a connector configuration from a JSON file, then either runs the
//! health check (performing the one-time authorization-code exchange on
//! first use) or dispatches a named operation with parameters from a JSON
//! file. Refreshed credentials are persisted back to the configuration
//! file so the next invocation reuses them.
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (auth failure, API error, transport failure)
//! - 2: argument validation error (clap handles this automatically)

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sentinel_ops::client::SentinelClient;
use sentinel_ops::config::{ConnectorConfig, ConnectorInfo, FileConfigStore};
use sentinel_ops::dispatch;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the connector configuration JSON file. Refreshed tokens
    /// are written back to this file.
    #[arg(long)]
    config: std::path::PathBuf,

    /// Operation name to dispatch (see manifest/operations.toml for the
    /// published set). Omit when using --check.
    #[arg(long)]
    operation: Option<String>,

    /// Path to a JSON file with the operation parameters. Defaults to an
    /// empty parameter record.
    #[arg(long)]
    params: Option<std::path::PathBuf>,

    /// Run the health check instead of an operation.
    #[arg(long)]
    check: bool,

    /// Connector name used to address the persisted configuration.
    #[arg(long, default_value = "microsoft-sentinel")]
    connector_name: String,

    /// Connector version used to address the persisted configuration.
    #[arg(long, default_value = "1.0.0")]
    connector_version: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();

    if !args.check && args.operation.is_none() {
        eprintln!("Error: either --check or --operation is required");
        return ExitCode::FAILURE;
    }

    let config: ConnectorConfig = match std::fs::read_to_string(&args.config)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: could not load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let params: serde_json::Value = match &args.params {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(params) => params,
            Err(e) => {
                eprintln!("Error: could not load parameters: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => serde_json::json!({}),
    };

    let info = ConnectorInfo {
        connector_name: args.connector_name.clone(),
        connector_version: args.connector_version.clone(),
    };
    let store = Arc::new(FileConfigStore::new(&args.config));

    let client = match SentinelClient::new(config, info, store) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.check {
        return match client.check().await {
            Ok(_) => {
                println!("Connector credentials are valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    // Presence was validated above, so the unwrap cannot fire.
    let operation = args.operation.as_deref().unwrap_or_default();
    match dispatch::execute(&client, operation, &params).await {
        Ok(result) => {
            match serde_json::to_string_pretty(&result) {
                Ok(rendered) => println!("{rendered}"),
                Err(_) => println!("{result}"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
