//! Commands that talk to a node.
//!
//! - raw-transaction: simulate a signed transaction, print the flat trace
//! - replay-transaction: replay a mined transaction, print its VM trace

use super::models::{RawTransactionArgs, ReplayArgs};
use crate::api::TraceApi;
use crate::output::emit_json;
use crate::rpc::RpcClient;
use crate::utils::config::ApiConfig;
use alloy_primitives::Bytes;
use anyhow::{Context, Result};
use log::info;
use std::str::FromStr;
use std::time::Instant;

/// Execute the raw-transaction command
///
/// # Errors
/// * Malformed hex or transaction bytes
/// * RPC connection failures
/// * File write errors
pub fn execute_raw_transaction(args: RawTransactionArgs) -> Result<()> {
    let start_time = Instant::now();

    let data = Bytes::from_str(args.raw_transaction.trim())
        .context("Raw transaction is not valid hex")?;

    let config = ApiConfig::new().with_precompile_filter(!args.keep_precompiles);
    let api = TraceApi::new(create_client(&args.rpc_url)?, config);

    let results = api
        .raw_transaction(&data, &args.tracers)
        .context("Failed to trace raw transaction")?;

    info!("Trace has {} entries", results.trace.len());
    emit_json(&results, args.output.as_deref()).context("Failed to write trace output")?;

    info!("Completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

/// Execute the replay-transaction command
pub fn execute_replay_transaction(args: ReplayArgs) -> Result<()> {
    let start_time = Instant::now();

    let config = ApiConfig::new().with_vm_tracer(args.vm_tracer.clone());
    let api = TraceApi::new(create_client(&args.rpc_url)?, config);

    let results = api
        .replay_transaction(&args.transaction_hash, &args.tracers)
        .context(format!(
            "Failed to replay transaction {}",
            args.transaction_hash
        ))?;

    info!("VM trace has {} top-level ops", results.vm_trace.ops.len());
    emit_json(&results, args.output.as_deref()).context("Failed to write trace output")?;

    info!("Completed in {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}

fn create_client(rpc_url: &str) -> Result<RpcClient> {
    RpcClient::new(rpc_url).context("Failed to create RPC client")
}

/// Validate raw-transaction arguments
pub fn validate_raw_transaction_args(args: &RawTransactionArgs) -> Result<()> {
    validate_rpc_url(&args.rpc_url)?;

    let raw = args
        .raw_transaction
        .strip_prefix("0x")
        .unwrap_or(&args.raw_transaction);

    if raw.is_empty() {
        anyhow::bail!("Raw transaction cannot be empty");
    }

    if raw.len() % 2 != 0 || !raw.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("Raw transaction must be an even-length hex string");
    }

    Ok(())
}

/// Validate replay-transaction arguments
pub fn validate_replay_args(args: &ReplayArgs) -> Result<()> {
    validate_rpc_url(&args.rpc_url)?;

    if args.transaction_hash.is_empty() {
        anyhow::bail!("Transaction hash cannot be empty");
    }

    // Basic hex validation (with or without 0x prefix)
    let tx_hash = args
        .transaction_hash
        .strip_prefix("0x")
        .unwrap_or(&args.transaction_hash);

    if tx_hash.len() != 64 {
        anyhow::bail!("Transaction hash must be 32 bytes (64 hex characters)");
    }

    if !tx_hash.chars().all(|c| c.is_ascii_hexdigit()) {
        anyhow::bail!("Transaction hash contains invalid characters");
    }

    if args.vm_tracer.trim().is_empty() {
        anyhow::bail!("VM tracer name cannot be empty");
    }

    Ok(())
}

fn validate_rpc_url(rpc_url: &str) -> Result<()> {
    if rpc_url.is_empty() {
        anyhow::bail!("RPC URL cannot be empty");
    }

    if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
        anyhow::bail!("RPC URL must start with http:// or https://");
    }

    Ok(())
}
