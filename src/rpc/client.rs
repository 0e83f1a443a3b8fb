//! HTTP client for communicating with a node's JSON-RPC endpoint.

use super::types::{CallRequest, JsonRpcRequest, JsonRpcResponse, TransactionInfo};
use crate::tracer::CallFrame;
use crate::utils::config::DEFAULT_RPC_TIMEOUT;
use crate::utils::error::RpcError;
use alloy_primitives::{Address, Bytes};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

/// Synchronous request/response access to a node
///
/// Calls are single-shot: a failure is returned to the caller as is.
pub trait NodeClient {
    /// Issue one JSON-RPC call and return its raw `result`
    fn request_value(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError>;

    /// Issue one JSON-RPC call and decode its `result`
    fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let value = self.request_value(method, params)?;
        serde_json::from_value(value).map_err(RpcError::Decode)
    }

    /// `eth_getTransactionByHash`, `None` when the node does not know it
    fn transaction_by_hash(&self, tx_hash: &str) -> Result<Option<TransactionInfo>, RpcError> {
        let tx_hash = normalize_tx_hash(tx_hash);
        self.request("eth_getTransactionByHash", serde_json::json!([tx_hash]))
    }

    /// `eth_getCode` at `block` (a hex number or tag)
    fn code_at(&self, address: &Address, block: &str) -> Result<Bytes, RpcError> {
        self.request("eth_getCode", serde_json::json!([address, block]))
    }

    /// `debug_traceCall` with a named tracer
    fn debug_trace_call(
        &self,
        call: &CallRequest,
        block: &str,
        tracer: &str,
    ) -> Result<CallFrame, RpcError> {
        self.request(
            "debug_traceCall",
            serde_json::json!([call, block, { "tracer": tracer }]),
        )
    }

    /// `debug_traceTransaction` with a named tracer
    fn debug_trace_transaction<T: DeserializeOwned>(
        &self,
        tx_hash: &str,
        tracer: &str,
    ) -> Result<T, RpcError> {
        let tx_hash = normalize_tx_hash(tx_hash);
        self.request(
            "debug_traceTransaction",
            serde_json::json!([tx_hash, { "tracer": tracer }]),
        )
    }
}

/// RPC client for a node reachable over HTTP
pub struct RpcClient {
    client: Client,
    rpc_url: String,
}

impl RpcClient {
    /// Create a new RPC client
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(DEFAULT_RPC_TIMEOUT)
            .build()
            .map_err(RpcError::RequestFailed)?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.rpc_url
    }
}

impl NodeClient for RpcClient {
    fn request_value(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        info!("Calling {} on {}", method, self.rpc_url);

        let request = JsonRpcRequest::new(method, params, 1);
        debug!("RPC request: {:?}", request);

        // Make HTTP POST request
        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .map_err(RpcError::RequestFailed)?;

        // Check HTTP status
        if !response.status().is_success() {
            return Err(RpcError::InvalidResponse(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().unwrap_or_default()
            )));
        }

        // Parse JSON-RPC response
        let rpc_response: JsonRpcResponse<serde_json::Value> =
            response.json().map_err(RpcError::RequestFailed)?;

        // Handle JSON-RPC error
        if let Some(error) = rpc_response.error {
            return Err(map_rpc_error(error, method));
        }

        // A null result is meaningful (unknown transaction), keep it
        Ok(rpc_response.result.unwrap_or(serde_json::Value::Null))
    }
}

/// Normalize transaction hash to include 0x prefix
pub fn normalize_tx_hash(tx_hash: &str) -> String {
    if tx_hash.starts_with("0x") {
        tx_hash.to_string()
    } else {
        format!("0x{}", tx_hash)
    }
}

/// Map JSON-RPC error to our error type
pub fn map_rpc_error(error: super::types::JsonRpcError, method: &str) -> RpcError {
    match error.code {
        -32000 => {
            if error.message.to_lowercase().contains("not found") {
                RpcError::TransactionNotFound(error.message)
            } else {
                RpcError::InvalidResponse(error.message)
            }
        }
        -32601 => RpcError::TracerNotSupported,
        _ => RpcError::InvalidResponse(format!(
            "{} failed with {}: {}",
            method, error.code, error.message
        )),
    }
}
