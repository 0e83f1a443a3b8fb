//! Types for JSON-RPC communication with an Ethereum node.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 request structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
    pub id: u64,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC request
    ///
    /// # Arguments
    /// * `method` - RPC method name
    /// * `params` - Positional parameters (a JSON array)
    /// * `id` - Request ID (for response correlation)
    pub fn new(method: impl Into<String>, params: serde_json::Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC 2.0 response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// The subset of `eth_getTransactionByHash` this crate reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    #[serde(default)]
    pub hash: Option<B256>,

    /// `None` for contract creation
    #[serde(default)]
    pub to: Option<Address>,

    /// Hex block number, `None` while pending
    #[serde(default)]
    pub block_number: Option<String>,

    #[serde(default)]
    pub input: Bytes,
}

/// Call object sent to `debug_traceCall`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(with = "alloy_serde::quantity")]
    pub gas: u64,
    pub data: Bytes,
    #[serde(with = "alloy_serde::quantity")]
    pub gas_price: u128,
    pub value: alloy_primitives::U256,
}
