//! Flat, path-addressed trace schema of the `trace_*` namespace.

use crate::tracer::VmTrace;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// What a frame was asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceAction {
    /// The frame's own kind, lower-cased
    pub call_type: String,
    pub from: Address,
    #[serde(with = "alloy_serde::quantity")]
    pub gas: u64,
    pub input: Bytes,
    pub to: Option<Address>,
    pub value: U256,
}

/// Outcome of a frame that did not error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResult {
    #[serde(with = "alloy_serde::quantity")]
    pub gas_used: u64,
    pub output: Bytes,
}

/// One frame of a flattened call tree
///
/// Exactly one of `result` and `error` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTraceEntry {
    pub action: TraceAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TraceResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Number of surviving child frames
    pub subtraces: usize,

    /// Child indices from the root down to this frame
    pub trace_address: Vec<usize>,

    #[serde(rename = "type")]
    pub trace_type: String,
}

/// Response of `trace_rawTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceResults {
    pub output: Bytes,
    pub state_diff: Option<serde_json::Value>,
    pub trace: Vec<FlatTraceEntry>,
    pub vm_trace: Option<VmTrace>,
}

/// Response of `trace_replayTransaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmTraceResults {
    pub output: Bytes,
    pub state_diff: Option<serde_json::Value>,
    pub trace: Vec<FlatTraceEntry>,
    pub vm_trace: VmTrace,
}
