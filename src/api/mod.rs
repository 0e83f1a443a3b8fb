//! The `trace` namespace methods and the `plugeth` trace subscription.
//!
//! - `trace_rawTransaction`: simulate a signed transaction with geth's
//!   `callTracer` and answer in the flat Parity format
//! - `trace_replayTransaction`: replay a mined transaction through the VM
//!   op recorder and answer with a nested VM trace
//! - `plugeth_traceBlock`: stream completed call trees as they are built

pub mod transaction;

pub use transaction::decode_raw_transaction;

use crate::feed::{self, Feed};
use crate::rpc::NodeClient;
use crate::tracer::{CallFrame, VmTrace, VmTracerResult};
use crate::transcoder::{flatten, TraceResults, VmTraceResults};
use crate::utils::config::{ApiConfig, DEFAULT_BLOCK_TAG};
use crate::utils::error::{ApiError, RpcError};
use log::{debug, info};
use tokio::sync::{broadcast, mpsc};

/// Trace API backed by a node client
///
/// Holds no per-call state: every method call is independent.
pub struct TraceApi<C> {
    client: C,
    config: ApiConfig,
}

impl<C: NodeClient> TraceApi<C> {
    pub fn new(client: C, config: ApiConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// `trace_rawTransaction`
    ///
    /// # Arguments
    /// * `data` - Signed EIP-2718 transaction bytes
    /// * `tracers` - Requested trace kinds (logged, not interpreted)
    ///
    /// # Errors
    /// * `ApiError::InvalidTransaction` / `ApiError::SignerRecovery` - raised
    ///   before any RPC call is made
    /// * `ApiError::Rpc` - the node rejected or failed `debug_traceCall`
    pub fn raw_transaction(
        &self,
        data: &[u8],
        tracers: &[String],
    ) -> Result<TraceResults, ApiError> {
        let call = decode_raw_transaction(data)?;
        debug!("Requested tracers: {:?}", tracers);

        info!(
            "Tracing raw transaction from {} with {}",
            call.from, self.config.call_tracer
        );
        let root = self
            .client
            .debug_trace_call(&call, &self.config.block_tag, &self.config.call_tracer)?;

        Ok(TraceResults {
            output: root.output.clone(),
            state_diff: None,
            trace: flatten(&root, self.config.filter_precompiles),
            vm_trace: None,
        })
    }

    /// `trace_replayTransaction`
    ///
    /// # Errors
    /// * `RpcError::TransactionNotFound` - the node has no such transaction
    /// * `ApiError::Rpc` - any of the three upstream calls failed
    pub fn replay_transaction(
        &self,
        tx_hash: &str,
        tracers: &[String],
    ) -> Result<VmTraceResults, ApiError> {
        debug!("Requested tracers: {:?}", tracers);

        let tx = self
            .client
            .transaction_by_hash(tx_hash)?
            .ok_or_else(|| RpcError::TransactionNotFound(tx_hash.to_string()))?;

        // Deployments have no code yet; their init code is the input
        let code = match tx.to {
            Some(to) => {
                let block = tx.block_number.as_deref().unwrap_or(DEFAULT_BLOCK_TAG);
                self.client.code_at(&to, block)?
            }
            None => tx.input.clone(),
        };

        info!("Replaying {} with {}", tx_hash, self.config.vm_tracer);
        let raw: serde_json::Value = self
            .client
            .debug_trace_transaction(tx_hash, &self.config.vm_tracer)?;
        let recorded = decode_recorder_result(raw)?;

        Ok(VmTraceResults {
            output: recorded.output.clone(),
            state_diff: None,
            trace: Vec::new(),
            vm_trace: VmTrace {
                code,
                ops: recorded.top_level_ops(),
            },
        })
    }

    /// `plugeth_traceBlock` subscription
    pub fn trace_block(
        &self,
        feed: &Feed,
        shutdown: broadcast::Receiver<()>,
    ) -> mpsc::Receiver<CallFrame> {
        feed::relay(feed, shutdown)
    }
}

/// Decode the op recorder's answer, refusing one that recorded nothing
///
/// A result with none of `vmTrace`, `costs` or `pcs` (in either naming)
/// comes from a tracer that is not the op recorder.
fn decode_recorder_result(raw: serde_json::Value) -> Result<VmTracerResult, RpcError> {
    const RECORDED_FIELDS: [&str; 5] = ["vmTrace", "costs", "pcs", "Costs", "PCs"];

    let recorded = raw
        .as_object()
        .is_some_and(|obj| RECORDED_FIELDS.iter().any(|key| obj.contains_key(*key)));
    if !recorded {
        return Err(RpcError::InvalidResponse(
            "op recorder result has no vmTrace, costs or pcs".to_string(),
        ));
    }

    serde_json::from_value(raw).map_err(RpcError::Decode)
}
