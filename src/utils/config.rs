//! Configuration and constants for the CLI and the trace API.

use std::time::Duration;

/// Default timeout for RPC requests
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Default node endpoint
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Built-in geth tracer producing the nested call tree
pub const DEFAULT_CALL_TRACER: &str = "callTracer";

/// Name under which the op recorder is registered on the node
pub const DEFAULT_VM_TRACER: &str = "plugethVMTracer";

/// Block tag used for `debug_traceCall`
pub const DEFAULT_BLOCK_TAG: &str = "latest";

// Exposed method names
pub const TRACE_NAMESPACE: &str = "trace";
pub const RAW_TRANSACTION_METHOD: &str = "trace_rawTransaction";
pub const REPLAY_TRANSACTION_METHOD: &str = "trace_replayTransaction";
pub const TRACE_BLOCK_METHOD: &str = "plugeth_traceBlock";

/// Buffer size of every feed subscription and relay channel
pub const FEED_CAPACITY: usize = 1000;

// Precompiles live below 0x10000: an address whose first 18 bytes are zero
pub const PRECOMPILE_ZERO_PREFIX_LEN: usize = 18;

// Geth's revert message and its Parity spelling
pub const GETH_REVERT_ERROR: &str = "execution reverted";
pub const PARITY_REVERT_ERROR: &str = "Reverted";

/// Runtime configuration for [`crate::api::TraceApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Tracer requested from `debug_traceCall`
    pub call_tracer: String,

    /// Tracer requested from `debug_traceTransaction` for VM traces
    pub vm_tracer: String,

    /// Block against which raw transactions are simulated
    pub block_tag: String,

    /// Drop zero-value calls into the precompile range
    pub filter_precompiles: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            call_tracer: DEFAULT_CALL_TRACER.to_string(),
            vm_tracer: DEFAULT_VM_TRACER.to_string(),
            block_tag: DEFAULT_BLOCK_TAG.to_string(),
            filter_precompiles: true,
        }
    }
}

impl ApiConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vm_tracer(mut self, tracer: impl Into<String>) -> Self {
        self.vm_tracer = tracer.into();
        self
    }

    pub fn with_block_tag(mut self, tag: impl Into<String>) -> Self {
        self.block_tag = tag.into();
        self
    }

    pub fn with_precompile_filter(mut self, enabled: bool) -> Self {
        self.filter_precompiles = enabled;
        self
    }
}
