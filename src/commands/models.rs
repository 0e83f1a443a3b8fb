use crate::utils::config::{DEFAULT_RPC_URL, DEFAULT_VM_TRACER, TRACE_NAMESPACE};
use std::path::PathBuf;

/// Arguments for the raw-transaction command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct RawTransactionArgs {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Signed transaction, hex encoded
    pub raw_transaction: String,

    /// Requested trace kinds
    pub tracers: Vec<String>,

    /// Keep zero-value precompile calls in the output
    pub keep_precompiles: bool,

    /// Output path for the JSON result (stdout when absent)
    pub output: Option<PathBuf>,
}

impl Default for RawTransactionArgs {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            raw_transaction: String::new(),
            tracers: vec![TRACE_NAMESPACE.to_string()],
            keep_precompiles: false,
            output: None,
        }
    }
}

/// Arguments for the replay-transaction command
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// RPC endpoint URL
    pub rpc_url: String,

    /// Transaction hash to replay
    pub transaction_hash: String,

    /// Requested trace kinds
    pub tracers: Vec<String>,

    /// Name of the op recorder registered on the node
    pub vm_tracer: String,

    /// Output path for the JSON result (stdout when absent)
    pub output: Option<PathBuf>,
}

impl Default for ReplayArgs {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            transaction_hash: String::new(),
            tracers: vec!["vmTrace".to_string()],
            vm_tracer: DEFAULT_VM_TRACER.to_string(),
            output: None,
        }
    }
}

/// Arguments for the flatten command
#[derive(Debug, Clone, Default)]
pub struct FlattenArgs {
    /// Debug-style trace document to transcode
    pub input: PathBuf,

    /// Override the `type` written on every entry
    pub trace_type: Option<String>,

    /// Keep zero-value precompile calls in the output
    pub keep_precompiles: bool,

    /// Output path for the JSON result (stdout when absent)
    pub output: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    /// Recorded capture event log
    pub events: PathBuf,

    /// Print the nested call tree instead of the flat trace
    pub nested: bool,

    /// Keep zero-value precompile calls in the output
    pub keep_precompiles: bool,

    /// Output path for the JSON result (stdout when absent)
    pub output: Option<PathBuf>,
}
