//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Violations of the capture event ordering contract
///
/// Any of these poisons the tracer that reported it: the partially built
/// tree is discarded and never handed out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture already started")]
    AlreadyStarted,

    #[error("event received before capture start")]
    NotStarted,

    #[error("event received after capture end")]
    AlreadyFinished,

    #[error("enter received with no active call frame")]
    EmptyStack,

    #[error("exit received with no open child frame")]
    UnmatchedExit,

    #[error("capture ended with {0} unclosed call frame(s)")]
    UnclosedFrames(usize),

    #[error("capture stream never reached its end event")]
    Incomplete,
}

/// Errors that can occur during RPC communication
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Tracer not supported by this RPC endpoint")]
    TracerNotSupported,

    #[error("Failed to decode RPC result: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors returned by the trace API methods
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Invalid raw transaction: {0}")]
    InvalidTransaction(String),

    #[error("Failed to recover transaction sender: {0}")]
    SignerRecovery(String),
}

/// Errors that can occur while reading trace documents
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
