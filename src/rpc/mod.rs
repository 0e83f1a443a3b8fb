//! JSON-RPC client for the node that executes and traces transactions.

pub mod client;
pub mod types;

// Re-export main types
pub use client::{NodeClient, RpcClient};
pub use types::{CallRequest, TransactionInfo};
