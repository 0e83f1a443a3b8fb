//! CLI command implementations.
//!
//! Commands orchestrate the library components to perform user tasks.

pub mod models;
pub mod rpc;
pub mod transcode;
pub mod utils;

// Re-export main command functions
pub use models::{BuildArgs, FlattenArgs, RawTransactionArgs, ReplayArgs};
pub use rpc::{
    execute_raw_transaction, execute_replay_transaction, validate_raw_transaction_args,
    validate_replay_args,
};
pub use transcode::{execute_build, execute_flatten, validate_build_args, validate_flatten_args};
pub use utils::display_version;
