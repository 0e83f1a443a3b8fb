use crate::utils::config::{
    RAW_TRANSACTION_METHOD, REPLAY_TRANSACTION_METHOD, TRACE_BLOCK_METHOD,
};

/// Display version information
pub fn display_version() {
    println!("Trace Transcoder v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Call-tree reconstruction and debug-to-Parity trace transcoding.");
    println!(
        "Methods: {}, {}, {}",
        RAW_TRANSACTION_METHOD, REPLAY_TRANSACTION_METHOD, TRACE_BLOCK_METHOD
    );
}
