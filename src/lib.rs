//! Trace Transcoder
//!
//! Call-tree reconstruction from execution-engine capture hooks, and
//! transcoding of debug-style call traces into the flat Parity-style
//! trace format.
//!
//! This crate provides the core implementation for the
//! `trace-transcoder` CLI tool. The main building blocks are:
//!
//! - [`tracer`] - capture hooks, the call-tree builder and the VM op recorder
//! - [`transcoder`] - nested-to-flat conversion
//! - [`api`] - `trace_rawTransaction`, `trace_replayTransaction` and the block feed relay
//! - [`rpc`] - JSON-RPC access to the node
//!
//! ## Getting Started
//!
//! ```bash
//! trace-transcoder flatten --input call_trace.json
//! trace-transcoder --help
//! ```

pub mod api;
pub mod commands;
pub mod feed;
pub mod output;
pub mod rpc;
pub mod tracer;
pub mod transcoder;
pub mod utils;
