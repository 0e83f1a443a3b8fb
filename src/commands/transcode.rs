//! Offline commands working on local files.
//!
//! - flatten: transcode a debug-style trace document to the flat format
//! - build: replay a capture event log into a call tree

use super::models::{BuildArgs, FlattenArgs};
use crate::output::{emit_json, read_json};
use crate::tracer::{replay, CallTracer, CaptureEvent};
use crate::transcoder::{
    flatten, flatten_with_type, parse_call_frame, to_trace_results, TraceResults,
};
use anyhow::{Context, Result};
use log::{debug, info};

/// Execute the flatten command
pub fn execute_flatten(args: FlattenArgs) -> Result<()> {
    let raw: serde_json::Value = read_json(&args.input)
        .context(format!("Failed to read {}", args.input.display()))?;
    let root = parse_call_frame(&raw).context("Failed to parse call tracer document")?;

    debug!("Loaded call tree with {} frames", root.node_count());

    let filter = !args.keep_precompiles;
    let results = match &args.trace_type {
        Some(trace_type) => TraceResults {
            output: root.output.clone(),
            state_diff: None,
            trace: flatten_with_type(&root, trace_type, filter),
            vm_trace: None,
        },
        None => to_trace_results(&root, filter),
    };

    info!("Flattened into {} entries", results.trace.len());
    emit_json(&results, args.output.as_deref()).context("Failed to write trace output")
}

/// Execute the build command
pub fn execute_build(args: BuildArgs) -> Result<()> {
    let events: Vec<CaptureEvent> = read_json(&args.events)
        .context(format!("Failed to read {}", args.events.display()))?;

    info!("Replaying {} capture events", events.len());

    let mut tracer = CallTracer::new();
    replay(&events, &mut tracer).context("Capture event log is out of order")?;
    let root = tracer
        .into_result()
        .context("Capture event log did not complete")?;

    if args.nested {
        emit_json(&root, args.output.as_deref()).context("Failed to write call tree")
    } else {
        let trace = flatten(&root, !args.keep_precompiles);
        emit_json(&trace, args.output.as_deref()).context("Failed to write trace output")
    }
}

/// Validate flatten arguments
pub fn validate_flatten_args(args: &FlattenArgs) -> Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if let Some(trace_type) = &args.trace_type {
        if trace_type.trim().is_empty() {
            anyhow::bail!("Trace type cannot be empty");
        }
    }

    Ok(())
}

/// Validate build arguments
pub fn validate_build_args(args: &BuildArgs) -> Result<()> {
    if !args.events.is_file() {
        anyhow::bail!("Event log not found: {}", args.events.display());
    }

    Ok(())
}
