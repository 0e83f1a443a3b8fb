//! Flatten a nested call tree into pre-order, path-addressed entries.
//!
//! Algorithm, per frame:
//! 1. Drop children that are zero-value calls into the precompile range
//! 2. Emit the frame's entry (`Reverted` replaces geth's revert message)
//! 3. Recurse into the surviving children with `path + [index]`
//!
//! Indices count surviving children only, so addresses never have gaps.

use super::parity::{FlatTraceEntry, TraceAction, TraceResult, TraceResults};
use crate::tracer::CallFrame;
use crate::utils::config::{GETH_REVERT_ERROR, PARITY_REVERT_ERROR, PRECOMPILE_ZERO_PREFIX_LEN};
use log::debug;

/// Flatten `root`, labelling every entry with the root's lower-cased kind
///
/// Every entry's `type` is the root's kind, not its own; `action.callType`
/// carries the frame's own kind.
pub fn flatten(root: &CallFrame, filter_precompiles: bool) -> Vec<FlatTraceEntry> {
    let trace_type = root.kind.as_str().to_lowercase();
    flatten_with_type(root, &trace_type, filter_precompiles)
}

/// Flatten `root` with an explicit `type` applied to every entry
pub fn flatten_with_type(
    root: &CallFrame,
    trace_type: &str,
    filter_precompiles: bool,
) -> Vec<FlatTraceEntry> {
    let mut entries = Vec::with_capacity(root.node_count());
    let mut path = Vec::new();
    flatten_frame(root, &mut path, trace_type, filter_precompiles, &mut entries);

    debug!(
        "Flattened {} of {} frames",
        entries.len(),
        root.node_count()
    );
    entries
}

/// Flatten `root` and wrap it as a `trace_rawTransaction` response
pub fn to_trace_results(root: &CallFrame, filter_precompiles: bool) -> TraceResults {
    TraceResults {
        output: root.output.clone(),
        state_diff: None,
        trace: flatten(root, filter_precompiles),
        vm_trace: None,
    }
}

fn flatten_frame(
    frame: &CallFrame,
    path: &mut Vec<usize>,
    trace_type: &str,
    filter_precompiles: bool,
    entries: &mut Vec<FlatTraceEntry>,
) {
    let survivors: Vec<&CallFrame> = frame
        .calls
        .iter()
        .filter(|call| !(filter_precompiles && is_precompile_call(call)))
        .collect();

    entries.push(to_entry(frame, survivors.len(), path.clone(), trace_type));

    for (index, child) in survivors.into_iter().enumerate() {
        path.push(index);
        flatten_frame(child, path, trace_type, filter_precompiles, entries);
        path.pop();
    }
}

fn to_entry(
    frame: &CallFrame,
    subtraces: usize,
    trace_address: Vec<usize>,
    trace_type: &str,
) -> FlatTraceEntry {
    // An empty error string means success
    let error = frame
        .error
        .as_deref()
        .filter(|err| !err.is_empty())
        .map(normalize_error);
    let result = match error {
        Some(_) => None,
        None => Some(TraceResult {
            gas_used: frame.gas_used,
            output: frame.output.clone(),
        }),
    };

    FlatTraceEntry {
        action: TraceAction {
            call_type: frame.kind.as_str().to_lowercase(),
            from: frame.from,
            gas: frame.gas,
            input: frame.input.clone(),
            to: frame.to,
            value: frame.transferred_value(),
        },
        result,
        error,
        subtraces,
        trace_address,
        trace_type: trace_type.to_string(),
    }
}

/// Zero-value call into an address whose leading bytes are all zero
///
/// A call carrying value is always kept, even inside the range.
pub fn is_precompile_call(frame: &CallFrame) -> bool {
    let Some(to) = frame.to else {
        return false;
    };
    let in_range = to.as_slice()[..PRECOMPILE_ZERO_PREFIX_LEN]
        .iter()
        .all(|byte| *byte == 0);

    in_range && frame.transferred_value().is_zero()
}

/// Map geth's revert message to Parity's; pass anything else through
pub fn normalize_error(error: &str) -> String {
    if error == GETH_REVERT_ERROR {
        PARITY_REVERT_ERROR.to_string()
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracer::CallKind;
    use alloy_primitives::{Address, Bytes, U256};

    fn frame(to: Address, value: u64) -> CallFrame {
        CallFrame::new(
            CallKind::Call,
            Address::with_last_byte(0xaa),
            to,
            Bytes::new(),
            1_000,
            Some(U256::from(value)),
        )
    }

    #[test]
    fn test_precompile_detection() {
        assert!(is_precompile_call(&frame(Address::with_last_byte(1), 0)));
        assert!(is_precompile_call(&frame(Address::ZERO, 0)));
        assert!(!is_precompile_call(&frame(Address::with_last_byte(1), 1)));

        // Byte 17 set: just outside the reserved prefix
        let mut outside = [0u8; 20];
        outside[17] = 1;
        assert!(!is_precompile_call(&frame(Address::from(outside), 0)));

        // Bytes 18 and 19 are free within the range
        let mut inside = [0u8; 20];
        inside[18] = 0xff;
        assert!(is_precompile_call(&frame(Address::from(inside), 0)));
    }

    #[test]
    fn test_missing_to_is_kept() {
        let mut create = frame(Address::ZERO, 0);
        create.to = None;
        assert!(!is_precompile_call(&create));
    }

    #[test]
    fn test_normalize_error() {
        assert_eq!(normalize_error("execution reverted"), "Reverted");
        assert_eq!(normalize_error("out of gas"), "out of gas");
        assert_eq!(normalize_error("Execution Reverted"), "Execution Reverted");
    }

    #[test]
    fn test_filter_can_be_disabled() {
        let mut root = frame(Address::with_last_byte(0xbb), 0);
        root.calls.push(frame(Address::with_last_byte(2), 0));

        assert_eq!(flatten(&root, true).len(), 1);
        assert_eq!(flatten(&root, false).len(), 2);
    }
}
