use pretty_assertions::assert_eq;
use serde_json::json;
use trace_transcoder::tracer::{CallFrame, CallKind};
use trace_transcoder::transcoder::{flatten, flatten_with_type, parse_call_frame, to_trace_results};

const SENDER: &str = "0x00000000000000000000000000000000000000aa";
const CONTRACT: &str = "0x00000000000000000000000000000000000000bb";
const OTHER: &str = "0x00000000000000000000000000000000000000cc";
const ECRECOVER: &str = "0x0000000000000000000000000000000000000001";

fn frame(value: serde_json::Value) -> CallFrame {
    serde_json::from_value(value).expect("valid call frame fixture")
}

#[test]
fn test_precompile_child_is_dropped() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "value": "0x0",
        "gas": "0x186a0",
        "gasUsed": "0x5208",
        "input": "0x",
        "calls": [{
            "type": "STATICCALL",
            "from": CONTRACT,
            "to": ECRECOVER,
            "gas": "0x1000",
            "gasUsed": "0xbb8",
            "input": "0x1234"
        }]
    }));

    let trace = flatten(&root, true);

    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].subtraces, 0);
    assert_eq!(trace[0].trace_address, Vec::<usize>::new());
}

#[test]
fn test_precompile_with_value_is_kept() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x",
        "calls": [{
            "type": "CALL",
            "from": CONTRACT,
            "to": ECRECOVER,
            "value": "0x1",
            "gas": "0x1000",
            "input": "0x"
        }]
    }));

    let trace = flatten(&root, true);

    assert_eq!(trace.len(), 2);
    assert_eq!(trace[0].subtraces, 1);
    assert_eq!(trace[1].trace_address, vec![0]);
    assert_eq!(trace[1].action.value.to::<u64>(), 1);
}

#[test]
fn test_precompile_kept_when_filter_disabled() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x",
        "calls": [{
            "type": "STATICCALL",
            "from": CONTRACT,
            "to": ECRECOVER,
            "gas": "0x1000",
            "input": "0x"
        }]
    }));

    assert_eq!(flatten(&root, false).len(), 2);
}

#[test]
fn test_nested_trace_addresses_are_preorder() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x",
        "calls": [{
            "type": "DELEGATECALL",
            "from": CONTRACT,
            "to": OTHER,
            "gas": "0x2000",
            "input": "0x",
            "calls": [{
                "type": "CALL",
                "from": OTHER,
                "to": SENDER,
                "gas": "0x1000",
                "input": "0x"
            }]
        }]
    }));

    let trace = flatten(&root, true);
    let addresses: Vec<Vec<usize>> = trace.iter().map(|e| e.trace_address.clone()).collect();

    assert_eq!(addresses, vec![vec![], vec![0], vec![0, 0]]);
    assert_eq!(
        trace.iter().map(|e| e.subtraces).collect::<Vec<_>>(),
        vec![1, 1, 0]
    );
    assert_eq!(trace[1].action.call_type, "delegatecall");
}

#[test]
fn test_sibling_addresses_skip_filtered_calls() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x",
        "calls": [
            { "type": "CALL", "from": CONTRACT, "to": OTHER, "gas": "0x10", "input": "0x" },
            { "type": "STATICCALL", "from": CONTRACT, "to": ECRECOVER, "gas": "0x10", "input": "0x" },
            { "type": "CALL", "from": CONTRACT, "to": SENDER, "gas": "0x10", "input": "0x" }
        ]
    }));

    let trace = flatten(&root, true);

    assert_eq!(trace.len(), 3);
    assert_eq!(trace[0].subtraces, 2);
    assert_eq!(trace[1].trace_address, vec![0]);
    assert_eq!(trace[2].trace_address, vec![1]);
    assert_eq!(trace[2].action.to, Some(SENDER.parse().unwrap()));
}

#[test]
fn test_failed_frame_has_error_and_no_result() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x",
        "calls": [{
            "type": "CALL",
            "from": CONTRACT,
            "to": OTHER,
            "gas": "0x1000",
            "gasUsed": "0x1000",
            "input": "0x",
            "error": "out of gas"
        }]
    }));

    let trace = flatten(&root, true);

    assert!(trace[0].result.is_some());
    assert_eq!(trace[1].error.as_deref(), Some("out of gas"));
    assert!(trace[1].result.is_none());

    let encoded = serde_json::to_value(&trace[1]).unwrap();
    assert!(encoded.get("result").is_none());
    assert_eq!(encoded["error"], "out of gas");
}

#[test]
fn test_empty_error_string_is_success() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "gasUsed": "0x5208",
        "input": "0x",
        "error": ""
    }));

    let trace = flatten(&root, true);

    assert_eq!(trace[0].error, None);
    assert_eq!(trace[0].result.as_ref().map(|r| r.gas_used), Some(0x5208));

    let encoded = serde_json::to_value(&trace[0]).unwrap();
    assert!(encoded.get("error").is_none());
    assert_eq!(encoded["result"]["gasUsed"], "0x5208");
}

#[test]
fn test_revert_is_normalized_at_any_depth() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x",
        "error": "execution reverted",
        "calls": [{
            "type": "CALL",
            "from": CONTRACT,
            "to": OTHER,
            "gas": "0x1000",
            "input": "0x",
            "calls": [{
                "type": "CALL",
                "from": OTHER,
                "to": SENDER,
                "gas": "0x100",
                "input": "0x",
                "error": "execution reverted"
            }]
        }]
    }));

    let trace = flatten(&root, true);

    assert_eq!(trace[0].error.as_deref(), Some("Reverted"));
    assert_eq!(trace[1].error, None);
    assert_eq!(trace[2].error.as_deref(), Some("Reverted"));
}

#[test]
fn test_type_is_root_kind_on_every_entry() {
    let root = frame(json!({
        "type": "CREATE",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x6080",
        "calls": [{
            "type": "CALL",
            "from": CONTRACT,
            "to": OTHER,
            "gas": "0x1000",
            "input": "0x"
        }]
    }));

    let trace = flatten(&root, true);

    assert!(trace.iter().all(|e| e.trace_type == "create"));
    assert_eq!(trace[0].action.call_type, "create");
    assert_eq!(trace[1].action.call_type, "call");

    let explicit = flatten_with_type(&root, "call", true);
    assert!(explicit.iter().all(|e| e.trace_type == "call"));
}

#[test]
fn test_flatten_is_deterministic() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "input": "0x",
        "calls": [
            { "type": "CALL", "from": CONTRACT, "to": OTHER, "gas": "0x10", "input": "0x" },
            { "type": "CALL", "from": CONTRACT, "to": SENDER, "gas": "0x10", "input": "0x" }
        ]
    }));

    assert_eq!(flatten(&root, true), flatten(&root, true));
}

#[test]
fn test_trace_results_wire_format() {
    let root = frame(json!({
        "type": "CALL",
        "from": SENDER,
        "to": CONTRACT,
        "gas": "0x186a0",
        "gasUsed": "0x5208",
        "input": "0x",
        "output": "0x01"
    }));

    let encoded = serde_json::to_value(to_trace_results(&root, true)).unwrap();

    assert_eq!(encoded["output"], "0x01");
    assert_eq!(encoded["stateDiff"], serde_json::Value::Null);
    assert_eq!(encoded["vmTrace"], serde_json::Value::Null);

    let entry = &encoded["trace"][0];
    assert_eq!(entry["type"], "call");
    assert_eq!(entry["traceAddress"], json!([]));
    assert_eq!(entry["action"]["callType"], "call");
    assert_eq!(entry["action"]["gas"], "0x186a0");
    assert_eq!(entry["action"]["value"], "0x0");
    assert_eq!(entry["result"]["gasUsed"], "0x5208");
}

#[test]
fn test_parse_rpc_envelope_and_flatten() {
    let document = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "type": "CALL",
            "from": SENDER,
            "to": CONTRACT,
            "gas": "0x100",
            "input": "0x"
        }
    });

    let root = parse_call_frame(&document).unwrap();

    assert_eq!(root.kind, CallKind::Call);
    assert_eq!(flatten(&root, true).len(), 1);
}
