use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use tempfile::tempdir;
use trace_transcoder::commands::{
    execute_build, execute_flatten, validate_build_args, validate_flatten_args, BuildArgs,
    FlattenArgs,
};
use trace_transcoder::output::read_json;

fn call_trace() -> Value {
    json!([{
        "txHash": "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060",
        "result": {
            "type": "CALL",
            "from": "0x00000000000000000000000000000000000000aa",
            "to": "0x00000000000000000000000000000000000000bb",
            "gas": "0x186a0",
            "gasUsed": "0x5208",
            "input": "0x",
            "calls": [{
                "type": "STATICCALL",
                "from": "0x00000000000000000000000000000000000000bb",
                "to": "0x0000000000000000000000000000000000000004",
                "gas": "0x100",
                "input": "0x"
            }]
        }
    }])
}

#[test]
fn test_flatten_command_writes_trace_results() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("trace.json");
    let output = dir.path().join("flat.json");
    fs::write(&input, call_trace().to_string()).unwrap();

    let args = FlattenArgs {
        input,
        output: Some(output.clone()),
        ..Default::default()
    };
    validate_flatten_args(&args).unwrap();
    execute_flatten(args).unwrap();

    let written: Value = read_json(&output).unwrap();
    assert_eq!(written["trace"].as_array().unwrap().len(), 1);
    assert_eq!(written["trace"][0]["subtraces"], 0);
    assert_eq!(written["trace"][0]["type"], "call");
}

#[test]
fn test_flatten_command_type_override() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("trace.json");
    let output = dir.path().join("flat.json");
    fs::write(&input, call_trace().to_string()).unwrap();

    let args = FlattenArgs {
        input,
        trace_type: Some("reward".to_string()),
        keep_precompiles: true,
        output: Some(output.clone()),
    };
    execute_flatten(args).unwrap();

    let written: Value = read_json(&output).unwrap();
    let types: Vec<&str> = written["trace"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["reward", "reward"]);
    assert_eq!(written["output"], "0x");
    assert_eq!(written["stateDiff"], Value::Null);
}

#[test]
fn test_flatten_command_rejects_rpc_error_document() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("error.json");
    fs::write(
        &input,
        json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32000, "message": "boom"}}).to_string(),
    )
    .unwrap();

    let args = FlattenArgs {
        input,
        ..Default::default()
    };
    assert!(execute_flatten(args).is_err());
}

#[test]
fn test_build_command_nested_and_flat() {
    let dir = tempdir().unwrap();
    let events = dir.path().join("events.json");
    fs::write(
        &events,
        json!([
            {"event": "start", "from": "0x00000000000000000000000000000000000000aa",
             "to": "0x00000000000000000000000000000000000000bb", "gas": 100000},
            {"event": "enter", "type": "DELEGATECALL", "from": "0x00000000000000000000000000000000000000bb",
             "to": "0x00000000000000000000000000000000000000cc", "gas": 5000},
            {"event": "exit", "gasUsed": 21},
            {"event": "end", "gasUsed": 24000, "durationUs": 10}
        ])
        .to_string(),
    )
    .unwrap();

    let nested = dir.path().join("tree.json");
    execute_build(BuildArgs {
        events: events.clone(),
        nested: true,
        output: Some(nested.clone()),
        ..Default::default()
    })
    .unwrap();

    let tree: Value = read_json(&nested).unwrap();
    assert_eq!(tree["type"], "CALL");
    assert_eq!(tree["gasUsed"], "0x5dc0");
    assert_eq!(tree["calls"][0]["type"], "DELEGATECALL");

    let flat = dir.path().join("flat.json");
    execute_build(BuildArgs {
        events,
        output: Some(flat.clone()),
        ..Default::default()
    })
    .unwrap();

    let entries: Value = read_json(&flat).unwrap();
    assert_eq!(entries[1]["traceAddress"], json!([0]));
    assert_eq!(entries[1]["action"]["callType"], "delegatecall");
}

#[test]
fn test_build_command_rejects_unbalanced_log() {
    let dir = tempdir().unwrap();
    let events = dir.path().join("events.json");
    fs::write(
        &events,
        json!([
            {"event": "start", "from": "0x00000000000000000000000000000000000000aa",
             "to": "0x00000000000000000000000000000000000000bb", "gas": 100000},
            {"event": "exit", "gasUsed": 21}
        ])
        .to_string(),
    )
    .unwrap();

    let args = BuildArgs {
        events,
        ..Default::default()
    };
    validate_build_args(&args).unwrap();
    assert!(execute_build(args).is_err());
}

#[test]
fn test_validate_missing_input() {
    let args = FlattenArgs {
        input: "does/not/exist.json".into(),
        ..Default::default()
    };
    assert!(validate_flatten_args(&args).is_err());

    let args = BuildArgs {
        events: "does/not/exist.json".into(),
        ..Default::default()
    };
    assert!(validate_build_args(&args).is_err());
}
