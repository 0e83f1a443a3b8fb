//! Transcoding between the nested debug-style trace and the flat
//! Parity-style trace list.

pub mod flatten;
pub mod parity;

pub use flatten::{flatten, flatten_with_type, is_precompile_call, normalize_error, to_trace_results};
pub use parity::{FlatTraceEntry, TraceAction, TraceResult, TraceResults, VmTraceResults};

use crate::tracer::CallFrame;
use crate::utils::error::ParseError;
use log::debug;

/// Extract a call tree from a debug-style trace document
///
/// Accepted shapes:
/// - a bare `callTracer` frame
/// - a JSON-RPC response envelope `{"result": <frame>}`
/// - a one-element `debug_traceBlock*` list `[{"result": <frame>}]`
///
/// # Errors
/// * `ParseError::JsonError` - the frame does not match the schema
/// * `ParseError::InvalidFormat` - none of the shapes above
pub fn parse_call_frame(raw: &serde_json::Value) -> Result<CallFrame, ParseError> {
    match raw {
        serde_json::Value::Object(obj) => {
            if let Some(error) = obj.get("error").filter(|_| !obj.contains_key("type")) {
                return Err(ParseError::InvalidFormat(format!(
                    "Document carries an RPC error: {}",
                    error
                )));
            }
            if let Some(result) = obj.get("result") {
                debug!("Unwrapping JSON-RPC envelope");
                return parse_call_frame(result);
            }
            Ok(serde_json::from_value(raw.clone())?)
        }

        serde_json::Value::Array(items) => match items.as_slice() {
            [single] => parse_call_frame(single),
            _ => Err(ParseError::InvalidFormat(format!(
                "Expected exactly one transaction trace, found {}",
                items.len()
            ))),
        },

        _ => Err(ParseError::InvalidFormat(
            "Trace must be a JSON object or array".to_string(),
        )),
    }
}
