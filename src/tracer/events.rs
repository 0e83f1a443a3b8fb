//! Serializable capture event log.
//!
//! A recorded sequence of capture callbacks, one JSON object per event,
//! tagged by `"event"`:
//!
//! ```json
//! [
//!   {"event": "start", "from": "0x..", "to": "0x..", "gas": 100000},
//!   {"event": "step", "pc": 0, "op": 96, "gas": 100000, "cost": 3, "depth": 1},
//!   {"event": "enter", "type": "CALL", "from": "0x..", "to": "0x..", "gas": 5000},
//!   {"event": "exit", "gasUsed": 21},
//!   {"event": "end", "gasUsed": 24000}
//! ]
//! ```
//!
//! Replaying a log drives any [`CaptureHooks`] implementation exactly as
//! the host engine would.

use super::call_frame::CallKind;
use super::{CaptureHooks, StepContext};
use crate::utils::error::CaptureError;
use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One capture callback with its arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CaptureEvent {
    Start {
        from: Address,
        to: Address,
        #[serde(default)]
        create: bool,
        #[serde(default)]
        input: Bytes,
        gas: u64,
        #[serde(default)]
        value: U256,
    },
    Step {
        pc: u64,
        op: u8,
        gas: u64,
        cost: u64,
        depth: usize,
        #[serde(default)]
        return_data: Bytes,
        #[serde(default)]
        error: Option<String>,
    },
    Fault {
        pc: u64,
        op: u8,
        gas: u64,
        cost: u64,
        depth: usize,
        #[serde(default)]
        error: Option<String>,
    },
    Enter {
        #[serde(rename = "type")]
        kind: CallKind,
        from: Address,
        to: Address,
        #[serde(default)]
        input: Bytes,
        gas: u64,
        #[serde(default)]
        value: Option<U256>,
    },
    Exit {
        #[serde(default)]
        output: Bytes,
        gas_used: u64,
        #[serde(default)]
        error: Option<String>,
    },
    End {
        #[serde(default)]
        output: Bytes,
        gas_used: u64,
        /// Execution time in microseconds
        #[serde(default)]
        duration_us: u64,
        #[serde(default)]
        error: Option<String>,
    },
}

impl CaptureEvent {
    /// Invoke the matching hook on `hooks`
    pub fn apply<H: CaptureHooks + ?Sized>(&self, hooks: &mut H) -> Result<(), CaptureError> {
        match self {
            Self::Start {
                from,
                to,
                create,
                input,
                gas,
                value,
            } => hooks.capture_start(*from, *to, *create, input.clone(), *gas, *value),
            Self::Step {
                pc,
                op,
                gas,
                cost,
                depth,
                return_data,
                error,
            } => {
                let step = StepContext {
                    pc: *pc,
                    op: *op,
                    gas: *gas,
                    cost: *cost,
                    depth: *depth,
                };
                hooks.capture_state(&step, return_data, error.as_deref())
            }
            Self::Fault {
                pc,
                op,
                gas,
                cost,
                depth,
                error,
            } => {
                let step = StepContext {
                    pc: *pc,
                    op: *op,
                    gas: *gas,
                    cost: *cost,
                    depth: *depth,
                };
                hooks.capture_fault(&step, error.as_deref())
            }
            Self::Enter {
                kind,
                from,
                to,
                input,
                gas,
                value,
            } => hooks.capture_enter(*kind, *from, *to, input.clone(), *gas, *value),
            Self::Exit {
                output,
                gas_used,
                error,
            } => hooks.capture_exit(output.clone(), *gas_used, error.clone()),
            Self::End {
                output,
                gas_used,
                duration_us,
                error,
            } => hooks.capture_end(
                output.clone(),
                *gas_used,
                Duration::from_micros(*duration_us),
                error.clone(),
            ),
        }
    }
}

/// Feed every event into `hooks`, stopping at the first violation
pub fn replay<H: CaptureHooks + ?Sized>(
    events: &[CaptureEvent],
    hooks: &mut H,
) -> Result<(), CaptureError> {
    events.iter().try_for_each(|event| event.apply(hooks))
}
