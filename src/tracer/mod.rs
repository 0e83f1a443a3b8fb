//! Capture hooks and the tracers that consume them.
//!
//! The host execution engine drives a tracer through a fixed callback
//! sequence for one transaction:
//!
//! ```text
//! start (step | fault | enter ... exit)* end
//! ```
//!
//! `enter`/`exit` pairs nest like parentheses. Two tracers are provided:
//! - [`CallTracer`] rebuilds the nested call tree
//! - [`VmTracer`] records top-level per-instruction costs as a VM trace

pub mod call_frame;
pub mod call_tracer;
pub mod events;
pub mod vm_tracer;

pub use call_frame::{CallFrame, CallKind};
pub use call_tracer::{CallTracer, TopLevelOp};
pub use events::{replay, CaptureEvent};
pub use vm_tracer::{
    code_fn, CodeFn, CodeSource, VmExecutedOperation, VmOp, VmTrace, VmTracer, VmTracerConfig,
    VmTracerResult,
};

use crate::utils::error::CaptureError;
use alloy_primitives::{Address, Bytes, U256};
use std::time::Duration;

/// Per-instruction context passed to `capture_state` and `capture_fault`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepContext {
    /// Program counter of the instruction
    pub pc: u64,

    /// Raw opcode byte
    pub op: u8,

    /// Gas remaining before the instruction
    pub gas: u64,

    /// Gas charged for the instruction
    pub cost: u64,

    /// Call depth, 1 for the outermost frame
    pub depth: usize,
}

/// Callbacks invoked by the host engine while a transaction executes
///
/// Every hook reports ordering violations as [`CaptureError`]. After the
/// first violation a tracer is poisoned and keeps returning that error.
pub trait CaptureHooks {
    fn capture_start(
        &mut self,
        from: Address,
        to: Address,
        create: bool,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> Result<(), CaptureError>;

    fn capture_state(
        &mut self,
        step: &StepContext,
        return_data: &[u8],
        err: Option<&str>,
    ) -> Result<(), CaptureError>;

    fn capture_fault(&mut self, step: &StepContext, err: Option<&str>) -> Result<(), CaptureError>;

    fn capture_enter(
        &mut self,
        kind: CallKind,
        from: Address,
        to: Address,
        input: Bytes,
        gas: u64,
        value: Option<U256>,
    ) -> Result<(), CaptureError>;

    fn capture_exit(
        &mut self,
        output: Bytes,
        gas_used: u64,
        err: Option<String>,
    ) -> Result<(), CaptureError>;

    fn capture_end(
        &mut self,
        output: Bytes,
        gas_used: u64,
        duration: Duration,
        err: Option<String>,
    ) -> Result<(), CaptureError>;
}

/// Lifecycle shared by both tracers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum CaptureState {
    #[default]
    Idle,
    Recording,
    Done,
    Failed(CaptureError),
}

impl CaptureState {
    /// Accept a `start` event
    pub(crate) fn begin(&mut self) -> Result<(), CaptureError> {
        let err = match self {
            Self::Idle => {
                *self = Self::Recording;
                return Ok(());
            }
            Self::Recording => CaptureError::AlreadyStarted,
            Self::Done => CaptureError::AlreadyFinished,
            Self::Failed(err) => return Err(err.clone()),
        };
        Err(self.fail(err))
    }

    /// Accept any event between `start` and `end`
    pub(crate) fn expect_recording(&mut self) -> Result<(), CaptureError> {
        let err = match self {
            Self::Recording => return Ok(()),
            Self::Idle => CaptureError::NotStarted,
            Self::Done => CaptureError::AlreadyFinished,
            Self::Failed(err) => return Err(err.clone()),
        };
        Err(self.fail(err))
    }

    /// Gate for `result()`
    pub(crate) fn expect_done(&self) -> Result<(), CaptureError> {
        match self {
            Self::Done => Ok(()),
            Self::Failed(err) => Err(err.clone()),
            Self::Idle | Self::Recording => Err(CaptureError::Incomplete),
        }
    }

    /// Poison the tracer, keeping the first violation
    pub(crate) fn fail(&mut self, err: CaptureError) -> CaptureError {
        if let Self::Failed(first) = self {
            return first.clone();
        }
        *self = Self::Failed(err.clone());
        err
    }
}
