//! VM-level tracer recording per-instruction cost and program counter.
//!
//! Traces live in an arena and the call stack holds arena indices, so
//! ascending on `exit` is a pop and no node points back at its parent.
//! A child trace is linked as the `sub` of the op that was last appended
//! to the current trace when the child was entered.

use super::call_frame::CallKind;
use super::{CaptureHooks, CaptureState, StepContext};
use crate::utils::error::CaptureError;
use alloy_primitives::{Address, Bytes, U256};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Bytecode lookup supplied by the host state
pub trait CodeSource {
    fn code_at(&self, address: &Address) -> Bytes;
}

impl CodeSource for HashMap<Address, Bytes> {
    fn code_at(&self, address: &Address) -> Bytes {
        self.get(address).cloned().unwrap_or_default()
    }
}

impl<T: CodeSource + ?Sized> CodeSource for &T {
    fn code_at(&self, address: &Address) -> Bytes {
        (**self).code_at(address)
    }
}

/// [`CodeSource`] backed by a closure, see [`code_fn`]
#[derive(Clone, Copy)]
pub struct CodeFn<F>(F);

/// Wrap `f` so it can serve bytecode lookups
pub fn code_fn<F: Fn(&Address) -> Bytes>(f: F) -> CodeFn<F> {
    CodeFn(f)
}

impl<F: Fn(&Address) -> Bytes> CodeSource for CodeFn<F> {
    fn code_at(&self, address: &Address) -> Bytes {
        (self.0)(address)
    }
}

/// Nested VM trace: the code of one frame and the ops executed in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmTrace {
    pub code: Bytes,
    pub ops: Vec<VmOp>,
}

/// One executed instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmOp {
    pub cost: u64,

    /// Execution details, when recorded
    #[serde(default)]
    pub ex: Option<VmExecutedOperation>,

    pub pc: u64,

    /// Trace of the call frame opened by this instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<VmTrace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmExecutedOperation {
    /// Gas left once the instruction's cost is charged
    pub used: u64,
}

/// Options for [`VmTracer`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VmTracerConfig {
    /// Also record steps of nested frames into their own sub-traces
    pub nested_ops: bool,
}

/// Serialized outcome of a [`VmTracer`] run
///
/// Also reads the plugin recorder's untagged field names (`Output`,
/// `Costs`, `PCs`, and `GasUsed` as one entry per `end`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VmTracerResult {
    #[serde(alias = "Output")]
    pub output: Bytes,
    #[serde(alias = "GasUsed", deserialize_with = "gas_used_or_last")]
    pub gas_used: u64,

    /// Depth-1 costs, parallel to `pcs`
    #[serde(alias = "Costs")]
    pub costs: Vec<u64>,
    #[serde(alias = "PCs")]
    pub pcs: Vec<u64>,
    pub op_codes: Vec<u8>,
    pub fault_ops: Vec<u8>,
    pub step_count: usize,
    pub max_depth: usize,
    pub vm_trace: VmTrace,
}

impl VmTracerResult {
    /// Top-level ops, rebuilt from `costs`/`pcs` when no trace tree was sent
    pub fn top_level_ops(&self) -> Vec<VmOp> {
        if !self.vm_trace.ops.is_empty() || self.costs.is_empty() {
            return self.vm_trace.ops.clone();
        }
        self.costs
            .iter()
            .zip(&self.pcs)
            .map(|(&cost, &pc)| VmOp {
                cost,
                ex: None,
                pc,
                sub: None,
            })
            .collect()
    }
}

fn gas_used_or_last<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum GasUsed {
        Single(u64),
        PerEnd(Vec<u64>),
    }

    Ok(match GasUsed::deserialize(deserializer)? {
        GasUsed::Single(gas) => gas,
        GasUsed::PerEnd(all) => all.last().copied().unwrap_or_default(),
    })
}

#[derive(Debug, Default)]
struct PendingTrace {
    code: Bytes,
    ops: Vec<PendingOp>,
}

#[derive(Debug)]
struct PendingOp {
    cost: u64,
    pc: u64,
    used: u64,
    sub: Option<usize>,
}

/// Instruction-level tracer producing a [`VmTrace`]
pub struct VmTracer<C> {
    code_source: C,
    config: VmTracerConfig,
    state: CaptureState,

    /// Arena of traces, the root at index 0
    traces: Vec<PendingTrace>,

    /// Indices into `traces` of the open frames
    stack: Vec<usize>,

    costs: Vec<u64>,
    pcs: Vec<u64>,
    op_codes: Vec<u8>,
    fault_ops: Vec<u8>,
    step_count: usize,
    max_depth: usize,
    detached: usize,
    output: Bytes,
    gas_used: u64,
}

impl<C: CodeSource> VmTracer<C> {
    pub fn new(code_source: C) -> Self {
        Self::with_config(code_source, VmTracerConfig::default())
    }

    pub fn with_config(code_source: C, config: VmTracerConfig) -> Self {
        Self {
            code_source,
            config,
            state: CaptureState::Idle,
            traces: Vec::new(),
            stack: Vec::new(),
            costs: Vec::new(),
            pcs: Vec::new(),
            op_codes: Vec::new(),
            fault_ops: Vec::new(),
            step_count: 0,
            max_depth: 0,
            detached: 0,
            output: Bytes::new(),
            gas_used: 0,
        }
    }

    /// Child traces that had no op to hang from and were left out
    pub fn detached_traces(&self) -> usize {
        self.detached
    }

    /// Assemble the recorded VM trace
    ///
    /// # Errors
    /// * `CaptureError::Incomplete` - `end` has not been processed
    /// * any ordering violation recorded earlier
    pub fn result(&self) -> Result<VmTracerResult, CaptureError> {
        self.state.expect_done()?;

        Ok(VmTracerResult {
            output: self.output.clone(),
            gas_used: self.gas_used,
            costs: self.costs.clone(),
            pcs: self.pcs.clone(),
            op_codes: self.op_codes.clone(),
            fault_ops: self.fault_ops.clone(),
            step_count: self.step_count,
            max_depth: self.max_depth,
            vm_trace: self.assemble(0),
        })
    }

    fn assemble(&self, index: usize) -> VmTrace {
        let Some(trace) = self.traces.get(index) else {
            return VmTrace::default();
        };

        VmTrace {
            code: trace.code.clone(),
            ops: trace
                .ops
                .iter()
                .map(|op| VmOp {
                    cost: op.cost,
                    ex: Some(VmExecutedOperation { used: op.used }),
                    pc: op.pc,
                    sub: op.sub.map(|child| self.assemble(child)),
                })
                .collect(),
        }
    }

    fn push_op(&mut self, trace: usize, step: &StepContext) {
        if let Some(trace) = self.traces.get_mut(trace) {
            trace.ops.push(PendingOp {
                cost: step.cost,
                pc: step.pc,
                used: step.gas.saturating_sub(step.cost),
                sub: None,
            });
        }
    }
}

impl<C: CodeSource> CaptureHooks for VmTracer<C> {
    fn capture_start(
        &mut self,
        _from: Address,
        to: Address,
        _create: bool,
        _input: Bytes,
        _gas: u64,
        _value: U256,
    ) -> Result<(), CaptureError> {
        self.state.begin()?;

        self.traces = vec![PendingTrace {
            code: self.code_source.code_at(&to),
            ops: Vec::new(),
        }];
        self.stack = vec![0];
        self.costs.clear();
        self.pcs.clear();
        self.op_codes.clear();
        self.fault_ops.clear();
        self.step_count = 0;
        self.max_depth = 0;
        self.detached = 0;
        Ok(())
    }

    fn capture_state(
        &mut self,
        step: &StepContext,
        _return_data: &[u8],
        _err: Option<&str>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        self.step_count += 1;
        self.max_depth = self.max_depth.max(step.depth);

        if step.depth == 1 {
            self.op_codes.push(step.op);
            self.costs.push(step.cost);
            self.pcs.push(step.pc);
            self.push_op(0, step);
        } else if self.config.nested_ops {
            if let Some(&trace) = self.stack.get(step.depth.saturating_sub(1)) {
                self.push_op(trace, step);
            }
        }
        Ok(())
    }

    fn capture_fault(&mut self, step: &StepContext, _err: Option<&str>) -> Result<(), CaptureError> {
        self.state.expect_recording()?;
        self.fault_ops.push(step.op);
        Ok(())
    }

    fn capture_enter(
        &mut self,
        _kind: CallKind,
        _from: Address,
        to: Address,
        _input: Bytes,
        _gas: u64,
        _value: Option<U256>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        let Some(&current) = self.stack.last() else {
            return Err(self.state.fail(CaptureError::EmptyStack));
        };

        let child = self.traces.len();
        self.traces.push(PendingTrace {
            code: self.code_source.code_at(&to),
            ops: Vec::new(),
        });

        match self.traces[current].ops.last_mut() {
            Some(op) => op.sub = Some(child),
            None => {
                debug!("No op to attach sub-trace for {} at depth {}", to, self.stack.len() + 1);
                self.detached += 1;
            }
        }

        self.stack.push(child);
        Ok(())
    }

    fn capture_exit(
        &mut self,
        _output: Bytes,
        _gas_used: u64,
        _err: Option<String>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        if self.stack.len() < 2 {
            return Err(self.state.fail(CaptureError::UnmatchedExit));
        }
        self.stack.pop();
        Ok(())
    }

    fn capture_end(
        &mut self,
        output: Bytes,
        gas_used: u64,
        _duration: Duration,
        _err: Option<String>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        if self.stack.len() != 1 {
            let unclosed = self.stack.len().saturating_sub(1);
            return Err(self.state.fail(CaptureError::UnclosedFrames(unclosed)));
        }

        self.stack.clear();
        self.output = output;
        self.gas_used = gas_used;
        self.state = CaptureState::Done;

        debug!(
            "VM trace ended: {} top-level ops, {} steps, {} detached sub-traces",
            self.costs.len(),
            self.step_count,
            self.detached
        );
        Ok(())
    }
}
