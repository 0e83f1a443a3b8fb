//! Rebuild the nested call tree from linear capture events.
//!
//! The tracer keeps an explicit stack of open frames:
//! - `enter` pushes a new frame
//! - `exit` pops the top frame and appends it to the new top's `calls`
//! - `end` finalizes the root, which must be the only frame left
//!
//! Example: `start(A→B) enter(B→C) enter(C→D) exit exit end` yields
//! `A→B { B→C { C→D } }`.

use super::call_frame::{CallFrame, CallKind};
use super::{CaptureHooks, CaptureState, StepContext};
use crate::feed::Feed;
use crate::utils::error::CaptureError;
use alloy_primitives::{Address, Bytes, U256};
use log::debug;
use std::time::Duration;

/// One instruction executed by the outermost frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopLevelOp {
    pub op: u8,
    pub cost: u64,
    pub pc: u64,
}

/// Call-level tracer producing a [`CallFrame`] tree
///
/// One instance traces exactly one transaction. Construct a fresh tracer
/// for the next one.
#[derive(Default)]
pub struct CallTracer {
    state: CaptureState,

    /// Open frames, root at index 0
    stack: Vec<CallFrame>,

    /// Completed root, set by `end`
    root: Option<CallFrame>,

    top_level_ops: Vec<TopLevelOp>,
    fault_ops: Vec<u8>,
    step_count: usize,
    max_depth: usize,

    /// Optional publisher notified with every completed tree
    feed: Option<Feed>,
}

impl CallTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the completed tree to `feed` when the capture ends
    pub fn with_feed(feed: Feed) -> Self {
        Self {
            feed: Some(feed),
            ..Self::default()
        }
    }

    /// Borrow the completed root frame
    ///
    /// # Errors
    /// * `CaptureError::Incomplete` - `end` has not been processed
    /// * any ordering violation recorded earlier
    pub fn result(&self) -> Result<&CallFrame, CaptureError> {
        self.state.expect_done()?;
        self.root.as_ref().ok_or(CaptureError::Incomplete)
    }

    /// Consume the tracer and return the completed root frame
    pub fn into_result(self) -> Result<CallFrame, CaptureError> {
        self.state.expect_done()?;
        self.root.ok_or(CaptureError::Incomplete)
    }

    /// Instructions executed at depth 1, in order
    pub fn top_level_ops(&self) -> &[TopLevelOp] {
        &self.top_level_ops
    }

    /// Opcodes reported through `capture_fault`
    pub fn fault_ops(&self) -> &[u8] {
        &self.fault_ops
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of frames currently open
    pub fn open_frames(&self) -> usize {
        self.stack.len()
    }
}

impl CaptureHooks for CallTracer {
    fn capture_start(
        &mut self,
        from: Address,
        to: Address,
        create: bool,
        input: Bytes,
        gas: u64,
        value: U256,
    ) -> Result<(), CaptureError> {
        self.state.begin()?;

        let kind = if create { CallKind::Create } else { CallKind::Call };
        self.stack = vec![CallFrame::new(kind, from, to, input, gas, Some(value))];
        self.root = None;
        self.top_level_ops.clear();
        self.fault_ops.clear();
        self.step_count = 0;
        self.max_depth = 0;

        debug!("Capture started: {} {} -> {}", kind, from, to);
        Ok(())
    }

    fn capture_state(
        &mut self,
        step: &StepContext,
        _return_data: &[u8],
        _err: Option<&str>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        if step.depth == 1 {
            self.top_level_ops.push(TopLevelOp {
                op: step.op,
                cost: step.cost,
                pc: step.pc,
            });
        }
        self.step_count += 1;
        self.max_depth = self.max_depth.max(step.depth);
        Ok(())
    }

    fn capture_fault(&mut self, step: &StepContext, _err: Option<&str>) -> Result<(), CaptureError> {
        self.state.expect_recording()?;
        self.fault_ops.push(step.op);
        Ok(())
    }

    fn capture_enter(
        &mut self,
        kind: CallKind,
        from: Address,
        to: Address,
        input: Bytes,
        gas: u64,
        value: Option<U256>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        if self.stack.is_empty() {
            return Err(self.state.fail(CaptureError::EmptyStack));
        }

        self.stack
            .push(CallFrame::new(kind, from, to, input, gas, value));
        Ok(())
    }

    fn capture_exit(
        &mut self,
        output: Bytes,
        gas_used: u64,
        err: Option<String>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        // The root is closed by `end`, never by `exit`
        if self.stack.len() < 2 {
            return Err(self.state.fail(CaptureError::UnmatchedExit));
        }

        let Some(mut frame) = self.stack.pop() else {
            return Err(self.state.fail(CaptureError::UnmatchedExit));
        };
        frame.output = output;
        frame.gas_used = gas_used;
        frame.error = err.filter(|e| !e.is_empty());

        if let Some(parent) = self.stack.last_mut() {
            parent.calls.push(frame);
        }
        Ok(())
    }

    fn capture_end(
        &mut self,
        output: Bytes,
        gas_used: u64,
        duration: Duration,
        err: Option<String>,
    ) -> Result<(), CaptureError> {
        self.state.expect_recording()?;

        if self.stack.len() != 1 {
            let unclosed = self.stack.len().saturating_sub(1);
            return Err(self.state.fail(CaptureError::UnclosedFrames(unclosed)));
        }

        let Some(mut root) = self.stack.pop() else {
            return Err(self.state.fail(CaptureError::EmptyStack));
        };
        root.output = output;
        root.gas_used = gas_used;
        root.time = Some(format!("{:?}", duration));
        root.error = err.filter(|e| !e.is_empty());

        debug!(
            "Capture ended: {} frames, {} steps, max depth {}, {} faults",
            root.node_count(),
            self.step_count,
            self.max_depth,
            self.fault_ops.len()
        );

        if let Some(feed) = &self.feed {
            let delivered = feed.send(root.clone());
            debug!("Published call tree to {} subscriber(s)", delivered);
        }

        self.root = Some(root);
        self.state = CaptureState::Done;
        Ok(())
    }
}
