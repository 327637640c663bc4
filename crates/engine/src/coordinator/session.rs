// MDB - Managed Debugger
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use std::time::{Duration, Instant};

use mdb_common::DebuggerConfig;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use super::{
    Debuggee, DebuggeeThread, EvalCoordinator, EvalHandle, EvalOutcome, LiveCall, LiveCallFault,
};
use crate::{DebugValue, EvalError, ValueFactory};

/// Observable state of the live-evaluation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No evaluation outstanding
    Idle,
    /// An evaluation was requested and has not finished yet
    AwaitingEval,
    /// The evaluation returned; the value waits to be consumed
    EvalComplete,
    /// The evaluation threw or failed; the fault waits to be consumed
    EvalFaulted,
}

#[derive(Debug)]
enum Slot {
    Idle,
    /// `call` is taken by the control side when it starts running. An
    /// abandoned evaluation timed out while running and keeps the session
    /// busy until its late outcome arrives.
    AwaitingEval { handle: EvalHandle, call: Option<LiveCall>, abandoned: bool },
    EvalComplete { handle: EvalHandle, value: DebugValue },
    EvalFaulted { handle: EvalHandle, exception: Option<DebugValue>, reason: String },
}

#[derive(Debug)]
struct Inner {
    slot: Slot,
    next_handle: u64,
    ready: bool,
    property_evaluation: bool,
    active_thread: Option<DebuggeeThread>,
    closed: bool,
}

impl Inner {
    fn is_awaiting(&self, handle: EvalHandle) -> bool {
        matches!(self.slot, Slot::AwaitingEval { handle: h, .. } if h == handle)
    }

    fn is_abandoned(&self, handle: EvalHandle) -> bool {
        matches!(self.slot, Slot::AwaitingEval { handle: h, abandoned: true, .. } if h == handle)
    }

    fn take_pending(&mut self) -> Option<(EvalHandle, LiveCall)> {
        match &mut self.slot {
            Slot::AwaitingEval { handle, call, .. } => call.take().map(|call| (*handle, call)),
            _ => None,
        }
    }

    fn take_outcome(&mut self) -> Result<EvalOutcome, EvalError> {
        match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::EvalComplete { value, .. } => Ok(EvalOutcome::Returned(value)),
            Slot::EvalFaulted { exception: Some(exception), .. } => {
                Ok(EvalOutcome::Threw(exception))
            }
            Slot::EvalFaulted { exception: None, reason, .. } => Err(EvalError::EvalFault(reason)),
            other => {
                self.slot = other;
                Err(EvalError::InvalidOperation("no evaluation outcome to consume".into()))
            }
        }
    }
}

/// Coordinator state for one inspection pass over one debuggee thread.
///
/// Created when the debugger attaches a thread for inspection and closed when
/// the pass completes or the debuggee resumes. Shared between the inspection
/// and debuggee-control threads, typically behind an `Arc`.
#[derive(Debug)]
pub struct EvalSession {
    inner: Mutex<Inner>,
    eval_signal: Condvar,
    ready_signal: Condvar,
    eval_timeout: Option<Duration>,
}

impl EvalSession {
    /// Create a session for `thread` configured from `config`.
    pub fn new(thread: DebuggeeThread, config: &DebuggerConfig) -> Self {
        debug!(%thread, property_evaluation = config.property_evaluation, "opening evaluation session");
        Self {
            inner: Mutex::new(Inner {
                slot: Slot::Idle,
                next_handle: 1,
                ready: false,
                property_evaluation: config.property_evaluation,
                active_thread: Some(thread),
                closed: false,
            }),
            eval_signal: Condvar::new(),
            ready_signal: Condvar::new(),
            eval_timeout: config.eval_timeout(),
        }
    }

    /// Current state of the evaluation slot.
    pub fn state(&self) -> SessionState {
        match self.inner.lock().slot {
            Slot::Idle => SessionState::Idle,
            Slot::AwaitingEval { .. } => SessionState::AwaitingEval,
            Slot::EvalComplete { .. } => SessionState::EvalComplete,
            Slot::EvalFaulted { .. } => SessionState::EvalFaulted,
        }
    }

    /// Whether an evaluation has been requested and not finished yet.
    pub fn waiting_for_eval(&self) -> bool {
        matches!(self.inner.lock().slot, Slot::AwaitingEval { .. })
    }

    /// Enable or disable live property and method evaluation.
    pub fn set_property_evaluation(&self, enabled: bool) {
        self.inner.lock().property_evaluation = enabled;
    }

    /// Debuggee thread live calls run on.
    pub fn active_thread(&self) -> Option<DebuggeeThread> {
        self.inner.lock().active_thread
    }

    /// Switch the debuggee thread live calls run on.
    pub fn set_active_thread(&self, thread: DebuggeeThread) {
        self.inner.lock().active_thread = Some(thread);
    }

    /// Whether the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Block until an evaluation is requested and take its call.
    ///
    /// Returns `None` when `timeout` elapses or the session is closed.
    pub fn wait_for_request(&self, timeout: Option<Duration>) -> Option<(EvalHandle, LiveCall)> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut inner = self.inner.lock();
        loop {
            if inner.closed {
                return None;
            }
            if let Some(pending) = inner.take_pending() {
                trace!(handle = %pending.0, method = %pending.1.target, "picked up live call");
                return Some(pending);
            }
            match deadline {
                Some(deadline) => {
                    if self.eval_signal.wait_until(&mut inner, deadline).timed_out() {
                        return inner.take_pending();
                    }
                }
                None => self.eval_signal.wait(&mut inner),
            }
        }
    }

    /// Publish the value returned by the evaluation behind `handle`.
    pub fn finish_eval(&self, handle: EvalHandle, value: DebugValue) -> Result<(), EvalError> {
        let mut inner = self.awaiting(handle)?;
        if inner.is_abandoned(handle) {
            self.release_abandoned(&mut inner, handle);
            return Ok(());
        }
        debug!(%handle, "live evaluation complete");
        inner.slot = Slot::EvalComplete { handle, value };
        self.eval_signal.notify_all();
        Ok(())
    }

    /// Publish the exception thrown by the evaluation behind `handle`.
    pub fn fault_eval(&self, handle: EvalHandle, exception: DebugValue) -> Result<(), EvalError> {
        let mut inner = self.awaiting(handle)?;
        if inner.is_abandoned(handle) {
            self.release_abandoned(&mut inner, handle);
            return Ok(());
        }
        debug!(%handle, exception = %exception.static_type(), "live evaluation threw");
        inner.slot = Slot::EvalFaulted {
            handle,
            exception: Some(exception),
            reason: "live call threw an exception".into(),
        };
        self.eval_signal.notify_all();
        Ok(())
    }

    /// Report that the evaluation behind `handle` failed at the native layer.
    pub fn abort_eval(&self, handle: EvalHandle, reason: impl Into<String>) -> Result<(), EvalError> {
        let mut inner = self.awaiting(handle)?;
        if inner.is_abandoned(handle) {
            self.release_abandoned(&mut inner, handle);
            return Ok(());
        }
        let reason = reason.into();
        warn!(%handle, %reason, "live evaluation failed");
        inner.slot = Slot::EvalFaulted { handle, exception: None, reason };
        self.eval_signal.notify_all();
        Ok(())
    }

    /// Serve one live call: wait for a request, run it on `debuggee` and
    /// publish the outcome. Returns `false` if no request arrived in time.
    pub fn serve_one(
        &self,
        debuggee: &dyn Debuggee,
        factory: &dyn ValueFactory,
        timeout: Option<Duration>,
    ) -> Result<bool, EvalError> {
        let Some((handle, call)) = self.wait_for_request(timeout) else {
            return Ok(false);
        };
        let Some(thread) = self.active_thread() else {
            self.abort_eval(handle, "no active debuggee thread")?;
            return Ok(true);
        };

        match debuggee.execute(thread, &call) {
            Ok(value) => self.finish_eval(handle, factory.create_value(value))?,
            Err(LiveCallFault::Exception(exception)) => {
                self.fault_eval(handle, factory.create_value(exception))?
            }
            Err(LiveCallFault::Failed(reason)) => self.abort_eval(handle, reason)?,
        }
        Ok(true)
    }

    /// Block until the inspection side signals that it is ready, consuming
    /// the signal. Returns `false` on timeout or if the session is closed.
    pub fn wait_for_ready(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut inner = self.inner.lock();
        while !inner.ready {
            if inner.closed {
                return false;
            }
            match deadline {
                Some(deadline) => {
                    if self.ready_signal.wait_until(&mut inner, deadline).timed_out() {
                        break;
                    }
                }
                None => self.ready_signal.wait(&mut inner),
            }
        }
        std::mem::take(&mut inner.ready)
    }

    /// Tear the session down. An outstanding evaluation faults and every
    /// waiter wakes up.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        inner.closed = true;
        if let Slot::AwaitingEval { handle, abandoned, .. } = inner.slot {
            if abandoned {
                // Nobody waits for an abandoned outcome.
                inner.slot = Slot::Idle;
            } else {
                warn!(%handle, "closing session with an outstanding live evaluation");
                inner.slot = Slot::EvalFaulted {
                    handle,
                    exception: None,
                    reason: "evaluation session closed".into(),
                };
            }
        }
        debug!("evaluation session closed");
        self.eval_signal.notify_all();
        self.ready_signal.notify_all();
    }

    fn awaiting(&self, handle: EvalHandle) -> Result<MutexGuard<'_, Inner>, EvalError> {
        let inner = self.inner.lock();
        if inner.is_awaiting(handle) {
            Ok(inner)
        } else {
            Err(EvalError::InvalidOperation(format!("{handle} is not outstanding")))
        }
    }

    fn release_abandoned(&self, inner: &mut Inner, handle: EvalHandle) {
        debug!(%handle, "dropping outcome of abandoned live evaluation");
        inner.slot = Slot::Idle;
        self.eval_signal.notify_all();
    }
}

impl EvalCoordinator for EvalSession {
    fn request_eval(&self, call: LiveCall) -> Result<EvalHandle, EvalError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(EvalError::EvalFault("evaluation session closed".into()));
        }
        if !inner.property_evaluation {
            return Err(EvalError::NotSupported("property evaluation is disabled".into()));
        }
        if !matches!(inner.slot, Slot::Idle) {
            return Err(EvalError::EvalInProgress);
        }

        let handle = EvalHandle::new(inner.next_handle);
        inner.next_handle += 1;
        debug!(%handle, method = %call.target, "live evaluation requested");
        inner.slot = Slot::AwaitingEval { handle, call: Some(call), abandoned: false };
        self.eval_signal.notify_all();
        Ok(handle)
    }

    fn wait_for_eval(&self, handle: EvalHandle) -> Result<EvalOutcome, EvalError> {
        let deadline = self.eval_timeout.map(|t| Instant::now() + t);
        let mut inner = self.inner.lock();
        loop {
            let finished = match inner.slot {
                Slot::AwaitingEval { handle: h, abandoned: false, .. } if h == handle => false,
                Slot::AwaitingEval { handle: h, abandoned: true, .. } if h == handle => {
                    return Err(EvalError::EvalFault(format!("{handle} timed out")))
                }
                Slot::EvalComplete { handle: h, .. } | Slot::EvalFaulted { handle: h, .. }
                    if h == handle =>
                {
                    true
                }
                _ => {
                    return Err(EvalError::InvalidOperation(format!("{handle} is not outstanding")))
                }
            };
            if finished {
                return inner.take_outcome();
            }

            match deadline {
                Some(deadline) => {
                    if self.eval_signal.wait_until(&mut inner, deadline).timed_out()
                        && inner.is_awaiting(handle)
                    {
                        let running = matches!(inner.slot, Slot::AwaitingEval { call: None, .. });
                        if !running {
                            warn!(%handle, "live evaluation timed out before it started");
                            inner.slot = Slot::Idle;
                        } else if let Slot::AwaitingEval { abandoned, .. } = &mut inner.slot {
                            // The debuggee is still running the call.
                            warn!(%handle, "live evaluation timed out while running");
                            *abandoned = true;
                        }
                        return Err(EvalError::EvalFault(format!("{handle} timed out")));
                    }
                }
                None => self.eval_signal.wait(&mut inner),
            }
        }
    }

    fn signal_ready(&self) {
        self.inner.lock().ready = true;
        trace!("inspection side ready");
        self.ready_signal.notify_all();
    }

    fn property_evaluation_enabled(&self) -> bool {
        self.inner.lock().property_evaluation
    }
}
