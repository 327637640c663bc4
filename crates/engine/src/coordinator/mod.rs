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

//! Cross-thread coordination of live evaluations.
//!
//! Running a property getter or method on the paused debuggee requires the
//! debuggee-control thread to resume the process and return from whatever
//! native callback it is in. Frame inspection and expression evaluation
//! therefore happen on a separate inspection thread, and the two threads meet
//! in an [`EvalSession`]:
//!
//! ```text
//!  inspection thread                        debuggee-control thread
//!  -----------------                        -----------------------
//!  request_eval(call)  ── Idle → AwaitingEval ──►  wait_for_request()
//!  wait_for_eval(handle)   (blocks)                 execute on debuggee
//!                      ◄── EvalComplete / EvalFaulted ── finish_eval()/fault_eval()
//!  (outcome consumed → Idle)
//!  signal_ready()      ─────────────────────────►  wait_for_ready()
//! ```
//!
//! At most one live evaluation is outstanding per session.

mod session;

pub use session::{EvalSession, SessionState};

use derive_more::{Display, From};

use crate::{DebugValue, EvalError, RemoteValue};

/// Identifier of a debuggee thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From)]
#[display("thread {}", _0)]
pub struct DebuggeeThread(pub u32);

/// Handle to one live evaluation requested on a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("eval#{}", _0)]
pub struct EvalHandle(u64);

impl EvalHandle {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// A method or property getter to run on the paused debuggee.
#[derive(Debug, Clone)]
pub struct LiveCall {
    /// Name of the method to invoke (e.g. `get_Count`)
    pub target: String,
    /// Instance the method is invoked on; `None` for static methods
    pub receiver: Option<DebugValue>,
    /// Arguments, in declaration order
    pub args: Vec<DebugValue>,
}

impl LiveCall {
    /// A call to `target` without receiver or arguments.
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into(), receiver: None, args: Vec::new() }
    }

    /// Set the instance the method is invoked on.
    pub fn with_receiver(mut self, receiver: DebugValue) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Append an argument.
    pub fn with_arg(mut self, arg: DebugValue) -> Self {
        self.args.push(arg);
        self
    }
}

/// Result of a completed live evaluation.
#[derive(Debug, Clone)]
pub enum EvalOutcome {
    /// The call returned a value
    Returned(DebugValue),
    /// The call threw; the value is the exception object
    Threw(DebugValue),
}

/// Inspection-side view of the coordinator, as used by expression evaluators.
pub trait EvalCoordinator: Send + Sync {
    /// Ask the debuggee-control side to run `call`.
    ///
    /// Fails with [`EvalError::EvalInProgress`] if another evaluation is
    /// outstanding and with [`EvalError::NotSupported`] if property evaluation
    /// is disabled.
    fn request_eval(&self, call: LiveCall) -> Result<EvalHandle, EvalError>;

    /// Block until the evaluation behind `handle` completes or faults.
    fn wait_for_eval(&self, handle: EvalHandle) -> Result<EvalOutcome, EvalError>;

    /// Tell the debuggee-control side that no further evaluation is needed.
    fn signal_ready(&self);

    /// Whether live calls are currently permitted.
    fn property_evaluation_enabled(&self) -> bool;
}

/// Failure of a live call at the native layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveCallFault {
    /// The call threw; carries the exception object
    Exception(RemoteValue),
    /// The debugging machinery failed before the call could complete
    Failed(String),
}

/// Debuggee-control side of a live call: the native layer that resumes the
/// debuggee to run code and reports the result.
pub trait Debuggee: Send + Sync {
    /// Run `call` on `thread` and wait for the debuggee to stop again.
    fn execute(&self, thread: DebuggeeThread, call: &LiveCall) -> Result<RemoteValue, LiveCallFault>;
}
