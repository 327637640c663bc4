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

//! Test doubles for exercising evaluators and the coordinator without a real
//! debuggee.
//!
//! [`InMemoryDebuggee`] stands in for the native debugging layer: it serves
//! string reads from a map and answers live calls with scripted results.
//! [`RecordingEvaluator`] counts how often an expression node is evaluated,
//! which is how short-circuiting is observed.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{
    CompileContext, DebugValue, Debuggee, DebuggeeMemory, DebuggeeThread, DebuggeeValueFactory,
    ErrorSink, EvalCoordinator, EvalError, EvalSession, ExpressionEvaluator, LiveCall,
    LiveCallFault, ObjectAddress, RemoteValue, TypeSignature, ValueFactory,
};

/// Wraps an evaluator and counts its evaluations.
#[derive(Debug)]
pub struct RecordingEvaluator {
    inner: Box<dyn ExpressionEvaluator>,
    evaluations: Arc<AtomicUsize>,
}

impl RecordingEvaluator {
    /// Record evaluations of `inner`.
    pub fn new(inner: impl ExpressionEvaluator + 'static) -> Self {
        Self { inner: Box::new(inner), evaluations: Arc::new(AtomicUsize::new(0)) }
    }

    /// Shared counter of evaluations; stays valid after the evaluator is moved
    /// into a tree.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        self.evaluations.clone()
    }
}

impl ExpressionEvaluator for RecordingEvaluator {
    fn compile(
        &mut self,
        context: &dyn CompileContext,
        sink: &mut ErrorSink,
    ) -> Result<(), EvalError> {
        self.inner.compile(context, sink)
    }

    fn evaluate(
        &self,
        coordinator: &dyn EvalCoordinator,
        factory: &dyn ValueFactory,
        sink: &mut ErrorSink,
    ) -> Result<DebugValue, EvalError> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
        self.inner.evaluate(coordinator, factory, sink)
    }

    fn static_type(&self) -> &TypeSignature {
        self.inner.static_type()
    }
}

/// Leaf of a fixed type whose evaluation always fails.
#[derive(Debug, Clone)]
pub struct FailingEvaluator {
    ty: TypeSignature,
    error: EvalError,
}

impl FailingEvaluator {
    /// A leaf of type `ty` failing with `error`.
    pub fn new(ty: TypeSignature, error: EvalError) -> Self {
        Self { ty, error }
    }
}

impl ExpressionEvaluator for FailingEvaluator {
    fn compile(&mut self, _: &dyn CompileContext, _: &mut ErrorSink) -> Result<(), EvalError> {
        Ok(())
    }

    fn evaluate(
        &self,
        _: &dyn EvalCoordinator,
        _: &dyn ValueFactory,
        _: &mut ErrorSink,
    ) -> Result<DebugValue, EvalError> {
        Err(self.error.clone())
    }

    fn static_type(&self) -> &TypeSignature {
        &self.ty
    }
}

/// Compile context resolving live-call return types from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticCompileContext {
    calls: HashMap<String, TypeSignature>,
}

impl StaticCompileContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `target` returns `ty`.
    pub fn with_call(mut self, target: impl Into<String>, ty: TypeSignature) -> Self {
        self.calls.insert(target.into(), ty);
        self
    }
}

impl CompileContext for StaticCompileContext {
    fn resolve_call_type(&self, target: &str) -> Option<TypeSignature> {
        self.calls.get(target).cloned()
    }
}

/// Scripted stand-in for a paused debuggee.
#[derive(Debug, Default)]
pub struct InMemoryDebuggee {
    strings: Mutex<HashMap<ObjectAddress, String>>,
    calls: Mutex<HashMap<String, Result<RemoteValue, LiveCallFault>>>,
    executed: Mutex<Vec<(DebuggeeThread, String)>>,
    string_reads: AtomicUsize,
    call_delay: Mutex<Option<Duration>>,
}

impl InMemoryDebuggee {
    /// Create an empty debuggee.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a string object at `address`.
    pub fn with_string(self, address: ObjectAddress, content: impl Into<String>) -> Self {
        self.strings.lock().insert(address, content.into());
        self
    }

    /// Script the result of calling `target`.
    pub fn with_call(
        self,
        target: impl Into<String>,
        result: Result<RemoteValue, LiveCallFault>,
    ) -> Self {
        self.calls.lock().insert(target.into(), result);
        self
    }

    /// Make every live call take at least `delay`.
    pub fn with_call_delay(self, delay: Duration) -> Self {
        *self.call_delay.lock() = Some(delay);
        self
    }

    /// Number of string reads served so far.
    pub fn string_reads(&self) -> usize {
        self.string_reads.load(Ordering::SeqCst)
    }

    /// Live calls executed so far, oldest first.
    pub fn executed(&self) -> Vec<(DebuggeeThread, String)> {
        self.executed.lock().clone()
    }
}

impl DebuggeeMemory for InMemoryDebuggee {
    fn read_string(&self, address: ObjectAddress) -> Result<String, EvalError> {
        self.string_reads.fetch_add(1, Ordering::SeqCst);
        self.strings
            .lock()
            .get(&address)
            .cloned()
            .ok_or_else(|| EvalError::ValueUnavailable(format!("no string object at {address}")))
    }
}

impl Debuggee for InMemoryDebuggee {
    fn execute(
        &self,
        thread: DebuggeeThread,
        call: &LiveCall,
    ) -> Result<RemoteValue, LiveCallFault> {
        self.executed.lock().push((thread, call.target.clone()));
        let delay = *self.call_delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }
        self.calls
            .lock()
            .get(&call.target)
            .cloned()
            .unwrap_or_else(|| Err(LiveCallFault::Failed(format!("no such method '{}'", call.target))))
    }
}

/// Run the debuggee-control side of `session` on a background thread,
/// serving live calls from `debuggee` until the session is closed.
///
/// The handle yields the number of calls served.
pub fn spawn_control_thread(
    session: Arc<EvalSession>,
    debuggee: Arc<InMemoryDebuggee>,
) -> JoinHandle<usize> {
    thread::spawn(move || {
        let factory = DebuggeeValueFactory::new(debuggee.clone());
        let mut served = 0;
        while !session.is_closed() {
            match session.serve_one(debuggee.as_ref(), &factory, Some(Duration::from_millis(10))) {
                Ok(true) => served += 1,
                Ok(false) => {}
                // The inspection side may have given up on the call already.
                Err(e) => warn!("dropping live call outcome: {e}"),
            }
        }
        info!("control thread served {served} live calls");
        served
    })
}
