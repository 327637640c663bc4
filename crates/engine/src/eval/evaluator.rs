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

use std::fmt;

use crate::{DebugValue, ErrorSink, EvalCoordinator, EvalError, TypeSignature, ValueFactory};

/// Two-phase contract implemented by every expression node kind.
///
/// `compile` resolves static types bottom-up and binds whatever the node needs
/// at evaluation time. `evaluate` may then run any number of times against the
/// current debuggee state.
pub trait ExpressionEvaluator: fmt::Debug + Send + Sync {
    /// Resolve static types and bind the computation for this node and its
    /// children. Every failure is also reported to `sink`.
    fn compile(&mut self, context: &dyn CompileContext, sink: &mut ErrorSink)
        -> Result<(), EvalError>;

    /// Evaluate the node. Live calls go through `coordinator`; new values are
    /// created through `factory`.
    fn evaluate(
        &self,
        coordinator: &dyn EvalCoordinator,
        factory: &dyn ValueFactory,
        sink: &mut ErrorSink,
    ) -> Result<DebugValue, EvalError>;

    /// Static type of the node. Only meaningful after a successful compile.
    fn static_type(&self) -> &TypeSignature;
}

/// Type-resolution context consulted while compiling.
pub trait CompileContext {
    /// Return type of the method or property getter named `target`, if known.
    fn resolve_call_type(&self, target: &str) -> Option<TypeSignature>;
}

/// A context that resolves nothing. Enough for expressions made only of
/// literals and operators.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCompileContext;

impl CompileContext for EmptyCompileContext {
    fn resolve_call_type(&self, _target: &str) -> Option<TypeSignature> {
        None
    }
}
