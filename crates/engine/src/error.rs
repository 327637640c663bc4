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

//! Error types shared by the compiler, the evaluator and the coordinator.

use std::fmt;

use thiserror::Error;

/// Errors raised while compiling or evaluating an expression.
///
/// Compile-time variants ([`TypeMismatch`](Self::TypeMismatch),
/// [`NotSupported`](Self::NotSupported)) abort the whole compile; evaluation
/// variants abort the current evaluation. No partial value is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Operand types are incompatible with the operator
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// Operator/operand combination is not implemented, or live evaluation is disabled
    #[error("not supported: {0}")]
    NotSupported(String),
    /// Runtime failure such as a division by zero
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// A live call raised an exception or the debuggee-side machinery failed
    #[error("evaluation fault: {0}")]
    EvalFault(String),
    /// The underlying remote value can no longer be read
    #[error("value unavailable: {0}")]
    ValueUnavailable(String),
    /// Another live evaluation is still outstanding on the session
    #[error("a live evaluation is already in progress")]
    EvalInProgress,
    /// The expression was evaluated before it was successfully compiled
    #[error("expression has not been compiled")]
    NotCompiled,
}

impl EvalError {
    /// Whether this error was detected while compiling.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::TypeMismatch(_) | Self::NotSupported(_))
    }

    /// Whether this error comes from the live-evaluation machinery.
    pub fn is_eval_fault(&self) -> bool {
        matches!(self, Self::EvalFault(_) | Self::EvalInProgress)
    }
}

/// Diagnostic sink collecting human-readable failure causes.
///
/// The inspection layer prints these next to the expression source instead of
/// failing the whole breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSink {
    messages: Vec<String>,
}

impl ErrorSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message.
    pub fn report(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record an error and hand it back, for use in `Err(sink.fail(..))`.
    pub fn fail(&mut self, error: EvalError) -> EvalError {
        self.messages.push(error.to_string());
        error
    }

    /// All recorded messages, oldest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all recorded messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl fmt::Display for ErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("; "))
    }
}
