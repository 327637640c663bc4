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

use tracing::debug;

use super::{CompileContext, ExpressionEvaluator};
use crate::{
    DebugValue, ErrorSink, EvalCoordinator, EvalError, EvalOutcome, LiveCall, TypeSignature,
    ValueFactory,
};

/// Leaf that runs a method or property getter on the paused debuggee.
///
/// The call is carried out by the debuggee-control thread; this node only
/// requests it through the [`EvalCoordinator`] and blocks for the outcome.
#[derive(Debug)]
pub struct LiveCallEvaluator {
    target: String,
    receiver: Option<Box<dyn ExpressionEvaluator>>,
    args: Vec<Box<dyn ExpressionEvaluator>>,
    result_type: TypeSignature,
    compiled: bool,
}

impl LiveCallEvaluator {
    /// A call to the static method `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            receiver: None,
            args: Vec::new(),
            result_type: TypeSignature::default(),
            compiled: false,
        }
    }

    /// Invoke the method on the value of `receiver`.
    pub fn with_receiver(mut self, receiver: Box<dyn ExpressionEvaluator>) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Append an argument expression.
    pub fn with_arg(mut self, arg: Box<dyn ExpressionEvaluator>) -> Self {
        self.args.push(arg);
        self
    }

    /// Name of the invoked method.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl ExpressionEvaluator for LiveCallEvaluator {
    fn compile(
        &mut self,
        context: &dyn CompileContext,
        sink: &mut ErrorSink,
    ) -> Result<(), EvalError> {
        self.compiled = false;
        if let Some(receiver) = &mut self.receiver {
            receiver.compile(context, sink)?;
        }
        for arg in &mut self.args {
            arg.compile(context, sink)?;
        }

        self.result_type = context.resolve_call_type(&self.target).ok_or_else(|| {
            sink.fail(EvalError::NotSupported(format!(
                "cannot resolve the return type of '{}'",
                self.target
            )))
        })?;
        self.compiled = true;
        Ok(())
    }

    fn evaluate(
        &self,
        coordinator: &dyn EvalCoordinator,
        factory: &dyn ValueFactory,
        sink: &mut ErrorSink,
    ) -> Result<DebugValue, EvalError> {
        if !self.compiled {
            return Err(EvalError::NotCompiled);
        }
        if !coordinator.property_evaluation_enabled() {
            return Err(sink.fail(EvalError::NotSupported(format!(
                "cannot call '{}' while property evaluation is disabled",
                self.target
            ))));
        }

        let mut call = LiveCall::new(self.target.as_str());
        if let Some(receiver) = &self.receiver {
            let value = receiver.evaluate(coordinator, factory, sink).inspect_err(|_| {
                sink.report(format!("failed to evaluate the receiver of '{}'", self.target));
            })?;
            call = call.with_receiver(value);
        }
        for (index, arg) in self.args.iter().enumerate() {
            let value = arg.evaluate(coordinator, factory, sink).inspect_err(|_| {
                sink.report(format!("failed to evaluate argument {index} of '{}'", self.target));
            })?;
            call = call.with_arg(value);
        }

        let handle = coordinator.request_eval(call).map_err(|e| sink.fail(e))?;
        match coordinator.wait_for_eval(handle).map_err(|e| sink.fail(e))? {
            EvalOutcome::Returned(value) => Ok(value),
            EvalOutcome::Threw(exception) => {
                debug!(method = %self.target, exception = %exception.static_type(), "live call threw");
                Err(sink.fail(EvalError::EvalFault(format!(
                    "'{}' threw {}",
                    self.target,
                    exception.static_type()
                ))))
            }
        }
    }

    fn static_type(&self) -> &TypeSignature {
        &self.result_type
    }
}

#[cfg(test)]
mod tests {
    use mdb_common::DebuggerConfig;

    use super::*;
    use crate::{
        test_utils::{FailingEvaluator, StaticCompileContext},
        DebuggeeThread, DebuggeeValueFactory, ElementKind, EvalSession, LiteralEvaluator,
        SessionState,
    };

    fn compiled(mut call: LiveCallEvaluator) -> LiveCallEvaluator {
        let context =
            StaticCompileContext::new().with_call("Lookup", TypeSignature::of(ElementKind::I32));
        call.compile(&context, &mut ErrorSink::new()).unwrap();
        call
    }

    fn unavailable() -> Box<dyn ExpressionEvaluator> {
        Box::new(FailingEvaluator::new(
            TypeSignature::class("Contoso.Cache"),
            EvalError::ValueUnavailable("variable optimized away".into()),
        ))
    }

    #[test]
    fn test_receiver_failure_is_reported() {
        let call = compiled(LiveCallEvaluator::new("Lookup").with_receiver(unavailable()));
        let session = EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default());
        let mut sink = ErrorSink::new();

        let err = call.evaluate(&session, &DebuggeeValueFactory::detached(), &mut sink).unwrap_err();
        assert!(matches!(err, EvalError::ValueUnavailable(_)));
        assert_eq!(sink.messages(), ["failed to evaluate the receiver of 'Lookup'"]);
        // Nothing reached the debuggee side.
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_argument_failure_names_the_argument() {
        let call = compiled(
            LiveCallEvaluator::new("Lookup")
                .with_arg(Box::new(LiteralEvaluator::primitive(7i32)))
                .with_arg(unavailable()),
        );
        let session = EvalSession::new(DebuggeeThread(1), &DebuggerConfig::default());
        let mut sink = ErrorSink::new();

        let err = call.evaluate(&session, &DebuggeeValueFactory::detached(), &mut sink).unwrap_err();
        assert!(matches!(err, EvalError::ValueUnavailable(_)));
        assert_eq!(sink.messages(), ["failed to evaluate argument 1 of 'Lookup'"]);
        assert_eq!(session.state(), SessionState::Idle);
    }
}
