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

use tracing::{debug, trace};

use super::{BinaryOperator, CompileContext, Computation, ExpressionEvaluator, OperatorFamily};
use crate::{
    promote, shift_operand_kind, DebugValue, ElementKind, ErrorSink, EvalCoordinator, EvalError,
    Primitive, TypeSignature, ValueFactory,
};

/// Expression node applying a binary operator to two child expressions.
#[derive(Debug)]
pub struct BinaryExpressionEvaluator {
    op: BinaryOperator,
    left: Box<dyn ExpressionEvaluator>,
    right: Box<dyn ExpressionEvaluator>,
    result_type: TypeSignature,
    computation: Option<Computation>,
}

impl BinaryExpressionEvaluator {
    /// Create an uncompiled node.
    pub fn new(
        op: BinaryOperator,
        left: Box<dyn ExpressionEvaluator>,
        right: Box<dyn ExpressionEvaluator>,
    ) -> Self {
        Self { op, left, right, result_type: TypeSignature::default(), computation: None }
    }

    /// Operator applied by the node.
    pub fn op(&self) -> BinaryOperator {
        self.op
    }

    /// Computation bound by the last successful compile.
    pub fn computation(&self) -> Option<Computation> {
        self.computation
    }

    /// Resolved result type. [`TypeSignature::object`] until compiled.
    pub fn result_type(&self) -> &TypeSignature {
        &self.result_type
    }

    fn mismatch(&self, left: &TypeSignature, right: &TypeSignature) -> EvalError {
        EvalError::TypeMismatch(format!(
            "operator '{}' cannot be applied to operands of type '{left}' and '{right}'",
            self.op
        ))
    }

    fn not_supported(&self, left: &TypeSignature, right: &TypeSignature) -> EvalError {
        EvalError::NotSupported(format!(
            "operator '{}' on operands of type '{left}' and '{right}'",
            self.op
        ))
    }

    /// Select the computation and result type for the operand types.
    fn bind(
        &self,
        left: &TypeSignature,
        right: &TypeSignature,
    ) -> Result<(Computation, TypeSignature), EvalError> {
        let (lk, rk) = (left.kind, right.kind);
        let both = |kind: ElementKind| lk == kind && rk == kind;

        match self.op.family() {
            OperatorFamily::Arithmetic => {
                if !lk.is_numeric() || !rk.is_numeric() {
                    return Err(self.mismatch(left, right));
                }
                let kind = promote(lk, rk)?;
                Ok((Computation::Arithmetic(kind), kind.element_kind().into()))
            }
            OperatorFamily::Relational => {
                if lk.is_numeric() && rk.is_numeric() {
                    let kind = promote(lk, rk)?;
                    return Ok((Computation::NumericComparison(kind), TypeSignature::boolean()));
                }
                if !self.op.is_equality() {
                    return Err(self.not_supported(left, right));
                }

                let computation = if both(ElementKind::Boolean) {
                    Computation::Boolean
                } else if both(ElementKind::String) {
                    Computation::StringEquality
                } else if !lk.is_numeric() && !rk.is_numeric() {
                    Computation::ReferenceEquality
                } else {
                    return Err(self.mismatch(left, right));
                };
                Ok((computation, TypeSignature::boolean()))
            }
            OperatorFamily::ConditionalBoolean => {
                if both(ElementKind::Boolean) {
                    Ok((Computation::Boolean, TypeSignature::boolean()))
                } else {
                    Err(self.mismatch(left, right))
                }
            }
            OperatorFamily::Logical => {
                if lk.is_integral() && rk.is_integral() {
                    let kind = promote(lk, rk)?;
                    let integral = kind.as_integral().ok_or_else(|| self.mismatch(left, right))?;
                    Ok((Computation::Bitwise(integral), kind.element_kind().into()))
                } else if both(ElementKind::Boolean) {
                    Ok((Computation::Boolean, TypeSignature::boolean()))
                } else {
                    Err(self.mismatch(left, right))
                }
            }
            OperatorFamily::Shift => {
                if !rk.is_integral() {
                    return Err(self.mismatch(left, right));
                }
                let kind = shift_operand_kind(lk).ok_or_else(|| self.mismatch(left, right))?;
                Ok((Computation::Shift { kind, mask: kind.shift_mask() }, kind.element_kind().into()))
            }
        }
    }
}

impl ExpressionEvaluator for BinaryExpressionEvaluator {
    fn compile(
        &mut self,
        context: &dyn CompileContext,
        sink: &mut ErrorSink,
    ) -> Result<(), EvalError> {
        self.computation = None;
        self.result_type = TypeSignature::default();

        self.left.compile(context, sink)?;
        self.right.compile(context, sink)?;

        let (left, right) = (self.left.static_type(), self.right.static_type());
        let (computation, result_type) = self.bind(left, right).map_err(|e| sink.fail(e))?;

        debug!(op = %self.op, %left, %right, ?computation, "compiled binary expression");
        self.computation = Some(computation);
        self.result_type = result_type;
        Ok(())
    }

    fn evaluate(
        &self,
        coordinator: &dyn EvalCoordinator,
        factory: &dyn ValueFactory,
        sink: &mut ErrorSink,
    ) -> Result<DebugValue, EvalError> {
        let computation = self.computation.ok_or(EvalError::NotCompiled)?;

        let left = self.left.evaluate(coordinator, factory, sink).inspect_err(|_| {
            sink.report("failed to evaluate the first operand");
        })?;

        let short_circuit = match self.op {
            BinaryOperator::ConditionalAnd => Some(false),
            BinaryOperator::ConditionalOr => Some(true),
            _ => None,
        };
        if let Some(decisive) = short_circuit {
            if left.as_bool()? == decisive {
                trace!(op = %self.op, "short-circuited binary expression");
                return Ok(factory.create_primitive(Primitive::Bool(decisive)));
            }
        }

        let right = self.right.evaluate(coordinator, factory, sink).inspect_err(|_| {
            sink.report("failed to evaluate the second operand");
        })?;

        computation.apply(self.op, &left, &right, factory)
    }

    fn static_type(&self) -> &TypeSignature {
        &self.result_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        eval::{EmptyCompileContext, LiteralEvaluator},
        IntegralKind, NumericKind, ObjectAddress,
    };

    fn lit<T: crate::Scalar>(v: T) -> Box<dyn ExpressionEvaluator> {
        Box::new(LiteralEvaluator::primitive(v))
    }

    fn string(s: &str) -> Box<dyn ExpressionEvaluator> {
        Box::new(LiteralEvaluator::string(s))
    }

    fn null(ty: &str) -> Box<dyn ExpressionEvaluator> {
        Box::new(LiteralEvaluator::null(TypeSignature::class(ty)))
    }

    fn compile(
        op: BinaryOperator,
        left: Box<dyn ExpressionEvaluator>,
        right: Box<dyn ExpressionEvaluator>,
    ) -> (BinaryExpressionEvaluator, Result<(), EvalError>, ErrorSink) {
        let mut expr = BinaryExpressionEvaluator::new(op, left, right);
        let mut sink = ErrorSink::new();
        let result = expr.compile(&EmptyCompileContext, &mut sink);
        (expr, result, sink)
    }

    #[test]
    fn test_arithmetic_binding() {
        let (expr, result, _) = compile(BinaryOperator::Add, lit(1i32), lit(2u64));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::Arithmetic(NumericKind::U64)));
        assert_eq!(expr.result_type().kind, ElementKind::U64);

        let (expr, result, _) = compile(BinaryOperator::Mul, lit(1u8), lit(2i16));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::Arithmetic(NumericKind::I32)));
    }

    #[test]
    fn test_arithmetic_on_string_is_mismatch() {
        let (expr, result, sink) = compile(BinaryOperator::Sub, string("a"), lit(1i32));
        assert!(matches!(result, Err(EvalError::TypeMismatch(_))));
        assert!(expr.computation().is_none());
        assert_eq!(sink.messages().len(), 1);
        assert!(sink.messages()[0].contains("'-'"));
    }

    #[test]
    fn test_relational_binding() {
        let (expr, result, _) = compile(BinaryOperator::Lt, lit(1i32), lit(2.5f64));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::NumericComparison(NumericKind::F64)));
        assert_eq!(expr.result_type(), &TypeSignature::boolean());

        let (expr, result, _) = compile(BinaryOperator::Eq, string("a"), string("b"));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::StringEquality));

        let (expr, result, _) = compile(BinaryOperator::Ne, lit(true), lit(false));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::Boolean));

        let (expr, result, _) = compile(BinaryOperator::Eq, null("A"), string("b"));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::ReferenceEquality));
    }

    #[test]
    fn test_relational_failures() {
        let (_, result, _) = compile(BinaryOperator::Lt, string("a"), string("b"));
        assert!(matches!(result, Err(EvalError::NotSupported(_))));

        let (_, result, _) = compile(BinaryOperator::Eq, lit(1i32), string("b"));
        assert!(matches!(result, Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn test_logical_binding() {
        let (expr, result, _) = compile(BinaryOperator::BitwiseAnd, lit(6u32), lit(3u16));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::Bitwise(IntegralKind::U32)));

        let (expr, result, _) = compile(BinaryOperator::BitwiseOr, lit(true), lit(false));
        result.unwrap();
        assert_eq!(expr.computation(), Some(Computation::Boolean));

        let (_, result, _) = compile(BinaryOperator::BitwiseXor, lit(1.0f64), lit(1i32));
        assert!(matches!(result, Err(EvalError::TypeMismatch(_))));

        let (_, result, _) = compile(BinaryOperator::ConditionalAnd, lit(1i32), lit(true));
        assert!(matches!(result, Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn test_shift_binding() {
        let (expr, result, _) = compile(BinaryOperator::Shl, lit(1u8), lit(3i64));
        result.unwrap();
        assert_eq!(
            expr.computation(),
            Some(Computation::Shift { kind: IntegralKind::I32, mask: 0x1f })
        );
        assert_eq!(expr.result_type().kind, ElementKind::I32);

        let (expr, result, _) = compile(BinaryOperator::Shr, lit(1u64), lit(3i32));
        result.unwrap();
        assert_eq!(
            expr.computation(),
            Some(Computation::Shift { kind: IntegralKind::U64, mask: 0x3f })
        );

        // Both operands must be integral.
        let (_, result, _) = compile(BinaryOperator::Shl, lit(1i32), lit(1.0f32));
        assert!(matches!(result, Err(EvalError::TypeMismatch(_))));
        let (_, result, _) = compile(BinaryOperator::Shl, lit(1.0f32), lit(1i32));
        assert!(matches!(result, Err(EvalError::TypeMismatch(_))));
    }

    #[test]
    fn test_child_failure_aborts_compile() {
        let inner = BinaryExpressionEvaluator::new(BinaryOperator::Add, string("a"), lit(1i32));
        let (expr, result, sink) = compile(BinaryOperator::Add, Box::new(inner), lit(1i32));
        assert!(matches!(result, Err(EvalError::TypeMismatch(_))));
        assert!(expr.computation().is_none());
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn test_failed_recompile_clears_binding() {
        let call = crate::LiveCallEvaluator::new("get_Count");
        let mut expr =
            BinaryExpressionEvaluator::new(BinaryOperator::Add, Box::new(call), lit(1i32));
        let context = crate::test_utils::StaticCompileContext::new()
            .with_call("get_Count", TypeSignature::of(ElementKind::I32));
        expr.compile(&context, &mut ErrorSink::new()).unwrap();
        assert_eq!(expr.computation(), Some(Computation::Arithmetic(NumericKind::I32)));

        // Without the call's type the child fails and the old binding is gone.
        let mut sink = ErrorSink::new();
        let result = expr.compile(&EmptyCompileContext, &mut sink);
        assert!(matches!(result, Err(EvalError::NotSupported(_))));
        assert!(expr.computation().is_none());
        assert_eq!(expr.result_type(), &TypeSignature::default());

        let session = crate::EvalSession::new(
            crate::DebuggeeThread(1),
            &mdb_common::DebuggerConfig::default(),
        );
        let factory = crate::DebuggeeValueFactory::detached();
        let result = expr.evaluate(&session, &factory, &mut sink);
        assert_eq!(result.unwrap_err(), EvalError::NotCompiled);
    }

    #[test]
    fn test_evaluate_before_compile() {
        let expr = BinaryExpressionEvaluator::new(BinaryOperator::Add, lit(1i32), lit(2i32));
        let session = crate::EvalSession::new(
            crate::DebuggeeThread(1),
            &mdb_common::DebuggerConfig::default(),
        );
        let factory = crate::DebuggeeValueFactory::detached();
        let result = expr.evaluate(&session, &factory, &mut ErrorSink::new());
        assert_eq!(result.unwrap_err(), EvalError::NotCompiled);
    }

    #[test]
    fn test_null_literal_has_identity() {
        let factory = crate::DebuggeeValueFactory::detached();
        let session = crate::EvalSession::new(
            crate::DebuggeeThread(1),
            &mdb_common::DebuggerConfig::default(),
        );
        let value = LiteralEvaluator::null(TypeSignature::class("A"))
            .evaluate(&session, &factory, &mut ErrorSink::new())
            .unwrap();
        assert_eq!(value.identity(), Some(ObjectAddress::NULL));
    }
}
