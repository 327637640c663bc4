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

use super::{CompileContext, ExpressionEvaluator};
use crate::{
    DebugValue, ElementKind, ErrorSink, EvalCoordinator, EvalError, Primitive, RemoteValue, Scalar,
    TypeSignature, ValueFactory,
};

#[derive(Debug, Clone)]
enum Literal {
    Primitive(Primitive),
    String(String),
    Null(TypeSignature),
}

/// Constant leaf: a primitive, string or `null` literal.
#[derive(Debug, Clone)]
pub struct LiteralEvaluator {
    literal: Literal,
    ty: TypeSignature,
}

impl LiteralEvaluator {
    /// A numeric, character or boolean literal.
    pub fn primitive<T: Scalar>(value: T) -> Self {
        let value = value.into_primitive();
        Self { literal: Literal::Primitive(value), ty: TypeSignature::of(value.kind()) }
    }

    /// A string literal.
    pub fn string(content: impl Into<String>) -> Self {
        Self { literal: Literal::String(content.into()), ty: TypeSignature::of(ElementKind::String) }
    }

    /// `null`, typed as `ty`.
    pub fn null(ty: TypeSignature) -> Self {
        Self { literal: Literal::Null(ty.clone()), ty }
    }
}

impl ExpressionEvaluator for LiteralEvaluator {
    fn compile(&mut self, _: &dyn CompileContext, _: &mut ErrorSink) -> Result<(), EvalError> {
        Ok(())
    }

    fn evaluate(
        &self,
        _: &dyn EvalCoordinator,
        factory: &dyn ValueFactory,
        _: &mut ErrorSink,
    ) -> Result<DebugValue, EvalError> {
        Ok(match &self.literal {
            Literal::Primitive(value) => factory.create_primitive(*value),
            Literal::String(content) => factory.create_string(content.clone()),
            Literal::Null(ty) => factory.create_value(RemoteValue::Null(ty.clone())),
        })
    }

    fn static_type(&self) -> &TypeSignature {
        &self.ty
    }
}
