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

//! Debug value model.
//!
//! A [`DebugValue`] is either a copy owned by the debugger (primitives,
//! synthetic strings) or a handle identifying something that lives in the
//! debuggee (remote strings, references, composites). Evaluators only read
//! values and produce new ones; they never mutate what they receive.

mod factory;
mod primitive;
mod reference;
mod string;

pub use factory::{DebuggeeMemory, DebuggeeValueFactory, DetachedMemory, RemoteValue, ValueFactory};
pub use primitive::{Primitive, Scalar};
pub use reference::{CompositeValue, ObjectAddress, ReferenceValue};
pub use string::StringValue;

use derive_more::From;

use crate::{ElementKind, EvalError, TypeSignature};

/// A value produced or consumed by an expression evaluator.
#[derive(Debug, Clone, From)]
pub enum DebugValue {
    /// Scalar owned by the debugger
    Primitive(Primitive),
    /// `System.String`
    String(StringValue),
    /// Reference to a heap object
    Reference(ReferenceValue),
    /// Opaque structured value
    Composite(CompositeValue),
}

impl DebugValue {
    /// Wrap a Rust scalar.
    pub fn primitive<T: Scalar>(value: T) -> Self {
        Self::Primitive(value.into_primitive())
    }

    /// A string created by the debugger.
    pub fn string(content: impl Into<String>) -> Self {
        Self::String(StringValue::synthetic(content))
    }

    /// Element kind of the value.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Primitive(p) => p.kind(),
            Self::String(_) => ElementKind::String,
            Self::Reference(r) => r.ty().kind,
            Self::Composite(c) => c.ty().kind,
        }
    }

    /// Runtime type of the value.
    pub fn static_type(&self) -> TypeSignature {
        match self {
            Self::Primitive(p) => TypeSignature::of(p.kind()),
            Self::String(_) => TypeSignature::of(ElementKind::String),
            Self::Reference(r) => r.ty().clone(),
            Self::Composite(c) => c.ty().clone(),
        }
    }

    /// Read the value as scalar `T`, applying implicit numeric conversion.
    pub fn extract<T: Scalar>(&self) -> Result<T, EvalError> {
        match self {
            Self::Primitive(p) => T::from_primitive(*p).ok_or_else(|| {
                EvalError::TypeMismatch(format!("cannot read {} as {}", p.kind(), T::KIND))
            }),
            other => Err(EvalError::TypeMismatch(format!(
                "cannot read {} as {}",
                other.static_type(),
                T::KIND
            ))),
        }
    }

    /// Read the value as `bool`.
    pub fn as_bool(&self) -> Result<bool, EvalError> {
        self.extract::<bool>()
    }

    /// Content of a string value, materializing it if needed.
    pub fn string_content(&self) -> Result<&str, EvalError> {
        match self {
            Self::String(s) => s.content(),
            other => Err(EvalError::TypeMismatch(format!(
                "expected System.String, got {}",
                other.static_type()
            ))),
        }
    }

    /// Identity of the value in the debuggee. Values owned by the debugger have none.
    pub fn identity(&self) -> Option<ObjectAddress> {
        match self {
            Self::Primitive(_) => None,
            Self::String(s) => s.address(),
            Self::Reference(r) => Some(r.address()),
            Self::Composite(c) => Some(c.address()),
        }
    }

    /// Reference equality: both values denote the same debuggee object.
    pub fn is_identical(&self, other: &Self) -> bool {
        matches!((self.identity(), other.identity()), (Some(a), Some(b)) if a == b)
    }
}
