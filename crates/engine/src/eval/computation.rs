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

//! Computation strategies bound to a binary node at compile time.

use std::ops::{BitAnd, BitOr, BitXor, Shl, Shr};

use tracing::trace;

use super::BinaryOperator;
use crate::{DebugValue, EvalError, IntegralKind, NumericKind, Primitive, Scalar, ValueFactory};

/// Strategy selected for a binary node once operand types are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Computation {
    /// `+ - * / %` on operands promoted to the given kind
    Arithmetic(NumericKind),
    /// Relational operators on operands promoted to the given kind
    NumericComparison(NumericKind),
    /// `& | ^` on operands promoted to the given integral kind
    Bitwise(IntegralKind),
    /// Shifts; the count is masked with `mask` before shifting
    Shift {
        /// Int-promoted kind of the left operand
        kind: IntegralKind,
        /// `0x1f` for 32-bit operands, `0x3f` for 64-bit ones
        mask: u32,
    },
    /// Operators on two booleans
    Boolean,
    /// Content comparison of two strings
    StringEquality,
    /// Identity comparison of two objects
    ReferenceEquality,
}

impl Computation {
    /// Apply the computation to already evaluated operands.
    pub fn apply(
        self,
        op: BinaryOperator,
        left: &DebugValue,
        right: &DebugValue,
        factory: &dyn ValueFactory,
    ) -> Result<DebugValue, EvalError> {
        trace!(computation = ?self, %op, "applying binary computation");
        let result = match self {
            Self::Arithmetic(kind) => match kind {
                NumericKind::I32 => arithmetic::<i32>(op, left, right)?,
                NumericKind::U32 => arithmetic::<u32>(op, left, right)?,
                NumericKind::I64 => arithmetic::<i64>(op, left, right)?,
                NumericKind::U64 => arithmetic::<u64>(op, left, right)?,
                NumericKind::F32 => arithmetic::<f32>(op, left, right)?,
                NumericKind::F64 => arithmetic::<f64>(op, left, right)?,
            },
            Self::NumericComparison(kind) => {
                let holds = match kind {
                    NumericKind::I32 => compare::<i32>(op, left, right)?,
                    NumericKind::U32 => compare::<u32>(op, left, right)?,
                    NumericKind::I64 => compare::<i64>(op, left, right)?,
                    NumericKind::U64 => compare::<u64>(op, left, right)?,
                    NumericKind::F32 => compare::<f32>(op, left, right)?,
                    NumericKind::F64 => compare::<f64>(op, left, right)?,
                };
                Primitive::Bool(holds)
            }
            Self::Bitwise(kind) => match kind {
                IntegralKind::I32 => bitwise::<i32>(op, left, right)?,
                IntegralKind::U32 => bitwise::<u32>(op, left, right)?,
                IntegralKind::I64 => bitwise::<i64>(op, left, right)?,
                IntegralKind::U64 => bitwise::<u64>(op, left, right)?,
            },
            Self::Shift { kind, mask } => {
                // The count is always read as a 32-bit int.
                let count = right.extract::<i32>()? as u32 & mask;
                match kind {
                    IntegralKind::I32 => shift::<i32>(op, left, count)?,
                    IntegralKind::U32 => shift::<u32>(op, left, count)?,
                    IntegralKind::I64 => shift::<i64>(op, left, count)?,
                    IntegralKind::U64 => shift::<u64>(op, left, count)?,
                }
            }
            Self::Boolean => Primitive::Bool(boolean(op, left.as_bool()?, right.as_bool()?)?),
            Self::StringEquality => {
                let equal = string_operand(left)? == string_operand(right)?;
                Primitive::Bool(equality(op, equal)?)
            }
            Self::ReferenceEquality => Primitive::Bool(equality(op, left.is_identical(right))?),
        };

        Ok(factory.create_primitive(result))
    }
}

/// Content of a string operand, `None` for a null string reference.
fn string_operand(value: &DebugValue) -> Result<Option<&str>, EvalError> {
    match value {
        DebugValue::Reference(reference) if reference.is_null() => Ok(None),
        other => other.string_content().map(Some),
    }
}

fn unexpected(op: BinaryOperator, computation: &str) -> EvalError {
    EvalError::InvalidOperation(format!("operator '{op}' cannot be applied as {computation}"))
}

/// Arithmetic with the host language's unchecked semantics.
trait Arithmetic: Scalar + PartialOrd {
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn div(self, rhs: Self) -> Result<Self, EvalError>;
    fn rem(self, rhs: Self) -> Result<Self, EvalError>;
}

macro_rules! integral_arithmetic {
    ($($ty:ty),*) => {
        $(
            impl Arithmetic for $ty {
                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                fn div(self, rhs: Self) -> Result<Self, EvalError> {
                    if rhs == 0 {
                        return Err(EvalError::InvalidOperation("division by zero".into()));
                    }
                    self.checked_div(rhs).ok_or_else(|| {
                        EvalError::InvalidOperation(format!("{self} / {rhs} overflows"))
                    })
                }

                fn rem(self, rhs: Self) -> Result<Self, EvalError> {
                    if rhs == 0 {
                        return Err(EvalError::InvalidOperation("division by zero".into()));
                    }
                    self.checked_rem(rhs).ok_or_else(|| {
                        EvalError::InvalidOperation(format!("{self} % {rhs} overflows"))
                    })
                }
            }
        )*
    };
}

macro_rules! float_arithmetic {
    ($($ty:ty),*) => {
        $(
            impl Arithmetic for $ty {
                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn mul(self, rhs: Self) -> Self {
                    self * rhs
                }

                fn div(self, rhs: Self) -> Result<Self, EvalError> {
                    Ok(self / rhs)
                }

                fn rem(self, rhs: Self) -> Result<Self, EvalError> {
                    Ok(self % rhs)
                }
            }
        )*
    };
}

integral_arithmetic!(i32, u32, i64, u64);
float_arithmetic!(f32, f64);

fn arithmetic<T: Arithmetic>(
    op: BinaryOperator,
    left: &DebugValue,
    right: &DebugValue,
) -> Result<Primitive, EvalError> {
    let (l, r) = (left.extract::<T>()?, right.extract::<T>()?);
    let result = match op {
        BinaryOperator::Add => l.add(r),
        BinaryOperator::Sub => l.sub(r),
        BinaryOperator::Mul => l.mul(r),
        BinaryOperator::Div => l.div(r)?,
        BinaryOperator::Mod => l.rem(r)?,
        _ => return Err(unexpected(op, "arithmetic")),
    };
    Ok(result.into_primitive())
}

fn compare<T: Scalar + PartialOrd>(
    op: BinaryOperator,
    left: &DebugValue,
    right: &DebugValue,
) -> Result<bool, EvalError> {
    let (l, r) = (left.extract::<T>()?, right.extract::<T>()?);
    Ok(match op {
        BinaryOperator::Eq => l == r,
        BinaryOperator::Ne => l != r,
        BinaryOperator::Le => l <= r,
        BinaryOperator::Ge => l >= r,
        BinaryOperator::Lt => l < r,
        BinaryOperator::Gt => l > r,
        _ => return Err(unexpected(op, "a comparison")),
    })
}

fn bitwise<T>(op: BinaryOperator, left: &DebugValue, right: &DebugValue) -> Result<Primitive, EvalError>
where
    T: Scalar + BitAnd<Output = T> + BitOr<Output = T> + BitXor<Output = T>,
{
    let (l, r) = (left.extract::<T>()?, right.extract::<T>()?);
    let result = match op {
        BinaryOperator::BitwiseAnd => l & r,
        BinaryOperator::BitwiseOr => l | r,
        BinaryOperator::BitwiseXor => l ^ r,
        _ => return Err(unexpected(op, "a bitwise operation")),
    };
    Ok(result.into_primitive())
}

/// `count` is already masked below the bit width of `T`. Right shifts are
/// arithmetic for signed `T` and logical for unsigned `T`.
fn shift<T>(op: BinaryOperator, left: &DebugValue, count: u32) -> Result<Primitive, EvalError>
where
    T: Scalar + Shl<u32, Output = T> + Shr<u32, Output = T>,
{
    let value = left.extract::<T>()?;
    let result = match op {
        BinaryOperator::Shl => value << count,
        BinaryOperator::Shr | BinaryOperator::ShrUnsigned => value >> count,
        _ => return Err(unexpected(op, "a shift")),
    };
    Ok(result.into_primitive())
}

fn boolean(op: BinaryOperator, l: bool, r: bool) -> Result<bool, EvalError> {
    Ok(match op {
        BinaryOperator::ConditionalAnd | BinaryOperator::BitwiseAnd => l && r,
        BinaryOperator::ConditionalOr | BinaryOperator::BitwiseOr => l || r,
        BinaryOperator::Eq => l == r,
        BinaryOperator::Ne | BinaryOperator::BitwiseXor => l != r,
        _ => return Err(unexpected(op, "a boolean operation")),
    })
}

fn equality(op: BinaryOperator, equal: bool) -> Result<bool, EvalError> {
    match op {
        BinaryOperator::Eq => Ok(equal),
        BinaryOperator::Ne => Ok(!equal),
        _ => Err(unexpected(op, "an equality test")),
    }
}
