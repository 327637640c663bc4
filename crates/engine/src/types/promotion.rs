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

//! Binary numeric promotion.
//!
//! Operands of an arithmetic, relational or bitwise operator are converted to a
//! common kind before the operator applies:
//!
//! 1. `double` if either operand is `double`, else `float` if either is `float`;
//! 2. `ulong` if either operand is `ulong`, else `long` if either is `long`;
//! 3. `uint` if either operand is `uint` and the other one is unsigned, `long`
//!    if the other one is signed;
//! 4. `int` otherwise.

use std::fmt;

use crate::{ElementKind, EvalError};

/// Kinds an operand can be promoted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    /// `int`
    I32,
    /// `uint`
    U32,
    /// `long`
    I64,
    /// `ulong`
    U64,
    /// `float`
    F32,
    /// `double`
    F64,
}

/// The integral subset of [`NumericKind`], used by bitwise and shift operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegralKind {
    /// `int`
    I32,
    /// `uint`
    U32,
    /// `long`
    I64,
    /// `ulong`
    U64,
}

impl NumericKind {
    /// The element kind of a value of this numeric kind.
    pub const fn element_kind(self) -> ElementKind {
        match self {
            Self::I32 => ElementKind::I32,
            Self::U32 => ElementKind::U32,
            Self::I64 => ElementKind::I64,
            Self::U64 => ElementKind::U64,
            Self::F32 => ElementKind::F32,
            Self::F64 => ElementKind::F64,
        }
    }

    /// Narrow to an integral kind; `None` for floating-point kinds.
    pub const fn as_integral(self) -> Option<IntegralKind> {
        match self {
            Self::I32 => Some(IntegralKind::I32),
            Self::U32 => Some(IntegralKind::U32),
            Self::I64 => Some(IntegralKind::I64),
            Self::U64 => Some(IntegralKind::U64),
            Self::F32 | Self::F64 => None,
        }
    }
}

impl IntegralKind {
    /// Mask applied to a shift count: the low five bits for 32-bit operands,
    /// the low six bits for 64-bit operands.
    pub const fn shift_mask(self) -> u32 {
        match self {
            Self::I32 | Self::U32 => 0x1f,
            Self::I64 | Self::U64 => 0x3f,
        }
    }

    /// The element kind of a value of this integral kind.
    pub const fn element_kind(self) -> ElementKind {
        NumericKind::from_integral(self).element_kind()
    }
}

impl NumericKind {
    const fn from_integral(kind: IntegralKind) -> Self {
        match kind {
            IntegralKind::I32 => Self::I32,
            IntegralKind::U32 => Self::U32,
            IntegralKind::I64 => Self::I64,
            IntegralKind::U64 => Self::U64,
        }
    }
}

impl From<IntegralKind> for NumericKind {
    fn from(kind: IntegralKind) -> Self {
        Self::from_integral(kind)
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.element_kind(), f)
    }
}

impl fmt::Display for IntegralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.element_kind(), f)
    }
}

/// Apply binary numeric promotion to the kinds of two operands.
///
/// Fails with [`EvalError::TypeMismatch`] if either operand is not numeric.
pub fn promote(left: ElementKind, right: ElementKind) -> Result<NumericKind, EvalError> {
    if !left.is_numeric() || !right.is_numeric() {
        return Err(EvalError::TypeMismatch(format!(
            "cannot apply numeric promotion to {left} and {right}"
        )));
    }

    let either = |kind: ElementKind| left == kind || right == kind;

    let promoted = if either(ElementKind::F64) {
        NumericKind::F64
    } else if either(ElementKind::F32) {
        NumericKind::F32
    } else if either(ElementKind::U64) {
        NumericKind::U64
    } else if either(ElementKind::I64) {
        NumericKind::I64
    } else if either(ElementKind::U32) {
        if left.is_unsigned() && right.is_unsigned() {
            NumericKind::U32
        } else {
            NumericKind::I64
        }
    } else {
        NumericKind::I32
    };

    Ok(promoted)
}

/// Kind of the left operand of a shift after unary promotion, or `None` if the
/// operand is not integral.
pub fn shift_operand_kind(kind: ElementKind) -> Option<IntegralKind> {
    match kind {
        k if k.is_promoted_to_int() => Some(IntegralKind::I32),
        ElementKind::I32 => Some(IntegralKind::I32),
        ElementKind::U32 => Some(IntegralKind::U32),
        ElementKind::I64 => Some(IntegralKind::I64),
        ElementKind::U64 => Some(IntegralKind::U64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMERIC_KINDS: [ElementKind; 11] = [
        ElementKind::Char,
        ElementKind::I8,
        ElementKind::U8,
        ElementKind::I16,
        ElementKind::U16,
        ElementKind::I32,
        ElementKind::U32,
        ElementKind::I64,
        ElementKind::U64,
        ElementKind::F32,
        ElementKind::F64,
    ];

    /// Position of a kind in the lattice; a promoted kind never ranks lower
    /// than either operand.
    fn rank(kind: ElementKind) -> u8 {
        match kind {
            ElementKind::Char
            | ElementKind::I8
            | ElementKind::U8
            | ElementKind::I16
            | ElementKind::U16 => 0,
            ElementKind::I32 | ElementKind::U32 => 1,
            ElementKind::I64 | ElementKind::U64 => 2,
            ElementKind::F32 => 3,
            ElementKind::F64 => 4,
            _ => unreachable!("not numeric"),
        }
    }

    #[test]
    fn test_promotion_is_commutative() {
        for a in NUMERIC_KINDS {
            for b in NUMERIC_KINDS {
                assert_eq!(promote(a, b).unwrap(), promote(b, a).unwrap(), "{a} / {b}");
            }
        }
    }

    #[test]
    fn test_promotion_never_narrows() {
        for a in NUMERIC_KINDS {
            for b in NUMERIC_KINDS {
                let promoted = promote(a, b).unwrap().element_kind();
                let widest = rank(a).max(rank(b));
                assert!(rank(promoted) >= widest, "{a} / {b} promoted to {promoted}");
            }
        }
    }

    #[test]
    fn test_promotion_table() {
        use ElementKind::*;

        assert_eq!(promote(I32, F64).unwrap(), NumericKind::F64);
        assert_eq!(promote(F32, I64).unwrap(), NumericKind::F32);
        assert_eq!(promote(F32, F64).unwrap(), NumericKind::F64);
        assert_eq!(promote(I64, U64).unwrap(), NumericKind::U64);
        assert_eq!(promote(I32, I64).unwrap(), NumericKind::I64);
        assert_eq!(promote(U32, U16).unwrap(), NumericKind::U32);
        assert_eq!(promote(U32, Char).unwrap(), NumericKind::U32);
        assert_eq!(promote(U32, I32).unwrap(), NumericKind::I64);
        assert_eq!(promote(U8, U8).unwrap(), NumericKind::I32);
        assert_eq!(promote(Char, I16).unwrap(), NumericKind::I32);
    }

    #[test]
    fn test_non_numeric_is_a_type_mismatch() {
        let err = promote(ElementKind::I32, ElementKind::Boolean).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));

        let err = promote(ElementKind::String, ElementKind::F64).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch(_)));
    }

    #[test]
    fn test_shift_operand_kind() {
        assert_eq!(shift_operand_kind(ElementKind::U8), Some(IntegralKind::I32));
        assert_eq!(shift_operand_kind(ElementKind::U32), Some(IntegralKind::U32));
        assert_eq!(shift_operand_kind(ElementKind::I64), Some(IntegralKind::I64));
        assert_eq!(shift_operand_kind(ElementKind::F32), None);
        assert_eq!(IntegralKind::U32.shift_mask(), 0x1f);
        assert_eq!(IntegralKind::I64.shift_mask(), 0x3f);
    }
}
