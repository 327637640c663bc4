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

use derive_more::Display;

/// Operator of a binary expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinaryOperator {
    /// Addition
    #[display("+")]
    Add,
    /// Subtraction
    #[display("-")]
    Sub,
    /// Multiplication
    #[display("*")]
    Mul,
    /// Division
    #[display("/")]
    Div,
    /// Remainder
    #[display("%")]
    Mod,
    /// Equality
    #[display("==")]
    Eq,
    /// Inequality
    #[display("!=")]
    Ne,
    /// Less than or equal
    #[display("<=")]
    Le,
    /// Greater than or equal
    #[display(">=")]
    Ge,
    /// Less than
    #[display("<")]
    Lt,
    /// Greater than
    #[display(">")]
    Gt,
    /// Short-circuit AND
    #[display("&&")]
    ConditionalAnd,
    /// Short-circuit OR
    #[display("||")]
    ConditionalOr,
    /// Bitwise or boolean AND
    #[display("&")]
    BitwiseAnd,
    /// Bitwise or boolean OR
    #[display("|")]
    BitwiseOr,
    /// Bitwise or boolean XOR
    #[display("^")]
    BitwiseXor,
    /// Left shift
    #[display("<<")]
    Shl,
    /// Right shift
    #[display(">>")]
    Shr,
    /// Right shift, written `>>>`
    #[display(">>>")]
    ShrUnsigned,
}

/// Operator families; compile dispatches on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    /// `+ - * / %`
    Arithmetic,
    /// `== != <= >= < >`
    Relational,
    /// `&& ||`
    ConditionalBoolean,
    /// `& | ^`
    Logical,
    /// `<< >> >>>`
    Shift,
}

impl BinaryOperator {
    /// Family the operator belongs to.
    pub const fn family(self) -> OperatorFamily {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod => OperatorFamily::Arithmetic,
            Self::Eq | Self::Ne | Self::Le | Self::Ge | Self::Lt | Self::Gt => {
                OperatorFamily::Relational
            }
            Self::ConditionalAnd | Self::ConditionalOr => OperatorFamily::ConditionalBoolean,
            Self::BitwiseAnd | Self::BitwiseOr | Self::BitwiseXor => OperatorFamily::Logical,
            Self::Shl | Self::Shr | Self::ShrUnsigned => OperatorFamily::Shift,
        }
    }

    /// Whether the operator is `==` or `!=`.
    pub const fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families() {
        assert_eq!(BinaryOperator::Mod.family(), OperatorFamily::Arithmetic);
        assert_eq!(BinaryOperator::Ne.family(), OperatorFamily::Relational);
        assert_eq!(BinaryOperator::ConditionalOr.family(), OperatorFamily::ConditionalBoolean);
        assert_eq!(BinaryOperator::BitwiseXor.family(), OperatorFamily::Logical);
        assert_eq!(BinaryOperator::ShrUnsigned.family(), OperatorFamily::Shift);
        assert!(BinaryOperator::Eq.is_equality());
        assert!(!BinaryOperator::Le.is_equality());
    }

    #[test]
    fn test_display() {
        assert_eq!(BinaryOperator::ShrUnsigned.to_string(), ">>>");
        assert_eq!(BinaryOperator::ConditionalAnd.to_string(), "&&");
    }
}
