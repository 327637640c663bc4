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

//! Scalar values copied out of the debuggee.

use crate::ElementKind;

/// A primitive value owned by the debugger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// `bool`
    Bool(bool),
    /// `char`, stored as its UTF-16 code unit
    Char(u16),
    /// `sbyte`
    I8(i8),
    /// `byte`
    U8(u8),
    /// `short`
    I16(i16),
    /// `ushort`
    U16(u16),
    /// `int`
    I32(i32),
    /// `uint`
    U32(u32),
    /// `long`
    I64(i64),
    /// `ulong`
    U64(u64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
}

impl Primitive {
    /// Element kind of the stored scalar.
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Bool(_) => ElementKind::Boolean,
            Self::Char(_) => ElementKind::Char,
            Self::I8(_) => ElementKind::I8,
            Self::U8(_) => ElementKind::U8,
            Self::I16(_) => ElementKind::I16,
            Self::U16(_) => ElementKind::U16,
            Self::I32(_) => ElementKind::I32,
            Self::U32(_) => ElementKind::U32,
            Self::I64(_) => ElementKind::I64,
            Self::U64(_) => ElementKind::U64,
            Self::F32(_) => ElementKind::F32,
            Self::F64(_) => ElementKind::F64,
        }
    }
}

/// A Rust scalar that can be extracted from, and stored into, a [`Primitive`].
///
/// Numeric extraction performs the host language's implicit numeric
/// conversion, so an `int` operand can be read as `long` once both operands
/// have been promoted.
pub trait Scalar: Copy + Sized {
    /// Kind produced by [`into_primitive`](Self::into_primitive)
    const KIND: ElementKind;

    /// Read the scalar out of a primitive, or `None` if the kinds are incompatible.
    fn from_primitive(value: Primitive) -> Option<Self>;

    /// Wrap the scalar into a primitive.
    fn into_primitive(self) -> Primitive;
}

impl Scalar for bool {
    const KIND: ElementKind = ElementKind::Boolean;

    fn from_primitive(value: Primitive) -> Option<Self> {
        match value {
            Primitive::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn into_primitive(self) -> Primitive {
        Primitive::Bool(self)
    }
}

macro_rules! numeric_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ElementKind = ElementKind::$variant;

                #[allow(clippy::unnecessary_cast)]
                fn from_primitive(value: Primitive) -> Option<Self> {
                    match value {
                        Primitive::Bool(_) => None,
                        Primitive::Char(v) => Some(v as $ty),
                        Primitive::I8(v) => Some(v as $ty),
                        Primitive::U8(v) => Some(v as $ty),
                        Primitive::I16(v) => Some(v as $ty),
                        Primitive::U16(v) => Some(v as $ty),
                        Primitive::I32(v) => Some(v as $ty),
                        Primitive::U32(v) => Some(v as $ty),
                        Primitive::I64(v) => Some(v as $ty),
                        Primitive::U64(v) => Some(v as $ty),
                        Primitive::F32(v) => Some(v as $ty),
                        Primitive::F64(v) => Some(v as $ty),
                    }
                }

                fn into_primitive(self) -> Primitive {
                    Primitive::$variant(self)
                }
            }
        )*
    };
}

numeric_scalar! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}
