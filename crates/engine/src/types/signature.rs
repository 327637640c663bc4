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

//! Static type information for expression nodes.

use std::fmt;

/// Element kind of a debuggee value, as reported by the runtime's type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `bool`
    Boolean,
    /// UTF-16 code unit (`char`)
    Char,
    /// `sbyte`
    I8,
    /// `byte`
    U8,
    /// `short`
    I16,
    /// `ushort`
    U16,
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
    /// `string`
    String,
    /// Class instance whose type is known by name
    Class,
    /// Generic object, also used when the type could not be resolved
    Object,
}

impl ElementKind {
    /// Fully qualified runtime name of a primitive kind. Class kinds carry
    /// their name in [`TypeSignature::type_name`] instead.
    pub const fn runtime_name(self) -> &'static str {
        match self {
            Self::Boolean => "System.Boolean",
            Self::Char => "System.Char",
            Self::I8 => "System.SByte",
            Self::U8 => "System.Byte",
            Self::I16 => "System.Int16",
            Self::U16 => "System.UInt16",
            Self::I32 => "System.Int32",
            Self::U32 => "System.UInt32",
            Self::I64 => "System.Int64",
            Self::U64 => "System.UInt64",
            Self::F32 => "System.Single",
            Self::F64 => "System.Double",
            Self::String => "System.String",
            Self::Class | Self::Object => "System.Object",
        }
    }

    /// Whether the kind is an integer kind, including `char`.
    pub const fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::I8
                | Self::U8
                | Self::I16
                | Self::U16
                | Self::I32
                | Self::U32
                | Self::I64
                | Self::U64
        )
    }

    /// Whether the kind takes part in binary numeric promotion.
    pub const fn is_numeric(self) -> bool {
        self.is_integral() || matches!(self, Self::F32 | Self::F64)
    }

    /// Whether the kind is an unsigned integer kind. `char` counts as unsigned.
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::Char | Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    /// Small integral kinds that are widened to `int` before any operator applies.
    pub const fn is_promoted_to_int(self) -> bool {
        matches!(self, Self::Char | Self::I8 | Self::U8 | Self::I16 | Self::U16)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.runtime_name())
    }
}

/// Static type of an expression: the element kind plus the runtime type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSignature {
    /// Element kind used for operator dispatch
    pub kind: ElementKind,
    /// Fully qualified runtime type name
    pub type_name: String,
}

impl TypeSignature {
    /// Signature of a primitive, string or generic-object kind.
    pub fn of(kind: ElementKind) -> Self {
        Self { kind, type_name: kind.runtime_name().to_string() }
    }

    /// Signature of a named class.
    pub fn class(type_name: impl Into<String>) -> Self {
        Self { kind: ElementKind::Class, type_name: type_name.into() }
    }

    /// The unresolved fallback signature.
    pub fn object() -> Self {
        Self::of(ElementKind::Object)
    }

    /// Signature of `bool`.
    pub fn boolean() -> Self {
        Self::of(ElementKind::Boolean)
    }
}

impl Default for TypeSignature {
    fn default() -> Self {
        Self::object()
    }
}

impl From<ElementKind> for TypeSignature {
    fn from(kind: ElementKind) -> Self {
        Self::of(kind)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}
