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

//! Handles to objects living in the debuggee's heap.

use derive_more::{Display, From};

use crate::TypeSignature;

/// Opaque address of an object in the debuggee. Never dereferenced by the
/// debugger; it only identifies the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{:#x}", _0)]
pub struct ObjectAddress(pub u64);

impl ObjectAddress {
    /// The null reference.
    pub const NULL: Self = Self(0);

    /// Whether this is the null reference.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Non-owning reference to a heap object. Equality on references is identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceValue {
    address: ObjectAddress,
    ty: TypeSignature,
}

impl ReferenceValue {
    /// Reference to the object at `address`.
    pub fn new(address: ObjectAddress, ty: TypeSignature) -> Self {
        Self { address, ty }
    }

    /// A null reference of the given static type.
    pub fn null(ty: TypeSignature) -> Self {
        Self { address: ObjectAddress::NULL, ty }
    }

    /// Address of the referenced object.
    pub fn address(&self) -> ObjectAddress {
        self.address
    }

    /// Static type of the reference.
    pub fn ty(&self) -> &TypeSignature {
        &self.ty
    }

    /// Whether the reference is null.
    pub fn is_null(&self) -> bool {
        self.address.is_null()
    }
}

/// A structured value (struct, array, boxed value) that this core does not
/// look into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeValue {
    address: ObjectAddress,
    ty: TypeSignature,
}

impl CompositeValue {
    /// Composite value stored at `address`.
    pub fn new(address: ObjectAddress, ty: TypeSignature) -> Self {
        Self { address, ty }
    }

    /// Address of the value in the debuggee.
    pub fn address(&self) -> ObjectAddress {
        self.address
    }

    /// Static type of the value.
    pub fn ty(&self) -> &TypeSignature {
        &self.ty
    }
}
