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

//! Adapters between raw debuggee values and [`DebugValue`]s.

use std::sync::Arc;

use super::{
    CompositeValue, DebugValue, ObjectAddress, Primitive, ReferenceValue, StringValue,
};
use crate::{EvalError, TypeSignature};

/// Read access to the paused debuggee's memory.
pub trait DebuggeeMemory: Send + Sync {
    /// Copy the content of the string object at `address`.
    fn read_string(&self, address: ObjectAddress) -> Result<String, EvalError>;
}

/// Memory of a debuggee that is no longer (or not yet) attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedMemory;

impl DebuggeeMemory for DetachedMemory {
    fn read_string(&self, address: ObjectAddress) -> Result<String, EvalError> {
        Err(EvalError::ValueUnavailable(format!(
            "cannot read string at {address}: debuggee is not attached"
        )))
    }
}

/// A value as reported by the native debugging layer, before it is wrapped.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteValue {
    /// A scalar copied out of the debuggee
    Primitive(Primitive),
    /// A string object
    String(ObjectAddress),
    /// An instance of a reference type
    Object {
        /// Address of the object
        address: ObjectAddress,
        /// Runtime type of the object
        ty: TypeSignature,
    },
    /// A struct, array or other composite value
    Composite {
        /// Address of the value
        address: ObjectAddress,
        /// Runtime type of the value
        ty: TypeSignature,
    },
    /// A null reference
    Null(TypeSignature),
}

/// Creates the [`DebugValue`]s handed out by evaluators.
pub trait ValueFactory: Send + Sync {
    /// Wrap a scalar computed by the debugger.
    fn create_primitive(&self, value: Primitive) -> DebugValue {
        DebugValue::Primitive(value)
    }

    /// Wrap a string computed by the debugger.
    fn create_string(&self, content: String) -> DebugValue {
        DebugValue::String(StringValue::synthetic(content))
    }

    /// Wrap a value reported by the debuggee.
    fn create_value(&self, value: RemoteValue) -> DebugValue;
}

/// [`ValueFactory`] whose remote strings are read from the attached debuggee.
#[derive(Clone)]
pub struct DebuggeeValueFactory {
    memory: Arc<dyn DebuggeeMemory>,
}

impl DebuggeeValueFactory {
    /// Factory reading remote content through `memory`.
    pub fn new(memory: Arc<dyn DebuggeeMemory>) -> Self {
        Self { memory }
    }

    /// Factory for a detached debuggee; remote strings fail to materialize.
    pub fn detached() -> Self {
        Self::new(Arc::new(DetachedMemory))
    }
}

impl Default for DebuggeeValueFactory {
    fn default() -> Self {
        Self::detached()
    }
}

impl std::fmt::Debug for DebuggeeValueFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebuggeeValueFactory").finish_non_exhaustive()
    }
}

impl ValueFactory for DebuggeeValueFactory {
    fn create_value(&self, value: RemoteValue) -> DebugValue {
        match value {
            RemoteValue::Primitive(p) => DebugValue::Primitive(p),
            RemoteValue::String(address) => {
                DebugValue::String(StringValue::remote(address, self.memory.clone()))
            }
            RemoteValue::Object { address, ty } => {
                DebugValue::Reference(ReferenceValue::new(address, ty))
            }
            RemoteValue::Composite { address, ty } => {
                DebugValue::Composite(CompositeValue::new(address, ty))
            }
            RemoteValue::Null(ty) => DebugValue::Reference(ReferenceValue::null(ty)),
        }
    }
}
