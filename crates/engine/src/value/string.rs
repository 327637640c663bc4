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

//! String values, copied out of the debuggee on first use.

use std::{fmt, sync::Arc};

use once_cell::sync::OnceCell;
use tracing::trace;

use super::{DebuggeeMemory, ObjectAddress};
use crate::EvalError;

/// A `System.String`, either produced by the debugger or living in the debuggee.
///
/// Remote content is read at most once; concurrent readers block on the first
/// read and then share its result.
#[derive(Clone)]
pub struct StringValue {
    address: Option<ObjectAddress>,
    memory: Option<Arc<dyn DebuggeeMemory>>,
    content: OnceCell<String>,
}

impl StringValue {
    /// A string created by the debugger, e.g. from a literal.
    pub fn synthetic(content: impl Into<String>) -> Self {
        Self { address: None, memory: None, content: OnceCell::with_value(content.into()) }
    }

    /// A string object at `address` in the debuggee, read lazily through `memory`.
    pub fn remote(address: ObjectAddress, memory: Arc<dyn DebuggeeMemory>) -> Self {
        Self { address: Some(address), memory: Some(memory), content: OnceCell::new() }
    }

    /// Address of the string object, if it lives in the debuggee.
    pub fn address(&self) -> Option<ObjectAddress> {
        self.address
    }

    /// Whether the content has already been copied out of the debuggee.
    pub fn is_materialized(&self) -> bool {
        self.content.get().is_some()
    }

    /// String content, reading it from the debuggee on first access.
    pub fn content(&self) -> Result<&str, EvalError> {
        self.content
            .get_or_try_init(|| match (&self.memory, self.address) {
                (Some(memory), Some(address)) => {
                    trace!(%address, "materializing remote string");
                    memory.read_string(address)
                }
                _ => Err(EvalError::ValueUnavailable("string has no backing storage".into())),
            })
            .map(String::as_str)
    }
}

impl fmt::Debug for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringValue")
            .field("address", &self.address)
            .field("content", &self.content.get())
            .finish()
    }
}
