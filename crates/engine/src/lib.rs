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

//! MDB Engine - expression evaluation for managed debuggees
//!
//! This crate compiles already parsed expression nodes into typed evaluators
//! and runs them against the values of a paused debuggee. Live method and
//! property calls are carried out through an [`EvalSession`], which hands
//! them to the debuggee-control thread and waits for the outcome.

/// Cross-thread coordination of live evaluations
pub mod coordinator;
/// Error types and the diagnostic sink
pub mod error;
/// Expression evaluator contract and node implementations
pub mod eval;
/// Test doubles for evaluators, debuggee memory and the native debugging layer
pub mod test_utils;
/// Element kinds, type signatures and numeric promotion
pub mod types;
/// Debug value model and value factory
pub mod value;

pub use coordinator::*;
pub use error::*;
pub use eval::*;
pub use types::*;
pub use value::*;
