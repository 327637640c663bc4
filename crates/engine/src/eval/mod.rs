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

//! Expression compilation and evaluation.
//!
//! Every expression node implements [`ExpressionEvaluator`]. A tree is built
//! from already parsed nodes, compiled once to resolve static types and bind
//! computations, and then evaluated against the paused debuggee as often as
//! needed.
//!
//! # Main Components
//!
//! - [`BinaryExpressionEvaluator`] - binary operators, with the host language's
//!   promotion, overflow and short-circuit rules
//! - [`Computation`] - the strategy a binary node binds at compile time
//! - [`LiteralEvaluator`] and [`LiveCallEvaluator`] - leaves
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use mdb_engine::eval::*;
//!
//! let mut expr = BinaryExpressionEvaluator::new(
//!     BinaryOperator::Gt,
//!     Box::new(LiveCallEvaluator::new("get_Count").with_receiver(list)),
//!     Box::new(LiteralEvaluator::primitive(10i32)),
//! );
//! expr.compile(&context, &mut sink)?;
//! let value = expr.evaluate(&session, &factory, &mut sink)?;
//! ```

mod binary;
mod computation;
mod evaluator;
mod literal;
mod live_call;
mod operator;

pub use binary::BinaryExpressionEvaluator;
pub use computation::Computation;
pub use evaluator::{CompileContext, EmptyCompileContext, ExpressionEvaluator};
pub use literal::LiteralEvaluator;
pub use live_call::LiveCallEvaluator;
pub use operator::{BinaryOperator, OperatorFamily};
