// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # seagraph
//!
//! A graph-based compiler intermediate representation with a type-fact
//! lattice and the optimization passes that exploit it: canonicalization
//! (stamp-driven folding of tests and guards to a fixpoint) and
//! virtualization (escape-analysis style elimination of allocations that
//! never materialize).
//!
//! ## Architecture
//!
//! - [`stamp`] — the fact lattice: what is statically known about a value
//!   (class, exactness, nullness), with `join` answering "both facts at
//!   once" and `meet` answering "either fact".
//! - [`ir`] — the node graph: fixed nodes on a linear control sequence,
//!   floating nodes held only by data edges, and the sanctioned mutation
//!   operations that keep input and usage edges paired.
//! - [`canonicalize`] — worklist rewriting of every node to its cheapest
//!   proven-equivalent form, with a strictly decreasing termination
//!   measure.
//! - [`virtualize`] — two-phase allocation elimination through a per-run
//!   alias map.
//! - [`calls`] — descriptors for calls out of compiled code into the host
//!   runtime, consumed (never built) by the passes.
//! - [`pipeline`] — the pass interface, the fixpoint driver, and the
//!   structured event log passes report into.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use seagraph::ir::{Graph, Node, NodeKind};
//! use seagraph::pipeline::{EventLog, Optimizer};
//! use seagraph::stamp::{ObjectStamp, Stamp, TypeHierarchy};
//!
//! # fn main() -> seagraph::Result<()> {
//! let mut types = TypeHierarchy::new();
//! let shape = types.define_class("Shape", None)?;
//! let circle = types.define_class("Circle", Some(shape))?;
//!
//! // (circle_value instanceof Shape) is decided by the facts alone.
//! let mut graph = Graph::new(Arc::new(types));
//! let value = graph.add(Node::new(
//!     NodeKind::Parameter { index: 0 },
//!     Stamp::Object(ObjectStamp::exact_non_null(circle)),
//!     vec![],
//! ));
//! let test = graph.add(Node::new(
//!     NodeKind::InstanceOf { checked: ObjectStamp::non_null_of(shape) },
//!     Stamp::Boolean,
//!     vec![value],
//! ));
//! graph.append_fixed(Node::new(NodeKind::Return, Stamp::Void, vec![test]));
//!
//! let events = EventLog::new();
//! Optimizer::new().optimize(&mut graph, &events)?;
//! assert!(!graph.contains(test));
//! # Ok(())
//! # }
//! ```

pub mod calls;
pub mod canonicalize;
pub mod ir;
pub mod pipeline;
pub mod prelude;
pub mod stamp;
pub mod virtualize;

mod error;

/// The error type for all fallible operations of this library.
pub use error::Error;

/// The result type used throughout this library.
pub type Result<T> = std::result::Result<T, Error>;
