//! Allocation virtualization.
//!
//! An allocation that never escapes does not need to exist: every usage
//! that can be decided from the allocation's exact, non-null fact is
//! decided, and once nothing observes the object anymore the allocation
//! itself disappears. Virtual objects live only for the duration of one
//! pass run; this engine never materializes one back into the graph.

mod object;
mod tool;
mod virtualizer;

pub use object::{VirtualObject, VirtualObjectId};
pub use tool::{AliasTarget, VirtualizerTool};
pub use virtualizer::Virtualizer;
