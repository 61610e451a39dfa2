//! The interface every optimization pass implements.

use crate::ir::Graph;
use crate::pipeline::EventLog;
use crate::Result;

/// One graph-to-graph optimization.
///
/// A pass mutates the graph in place and reports whether it changed
/// anything, so the driver can iterate pass sequences to a fixpoint.
/// Passes must keep the graph's edge and control-chain invariants intact
/// across the whole run, not only at the end.
pub trait GraphPass {
    /// Short stable name for logs and reports.
    fn name(&self) -> &'static str;

    /// One-line human description.
    fn description(&self) -> &'static str;

    /// Runs the pass once. Returns `true` if the graph changed.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures outside the graph itself (a
    /// malformed graph is a bug and asserts instead).
    fn run(&self, graph: &mut Graph, events: &EventLog) -> Result<bool>;
}
