//! Fixpoint driver alternating the optimization passes.

use rayon::prelude::*;

use crate::calls::ForeignCallsProvider;
use crate::canonicalize::Canonicalizer;
use crate::ir::Graph;
use crate::pipeline::{EventLog, GraphPass};
use crate::virtualize::Virtualizer;
use crate::Result;

/// Runs a pass sequence round after round until nothing changes.
///
/// Every individual rewrite strictly shrinks the graph's kind-weighted
/// size, so the fixpoint is reached well before `max_iterations` on any
/// sane graph; the cap is a backstop, not a tuning knob.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use seagraph::ir::Graph;
/// use seagraph::pipeline::{EventLog, Optimizer};
/// use seagraph::stamp::TypeHierarchy;
///
/// let mut graph = Graph::new(Arc::new(TypeHierarchy::new()));
/// let events = EventLog::new();
/// let rounds = Optimizer::new().optimize(&mut graph, &events).unwrap();
/// assert!(rounds >= 1);
/// ```
pub struct Optimizer<'p> {
    passes: Vec<Box<dyn GraphPass + Sync + 'p>>,
    max_iterations: usize,
    stable_iterations: usize,
}

impl Default for Optimizer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'p> Optimizer<'p> {
    /// Creates the default pipeline: canonicalization alternating with
    /// virtualization, foreign calls kept conservatively.
    #[must_use]
    pub fn new() -> Self {
        Self {
            passes: vec![Box::new(Canonicalizer::new()), Box::new(Virtualizer::new())],
            max_iterations: 10,
            stable_iterations: 1,
        }
    }

    /// Creates the default pipeline with foreign-call descriptors from the
    /// host, enabling dead-call removal.
    #[must_use]
    pub fn with_foreign_calls(provider: &'p (dyn ForeignCallsProvider + Sync)) -> Self {
        Self {
            passes: vec![
                Box::new(Canonicalizer::with_foreign_calls(provider)),
                Box::new(Virtualizer::new()),
            ],
            ..Self::new()
        }
    }

    /// Appends a pass to the sequence.
    #[must_use]
    pub fn add_pass(mut self, pass: impl GraphPass + Sync + 'p) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Caps the number of rounds.
    #[must_use]
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Number of consecutive change-free rounds required before stopping.
    #[must_use]
    pub fn stable_iterations(mut self, iterations: usize) -> Self {
        self.stable_iterations = iterations.max(1);
        self
    }

    /// Optimizes one graph to a fixpoint.
    ///
    /// Returns the number of rounds that ran, including the final
    /// change-free rounds that established stability.
    ///
    /// # Errors
    ///
    /// Propagates the first pass error.
    pub fn optimize(&self, graph: &mut Graph, events: &EventLog) -> Result<usize> {
        let mut rounds = 0;
        let mut stable = 0;
        while rounds < self.max_iterations {
            rounds += 1;
            let mut changed = false;
            for pass in &self.passes {
                if pass.run(graph, events)? {
                    changed = true;
                }
            }
            if changed {
                stable = 0;
            } else {
                stable += 1;
                if stable >= self.stable_iterations {
                    break;
                }
            }
        }
        Ok(rounds)
    }

    /// Optimizes independent graphs in parallel against a shared event
    /// log. Returns the per-graph round counts in input order.
    ///
    /// # Errors
    ///
    /// Propagates the first pass error.
    pub fn optimize_all(&self, graphs: &mut [Graph], events: &EventLog) -> Result<Vec<usize>> {
        graphs
            .par_iter_mut()
            .map(|graph| self.optimize(graph, events))
            .collect()
    }
}
