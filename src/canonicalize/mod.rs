//! Local rewriting toward canonical form.
//!
//! Canonicalization replaces nodes by cheaper equivalents wherever the
//! proven facts decide them: type tests fold to constants or null tests,
//! proven guards disappear, double negations cancel, counters retire
//! themselves, and dead floating values are swept. The pass is a worklist
//! fixpoint with a strictly decreasing termination measure.

mod canonicalizer;
mod synonym;

pub use canonicalizer::Canonicalizer;
pub use synonym::{find_synonym, try_fold, Synonym};
