//! Pass interface, fixpoint driver, and event reporting.
//!
//! A compilation pipeline is a sequence of [`GraphPass`]es the
//! [`Optimizer`] alternates until a full round changes nothing. Passes
//! report what they did to a shared, lock-free [`EventLog`]; independent
//! graphs optimize in parallel.

mod events;
mod optimizer;
mod pass;

pub use events::{Event, EventBuilder, EventKind, EventLog};
pub use optimizer::Optimizer;
pub use pass::GraphPass;
