//! Foreign/runtime-call interface boundary.
//!
//! Code compiled from a graph occasionally calls out into the host runtime
//! (allocation slow paths, array copies, deoptimization handlers). The
//! registry mapping logical calls to concrete call sites belongs to the
//! host; this module defines the descriptor shape and the narrow
//! [`ForeignCallsProvider`] interface the core reads through.

mod descriptor;

pub use descriptor::{
    CallTarget, CallingConvention, ForeignCallDescriptor, ForeignCallId, ForeignCallRegistry,
    ForeignCallsProvider, LocationIdentity, RegisterEffect, StubId, Transition,
};
