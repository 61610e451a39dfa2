//! Foreign-call descriptors and the provider interface the core consumes.
//!
//! A foreign call leaves the compiled unit and enters host-provided code.
//! The registry mapping logical call identifiers to concrete descriptors is
//! owned by the execution host; this core only *reads* descriptor fields
//! when it encounters a call-shaped node (for example to decide whether a
//! dead call may be dropped). It never constructs descriptors itself.

use std::collections::HashMap;
use std::fmt;

use crate::{Error, Result};

/// Logical identifier of a runtime/foreign call.
///
/// Identifiers are interned static names; equality is by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignCallId(pub &'static str);

impl fmt::Display for ForeignCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Identifier of a host-embedded stub trampoline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StubId(pub &'static str);

/// Where a foreign call transfers control to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    /// A literal entry-point address in the host runtime.
    Address(u64),
    /// A reference to a stub emitted alongside compiled code.
    Stub(StubId),
}

/// Calling convention used at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// The host platform's native C convention.
    Native,
    /// The managed host runtime convention.
    Host,
}

/// Register-preservation policy of the callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterEffect {
    /// The callee preserves all registers (callee-saving stub).
    PreservesRegisters,
    /// Standard convention: caller-saved registers are destroyed.
    DestroysRegisters,
}

/// Runtime transition performed by the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A leaf call: no safepoint, floating-point state preserved.
    Leaf,
    /// A leaf call that may clobber floating-point state.
    LeafNoFp,
    /// A full transition that can reach a safepoint.
    Safepoint,
}

/// An abstract memory location a call may read or write.
///
/// Used by alias analysis elsewhere in the pipeline; within this core an
/// empty kill set marks a call as effect-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationIdentity {
    /// The call may touch any location.
    Any,
    /// A specific named location.
    Named(&'static str),
}

/// Complete call-site metadata for one logical foreign call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignCallDescriptor {
    /// The logical call this descriptor resolves.
    pub id: ForeignCallId,
    /// Entry point: literal address or embedded stub.
    pub target: CallTarget,
    /// Calling convention at the site.
    pub convention: CallingConvention,
    /// Register-preservation policy.
    pub register_effect: RegisterEffect,
    /// Reentrancy/transition class of the call.
    pub transition: Transition,
    /// Whether the call can safely be re-issued after a recoverable fault.
    pub reexecutable: bool,
    /// Abstract locations the call may read or write. Empty means the call
    /// has no memory effect.
    pub killed_locations: Vec<LocationIdentity>,
}

impl ForeignCallDescriptor {
    /// Returns `true` if the call neither writes memory nor needs to
    /// survive a fault, so a use-less call site can be dropped.
    #[must_use]
    pub fn is_removable_when_unused(&self) -> bool {
        self.reexecutable && self.killed_locations.is_empty()
    }
}

/// Resolves logical call identifiers to descriptors.
///
/// The core consumes this interface; concrete hosts implement it (usually
/// by delegating to a [`ForeignCallRegistry`] populated at bootstrap).
pub trait ForeignCallsProvider {
    /// Returns the descriptor for `id`, or `None` when the host does not
    /// provide the call. Callers must treat `None` conservatively.
    fn descriptor(&self, id: ForeignCallId) -> Option<&ForeignCallDescriptor>;
}

/// Map-backed [`ForeignCallsProvider`].
#[derive(Debug, Default)]
pub struct ForeignCallRegistry {
    descriptors: HashMap<ForeignCallId, ForeignCallDescriptor>,
}

impl ForeignCallRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateForeignCall`] if the identifier is already
    /// registered.
    pub fn register(&mut self, descriptor: ForeignCallDescriptor) -> Result<()> {
        let id = descriptor.id;
        if self.descriptors.contains_key(&id) {
            return Err(Error::DuplicateForeignCall(id.0));
        }
        self.descriptors.insert(id, descriptor);
        Ok(())
    }

    /// Returns the descriptor for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownForeignCall`] if the call is not registered.
    pub fn linkage(&self, id: ForeignCallId) -> Result<&ForeignCallDescriptor> {
        self.descriptors
            .get(&id)
            .ok_or(Error::UnknownForeignCall(id.0))
    }

    /// Returns the number of registered calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if no calls are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl ForeignCallsProvider for ForeignCallRegistry {
    fn descriptor(&self, id: ForeignCallId) -> Option<&ForeignCallDescriptor> {
        self.descriptors.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_descriptor() -> ForeignCallDescriptor {
        ForeignCallDescriptor {
            id: ForeignCallId("array_copy"),
            target: CallTarget::Address(0x7f00_0000),
            convention: CallingConvention::Native,
            register_effect: RegisterEffect::DestroysRegisters,
            transition: Transition::Leaf,
            reexecutable: true,
            killed_locations: vec![],
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ForeignCallRegistry::new();
        registry.register(sample_descriptor()).unwrap();
        assert_eq!(registry.len(), 1);

        let descriptor = registry.linkage(ForeignCallId("array_copy")).unwrap();
        assert_eq!(descriptor.target, CallTarget::Address(0x7f00_0000));
        assert!(descriptor.is_removable_when_unused());
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ForeignCallRegistry::new();
        registry.register(sample_descriptor()).unwrap();
        assert!(matches!(
            registry.register(sample_descriptor()),
            Err(Error::DuplicateForeignCall(_))
        ));
    }

    #[test]
    fn test_unknown_call() {
        let registry = ForeignCallRegistry::new();
        assert!(matches!(
            registry.linkage(ForeignCallId("missing")),
            Err(Error::UnknownForeignCall(_))
        ));
        assert!(registry.descriptor(ForeignCallId("missing")).is_none());
    }

    #[test]
    fn test_effectful_call_not_removable() {
        let descriptor = ForeignCallDescriptor {
            killed_locations: vec![LocationIdentity::Any],
            ..sample_descriptor()
        };
        assert!(!descriptor.is_removable_when_unused());

        let not_reexecutable = ForeignCallDescriptor {
            reexecutable: false,
            ..sample_descriptor()
        };
        assert!(!not_reexecutable.is_removable_when_unused());
    }
}
