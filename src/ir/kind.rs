//! The closed set of node kinds and their static properties.
//!
//! Node behavior in the rewrite engine is dispatched over [`NodeKind`], a
//! closed enum: every kind the engine knows is listed here, which keeps the
//! canonicalizer and virtualizer exhaustively checkable. Kind-specific data
//! lives in named variant fields; capabilities and placement defaults are
//! exposed as [`KindFlags`].

use bitflags::bitflags;
use strum::IntoStaticStr;

use crate::calls::ForeignCallId;
use crate::stamp::{ClassId, ObjectStamp, Stamp};

bitflags! {
    /// Static properties of a node kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KindFlags: u8 {
        /// The node occupies a position in the control sequence.
        const FIXED = 1 << 0;
        /// The node has an observable effect and must never be removed by
        /// the dead-code sweep (removal goes through an explicit rewrite
        /// outcome instead).
        const SIDE_EFFECT = 1 << 1;
        /// The node produces a logic (boolean) value.
        const LOGIC = 1 << 2;
        /// The node participates in virtualization.
        const VIRTUALIZABLE = 1 << 3;
        /// The node re-evaluates a self-elimination predicate on every
        /// canonicalizer visit.
        const SIMPLIFIABLE = 1 << 4;
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstValue {
    /// A logic constant.
    Bool(bool),
    /// A machine integer constant.
    Int(i64),
    /// The null reference.
    Null,
}

impl ConstValue {
    /// Returns the stamp describing this constant.
    #[must_use]
    pub const fn stamp(&self) -> Stamp {
        match self {
            Self::Bool(_) => Stamp::Boolean,
            Self::Int(_) => Stamp::Integer,
            Self::Null => Stamp::Object(ObjectStamp::always_null()),
        }
    }
}

/// The kind of a graph node, with kind-specific data.
///
/// # Input conventions
///
/// Inputs are positional per kind and documented on each variant; the
/// counter kinds deliberately carry `group`/`name` as named fields so no
/// positional constructor can swap them.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    /// Graph entry point. Fixed; no inputs; every graph has exactly one.
    Start,

    /// Control exit. Fixed; input 0 (optional) is the returned value.
    Return,

    /// An incoming parameter of the compiled unit. Floating; no inputs.
    Parameter {
        /// Position in the unit's signature.
        index: u16,
    },

    /// A compile-time constant. Floating; no inputs. Constants are
    /// deduplicated per graph (see [`Graph::constant`]).
    ///
    /// [`Graph::constant`]: crate::ir::Graph::constant
    Constant {
        /// The constant value.
        value: ConstValue,
    },

    /// A null-check guard. Fixed, side-effecting; input 0 is the guarded
    /// value. Canonicalizes to a no-op delete once the value is known
    /// non-null.
    NullCheck,

    /// Logic test for nullness. Floating; input 0 is the tested value.
    IsNull,

    /// Logic negation. Floating; input 0 is the negated logic value.
    LogicNegation,

    /// A runtime type test. Floating; input 0 is the tested value.
    InstanceOf {
        /// The fact the test checks for; non-null by construction since
        /// `null` never passes a type test.
        checked: ObjectStamp,
    },

    /// Allocation of a fresh instance. Fixed; no inputs. The produced
    /// stamp is exact and non-null.
    NewInstance {
        /// Class being instantiated.
        class: ClassId,
    },

    /// A profiling counter bumped whenever control passes it. Fixed,
    /// side-effecting; input 0 is the increment value.
    DynamicCounter {
        /// Counter group for reporting.
        group: String,
        /// Counter name within the group.
        name: String,
    },

    /// A counter that only wants to fire when an associated value has
    /// observable uses besides the counter itself. Fixed, side-effecting;
    /// input 0 is the increment, input 1 the tracked value. Self-eliminates
    /// when the tracked value is floating and the counter is its sole
    /// remaining usage; a fixed tracked value executes regardless, so the
    /// counter stays.
    WeakCounter {
        /// Counter group for reporting.
        group: String,
        /// Counter name within the group.
        name: String,
    },

    /// A call out of the compiled unit into host-provided code. Fixed,
    /// side-effecting; inputs are the call arguments. Descriptor fields
    /// are read from the host's registry, never stored here.
    ForeignCall {
        /// Logical identifier resolved through the host registry.
        call: ForeignCallId,
    },
}

impl NodeKind {
    /// Returns the static properties of this kind.
    #[must_use]
    pub const fn flags(&self) -> KindFlags {
        match self {
            Self::Start => KindFlags::FIXED,
            Self::Return => KindFlags::FIXED.union(KindFlags::SIDE_EFFECT),
            Self::Parameter { .. } | Self::Constant { .. } => KindFlags::empty(),
            Self::NullCheck => KindFlags::FIXED.union(KindFlags::SIDE_EFFECT),
            Self::IsNull | Self::LogicNegation => KindFlags::LOGIC,
            Self::InstanceOf { .. } => KindFlags::LOGIC.union(KindFlags::VIRTUALIZABLE),
            Self::NewInstance { .. } => KindFlags::FIXED.union(KindFlags::VIRTUALIZABLE),
            Self::DynamicCounter { .. } => KindFlags::FIXED.union(KindFlags::SIDE_EFFECT),
            Self::WeakCounter { .. } => KindFlags::FIXED
                .union(KindFlags::SIDE_EFFECT)
                .union(KindFlags::SIMPLIFIABLE)
                .union(KindFlags::VIRTUALIZABLE),
            Self::ForeignCall { .. } => KindFlags::FIXED.union(KindFlags::SIDE_EFFECT),
        }
    }

    /// Returns the static kind name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Returns the required input count, or `None` for variadic kinds.
    #[must_use]
    pub const fn input_arity(&self) -> Option<usize> {
        match self {
            Self::Start | Self::Parameter { .. } | Self::Constant { .. }
            | Self::NewInstance { .. } => Some(0),
            Self::NullCheck
            | Self::IsNull
            | Self::LogicNegation
            | Self::InstanceOf { .. }
            | Self::DynamicCounter { .. } => Some(1),
            Self::WeakCounter { .. } => Some(2),
            Self::Return | Self::ForeignCall { .. } => None,
        }
    }

    /// Returns `true` if nodes of this kind live in the control sequence.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.flags().contains(KindFlags::FIXED)
    }

    /// Returns `true` if nodes of this kind have an observable effect.
    #[must_use]
    pub const fn has_side_effect(&self) -> bool {
        self.flags().contains(KindFlags::SIDE_EFFECT)
    }

    /// Weight of this kind in the rewrite termination measure.
    ///
    /// Every applied rewrite must strictly decrease the sum of weights over
    /// live nodes, which bounds the fixpoint loop: a kind weighs more than
    /// the heaviest combination of nodes a single rewrite of it can create
    /// (a type test may expand into a negation plus a null test plus a
    /// reused constant, so it weighs five against their four).
    #[must_use]
    pub const fn reduction_weight(&self) -> usize {
        match self {
            Self::InstanceOf { .. } => 5,
            Self::WeakCounter { .. } => 3,
            Self::IsNull
            | Self::LogicNegation
            | Self::NullCheck
            | Self::DynamicCounter { .. }
            | Self::ForeignCall { .. } => 2,
            _ => 1,
        }
    }
}
