//! Structured record of what the passes did.
//!
//! Passes append [`Event`]s while they rewrite; the log is lock-free and
//! append-only so parallel compilations can share one sink without
//! coordination. Events are diagnostics, never inputs: no pass reads the
//! log to make a decision.

use std::fmt;

use strum::Display;

use crate::ir::NodeId;

/// What a single event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    /// A node was replaced by a cheaper equivalent.
    Canonicalized,
    /// A dead node was swept.
    Deleted,
    /// A proven null-check guard was removed.
    GuardRemoved,
    /// A weak counter retired itself.
    CounterEliminated,
    /// A use-less foreign call was dropped.
    CallRemoved,
    /// An allocation was proven non-escaping and removed.
    AllocationEliminated,
    /// A node was decided through the alias of a virtualized allocation.
    Virtualized,
}

/// One recorded pass action.
#[derive(Debug, Clone)]
pub struct Event {
    kind: EventKind,
    node: Option<NodeId>,
    message: Option<String>,
}

impl Event {
    /// Returns what happened.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the node the event concerns, if any.
    #[must_use]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Returns the free-form detail, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(node) = self.node {
            write!(f, " {node}")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

/// Append-only event sink shared by all passes of a compilation.
///
/// # Examples
///
/// ```rust
/// use seagraph::pipeline::{EventKind, EventLog};
///
/// let log = EventLog::new();
/// log.record(EventKind::Deleted).message("unused constant");
/// assert_eq!(log.count_of(EventKind::Deleted), 1);
/// ```
#[derive(Debug, Default)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts recording one event; the event is committed when the
    /// returned builder is dropped.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder {
            log: self,
            event: Some(Event {
                kind,
                node: None,
                message: None,
            }),
        }
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Returns how many events of `kind` were recorded.
    #[must_use]
    pub fn count_of(&self, kind: EventKind) -> usize {
        self.iter().filter(|event| event.kind() == kind).count()
    }

    /// Iterates the events in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, event)| event)
    }

    /// Moves every event of `other` into this log.
    pub fn merge(&self, other: EventLog) {
        for event in other.events {
            self.events.push(event);
        }
    }
}

/// In-progress event; commits to the log on drop.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    event: Option<Event>,
}

impl EventBuilder<'_> {
    /// Attaches the node the event concerns.
    pub fn at(mut self, node: NodeId) -> Self {
        if let Some(event) = &mut self.event {
            event.node = Some(node);
        }
        self
    }

    /// Attaches free-form detail.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(event) = &mut self.event {
            event.message = Some(message.into());
        }
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        if let Some(event) = self.event.take() {
            self.log.events.push(event);
        }
    }
}
