use thiserror::Error;

/// The generic Error type covering every recoverable failure this library
/// can return.
///
/// Structural invariant violations inside a graph (dangling edges, illegal
/// removals) are programming errors of the calling pass and assert instead
/// of returning a variant; the variants here cover the configuration
/// surfaces a host drives, where bad input is a normal runtime condition.
#[derive(Error, Debug)]
pub enum Error {
    /// A class with this name is already defined in the hierarchy.
    #[error("class '{0}' is already defined")]
    DuplicateClass(String),

    /// No class with this name exists in the hierarchy.
    #[error("class '{0}' is not defined")]
    ClassNotFound(String),

    /// A foreign call with this identifier is already registered.
    #[error("foreign call '{0}' is already registered")]
    DuplicateForeignCall(&'static str),

    /// No foreign call with this identifier is registered.
    #[error("foreign call '{0}' is not registered")]
    UnknownForeignCall(&'static str),
}
