//! Error types for introspection and the object runtime

use thiserror::Error;

/// Errors surfaced by the property adaptor and connection models.
///
/// Routine conditions (unbound handle, destroyed object) never produce an
/// error; they degrade to empty results instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// Property index past `count()`
    #[error("Property index {index} out of range (count: {count})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of properties on the bound object
        count: usize,
    },
}

/// Errors raised while building metadata or wiring connections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetaError {
    /// A signal signature that the class does not declare
    #[error("Unknown signal {signature} on {class}")]
    UnknownSignal {
        /// Class that was searched
        class: String,
        /// Normalized signature that was requested
        signature: String,
    },

    /// A method signature that the class does not declare
    #[error("Unknown method {signature} on {class}")]
    UnknownMethod {
        /// Class that was searched
        class: String,
        /// Normalized signature that was requested
        signature: String,
    },

    /// The method exists but cannot be connected to as a signal
    #[error("Method {index} on {class} is not a signal")]
    NotASignal {
        /// Class that was searched
        class: String,
        /// Global method index
        index: usize,
    },

    /// Method index past the class's method count
    #[error("Invalid method index {index} on {class} (count: {count})")]
    InvalidMethodIndex {
        /// Class that was searched
        class: String,
        /// Requested index
        index: usize,
        /// Number of methods on the class
        count: usize,
    },
}

/// Result type alias for adaptor operations
pub type Result<T> = std::result::Result<T, InspectError>;
