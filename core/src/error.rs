//! Error types for parameter tree operations.
//!
//! Provides a unified error type covering value conversion, path resolution,
//! and restriction attachment failures.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors that can occur when converting values or resolving paths.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// A value was extracted or converted as an incompatible kind.
    #[error("cannot convert {from} value to {to}")]
    WrongKind {
        /// Kind of the value being converted.
        from: ValueKind,
        /// Requested target type.
        to: &'static str,
    },

    /// A numeric conversion would lose information.
    #[error("integer {value} out of range for {target}")]
    OutOfRange {
        /// The stored value that did not fit.
        value: i128,
        /// Requested target type.
        target: &'static str,
    },

    /// A string value could not be read as a boolean marker.
    #[error("cannot convert {0:?} to bool, expected \"true\" or \"false\"")]
    NotBool(String),

    /// A path did not resolve to an entry or section.
    #[error("parameter not found: {0}")]
    NotFound(String),

    /// A restriction was attached to an entry of an incompatible kind.
    #[error("restriction does not match the {kind} value at '{path}'")]
    RestrictionKindMismatch {
        /// Path of the entry the restriction was attached to.
        path: String,
        /// Kind of the entry's current value.
        kind: ValueKind,
    },
}

/// Convenience alias for results with [`ParamError`].
pub type Result<T> = std::result::Result<T, ParamError>;
