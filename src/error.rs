//! Error types for the caching layer

use thiserror::Error;

/// Main error type for the caching layer
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (unsupported aggregator codec, bad config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Specification error
    #[error("Specification error: {0}")]
    Spec(#[from] SpecError),

    /// Cache entry decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while constructing a query specification
///
/// These indicate a caller bug: a specification that fails validation here
/// would never have been accepted by the query planner.
#[derive(Error, Debug)]
pub enum SpecError {
    /// Data source name is empty
    #[error("Data source must not be empty")]
    EmptyDataSource,

    /// Specification has no query intervals
    #[error("Specification requires at least one interval")]
    MissingIntervals,

    /// Interval start is not before its end
    #[error("Invalid interval: start {start} must be less than end {end}")]
    InvalidInterval {
        /// Interval start in milliseconds
        start: i64,
        /// Interval end in milliseconds
        end: i64,
    },

    /// Two output columns share the same name
    #[error("Duplicate output column: {0}")]
    DuplicateOutputName(String),
}

/// Errors raised while decoding a cache-storable row
///
/// A decode failure means the cached entry is corrupted or was written by an
/// incompatible specification. Callers must treat it as a cache miss and
/// recompute, never surface it as a query failure.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Cached row has the wrong number of positional values
    #[error("Cached row has {actual} values, expected {expected}")]
    Arity {
        /// Number of values the bound specification requires
        expected: usize,
        /// Number of values present in the cached row
        actual: usize,
    },

    /// Position 0 did not hold an integer millisecond timestamp
    #[error("Cached row timestamp is {actual}, expected an integer")]
    InvalidTimestamp {
        /// Container kind found at position 0
        actual: &'static str,
    },

    /// A positional value had an unexpected container kind
    #[error("Position {position} ({column}): expected {expected}, got {actual}")]
    TypeMismatch {
        /// Zero-based position in the cached row
        position: usize,
        /// Output column the position maps to
        column: String,
        /// Container kind the specification requires
        expected: &'static str,
        /// Container kind actually present
        actual: &'static str,
    },

    /// An intermediate (timestamp, payload) pair was not a two-element list
    #[error("Position {position} ({column}): malformed intermediate pair")]
    MalformedPair {
        /// Zero-based position in the cached row
        position: usize,
        /// Output column the position maps to
        column: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
