//! Aggregator specifications and their intermediate-value type descriptors
//!
//! An aggregator describes one accumulation over scanned rows: its output
//! name, input column, and accumulation kind. The kind fixes two types the
//! caching layer cares about:
//!
//! - the *intermediate* type: the partial accumulation state cached at
//!   segment level, which must stay combinable across segments
//! - the *finalized* type: the value exposed after combining, cached at
//!   result level
//!
//! The row codec never interprets accumulation internals; it only asks the
//! aggregator for its [`IntermediateKind`] and dispatches on that tag.

use crate::error::Error;
use crate::key::encoder::{KeyEncoder, KeyFragment};
use crate::types::ValueKind;

/// How an aggregator accumulates scanned values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulationKind {
    /// Row count
    Count,

    /// Running sum of the input column
    Sum(ValueKind),

    /// Minimum of the input column
    Min(ValueKind),

    /// Maximum of the input column
    Max(ValueKind),

    /// Latest non-null observation of the input column, tracked with the
    /// observation timestamp so partials combine correctly across segments
    Last(ValueKind),

    /// Approximate distinct count backed by a sketch. The sketch state has
    /// no intermediate cache codec, so queries using it are not cacheable.
    DistinctSketch,
}

impl AccumulationKind {
    /// Stable single-byte tag used by the canonical key encoding
    fn key_tag(&self) -> u8 {
        match self {
            AccumulationKind::Count => 0x20,
            AccumulationKind::Sum(_) => 0x21,
            AccumulationKind::Min(_) => 0x22,
            AccumulationKind::Max(_) => 0x23,
            AccumulationKind::Last(_) => 0x24,
            AccumulationKind::DistinctSketch => 0x25,
        }
    }

    fn value_kind(&self) -> Option<ValueKind> {
        match self {
            AccumulationKind::Sum(k)
            | AccumulationKind::Min(k)
            | AccumulationKind::Max(k)
            | AccumulationKind::Last(k) => Some(*k),
            AccumulationKind::Count | AccumulationKind::DistinctSketch => None,
        }
    }
}

impl std::fmt::Display for AccumulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccumulationKind::Count => write!(f, "count"),
            AccumulationKind::Sum(k) => write!(f, "sum({k})"),
            AccumulationKind::Min(k) => write!(f, "min({k})"),
            AccumulationKind::Max(k) => write!(f, "max({k})"),
            AccumulationKind::Last(k) => write!(f, "last({k})"),
            AccumulationKind::DistinctSketch => write!(f, "distinct-sketch"),
        }
    }
}

/// Type tag of an aggregator's intermediate (partial) value
///
/// Selects codec behavior when segment-level partials round-trip through
/// the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntermediateKind {
    /// Plain 64-bit integer accumulation state
    Long,

    /// Plain 64-bit float accumulation state
    Double,

    /// Plain 32-bit float accumulation state
    Float,

    /// A (timestamp, payload) pair, payload typed by the inner kind
    Timed(ValueKind),
}

/// An aggregator specification: output name, input column, accumulation kind
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorSpec {
    /// Output column name in the result row
    pub name: String,

    /// Input column read from scanned rows; `None` for row counts
    pub field: Option<String>,

    /// Accumulation kind
    pub kind: AccumulationKind,
}

impl AggregatorSpec {
    /// Row-count aggregator
    pub fn count(name: &str) -> Self {
        Self {
            name: name.to_string(),
            field: None,
            kind: AccumulationKind::Count,
        }
    }

    /// 64-bit integer sum
    pub fn long_sum(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::Sum(ValueKind::Long))
    }

    /// 64-bit float sum
    pub fn double_sum(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::Sum(ValueKind::Double))
    }

    /// 32-bit float sum
    pub fn float_sum(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::Sum(ValueKind::Float))
    }

    /// Latest 64-bit integer observation
    pub fn long_last(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::Last(ValueKind::Long))
    }

    /// Latest 64-bit float observation
    pub fn double_last(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::Last(ValueKind::Double))
    }

    /// Latest 32-bit float observation
    pub fn float_last(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::Last(ValueKind::Float))
    }

    /// Latest string observation
    pub fn string_last(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::Last(ValueKind::String))
    }

    /// Approximate distinct count (not cacheable)
    pub fn distinct_sketch(name: &str, field: &str) -> Self {
        Self::of(name, field, AccumulationKind::DistinctSketch)
    }

    /// Aggregator with an explicit accumulation kind
    pub fn of(name: &str, field: &str, kind: AccumulationKind) -> Self {
        Self {
            name: name.to_string(),
            field: Some(field.to_string()),
            kind,
        }
    }

    /// Intermediate-value type tag, or a configuration error when the
    /// accumulation kind has no intermediate cache codec
    pub fn intermediate_kind(&self) -> Result<IntermediateKind, Error> {
        match self.kind {
            AccumulationKind::Count => Ok(IntermediateKind::Long),
            AccumulationKind::Sum(k) | AccumulationKind::Min(k) | AccumulationKind::Max(k) => {
                match k {
                    ValueKind::Long => Ok(IntermediateKind::Long),
                    ValueKind::Double => Ok(IntermediateKind::Double),
                    ValueKind::Float => Ok(IntermediateKind::Float),
                    ValueKind::String => Err(self.no_codec()),
                }
            }
            AccumulationKind::Last(k) => Ok(IntermediateKind::Timed(k)),
            AccumulationKind::DistinctSketch => Err(self.no_codec()),
        }
    }

    /// Type of the finalized (combined) output value
    pub fn finalized_kind(&self) -> ValueKind {
        match self.kind {
            AccumulationKind::Count | AccumulationKind::DistinctSketch => ValueKind::Long,
            _ => self.kind.value_kind().unwrap_or(ValueKind::Double),
        }
    }

    fn no_codec(&self) -> Error {
        Error::Configuration(format!(
            "aggregator '{}' ({}) has no intermediate cache codec",
            self.name, self.kind
        ))
    }
}

impl KeyFragment for AggregatorSpec {
    fn write_key(&self, key: &mut KeyEncoder) {
        key.push_byte(self.kind.key_tag());
        key.push_byte(self.kind.value_kind().map(|k| k.key_tag()).unwrap_or(0x00));
        key.push_str(&self.name);
        key.push_opt_str(self.field.as_deref());
    }
}

// ============================================================================
// Tests
// ============================================================================
