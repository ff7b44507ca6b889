//! Core data types shared across the caching layer
//!
//! # Key Types
//!
//! - **`TimeRange`**: A half-open query interval in milliseconds
//! - **`ValueKind`**: Declared type of a dimension, aggregator, or
//!   post-aggregator output column
//!
//! # Example
//!
//! ```rust
//! use aggcache::types::{TimeRange, ValueKind};
//!
//! let range = TimeRange::new(1_000, 2_000).unwrap();
//! assert!(range.contains(1_500));
//! assert_eq!(ValueKind::Float.name(), "float");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::key::encoder::{KeyEncoder, KeyFragment};

const INTERVAL_TAG: u8 = 0x01;

/// A half-open time interval `[start, end)` in milliseconds
///
/// Queries carry one or more of these; they participate in segment-level
/// cache keys because they determine which data is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start in milliseconds since the epoch
    pub start: i64,

    /// Exclusive end in milliseconds since the epoch
    pub end: i64,
}

impl TimeRange {
    /// Create a new time range, validating that start precedes end
    pub fn new(start: i64, end: i64) -> Result<Self, SpecError> {
        if start >= end {
            return Err(SpecError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Check whether a timestamp falls inside this range
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// Duration of the range in milliseconds
    pub fn duration_millis(&self) -> i64 {
        self.end - self.start
    }
}

impl KeyFragment for TimeRange {
    fn write_key(&self, key: &mut KeyEncoder) {
        key.push_byte(INTERVAL_TAG);
        key.push_i64(self.start);
        key.push_i64(self.end);
    }
}

/// Declared type of an output column
///
/// Dimensions may declare one to drive exact reconstruction from the cache;
/// aggregators and post-aggregators always have one. The kind participates
/// in cache keys and selects decode behavior in the row codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// UTF-8 string
    String,

    /// 32-bit floating point
    Float,

    /// 64-bit floating point
    Double,

    /// 64-bit signed integer
    Long,
}

impl ValueKind {
    /// Stable lowercase name, used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Float => "float",
            ValueKind::Double => "double",
            ValueKind::Long => "long",
        }
    }

    /// Stable single-byte tag used by the canonical key encoding
    pub(crate) fn key_tag(&self) -> u8 {
        match self {
            ValueKind::String => 0x01,
            ValueKind::Float => 0x02,
            ValueKind::Double => 0x03,
            ValueKind::Long => 0x04,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
