//! aggcache - Result caching layer for an aggregation query engine
//!
//! This library sits between a query planner and a byte-keyed cache store,
//! providing:
//! - Two-tier cache key derivation (segment-level and result-level) from a
//!   structured query specification
//! - A deterministic, collision-resistant canonical byte encoding for
//!   every query sub-specification
//! - A positional row codec with documented, cache-compatible numeric
//!   coercion
//! - A per-query cache strategy façade with a cacheability probe
//!
//! All operations are pure transformations over immutable inputs and are
//! safe to call concurrently across segments and queries.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod key;
pub mod row;
pub mod spec;
pub mod strategy;
pub mod types;

// Re-export main types
pub use config::CacheConfig;
pub use error::{DecodeError, Error, Result, SpecError};
pub use key::{CacheKey, KeyDeriver};
pub use row::{CachedRow, CachedValue, ResultRow, RowCodec, RowValue};
pub use spec::AggregationSpec;
pub use strategy::CacheStrategy;

#[cfg(test)]
mod tests {
    #[test]
    fn test_basic_sanity() {
        assert_eq!(2 + 2, 4);
    }
}
