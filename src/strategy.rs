//! Cache strategy façade
//!
//! A [`CacheStrategy`] binds one query specification to a key deriver and a
//! row codec for the lifetime of that query's execution, and is the only
//! surface the execution pipeline talks to. It holds no mutable state: the
//! same instance is safely shared across threads evaluating different
//! segments concurrently.
//!
//! Not every query is cacheable. [`CacheStrategy::for_spec`] returns `None`
//! (the caching-disabled sentinel, not an error) when the bound
//! specification or the cache configuration rules caching out; callers
//! check that once and skip the cache entirely.

use std::sync::Arc;

use tracing::debug;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::key::{CacheKey, KeyDeriver};
use crate::row::{CachedRow, ResultRow, RowCodec};
use crate::spec::AggregationSpec;

/// Binds a query specification to key derivation and the row codec
#[derive(Debug, Clone)]
pub struct CacheStrategy {
    spec: Arc<AggregationSpec>,
    codec: RowCodec,
}

impl CacheStrategy {
    /// Build a strategy, failing fast on a specification whose aggregators
    /// have no intermediate cache codec
    ///
    /// Use [`for_spec`](Self::for_spec) on the query path; this constructor
    /// is for callers that have already probed cacheability and want the
    /// configuration error surfaced.
    pub fn new(spec: AggregationSpec) -> Result<Self> {
        let spec = Arc::new(spec);
        let codec = RowCodec::new(spec.clone())?;
        Ok(Self { spec, codec })
    }

    /// Build a strategy, or `None` when caching is disabled for this query
    ///
    /// Caching is disabled when the configuration turns both tiers off,
    /// lists the data source as uncacheable, or any aggregator lacks an
    /// intermediate cache codec.
    pub fn for_spec(spec: AggregationSpec, config: &CacheConfig) -> Option<Self> {
        if !config.segment_cache_enabled && !config.result_cache_enabled {
            debug!(data_source = %spec.data_source, "caching disabled by configuration");
            return None;
        }
        if config.is_source_uncacheable(&spec.data_source) {
            debug!(data_source = %spec.data_source, "data source marked uncacheable");
            return None;
        }
        match Self::new(spec) {
            Ok(strategy) => Some(strategy),
            Err(err) => {
                debug!(error = %err, "query shape is not cacheable");
                None
            }
        }
    }

    /// Query-shape probe: whether a specification can be cached at all
    pub fn is_cacheable(spec: &AggregationSpec) -> bool {
        spec.aggregators
            .iter()
            .all(|agg| agg.intermediate_kind().is_ok())
    }

    /// The bound specification
    pub fn spec(&self) -> &AggregationSpec {
        &self.spec
    }

    /// Derive the segment-level cache key
    pub fn segment_key(&self) -> CacheKey {
        KeyDeriver::new(&self.spec).segment_key()
    }

    /// Derive the result-level cache key
    pub fn result_key(&self) -> CacheKey {
        KeyDeriver::new(&self.spec).result_key()
    }

    /// Encode a row of per-segment partials for the segment cache
    pub fn to_segment_cache(&self, row: &ResultRow) -> CachedRow {
        self.codec.to_segment_cache(row)
    }

    /// Decode a segment cache entry
    ///
    /// A decode error means the entry is corrupt or stale; treat it as a
    /// cache miss and recompute.
    pub fn from_segment_cache(&self, cached: CachedRow) -> Result<ResultRow> {
        self.codec.from_segment_cache(cached).map_err(|err| {
            debug!(error = %err, "segment cache entry failed to decode");
            err.into()
        })
    }

    /// Encode a finalized row for the result-level cache
    pub fn to_result_cache(&self, row: &ResultRow) -> CachedRow {
        self.codec.to_result_cache(row)
    }

    /// Decode a result-level cache entry
    ///
    /// Subject to the documented numeric coercion; see [`RowCodec`].
    pub fn from_result_cache(&self, cached: CachedRow) -> Result<ResultRow> {
        self.codec.from_result_cache(cached).map_err(|err| {
            debug!(error = %err, "result cache entry failed to decode");
            err.into()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
