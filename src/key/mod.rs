//! Cache key derivation
//!
//! Two key tiers are derived from one query specification:
//!
//! - the **segment key** identifies the per-segment partial aggregates a
//!   query produces; queries that differ only in post-processing share it
//! - the **result key** additionally distinguishes everything that shapes
//!   the post-processed result set (post-aggregators, ordering/limit,
//!   having predicate, subtotal groupings)
//!
//! Keys are opaque byte sequences built by the canonical encoder; the cache
//! store treats them as blob identifiers and never parses them.

use bytes::Bytes;

pub mod deriver;
pub mod encoder;

pub use deriver::KeyDeriver;
pub use encoder::{KeyEncoder, KeyFragment};

/// An opaque, immutable cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Bytes);

impl CacheKey {
    pub(crate) fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Key bytes, for handing to the cache store
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the underlying byte buffer
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty (never true for derived keys)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CacheKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
