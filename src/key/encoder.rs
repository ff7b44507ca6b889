//! Canonical byte encoding for cache keys
//!
//! Every query sub-specification renders itself through [`KeyEncoder`] into
//! a deterministic byte sequence. Strings are length-prefixed, lists are
//! count-prefixed, optional fields carry a presence byte, and nested
//! fragments are wrapped in their own length prefix, so no two semantically
//! different inputs can concatenate to the same bytes.
//!
//! Numeric values are written big-endian; floats are written as their IEEE
//! bit patterns. Key bytes are never parsed back, only compared.

use bytes::Bytes;

/// A query sub-specification that can render itself into key bytes
///
/// Implementations write a leading tag byte of their own, then their fields
/// through the encoder primitives. Recursive trees push children as nested
/// fragments so sibling boundaries stay unambiguous.
pub trait KeyFragment {
    /// Append this fragment's canonical form to the encoder
    fn write_key(&self, key: &mut KeyEncoder);
}

/// Accumulates the canonical byte form of a cache key
#[derive(Debug, Default)]
pub struct KeyEncoder {
    buf: Vec<u8>,
}

impl KeyEncoder {
    /// Create an encoder opening with a query-type id and schema version
    ///
    /// The version byte lets a future encoding change miss old cache
    /// entries instead of colliding with them.
    pub fn with_header(query_type: u8, version: u8) -> Self {
        Self {
            buf: vec![query_type, version],
        }
    }

    /// Append a single tag byte
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Append a boolean as one byte
    pub fn push_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    /// Append a 64-bit integer, big-endian
    pub fn push_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Append a 64-bit float as its IEEE bit pattern, big-endian
    pub fn push_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
    }

    /// Append a length-prefixed UTF-8 string
    pub fn push_str(&mut self, value: &str) {
        self.push_len(value.len());
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Append an optional string: presence byte, then the string if present
    pub fn push_opt_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.push_bool(true);
                self.push_str(s);
            }
            None => self.push_bool(false),
        }
    }

    /// Append a count-prefixed list of strings
    pub fn push_str_list<S: AsRef<str>>(&mut self, values: &[S]) {
        self.push_len(values.len());
        for value in values {
            self.push_str(value.as_ref());
        }
    }

    /// Append a nested fragment, wrapped in its own length prefix
    pub fn push_fragment<F: KeyFragment + ?Sized>(&mut self, fragment: &F) {
        let mut nested = KeyEncoder::default();
        fragment.write_key(&mut nested);
        self.push_len(nested.buf.len());
        self.buf.extend_from_slice(&nested.buf);
    }

    /// Append a count-prefixed list of fragments
    pub fn push_fragment_list<F: KeyFragment>(&mut self, fragments: &[F]) {
        self.push_len(fragments.len());
        for fragment in fragments {
            self.push_fragment(fragment);
        }
    }

    /// Append an optional fragment: presence byte, then the fragment
    pub fn push_opt_fragment<F: KeyFragment>(&mut self, fragment: Option<&F>) {
        match fragment {
            Some(f) => {
                self.push_bool(true);
                self.push_fragment(f);
            }
            None => self.push_bool(false),
        }
    }

    /// Finalize into immutable key bytes
    pub fn finish(self) -> Bytes {
        Bytes::from(self.buf)
    }

    /// Current encoded length in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been encoded yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // Lengths and counts share one prefix form. u32 is plenty for any
    // realistic specification and keeps keys compact.
    fn push_len(&mut self, len: usize) {
        debug_assert!(len <= u32::MAX as usize);
        self.buf.extend_from_slice(&(len as u32).to_be_bytes());
    }
}

// ============================================================================
// Tests
// ============================================================================
