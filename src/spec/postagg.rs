//! Post-aggregator specifications
//!
//! A post-aggregator computes one extra output column from the finalized
//! row. The expression itself is owned by the expression subsystem; this
//! layer only carries its pre-rendered, stable textual form and encodes
//! those bytes into the result-level cache key.

use crate::key::encoder::{KeyEncoder, KeyFragment};
use crate::types::ValueKind;

const POST_AGGREGATOR_TAG: u8 = 0x03;

/// A post-aggregation output: name, opaque expression text, declared type
#[derive(Debug, Clone, PartialEq)]
pub struct PostAggregatorSpec {
    /// Output column name in the result row
    pub name: String,

    /// Pre-rendered expression text, treated as an opaque string
    pub expression: String,

    /// Declared result type
    pub kind: ValueKind,
}

impl PostAggregatorSpec {
    /// Create a post-aggregator specification
    pub fn new(name: &str, expression: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            expression: expression.to_string(),
            kind,
        }
    }
}

impl KeyFragment for PostAggregatorSpec {
    fn write_key(&self, key: &mut KeyEncoder) {
        key.push_byte(POST_AGGREGATOR_TAG);
        key.push_str(&self.name);
        key.push_str(&self.expression);
        key.push_byte(self.kind.key_tag());
    }
}
