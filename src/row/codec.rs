//! Positional row encode/decode for the cache round-trip
//!
//! The codec is bound to one query specification, which fixes the
//! positional layout:
//!
//! - segment level: `[timestamp, dim₁..dimₙ, agg₁..aggₘ]`, aggregators in
//!   their intermediate representation
//! - result level: the same, then one value per post-aggregator, with
//!   aggregators finalized
//!
//! Decoding is the positional inverse and restores names from the bound
//! specification. Segment-level decode goes through each aggregator's
//! intermediate codec and each dimension's declared type, so partials
//! round-trip exactly. Result-level decode reads the loose container as-is,
//! which is where the documented numeric coercion lives: Float-typed values
//! come back widened to `Double`, and Long-typed values come back narrowed
//! to `Int` when they fit in 32 bits. That behavior is load-bearing for
//! compatibility with entries already in production caches; do not
//! straighten it out without bumping the key schema version.

use std::sync::Arc;

use crate::error::{DecodeError, Error};
use crate::row::cached::{CachedRow, CachedValue};
use crate::row::{ResultRow, RowValue};
use crate::spec::{AggregationSpec, IntermediateKind};
use crate::types::ValueKind;

/// Converts result rows to and from their cache-storable form
#[derive(Debug, Clone)]
pub struct RowCodec {
    spec: Arc<AggregationSpec>,
    intermediates: Vec<IntermediateKind>,
}

impl RowCodec {
    /// Bind a codec to a specification
    ///
    /// Fails fast with a configuration error if any aggregator has no
    /// intermediate cache codec; such a specification must not reach the
    /// cache path at all.
    pub fn new(spec: Arc<AggregationSpec>) -> Result<Self, Error> {
        let intermediates = spec
            .aggregators
            .iter()
            .map(|agg| agg.intermediate_kind())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            spec,
            intermediates,
        })
    }

    /// The specification this codec is bound to
    pub fn spec(&self) -> &AggregationSpec {
        &self.spec
    }

    /// Encode a row of per-segment partials
    ///
    /// Missing columns encode as null; the loose container has no way to
    /// distinguish absent from null anyway.
    pub fn to_segment_cache(&self, row: &ResultRow) -> CachedRow {
        let arity = 1 + self.spec.dimensions.len() + self.spec.aggregators.len();
        let mut cached = Vec::with_capacity(arity);
        cached.push(CachedValue::Integer(row.timestamp()));
        for dim in &self.spec.dimensions {
            cached.push(scalar_to_cached(row.get(&dim.output)));
        }
        for agg in &self.spec.aggregators {
            cached.push(scalar_to_cached(row.get(&agg.name)));
        }
        cached
    }

    /// Decode a row of per-segment partials
    pub fn from_segment_cache(&self, cached: CachedRow) -> Result<ResultRow, DecodeError> {
        self.decode(cached, false)
    }

    /// Encode a finalized row for the result-level cache
    ///
    /// Aggregator values in the input row must already be finalized;
    /// post-aggregator outputs are appended after them.
    pub fn to_result_cache(&self, row: &ResultRow) -> CachedRow {
        let mut cached = self.to_segment_cache(row);
        for post in &self.spec.post_aggregators {
            cached.push(scalar_to_cached(row.get(&post.name)));
        }
        cached
    }

    /// Decode a finalized row from the result-level cache
    pub fn from_result_cache(&self, cached: CachedRow) -> Result<ResultRow, DecodeError> {
        self.decode(cached, true)
    }

    fn decode(&self, cached: CachedRow, result_level: bool) -> Result<ResultRow, DecodeError> {
        let expected = 1
            + self.spec.dimensions.len()
            + self.spec.aggregators.len()
            + if result_level {
                self.spec.post_aggregators.len()
            } else {
                0
            };
        if cached.len() != expected {
            return Err(DecodeError::Arity {
                expected,
                actual: cached.len(),
            });
        }

        let timestamp = match &cached[0] {
            CachedValue::Integer(ms) => *ms,
            other => {
                return Err(DecodeError::InvalidTimestamp {
                    actual: other.kind_name(),
                })
            }
        };

        let mut row = ResultRow::new(timestamp);
        let mut position = 1;

        for dim in &self.spec.dimensions {
            let decoded = decode_scalar(dim.kind, &cached[position], position, &dim.output)?;
            row = row.with_dimension(&dim.output, decoded);
            position += 1;
        }

        for (agg, intermediate) in self.spec.aggregators.iter().zip(&self.intermediates) {
            let value = &cached[position];
            let decoded = if result_level {
                decode_finalized(agg.finalized_kind(), value, position, &agg.name)?
            } else {
                decode_intermediate(*intermediate, value, position, &agg.name)?
            };
            row = row.with_aggregator(&agg.name, decoded);
            position += 1;
        }

        if result_level {
            for post in &self.spec.post_aggregators {
                let decoded = decode_finalized(post.kind, &cached[position], position, &post.name)?;
                row = row.with_post_aggregator(&post.name, decoded);
                position += 1;
            }
        }

        Ok(row)
    }
}

/// Lower a row value into the loose container
///
/// This is the write side of the documented width loss: 32-bit floats are
/// stored as 64-bit, and integer widths collapse to 64-bit.
fn scalar_to_cached(value: Option<&RowValue>) -> CachedValue {
    match value {
        None | Some(RowValue::Null) => CachedValue::Null,
        Some(RowValue::String(s)) => CachedValue::Text(s.clone()),
        Some(RowValue::Long(v)) => CachedValue::Integer(*v),
        Some(RowValue::Int(v)) => CachedValue::Integer(i64::from(*v)),
        Some(RowValue::Double(v)) => CachedValue::Number(*v),
        Some(RowValue::Float(v)) => CachedValue::Number(f64::from(*v)),
        Some(RowValue::Pair(timed)) => CachedValue::List(vec![
            CachedValue::Integer(timed.timestamp),
            scalar_to_cached(Some(timed.payload.as_ref())),
        ]),
    }
}

/// Decode a scalar through its declared type; untyped values take the
/// container's natural width
fn decode_scalar(
    kind: Option<ValueKind>,
    value: &CachedValue,
    position: usize,
    column: &str,
) -> Result<RowValue, DecodeError> {
    if matches!(value, CachedValue::Null) {
        return Ok(RowValue::Null);
    }
    match kind {
        None => match value {
            CachedValue::Text(s) => Ok(RowValue::String(s.clone())),
            CachedValue::Integer(v) => Ok(RowValue::Long(*v)),
            CachedValue::Number(v) => Ok(RowValue::Double(*v)),
            other => Err(mismatch(position, column, "scalar", other)),
        },
        Some(ValueKind::String) => value
            .as_str()
            .map(|s| RowValue::String(s.to_string()))
            .ok_or_else(|| mismatch(position, column, "text", value)),
        Some(ValueKind::Long) => value
            .as_i64()
            .map(RowValue::Long)
            .ok_or_else(|| mismatch(position, column, "integer", value)),
        Some(ValueKind::Double) => value
            .as_f64()
            .map(RowValue::Double)
            .ok_or_else(|| mismatch(position, column, "number", value)),
        Some(ValueKind::Float) => value
            .as_f64()
            .map(|v| RowValue::Float(v as f32))
            .ok_or_else(|| mismatch(position, column, "number", value)),
    }
}

/// Decode an aggregator's intermediate representation
fn decode_intermediate(
    kind: IntermediateKind,
    value: &CachedValue,
    position: usize,
    column: &str,
) -> Result<RowValue, DecodeError> {
    if matches!(value, CachedValue::Null) {
        return Ok(RowValue::Null);
    }
    match kind {
        IntermediateKind::Long => decode_scalar(Some(ValueKind::Long), value, position, column),
        IntermediateKind::Double => decode_scalar(Some(ValueKind::Double), value, position, column),
        IntermediateKind::Float => decode_scalar(Some(ValueKind::Float), value, position, column),
        IntermediateKind::Timed(payload_kind) => {
            let items = match value {
                CachedValue::List(items) => items,
                other => return Err(mismatch(position, column, "list", other)),
            };
            if items.len() != 2 {
                return Err(DecodeError::MalformedPair {
                    position,
                    column: column.to_string(),
                });
            }
            let timestamp = items[0].as_i64().ok_or_else(|| DecodeError::MalformedPair {
                position,
                column: column.to_string(),
            })?;
            let payload = decode_scalar(Some(payload_kind), &items[1], position, column)?;
            Ok(RowValue::pair(timestamp, payload))
        }
    }
}

/// Decode a finalized value with the loose result-level rules
///
/// Float-typed values return as `Double`; Long-typed values return as the
/// narrowest integer width that fits.
fn decode_finalized(
    kind: ValueKind,
    value: &CachedValue,
    position: usize,
    column: &str,
) -> Result<RowValue, DecodeError> {
    if matches!(value, CachedValue::Null) {
        return Ok(RowValue::Null);
    }
    match kind {
        ValueKind::String => decode_scalar(Some(ValueKind::String), value, position, column),
        ValueKind::Double => decode_scalar(Some(ValueKind::Double), value, position, column),
        ValueKind::Float => value
            .as_f64()
            .map(RowValue::Double)
            .ok_or_else(|| mismatch(position, column, "number", value)),
        ValueKind::Long => {
            let v = value
                .as_i64()
                .ok_or_else(|| mismatch(position, column, "integer", value))?;
            Ok(match i32::try_from(v) {
                Ok(narrow) => RowValue::Int(narrow),
                Err(_) => RowValue::Long(v),
            })
        }
    }
}

fn mismatch(
    position: usize,
    column: &str,
    expected: &'static str,
    actual: &CachedValue,
) -> DecodeError {
    DecodeError::TypeMismatch {
        position,
        column: column.to_string(),
        expected,
        actual: actual.kind_name(),
    }
}

// ============================================================================
// Tests
// ============================================================================
