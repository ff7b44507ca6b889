//! Result rows and their cache representations
//!
//! A [`ResultRow`] is one aggregated output row: a millisecond timestamp
//! plus named, role-tagged values. The role (dimension, aggregator, or
//! post-aggregator) is a closed enumeration so the codec can pick typed
//! behavior per position instead of guessing from runtime values; a
//! name-keyed accessor is still exposed at the boundary.
//!
//! [`cached::CachedRow`] is the transient positional form rows take for the
//! cache round-trip; [`codec::RowCodec`] converts between the two.

pub mod cached;
pub mod codec;

pub use cached::{CachedRow, CachedValue};
pub use codec::RowCodec;

/// A single row value
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// Absent or null value
    Null,

    /// UTF-8 string
    String(String),

    /// 64-bit signed integer
    Long(i64),

    /// 32-bit signed integer; produced when the cache round-trip narrows a
    /// stored integer to the smallest width that fits
    Int(i32),

    /// 64-bit float
    Double(f64),

    /// 32-bit float
    Float(f32),

    /// Aggregator intermediate state: the latest observation and the
    /// timestamp it was seen at, kept so partials combine across segments
    Pair(TimedValue),
}

impl RowValue {
    /// Convenience constructor for string values
    pub fn string(value: &str) -> Self {
        RowValue::String(value.to_string())
    }

    /// Convenience constructor for intermediate (timestamp, payload) pairs
    pub fn pair(timestamp: i64, payload: RowValue) -> Self {
        RowValue::Pair(TimedValue {
            timestamp,
            payload: Box::new(payload),
        })
    }
}

/// An observation payload tagged with its millisecond timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct TimedValue {
    /// When the payload was observed
    pub timestamp: i64,

    /// The observed scalar
    pub payload: Box<RowValue>,
}

/// Role of a column within a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Grouping dimension output
    Dimension,

    /// Aggregator output (intermediate or finalized, by cache tier)
    Aggregator,

    /// Post-aggregator output
    PostAggregator,
}

/// One named, role-tagged value in a result row
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Output column name
    pub name: String,

    /// Column role
    pub role: ColumnRole,

    /// Column value
    pub value: RowValue,
}

/// One aggregated result row
///
/// Columns keep insertion order; the codec reconstructs rows in
/// specification order (dimensions, then aggregators, then
/// post-aggregators).
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    timestamp: i64,
    columns: Vec<Column>,
}

impl ResultRow {
    /// Create an empty row at the given millisecond timestamp
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            columns: Vec::new(),
        }
    }

    /// Append a dimension value
    pub fn with_dimension(self, name: &str, value: RowValue) -> Self {
        self.with_column(name, ColumnRole::Dimension, value)
    }

    /// Append an aggregator value
    pub fn with_aggregator(self, name: &str, value: RowValue) -> Self {
        self.with_column(name, ColumnRole::Aggregator, value)
    }

    /// Append a post-aggregator value
    pub fn with_post_aggregator(self, name: &str, value: RowValue) -> Self {
        self.with_column(name, ColumnRole::PostAggregator, value)
    }

    /// Append a column with an explicit role
    pub fn with_column(mut self, name: &str, role: ColumnRole, value: RowValue) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            role,
            value,
        });
        self
    }

    /// Row timestamp in milliseconds
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Name-keyed view: the value of the first column with this name
    pub fn get(&self, name: &str) -> Option<&RowValue> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.value)
    }

    /// All columns in insertion order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_name_keyed_view() {
        let row = ResultRow::new(123)
            .with_dimension("alias", RowValue::string("mezzanine"))
            .with_aggregator("rows", RowValue::Long(1));

        assert_eq!(row.timestamp(), 123);
        assert_eq!(row.get("alias"), Some(&RowValue::string("mezzanine")));
        assert_eq!(row.get("rows"), Some(&RowValue::Long(1)));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_row_preserves_roles() {
        let row = ResultRow::new(0)
            .with_dimension("d", RowValue::Null)
            .with_aggregator("a", RowValue::Null)
            .with_post_aggregator("p", RowValue::Null);

        let roles: Vec<ColumnRole> = row.columns().iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                ColumnRole::Dimension,
                ColumnRole::Aggregator,
                ColumnRole::PostAggregator
            ]
        );
    }

    #[test]
    fn test_pair_constructor() {
        let pair = RowValue::pair(123, RowValue::Float(2.1));
        match pair {
            RowValue::Pair(ref timed) => {
                assert_eq!(timed.timestamp, 123);
                assert_eq!(*timed.payload, RowValue::Float(2.1));
            }
            _ => panic!("expected a pair"),
        }
    }

    #[test]
    fn test_rows_compare_by_content() {
        let make = || ResultRow::new(1).with_dimension("d", RowValue::Long(7));
        assert_eq!(make(), make());
        assert_ne!(make(), ResultRow::new(2).with_dimension("d", RowValue::Long(7)));
    }
}
