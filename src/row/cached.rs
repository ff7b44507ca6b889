//! The loosely-typed positional cache container
//!
//! Cached rows travel as a flat list of [`CachedValue`]s. The container is
//! deliberately generic: it carries integers, floats, text, and nested
//! lists, but no column names, roles, or narrow numeric widths. The bound
//! query specification supplies that structure again at decode time.
//!
//! The width loss is the documented coercion of §4.2-style cache layers: a
//! 32-bit float is stored as a 64-bit float, and an integer read back at
//! result level is narrowed to the smallest width that holds it. Serde
//! handles the wire form; the untagged representation keeps the serialized
//! shape a plain array of scalars and arrays.

use serde::{Deserialize, Serialize};

/// A positional cache-storable row
pub type CachedRow = Vec<CachedValue>;

/// One loosely-typed value inside a cached row
///
/// Deserialization tries variants in order, so integral numbers come back
/// as `Integer` and everything else numeric as `Number`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CachedValue {
    /// Null
    Null,

    /// Boolean
    Bool(bool),

    /// Integer, any width up to 64 bits
    Integer(i64),

    /// 64-bit float; also where 32-bit floats land
    Number(f64),

    /// UTF-8 text
    Text(String),

    /// Nested list, used for intermediate (timestamp, payload) pairs
    List(Vec<CachedValue>),
}

impl CachedValue {
    /// Container kind name for decode diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            CachedValue::Null => "null",
            CachedValue::Bool(_) => "bool",
            CachedValue::Integer(_) => "integer",
            CachedValue::Number(_) => "number",
            CachedValue::Text(_) => "text",
            CachedValue::List(_) => "list",
        }
    }

    /// Integer view
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CachedValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Float view; integers widen
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CachedValue::Number(v) => Some(*v),
            CachedValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Text view
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CachedValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wire_round_trip(row: &CachedRow) -> CachedRow {
        let bytes = serde_json::to_vec(row).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_integers_survive_the_wire_as_integers() {
        let row = vec![CachedValue::Integer(123), CachedValue::Integer(-7)];
        assert_eq!(wire_round_trip(&row), row);
    }

    #[test]
    fn test_floats_survive_the_wire_as_numbers() {
        let row = vec![
            CachedValue::Number(2.1),
            CachedValue::Number(f64::from(2.1f32)),
        ];
        assert_eq!(wire_round_trip(&row), row);
    }

    #[test]
    fn test_nested_pair_survives_the_wire() {
        let row = vec![CachedValue::List(vec![
            CachedValue::Integer(123),
            CachedValue::Text("val1".to_string()),
        ])];
        assert_eq!(wire_round_trip(&row), row);
    }

    #[test]
    fn test_null_and_text_survive_the_wire() {
        let row = vec![CachedValue::Null, CachedValue::Text(String::new())];
        assert_eq!(wire_round_trip(&row), row);
    }

    #[test]
    fn test_serialized_shape_is_a_plain_array() {
        let row = vec![CachedValue::Integer(1), CachedValue::Text("a".to_string())];
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_views() {
        assert_eq!(CachedValue::Integer(5).as_i64(), Some(5));
        assert_eq!(CachedValue::Integer(5).as_f64(), Some(5.0));
        assert_eq!(CachedValue::Number(1.5).as_i64(), None);
        assert_eq!(CachedValue::Text("x".to_string()).as_str(), Some("x"));
        assert_eq!(CachedValue::Null.kind_name(), "null");
    }
}
