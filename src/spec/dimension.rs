//! Dimension selections

use crate::key::encoder::{KeyEncoder, KeyFragment};
use crate::types::ValueKind;

const DIMENSION_TAG: u8 = 0x02;

/// A dimension selection: source column, output alias, optional declared type
///
/// The declared type drives exact reconstruction of dimension values from
/// the cache; an untyped dimension comes back with whatever width the loose
/// cache container preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionSpec {
    /// Source column scanned from segment data
    pub field: String,

    /// Output alias the result row is keyed by
    pub output: String,

    /// Declared value type, if the query planner knows it
    pub kind: Option<ValueKind>,
}

impl DimensionSpec {
    /// Create an untyped dimension selection
    pub fn new(field: &str, output: &str) -> Self {
        Self {
            field: field.to_string(),
            output: output.to_string(),
            kind: None,
        }
    }

    /// Create a dimension selection with a declared value type
    pub fn typed(field: &str, output: &str, kind: ValueKind) -> Self {
        Self {
            field: field.to_string(),
            output: output.to_string(),
            kind: Some(kind),
        }
    }
}

impl KeyFragment for DimensionSpec {
    fn write_key(&self, key: &mut KeyEncoder) {
        key.push_byte(DIMENSION_TAG);
        key.push_str(&self.field);
        key.push_str(&self.output);
        key.push_byte(self.kind.map(|k| k.key_tag()).unwrap_or(0x00));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(dim: &DimensionSpec) -> bytes::Bytes {
        let mut key = KeyEncoder::default();
        key.push_fragment(dim);
        key.finish()
    }

    #[test]
    fn test_alias_changes_key() {
        let a = DimensionSpec::new("quality", "alias");
        let b = DimensionSpec::new("quality", "alias2");
        assert_ne!(key_of(&a), key_of(&b));
    }

    #[test]
    fn test_declared_type_changes_key() {
        let untyped = DimensionSpec::new("test", "test");
        let typed = DimensionSpec::typed("test", "test", ValueKind::Float);
        assert_ne!(key_of(&untyped), key_of(&typed));
    }

    #[test]
    fn test_equal_dimensions_encode_identically() {
        let a = DimensionSpec::typed("test", "test", ValueKind::Long);
        let b = DimensionSpec::typed("test", "test", ValueKind::Long);
        assert_eq!(key_of(&a), key_of(&b));
    }
}
