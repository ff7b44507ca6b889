//! Filter trees
//!
//! The caching layer treats filters as a black box beyond their stable byte
//! rendering: they appear inside filter-wrapping having predicates and must
//! encode deterministically into the result-level cache key. Evaluation
//! lives in the execution pipeline.

use crate::key::encoder::{KeyEncoder, KeyFragment};
use crate::spec::limit::OrderingComparator;

const SELECTOR_TAG: u8 = 0x40;
const BOUND_TAG: u8 = 0x41;
const AND_TAG: u8 = 0x42;
const OR_TAG: u8 = 0x43;

/// A recursive filter tree over row columns
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Column equals a literal, optionally through a named extraction
    /// function applied to the column value first
    Selector {
        /// Column the filter reads
        column: String,
        /// Literal the (possibly extracted) value must equal
        value: String,
        /// Named extraction function, if any
        extraction: Option<String>,
    },

    /// Column within `[lower, upper]` under a named comparator
    Bound {
        /// Column the filter reads
        column: String,
        /// Lower bound literal; `None` means unbounded below
        lower: Option<String>,
        /// Upper bound literal; `None` means unbounded above
        upper: Option<String>,
        /// Exclude the lower bound itself
        lower_strict: bool,
        /// Exclude the upper bound itself
        upper_strict: bool,
        /// Comparator the bounds are evaluated under
        comparator: OrderingComparator,
    },

    /// All children must match; child order is preserved in the encoding
    And(Vec<FilterNode>),

    /// Any child may match; child order is preserved in the encoding
    Or(Vec<FilterNode>),
}

impl FilterNode {
    /// Equality selector without an extraction function
    pub fn selector(column: &str, value: &str) -> Self {
        FilterNode::Selector {
            column: column.to_string(),
            value: value.to_string(),
            extraction: None,
        }
    }

    /// Lower-bounded range under the given comparator
    pub fn lower_bound(column: &str, lower: &str, strict: bool, cmp: OrderingComparator) -> Self {
        FilterNode::Bound {
            column: column.to_string(),
            lower: Some(lower.to_string()),
            upper: None,
            lower_strict: strict,
            upper_strict: false,
            comparator: cmp,
        }
    }

    /// Conjunction of children
    pub fn and(children: Vec<FilterNode>) -> Self {
        FilterNode::And(children)
    }

    /// Disjunction of children
    pub fn or(children: Vec<FilterNode>) -> Self {
        FilterNode::Or(children)
    }
}

impl KeyFragment for FilterNode {
    fn write_key(&self, key: &mut KeyEncoder) {
        match self {
            FilterNode::Selector {
                column,
                value,
                extraction,
            } => {
                key.push_byte(SELECTOR_TAG);
                key.push_str(column);
                key.push_str(value);
                key.push_opt_str(extraction.as_deref());
            }
            FilterNode::Bound {
                column,
                lower,
                upper,
                lower_strict,
                upper_strict,
                comparator,
            } => {
                key.push_byte(BOUND_TAG);
                key.push_str(column);
                key.push_opt_str(lower.as_deref());
                key.push_opt_str(upper.as_deref());
                key.push_bool(*lower_strict);
                key.push_bool(*upper_strict);
                key.push_byte(comparator.key_tag());
            }
            FilterNode::And(children) => {
                key.push_byte(AND_TAG);
                key.push_fragment_list(children);
            }
            FilterNode::Or(children) => {
                key.push_byte(OR_TAG);
                key.push_fragment_list(children);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key_of(filter: &FilterNode) -> bytes::Bytes {
        let mut key = KeyEncoder::default();
        key.push_fragment(filter);
        key.finish()
    }

    #[test]
    fn test_selector_value_changes_key() {
        let a = FilterNode::selector("idx", "217");
        let b = FilterNode::selector("idx", "317");
        assert_ne!(key_of(&a), key_of(&b));
    }

    #[test]
    fn test_extraction_changes_key() {
        let plain = FilterNode::selector("market", "spot");
        let extracted = FilterNode::Selector {
            column: "market".to_string(),
            value: "spot".to_string(),
            extraction: Some("lower".to_string()),
        };
        assert_ne!(key_of(&plain), key_of(&extracted));
    }

    #[test]
    fn test_bound_strictness_changes_key() {
        let strict = FilterNode::lower_bound("rows", "2", true, OrderingComparator::Numeric);
        let loose = FilterNode::lower_bound("rows", "2", false, OrderingComparator::Numeric);
        assert_ne!(key_of(&strict), key_of(&loose));
    }

    #[test]
    fn test_bound_comparator_changes_key() {
        let num = FilterNode::lower_bound("rows", "2", true, OrderingComparator::Numeric);
        let lex = FilterNode::lower_bound("rows", "2", true, OrderingComparator::Lexicographic);
        assert_ne!(key_of(&num), key_of(&lex));
    }

    #[test]
    fn test_combinator_kind_changes_key() {
        let children = vec![
            FilterNode::selector("a", "1"),
            FilterNode::selector("b", "2"),
        ];
        assert_ne!(
            key_of(&FilterNode::and(children.clone())),
            key_of(&FilterNode::or(children))
        );
    }

    #[test]
    fn test_child_order_is_significant() {
        let ab = FilterNode::and(vec![
            FilterNode::selector("a", "1"),
            FilterNode::selector("b", "2"),
        ]);
        let ba = FilterNode::and(vec![
            FilterNode::selector("b", "2"),
            FilterNode::selector("a", "1"),
        ]);
        assert_ne!(key_of(&ab), key_of(&ba));
    }

    #[test]
    fn test_identical_trees_encode_identically() {
        let make = || {
            FilterNode::and(vec![
                FilterNode::or(vec![
                    FilterNode::lower_bound("rows", "2", true, OrderingComparator::Numeric),
                    FilterNode::selector("idx", "217"),
                ]),
                FilterNode::selector("__time", "1301616000000"),
            ])
        };
        assert_eq!(key_of(&make()), key_of(&make()));
    }
}
