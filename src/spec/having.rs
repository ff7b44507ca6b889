//! Having-predicate trees
//!
//! A having predicate filters the post-aggregation result set by computed
//! metric values. It never changes what is scanned per segment, so it
//! participates only in the result-level cache key. Evaluation lives in the
//! execution pipeline; this layer renders the tree deterministically.

use crate::key::encoder::{KeyEncoder, KeyFragment};
use crate::spec::filter::FilterNode;

const GREATER_THAN_TAG: u8 = 0x30;
const LESS_THAN_TAG: u8 = 0x31;
const EQUAL_TO_TAG: u8 = 0x32;
const FILTER_TAG: u8 = 0x33;
const AND_TAG: u8 = 0x34;
const OR_TAG: u8 = 0x35;
const NOT_TAG: u8 = 0x36;

/// A recursive having-predicate tree
///
/// `And`/`Or` child lists are order-sensitive: the same children in a
/// different order encode differently.
#[derive(Debug, Clone, PartialEq)]
pub enum HavingNode {
    /// Aggregated column strictly greater than the threshold
    GreaterThan {
        /// Aggregated output column the comparison reads
        column: String,
        /// Numeric threshold
        threshold: f64,
    },

    /// Aggregated column strictly less than the threshold
    LessThan {
        /// Aggregated output column the comparison reads
        column: String,
        /// Numeric threshold
        threshold: f64,
    },

    /// Aggregated column equal to the threshold
    EqualTo {
        /// Aggregated output column the comparison reads
        column: String,
        /// Numeric threshold
        threshold: f64,
    },

    /// A filter tree evaluated against the post-aggregation row
    Filter(FilterNode),

    /// All children must hold
    And(Vec<HavingNode>),

    /// Any child may hold
    Or(Vec<HavingNode>),

    /// Child must not hold
    Not(Box<HavingNode>),
}

impl HavingNode {
    /// Greater-than leaf
    pub fn greater_than(column: &str, threshold: f64) -> Self {
        HavingNode::GreaterThan {
            column: column.to_string(),
            threshold,
        }
    }

    /// Less-than leaf
    pub fn less_than(column: &str, threshold: f64) -> Self {
        HavingNode::LessThan {
            column: column.to_string(),
            threshold,
        }
    }

    /// Equality leaf
    pub fn equal_to(column: &str, threshold: f64) -> Self {
        HavingNode::EqualTo {
            column: column.to_string(),
            threshold,
        }
    }

    /// Filter-wrapping leaf
    pub fn filter(filter: FilterNode) -> Self {
        HavingNode::Filter(filter)
    }

    /// Conjunction of children
    pub fn and(children: Vec<HavingNode>) -> Self {
        HavingNode::And(children)
    }

    /// Disjunction of children
    pub fn or(children: Vec<HavingNode>) -> Self {
        HavingNode::Or(children)
    }

    /// Negation of a child
    pub fn not(child: HavingNode) -> Self {
        HavingNode::Not(Box::new(child))
    }
}

impl KeyFragment for HavingNode {
    fn write_key(&self, key: &mut KeyEncoder) {
        match self {
            HavingNode::GreaterThan { column, threshold } => {
                key.push_byte(GREATER_THAN_TAG);
                key.push_str(column);
                key.push_f64(*threshold);
            }
            HavingNode::LessThan { column, threshold } => {
                key.push_byte(LESS_THAN_TAG);
                key.push_str(column);
                key.push_f64(*threshold);
            }
            HavingNode::EqualTo { column, threshold } => {
                key.push_byte(EQUAL_TO_TAG);
                key.push_str(column);
                key.push_f64(*threshold);
            }
            HavingNode::Filter(filter) => {
                key.push_byte(FILTER_TAG);
                key.push_fragment(filter);
            }
            HavingNode::And(children) => {
                key.push_byte(AND_TAG);
                key.push_fragment_list(children);
            }
            HavingNode::Or(children) => {
                key.push_byte(OR_TAG);
                key.push_fragment_list(children);
            }
            HavingNode::Not(child) => {
                key.push_byte(NOT_TAG);
                key.push_fragment(child.as_ref());
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
