//! Two-tier cache key derivation
//!
//! The deriver fixes which specification fields reach which key tier and
//! in what order. The boundary matters: a field that only reshapes or
//! filters already-aggregated results must stay out of the segment key, or
//! equivalent scans stop sharing cache entries; a field that changes the
//! scan must be in both tiers, or unrelated queries silently share results.

use crate::key::encoder::KeyEncoder;
use crate::key::CacheKey;
use crate::spec::AggregationSpec;

/// Query-type id leading every key
const AGGREGATION_QUERY_TYPE: u8 = 0x01;

/// Cache key schema version; bump on any encoding change so stale entries
/// miss instead of colliding
const KEY_SCHEMA_VERSION: u8 = 0x01;

/// Derives both cache key tiers from one query specification
#[derive(Debug, Clone, Copy)]
pub struct KeyDeriver<'a> {
    spec: &'a AggregationSpec,
}

impl<'a> KeyDeriver<'a> {
    /// Bind a deriver to a specification
    pub fn new(spec: &'a AggregationSpec) -> Self {
        Self { spec }
    }

    /// Derive the segment-level key
    ///
    /// Renders data source, intervals, granularity, dimensions, and
    /// aggregators: everything that determines what is scanned and
    /// combined per segment, and nothing else.
    pub fn segment_key(&self) -> CacheKey {
        CacheKey::new(self.segment_encoder().finish())
    }

    /// Derive the result-level key
    ///
    /// Renders everything the segment key renders, then appends the
    /// post-processing fields in fixed order: post-aggregators, limit,
    /// having, subtotal groupings.
    pub fn result_key(&self) -> CacheKey {
        let mut key = self.segment_encoder();
        key.push_fragment_list(&self.spec.post_aggregators);
        key.push_opt_fragment(self.spec.limit.as_ref());
        key.push_opt_fragment(self.spec.having.as_ref());
        match &self.spec.subtotals {
            Some(groupings) => {
                key.push_bool(true);
                key.push_i64(groupings.len() as i64);
                for grouping in groupings {
                    key.push_str_list(grouping);
                }
            }
            None => key.push_bool(false),
        }
        CacheKey::new(key.finish())
    }

    fn segment_encoder(&self) -> KeyEncoder {
        let mut key = KeyEncoder::with_header(AGGREGATION_QUERY_TYPE, KEY_SCHEMA_VERSION);
        key.push_str(&self.spec.data_source);
        key.push_fragment_list(&self.spec.intervals);
        key.push_fragment(&self.spec.granularity);
        key.push_fragment_list(&self.spec.dimensions);
        key.push_fragment_list(&self.spec.aggregators);
        key
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{
        AggregationSpecBuilder, AggregatorSpec, DimensionSpec, Direction, FilterNode, Granularity,
        HavingNode, LimitSpec, OrderByColumn, OrderingComparator, PostAggregatorSpec,
    };
    use crate::types::{TimeRange, ValueKind};

    fn base() -> AggregationSpecBuilder {
        AggregationSpec::builder("wikipedia")
            .interval(TimeRange::new(1_301_616_000_000, 1_301_788_800_000).unwrap())
            .dimension(DimensionSpec::new("quality", "alias"))
            .aggregator(AggregatorSpec::count("rows"))
            .aggregator(AggregatorSpec::long_sum("idx", "index"))
            .granularity(Granularity::Day)
    }

    fn keys(spec: &AggregationSpec) -> (CacheKey, CacheKey) {
        let deriver = KeyDeriver::new(spec);
        (deriver.segment_key(), deriver.result_key())
    }

    /// Both specs must share a segment key while deriving distinct result keys.
    fn assert_result_level_only(a: &AggregationSpec, b: &AggregationSpec) {
        let (seg_a, res_a) = keys(a);
        let (seg_b, res_b) = keys(b);
        assert_eq!(seg_a, seg_b);
        assert_ne!(res_a, res_b);
    }

    // ===== determinism tests =====

    #[test]
    fn test_equal_specs_derive_identical_keys() {
        let a = base().build().unwrap();
        let b = base().build().unwrap();
        assert_eq!(keys(&a), keys(&b));
    }

    #[test]
    fn test_repeated_derivation_is_stable() {
        let spec = base()
            .having(HavingNode::greater_than("idx", 1.5))
            .build()
            .unwrap();
        let deriver = KeyDeriver::new(&spec);
        assert_eq!(deriver.segment_key(), deriver.segment_key());
        assert_eq!(deriver.result_key(), deriver.result_key());
    }

    #[test]
    fn test_result_key_extends_past_segment_key() {
        let spec = base().build().unwrap();
        let (segment, result) = keys(&spec);
        assert!(result.len() > segment.len());
        assert_eq!(&result.as_bytes()[..segment.len()], segment.as_bytes());
    }

    // ===== segment-scope fields change both tiers =====

    #[test]
    fn test_data_source_changes_both_keys() {
        let a = base().build().unwrap();
        let mut b = base().build().unwrap();
        b.data_source = "wikipedia2".to_string();
        let (seg_a, res_a) = keys(&a);
        let (seg_b, res_b) = keys(&b);
        assert_ne!(seg_a, seg_b);
        assert_ne!(res_a, res_b);
    }

    #[test]
    fn test_interval_changes_both_keys() {
        let a = base().build().unwrap();
        let b = base()
            .interval(TimeRange::new(0, 1000).unwrap())
            .build()
            .unwrap();
        let (seg_a, res_a) = keys(&a);
        let (seg_b, res_b) = keys(&b);
        assert_ne!(seg_a, seg_b);
        assert_ne!(res_a, res_b);
    }

    #[test]
    fn test_granularity_changes_both_keys() {
        let a = base().build().unwrap();
        let b = base().granularity(Granularity::Hour).build().unwrap();
        let (seg_a, res_a) = keys(&a);
        let (seg_b, res_b) = keys(&b);
        assert_ne!(seg_a, seg_b);
        assert_ne!(res_a, res_b);
    }

    #[test]
    fn test_aggregator_changes_both_keys() {
        let a = base().build().unwrap();
        let b = base()
            .aggregator(AggregatorSpec::double_sum("idxDouble", "index"))
            .build()
            .unwrap();
        let (seg_a, res_a) = keys(&a);
        let (seg_b, res_b) = keys(&b);
        assert_ne!(seg_a, seg_b);
        assert_ne!(res_a, res_b);
    }

    // ===== post-processing fields change only the result key =====

    #[test]
    fn test_post_aggregator_expression_is_result_level() {
        let a = base()
            .post_aggregator(PostAggregatorSpec::new(
                "post",
                "alias + 'x'",
                ValueKind::String,
            ))
            .build()
            .unwrap();
        let b = base()
            .post_aggregator(PostAggregatorSpec::new(
                "post",
                "alias - 'x'",
                ValueKind::String,
            ))
            .build()
            .unwrap();
        assert_result_level_only(&a, &b);
    }

    #[test]
    fn test_limit_ordering_is_result_level() {
        let a = base()
            .limit(LimitSpec::ordered(vec![OrderByColumn::new(
                "post",
                Direction::Descending,
            )]))
            .build()
            .unwrap();
        let b = base()
            .limit(LimitSpec::ordered(vec![OrderByColumn::new(
                "post",
                Direction::Ascending,
            )]))
            .build()
            .unwrap();
        assert_result_level_only(&a, &b);
    }

    #[test]
    fn test_limit_comparator_is_result_level() {
        let with_cmp = |cmp| {
            base()
                .limit(LimitSpec::ordered(vec![OrderByColumn::new(
                    "idx",
                    Direction::Descending,
                )
                .with_comparator(cmp)]))
                .build()
                .unwrap()
        };
        assert_result_level_only(
            &with_cmp(OrderingComparator::Numeric),
            &with_cmp(OrderingComparator::Version),
        );
    }

    #[test]
    fn test_having_threshold_is_result_level() {
        let a = base()
            .having(HavingNode::greater_than("uniques", 8.0))
            .build()
            .unwrap();
        let b = base()
            .having(HavingNode::greater_than("uniques", 10.0))
            .build()
            .unwrap();
        assert_result_level_only(&a, &b);
    }

    #[test]
    fn test_nested_having_tree_is_result_level() {
        let nested = |gt: f64, eq: f64| {
            base()
                .having(HavingNode::and(vec![
                    HavingNode::greater_than("agg", gt),
                    HavingNode::or(vec![
                        HavingNode::less_than("lessAgg", 1.0),
                        HavingNode::not(HavingNode::equal_to("equalAgg", eq)),
                    ]),
                ]))
                .build()
                .unwrap()
        };
        assert_result_level_only(&nested(1.3, 2.0), &nested(13.0, 22.0));
    }

    #[test]
    fn test_filter_wrapped_having_is_result_level() {
        let wrapped = |idx: &str| {
            base()
                .having(HavingNode::filter(FilterNode::and(vec![
                    FilterNode::or(vec![
                        FilterNode::lower_bound("rows", "2", true, OrderingComparator::Numeric),
                        FilterNode::selector("idx", idx),
                    ]),
                    FilterNode::selector("__time", "1301616000000"),
                ])))
                .build()
                .unwrap()
        };
        assert_result_level_only(&wrapped("217"), &wrapped("317"));
    }

    #[test]
    fn test_subtotal_groupings_are_result_level() {
        let a = base()
            .dimension(DimensionSpec::new("market", "market"))
            .subtotals(vec![
                vec!["alias".to_string()],
                vec!["market".to_string()],
                vec![],
            ])
            .build()
            .unwrap();
        let b = base()
            .dimension(DimensionSpec::new("market", "market"))
            .subtotals(vec![vec!["alias".to_string()], vec![]])
            .build()
            .unwrap();
        assert_result_level_only(&a, &b);
    }

    #[test]
    fn test_absent_subtotals_differ_from_grand_total_only() {
        let absent = base().build().unwrap();
        let grand_total = base().subtotals(vec![vec![]]).build().unwrap();
        assert_result_level_only(&absent, &grand_total);
    }

    #[test]
    fn test_absent_having_differs_from_present() {
        let absent = base().build().unwrap();
        let present = base()
            .having(HavingNode::greater_than("idx", 0.0))
            .build()
            .unwrap();
        assert_result_level_only(&absent, &present);
    }
}
