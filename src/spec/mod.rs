//! Query specification model
//!
//! An [`AggregationSpec`] is the immutable description of one aggregation
//! query as produced by the query planner: what to scan (data source,
//! intervals, dimensions, aggregators, granularity) and how to post-process
//! the aggregated rows (post-aggregators, ordering/limit, having predicate,
//! subtotal groupings). The caching layer reads it; nothing mutates it.
//!
//! Construction goes through [`AggregationSpecBuilder`], which validates
//! upfront and yields the fully-populated value object.
//!
//! # Example
//!
//! ```rust
//! use aggcache::spec::{AggregationSpec, AggregatorSpec, DimensionSpec, Granularity};
//! use aggcache::types::TimeRange;
//!
//! let spec = AggregationSpec::builder("wikipedia")
//!     .interval(TimeRange::new(0, 86_400_000).unwrap())
//!     .dimension(DimensionSpec::new("quality", "alias"))
//!     .aggregator(AggregatorSpec::count("rows"))
//!     .granularity(Granularity::Day)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(spec.data_source, "wikipedia");
//! ```

use std::collections::HashSet;

use crate::error::SpecError;
use crate::types::TimeRange;

pub mod aggregator;
pub mod dimension;
pub mod filter;
pub mod granularity;
pub mod having;
pub mod limit;
pub mod postagg;

pub use aggregator::{AccumulationKind, AggregatorSpec, IntermediateKind};
pub use dimension::DimensionSpec;
pub use filter::FilterNode;
pub use granularity::Granularity;
pub use having::HavingNode;
pub use limit::{Direction, LimitSpec, OrderByColumn, OrderingComparator};
pub use postagg::PostAggregatorSpec;

/// A subtotal grouping: an ordered subset of dimension output names
///
/// The empty list is the grand-total grouping.
pub type SubtotalGrouping = Vec<String>;

/// An immutable aggregation query specification
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationSpec {
    /// Data source the query scans
    pub data_source: String,

    /// Time intervals to scan
    pub intervals: Vec<TimeRange>,

    /// Dimension selections, in output order
    pub dimensions: Vec<DimensionSpec>,

    /// Aggregator specifications, in output order
    pub aggregators: Vec<AggregatorSpec>,

    /// Post-aggregator specifications, in output order
    pub post_aggregators: Vec<PostAggregatorSpec>,

    /// Time bucketing rule
    pub granularity: Granularity,

    /// Ordering and row cap, if any
    pub limit: Option<LimitSpec>,

    /// Having predicate, if any
    pub having: Option<HavingNode>,

    /// Subtotal groupings, if any; order significant at both levels
    pub subtotals: Option<Vec<SubtotalGrouping>>,
}

impl AggregationSpec {
    /// Start building a specification for the given data source
    pub fn builder(data_source: &str) -> AggregationSpecBuilder {
        AggregationSpecBuilder::new(data_source)
    }

    /// Whether two specifications produce the same per-segment partial
    /// aggregates
    ///
    /// True iff they agree on every field except post-aggregators, limit,
    /// having, and subtotal groupings, which are exactly the fields the
    /// cache key excludes.
    pub fn segment_equivalent(&self, other: &AggregationSpec) -> bool {
        self.data_source == other.data_source
            && self.intervals == other.intervals
            && self.dimensions == other.dimensions
            && self.aggregators == other.aggregators
            && self.granularity == other.granularity
    }
}

/// Consuming builder for [`AggregationSpec`]
///
/// Collects fields, validates once in [`build`](Self::build), and hands the
/// finished immutable specification over. No builder state survives.
#[derive(Debug)]
pub struct AggregationSpecBuilder {
    data_source: String,
    intervals: Vec<TimeRange>,
    dimensions: Vec<DimensionSpec>,
    aggregators: Vec<AggregatorSpec>,
    post_aggregators: Vec<PostAggregatorSpec>,
    granularity: Granularity,
    limit: Option<LimitSpec>,
    having: Option<HavingNode>,
    subtotals: Option<Vec<SubtotalGrouping>>,
}

impl AggregationSpecBuilder {
    /// Create a builder for the given data source
    pub fn new(data_source: &str) -> Self {
        Self {
            data_source: data_source.to_string(),
            intervals: Vec::new(),
            dimensions: Vec::new(),
            aggregators: Vec::new(),
            post_aggregators: Vec::new(),
            granularity: Granularity::All,
            limit: None,
            having: None,
            subtotals: None,
        }
    }

    /// Add a scan interval
    pub fn interval(mut self, interval: TimeRange) -> Self {
        self.intervals.push(interval);
        self
    }

    /// Add a dimension selection
    pub fn dimension(mut self, dimension: DimensionSpec) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// Add an aggregator
    pub fn aggregator(mut self, aggregator: AggregatorSpec) -> Self {
        self.aggregators.push(aggregator);
        self
    }

    /// Add a post-aggregator
    pub fn post_aggregator(mut self, post: PostAggregatorSpec) -> Self {
        self.post_aggregators.push(post);
        self
    }

    /// Set the time bucketing rule
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Set the ordering/limit specification
    pub fn limit(mut self, limit: LimitSpec) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the having predicate
    pub fn having(mut self, having: HavingNode) -> Self {
        self.having = Some(having);
        self
    }

    /// Set the subtotal groupings
    pub fn subtotals(mut self, subtotals: Vec<SubtotalGrouping>) -> Self {
        self.subtotals = Some(subtotals);
        self
    }

    /// Validate and produce the immutable specification
    pub fn build(self) -> Result<AggregationSpec, SpecError> {
        if self.data_source.is_empty() {
            return Err(SpecError::EmptyDataSource);
        }
        if self.intervals.is_empty() {
            return Err(SpecError::MissingIntervals);
        }

        let mut outputs = HashSet::new();
        let names = self
            .dimensions
            .iter()
            .map(|d| d.output.as_str())
            .chain(self.aggregators.iter().map(|a| a.name.as_str()))
            .chain(self.post_aggregators.iter().map(|p| p.name.as_str()));
        for name in names {
            if !outputs.insert(name) {
                return Err(SpecError::DuplicateOutputName(name.to_string()));
            }
        }

        Ok(AggregationSpec {
            data_source: self.data_source,
            intervals: self.intervals,
            dimensions: self.dimensions,
            aggregators: self.aggregators,
            post_aggregators: self.post_aggregators,
            granularity: self.granularity,
            limit: self.limit,
            having: self.having,
            subtotals: self.subtotals,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
