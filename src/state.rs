//! Aggregation state for building a filter incrementally.
//!
//! [`BloomFilterState`] is the per-group accumulator a host engine holds
//! while streaming values: inputs arrive one at a time via
//! [`BloomFilterState::update`], partial states from parallel workers fold
//! together via [`BloomFilterState::combine`], and the finished group emits
//! its serialized filter via [`BloomFilterState::finalize`].
//!
//! The inner filter is created lazily on the first input, so a group that
//! never sees a value costs nothing and finalizes to `None`. Once created,
//! the filter's memory footprint is constant; the host can account for it
//! once at creation time.
//!
//! # Examples
//!
//! ```
//! use bloomagg::{BloomFilter, BloomFilterState, FilterConfig};
//!
//! let config = FilterConfig {
//!     expected_insertions: 1000,
//!     false_positive_rate: 0.01,
//! };
//!
//! let mut left = BloomFilterState::new();
//! left.update(b"alice", &config).unwrap();
//!
//! let mut right = BloomFilterState::new();
//! right.update(b"bob", &config).unwrap();
//!
//! left.combine(right).unwrap();
//! let blob = left.finalize().unwrap();
//!
//! let filter = BloomFilter::deserialize(&blob).unwrap();
//! assert!(filter.might_contain(b"alice"));
//! assert!(filter.might_contain(b"bob"));
//! ```

use crate::error::{BloomAggError, Result};
use crate::filter::BloomFilter;

/// Default capacity when the caller does not specify one.
pub const DEFAULT_EXPECTED_INSERTIONS: usize = 10_000_000;

/// Default false positive rate when the caller does not specify one.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Sizing parameters for a new filter.
///
/// Bundles the two knobs that determine filter geometry. `Default` gives
/// room for ten million items at a 1% false positive rate, a footprint of
/// roughly 11 MiB.
///
/// # Examples
///
/// ```
/// use bloomagg::FilterConfig;
///
/// let config = FilterConfig::default();
/// assert_eq!(config.expected_insertions, 10_000_000);
/// assert_eq!(config.false_positive_rate, 0.01);
///
/// let custom = FilterConfig {
///     expected_insertions: 50_000,
///     ..FilterConfig::default()
/// };
/// assert!(custom.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    /// Expected number of distinct items (n). Must be > 0.
    pub expected_insertions: usize,

    /// Target false positive rate (p). Must satisfy 0 < p < 1.
    pub false_positive_rate: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_insertions: DEFAULT_EXPECTED_INSERTIONS,
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
        }
    }
}

impl FilterConfig {
    /// Check both fields without building a filter.
    ///
    /// # Errors
    ///
    /// - [`BloomAggError::InvalidItemCount`] if `expected_insertions == 0`
    /// - [`BloomAggError::FalsePositiveRateOutOfBounds`] if
    ///   `false_positive_rate` is outside (0, 1) or NaN
    pub fn validate(&self) -> Result<()> {
        if self.expected_insertions == 0 {
            return Err(BloomAggError::invalid_item_count(0));
        }
        if !(self.false_positive_rate > 0.0 && self.false_positive_rate < 1.0) {
            return Err(BloomAggError::fp_rate_out_of_bounds(
                self.false_positive_rate,
            ));
        }
        Ok(())
    }
}

/// Per-group accumulator holding an optional filter.
///
/// Exclusively owned by one aggregation group; never shared across groups.
/// Starts empty and allocates its filter on the first input.
#[derive(Debug, Clone, Default)]
pub struct BloomFilterState {
    filter: Option<BloomFilter>,
}

impl BloomFilterState {
    /// Create an empty state. Allocates nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self { filter: None }
    }

    /// Check whether any input has been absorbed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.filter.is_none()
    }

    /// Get the inner filter, creating it from `config` if this is the
    /// first input.
    ///
    /// The config is only consulted at creation; later calls ignore it and
    /// return the existing filter.
    ///
    /// # Errors
    ///
    /// Propagates construction errors from [`BloomFilter::with_config`] on
    /// first use. The state stays empty on error.
    pub fn get_or_create(&mut self, config: &FilterConfig) -> Result<&mut BloomFilter> {
        match self.filter {
            Some(ref mut filter) => Ok(filter),
            None => {
                let filter = BloomFilter::with_config(config)?;
                Ok(self.filter.insert(filter))
            }
        }
    }

    /// Absorb one input value.
    ///
    /// Creates the filter from `config` on the first call.
    ///
    /// # Errors
    ///
    /// Propagates filter construction or insertion errors.
    pub fn update(&mut self, value: &[u8], config: &FilterConfig) -> Result<()> {
        self.get_or_create(config)?.insert(value)
    }

    /// Fold another state into this one.
    ///
    /// If either side is empty the other side's filter carries over
    /// unchanged; otherwise the filters union. Consumes `other`.
    ///
    /// # Errors
    ///
    /// Returns [`BloomAggError::IncompatibleFilters`] if both sides hold
    /// filters with different parameters. `self` is unchanged on error.
    pub fn combine(&mut self, other: BloomFilterState) -> Result<()> {
        match (self.filter.as_mut(), other.filter) {
            (None, theirs) => {
                self.filter = theirs;
                Ok(())
            }
            (Some(_), None) => Ok(()),
            (Some(mine), Some(theirs)) => mine.union(&theirs),
        }
    }

    /// Emit the group's result: the serialized filter, or `None` if the
    /// group never saw an input.
    #[must_use]
    pub fn finalize(self) -> Option<Vec<u8>> {
        self.filter.map(|filter| filter.serialize())
    }

    /// Get current memory usage in bytes.
    ///
    /// 0 while empty; after creation, constant regardless of how many
    /// values have been absorbed.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.filter
            .as_ref()
            .map_or(0, BloomFilter::estimated_memory_size)
    }
}
