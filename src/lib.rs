//! Mergeable, serializable Bloom filters for aggregation pipelines.
//!
//! This crate provides the building blocks a query engine needs to compute
//! a Bloom filter as an aggregate over a stream of byte-string values:
//!
//! - [`BloomFilter`] — the filter itself: no false negatives, bitwise-OR
//!   union across identically-sized filters, and a canonical little-endian
//!   byte form that round-trips bit-exactly across processes and platforms.
//! - [`BloomFilterState`] — the per-group accumulator: lazy creation on
//!   first input, fold-in of partial states from parallel workers, and
//!   finalization to the serialized blob.
//! - [`FilterConfig`] — the two sizing knobs (expected insertions, target
//!   false positive rate) with engine-friendly defaults.
//!
//! Hashing is XXH3-64 with fixed seeds expanded by double hashing, so any
//! two processes agreeing on the serialized header derive identical probe
//! indices for identical input bytes. That determinism is what makes
//! independently built filters unionable.
//!
//! # Quick Start
//!
//! ```
//! use bloomagg::{BloomFilter, BloomFilterState, FilterConfig};
//!
//! let config = FilterConfig {
//!     expected_insertions: 10_000,
//!     false_positive_rate: 0.01,
//! };
//!
//! // Two workers accumulate disjoint slices of the input.
//! let mut worker_a = BloomFilterState::new();
//! worker_a.update(b"alice", &config).unwrap();
//!
//! let mut worker_b = BloomFilterState::new();
//! worker_b.update(b"bob", &config).unwrap();
//!
//! // Partial states fold together, then the group emits one blob.
//! worker_a.combine(worker_b).unwrap();
//! let blob = worker_a.finalize().unwrap();
//!
//! // Any consumer can reconstruct the filter and probe it.
//! let filter = BloomFilter::deserialize(&blob).unwrap();
//! assert!(filter.might_contain(b"alice"));
//! assert!(filter.might_contain(b"bob"));
//! assert!(!filter.might_contain(b"mallory"));
//! ```
//!
//! # Feature Flags
//!
//! - `serde` — `Serialize`/`Deserialize` implementations for the filter
//!   types. The canonical wire form does not require it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod error;
pub mod filter;
pub mod hash;
pub mod state;
pub mod wire;

pub use error::{BloomAggError, Result};
pub use filter::BloomFilter;
pub use state::{
    BloomFilterState, FilterConfig, DEFAULT_EXPECTED_INSERTIONS, DEFAULT_FALSE_POSITIVE_RATE,
};

/// Convenience re-exports for the common path.
///
/// ```
/// use bloomagg::prelude::*;
///
/// let filter = BloomFilter::new(1000, 0.01).unwrap();
/// filter.insert(b"key").unwrap();
/// assert!(filter.might_contain(b"key"));
/// ```
pub mod prelude {
    pub use crate::error::{BloomAggError, Result};
    pub use crate::filter::BloomFilter;
    pub use crate::state::{BloomFilterState, FilterConfig};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_end_to_end_aggregation() {
        let config = FilterConfig {
            expected_insertions: 100,
            false_positive_rate: 0.05,
        };

        let mut state = BloomFilterState::new();
        for name in [b"alice".as_ref(), b"bob", b"carol"] {
            state.update(name, &config).unwrap();
        }

        let blob = state.finalize().unwrap();
        let filter = BloomFilter::deserialize(&blob).unwrap();

        assert!(filter.might_contain(b"alice"));
        assert!(filter.might_contain(b"bob"));
        assert!(filter.might_contain(b"carol"));
    }

    #[test]
    fn test_prelude_exports() {
        let _: Result<BloomFilter> = BloomFilter::new(10, 0.1);
        let _ = BloomFilterState::new();
        let _ = FilterConfig::default();
        let _ = BloomAggError::invalid_item_count(0);
    }
}
