//! Mergeable Bloom filter over byte-string items.
//!
//! [`BloomFilter`] is a standard Bloom filter with the three properties the
//! aggregation layer needs:
//!
//! - **No false negatives.** An inserted item is always reported present.
//! - **Mergeable.** Two filters built with identical parameters union by
//!   bitwise OR, and the result answers queries exactly as if every item
//!   had been inserted into one filter.
//! - **Serializable.** [`BloomFilter::serialize`] emits a self-describing
//!   byte form (see [`crate::wire`]) that [`BloomFilter::deserialize`]
//!   reconstructs bit-exactly on any platform.
//!
//! Memory is allocated once at construction and never grows; insertions
//! only flip bits in place.
//!
//! # Examples
//!
//! ```
//! use bloomagg::BloomFilter;
//!
//! let mut a = BloomFilter::new(1000, 0.01).unwrap();
//! let b = BloomFilter::new(1000, 0.01).unwrap();
//!
//! a.insert(b"alice").unwrap();
//! b.insert(b"bob").unwrap();
//!
//! a.union(&b).unwrap();
//! assert!(a.might_contain(b"alice"));
//! assert!(a.might_contain(b"bob"));
//!
//! let bytes = a.serialize();
//! let restored = BloomFilter::deserialize(&bytes).unwrap();
//! assert!(restored.might_contain(b"alice"));
//! ```

use crate::core::bitvec::BitVec;
use crate::core::params;
use crate::error::{BloomAggError, Result};
use crate::hash::hasher::{BloomHasher, Xxh3Hasher};
use crate::hash::strategies::{DoubleHashing, HashStrategy};
use crate::state::FilterConfig;
use crate::wire;

/// Mergeable, serializable Bloom filter keyed by byte strings.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BloomFilter {
    /// Bit array of size m.
    bits: BitVec,

    /// Number of probe indices per item (k).
    num_hashes: u32,

    /// Capacity the filter was sized for; 0 when reconstructed from bytes.
    expected_insertions: usize,

    /// Target rate the filter was sized for; 0.0 when reconstructed.
    target_fp_rate: f64,
}

impl BloomFilter {
    /// Create a filter sized for `expected_insertions` items at the given
    /// target false positive rate.
    ///
    /// # Errors
    ///
    /// - [`BloomAggError::InvalidItemCount`] if `expected_insertions == 0`
    /// - [`BloomAggError::FalsePositiveRateOutOfBounds`] if
    ///   `false_positive_rate` is outside (0, 1)
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomagg::BloomFilter;
    ///
    /// let filter = BloomFilter::new(10_000, 0.01).unwrap();
    /// assert_eq!(filter.size(), 95_851);
    /// assert_eq!(filter.num_hashes(), 7);
    /// ```
    pub fn new(expected_insertions: usize, false_positive_rate: f64) -> Result<Self> {
        let (num_bits, num_hashes) =
            params::calculate_filter_params(expected_insertions, false_positive_rate)?;

        Ok(Self {
            bits: BitVec::new(num_bits)?,
            num_hashes,
            expected_insertions,
            target_fp_rate: false_positive_rate,
        })
    }

    /// Create a filter from a [`FilterConfig`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`BloomFilter::new`].
    pub fn with_config(config: &FilterConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.expected_insertions, config.false_positive_rate)
    }

    /// Assemble a filter directly from a bit array and hash count.
    ///
    /// Used when reconstructing from serialized form, where the original
    /// sizing inputs are unknown. `expected_insertions` and `target_fp_rate`
    /// report 0 on the result.
    ///
    /// # Errors
    ///
    /// Returns [`BloomAggError::InvalidHashCount`] if `num_hashes == 0`.
    pub fn from_parts(bits: BitVec, num_hashes: u32) -> Result<Self> {
        if num_hashes == 0 {
            return Err(BloomAggError::invalid_hash_count(0));
        }

        Ok(Self {
            bits,
            num_hashes,
            expected_insertions: 0,
            target_fp_rate: 0.0,
        })
    }

    /// Insert an item.
    ///
    /// Idempotent: inserting the same bytes again changes nothing. The
    /// empty byte string is a valid item. Takes `&self`; bit flips are
    /// atomic.
    ///
    /// # Errors
    ///
    /// Propagates index-derivation and bit-array errors
    /// ([`BloomAggError::InvalidHashCount`], [`BloomAggError::InvalidFilterSize`],
    /// [`BloomAggError::IndexOutOfBounds`]). Every constructor enforces the
    /// bounds these guard, so none of them can surface from a filter built
    /// through the public API.
    pub fn insert(&self, item: &[u8]) -> Result<()> {
        for index in self.probe_indices(item)? {
            self.bits.set(index)?;
        }
        Ok(())
    }

    /// Test whether an item may have been inserted.
    ///
    /// `true` means "possibly present" (false positives occur at roughly
    /// the configured rate once at capacity); `false` means "definitely not
    /// present". Never returns `false` for an inserted item.
    #[must_use]
    pub fn might_contain(&self, item: &[u8]) -> bool {
        // Construction guarantees m >= 1 and k >= 1, so index derivation
        // cannot fail here.
        self.probe_indices(item)
            .map_or(false, |indices| {
                indices.into_iter().all(|index| self.bits.get(index))
            })
    }

    /// Merge another filter into this one by bitwise OR.
    ///
    /// After the merge, `self` answers queries exactly as a single filter
    /// holding both filters' items would. `other` is not modified. Merging
    /// is commutative and associative at the bit level, and merging with an
    /// untouched filter is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BloomAggError::IncompatibleFilters`] if the filters differ
    /// in size or hash count. `self` is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomagg::BloomFilter;
    ///
    /// let mut a = BloomFilter::new(1000, 0.01).unwrap();
    /// let b = BloomFilter::new(500, 0.01).unwrap();
    /// assert!(a.union(&b).is_err());
    /// ```
    pub fn union(&mut self, other: &Self) -> Result<()> {
        if self.bits.len() != other.bits.len() {
            return Err(BloomAggError::incompatible_filters(format!(
                "cannot union filters of different sizes: {} vs {}",
                self.bits.len(),
                other.bits.len()
            )));
        }
        if self.num_hashes != other.num_hashes {
            return Err(BloomAggError::incompatible_filters(format!(
                "cannot union filters with different hash counts: {} vs {}",
                self.num_hashes, other.num_hashes
            )));
        }

        self.bits.or_in_place(&other.bits)
    }

    /// Serialize to the canonical byte form.
    ///
    /// Output is `24 + ⌈m/8⌉` bytes: a fixed header followed by the bit
    /// payload. Deterministic for a given bit pattern.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        wire::encode(self.bits.len(), self.num_hashes, &self.bits.to_bytes())
    }

    /// Reconstruct a filter from its serialized byte form.
    ///
    /// The result is bit-exact: it answers every query, serializes, and
    /// unions identically to the filter that produced the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BloomAggError::CorruptData`] for any malformed input:
    /// truncated header, wrong magic, unknown version, zero bit or hash
    /// counts, or a payload length that disagrees with the header.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let (header, payload) = wire::decode(data)?;
        let bits = BitVec::from_bytes(payload, header.num_bits)?;
        Self::from_parts(bits, header.num_hashes)
    }

    /// Get the number of bits in the filter (m).
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        self.bits.len()
    }

    /// Get the number of hash functions (k).
    #[must_use]
    #[inline]
    pub const fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Get the capacity the filter was sized for, or 0 if reconstructed
    /// from serialized form.
    #[must_use]
    #[inline]
    pub const fn expected_insertions(&self) -> usize {
        self.expected_insertions
    }

    /// Get the false positive rate the filter was sized for, or 0.0 if
    /// reconstructed from serialized form.
    #[must_use]
    #[inline]
    pub const fn target_fp_rate(&self) -> f64 {
        self.target_fp_rate
    }

    /// Count the bits currently set.
    #[must_use]
    pub fn count_set_bits(&self) -> usize {
        self.bits.count_ones()
    }

    /// Check whether no bits are set.
    ///
    /// True only if nothing has ever been inserted or merged in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count_set_bits() == 0
    }

    /// Get the fraction of bits set, in [0, 1].
    #[must_use]
    pub fn fill_rate(&self) -> f64 {
        self.count_set_bits() as f64 / self.bits.len() as f64
    }

    /// Estimate the current false positive rate from the fill rate.
    ///
    /// `(count_set_bits / m)^k`, the probability that all `k` probes of an
    /// uninserted item land on set bits.
    #[must_use]
    pub fn estimate_fp_rate(&self) -> f64 {
        self.fill_rate().powf(f64::from(self.num_hashes))
    }

    /// Get total memory usage in bytes.
    ///
    /// Constant for the lifetime of the filter regardless of insertions.
    #[must_use]
    pub fn estimated_memory_size(&self) -> usize {
        self.bits.memory_usage() + std::mem::size_of::<Self>() - std::mem::size_of::<BitVec>()
    }

    /// Derive the k probe indices for an item.
    ///
    /// Infallible in practice: every constructor enforces `m >= 1` and
    /// `k >= 1`, the bounds the strategy validates.
    fn probe_indices(&self, item: &[u8]) -> Result<Vec<usize>> {
        let (h1, h2) = Xxh3Hasher.hash_bytes_pair(item);
        DoubleHashing.generate_indices(h1, h2, self.num_hashes, self.bits.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parameters() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        assert_eq!(filter.size(), 9586);
        assert_eq!(filter.num_hashes(), 7);
        assert_eq!(filter.expected_insertions(), 1000);
        assert_eq!(filter.target_fp_rate(), 0.01);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        assert!(BloomFilter::new(0, 0.01).is_err());
        assert!(BloomFilter::new(1000, 0.0).is_err());
        assert!(BloomFilter::new(1000, 1.0).is_err());
        assert!(BloomFilter::new(1000, f64::NAN).is_err());
    }

    #[test]
    fn test_with_config() {
        let config = FilterConfig {
            expected_insertions: 1000,
            false_positive_rate: 0.01,
        };
        let filter = BloomFilter::with_config(&config).unwrap();
        assert_eq!(filter.size(), 9586);

        let bad = FilterConfig {
            expected_insertions: 0,
            ..FilterConfig::default()
        };
        assert!(BloomFilter::with_config(&bad).is_err());
    }

    #[test]
    fn test_insert_and_query() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();

        filter.insert(b"hello").unwrap();
        filter.insert(b"world").unwrap();

        assert!(filter.might_contain(b"hello"));
        assert!(filter.might_contain(b"world"));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_insert_idempotent() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.insert(b"item").unwrap();
        let before = filter.count_set_bits();

        filter.insert(b"item").unwrap();
        assert_eq!(filter.count_set_bits(), before);
    }

    #[test]
    fn test_empty_byte_string_is_valid_item() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.insert(b"").unwrap();
        assert!(filter.might_contain(b""));
    }

    #[test]
    fn test_empty_filter_contains_nothing() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        assert!(!filter.might_contain(b"anything"));
        assert!(!filter.might_contain(b""));
    }

    #[test]
    fn test_union_combines_items() {
        let mut a = BloomFilter::new(1000, 0.01).unwrap();
        let b = BloomFilter::new(1000, 0.01).unwrap();

        a.insert(b"alice").unwrap();
        b.insert(b"bob").unwrap();

        a.union(&b).unwrap();
        assert!(a.might_contain(b"alice"));
        assert!(a.might_contain(b"bob"));

        // Source unchanged.
        assert!(!b.might_contain(b"alice"));
    }

    #[test]
    fn test_union_with_empty_is_noop() {
        let mut a = BloomFilter::new(1000, 0.01).unwrap();
        a.insert(b"x").unwrap();
        let before = a.serialize();

        let empty = BloomFilter::new(1000, 0.01).unwrap();
        a.union(&empty).unwrap();
        assert_eq!(a.serialize(), before);
    }

    #[test]
    fn test_union_equals_single_filter() {
        let mut merged = BloomFilter::new(1000, 0.01).unwrap();
        let other = BloomFilter::new(1000, 0.01).unwrap();
        let single = BloomFilter::new(1000, 0.01).unwrap();

        for i in 0..50u32 {
            let key = i.to_le_bytes();
            if i % 2 == 0 {
                merged.insert(&key).unwrap();
            } else {
                other.insert(&key).unwrap();
            }
            single.insert(&key).unwrap();
        }

        merged.union(&other).unwrap();
        assert_eq!(merged.serialize(), single.serialize());
    }

    #[test]
    fn test_union_incompatible_sizes() {
        let mut a = BloomFilter::new(1000, 0.01).unwrap();
        let b = BloomFilter::new(2000, 0.01).unwrap();

        let err = a.union(&b).unwrap_err();
        assert!(matches!(err, BloomAggError::IncompatibleFilters { .. }));
    }

    #[test]
    fn test_union_error_leaves_self_unchanged() {
        let mut a = BloomFilter::new(1000, 0.01).unwrap();
        a.insert(b"keep").unwrap();
        let before = a.serialize();

        let b = BloomFilter::new(2000, 0.01).unwrap();
        assert!(a.union(&b).is_err());
        assert_eq!(a.serialize(), before);
    }

    #[test]
    fn test_serialize_length() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        // 24-byte header + ⌈9586/8⌉ payload bytes.
        assert_eq!(filter.serialize().len(), 24 + 1199);
    }

    #[test]
    fn test_round_trip_fresh() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        let restored = BloomFilter::deserialize(&filter.serialize()).unwrap();

        assert_eq!(restored.size(), filter.size());
        assert_eq!(restored.num_hashes(), filter.num_hashes());
        assert!(restored.is_empty());
        // Sizing inputs are not carried on the wire.
        assert_eq!(restored.expected_insertions(), 0);
        assert_eq!(restored.target_fp_rate(), 0.0);
    }

    #[test]
    fn test_round_trip_populated() {
        let filter = BloomFilter::new(1000, 0.01).unwrap();
        for i in 0..100u32 {
            filter.insert(&i.to_le_bytes()).unwrap();
        }

        let restored = BloomFilter::deserialize(&filter.serialize()).unwrap();

        for i in 0..100u32 {
            assert!(restored.might_contain(&i.to_le_bytes()));
        }
        assert_eq!(restored.serialize(), filter.serialize());
    }

    #[test]
    fn test_deserialized_filters_union() {
        let a = BloomFilter::new(1000, 0.01).unwrap();
        let b = BloomFilter::new(1000, 0.01).unwrap();
        a.insert(b"left").unwrap();
        b.insert(b"right").unwrap();

        let mut ra = BloomFilter::deserialize(&a.serialize()).unwrap();
        let rb = BloomFilter::deserialize(&b.serialize()).unwrap();

        ra.union(&rb).unwrap();
        assert!(ra.might_contain(b"left"));
        assert!(ra.might_contain(b"right"));
    }

    #[test]
    fn test_deserialize_corrupt_data() {
        assert!(matches!(
            BloomFilter::deserialize(&[]).unwrap_err(),
            BloomAggError::CorruptData { .. }
        ));
        assert!(matches!(
            BloomFilter::deserialize(b"not a filter at all, just bytes").unwrap_err(),
            BloomAggError::CorruptData { .. }
        ));

        let mut bytes = BloomFilter::new(100, 0.1).unwrap().serialize();
        bytes.truncate(bytes.len() - 1);
        assert!(matches!(
            BloomFilter::deserialize(&bytes).unwrap_err(),
            BloomAggError::CorruptData { .. }
        ));
    }

    #[test]
    fn test_from_parts_rejects_zero_hashes() {
        let bits = BitVec::new(64).unwrap();
        assert!(matches!(
            BloomFilter::from_parts(bits, 0).unwrap_err(),
            BloomAggError::InvalidHashCount { count: 0 }
        ));
    }

    #[test]
    fn test_fill_rate_and_estimate() {
        let filter = BloomFilter::new(100, 0.01).unwrap();
        assert_eq!(filter.fill_rate(), 0.0);
        assert_eq!(filter.estimate_fp_rate(), 0.0);

        for i in 0..100u32 {
            filter.insert(&i.to_le_bytes()).unwrap();
        }
        assert!(filter.fill_rate() > 0.0);
        assert!(filter.fill_rate() <= 1.0);
        assert!(filter.estimate_fp_rate() <= filter.fill_rate());
    }

    #[test]
    fn test_memory_constant_across_insertions() {
        let filter = BloomFilter::new(10_000, 0.01).unwrap();
        let before = filter.estimated_memory_size();

        for i in 0..10_000u32 {
            filter.insert(&i.to_le_bytes()).unwrap();
        }
        assert_eq!(filter.estimated_memory_size(), before);
    }

    #[test]
    fn test_clone_independence() {
        let a = BloomFilter::new(1000, 0.01).unwrap();
        a.insert(b"shared").unwrap();

        let b = a.clone();
        a.insert(b"only-a").unwrap();

        assert!(b.might_contain(b"shared"));
        assert!(!b.might_contain(b"only-a"));
    }
}
