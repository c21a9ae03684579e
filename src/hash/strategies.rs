//! Index derivation via double hashing.
//!
//! Rather than computing `k` independent hashes per item, the filter uses
//! the Kirsch-Mitzenmacher construction: two base hashes `(h1, h2)` expand
//! into `k` probe indices as
//!
//! ```text
//! index_i = (h1 + i·h2) mod m      for i in 0..k
//! ```
//!
//! All intermediate arithmetic is wrapping 64-bit, so the sequence is fully
//! determined by `(h1, h2, k, m)`. This formula is part of the
//! serialized-data contract: two processes with the same header fields must
//! probe the same bits for the same item.

use crate::error::{BloomAggError, Result};

/// Trait for expanding a base hash pair into probe indices.
pub trait HashStrategy: Send + Sync {
    /// Generate `count` indices in `[0, max)` from the hash pair.
    ///
    /// # Errors
    ///
    /// - [`BloomAggError::InvalidHashCount`] if `count == 0`
    /// - [`BloomAggError::InvalidFilterSize`] if `max == 0`
    fn generate_indices(&self, h1: u64, h2: u64, count: u32, max: usize) -> Result<Vec<usize>>;

    /// Human-readable strategy name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Classic double hashing: `(h1 + i·h2) mod m`.
///
/// # Examples
///
/// ```
/// use bloomagg::hash::strategies::{DoubleHashing, HashStrategy};
///
/// let strategy = DoubleHashing;
/// let indices = strategy.generate_indices(12345, 67890, 7, 1000).unwrap();
/// assert_eq!(indices.len(), 7);
/// assert!(indices.iter().all(|&i| i < 1000));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleHashing;

impl HashStrategy for DoubleHashing {
    #[inline]
    fn generate_indices(&self, h1: u64, h2: u64, count: u32, max: usize) -> Result<Vec<usize>> {
        if count == 0 {
            return Err(BloomAggError::invalid_hash_count(0));
        }
        if max == 0 {
            return Err(BloomAggError::invalid_filter_size(0));
        }

        let m = max as u64;
        Ok((0..u64::from(count))
            .map(|i| (h1.wrapping_add(i.wrapping_mul(h2)) % m) as usize)
            .collect())
    }

    fn name(&self) -> &'static str {
        "double-hashing"
    }
}
