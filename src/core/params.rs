//! Optimal Bloom filter parameter calculation.
//!
//! Standard formulas for sizing a Bloom filter given an expected number of
//! insertions `n` and a target false positive rate `p`:
//!
//! - Bits: `m = ⌈-n·ln(p) / (ln 2)²⌉`, minimum 1
//! - Hash functions: `k = max(1, round((m/n)·ln 2))`
//!
//! `k` is intentionally not clamped from above: an extreme `p` yields an
//! extreme (but correct) `k`, and both sides of a merge recompute identical
//! values from identical inputs.
//!
//! # Examples
//!
//! ```
//! use bloomagg::core::params::{optimal_bit_count, optimal_hash_count};
//!
//! let m = optimal_bit_count(10_000, 0.01).unwrap();
//! let k = optimal_hash_count(m, 10_000);
//!
//! assert_eq!(m, 95_851);
//! assert_eq!(k, 7);
//! ```

use crate::error::{BloomAggError, Result};

/// ln(2)² constant used in optimal size calculation.
pub const LN2_SQUARED: f64 = std::f64::consts::LN_2 * std::f64::consts::LN_2;

/// Calculate the optimal number of bits for a Bloom filter.
///
/// Uses the formula `m = ⌈-n·ln(p) / (ln 2)²⌉` with a floor of 1 bit.
///
/// # Arguments
///
/// * `expected_items` - Expected number of insertions (n), must be > 0
/// * `fp_rate` - Target false positive rate (p), must satisfy 0 < p < 1
///
/// # Errors
///
/// - [`BloomAggError::InvalidItemCount`] if `expected_items == 0`
/// - [`BloomAggError::FalsePositiveRateOutOfBounds`] if `fp_rate` is not in
///   the open interval (0, 1), including NaN
/// - [`BloomAggError::InvalidParameters`] if the result overflows `usize`
pub fn optimal_bit_count(expected_items: usize, fp_rate: f64) -> Result<usize> {
    if expected_items == 0 {
        return Err(BloomAggError::invalid_item_count(0));
    }
    if !(fp_rate > 0.0 && fp_rate < 1.0) {
        return Err(BloomAggError::fp_rate_out_of_bounds(fp_rate));
    }

    let n = expected_items as f64;
    let bits = -(n * fp_rate.ln()) / LN2_SQUARED;

    if !bits.is_finite() || bits > usize::MAX as f64 {
        return Err(BloomAggError::invalid_parameters(format!(
            "bit count overflow for {} items at fp rate {}",
            expected_items, fp_rate
        )));
    }

    Ok((bits.ceil() as usize).max(1))
}

/// Calculate the optimal number of hash functions.
///
/// Uses the formula `k = max(1, round((m/n)·ln 2))`. No upper clamp is
/// applied.
///
/// # Arguments
///
/// * `num_bits` - Size of the bit array (m), must be > 0
/// * `expected_items` - Expected number of insertions (n), must be > 0
#[must_use]
pub fn optimal_hash_count(num_bits: usize, expected_items: usize) -> u32 {
    debug_assert!(num_bits > 0 && expected_items > 0);

    let ratio = num_bits as f64 / expected_items as f64;
    let k = (ratio * std::f64::consts::LN_2).round();

    (k as u32).max(1)
}

/// Calculate both optimal parameters in one validated call.
///
/// Returns `(num_bits, num_hashes)` for the given expected item count and
/// target false positive rate.
///
/// # Errors
///
/// Same conditions as [`optimal_bit_count`].
///
/// # Examples
///
/// ```
/// use bloomagg::core::params::calculate_filter_params;
///
/// let (m, k) = calculate_filter_params(1000, 0.01).unwrap();
/// assert_eq!(m, 9586);
/// assert_eq!(k, 7);
/// ```
pub fn calculate_filter_params(expected_items: usize, fp_rate: f64) -> Result<(usize, u32)> {
    let num_bits = optimal_bit_count(expected_items, fp_rate)?;
    let num_hashes = optimal_hash_count(num_bits, expected_items);
    Ok((num_bits, num_hashes))
}

/// Calculate the expected false positive rate for given parameters.
///
/// Uses the formula `p = (1 - e^(-k·n/m))^k`. Diagnostic only.
///
/// # Arguments
///
/// * `num_bits` - Size of the bit array (m)
/// * `num_hashes` - Number of hash functions (k)
/// * `num_items` - Number of items inserted (n)
#[must_use]
pub fn expected_fp_rate(num_bits: usize, num_hashes: u32, num_items: usize) -> f64 {
    if num_bits == 0 || num_items == 0 {
        return 0.0;
    }

    let m = num_bits as f64;
    let k = f64::from(num_hashes);
    let n = num_items as f64;

    (1.0 - (-k * n / m).exp()).powf(k)
}
