//! Error types for bloomagg operations.
//!
//! Every fallible operation in the crate reports a [`BloomAggError`]
//! synchronously to its caller. There is no internal retry and no partial
//! success: construction, union and deserialization validate their inputs
//! before allocating or mutating anything.
//!
//! # Error Propagation
//!
//! ```
//! use bloomagg::Result;
//! use bloomagg::core::params::{optimal_bit_count, optimal_hash_count};
//!
//! fn filter_shape(n: usize, fp: f64) -> Result<(usize, u32)> {
//!     let m = optimal_bit_count(n, fp)?;
//!     let k = optimal_hash_count(m, n);
//!     Ok((m, k))
//! }
//! # assert!(filter_shape(1000, 0.01).is_ok());
//! ```

#![allow(clippy::module_name_repetitions)]

use std::fmt;

/// Result type alias for bloomagg operations.
///
/// All fallible operations return [`Result<T>`] where the error type is
/// [`BloomAggError`].
pub type Result<T> = std::result::Result<T, BloomAggError>;

/// Errors that can occur during Bloom filter operations.
///
/// # Design Notes
/// - `Clone` + `PartialEq` enable testing and error comparison
/// - Each variant carries enough context to diagnose the failure without
///   a debugger
#[derive(Debug, Clone, PartialEq)]
pub enum BloomAggError {
    /// Invalid filter parameters provided during construction.
    ///
    /// Raised when parameters don't satisfy mathematical constraints or
    /// would result in a non-functional filter (e.g. a bit count that
    /// overflows `usize`).
    InvalidParameters {
        /// Human-readable description of what's invalid.
        message: String,
    },

    /// False positive rate out of valid bounds (0, 1).
    ///
    /// A target of 0 would require infinite memory; a target of 1 accepts
    /// everything. Values outside [0, 1] are nonsensical probabilities.
    FalsePositiveRateOutOfBounds {
        /// The invalid false positive rate that was provided.
        fp_rate: f64,
    },

    /// Expected insertion count is invalid (zero).
    ///
    /// The sizing formulas divide by `n`, so `n == 0` is rejected up front.
    InvalidItemCount {
        /// The invalid count that was provided.
        count: usize,
    },

    /// Bit array length is invalid (zero).
    InvalidFilterSize {
        /// The invalid size in bits.
        size: usize,
    },

    /// Hash function count is invalid (zero).
    InvalidHashCount {
        /// The invalid hash count provided.
        count: usize,
    },

    /// Parameters are incompatible between two filters.
    ///
    /// Raised by union when the operands disagree on bit-array length or
    /// hash count. Filters are mergeable only if both match.
    IncompatibleFilters {
        /// Description of the incompatibility.
        reason: String,
    },

    /// Attempted to set or read a bit at an index >= length.
    ///
    /// Unreachable through the filter API (probe indices are reduced mod m)
    /// and indicates internal bit-array misuse if it ever surfaces.
    IndexOutOfBounds {
        /// The invalid index that was accessed.
        index: usize,
        /// The valid length of the bit array.
        length: usize,
    },

    /// Malformed bytes encountered at deserialization.
    ///
    /// Covers truncated buffers, unknown magic/version markers, and payload
    /// lengths that disagree with the header-declared bit count.
    CorruptData {
        /// Description of what failed to parse.
        message: String,
    },
}

impl fmt::Display for BloomAggError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameters { message } => {
                write!(f, "Invalid Bloom filter parameters: {}.", message)
            }
            Self::FalsePositiveRateOutOfBounds { fp_rate } => {
                write!(
                    f,
                    "False positive rate {} is out of bounds. Must be in range (0, 1).",
                    fp_rate
                )
            }
            Self::InvalidItemCount { count } => {
                write!(
                    f,
                    "Invalid expected insertion count: {}. Must be greater than 0.",
                    count
                )
            }
            Self::InvalidFilterSize { size } => {
                write!(
                    f,
                    "Invalid filter size: {} bits. Must be greater than 0.",
                    size
                )
            }
            Self::InvalidHashCount { count } => {
                write!(
                    f,
                    "Invalid hash function count: {}. Must be at least 1.",
                    count
                )
            }
            Self::IncompatibleFilters { reason } => {
                write!(
                    f,
                    "Cannot perform operation on incompatible filters: {}.",
                    reason
                )
            }
            Self::IndexOutOfBounds { index, length } => {
                write!(
                    f,
                    "Index {} out of bounds for bit array of length {}.",
                    index, length
                )
            }
            Self::CorruptData { message } => {
                write!(f, "Corrupt serialized filter: {}.", message)
            }
        }
    }
}

impl std::error::Error for BloomAggError {}

impl From<crate::wire::WireError> for BloomAggError {
    /// Every wire-level failure surfaces as `CorruptData`; the inner
    /// message preserves the precise cause.
    fn from(err: crate::wire::WireError) -> Self {
        Self::CorruptData {
            message: err.to_string(),
        }
    }
}

impl BloomAggError {
    /// Create an `InvalidParameters` error with a formatted message.
    #[must_use]
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a `FalsePositiveRateOutOfBounds` error.
    #[must_use]
    pub fn fp_rate_out_of_bounds(fp_rate: f64) -> Self {
        Self::FalsePositiveRateOutOfBounds { fp_rate }
    }

    /// Create an `InvalidItemCount` error.
    #[must_use]
    pub fn invalid_item_count(count: usize) -> Self {
        Self::InvalidItemCount { count }
    }

    /// Create an `InvalidFilterSize` error.
    #[must_use]
    pub fn invalid_filter_size(size: usize) -> Self {
        Self::InvalidFilterSize { size }
    }

    /// Create an `InvalidHashCount` error.
    #[must_use]
    pub fn invalid_hash_count(count: usize) -> Self {
        Self::InvalidHashCount { count }
    }

    /// Create an `IncompatibleFilters` error.
    #[must_use]
    pub fn incompatible_filters(reason: impl Into<String>) -> Self {
        Self::IncompatibleFilters {
            reason: reason.into(),
        }
    }

    /// Create an `IndexOutOfBounds` error.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    /// Create a `CorruptData` error.
    #[must_use]
    pub fn corrupt_data(message: impl Into<String>) -> Self {
        Self::CorruptData {
            message: message.into(),
        }
    }
}
