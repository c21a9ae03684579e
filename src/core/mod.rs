//! Core data structures and parameter math.

pub mod bitvec;
pub mod params;

pub use bitvec::BitVec;
pub use params::{calculate_filter_params, expected_fp_rate, optimal_bit_count, optimal_hash_count};
