//! Hashing primitives for index derivation.
//!
//! The filter needs two independent 64-bit hashes per item. Both are
//! produced by XXH3-64 with fixed, documented seeds so that any two
//! processes hashing the same bytes derive the same indices. The seeds are
//! part of the serialized-data contract and must never change.

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Default seed for the primary hash.
pub const DEFAULT_SEED: u64 = 0;

/// Seed for the secondary hash used in double hashing.
///
/// The 64-bit golden ratio constant, chosen for good bit dispersion and to
/// be obviously unequal to the primary seed.
pub const SECONDARY_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Trait for hash functions usable by the filter.
///
/// Implementations must be deterministic: equal input bytes and equal seeds
/// always produce equal output, across processes and platforms.
pub trait BloomHasher: Send + Sync {
    /// Hash a byte slice with the default seed.
    fn hash_bytes(&self, data: &[u8]) -> u64;

    /// Hash a byte slice with an explicit seed.
    fn hash_bytes_with_seed(&self, data: &[u8], seed: u64) -> u64;

    /// Produce the `(h1, h2)` pair consumed by double hashing.
    ///
    /// `h1` uses [`DEFAULT_SEED`], `h2` uses [`SECONDARY_SEED`].
    fn hash_bytes_pair(&self, data: &[u8]) -> (u64, u64) {
        (
            self.hash_bytes_with_seed(data, DEFAULT_SEED),
            self.hash_bytes_with_seed(data, SECONDARY_SEED),
        )
    }

    /// Human-readable name of the hash function for diagnostics.
    fn name(&self) -> &'static str;
}

/// XXH3-64 hasher.
///
/// The only hasher the wire format admits (header version 1). Fast on
/// short keys, high-quality dispersion, stable output across platforms.
///
/// # Examples
///
/// ```
/// use bloomagg::hash::hasher::{BloomHasher, Xxh3Hasher};
///
/// let hasher = Xxh3Hasher;
/// let (h1, h2) = hasher.hash_bytes_pair(b"hello");
/// assert_ne!(h1, h2);
/// assert_eq!(hasher.hash_bytes_pair(b"hello"), (h1, h2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh3Hasher;

impl BloomHasher for Xxh3Hasher {
    #[inline]
    fn hash_bytes(&self, data: &[u8]) -> u64 {
        xxh3_64_with_seed(data, DEFAULT_SEED)
    }

    #[inline]
    fn hash_bytes_with_seed(&self, data: &[u8], seed: u64) -> u64 {
        xxh3_64_with_seed(data, seed)
    }

    fn name(&self) -> &'static str {
        "xxh3-64"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let hasher = Xxh3Hasher;
        assert_eq!(hasher.hash_bytes(b"abc"), hasher.hash_bytes(b"abc"));
        assert_eq!(
            hasher.hash_bytes_with_seed(b"abc", 42),
            hasher.hash_bytes_with_seed(b"abc", 42)
        );
    }

    #[test]
    fn test_seed_changes_output() {
        let hasher = Xxh3Hasher;
        assert_ne!(
            hasher.hash_bytes_with_seed(b"abc", DEFAULT_SEED),
            hasher.hash_bytes_with_seed(b"abc", SECONDARY_SEED)
        );
    }

    #[test]
    fn test_pair_uses_fixed_seeds() {
        let hasher = Xxh3Hasher;
        let (h1, h2) = hasher.hash_bytes_pair(b"key");
        assert_eq!(h1, hasher.hash_bytes_with_seed(b"key", DEFAULT_SEED));
        assert_eq!(h2, hasher.hash_bytes_with_seed(b"key", SECONDARY_SEED));
    }

    #[test]
    fn test_different_inputs_differ() {
        let hasher = Xxh3Hasher;
        assert_ne!(hasher.hash_bytes(b"a"), hasher.hash_bytes(b"b"));
    }

    #[test]
    fn test_empty_input() {
        let hasher = Xxh3Hasher;
        // Empty input is a valid key and hashes deterministically.
        assert_eq!(hasher.hash_bytes(b""), hasher.hash_bytes(b""));
    }

    #[test]
    fn test_name() {
        assert_eq!(Xxh3Hasher.name(), "xxh3-64");
    }
}
