//! Word-packed bit array backing the Bloom filter.
//!
//! `BitVec` is a fixed-size bit array backed by `Box<[AtomicU64]>`. Each
//! 64-bit word stores 64 bits. Bits only ever flip 0→1 — there is no clear
//! operation, matching the append/merge-only nature of the filter.
//!
//! # Memory Ordering
//!
//! `set` uses `Release` and `get` uses `Acquire`, so a thread that observes
//! a bit set by another thread also observes every bit set before it. The
//! host guarantees a single logical writer per filter, so this is an extra
//! safety margin rather than a load-bearing contract.
//!
//! # Memory Layout
//!
//! Bits are packed into 64-bit words in little-endian bit order:
//!
//! ```text
//! Word 0: [bit 0][bit 1]...[bit 63]
//! Word 1: [bit 64][bit 65]...[bit 127]
//! ```
//!
//! The byte form produced by [`BitVec::to_bytes`] is the same layout cut at
//! the byte boundary: bit `i` lives at byte `i/8`, position `i % 8`,
//! least-significant-bit first. That byte layout is part of the wire format
//! (see [`crate::wire`]) and must never change.
//!
//! # Examples
//!
//! ```
//! use bloomagg::core::bitvec::BitVec;
//!
//! let bits = BitVec::new(100).unwrap();
//! bits.set(42).unwrap();
//! assert!(bits.get(42));
//! assert!(!bits.get(43));
//! assert_eq!(bits.count_ones(), 1);
//! ```

use crate::error::{BloomAggError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Fixed-size bit array with atomic word storage.
///
/// # Type Properties
///
/// - `Send + Sync`: safe to share across threads (`AtomicU64` is both)
/// - `Clone`: independent copy via explicit implementation
/// - `Serde`: serialization support behind the `serde` feature flag
#[derive(Debug)]
pub struct BitVec {
    /// Atomic words, each storing 64 bits.
    words: Box<[AtomicU64]>,

    /// Total number of bits in the array.
    len: usize,
}

impl BitVec {
    /// Create a new bit array with the specified number of bits, all zero.
    ///
    /// Allocates `⌈num_bits / 64⌉` words.
    ///
    /// # Errors
    ///
    /// Returns [`BloomAggError::InvalidFilterSize`] if `num_bits == 0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomagg::core::bitvec::BitVec;
    ///
    /// let bits = BitVec::new(1000).unwrap();
    /// assert_eq!(bits.len(), 1000);
    /// assert_eq!(bits.count_ones(), 0);
    /// ```
    pub fn new(num_bits: usize) -> Result<Self> {
        if num_bits == 0 {
            return Err(BloomAggError::invalid_filter_size(0));
        }

        let num_words = (num_bits + 63) / 64;
        let words = (0..num_words)
            .map(|_| AtomicU64::new(0))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            words,
            len: num_bits,
        })
    }

    /// Get the number of bits in the array.
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check whether the array has zero length.
    ///
    /// Always `false` for a successfully constructed `BitVec`; provided for
    /// API completeness.
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set bit `index` to 1.
    ///
    /// Idempotent: setting an already-set bit has no additional effect.
    /// Uses an atomic fetch-or with `Release` ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BloomAggError::IndexOutOfBounds`] if `index >= len`. Filter
    /// code derives indices mod `len`, so this path signals internal misuse.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomagg::core::bitvec::BitVec;
    ///
    /// let bits = BitVec::new(64).unwrap();
    /// bits.set(10).unwrap();
    /// bits.set(10).unwrap(); // idempotent
    /// assert!(bits.get(10));
    /// assert!(bits.set(64).is_err());
    /// ```
    #[inline]
    pub fn set(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(BloomAggError::index_out_of_bounds(index, self.len));
        }

        let word_idx = index / 64;
        let mask = 1u64 << (index % 64);
        self.words[word_idx].fetch_or(mask, Ordering::Release);
        Ok(())
    }

    /// Get the value of bit `index`.
    ///
    /// Uses an atomic load with `Acquire` ordering.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`, matching standard library indexing
    /// behavior. Filter code derives indices mod `len`.
    #[must_use]
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "BitVec index out of bounds: index={} len={}",
            index,
            self.len
        );

        let word_idx = index / 64;
        let mask = 1u64 << (index % 64);
        (self.words[word_idx].load(Ordering::Acquire) & mask) != 0
    }

    /// Bitwise OR another array into this one.
    ///
    /// This is the union primitive: per-word `fetch_or`, so it is idempotent
    /// and commutative per bit. Both arrays must have the same length.
    ///
    /// # Errors
    ///
    /// Returns [`BloomAggError::IncompatibleFilters`] if lengths differ;
    /// nothing is mutated in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomagg::core::bitvec::BitVec;
    ///
    /// let a = BitVec::new(64).unwrap();
    /// let b = BitVec::new(64).unwrap();
    /// a.set(10).unwrap();
    /// b.set(20).unwrap();
    ///
    /// a.or_in_place(&b).unwrap();
    /// assert!(a.get(10));
    /// assert!(a.get(20));
    /// ```
    pub fn or_in_place(&self, other: &Self) -> Result<()> {
        if self.len != other.len {
            return Err(BloomAggError::incompatible_filters(format!(
                "bit array size mismatch: {} vs {}",
                self.len, other.len
            )));
        }

        for (dst, src) in self.words.iter().zip(&*other.words) {
            dst.fetch_or(src.load(Ordering::Acquire), Ordering::Release);
        }

        Ok(())
    }

    /// Count the number of bits set to 1.
    ///
    /// Used for fill-rate diagnostics, not correctness. O(⌈len/64⌉).
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|word| word.load(Ordering::Acquire).count_ones() as usize)
            .sum()
    }

    /// Get the number of 64-bit words allocated.
    #[must_use]
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// Get total memory usage in bytes (word storage plus the struct).
    ///
    /// Constant for the lifetime of the array: insertions never change it.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.words.len() * std::mem::size_of::<AtomicU64>() + std::mem::size_of::<Self>()
    }

    /// Serialize the bit contents to exactly `⌈len/8⌉` bytes.
    ///
    /// Bit `i` is stored at byte `i/8`, bit position `i % 8`, LSB first.
    /// This is the wire payload layout; [`BitVec::from_bytes`] is the exact
    /// inverse for every reachable state.
    ///
    /// # Examples
    ///
    /// ```
    /// use bloomagg::core::bitvec::BitVec;
    ///
    /// let bits = BitVec::new(12).unwrap();
    /// bits.set(0).unwrap();
    /// bits.set(9).unwrap();
    ///
    /// let bytes = bits.to_bytes();
    /// assert_eq!(bytes, vec![0b0000_0001, 0b0000_0010]);
    /// ```
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let num_bytes = (self.len + 7) / 8;
        let mut bytes = Vec::with_capacity(self.words.len() * 8);

        for word in &*self.words {
            bytes.extend_from_slice(&word.load(Ordering::Acquire).to_le_bytes());
        }

        bytes.truncate(num_bytes);
        bytes
    }

    /// Reconstruct a bit array of length `num_bits` from its byte form.
    ///
    /// The input must be exactly `⌈num_bits/8⌉` bytes in the layout written
    /// by [`BitVec::to_bytes`]. Bits at positions >= `num_bits` in the final
    /// byte are masked off so that round-trips are bit-exact.
    ///
    /// # Errors
    ///
    /// - [`BloomAggError::InvalidFilterSize`] if `num_bits == 0`
    /// - [`BloomAggError::CorruptData`] if the byte length does not equal
    ///   `⌈num_bits/8⌉`
    pub fn from_bytes(bytes: &[u8], num_bits: usize) -> Result<Self> {
        if num_bits == 0 {
            return Err(BloomAggError::invalid_filter_size(0));
        }

        let expected_bytes = (num_bits + 7) / 8;
        if bytes.len() != expected_bytes {
            return Err(BloomAggError::corrupt_data(format!(
                "payload length {} does not match {} bytes required for {} bits",
                bytes.len(),
                expected_bytes,
                num_bits
            )));
        }

        let num_words = (num_bits + 63) / 64;
        let mut words = Vec::with_capacity(num_words);

        for chunk_idx in 0..num_words {
            let mut buf = [0u8; 8];
            let start = chunk_idx * 8;
            let end = (start + 8).min(bytes.len());
            buf[..end - start].copy_from_slice(&bytes[start..end]);
            words.push(u64::from_le_bytes(buf));
        }

        // Mask bits above num_bits in the last word so equality and union
        // behave bit-exactly regardless of what the producer left there.
        let tail_bits = num_bits % 64;
        if tail_bits != 0 {
            if let Some(last) = words.last_mut() {
                *last &= (1u64 << tail_bits) - 1;
            }
        }

        let words = words
            .into_iter()
            .map(AtomicU64::new)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            words,
            len: num_bits,
        })
    }

    /// Check bit-for-bit equality with another array.
    ///
    /// Two arrays are equal iff they have the same length and identical bit
    /// contents. Used by union commutativity/associativity tests.
    #[must_use]
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .words
                .iter()
                .zip(&*other.words)
                .all(|(a, b)| a.load(Ordering::Acquire) == b.load(Ordering::Acquire))
    }
}

impl Clone for BitVec {
    /// Create an independent copy with the same bit values.
    fn clone(&self) -> Self {
        let words = self
            .words
            .iter()
            .map(|w| AtomicU64::new(w.load(Ordering::Acquire)))
            .collect();

        Self {
            words,
            len: self.len,
        }
    }
}

#[cfg(feature = "serde")]
impl Serialize for BitVec {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let words: Vec<u64> = self
            .words
            .iter()
            .map(|w| w.load(Ordering::Acquire))
            .collect();

        let mut state = serializer.serialize_struct("BitVec", 2)?;
        state.serialize_field("words", &words)?;
        state.serialize_field("len", &self.len)?;
        state.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BitVec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            words: Vec<u64>,
            len: usize,
        }

        let raw = Raw::deserialize(deserializer)?;
        if raw.len == 0 {
            return Err(de::Error::custom("BitVec length must be greater than 0"));
        }
        let required = (raw.len + 63) / 64;
        if raw.words.len() != required {
            return Err(de::Error::custom(format!(
                "BitVec word count {} does not match {} required for {} bits",
                raw.words.len(),
                required,
                raw.len
            )));
        }

        let words = raw
            .words
            .into_iter()
            .map(AtomicU64::new)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(BitVec {
            words,
            len: raw.len,
        })
    }
}
