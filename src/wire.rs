//! Wire format for serialized filters.
//!
//! A serialized filter is a fixed 24-byte header followed by the bit
//! payload. All multi-byte fields are little-endian:
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic b"BFAG"
//! 4       2     Format version (currently 1)
//! 6       2     Flags (currently 0, must be 0)
//! 8       8     Number of bits m (u64)
//! 16      4     Number of hash functions k (u32)
//! 20      4     Reserved, must be zero
//! 24      —     Payload: ⌈m/8⌉ bytes, bit i at byte i/8, position i%8
//! ```
//!
//! The header carries everything needed to reconstruct and merge a filter;
//! the hash function and probe formula are fixed by the version field.
//! Decoding is strict: wrong magic, unknown version, nonzero flags or
//! reserved bytes, zero `m`, zero `k`, and payload length mismatches are
//! all rejected.

use thiserror::Error;

/// Magic bytes identifying a serialized filter.
pub const MAGIC: [u8; 4] = *b"BFAG";

/// Current wire format version.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 24;

/// Errors produced while decoding a serialized filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Input shorter than the fixed header.
    #[error("buffer too small: {actual} bytes, header needs {HEADER_SIZE}")]
    BufferTooSmall {
        /// Actual input length.
        actual: usize,
    },

    /// Magic bytes did not match.
    #[error("invalid magic bytes: expected {MAGIC:?}, found {found:?}")]
    InvalidMagic {
        /// Bytes found at the start of the input.
        found: [u8; 4],
    },

    /// Version field is not a version this build understands.
    #[error("unsupported format version {version}, expected {FORMAT_VERSION}")]
    UnsupportedVersion {
        /// Version field from the header.
        version: u16,
    },

    /// Flags or reserved bytes carry bits this build does not understand.
    #[error("unsupported header field: {0}")]
    UnsupportedField(&'static str),

    /// Header declares zero bits.
    #[error("header declares zero bits")]
    InvalidBitCount,

    /// Header declares zero hash functions.
    #[error("header declares zero hash functions")]
    InvalidHashCount,

    /// Payload length disagrees with the bit count in the header.
    #[error("payload length {actual} does not match {expected} bytes required for {num_bits} bits")]
    PayloadLengthMismatch {
        /// Actual payload length.
        actual: usize,
        /// Required payload length.
        expected: usize,
        /// Bit count from the header.
        num_bits: u64,
    },

    /// Declared bit count does not fit in this platform's `usize`.
    #[error("bit count {0} exceeds platform addressable size")]
    BitCountTooLarge(u64),
}

/// Decoded header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of bits in the filter (m).
    pub num_bits: usize,
    /// Number of hash functions (k).
    pub num_hashes: u32,
}

/// Encode the header followed by the payload into a fresh buffer.
///
/// The payload must already be exactly `⌈num_bits/8⌉` bytes; this is the
/// caller's invariant and is checked with a debug assertion only.
#[must_use]
pub fn encode(num_bits: usize, num_hashes: u32, payload: &[u8]) -> Vec<u8> {
    debug_assert_eq!(payload.len(), (num_bits + 7) / 8);

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u16.to_le_bytes()); // flags
    buf.extend_from_slice(&(num_bits as u64).to_le_bytes());
    buf.extend_from_slice(&num_hashes.to_le_bytes());
    buf.extend_from_slice(&[0u8; 4]); // reserved
    buf.extend_from_slice(payload);
    buf
}

/// Decode and validate the header, returning it with the payload slice.
///
/// # Errors
///
/// Any [`WireError`] variant; see the module docs for the full list of
/// rejected conditions.
pub fn decode(data: &[u8]) -> Result<(Header, &[u8]), WireError> {
    if data.len() < HEADER_SIZE {
        return Err(WireError::BufferTooSmall { actual: data.len() });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&data[0..4]);
    if magic != MAGIC {
        return Err(WireError::InvalidMagic { found: magic });
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != FORMAT_VERSION {
        return Err(WireError::UnsupportedVersion { version });
    }

    let flags = u16::from_le_bytes([data[6], data[7]]);
    if flags != 0 {
        return Err(WireError::UnsupportedField("flags"));
    }

    let mut bits_field = [0u8; 8];
    bits_field.copy_from_slice(&data[8..16]);
    let num_bits = u64::from_le_bytes(bits_field);
    if num_bits == 0 {
        return Err(WireError::InvalidBitCount);
    }

    let num_hashes = u32::from_le_bytes([data[16], data[17], data[18], data[19]]);
    if num_hashes == 0 {
        return Err(WireError::InvalidHashCount);
    }

    if data[20..24] != [0u8; 4] {
        return Err(WireError::UnsupportedField("reserved"));
    }

    let num_bits_usize =
        usize::try_from(num_bits).map_err(|_| WireError::BitCountTooLarge(num_bits))?;

    let payload = &data[HEADER_SIZE..];
    let expected = (num_bits_usize + 7) / 8;
    if payload.len() != expected {
        return Err(WireError::PayloadLengthMismatch {
            actual: payload.len(),
            expected,
            num_bits,
        });
    }

    Ok((
        Header {
            num_bits: num_bits_usize,
            num_hashes,
        },
        payload,
    ))
}
