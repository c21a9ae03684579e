//! Hashing and index derivation.

pub mod hasher;
pub mod strategies;

pub use hasher::{BloomHasher, Xxh3Hasher, DEFAULT_SEED, SECONDARY_SEED};
pub use strategies::{DoubleHashing, HashStrategy};
