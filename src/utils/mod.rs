//! Shared helpers.

mod bitset;

pub use bitset::BitSet;
