//! # Value Encoder
//!
//! Values reach the encoder as fixed-length one-hot sequences over a
//! 256-symbol alphabet:
//!
//! ```text
//! char c  →  index ord(c) + 1   if ord(c) < 255
//!         →  index 0            otherwise (overflow bucket)
//!
//! "ab" with length 4:   [ e(98), e(99), 0…0, 0…0 ]
//!                         one-hot  one-hot  padding rows
//! ```
//!
//! The encoder itself is an injected capability: a pretrained network, a
//! lookup table or `HashingEncoder` all satisfy `ValueEncoder` as long as the
//! latent dimensionality is stable across calls.

pub mod hashing;

pub use hashing::HashingEncoder;

use crate::Result;

/// Number of one-hot symbols per position.
pub const ALPHABET_SIZE: usize = 256;

/// Symbol index for characters outside the direct range.
pub const OVERFLOW_SYMBOL: u8 = 0;

/// Map one character to its one-hot index.
#[inline]
pub fn symbol_index(c: char) -> u8 {
    let code = c as u32;
    if code < 255 { (code + 1) as u8 } else { OVERFLOW_SYMBOL }
}

/// A value as a fixed-length one-hot sequence, stored sparsely.
///
/// Position `p < symbols().len()` is hot at `symbols()[p]`; positions from
/// `symbols().len()` up to `length()` are all-zero padding rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OneHotItem {
    symbols: Vec<u8>,
    length: usize,
}

impl OneHotItem {
    /// Encode a value, truncating to `length` characters.
    pub fn encode(value: &str, length: usize) -> Self {
        let symbols = value.chars().take(length).map(symbol_index).collect();
        Self { symbols, length }
    }

    /// Sequence length including padding.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Hot indices of the non-padding positions.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    /// Hot index at a position, `None` for padding.
    pub fn hot_index(&self, pos: usize) -> Option<usize> {
        self.symbols.get(pos).map(|&s| s as usize)
    }

    /// Dense `length × ALPHABET_SIZE` row-major tensor, for encoders that
    /// consume one-hot input directly.
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0f32; self.length * ALPHABET_SIZE];
        for (pos, &sym) in self.symbols.iter().enumerate() {
            dense[pos * ALPHABET_SIZE + sym as usize] = 1.0;
        }
        dense
    }
}

/// Encode a batch of raw values.
pub fn encode_batch<S: AsRef<str>>(values: &[S], length: usize) -> Vec<OneHotItem> {
    values.iter().map(|v| OneHotItem::encode(v.as_ref(), length)).collect()
}

/// Maps one-hot value sequences to fixed-size latent vectors.
///
/// Implementations must return exactly one vector of `latent_dim()` entries
/// per input item, in input order.
pub trait ValueEncoder: Send + Sync {
    fn latent_dim(&self) -> usize;

    fn encode(&self, batch: &[OneHotItem]) -> Result<Vec<Vec<f64>>>;
}

impl<E: ValueEncoder + ?Sized> ValueEncoder for &E {
    fn latent_dim(&self) -> usize {
        (**self).latent_dim()
    }

    fn encode(&self, batch: &[OneHotItem]) -> Result<Vec<Vec<f64>>> {
        (**self).encode(batch)
    }
}

impl<E: ValueEncoder + ?Sized> ValueEncoder for Box<E> {
    fn latent_dim(&self) -> usize {
        (**self).latent_dim()
    }

    fn encode(&self, batch: &[OneHotItem]) -> Result<Vec<Vec<f64>>> {
        (**self).encode(batch)
    }
}
