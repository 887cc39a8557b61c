//! Feature-hashing encoder, a deterministic stand-in for a learned model.
//!
//! Each value becomes a signed bag of hashed features:
//!
//! - symbol unigrams,
//! - symbol bigrams (adjacent positions),
//! - symbol class shape (digit / letter / other) per position,
//! - the occupied length.
//!
//! Each feature lands in bucket `h % dim` with sign taken from a high hash bit,
//! and the vector is L2-normalised. Values with the same characters therefore
//! share a latent neighbourhood, which is all the representer needs.

use crate::{Error, Result};
use super::{OneHotItem, ValueEncoder};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

// Feature namespaces, mixed into the hash so kinds never collide by value.
const NS_UNIGRAM: u8 = 1;
const NS_BIGRAM: u8 = 2;
const NS_SHAPE: u8 = 3;
const NS_LENGTH: u8 = 4;

/// Classical latent encoder based on hashed character features.
#[derive(Debug, Clone)]
pub struct HashingEncoder {
    dim: usize,
}

impl HashingEncoder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::Config("hashing encoder dimension must be > 0".into()));
        }
        Ok(Self { dim })
    }

    fn encode_one(&self, item: &OneHotItem) -> Vec<f64> {
        let mut v = vec![0.0; self.dim];
        let symbols = item.symbols();

        for (pos, &sym) in symbols.iter().enumerate() {
            self.bump(&mut v, &[NS_UNIGRAM, sym]);
            self.bump(&mut v, &[NS_SHAPE, (pos.min(255)) as u8, shape(sym)]);
            if pos > 0 {
                self.bump(&mut v, &[NS_BIGRAM, symbols[pos - 1], sym]);
            }
        }
        let len = symbols.len().min(u16::MAX as usize) as u16;
        let [hi, lo] = len.to_be_bytes();
        self.bump(&mut v, &[NS_LENGTH, hi, lo]);

        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }

    #[inline]
    fn bump(&self, v: &mut [f64], feature: &[u8]) {
        let h = fnv1a(feature);
        let bucket = (h % self.dim as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign;
    }
}

impl ValueEncoder for HashingEncoder {
    fn latent_dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, batch: &[OneHotItem]) -> Result<Vec<Vec<f64>>> {
        Ok(batch.iter().map(|item| self.encode_one(item)).collect())
    }
}

/// Coarse character class of a one-hot symbol.
#[inline]
fn shape(sym: u8) -> u8 {
    // symbols are code + 1
    match sym.wrapping_sub(1) {
        b'0'..=b'9' => b'd',
        b'a'..=b'z' | b'A'..=b'Z' => b'a',
        _ if sym == super::OVERFLOW_SYMBOL => b'?',
        _ => b'.',
    }
}

#[inline]
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |h, &b| (h ^ b as u64).wrapping_mul(FNV_PRIME))
}
