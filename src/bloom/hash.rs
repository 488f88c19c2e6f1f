//! Index derivation for Bloom filter insertion and lookup.
//!
//! The base function is the division-method hash: the sum of the token's
//! character codes reduced modulo the table size. It has no seed and no
//! function-index parameter, so calling it `k` times for the same token always
//! lands on the same bit. [`HashScheme::DivisionMethod`] keeps that behavior:
//! a filter nominally using four hash functions effectively uses one, and its
//! real false-positive rate is higher than the sizing formula predicts.
//!
//! [`HashScheme::DoubleHashing`] derives `k` distinct probes from two base
//! hashes instead (`h1 + i·h2`), which restores the usual Bloom filter
//! behavior.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Division-method hash of `token` into `[0, m)`.
///
/// Character codes are the token's raw bytes, read as unsigned.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use lexbloom::bloom::hash::hash_index;
///
/// let m = NonZeroUsize::new(19).unwrap();
/// // 'a' = 97, 97 % 19 = 2
/// assert_eq!(hash_index("a", m), 2);
/// ```
pub fn hash_index<T: AsRef<[u8]> + ?Sized>(token: &T, m: NonZeroUsize) -> usize {
    (byte_sum(token.as_ref()) % m.get() as u64) as usize
}

fn byte_sum(token: &[u8]) -> u64 {
    token
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_add(u64::from(b)))
}

/// Polynomial rolling hash, forced odd so the probe stride never collapses
/// to zero modulo an even table size.
fn rolling_hash(token: &[u8]) -> u64 {
    token
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
        | 1
}

/// How the `k` probe indices for a token are derived.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum HashScheme {
    /// `k` calls to [`hash_index`]; every probe is the same bit.
    #[default]
    DivisionMethod,

    /// Probe `i` is `(h1 + i·h2) mod m`, with `h1` the division-method sum and
    /// `h2` a rolling hash.
    DoubleHashing,
}

impl HashScheme {
    /// Yield the `k` probe indices of `token` in a table of size `m`.
    pub fn indices<T: AsRef<[u8]> + ?Sized>(
        self,
        token: &T,
        m: NonZeroUsize,
        k: usize,
    ) -> ProbeIndices {
        let token = token.as_ref();
        let (h1, h2) = match self {
            HashScheme::DivisionMethod => (byte_sum(token), 0),
            HashScheme::DoubleHashing => (byte_sum(token), rolling_hash(token)),
        };
        ProbeIndices {
            scheme: self,
            token_sum: h1,
            stride: h2,
            m: m.get() as u64,
            remaining: k,
            step: 0,
        }
    }

    /// Whether probes for one token can land on more than one bit.
    pub fn has_independent_probes(self) -> bool {
        matches!(self, HashScheme::DoubleHashing)
    }

    /// Get the name of this scheme.
    pub fn name(self) -> &'static str {
        match self {
            HashScheme::DivisionMethod => "division_method",
            HashScheme::DoubleHashing => "double_hashing",
        }
    }
}

/// Iterator over the probe indices of one token.
#[derive(Debug, Clone)]
pub struct ProbeIndices {
    scheme: HashScheme,
    token_sum: u64,
    stride: u64,
    m: u64,
    remaining: usize,
    step: u64,
}

impl Iterator for ProbeIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let index = match self.scheme {
            HashScheme::DivisionMethod => self.token_sum % self.m,
            HashScheme::DoubleHashing => self
                .token_sum
                .wrapping_add(self.step.wrapping_mul(self.stride))
                % self.m,
        };
        self.step += 1;
        Some(index as usize)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeIndices {}
