//! Bloom filter storage, insertion and lookup.

use std::num::NonZeroUsize;

use bit_vec::BitVec;

use crate::bloom::hash::HashScheme;
use crate::error::{LexbloomError, Result};

/// A fixed-size Bloom filter over string tokens.
///
/// The bit array is allocated all-false at construction and only ever has bits
/// set by [`BloomFilter::insert`]. Inserted tokens are never reported absent.
///
/// # Examples
///
/// ```
/// use lexbloom::bloom::filter::BloomFilter;
/// use lexbloom::bloom::hash::HashScheme;
///
/// let filter = BloomFilter::build(["a", "b", "c"], 19, 4, HashScheme::DivisionMethod).unwrap();
/// assert!(filter.contains("a"));
/// assert_eq!(filter.bit_len(), 19);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    bits: BitVec,
    num_hashes: usize,
    scheme: HashScheme,
}

impl BloomFilter {
    /// Create an empty filter with `m` bits and `k` probes per operation.
    pub fn new(m: usize, k: usize, scheme: HashScheme) -> Result<Self> {
        if k == 0 {
            return Err(LexbloomError::invalid_argument(
                "hash function count must be at least 1",
            ));
        }
        Ok(BloomFilter {
            bits: BitVec::from_elem(m, false),
            num_hashes: k,
            scheme,
        })
    }

    /// Create a filter with `m` bits and insert every token.
    pub fn build<I, S>(tokens: I, m: usize, k: usize, scheme: HashScheme) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut filter = Self::new(m, k, scheme)?;
        for token in tokens {
            filter.insert(&token)?;
        }
        Ok(filter)
    }

    /// Set the `k` probe bits of `token`.
    ///
    /// Fails on a zero-length filter, which has no bit to set.
    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, token: &T) -> Result<()> {
        let m = NonZeroUsize::new(self.bits.len()).ok_or_else(|| {
            LexbloomError::invalid_argument("cannot insert into a zero-length bit array")
        })?;
        for index in self.scheme.indices(token, m, self.num_hashes) {
            self.bits.set(index, true);
        }
        Ok(())
    }

    /// Check whether `token` may have been inserted.
    ///
    /// True iff every probe bit is set. A zero-length filter contains nothing.
    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, token: &T) -> bool {
        let Some(m) = NonZeroUsize::new(self.bits.len()) else {
            return false;
        };
        self.scheme
            .indices(token, m, self.num_hashes)
            .all(|index| self.bits.get(index).unwrap_or(false))
    }

    /// Probe indices used for `token`, or `None` for a zero-length filter.
    pub fn indices<T: AsRef<[u8]> + ?Sized>(&self, token: &T) -> Option<Vec<usize>> {
        let m = NonZeroUsize::new(self.bits.len())?;
        Some(self.scheme.indices(token, m, self.num_hashes).collect())
    }

    /// Length of the bit array (`m`).
    pub fn bit_len(&self) -> usize {
        self.bits.len()
    }

    /// Number of probes per operation (`k`).
    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Index derivation scheme.
    pub fn scheme(&self) -> HashScheme {
        self.scheme
    }

    /// Number of bits set.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|bit| *bit).count()
    }

    /// Fraction of bits set, 0.0 for a zero-length filter.
    pub fn fill_ratio(&self) -> f64 {
        if self.bits.is_empty() {
            0.0
        } else {
            self.count_ones() as f64 / self.bits.len() as f64
        }
    }

    /// Whether no bit has been set.
    pub fn is_clear(&self) -> bool {
        self.bits.none()
    }

    /// The underlying bit array.
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }
}
