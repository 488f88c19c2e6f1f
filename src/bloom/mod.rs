//! Bloom filter construction.
//!
//! - [`sizing`] - bit-array length from item count and target error rate
//! - [`hash`] - probe index derivation
//! - [`filter`] - the bit array with insert and lookup

pub mod filter;
pub mod hash;
pub mod sizing;

use serde::{Deserialize, Serialize};

pub use filter::BloomFilter;
pub use hash::{HashScheme, hash_index};
pub use sizing::{
    MAX_REFINE_ITEMS, estimate_bit_array_size, false_positive_rate, refine_bit_array_size,
};

use crate::error::{LexbloomError, Result};

/// Default target false-positive rate.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.05;

/// Default number of probes per insert or lookup.
pub const DEFAULT_HASH_FUNCTION_COUNT: usize = 4;

/// User-facing filter options, before any corpus has been sized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Target false-positive rate used for sizing.
    pub target_false_positive_rate: f64,

    /// Probes per insert or lookup (`k`).
    pub hash_function_count: usize,

    /// Probe index derivation.
    pub hash_scheme: HashScheme,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            target_false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
            hash_function_count: DEFAULT_HASH_FUNCTION_COUNT,
            hash_scheme: HashScheme::default(),
        }
    }
}

impl FilterOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        let rate = self.target_false_positive_rate;
        if !(rate > 0.0 && rate < 1.0) {
            return Err(LexbloomError::invalid_config(format!(
                "target false positive rate must be in (0, 1), got {rate}"
            )));
        }
        if self.hash_function_count == 0 {
            return Err(LexbloomError::invalid_config(
                "hash function count must be at least 1",
            ));
        }
        Ok(())
    }

    /// Size a filter for `unique_count` items.
    pub fn size_for(&self, unique_count: usize) -> FilterConfig {
        FilterConfig {
            target_false_positive_rate: self.target_false_positive_rate,
            hash_function_count: self.hash_function_count,
            bit_array_size: estimate_bit_array_size(
                unique_count,
                self.target_false_positive_rate,
            ),
            hash_scheme: self.hash_scheme,
        }
    }
}

/// Parameters of one built filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Target false-positive rate the filter was sized for.
    pub target_false_positive_rate: f64,

    /// Probes per insert or lookup (`k`).
    pub hash_function_count: usize,

    /// Computed bit array length (`m`).
    pub bit_array_size: usize,

    /// Probe index derivation.
    pub hash_scheme: HashScheme,
}

impl FilterConfig {
    /// Allocate an empty filter with these parameters.
    pub fn empty_filter(&self) -> Result<BloomFilter> {
        BloomFilter::new(
            self.bit_array_size,
            self.hash_function_count,
            self.hash_scheme,
        )
    }

    /// Estimated false-positive rate once `n` items are inserted.
    pub fn estimated_false_positive_rate(&self, n: usize) -> f64 {
        false_positive_rate(self.bit_array_size, n, self.hash_function_count)
    }
}
