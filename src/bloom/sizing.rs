//! Bit-array sizing for Bloom filters.
//!
//! Given `n` unique items and a target false-positive rate `p`, the optimal bit
//! array length is
//!
//! ```text
//! m = ceil(-n · ln(p) / (ln 2)²)
//! ```
//!
//! and the expected false-positive rate of an `m`-bit filter with `k` hash
//! functions holding `n` items is
//!
//! ```text
//! p' = (1 - (1 - 1/m)^(k·n))^k
//! ```

use std::f64::consts::LN_2;

/// Compute the bit-array length for `n` unique items at `max_false_positive_rate`.
///
/// Only the closed form is used. `n = 0` yields 0.
///
/// # Examples
///
/// ```
/// use lexbloom::bloom::sizing::estimate_bit_array_size;
///
/// assert_eq!(estimate_bit_array_size(0, 0.05), 0);
/// assert_eq!(estimate_bit_array_size(3, 0.05), 19);
/// ```
pub fn estimate_bit_array_size(n: usize, max_false_positive_rate: f64) -> usize {
    let m = -(n as f64) * max_false_positive_rate.ln() / (LN_2 * LN_2);
    // `as` saturates: NaN maps to 0, huge values to usize::MAX.
    m.ceil().max(0.0) as usize
}

/// Largest item count the iterative search is run for.
///
/// The search is linear in `m`, which grows by roughly six bits per item at a
/// 5% target rate.
pub const MAX_REFINE_ITEMS: usize = 1_000_000;

/// Search for the smallest `m` whose estimated false-positive rate with `k`
/// hash functions falls to `max_false_positive_rate` or below.
///
/// Starts from `m = 2` and steps by one, so it is linear in the result. This
/// is never used to size a filter; [`estimate_bit_array_size`] is.
pub fn refine_bit_array_size(n: usize, max_false_positive_rate: f64, k: usize) -> usize {
    let mut m = 1usize;
    let mut rate = 1.0;
    while rate > max_false_positive_rate {
        m += 1;
        rate = false_positive_rate(m, n, k);
    }
    m
}

/// Estimated false-positive rate of an `m`-bit filter with `k` hash functions
/// holding `n` items.
///
/// An empty filter never reports a false positive. A zero-length filter
/// holding items would report everything.
pub fn false_positive_rate(m: usize, n: usize, k: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    if m == 0 {
        return 1.0;
    }
    let exponent = (k as f64) * (n as f64);
    (1.0 - (1.0 - 1.0 / m as f64).powf(exponent)).powi(k as i32)
}
