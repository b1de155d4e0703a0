//! Deterministic PRNG adapter for elections.
//!
//! A 624-word, 32-bit Mersenne-Twister-family generator. Every consensus
//! participant seeds it from the same chain-derived integer and must draw
//! an identical sequence, so the exact update order below is part of the
//! consensus contract and must never be "fixed" or modernised:
//!
//! - the state twists on **every** extraction and the tempered word is
//!   always `mt[0]` (there is no read index);
//! - the seed word is stored raw, so arithmetic in the first initialisation
//!   steps wraps in 64 bits before masking to 32;
//! - `uniform` scales by `high - low` only — the low bound sets the span,
//!   not an offset. Every caller passes `low = 0`.
//!
//! Instances are cheap and single-owner: one per election call, never
//! shared across callers.

const STATE_WORDS: usize = 624;
const TWIST_OFFSET: usize = 397;
const MATRIX_A: i64 = 0x9908_B0DF;
const UPPER_MASK: i64 = 0x8000_0000;
const LOWER_MASK: i64 = 0x7FFF_FFFF;
const TWO_POW_32: f64 = 4_294_967_296.0;

#[inline]
fn low32(x: i64) -> i64 {
    x & 0xFFFF_FFFF
}

/// Seeded uniform generator. Not `Sync`; one instance per election.
pub struct MtUniform {
    mt: [i64; STATE_WORDS],
}

impl MtUniform {
    pub fn new(seed: i64) -> Self {
        let mut mt = [0i64; STATE_WORDS];
        mt[0] = seed;
        for i in 1..STATE_WORDS {
            let prev = mt[i - 1];
            mt[i] = low32(
                1_812_433_253i64
                    .wrapping_mul(prev ^ (prev >> 30))
                    .wrapping_add(i as i64),
            );
        }
        Self { mt }
    }

    fn twist(&mut self) {
        for i in 0..STATE_WORDS {
            let y = low32(
                (self.mt[i] & UPPER_MASK) + (self.mt[(i + 1) % STATE_WORDS] & LOWER_MASK),
            );
            self.mt[i] = y ^ (self.mt[(i + TWIST_OFFSET) % STATE_WORDS] >> 1);
            if y % 2 != 0 {
                self.mt[i] ^= MATRIX_A;
            }
        }
    }

    /// Draw one tempered 32-bit word.
    pub fn extract(&mut self) -> i64 {
        self.twist();
        let mut y = self.mt[0];
        y ^= y >> 11;
        y ^= (y << 7) & 2_636_928_640;
        y ^= (y << 15) & 4_022_730_752;
        y ^= y >> 18;
        low32(y)
    }

    /// A value in `[0, high - low)`. The low bound sets the span only.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let tmp = self.extract() as f64 / TWO_POW_32;
        (high - low) * tmp
    }

    /// A uniform index below `n` (`n` must be non-zero), as drawn by the
    /// dynamic-polling rotation: one full-span draw reduced modulo `n`.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        debug_assert!(n > 0);
        (self.uniform(0.0, u64::MAX as f64) as u64) % n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = MtUniform::new(12345);
        let mut b = MtUniform::new(12345);
        for _ in 0..1000 {
            assert_eq!(a.extract(), b.extract());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = MtUniform::new(1);
        let mut b = MtUniform::new(2);
        let seq_a: Vec<i64> = (0..16).map(|_| a.extract()).collect();
        let seq_b: Vec<i64> = (0..16).map(|_| b.extract()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn extract_fits_in_32_bits() {
        let mut rng = MtUniform::new(-987_654_321);
        for _ in 0..1000 {
            let v = rng.extract();
            assert!((0..=0xFFFF_FFFF).contains(&v));
        }
    }

    #[test]
    fn uniform_unit_interval() {
        let mut rng = MtUniform::new(42);
        for _ in 0..1000 {
            let v = rng.uniform(0.0, 1.0);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn negative_seed_is_deterministic() {
        let mut a = MtUniform::new(i64::MIN + 1);
        let mut b = MtUniform::new(i64::MIN + 1);
        for _ in 0..100 {
            assert_eq!(a.extract(), b.extract());
        }
    }

    #[test]
    fn next_u64_below_respects_bound() {
        let mut rng = MtUniform::new(7);
        for n in [1u64, 2, 3, 17, 1024] {
            for _ in 0..50 {
                assert!(rng.next_u64_below(n) < n);
            }
        }
    }
}
