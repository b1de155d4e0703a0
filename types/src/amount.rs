//! Deposit amount type.
//!
//! Deposits are stored in raw units (u128) to avoid floating-point error;
//! one whole coin is 10^18 raw units. The election value ladders operate on
//! whole-coin magnitudes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Raw units per whole coin.
pub const COIN: u128 = 1_000_000_000_000_000_000;

/// A stake deposit, in raw units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Deposit(u128);

impl Deposit {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Construct from a whole-coin count.
    pub fn from_coins(coins: u64) -> Self {
        Self(coins as u128 * COIN)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    /// The deposit in whole coins, truncating sub-coin dust.
    pub fn whole_coins(&self) -> u64 {
        (self.0 / COIN) as u64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl Add for Deposit {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for Deposit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} raw", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_conversion() {
        let d = Deposit::from_coins(40_000);
        assert_eq!(d.whole_coins(), 40_000);
        assert_eq!(d.raw(), 40_000 * COIN);
    }

    #[test]
    fn whole_coins_truncates_dust() {
        let d = Deposit::new(COIN + COIN / 2);
        assert_eq!(d.whole_coins(), 1);
    }

    #[test]
    fn saturating_add_caps() {
        let d = Deposit::new(u128::MAX);
        assert_eq!(d.saturating_add(Deposit::new(1)).raw(), u128::MAX);
    }
}
