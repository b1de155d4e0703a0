//! Election protocol parameters.
//!
//! Network-wide constants for the election engine. Target counts are
//! defaults; the live values arrive in each election request's config.

use crate::amount::Deposit;

/// Default master validator count (M).
pub const DEFAULT_VALIDATOR_NUM: u16 = 11;
/// Default backup validator count (P).
pub const DEFAULT_BACKUP_VALIDATOR_NUM: u16 = 5;
/// Default master miner count (N).
pub const DEFAULT_MINER_NUM: u16 = 21;

/// Sampling-attempt budget for the without-replacement samplers. Far above
/// any realistic need count, so the budget only matters for pathological
/// probability distributions.
pub const MAX_SAMPLE: usize = 1000;
/// Sampling-attempt budget for the blended supernode/random sampler.
pub const POWER_WEIGHT_MAX_SAMPLE: usize = 1000;

/// Stock value for flat-weight elections and remainder backfill.
pub const DEFAULT_STOCK: u16 = 1;
/// Per-thousand stock scale for the catch-all tier.
pub const DEFAULT_RATIO: u16 = 1000;
/// Upper clamp for any stock value.
pub const STOCK_CAP: u16 = 0xFFFF;

/// A deposit whose `superFactor`-multiple reaches the pool total marks a
/// foundation/super node.
pub const SUPER_FACTOR: u128 = 19;
/// Exponent of the exponential stake-weight curve.
pub const STOCK_EXP: f64 = 1.45;

/// Dynamic polling: pool size above which the per-round miner quota grows.
pub const MIN_MINERS_BASE: u64 = 1024;
/// Dynamic polling: pool-size step per quota increment.
pub const MINERS_FACTOR: u64 = 64;
/// Dynamic polling: quota increment per step.
pub const ADD_MINERS_NUM: u64 = 2;

/// Substituted when a candidate arrives without a deposit amount.
pub fn default_deposit() -> Deposit {
    Deposit::from_coins(50_000)
}
/// Substituted when a candidate arrives without an online-time counter.
pub const DEFAULT_ONLINE_TIME: u64 = 300;
/// Substituted when a candidate arrives without a withdraw height.
pub const DEFAULT_WITHDRAW_HEIGHT: u64 = 0;
