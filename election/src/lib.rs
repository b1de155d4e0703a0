//! Consensus-node election engine.
//!
//! At each re-election epoch, the engine selects master/backup/candidate
//! validator and miner nodes from a pool of deposit-backed candidates,
//! assigns each a voting stock, and produces a deterministic topology:
//! identical inputs (candidate list, config, seed) yield byte-identical
//! outputs on every node.
//!
//! ## Module overview
//!
//! - [`rng`] — seeded PRNG adapter shared by all sampling paths.
//! - [`value`] — tiered step functions turning raw candidate attributes
//!   into election values.
//! - [`sample`] — normalization and without-replacement weighted sampling.
//! - [`pool`] — the per-election eligibility pool: tiers, filters,
//!   supernodes, stock bookkeeping.
//! - [`strategy`] — the `Electable` contract and the strategy registry.
//! - [`layered`], [`layered_mep`], [`layered_dp`], [`nochoice`], [`stock`]
//!   — the algorithm variants.
//! - [`assemble`] — role lists, positions, response building.
//! - [`patch`] — online topology patching between elections.
//! - [`dispatcher`] — the single-consumer request/response actor.
//! - [`slash`] — slash blacklist bookkeeping.
//! - [`logging`] — tracing subscriber bootstrap.
//! - [`error`] — engine error types.

pub mod assemble;
pub mod dispatcher;
pub mod error;
pub mod layered;
pub mod layered_dp;
pub mod layered_mep;
pub mod logging;
pub mod nochoice;
pub mod patch;
pub mod pool;
pub mod rng;
pub mod sample;
pub mod slash;
pub mod stock;
pub mod strategy;
pub mod value;

pub use dispatcher::ElectionDispatcher;
pub use error::ElectionError;
pub use layered::Layered;
pub use layered_dp::{calc_miner_num, LayeredDp};
pub use layered_mep::LayeredMep;
pub use nochoice::NoChoice;
pub use patch::{QueueKind, RoleQueues};
pub use pool::{ElectionPool, PoolNode};
pub use rng::MtUniform;
pub use sample::{ElectedStake, Weighted};
pub use slash::SlashTracker;
pub use stock::Stock;
pub use strategy::{Electable, StrategyRegistry};
