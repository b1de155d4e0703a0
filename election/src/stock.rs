//! The legacy stock strategy.
//!
//! The oldest engine variant, kept for reproducibility against recorded
//! topologies: the tps ladder participates in the value function, a pool
//! no larger than the master quota short-circuits sampling entirely with
//! probability-proportional stock, and foundation validators are blended
//! into the master list with a value-ratio clamp.

use std::collections::HashMap;

use strata_messages::{
    CandidateInfo, MinerElectionRequest, MinerElectionResponse, ValidatorElectionRequest,
    ValidatorElectionResponse,
};
use strata_state::ElectionState;
use strata_types::address::contains_address;
use strata_types::params::{default_deposit, DEFAULT_ONLINE_TIME, DEFAULT_RATIO, MAX_SAMPLE};
use strata_types::NodeAddress;

use crate::assemble;
use crate::error::ElectionError;
use crate::rng::MtUniform;
use crate::sample::{normalize, sample_one, ElectedStake, Weighted};
use crate::strategy::Electable;
use crate::value::{election_value, ValueCoefficients};

#[derive(Debug)]
pub struct Stock;

/// Election values for a raw candidate list, defaults substituted.
fn calc_all_values(pool: &[CandidateInfo], coef: &ValueCoefficients) -> Vec<Weighted> {
    pool.iter()
        .map(|c| {
            let coins = c.deposit.unwrap_or_else(default_deposit).whole_coins();
            let online = c.online_time.unwrap_or(DEFAULT_ONLINE_TIME);
            Weighted::new(c.address, election_value(coins, online, DEFAULT_RATIO, coef))
        })
        .collect()
}

/// Drop black-listed candidates, and non-white-listed ones when the
/// switcher is on.
fn filter_candidates(pool: &[CandidateInfo], config: &strata_messages::ElectConfig) -> Vec<CandidateInfo> {
    pool.iter()
        .filter(|c| {
            if config.white_list_switcher && !contains_address(&config.white_list, &c.address) {
                return false;
            }
            !contains_address(&config.black_list, &c.address)
        })
        .cloned()
        .collect()
}

/// Rebuild `principal`/`backup` in the probability list's order.
fn reorder(
    probs: &[Weighted],
    principal: Vec<ElectedStake>,
    backup: Vec<ElectedStake>,
) -> (Vec<ElectedStake>, Vec<ElectedStake>) {
    let principal_map: HashMap<NodeAddress, u16> =
        principal.into_iter().map(|s| (s.address, s.stock)).collect();
    let backup_map: HashMap<NodeAddress, u16> =
        backup.into_iter().map(|s| (s.address, s.stock)).collect();

    let mut out_principal = Vec::with_capacity(principal_map.len());
    let mut out_backup = Vec::with_capacity(backup_map.len());
    for item in probs {
        if let Some(&stock) = principal_map.get(&item.address) {
            out_principal.push(ElectedStake::new(item.address, stock));
        } else if let Some(&stock) = backup_map.get(&item.address) {
            out_backup.push(ElectedStake::new(item.address, stock));
        }
    }
    (out_principal, out_backup)
}

/// Sample up to `m − j` distinct principals. A pool no larger than `m − j`
/// short-circuits: everyone is elected with stock `⌊100 × probability⌋`.
/// The non-sampled rest comes back with stock 0, to be tokenised later.
fn sample_principals(
    probs: &[Weighted],
    rng: &mut MtUniform,
    quota: usize,
) -> (Vec<ElectedStake>, Vec<ElectedStake>) {
    if probs.len() <= quota {
        let principal = probs
            .iter()
            .map(|item| ElectedStake::new(item.address, (100.0 * item.value) as u16))
            .collect();
        return (principal, Vec::new());
    }

    let mut counts: HashMap<NodeAddress, u16> = HashMap::new();
    for _ in 0..MAX_SAMPLE {
        // The legacy walk keeps the first-entry fallback draw.
        let (address, _) = sample_one(probs, rng.uniform(0.0, 1.0));
        *counts.entry(address).or_insert(0) += 1;
        if counts.len() == quota {
            break;
        }
    }

    let mut principal = Vec::new();
    let mut remaining = Vec::new();
    for item in probs {
        match counts.get(&item.address) {
            Some(&stock) => principal.push(ElectedStake::new(item.address, stock)),
            None => remaining.push(ElectedStake::new(item.address, 0)),
        }
    }
    (principal, remaining)
}

/// Every remaining node gets the token stock of 1.
fn tokenise(mut remaining: Vec<ElectedStake>) -> Vec<ElectedStake> {
    for stake in &mut remaining {
        stake.stock = 1;
    }
    remaining
}

/// The M+P validator selection: sample principals, tokenise the rest, then
/// backfill the principal and backup lists from the remainder in order.
fn select_validators(
    values: &[Weighted],
    rng: &mut MtUniform,
    m: usize,
    p: usize,
    j: usize,
) -> (Vec<ElectedStake>, Vec<ElectedStake>, Vec<ElectedStake>) {
    let probs = normalize(values);
    let quota = m.saturating_sub(j);
    let (mut principal, remaining) = sample_principals(&probs, rng, quota);
    let mut remaining = tokenise(remaining);

    while principal.len() < quota && !remaining.is_empty() {
        principal.push(remaining.remove(0));
    }
    let mut backup = Vec::new();
    while backup.len() < p && !remaining.is_empty() {
        backup.push(remaining.remove(0));
    }
    (principal, backup, remaining)
}

/// The miner selection: sample up to `n` distinct masters, move the head of
/// the non-sampled list up on shortfall, re-sort both lists by input order,
/// and tokenise the backups.
fn select_miners(
    values: &[Weighted],
    rng: &mut MtUniform,
    n: usize,
) -> (Vec<ElectedStake>, Vec<ElectedStake>) {
    let probs = normalize(values);
    if probs.len() <= n {
        let principal: Vec<ElectedStake> = probs
            .iter()
            .map(|item| ElectedStake::new(item.address, (100.0 * item.value) as u16))
            .collect();
        return reorder(&probs, principal, Vec::new());
    }

    let mut counts: HashMap<NodeAddress, u16> = HashMap::new();
    for _ in 0..MAX_SAMPLE {
        let (address, _) = sample_one(&probs, rng.uniform(0.0, 1.0));
        *counts.entry(address).or_insert(0) += 1;
        if counts.len() == n {
            break;
        }
    }

    let mut principal = Vec::new();
    let mut backup = Vec::new();
    for item in &probs {
        match counts.get(&item.address) {
            Some(&stock) => principal.push(ElectedStake::new(item.address, stock)),
            None => backup.push(ElectedStake::new(item.address, item.value as u16)),
        }
    }
    if n > principal.len() {
        let shortfall = n - principal.len();
        let moved: Vec<ElectedStake> = backup.drain(..shortfall.min(backup.len())).collect();
        principal.extend(moved);
    }
    let (principal, backup) = reorder(&probs, principal, backup);
    (principal, tokenise(backup))
}

/// Clamp into `[lower, upper]`.
fn clamp_ratio(value: f64, lower: f64, upper: f64) -> f64 {
    value.max(lower).min(upper)
}

/// Blend foundation validators into the elected principal list. Foundation
/// stock is proportional to each node's share of the foundation value,
/// scaled by the clamped foundation/principal value ratio and the
/// principal vote total.
fn combine_foundation(
    values: &[Weighted],
    foundation_values: &[Weighted],
    principal: Vec<ElectedStake>,
    j: usize,
) -> Vec<ElectedStake> {
    if (j == 0 || foundation_values.is_empty()) && principal.is_empty() {
        return Vec::new();
    }
    if j == 0 || foundation_values.is_empty() {
        return principal;
    }
    if principal.is_empty() {
        return normalize(foundation_values)
            .iter()
            .map(|item| ElectedStake::new(item.address, (item.value * 100.0) as u16))
            .collect();
    }

    let vote_sum: u64 = principal.iter().map(|s| s.stock as u64).sum();
    let value_map: HashMap<NodeAddress, f64> =
        values.iter().map(|w| (w.address, w.value)).collect();
    let principal_value_sum: f64 = principal
        .iter()
        .map(|s| value_map.get(&s.address).copied().unwrap_or(0.0))
        .sum();
    let foundation_sum: f64 = foundation_values.iter().map(|w| w.value).sum();

    let ratio = clamp_ratio(foundation_sum / principal_value_sum, 2.5, 4.0);

    let mut combined = principal;
    for item in foundation_values {
        let stock = (item.value / foundation_sum * ratio * vote_sum as f64) as u16;
        combined.push(ElectedStake::new(item.address, stock));
    }
    combined
}

impl Electable for Stock {
    fn miner_top_gen(
        &self,
        request: &MinerElectionRequest,
        _state: &mut dyn ElectionState,
    ) -> Result<MinerElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.miner_pool.len(),
            "stock miner election"
        );
        let pool = filter_candidates(&request.miner_pool, &request.config);
        let values = calc_all_values(&pool, &ValueCoefficients::default());
        if values.is_empty() {
            return Ok(assemble::make_miner_response(request.seq_num, &[], &[]));
        }
        let mut rng = MtUniform::new(request.rand_seed);
        let (master, backup) =
            select_miners(&values, &mut rng, request.config.miner_num as usize);
        Ok(assemble::make_miner_response(request.seq_num, &master, &backup))
    }

    fn validator_top_gen(
        &self,
        request: &ValidatorElectionRequest,
        _state: &mut dyn ElectionState,
    ) -> Result<ValidatorElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.validator_pool.len(),
            foundation = request.foundation_pool.len(),
            "stock validator election"
        );
        let pool = filter_candidates(&request.validator_pool, &request.config);
        let values = calc_all_values(&pool, &ValueCoefficients::default());
        if values.is_empty() {
            return Ok(assemble::make_validator_response(request.seq_num, &[], &[], &[]));
        }
        let m = request.config.validator_num as usize;
        let p = request.config.back_validator_num as usize;
        let mut rng = MtUniform::new(request.rand_seed);

        let (master, backup, candidate) = if request.foundation_pool.is_empty() {
            select_validators(&values, &mut rng, m, p, 0)
        } else {
            let j = request.foundation_pool.len();
            let foundation_values =
                calc_all_values(&request.foundation_pool, &ValueCoefficients::default());
            let (master, backup, candidate) = select_validators(&values, &mut rng, m, p, j);
            let master = combine_foundation(&values, &foundation_values, master, j);
            (master, backup, candidate)
        };

        Ok(assemble::make_validator_response(
            request.seq_num,
            &master,
            &backup,
            &candidate,
        ))
    }
}
