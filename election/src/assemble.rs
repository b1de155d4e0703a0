//! Topology assembler.
//!
//! Maps elected stakes back into the ranked Master/Backup/Candidate lists
//! with role-tagged positions. Pure construction; the output is immutable
//! once built.

use strata_messages::{ElectedNode, MinerElectionResponse, ValidatorElectionResponse};
use strata_types::params::DEFAULT_STOCK;
use strata_types::{ElectRole, Position, VipLevel};

use crate::pool::ElectionPool;
use crate::sample::ElectedStake;

/// Tag a stake list with a role and zero-based positions.
pub fn to_elected_nodes(stakes: &[ElectedStake], role: ElectRole) -> Vec<ElectedNode> {
    stakes
        .iter()
        .enumerate()
        .map(|(i, stake)| ElectedNode {
            account: stake.address,
            position: Position::at(role, i as u16),
            stock: stake.stock,
            vip_level: stake.vip_level,
            role,
        })
        .collect()
}

/// Build a miner election response from the master (and optional backup)
/// stakes.
pub fn make_miner_response(
    seq_num: u64,
    master: &[ElectedStake],
    backup: &[ElectedStake],
) -> MinerElectionResponse {
    MinerElectionResponse {
        seq_num,
        master: to_elected_nodes(master, ElectRole::Miner),
        backup: to_elected_nodes(backup, ElectRole::Miner),
    }
}

/// Build a validator election response from the three role lists.
pub fn make_validator_response(
    seq_num: u64,
    master: &[ElectedStake],
    backup: &[ElectedStake],
    candidate: &[ElectedStake],
) -> ValidatorElectionResponse {
    ValidatorElectionResponse {
        seq_num,
        master: to_elected_nodes(master, ElectRole::Validator),
        backup: to_elected_nodes(backup, ElectRole::BackupValidator),
        candidate: to_elected_nodes(candidate, ElectRole::CandidateValidator),
    }
}

/// Flatten the pool's chosen groups with VIP stock recomputation: the last
/// (base-tier) group keeps its sampled stocks and the Nil tag; earlier
/// groups get their stock recomputed against the base group and their tier
/// tag derived from the group's place in the descent.
pub fn flatten_groups_vip(pool: &ElectionPool) -> Vec<ElectedStake> {
    let group_count = pool.chosen_groups.len();
    let tier_count = pool.vip_tiers.len();
    let mut out = Vec::with_capacity(pool.chosen_count);
    for (k, group) in pool.chosen_groups.iter().enumerate() {
        for stake in group {
            if k == group_count - 1 {
                let mut s = stake.clone();
                s.vip_level = VipLevel::NIL;
                out.push(s);
            } else {
                let mut s = stake.clone();
                s.stock = pool.vip_stock(&stake.address);
                s.vip_level = VipLevel::from_tier(tier_count.saturating_sub(1 + k));
                out.push(s);
            }
        }
    }
    out
}

/// Flatten the pool's chosen groups as-is, everything tagged Nil (the
/// supernode-blended path recomputes stocks before this point).
pub fn flatten_groups_flat(pool: &ElectionPool) -> Vec<ElectedStake> {
    let mut out = Vec::with_capacity(pool.chosen_count);
    for group in &pool.chosen_groups {
        for stake in group {
            let mut s = stake.clone();
            s.vip_level = VipLevel::NIL;
            out.push(s);
        }
    }
    out
}

/// Split a flattened stake list into master and backup per the config
/// quotas. Overflow beyond the two quotas is dropped (it never happens in
/// practice: the pool stops choosing at `need_count`).
pub fn fill_roles(
    flattened: Vec<ElectedStake>,
    validator_num: usize,
    back_validator_num: usize,
) -> (Vec<ElectedStake>, Vec<ElectedStake>) {
    let mut master = Vec::with_capacity(validator_num);
    let mut backup = Vec::with_capacity(back_validator_num);
    for stake in flattened {
        if master.len() < validator_num {
            master.push(stake);
        } else if backup.len() < back_validator_num {
            backup.push(stake);
        }
    }
    (master, backup)
}

/// The candidate (reserve) list: leftover usable nodes with token stock,
/// capped at `4×validator_num − back_validator_num`.
pub fn candidate_from_leftover(pool: &ElectionPool) -> Vec<ElectedStake> {
    let cap = (4 * pool.config.validator_num as usize)
        .saturating_sub(pool.config.back_validator_num as usize);
    pool.usable_nodes()
        .into_iter()
        .take(cap)
        .map(|n| ElectedStake::new(n.address, DEFAULT_STOCK))
        .collect()
}
