//! The dynamic-polling strategy.
//!
//! Miners rotate through a persisted cross-epoch turns buffer so a large
//! deposit pool is covered fairly across rounds; validators go through the
//! supernode carve-out plus exponential-weight sampling with slash
//! filtering.

use std::collections::HashSet;

use strata_messages::{
    CandidateInfo, DynamicPollingInfo, ElectConfig, MinerElectionRequest, MinerElectionResponse,
    SlashList, ValidatorElectionRequest, ValidatorElectionResponse,
};
use strata_state::ElectionState;
use strata_types::address::contains_address;
use strata_types::params::{
    ADD_MINERS_NUM, MINERS_FACTOR, MIN_MINERS_BASE, STOCK_EXP, SUPER_FACTOR,
};
use strata_types::{NodeAddress, Role};

use crate::assemble;
use crate::error::ElectionError;
use crate::pool::ElectionPool;
use crate::rng::MtUniform;
use crate::sample::{pick_list_slash_filtered, ElectedStake};
use crate::slash::SlashTracker;
use crate::strategy::Electable;

#[derive(Debug)]
pub struct LayeredDp;

/// Per-round miner quota: the base quota grows by two for every 64
/// deposit-holders beyond 1024.
pub fn calc_miner_num(pool_size: u64, base_miner_num: u16) -> u64 {
    if pool_size > MIN_MINERS_BASE {
        base_miner_num as u64 + (pool_size - MIN_MINERS_BASE) / MINERS_FACTOR * ADD_MINERS_NUM
    } else {
        base_miner_num as u64
    }
}

/// The per-call working set of the dynamic-polling miner election.
struct DpElection {
    deposit_nodes: Vec<CandidateInfo>,
    config: ElectConfig,
    rng: MtUniform,
    chosen_count: u64,
    slash: SlashTracker,
}

impl DpElection {
    fn new(request: &MinerElectionRequest, slash_list: SlashList) -> Self {
        Self {
            deposit_nodes: request.miner_pool.clone(),
            config: request.config.clone(),
            rng: MtUniform::new(request.rand_seed),
            chosen_count: 0,
            slash: SlashTracker::new(slash_list),
        }
    }

    /// Deposit-holders that pass the white/black/slash filters, restricted
    /// to `candidates` when given and never in `exclude`. Order follows the
    /// deposit list.
    fn usable_nodes(
        &self,
        candidates: Option<&[NodeAddress]>,
        exclude: Option<&[NodeAddress]>,
    ) -> Vec<NodeAddress> {
        let candidate_set: Option<HashSet<&NodeAddress>> =
            candidates.map(|c| c.iter().collect());
        let exclude_set: Option<HashSet<&NodeAddress>> = exclude.map(|e| e.iter().collect());

        self.deposit_nodes
            .iter()
            .filter(|node| {
                if let Some(set) = &candidate_set {
                    if !set.contains(&node.address) {
                        return false;
                    }
                }
                if let Some(set) = &exclude_set {
                    if set.contains(&node.address) {
                        return false;
                    }
                }
                if self.config.white_list_switcher
                    && !contains_address(&self.config.white_list, &node.address)
                {
                    return false;
                }
                if contains_address(&self.config.black_list, &node.address) {
                    return false;
                }
                !self.slash.is_active(&node.address)
            })
            .map(|node| node.address)
            .collect()
    }

    /// Reset the polling info for a fresh round over the full deposit pool.
    fn new_round(&self, info: &mut DynamicPollingInfo, height: u64) {
        info.miner_num = calc_miner_num(self.deposit_nodes.len() as u64, self.config.miner_num);
        info.candidate_list = self.deposit_nodes.iter().map(|n| n.address).collect();
        info.seq += 1;
        info.number = height;
        tracing::debug!(
            seq = info.seq,
            miner_num = info.miner_num,
            pool = info.candidate_list.len(),
            "dynamic polling: new round"
        );
    }

    /// Elect up to `choose_num` from the usable list: everyone when the
    /// pool is small enough, uniform draws with removal otherwise.
    fn elect_miners(&mut self, usable: &[NodeAddress], choose_num: u64) -> Vec<NodeAddress> {
        if usable.len() as u64 <= choose_num {
            return usable.to_vec();
        }
        let mut remaining = usable.to_vec();
        let mut chosen = Vec::with_capacity(choose_num as usize);
        for _ in 0..choose_num {
            if remaining.is_empty() {
                break;
            }
            let index = self.rng.next_u64_below(remaining.len() as u64) as usize;
            chosen.push(remaining.remove(index));
        }
        chosen
    }

    /// One election pass: draw from `usable`, strike the winners from the
    /// round's candidate list, and advance the chosen count.
    fn enter_elect(
        &mut self,
        usable: &[NodeAddress],
        info: &mut DynamicPollingInfo,
        choose_num: u64,
    ) -> Vec<NodeAddress> {
        let chosen = self.elect_miners(usable, choose_num);
        info.candidate_list
            .retain(|addr| !contains_address(&chosen, addr));
        self.chosen_count += chosen.len() as u64;
        chosen
    }
}

impl Electable for LayeredDp {
    fn miner_top_gen(
        &self,
        request: &MinerElectionRequest,
        state: &mut dyn ElectionState,
    ) -> Result<MinerElectionResponse, ElectionError> {
        let mut info = state.polling_info()?;
        let slash_list = state.slash_list()?;
        let mut dp = DpElection::new(request, slash_list);

        tracing::debug!(
            seq = info.seq,
            miner_num = info.miner_num,
            candidates = info.candidate_list.len(),
            pool = dp.deposit_nodes.len(),
            "dynamic polling miner election"
        );

        if info.miner_num == 0 || info.candidate_list.is_empty() {
            dp.new_round(&mut info, request.seq_num);
        }

        let usable = dp.usable_nodes(Some(&info.candidate_list), None);
        let mut chosen = Vec::new();
        if !usable.is_empty() {
            let quota = info.miner_num;
            chosen = dp.enter_elect(&usable, &mut info, quota);
        }

        if dp.chosen_count != info.miner_num {
            // Round exhausted short of the quota: open the next round and
            // fill the shortfall from the fresh pool, minus this call's
            // winners.
            let usable = dp.usable_nodes(None, Some(&chosen));
            if dp.chosen_count < info.miner_num && !usable.is_empty() {
                let previous_quota = info.miner_num;
                dp.new_round(&mut info, request.seq_num);
                let shortfall = previous_quota - dp.chosen_count;
                let refill = dp.enter_elect(&usable, &mut info, shortfall);
                chosen.extend(refill);
            }
        }

        tracing::debug!(
            chosen = chosen.len(),
            remaining = info.candidate_list.len(),
            "dynamic polling: round result"
        );

        state.set_polling_info(info)?;
        dp.slash.decrement_all();
        state.set_slash_list(dp.slash.to_list())?;

        let stakes: Vec<ElectedStake> = chosen
            .into_iter()
            .map(|addr| ElectedStake::new(addr, 1))
            .collect();
        Ok(assemble::make_miner_response(request.seq_num, &stakes, &[]))
    }

    fn validator_top_gen(
        &self,
        request: &ValidatorElectionRequest,
        state: &mut dyn ElectionState,
    ) -> Result<ValidatorElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.validator_pool.len(),
            "supernode-blended validator election"
        );
        let mut pool = ElectionPool::new(
            request.vip_tiers.clone(),
            &request.validator_pool,
            request.config.clone(),
            request.rand_seed,
            request.seq_num,
            Role::Validator,
        );
        pool.set_slash_list(request.slash_list.clone());
        if pool.config.white_list_switcher {
            pool.apply_whitelist();
        }
        pool.apply_blacklist();

        let (super_stakes, super_nodes) = pool.carve_out_supernodes(SUPER_FACTOR);
        pool.set_chosen(super_stakes);

        let random_nodes = pool.usable_nodes();
        let random_values = pool.exp_weights_of(&random_nodes, STOCK_EXP);
        let super_values = pool.exp_weights_of(&super_nodes, STOCK_EXP);

        let need = pool.need_count.saturating_sub(pool.chosen_count);
        let (chosen, super_stock) = pick_list_slash_filtered(
            &random_values,
            &super_values,
            need,
            &mut pool.rng,
            &mut pool.slash,
        );
        pool.set_chosen(chosen);
        pool.adjust_supernode_stocks(&super_stock, STOCK_EXP);
        pool.filter_slash_list();

        let flattened = assemble::flatten_groups_flat(&pool);
        let (master, backup) = assemble::fill_roles(
            flattened,
            pool.config.validator_num as usize,
            pool.config.back_validator_num as usize,
        );
        let candidate = assemble::candidate_from_leftover(&pool);

        state.set_slash_list(pool.slash.to_list())?;

        Ok(assemble::make_validator_response(
            pool.seq_num,
            &master,
            &backup,
            &candidate,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_messages::SlashEntry;
    use strata_state::MemoryState;
    use strata_types::Deposit;

    fn addr(v: u64) -> NodeAddress {
        NodeAddress::from_low_u64(v)
    }

    fn candidates(n: u64) -> Vec<CandidateInfo> {
        (0..n)
            .map(|i| {
                CandidateInfo::new(addr(i + 1), addr(i + 1), Deposit::from_coins(10_000), 0, 300)
            })
            .collect()
    }

    fn miner_request(pool: u64, seed: i64) -> MinerElectionRequest {
        MinerElectionRequest {
            seq_num: 100,
            rand_seed: seed,
            miner_pool: candidates(pool),
            config: ElectConfig {
                miner_num: 32,
                strategy: "layered_dp".into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn quota_formula_matches_pool_thresholds() {
        assert_eq!(calc_miner_num(1, 32), 32);
        assert_eq!(calc_miner_num(1024, 32), 32);
        assert_eq!(calc_miner_num(1025, 32), 32);
        assert_eq!(calc_miner_num(1087, 32), 32);
        assert_eq!(calc_miner_num(1088, 32), 34);
        assert_eq!(calc_miner_num(1089, 32), 34);
        assert_eq!(calc_miner_num(1152, 32), 36);
    }

    #[test]
    fn small_pool_elects_everyone_in_order() {
        let request = miner_request(5, 1);
        let mut state = MemoryState::new();
        let rsp = LayeredDp.miner_top_gen(&request, &mut state).unwrap();
        let elected: Vec<NodeAddress> = rsp.master.iter().map(|n| n.account).collect();
        assert_eq!(elected, (1..=5).map(addr).collect::<Vec<_>>());

        let info = state.polling_info().unwrap();
        assert_eq!(info.seq, 1);
        assert_eq!(info.miner_num, 32);
        assert!(info.candidate_list.is_empty());
    }

    #[test]
    fn round_rotates_through_large_pool_without_repeats() {
        // 80 deposit-holders, quota 32: rounds go 32/32/16+16, and nobody
        // repeats within a round.
        let mut state = MemoryState::new();
        let mut seen_this_round: HashSet<NodeAddress> = HashSet::new();
        let mut all_elected: HashSet<NodeAddress> = HashSet::new();
        let mut round_seq = 0u64;

        for call in 0..3 {
            let request = miner_request(80, 9000 + call);
            let rsp = LayeredDp.miner_top_gen(&request, &mut state).unwrap();
            let info = state.polling_info().unwrap();
            if info.seq != round_seq {
                round_seq = info.seq;
                seen_this_round.clear();
            }
            for node in &rsp.master {
                assert!(
                    seen_this_round.insert(node.account),
                    "{} elected twice in round {}",
                    node.account,
                    round_seq
                );
                all_elected.insert(node.account);
            }
        }
        // After 80 elected slots over a 80-node pool, everyone served once.
        assert_eq!(all_elected.len(), 80);
    }

    #[test]
    fn slash_counters_decrement_each_round() {
        let mut state = MemoryState::new();
        state
            .set_slash_list(SlashList {
                entries: vec![SlashEntry { address: addr(1), prohibit_cycles: 2 }],
            })
            .unwrap();

        let request = miner_request(10, 77);
        let rsp = LayeredDp.miner_top_gen(&request, &mut state).unwrap();
        // Active slash entry is excluded from the round.
        assert!(rsp.master.iter().all(|n| n.account != addr(1)));
        assert_eq!(state.slash_list().unwrap().entries[0].prohibit_cycles, 1);

        let rsp = LayeredDp.miner_top_gen(&request, &mut state).unwrap();
        assert!(rsp.master.iter().all(|n| n.account != addr(1)));
        assert_eq!(state.slash_list().unwrap().entries[0].prohibit_cycles, 0);

        // Counter at zero: eligible again on the next round.
        let rsp = LayeredDp.miner_top_gen(&request, &mut state).unwrap();
        let _ = rsp;
        let info = state.polling_info().unwrap();
        assert!(info.seq >= 3);
    }

    #[test]
    fn validator_supernode_always_elected() {
        let mut pool = candidates(20);
        pool[0].deposit = Some(Deposit::from_coins(50_000_000));
        let request = ValidatorElectionRequest {
            seq_num: 7,
            rand_seed: 31415,
            validator_pool: pool,
            foundation_pool: Vec::new(),
            config: ElectConfig {
                validator_num: 11,
                back_validator_num: 5,
                strategy: "layered_dp".into(),
                ..Default::default()
            },
            vip_tiers: vec![
                strata_messages::VipConfig {
                    min_deposit: 0,
                    interest_rate: 0,
                    elect_user_num: 0,
                    stock_scale: 1000,
                },
            ],
            slash_list: SlashList::default(),
        };
        let rsp = LayeredDp
            .validator_top_gen(&request, &mut MemoryState::new())
            .unwrap();
        assert_eq!(rsp.master[0].account, addr(1));
        assert!(rsp.master[0].stock >= 1);
        assert_eq!(rsp.master.len(), 11);
        assert_eq!(rsp.backup.len(), 5);
    }

    #[test]
    fn validator_election_deterministic() {
        let request = ValidatorElectionRequest {
            seq_num: 8,
            rand_seed: 2718,
            validator_pool: candidates(40),
            foundation_pool: Vec::new(),
            config: ElectConfig {
                validator_num: 11,
                back_validator_num: 5,
                strategy: "layered_dp".into(),
                ..Default::default()
            },
            vip_tiers: Vec::new(),
            slash_list: SlashList::default(),
        };
        let a = LayeredDp
            .validator_top_gen(&request, &mut MemoryState::new())
            .unwrap();
        let b = LayeredDp
            .validator_top_gen(&request, &mut MemoryState::new())
            .unwrap();
        assert_eq!(a, b);
    }
}
