//! The layered strategy: VIP tier descent for validators, flat weighted
//! sampling for miners.

use strata_messages::{
    MinerElectionRequest, MinerElectionResponse, ValidatorElectionRequest,
    ValidatorElectionResponse,
};
use strata_state::ElectionState;
use strata_types::{Role, VipLevel};

use crate::assemble;
use crate::error::ElectionError;
use crate::pool::ElectionPool;
use crate::sample::{pick_list, pick_list_vip, ElectedStake};
use crate::strategy::Electable;

#[derive(Debug)]
pub struct Layered;

impl Electable for Layered {
    fn miner_top_gen(
        &self,
        request: &MinerElectionRequest,
        _state: &mut dyn ElectionState,
    ) -> Result<MinerElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.miner_pool.len(),
            "layered miner election"
        );
        let mut pool = ElectionPool::new(
            Vec::new(),
            &request.miner_pool,
            request.config.clone(),
            request.rand_seed,
            request.seq_num,
            Role::Miner,
        );
        if pool.config.white_list_switcher {
            pool.apply_whitelist();
        }
        pool.apply_blacklist();

        let nodes = pool.nodes_at_level(VipLevel::NIL);
        let values = pool.weights_of(&nodes);
        let need = pool.need_count;
        let (chosen, _) = pick_list(&values, need, &mut pool.rng);
        Ok(assemble::make_miner_response(pool.seq_num, &chosen, &[]))
    }

    fn validator_top_gen(
        &self,
        request: &ValidatorElectionRequest,
        _state: &mut dyn ElectionState,
    ) -> Result<ValidatorElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.validator_pool.len(),
            "layered validator election"
        );
        let mut pool = ElectionPool::new(
            request.vip_tiers.clone(),
            &request.validator_pool,
            request.config.clone(),
            request.rand_seed,
            request.seq_num,
            Role::Validator,
        );
        if pool.config.white_list_switcher {
            pool.apply_whitelist();
        }
        pool.apply_blacklist();

        run_tier_descent(&mut pool, |_, _| {});

        let flattened = assemble::flatten_groups_vip(&pool);
        let (master, backup) = assemble::fill_roles(
            flattened,
            pool.config.validator_num as usize,
            pool.config.back_validator_num as usize,
        );
        let candidate = assemble::candidate_from_leftover(&pool);
        Ok(assemble::make_validator_response(
            pool.seq_num,
            &master,
            &backup,
            &candidate,
        ))
    }
}

/// The shared tier-descent loop: walk tiers from highest to lowest, filling
/// each configured quota via weighted sampling, then take the remaining
/// need from the base tier. `before_base` runs just before the base tier is
/// sampled (the MEP variant hooks its slash filter in there).
pub fn run_tier_descent<F>(pool: &mut ElectionPool, mut before_base: F)
where
    F: FnMut(&mut ElectionPool, usize),
{
    for tier_index in (0..pool.vip_tiers.len()).rev() {
        if pool.vip_tiers[tier_index].elect_user_num == 0 && tier_index != 0 {
            continue;
        }
        if tier_index == 0 {
            let remaining = pool.need_count.saturating_sub(pool.chosen_count);
            before_base(pool, remaining);
        }

        let nodes = pool.nodes_at_level(VipLevel::from_tier(tier_index));
        let values = pool.weights_of(&nodes);

        let remaining = pool.need_count.saturating_sub(pool.chosen_count);
        let cur_need = if tier_index == 0 {
            remaining
        } else {
            (pool.vip_tiers[tier_index].elect_user_num as usize).min(remaining)
        };

        let chosen: Vec<ElectedStake> = if tier_index == 0 {
            pick_list(&values, cur_need, &mut pool.rng).0
        } else {
            pick_list_vip(&values, cur_need, &mut pool.rng).0
        };
        tracing::trace!(tier = tier_index, chosen = chosen.len(), "tier descent step");
        pool.set_chosen(chosen);
    }
}
