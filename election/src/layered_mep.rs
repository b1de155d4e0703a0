//! The MEP strategy: flat-stock miner election, and the tier-descent
//! validator election with a bounded slash filter ahead of the base tier.

use strata_messages::{
    MinerElectionRequest, MinerElectionResponse, ValidatorElectionRequest,
    ValidatorElectionResponse,
};
use strata_state::ElectionState;
use strata_types::{Role, VipLevel};

use crate::assemble;
use crate::error::ElectionError;
use crate::layered::run_tier_descent;
use crate::pool::ElectionPool;
use crate::sample::pick_list_flat;
use crate::strategy::Electable;

#[derive(Debug)]
pub struct LayeredMep;

impl Electable for LayeredMep {
    fn miner_top_gen(
        &self,
        request: &MinerElectionRequest,
        _state: &mut dyn ElectionState,
    ) -> Result<MinerElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.miner_pool.len(),
            "MEP miner election"
        );
        let mut pool = ElectionPool::new_flat(
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
        let (chosen, _) = pick_list_flat(&values, need, &mut pool.rng);
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
            slash = request.slash_list.entries.len(),
            "MEP validator election"
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

        let slash_entries = request.slash_list.entries.clone();
        run_tier_descent(&mut pool, |pool, _remaining| {
            // Block-production offenders sit out the open base tier, but
            // never below the point of an empty election.
            pool.filter_slash_bounded(&slash_entries, 0);
        });

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
