//! The no-choice strategy: zero randomness.
//!
//! Usable candidates are ranked by deposit (online time breaking ties) and
//! fill the role lists straight down. Used on networks that want a fully
//! predictable topology, and as the degenerate baseline in tests.

use strata_messages::{
    MinerElectionRequest, MinerElectionResponse, ValidatorElectionRequest,
    ValidatorElectionResponse,
};
use strata_state::ElectionState;
use strata_types::params::DEFAULT_STOCK;
use strata_types::Role;

use crate::assemble;
use crate::error::ElectionError;
use crate::pool::ElectionPool;
use crate::sample::ElectedStake;
use crate::strategy::Electable;

#[derive(Debug)]
pub struct NoChoice;

impl Electable for NoChoice {
    fn miner_top_gen(
        &self,
        request: &MinerElectionRequest,
        _state: &mut dyn ElectionState,
    ) -> Result<MinerElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.miner_pool.len(),
            "no-choice miner election"
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

        let master: Vec<ElectedStake> = pool
            .usable_by_deposit()
            .into_iter()
            .take(pool.need_count)
            .map(|n| ElectedStake::new(n.address, DEFAULT_STOCK))
            .collect();
        Ok(assemble::make_miner_response(pool.seq_num, &master, &[]))
    }

    fn validator_top_gen(
        &self,
        request: &ValidatorElectionRequest,
        _state: &mut dyn ElectionState,
    ) -> Result<ValidatorElectionResponse, ElectionError> {
        tracing::debug!(
            seq = request.seq_num,
            pool = request.validator_pool.len(),
            "no-choice validator election"
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

        let chosen: Vec<ElectedStake> = pool
            .usable_by_deposit()
            .into_iter()
            .take(pool.need_count)
            .map(|n| ElectedStake::new(n.address, DEFAULT_STOCK))
            .collect();
        pool.set_chosen(chosen.clone());

        let (master, backup) = assemble::fill_roles(
            chosen,
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

#[cfg(test)]
mod tests {
    use super::*;
    use strata_messages::{CandidateInfo, ElectConfig};
    use strata_state::MemoryState;
    use strata_types::{Deposit, NodeAddress};

    fn addr(v: u64) -> NodeAddress {
        NodeAddress::from_low_u64(v)
    }

    #[test]
    fn masters_are_the_largest_deposits() {
        let pool: Vec<CandidateInfo> = (1..=6)
            .map(|i| {
                CandidateInfo::new(
                    addr(i),
                    addr(i),
                    Deposit::from_coins(10_000 * i),
                    0,
                    300,
                )
            })
            .collect();
        let request = ValidatorElectionRequest {
            seq_num: 1,
            rand_seed: 0,
            validator_pool: pool,
            foundation_pool: Vec::new(),
            config: ElectConfig {
                validator_num: 2,
                back_validator_num: 2,
                strategy: "nochoice".into(),
                ..Default::default()
            },
            vip_tiers: Vec::new(),
            slash_list: Default::default(),
        };
        let rsp = NoChoice
            .validator_top_gen(&request, &mut MemoryState::new())
            .unwrap();
        let masters: Vec<NodeAddress> = rsp.master.iter().map(|n| n.account).collect();
        let backups: Vec<NodeAddress> = rsp.backup.iter().map(|n| n.account).collect();
        assert_eq!(masters, vec![addr(6), addr(5)]);
        assert_eq!(backups, vec![addr(4), addr(3)]);
        assert_eq!(rsp.candidate.len(), 2);
    }

    #[test]
    fn seed_has_no_effect() {
        let pool: Vec<CandidateInfo> = (1..=10)
            .map(|i| CandidateInfo::new(addr(i), addr(i), Deposit::from_coins(10_000), 0, 300))
            .collect();
        let mut request = MinerElectionRequest {
            seq_num: 1,
            rand_seed: 1,
            miner_pool: pool,
            config: ElectConfig {
                miner_num: 4,
                strategy: "nochoice".into(),
                ..Default::default()
            },
        };
        let a = NoChoice.miner_top_gen(&request, &mut MemoryState::new()).unwrap();
        request.rand_seed = 999;
        let b = NoChoice.miner_top_gen(&request, &mut MemoryState::new()).unwrap();
        assert_eq!(a, b);
    }
}
