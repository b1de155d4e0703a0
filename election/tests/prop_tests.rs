use proptest::prelude::*;

use strata_election::strategy::{Electable, StrategyRegistry};
use strata_election::{sample, MtUniform, Weighted};
use strata_messages::{CandidateInfo, ElectConfig, SlashList, ValidatorElectionRequest, VipConfig};
use strata_state::MemoryState;
use strata_types::{Deposit, NodeAddress};

fn addr(v: u64) -> NodeAddress {
    NodeAddress::from_low_u64(v)
}

fn weighted(values: &[f64]) -> Vec<Weighted> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| Weighted::new(addr(i as u64 + 1), v))
        .collect()
}

fn request(pool: u64, seed: i64, validator_num: u16, back_num: u16) -> ValidatorElectionRequest {
    ValidatorElectionRequest {
        seq_num: 1,
        rand_seed: seed,
        validator_pool: (0..pool)
            .map(|i| {
                CandidateInfo::new(addr(i + 1), addr(i + 1), Deposit::from_coins(10_000), 0, 300)
            })
            .collect(),
        foundation_pool: Vec::new(),
        config: ElectConfig {
            validator_num,
            back_validator_num: back_num,
            strategy: "layered".into(),
            ..Default::default()
        },
        vip_tiers: vec![VipConfig {
            min_deposit: 0,
            interest_rate: 0,
            elect_user_num: 0,
            stock_scale: 1000,
        }],
        slash_list: SlashList::default(),
    }
}

proptest! {
    /// Normalized probabilities sum to 1 for any non-empty positive list.
    #[test]
    fn normalize_sums_to_one(values in prop::collection::vec(0.01f64..1000.0, 1..100)) {
        let probs = sample::normalize(&weighted(&values));
        let total: f64 = probs.iter().map(|w| w.value).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
    }

    /// Normalization preserves relative proportions.
    #[test]
    fn normalize_preserves_proportions(values in prop::collection::vec(0.01f64..1000.0, 2..50)) {
        let probs = sample::normalize(&weighted(&values));
        let ratio_in = values[0] / values[1];
        let ratio_out = probs[0].value / probs[1].value;
        prop_assert!((ratio_in - ratio_out).abs() < 1e-6 * ratio_in.abs());
    }

    /// The without-replacement pick never exceeds the need and never
    /// duplicates an id.
    #[test]
    fn pick_list_bounds(
        values in prop::collection::vec(0.01f64..100.0, 1..60),
        need in 0usize..70,
        seed in any::<i64>(),
    ) {
        let mut rng = MtUniform::new(seed);
        let (chosen, remaining) = sample::pick_list(&weighted(&values), need, &mut rng);
        prop_assert_eq!(chosen.len(), need.min(values.len()));
        prop_assert_eq!(chosen.len() + remaining.len(), values.len());
        let mut seen = std::collections::HashSet::new();
        for stake in &chosen {
            prop_assert!(seen.insert(stake.address));
        }
    }

    /// Two layered elections with identical inputs agree byte for byte;
    /// quotas hold for arbitrary pool sizes and seeds.
    #[test]
    fn layered_election_deterministic_and_bounded(
        pool in 1u64..80,
        seed in any::<i64>(),
    ) {
        let registry = StrategyRegistry::with_defaults();
        let strategy = registry.create("layered").unwrap();
        let req = request(pool, seed, 11, 5);
        let a = strategy.validator_top_gen(&req, &mut MemoryState::new()).unwrap();
        let b = strategy.validator_top_gen(&req, &mut MemoryState::new()).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(a.master.len() <= 11);
        prop_assert!(a.backup.len() <= 5);
        prop_assert_eq!(
            a.master.len() + a.backup.len(),
            (pool as usize).min(16)
        );
    }

    /// The PRNG adapter is reproducible for any seed.
    #[test]
    fn rng_reproducible(seed in any::<i64>()) {
        let mut a = MtUniform::new(seed);
        let mut b = MtUniform::new(seed);
        for _ in 0..64 {
            prop_assert_eq!(a.extract(), b.extract());
        }
    }
}
