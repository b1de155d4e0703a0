//! Tiered eligibility engine.
//!
//! `ElectionPool` holds the per-election node list and all the bookkeeping
//! the strategies share: VIP tier assignment, white/black/slash filtering,
//! the foundation-node carve-out, chosen-group accumulation, and the VIP
//! stock recomputation. One pool per election call; nodes are never
//! mutated concurrently.

use std::collections::HashMap;

use strata_messages::{CandidateInfo, ElectConfig, SlashEntry, SlashList, VipConfig};
use strata_types::address::contains_address;
use strata_types::params::{
    default_deposit, DEFAULT_ONLINE_TIME, DEFAULT_RATIO, DEFAULT_WITHDRAW_HEIGHT, STOCK_CAP,
};
use strata_types::{Deposit, NodeAddress, Role, VipLevel};

use crate::rng::MtUniform;
use crate::sample::{ElectedStake, Weighted};
use crate::slash::SlashTracker;
use crate::value::{election_value, exponential_value, ValueCoefficients};

/// One candidate inside an election, with derived election fields.
#[derive(Clone, Debug)]
pub struct PoolNode {
    pub address: NodeAddress,
    pub sign_address: NodeAddress,
    pub deposit: Deposit,
    pub withdraw_height: u64,
    pub online_time: u64,
    /// Per-thousand stock scale from the node's tier.
    pub ratio: u16,
    pub vip_level: VipLevel,
    /// Stable input index, the universal tie-break.
    pub index: usize,
    /// Cleared once the node is chosen or filtered out.
    pub usable: bool,
}

impl PoolNode {
    fn from_candidate(candidate: &CandidateInfo, index: usize) -> Self {
        Self {
            address: candidate.address,
            sign_address: candidate.sign_address,
            deposit: candidate.deposit.unwrap_or_else(default_deposit),
            withdraw_height: candidate.withdraw_height.unwrap_or(DEFAULT_WITHDRAW_HEIGHT),
            online_time: candidate.online_time.unwrap_or(DEFAULT_ONLINE_TIME),
            ratio: DEFAULT_RATIO,
            vip_level: VipLevel::NIL,
            index,
            usable: true,
        }
    }

    /// Assign the highest tier whose threshold the deposit meets. Returns
    /// the whole-coin deposit for the pool's money map.
    fn assign_tier(&mut self, tiers: &[VipConfig]) -> u64 {
        let coins = self.deposit.whole_coins();
        for (i, tier) in tiers.iter().enumerate().rev() {
            if coins >= tier.min_deposit {
                self.vip_level = VipLevel::from_tier(i);
                self.ratio = tier.stock_scale;
                return coins;
            }
        }
        self.ratio = DEFAULT_RATIO;
        self.vip_level = VipLevel::NIL;
        coins
    }
}

/// Clamp a computed stock into the valid range.
pub fn stock_protect(stock: u64) -> u16 {
    if stock == 0 {
        1
    } else if stock > STOCK_CAP as u64 {
        STOCK_CAP
    } else {
        stock as u16
    }
}

pub struct ElectionPool {
    pub seq_num: u64,
    pub rng: MtUniform,
    pub vip_tiers: Vec<VipConfig>,
    pub nodes: Vec<PoolNode>,
    pub config: ElectConfig,
    pub chosen_count: usize,
    pub need_count: usize,
    /// Chosen groups in election order (highest tier first; the last group
    /// is the base tier).
    pub chosen_groups: Vec<Vec<ElectedStake>>,
    /// Whole-coin deposits per address.
    pub deposit_coins: HashMap<NodeAddress, u64>,
    pub slash: SlashTracker,
    pub coefficients: ValueCoefficients,
}

impl ElectionPool {
    /// Build a pool with tier assignment (the validator path, and the
    /// tierless miner path when `vip_tiers` is empty).
    pub fn new(
        vip_tiers: Vec<VipConfig>,
        candidates: &[CandidateInfo],
        config: ElectConfig,
        rand_seed: i64,
        seq_num: u64,
        role: Role,
    ) -> Self {
        let need_count = match role {
            Role::Validator => (config.validator_num + config.back_validator_num) as usize,
            Role::Miner => config.miner_num as usize,
        };
        let mut nodes = Vec::with_capacity(candidates.len());
        let mut deposit_coins = HashMap::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            let mut node = PoolNode::from_candidate(candidate, i);
            let coins = node.assign_tier(&vip_tiers);
            deposit_coins.insert(node.address, coins);
            nodes.push(node);
        }
        Self {
            seq_num,
            rng: MtUniform::new(rand_seed),
            vip_tiers,
            nodes,
            config,
            chosen_count: 0,
            need_count,
            chosen_groups: Vec::new(),
            deposit_coins,
            slash: SlashTracker::empty(),
            coefficients: ValueCoefficients::default(),
        }
    }

    /// Build a flat pool: no tier assignment, every node at the default
    /// ratio (the flat-stock miner path).
    pub fn new_flat(
        candidates: &[CandidateInfo],
        config: ElectConfig,
        rand_seed: i64,
        seq_num: u64,
        role: Role,
    ) -> Self {
        let mut pool = Self::new(Vec::new(), candidates, config, rand_seed, seq_num, role);
        for node in &mut pool.nodes {
            node.ratio = DEFAULT_RATIO;
            node.vip_level = VipLevel::NIL;
        }
        pool
    }

    pub fn set_slash_list(&mut self, list: SlashList) {
        self.slash = SlashTracker::new(list);
    }

    /// Mark every node outside the white list unusable. Callers gate this
    /// on the config's white-list switcher.
    pub fn apply_whitelist(&mut self) {
        for node in &mut self.nodes {
            if !contains_address(&self.config.white_list, &node.address) {
                node.usable = false;
            }
        }
    }

    /// Mark every black-listed node unusable. Both the staking address and
    /// the signing address are checked.
    pub fn apply_blacklist(&mut self) {
        for node in &mut self.nodes {
            if contains_address(&self.config.black_list, &node.address)
                || contains_address(&self.config.black_list, &node.sign_address)
            {
                node.usable = false;
            }
        }
    }

    /// Mark every slash-active node unusable.
    pub fn filter_slash_list(&mut self) {
        for node in &mut self.nodes {
            if self.slash.is_active(&node.address) {
                node.usable = false;
            }
        }
    }

    /// Slash filtering with a usable-count floor: stop filtering once the
    /// usable pool would shrink to `min_remain`. Returns the usable count
    /// after filtering.
    pub fn filter_slash_bounded(&mut self, entries: &[SlashEntry], min_remain: usize) -> usize {
        let mut available = self.available_count();
        for entry in entries {
            if available <= min_remain {
                return available;
            }
            if let Some(node) = self
                .nodes
                .iter_mut()
                .find(|n| n.address == entry.address)
            {
                if node.usable {
                    node.usable = false;
                    tracing::trace!(
                        address = %node.address,
                        prohibit_cycles = entry.prohibit_cycles,
                        "slash filter: candidate excluded"
                    );
                    available -= 1;
                }
            }
        }
        available
    }

    pub fn available_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.usable).count()
    }

    /// All still-usable nodes, in input order.
    pub fn usable_nodes(&self) -> Vec<PoolNode> {
        self.nodes.iter().filter(|n| n.usable).cloned().collect()
    }

    /// Usable nodes at `level` or above, in input order.
    pub fn nodes_at_level(&self, level: VipLevel) -> Vec<PoolNode> {
        self.nodes
            .iter()
            .filter(|n| n.usable && n.vip_level >= level)
            .cloned()
            .collect()
    }

    /// Record a chosen group: its members become unusable and count toward
    /// the need.
    pub fn set_chosen(&mut self, group: Vec<ElectedStake>) {
        for stake in &group {
            if let Some(node) = self.nodes.iter_mut().find(|n| n.address == stake.address) {
                node.usable = false;
            }
        }
        self.chosen_count += group.len();
        self.chosen_groups.push(group);
    }

    /// Election values for a node slice.
    pub fn weights_of(&self, nodes: &[PoolNode]) -> Vec<Weighted> {
        nodes
            .iter()
            .map(|n| {
                Weighted::new(
                    n.address,
                    election_value(
                        n.deposit.whole_coins(),
                        n.online_time,
                        n.ratio,
                        &self.coefficients,
                    ),
                )
            })
            .collect()
    }

    /// Exponential stake weights for a node slice.
    pub fn exp_weights_of(&self, nodes: &[PoolNode], exp: f64) -> Vec<Weighted> {
        nodes
            .iter()
            .map(|n| Weighted::new(n.address, exponential_value(n.deposit.whole_coins(), exp)))
            .collect()
    }

    /// The foundation/super-node carve-out: any usable node whose deposit
    /// times `factor` reaches the usable pool's total deposit is elected
    /// unconditionally, ahead of weighted sampling.
    ///
    /// Carved-out nodes are made unusable. Slash-active supernodes are
    /// dropped (their counters decremented) instead of elected. Returns the
    /// elected stakes (stock 1, first VIP echelon) and the corresponding
    /// nodes for later weight computation.
    pub fn carve_out_supernodes(&mut self, factor: u128) -> (Vec<ElectedStake>, Vec<PoolNode>) {
        let total: u128 = self
            .nodes
            .iter()
            .filter(|n| n.usable)
            .map(|n| n.deposit.raw())
            .sum();

        let pre_super: Vec<PoolNode> = self
            .nodes
            .iter()
            .filter(|n| n.usable && n.deposit.raw().saturating_mul(factor) >= total)
            .cloned()
            .collect();

        for node in &pre_super {
            if let Some(n) = self.nodes.iter_mut().find(|n| n.address == node.address) {
                n.usable = false;
            }
        }

        let mut stakes = Vec::with_capacity(pre_super.len());
        let mut nodes = Vec::with_capacity(pre_super.len());
        for node in pre_super {
            if self.slash.is_active(&node.address) {
                self.slash.decrement(&node.address);
                tracing::trace!(address = %node.address, "supernode dropped by slash list");
            } else {
                let mut stake = ElectedStake::new(node.address, 1);
                stake.vip_level = VipLevel::from_tier(1);
                stakes.push(stake);
                nodes.push(node);
            }
        }
        (stakes, nodes)
    }

    /// The smallest whole-coin deposit among the carved-out supernodes.
    fn min_supernode_coins(&self) -> Option<u64> {
        self.chosen_groups
            .first()?
            .iter()
            .map(|s| self.deposit_coins.get(&s.address).copied().unwrap_or(0))
            .min()
    }

    /// Recompute supernode stocks after the random tier is sampled.
    ///
    /// With no random tier (every mortgage carved out), stocks follow the
    /// exponential curve against the smallest supernode deposit; otherwise
    /// the sampled stock tallies are used, floored at 1.
    pub fn adjust_supernode_stocks(
        &mut self,
        sampled_stock: &HashMap<NodeAddress, u16>,
        exp: f64,
    ) {
        let Some(super_group) = self.chosen_groups.first() else {
            return;
        };
        if super_group.is_empty() {
            return;
        }

        let random_tier_empty = self
            .chosen_groups
            .get(1)
            .map(|g| g.is_empty())
            .unwrap_or(true);

        if random_tier_empty {
            let min_coins = self.min_supernode_coins().unwrap_or(1).max(1);
            let updates: Vec<(usize, u16)> = self.chosen_groups[0]
                .iter()
                .enumerate()
                .map(|(i, stake)| {
                    let coins = self.deposit_coins.get(&stake.address).copied().unwrap_or(0);
                    let factor = (coins as f64 / min_coins as f64).powf(exp);
                    (i, stock_protect((factor * 100.0 + 0.5) as u64))
                })
                .collect();
            for (i, stock) in updates {
                self.chosen_groups[0][i].stock = stock;
            }
        } else {
            for stake in &mut self.chosen_groups[0] {
                let stock = sampled_stock.get(&stake.address).copied().unwrap_or(1);
                stake.stock = stock_protect(stock as u64);
            }
        }
    }

    /// Recompute a VIP node's stock against the base group's accumulated
    /// stock/deposit ratio.
    pub fn vip_stock(&self, addr: &NodeAddress) -> u16 {
        let Some(base_group) = self.chosen_groups.last() else {
            return 1;
        };
        let mut stock_sum: u64 = 0;
        let mut deposit_sum: u64 = 0;
        for stake in base_group {
            stock_sum += stake.stock as u64;
            deposit_sum += self.deposit_coins.get(&stake.address).copied().unwrap_or(0);
        }

        let coins = self.deposit_coins.get(addr).copied().unwrap_or(0);
        let ratio = if deposit_sum == 0 {
            // Degenerate base group: fall back to the first real tier's
            // threshold as the denominator.
            match self.vip_tiers.get(1) {
                Some(tier) if tier.min_deposit > 0 => coins / tier.min_deposit,
                _ => 1,
            }
        } else {
            (stock_sum as f64 / deposit_sum as f64 * coins as f64 + 0.5) as u64
        };
        stock_protect(ratio)
    }

    /// Usable nodes sorted by deposit descending, online time descending on
    /// ties — the canonical no-randomness ordering.
    pub fn usable_by_deposit(&self) -> Vec<PoolNode> {
        let mut nodes = self.usable_nodes();
        nodes.sort_by(|a, b| {
            b.deposit
                .cmp(&a.deposit)
                .then(b.online_time.cmp(&a.online_time))
                .then(a.index.cmp(&b.index))
        });
        nodes
    }
}
