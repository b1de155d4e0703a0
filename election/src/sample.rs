//! Normalizer and weighted without-replacement samplers.
//!
//! All samplers are deterministic functions of their input order and the
//! seeded generator. Input order doubles as the tie-break everywhere, so
//! nothing here may sort, dedup through unordered maps, or otherwise
//! disturb insertion order.

use std::collections::HashMap;

use strata_types::params::{DEFAULT_STOCK, MAX_SAMPLE, POWER_WEIGHT_MAX_SAMPLE};
use strata_types::{NodeAddress, VipLevel};

use crate::rng::MtUniform;
use crate::slash::SlashTracker;

/// A candidate id with its (raw or normalized) weight.
#[derive(Clone, Debug, PartialEq)]
pub struct Weighted {
    pub address: NodeAddress,
    pub value: f64,
}

impl Weighted {
    pub fn new(address: NodeAddress, value: f64) -> Self {
        Self { address, value }
    }
}

/// An elected id with its integer stock. The VIP tag is filled in at
/// assembly time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElectedStake {
    pub address: NodeAddress,
    pub stock: u16,
    pub vip_level: VipLevel,
}

impl ElectedStake {
    pub fn new(address: NodeAddress, stock: u16) -> Self {
        Self {
            address,
            stock,
            vip_level: VipLevel::NIL,
        }
    }
}

/// Plain normalization: probability = value / Σvalues, input order kept.
pub fn normalize(values: &[Weighted]) -> Vec<Weighted> {
    let total: f64 = values.iter().map(|w| w.value).sum();
    values
        .iter()
        .map(|w| Weighted::new(w.address, w.value / total))
        .collect()
}

/// Prefix normalization: entry i carries the sum of the values *before* it,
/// divided by the total. Pairs with [`sample_one_prefix`].
pub fn normalize_prefix(values: &[Weighted]) -> Vec<Weighted> {
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for w in values {
        out.push(Weighted::new(w.address, running));
        running += w.value;
    }
    for entry in &mut out {
        entry.value /= running;
    }
    out
}

/// Subtractive-walk sampling: the first id where `r` goes negative.
///
/// When floating-point rounding exhausts the list without `r` going
/// negative, the first entry is returned with `hit = false`. Callers that
/// skip misses and callers that accept the biased fallback both exist;
/// the choice is part of each algorithm's recorded behaviour.
pub fn sample_one(probs: &[Weighted], mut r: f64) -> (NodeAddress, bool) {
    for item in probs {
        r -= item.value;
        if r < 0.0 {
            return (item.address, true);
        }
    }
    (probs[0].address, false)
}

/// Prefix-walk sampling: scanning from the end, the first entry whose
/// prefix value is ≤ `r`. The first entry's prefix is always 0, so a
/// non-empty list always hits.
pub fn sample_one_prefix(probs: &[Weighted], r: f64) -> Option<NodeAddress> {
    probs.iter().rev().find(|item| r >= item.value).map(|item| item.address)
}

/// Draw-count bookkeeping shared by the pick loops.
struct DrawCounts {
    counts: HashMap<NodeAddress, u16>,
    order: Vec<NodeAddress>,
}

impl DrawCounts {
    fn new() -> Self {
        Self {
            counts: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Count one draw; true when the address is new.
    fn record(&mut self, addr: NodeAddress) -> bool {
        match self.counts.get_mut(&addr) {
            Some(c) => {
                *c = c.saturating_add(1);
                false
            }
            None => {
                self.counts.insert(addr, 1);
                self.order.push(addr);
                true
            }
        }
    }

    fn distinct(&self) -> usize {
        self.counts.len()
    }

    fn contains(&self, addr: &NodeAddress) -> bool {
        self.counts.contains_key(addr)
    }
}

enum PickFlavor {
    /// Sampled ids carry their draw count; backfill carries stock 1.
    DrawCount,
    /// Every elected id carries the flat default stock.
    Flat,
}

fn pick_from(
    probs: Vec<Weighted>,
    mut need: usize,
    rng: &mut MtUniform,
    prefix: bool,
    flavor: PickFlavor,
) -> (Vec<ElectedStake>, Vec<Weighted>) {
    if probs.is_empty() {
        return (Vec::new(), probs);
    }
    if need == 0 {
        // A met quota never spends draws; every entry is remainder.
        return (Vec::new(), probs);
    }
    if need > probs.len() {
        need = probs.len();
    }

    let mut draws = DrawCounts::new();
    for _ in 0..MAX_SAMPLE {
        let r = rng.uniform(0.0, 1.0);
        let drawn = if prefix {
            sample_one_prefix(&probs, r)
        } else {
            match sample_one(&probs, r) {
                (addr, true) => Some(addr),
                // Rounding miss: skipped here, the draw still spends budget.
                (_, false) => None,
            }
        };
        let Some(addr) = drawn else { continue };
        draws.record(addr);
        if draws.distinct() == need {
            break;
        }
    }

    let mut chosen: Vec<ElectedStake> = draws
        .order
        .iter()
        .map(|addr| {
            let stock = match flavor {
                PickFlavor::DrawCount => draws.counts[addr],
                PickFlavor::Flat => DEFAULT_STOCK,
            };
            ElectedStake::new(*addr, stock)
        })
        .collect();

    // Shortfall backfill and remainder, both in input (probability) order.
    let mut remaining = Vec::new();
    for item in &probs {
        if draws.contains(&item.address) {
            continue;
        }
        if chosen.len() < need {
            chosen.push(ElectedStake::new(item.address, DEFAULT_STOCK));
        } else {
            remaining.push(item.clone());
        }
    }

    (chosen, remaining)
}

/// Without-replacement pick over plain-normalized probabilities
/// (the base-tier / common path).
pub fn pick_list(
    values: &[Weighted],
    need: usize,
    rng: &mut MtUniform,
) -> (Vec<ElectedStake>, Vec<Weighted>) {
    let probs = normalize(values);
    pick_from(probs, need, rng, false, PickFlavor::DrawCount)
}

/// Without-replacement pick over prefix-normalized probabilities
/// (the VIP-tier path).
pub fn pick_list_vip(
    values: &[Weighted],
    need: usize,
    rng: &mut MtUniform,
) -> (Vec<ElectedStake>, Vec<Weighted>) {
    let probs = normalize_prefix(values);
    pick_from(probs, need, rng, true, PickFlavor::DrawCount)
}

/// Flat-stock pick (miner election): every elected id gets the default
/// miner stock regardless of draw counts.
pub fn pick_list_flat(
    values: &[Weighted],
    need: usize,
    rng: &mut MtUniform,
) -> (Vec<ElectedStake>, Vec<Weighted>) {
    let probs = normalize(values);
    pick_from(probs, need, rng, false, PickFlavor::Flat)
}

/// The supernode-blended, slash-filtered pick used by the validator path of
/// the dynamic-polling strategy.
///
/// Samples over the concatenated random+super pool. Draws landing on a
/// supernode only raise that supernode's stock tally; draws landing on a
/// slash-listed id are tallied separately and never elected (their
/// prohibition counters are decremented once at the end). Sampling stops
/// once the need is met *and* every supernode has been sampled, or the
/// draw budget runs out. Supernode stocks are floored at 1.
pub fn pick_list_slash_filtered(
    rand_values: &[Weighted],
    super_values: &[Weighted],
    mut need: usize,
    rng: &mut MtUniform,
    slash: &mut SlashTracker,
) -> (Vec<ElectedStake>, HashMap<NodeAddress, u16>) {
    let mut blended: Vec<Weighted> = rand_values.to_vec();
    blended.extend_from_slice(super_values);
    let probs = normalize(&blended);

    let mut super_stock: HashMap<NodeAddress, u16> =
        super_values.iter().map(|w| (w.address, 0)).collect();

    if rand_values.is_empty() || need == 0 {
        return (Vec::new(), super_stock);
    }
    if need > rand_values.len() {
        need = rand_values.len();
    }

    let mut draws = DrawCounts::new();
    let mut slashed_draws: HashMap<NodeAddress, u16> = HashMap::new();

    for _ in 0..POWER_WEIGHT_MAX_SAMPLE {
        let r = rng.uniform(0.0, 1.0);
        let (addr, hit) = sample_one(&probs, r);
        if !hit {
            continue;
        }
        if let Some(stock) = super_stock.get_mut(&addr) {
            *stock = stock.saturating_add(1);
            continue;
        }
        if slash.is_active(&addr) {
            *slashed_draws.entry(addr).or_insert(0) += 1;
        } else {
            draws.record(addr);
        }
        let all_supers_sampled =
            super_stock.is_empty() || super_stock.values().all(|&s| s > 0);
        if draws.distinct() >= need && all_supers_sampled {
            break;
        }
    }

    for stock in super_stock.values_mut() {
        if *stock == 0 {
            *stock = 1;
        }
    }

    for (addr, picks) in &slashed_draws {
        tracing::trace!(address = %addr, picks, "slash-listed candidate drawn, not elected");
    }

    let mut chosen: Vec<ElectedStake> = draws
        .order
        .iter()
        .map(|addr| ElectedStake::new(*addr, draws.counts[addr]))
        .collect();

    for item in &probs {
        if super_stock.contains_key(&item.address) || draws.contains(&item.address) {
            continue;
        }
        if slash.is_active(&item.address) {
            continue;
        }
        if chosen.len() < need {
            chosen.push(ElectedStake::new(item.address, DEFAULT_STOCK));
        }
    }

    for addr in slashed_draws.keys() {
        slash.decrement(addr);
    }

    (chosen, super_stock)
}
