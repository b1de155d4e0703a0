//! Election messages: requests, responses, configuration and the
//! cross-epoch state records the engine persists between calls.
//!
//! The election engine is invoked in-process via these request/response
//! pairs; no wire protocol is defined here. Everything is serde-derived so
//! the same types serve the state tree and test vectors.

use serde::{Deserialize, Serialize};
use strata_types::{Deposit, ElectRole, NodeAddress, Position, VipLevel};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse election config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A deposit-backed election candidate, as read from the chain-state
/// deposit snapshot.
///
/// The optional fields mirror chain records that may predate the field's
/// introduction; the engine substitutes documented defaults, never errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateInfo {
    pub address: NodeAddress,
    pub sign_address: NodeAddress,
    pub deposit: Option<Deposit>,
    pub withdraw_height: Option<u64>,
    pub online_time: Option<u64>,
}

impl CandidateInfo {
    /// A candidate with every optional field present.
    pub fn new(
        address: NodeAddress,
        sign_address: NodeAddress,
        deposit: Deposit,
        withdraw_height: u64,
        online_time: u64,
    ) -> Self {
        Self {
            address,
            sign_address,
            deposit: Some(deposit),
            withdraw_height: Some(withdraw_height),
            online_time: Some(online_time),
        }
    }
}

/// Election configuration, supplied by the chain with each request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectConfig {
    #[serde(default)]
    pub miner_num: u16,
    #[serde(default)]
    pub validator_num: u16,
    #[serde(default)]
    pub back_validator_num: u16,
    /// Registered strategy name ("layered", "layered_mep", "layered_dp",
    /// "nochoice", "stock").
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub white_list: Vec<NodeAddress>,
    #[serde(default)]
    pub black_list: Vec<NodeAddress>,
    /// When set, only whitelisted addresses are electable. The black list
    /// applies regardless.
    #[serde(default)]
    pub white_list_switcher: bool,
}

impl ElectConfig {
    /// Load from a TOML document (genesis tooling and tests).
    pub fn from_toml_str(doc: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(doc)?)
    }
}

/// One VIP echelon: minimum deposit threshold (whole coins), stock scale
/// (per-thousand), per-election quota and interest rate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipConfig {
    pub min_deposit: u64,
    pub interest_rate: u64,
    pub elect_user_num: u8,
    pub stock_scale: u16,
}

/// Sort tiers ascending by threshold; tier assignment and the descent loop
/// both assume this order.
pub fn sort_vip_configs(tiers: &mut [VipConfig]) {
    tiers.sort_by_key(|t| t.min_deposit);
}

/// An elected node: the unit of topology output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectedNode {
    pub account: NodeAddress,
    pub position: Position,
    pub stock: u16,
    pub vip_level: VipLevel,
    pub role: ElectRole,
}

/// A blacklist entry produced by slashing: the address sits out
/// `prohibit_cycles` further election rounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashEntry {
    pub address: NodeAddress,
    pub prohibit_cycles: u16,
}

/// The slash blacklist, persisted in chain state and decremented by the
/// engine once per election round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashList {
    pub entries: Vec<SlashEntry>,
}

impl SlashList {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cross-epoch rotation state for the dynamic-polling miner election.
/// The only election state with cross-call lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicPollingInfo {
    /// Block height the info was last written at.
    pub number: u64,
    /// Round sequence number.
    pub seq: u64,
    /// Target miner count for the current round.
    pub miner_num: u64,
    /// Addresses not yet elected this round.
    pub candidate_list: Vec<NodeAddress>,
}

/// Miner re-election request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MinerElectionRequest {
    pub seq_num: u64,
    /// Chain-derived deterministic seed (already reduced to 64 bits).
    pub rand_seed: i64,
    pub miner_pool: Vec<CandidateInfo>,
    pub config: ElectConfig,
}

/// Validator re-election request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidatorElectionRequest {
    pub seq_num: u64,
    pub rand_seed: i64,
    pub validator_pool: Vec<CandidateInfo>,
    /// Foundation validators blended in ahead of the sampled set
    /// (legacy strategy only; empty otherwise).
    pub foundation_pool: Vec<CandidateInfo>,
    pub config: ElectConfig,
    /// VIP tiers, ascending by threshold.
    pub vip_tiers: Vec<VipConfig>,
    pub slash_list: SlashList,
}

/// Miner election result: the ranked master miner list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerElectionResponse {
    pub seq_num: u64,
    pub master: Vec<ElectedNode>,
    pub backup: Vec<ElectedNode>,
}

/// Validator election result: ranked master/backup/candidate lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorElectionResponse {
    pub seq_num: u64,
    pub master: Vec<ElectedNode>,
    pub backup: Vec<ElectedNode>,
    pub candidate: Vec<ElectedNode>,
}

/// One occupied slot in the live network topology.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub account: NodeAddress,
    pub position: Position,
}

/// The live topology, as the consensus layer sees it between elections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyGraph {
    pub nodes: Vec<TopologyNode>,
}

/// A topology patch instruction: put `address` at `position`. A zero
/// address deletes the slot (the node went offline and nothing could fill
/// the vacancy).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub address: NodeAddress,
    pub position: Position,
}

/// The elected lists plus the reserve queues the online-patch logic draws
/// replacements from, cached between elections.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ElectedQueues {
    pub master: Vec<ElectedNode>,
    pub backup: Vec<ElectedNode>,
    pub candidate: Vec<ElectedNode>,
    pub master_queue: Vec<NodeAddress>,
    pub backup_queue: Vec<NodeAddress>,
    pub candidate_queue: Vec<NodeAddress>,
    pub config: ElectConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(v: u64) -> NodeAddress {
        NodeAddress::from_low_u64(v)
    }

    #[test]
    fn elect_config_from_toml() {
        let cfg = ElectConfig::from_toml_str(
            r#"
            miner_num = 21
            validator_num = 11
            back_validator_num = 5
            strategy = "layered"
            white_list_switcher = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.miner_num, 21);
        assert_eq!(cfg.validator_num, 11);
        assert_eq!(cfg.back_validator_num, 5);
        assert_eq!(cfg.strategy, "layered");
        assert!(cfg.white_list.is_empty());
    }

    #[test]
    fn vip_configs_sort_ascending() {
        let mut tiers = vec![
            VipConfig { min_deposit: 100_000, interest_rate: 10, elect_user_num: 5, stock_scale: 2000 },
            VipConfig { min_deposit: 0, interest_rate: 5, elect_user_num: 0, stock_scale: 1000 },
            VipConfig { min_deposit: 40_000, interest_rate: 7, elect_user_num: 3, stock_scale: 1600 },
        ];
        sort_vip_configs(&mut tiers);
        let thresholds: Vec<u64> = tiers.iter().map(|t| t.min_deposit).collect();
        assert_eq!(thresholds, vec![0, 40_000, 100_000]);
    }

    #[test]
    fn polling_info_bincode_roundtrip() {
        let info = DynamicPollingInfo {
            number: 42,
            seq: 7,
            miner_num: 32,
            candidate_list: (0..5).map(addr).collect(),
        };
        let encoded = bincode::serialize(&info).unwrap();
        let decoded: DynamicPollingInfo = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn elected_node_bincode_roundtrip() {
        let node = ElectedNode {
            account: addr(9),
            position: Position::at(ElectRole::Validator, 3),
            stock: 17,
            vip_level: VipLevel::from_tier(2),
            role: ElectRole::Validator,
        };
        let encoded = bincode::serialize(&node).unwrap();
        let decoded: ElectedNode = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, node);
    }
}
