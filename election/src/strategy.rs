//! The election strategy contract and its registry.
//!
//! Every algorithm variant implements [`Electable`]. The registry is an
//! explicit factory keyed by strategy name, populated by the composition
//! root and handed to the dispatcher — pluggability without hidden global
//! state.

use std::collections::HashMap;

use strata_messages::{
    Alternative, ElectedNode, ElectedQueues, MinerElectionRequest, MinerElectionResponse,
    TopologyGraph, TopologyNode, ValidatorElectionRequest, ValidatorElectionResponse,
};
use strata_state::ElectionState;

use crate::error::ElectionError;
use crate::patch;

/// One election algorithm variant.
///
/// `miner_top_gen` and `validator_top_gen` are pure apart from the state
/// seam (only the dynamic-polling variant uses it). The topology-patch
/// operations are shared defaults; variants may override.
pub trait Electable: Send + Sync + std::fmt::Debug {
    fn miner_top_gen(
        &self,
        request: &MinerElectionRequest,
        state: &mut dyn ElectionState,
    ) -> Result<MinerElectionResponse, ElectionError>;

    fn validator_top_gen(
        &self,
        request: &ValidatorElectionRequest,
        state: &mut dyn ElectionState,
    ) -> Result<ValidatorElectionResponse, ElectionError>;

    /// Patch the live topology after offline/online events.
    fn topology_update(&self, queues: ElectedQueues, topology: &TopologyGraph) -> Vec<Alternative> {
        patch::topology_update(queues, topology)
    }

    /// Maintain the cached role queues as nodes come back online.
    fn primary_list_update(
        &self,
        queues: patch::RoleQueues,
        online: TopologyNode,
        queue: patch::QueueKind,
    ) -> patch::RoleQueues {
        patch::primary_list_update(queues, online, queue)
    }
}

type StrategyBuilder = Box<dyn Fn() -> Box<dyn Electable> + Send + Sync>;

/// Explicit strategy factory, keyed by the name carried in the election
/// config.
#[derive(Default)]
pub struct StrategyRegistry {
    builders: HashMap<String, StrategyBuilder>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in strategy registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("layered", || Box::new(crate::layered::Layered));
        registry.register("layered_mep", || Box::new(crate::layered_mep::LayeredMep));
        registry.register("layered_dp", || Box::new(crate::layered_dp::LayeredDp));
        registry.register("nochoice", || Box::new(crate::nochoice::NoChoice));
        registry.register("stock", || Box::new(crate::stock::Stock));
        registry
    }

    pub fn register<F>(&mut self, name: &str, builder: F)
    where
        F: Fn() -> Box<dyn Electable> + Send + Sync + 'static,
    {
        self.builders.insert(name.to_string(), Box::new(builder));
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Electable>, ElectionError> {
        self.builders
            .get(name)
            .map(|b| b())
            .ok_or_else(|| ElectionError::UnknownStrategy(name.to_string()))
    }

    /// Registered names, sorted for stable display.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builders.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Convenience: did an election output include this account?
pub fn contains_account(nodes: &[ElectedNode], account: &strata_types::NodeAddress) -> bool {
    nodes.iter().any(|n| &n.account == account)
}
