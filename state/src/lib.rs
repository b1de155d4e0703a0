//! Chain-state access seam for the election engine.
//!
//! The engine's only cross-epoch state — the dynamic-polling rotation info
//! and the slash blacklist — lives in the chain state tree. This crate
//! defines the read/write seam and an in-memory implementation used by
//! tests and single-process deployments. An election call reads, mutates
//! and writes back within one synchronous call; the dispatcher guarantees
//! no two elections run against the same state concurrently.

use strata_messages::{DynamicPollingInfo, SlashList};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    /// The record is missing from the state tree. The engine cannot safely
    /// proceed without it, so this aborts the election call.
    #[error("state record not found: {0}")]
    NotFound(&'static str),

    #[error("state backend failure: {0}")]
    Backend(String),
}

/// Read/write access to the election engine's persisted records.
pub trait ElectionState {
    fn polling_info(&self) -> Result<DynamicPollingInfo, StateError>;
    fn set_polling_info(&mut self, info: DynamicPollingInfo) -> Result<(), StateError>;

    fn slash_list(&self) -> Result<SlashList, StateError>;
    fn set_slash_list(&mut self, list: SlashList) -> Result<(), StateError>;
}

/// In-memory state backend.
///
/// Starts with genesis-equivalent records present (empty slash list, zeroed
/// polling info), matching how the chain seeds these keys at genesis.
#[derive(Clone, Debug, Default)]
pub struct MemoryState {
    polling: DynamicPollingInfo,
    slash: SlashList,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_polling_info(info: DynamicPollingInfo) -> Self {
        Self {
            polling: info,
            slash: SlashList::default(),
        }
    }
}

impl ElectionState for MemoryState {
    fn polling_info(&self) -> Result<DynamicPollingInfo, StateError> {
        Ok(self.polling.clone())
    }

    fn set_polling_info(&mut self, info: DynamicPollingInfo) -> Result<(), StateError> {
        self.polling = info;
        Ok(())
    }

    fn slash_list(&self) -> Result<SlashList, StateError> {
        Ok(self.slash.clone())
    }

    fn set_slash_list(&mut self, list: SlashList) -> Result<(), StateError> {
        self.slash = list;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_messages::SlashEntry;
    use strata_types::NodeAddress;

    #[test]
    fn memory_state_round_trips_polling_info() {
        let mut state = MemoryState::new();
        assert_eq!(state.polling_info().unwrap(), DynamicPollingInfo::default());

        let info = DynamicPollingInfo {
            number: 100,
            seq: 3,
            miner_num: 32,
            candidate_list: vec![NodeAddress::from_low_u64(1)],
        };
        state.set_polling_info(info.clone()).unwrap();
        assert_eq!(state.polling_info().unwrap(), info);
    }

    #[test]
    fn memory_state_round_trips_slash_list() {
        let mut state = MemoryState::new();
        assert!(state.slash_list().unwrap().is_empty());

        let list = SlashList {
            entries: vec![SlashEntry {
                address: NodeAddress::from_low_u64(7),
                prohibit_cycles: 4,
            }],
        };
        state.set_slash_list(list.clone()).unwrap();
        assert_eq!(state.slash_list().unwrap(), list);
    }
}
