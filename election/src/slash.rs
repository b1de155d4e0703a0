//! Slash blacklist bookkeeping.
//!
//! Slashing (external to this crate) writes `{address, prohibit_cycles}`
//! entries; the election engine reads them, refuses to elect addresses
//! whose counter is still positive, and decrements counters as rounds pass.
//! Entries at zero are eligible again; removing them is the slashing
//! module's job, not ours.

use std::collections::HashMap;

use strata_messages::{SlashEntry, SlashList};
use strata_types::NodeAddress;

pub struct SlashTracker {
    index: HashMap<NodeAddress, usize>,
    entries: Vec<SlashEntry>,
}

impl SlashTracker {
    pub fn new(list: SlashList) -> Self {
        let mut index = HashMap::with_capacity(list.entries.len());
        for (i, entry) in list.entries.iter().enumerate() {
            index.insert(entry.address, i);
        }
        Self {
            index,
            entries: list.entries,
        }
    }

    pub fn empty() -> Self {
        Self::new(SlashList::default())
    }

    /// Whether the address is currently prohibited (listed with a positive
    /// remaining cycle count).
    pub fn is_active(&self, addr: &NodeAddress) -> bool {
        self.index
            .get(addr)
            .map(|&i| self.entries[i].prohibit_cycles > 0)
            .unwrap_or(false)
    }

    /// Decrement one address's remaining prohibition cycles, stopping at 0.
    pub fn decrement(&mut self, addr: &NodeAddress) {
        if let Some(&i) = self.index.get(addr) {
            if self.entries[i].prohibit_cycles > 0 {
                self.entries[i].prohibit_cycles -= 1;
            }
        }
    }

    /// Decrement every entry once — called at the end of an election round.
    pub fn decrement_all(&mut self) {
        for entry in &mut self.entries {
            if entry.prohibit_cycles > 0 {
                entry.prohibit_cycles -= 1;
            }
        }
    }

    /// The current list, for writing back to chain state.
    pub fn to_list(&self) -> SlashList {
        SlashList {
            entries: self.entries.clone(),
        }
    }
}
