//! VIP levels — stake-threshold echelons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A node's stake echelon. `NIL` is the implicit catch-all for deposits
/// below every configured threshold; higher values order higher echelons.
///
/// The numeric payload is the index into the (ascending) VIP tier
/// configuration, so tier configs and levels stay in lockstep.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VipLevel(u8);

impl VipLevel {
    pub const NIL: Self = Self(0);

    /// Level for tier-config index `index`. Index 0 is the catch-all base
    /// tier and maps to `NIL`.
    pub fn from_tier(index: usize) -> Self {
        Self(index as u8)
    }

    pub fn tier_index(&self) -> usize {
        self.0 as usize
    }

    pub fn is_nil(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for VipLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "VIP-nil")
        } else {
            write!(f, "VIP-{}", self.0)
        }
    }
}
