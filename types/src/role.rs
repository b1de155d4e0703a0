//! Consensus roles.

use serde::{Deserialize, Serialize};

/// The broad node role an election produces a topology for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Miner,
    Validator,
}

/// The slot role a topology position belongs to. Master slots use the bare
/// `Miner`/`Validator` variants; standby and reserve slots carry their own
/// tags so a position alone identifies its queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElectRole {
    Miner,
    Validator,
    BackupValidator,
    CandidateValidator,
}

impl ElectRole {
    /// The role nibble used in the on-wire position encoding.
    pub(crate) fn tag(self) -> u16 {
        match self {
            ElectRole::Miner => 0x1,
            ElectRole::Validator => 0x2,
            ElectRole::BackupValidator => 0x3,
            ElectRole::CandidateValidator => 0x4,
        }
    }

    pub(crate) fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            0x1 => Some(ElectRole::Miner),
            0x2 => Some(ElectRole::Validator),
            0x3 => Some(ElectRole::BackupValidator),
            0x4 => Some(ElectRole::CandidateValidator),
            _ => None,
        }
    }
}
