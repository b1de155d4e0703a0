//! Topology position encoding.
//!
//! A position packs the slot role and the zero-based slot index into one
//! `u16`: role nibble in the top four bits, index in the low twelve. The
//! role must be recoverable from the bare position because topology-patch
//! logic walks a flat node list and routes each slot by role.

use crate::error::TypesError;
use crate::role::ElectRole;
use serde::{Deserialize, Serialize};
use std::fmt;

const INDEX_MASK: u16 = 0x0FFF;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position(u16);

impl Position {
    pub fn new(role: ElectRole, index: u16) -> Result<Self, TypesError> {
        if index > INDEX_MASK {
            return Err(TypesError::PositionIndexOverflow(index));
        }
        Ok(Self((role.tag() << 12) | index))
    }

    /// Infallible constructor for indices known to fit (election quotas are
    /// far below 4096 slots).
    pub fn at(role: ElectRole, index: u16) -> Self {
        Self((role.tag() << 12) | (index & INDEX_MASK))
    }

    pub fn role(&self) -> Result<ElectRole, TypesError> {
        ElectRole::from_tag(self.0 >> 12).ok_or(TypesError::UnknownPositionRole(self.0))
    }

    pub fn index(&self) -> u16 {
        self.0 & INDEX_MASK
    }

    pub fn raw(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}
