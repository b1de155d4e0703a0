//! 20-byte account address type.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Strata account address: 20 bytes, displayed as `0x`-prefixed hex.
///
/// Both the staking account and its signing account are plain addresses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeAddress([u8; 20]);

impl NodeAddress {
    /// The all-zero address, used as the "vacant slot" sentinel in
    /// topology updates.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Parse from hex, with or without a `0x` prefix. Shorter strings are
    /// left-padded with zero bytes, matching chain convention.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        // Odd-length inputs get a leading zero nibble.
        let padded;
        let s = if s.len() % 2 == 1 {
            padded = format!("0{s}");
            &padded
        } else {
            s
        };
        let raw = hex::decode(s).map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        if raw.len() > 20 {
            return Err(TypesError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        bytes[20 - raw.len()..].copy_from_slice(&raw);
        Ok(Self(bytes))
    }

    /// Build an address whose low 8 bytes carry `v` — handy for tests and
    /// synthetic candidate pools.
    pub fn from_low_u64(v: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&v.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Linear membership check over an address slice. Election lists are short
/// and ordered; callers that need set semantics build their own.
pub fn contains_address(list: &[NodeAddress], addr: &NodeAddress) -> bool {
    list.iter().any(|a| a == addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_pads_short_input() {
        let a = NodeAddress::from_hex("1").unwrap();
        assert_eq!(a, NodeAddress::from_low_u64(1));
        let b = NodeAddress::from_hex("0x0a").unwrap();
        assert_eq!(b, NodeAddress::from_low_u64(10));
    }

    #[test]
    fn from_hex_rejects_oversized() {
        let long = "ff".repeat(21);
        assert!(NodeAddress::from_hex(&long).is_err());
    }

    #[test]
    fn display_round_trips() {
        let a = NodeAddress::from_low_u64(0xdead_beef);
        let shown = a.to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(NodeAddress::from_hex(&shown).unwrap(), a);
    }

    #[test]
    fn zero_sentinel() {
        assert!(NodeAddress::ZERO.is_zero());
        assert!(!NodeAddress::from_low_u64(1).is_zero());
    }

    #[test]
    fn contains_address_scans() {
        let list = vec![NodeAddress::from_low_u64(1), NodeAddress::from_low_u64(2)];
        assert!(contains_address(&list, &NodeAddress::from_low_u64(2)));
        assert!(!contains_address(&list, &NodeAddress::from_low_u64(3)));
    }
}
