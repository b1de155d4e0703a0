//! Fundamental types for the Strata election engine.
//!
//! This crate defines the core types shared across the workspace: node
//! addresses, deposit amounts, consensus roles, VIP levels, topology
//! positions, and protocol parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod position;
pub mod role;
pub mod vip;

pub use address::NodeAddress;
pub use amount::Deposit;
pub use error::TypesError;
pub use position::Position;
pub use role::{ElectRole, Role};
pub use vip::VipLevel;
