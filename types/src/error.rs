use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address hex: {0}")]
    InvalidAddress(String),

    #[error("position {0:#06x} carries an unknown role tag")]
    UnknownPositionRole(u16),

    #[error("position index {0} exceeds the per-role range")]
    PositionIndexOverflow(u16),
}
