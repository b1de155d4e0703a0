use strata_state::StateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ElectionError {
    /// The request named a strategy nobody registered.
    #[error("unknown election strategy {0:?}")]
    UnknownStrategy(String),

    /// Reading or writing persisted election state failed. The engine
    /// cannot proceed safely without it, so the call aborts.
    #[error("election state access failed: {0}")]
    State(#[from] StateError),

    /// The dispatcher worker is gone (its handle was dropped or the task
    /// panicked).
    #[error("election dispatcher stopped")]
    Dispatch,
}
