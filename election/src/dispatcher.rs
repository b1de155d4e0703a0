//! The election dispatcher — a single-consumer actor.
//!
//! Re-election requests arrive on a bounded channel and are processed
//! strictly one at a time against one state seam, so no two elections ever
//! run concurrently against the same state root. Results come back on a
//! per-request oneshot.

use strata_messages::{
    MinerElectionRequest, MinerElectionResponse, ValidatorElectionRequest,
    ValidatorElectionResponse,
};
use strata_state::ElectionState;
use tokio::sync::{mpsc, oneshot};

use crate::error::ElectionError;
use crate::strategy::{Electable, StrategyRegistry};

const REQUEST_QUEUE_DEPTH: usize = 10;

enum Job {
    Miner {
        request: MinerElectionRequest,
        reply: oneshot::Sender<Result<MinerElectionResponse, ElectionError>>,
    },
    Validator {
        request: ValidatorElectionRequest,
        reply: oneshot::Sender<Result<ValidatorElectionResponse, ElectionError>>,
    },
}

/// Cloneable handle to the dispatcher worker. Dropping every handle stops
/// the worker.
#[derive(Clone)]
pub struct ElectionDispatcher {
    tx: mpsc::Sender<Job>,
}

impl ElectionDispatcher {
    /// Spawn the worker task owning `registry` and `state`.
    pub fn spawn<S>(registry: StrategyRegistry, mut state: S) -> Self
    where
        S: ElectionState + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Job>(REQUEST_QUEUE_DEPTH);
        tokio::spawn(async move {
            tracing::info!(strategies = ?registry.names(), "election dispatcher started");
            while let Some(job) = rx.recv().await {
                match job {
                    Job::Miner { request, reply } => {
                        let result = registry
                            .create(&request.config.strategy)
                            .and_then(|s| s.miner_top_gen(&request, &mut state));
                        if let Err(err) = &result {
                            tracing::warn!(seq = request.seq_num, %err, "miner election failed");
                        }
                        let _ = reply.send(result);
                    }
                    Job::Validator { request, reply } => {
                        let result = registry
                            .create(&request.config.strategy)
                            .and_then(|s| s.validator_top_gen(&request, &mut state));
                        if let Err(err) = &result {
                            tracing::warn!(seq = request.seq_num, %err, "validator election failed");
                        }
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("election dispatcher stopped");
        });
        Self { tx }
    }

    pub async fn elect_miners(
        &self,
        request: MinerElectionRequest,
    ) -> Result<MinerElectionResponse, ElectionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job::Miner { request, reply })
            .await
            .map_err(|_| ElectionError::Dispatch)?;
        rx.await.map_err(|_| ElectionError::Dispatch)?
    }

    pub async fn elect_validators(
        &self,
        request: ValidatorElectionRequest,
    ) -> Result<ValidatorElectionResponse, ElectionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Job::Validator { request, reply })
            .await
            .map_err(|_| ElectionError::Dispatch)?;
        rx.await.map_err(|_| ElectionError::Dispatch)?
    }
}
