use alloy::primitives::{B256, ChainId};
use thiserror::Error;

/// Errors related to signing and executing a supertransaction.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A user operation failed on one of the chains.
    #[error("user op on chain {chain_id} failed: {error}")]
    UserOpFailed {
        /// The chain the user op failed on.
        chain_id: ChainId,
        /// The execution error reported by the explorer.
        error: String,
    },
    /// The receipt did not reach a terminal state in time.
    #[error("timed out waiting for supertransaction {hash} after {attempts} attempts")]
    Timeout {
        /// The supertransaction hash.
        hash: B256,
        /// Number of explorer polls made.
        attempts: u32,
    },
    /// The fusion trigger transaction reverted.
    #[error("fusion trigger transaction {0} reverted")]
    TriggerReverted(B256),
    /// The fusion trigger targets a chain no sender is configured for.
    #[error("no trigger sender for chain {0}")]
    MissingTriggerChain(ChainId),
    /// The signer failed.
    #[error("failed to sign quote: {0}")]
    Signing(eyre::Error),
}
