//! Supertransaction client error types.
use alloy::transports::TransportErrorKind;
use thiserror::Error;

mod balance;
pub use balance::BalanceError;

mod bridge;
pub use bridge::BridgeError;

mod execution;
pub use execution::ExecutionError;

mod node;
pub use node::{NodeError, extract_error_message};

mod quote;
pub use quote::QuoteError;

/// The overarching error type returned by the supertransaction pipeline.
#[derive(Debug, Error)]
pub enum SupertxError {
    /// Errors related to unified balances.
    #[error(transparent)]
    Balance(#[from] BalanceError),
    /// Errors related to bridge routing.
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    /// Errors related to quote assembly.
    #[error(transparent)]
    Quote(#[from] QuoteError),
    /// Errors returned by, or while talking to, the execution node.
    #[error(transparent)]
    Node(#[from] NodeError),
    /// Errors related to signing and executing a supertransaction.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// An error occurred during ABI encoding/decoding.
    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),
    /// An error occurred talking to a chain RPC.
    #[error(transparent)]
    Rpc(#[from] alloy::transports::RpcError<TransportErrorKind>),
    /// An internal error occurred.
    #[error(transparent)]
    Internal(#[from] eyre::Error),
}

impl SupertxError {
    /// Wraps any error into [`SupertxError::Internal`].
    pub fn internal(err: impl Into<eyre::Error>) -> Self {
        Self::Internal(err.into())
    }
}

impl From<alloy::contract::Error> for SupertxError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(err) => Self::Rpc(err),
            err => Self::Internal(err.into()),
        }
    }
}
