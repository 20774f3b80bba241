use alloy::primitives::ChainId;
use thiserror::Error;

/// Errors related to quote assembly.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// An instruction targets a chain the account is not deployed on.
    #[error("account has no deployment on chain {0}")]
    MissingDeployment(ChainId),
    /// The fee token chain has no account deployment.
    #[error("account has no deployment on fee chain {0}")]
    MissingFeeDeployment(ChainId),
    /// The summed gas limits of an instruction overflow.
    #[error("call gas limit overflow on chain {0}")]
    GasOverflow(ChainId),
    /// A quote was requested without instructions.
    #[error("no instructions to quote")]
    EmptyInstructions,
}
