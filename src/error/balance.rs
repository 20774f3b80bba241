use alloy::primitives::ChainId;
use thiserror::Error;

/// Errors related to unified balances.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// The token reports different decimals on different chains.
    #[error("token decimals mismatch on chain {chain_id}: expected {expected}, got {got}")]
    DecimalMismatch {
        /// The chain reporting the mismatching decimals.
        chain_id: ChainId,
        /// Decimals reported by the first chain.
        expected: u8,
        /// Decimals reported by `chain_id`.
        got: u8,
    },
    /// Neither the token nor the account share a chain.
    #[error("no chain has both the token and the account deployed")]
    NoCommonChains,
}
