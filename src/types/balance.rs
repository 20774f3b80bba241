use super::MultichainToken;
use alloy::primitives::{ChainId, U256};
use serde::{Deserialize, Serialize};

/// Balance of a token on a single chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainBalance {
    /// Chain the balance was read on.
    pub chain_id: ChainId,
    /// Raw token balance.
    pub balance: U256,
    /// Token decimals on this chain.
    pub decimals: u8,
}

/// The sum of a token's balance across every chain the account is deployed on.
///
/// `decimals` is identical for every entry in `breakdown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedBalance {
    /// The aggregated token.
    pub token: MultichainToken,
    /// Sum of all per-chain balances.
    pub total_balance: U256,
    /// Token decimals.
    pub decimals: u8,
    /// Per-chain balances, in ascending chain id.
    pub breakdown: Vec<ChainBalance>,
}

impl UnifiedBalance {
    /// Returns the balance on `chain_id`, or zero if the chain is not part of the breakdown.
    pub fn balance_on(&self, chain_id: ChainId) -> U256 {
        self.breakdown
            .iter()
            .find(|entry| entry.chain_id == chain_id)
            .map(|entry| entry.balance)
            .unwrap_or_default()
    }
}
