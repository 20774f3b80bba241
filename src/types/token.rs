use alloy::primitives::{Address, ChainId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One logical token (e.g. USDC) and its contract address on every chain it is deployed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultichainToken {
    /// Token symbol.
    pub symbol: String,
    /// Contract address by chain.
    pub deployments: BTreeMap<ChainId, Address>,
}

impl MultichainToken {
    /// Creates a new token from its per-chain deployments.
    pub fn new(
        symbol: impl Into<String>,
        deployments: impl IntoIterator<Item = (ChainId, Address)>,
    ) -> Self {
        Self { symbol: symbol.into(), deployments: deployments.into_iter().collect() }
    }

    /// Returns the token address on `chain_id`.
    pub fn address_on(&self, chain_id: ChainId) -> Option<Address> {
        self.deployments.get(&chain_id).copied()
    }

    /// Returns true if the token is deployed on `chain_id`.
    pub fn is_deployed_on(&self, chain_id: ChainId) -> bool {
        self.deployments.contains_key(&chain_id)
    }
}
