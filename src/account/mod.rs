//! Smart account deployments across chains.
//!
//! Deploying accounts and deriving their addresses is done elsewhere; this module only consumes
//! deployed (or counterfactual) accounts through the [`Deployment`] capability.

use crate::{error::SupertxError, types::Call};
use alloy::primitives::{Address, Bytes, ChainId, U256};
use std::{fmt::Debug, sync::Arc};

mod provider;
pub use provider::{ProviderDeployment, encode_batch};

/// One smart account instance on one chain.
#[async_trait::async_trait]
pub trait Deployment: Debug + Send + Sync {
    /// The chain the account lives on.
    fn chain_id(&self) -> ChainId;

    /// The account address.
    fn address(&self) -> Address;

    /// Fetches the current account nonce.
    async fn nonce(&self) -> Result<U256, SupertxError>;

    /// Returns true if the account code is deployed.
    async fn is_deployed(&self) -> Result<bool, SupertxError>;

    /// Returns the code deploying the account, only meaningful while it is undeployed.
    async fn init_code(&self) -> Result<Bytes, SupertxError>;

    /// Encodes `calls` into a single account call executing them as a batch.
    fn encode_batch(&self, calls: &[Call]) -> Bytes;

    /// Reads the account's balance of an ERC-20 `token` from the chain.
    async fn token_balance(&self, token: Address) -> Result<U256, SupertxError>;

    /// Reads the decimals of an ERC-20 `token` from the chain.
    async fn token_decimals(&self, token: Address) -> Result<u8, SupertxError>;
}

/// A single logical account deployed on several chains, at most one deployment per chain.
#[derive(Debug, Clone)]
pub struct MultichainAccount {
    deployments: Vec<Arc<dyn Deployment>>,
}

impl MultichainAccount {
    /// Creates a new account from its deployments.
    pub fn new(
        deployments: impl IntoIterator<Item = Arc<dyn Deployment>>,
    ) -> Result<Self, SupertxError> {
        let mut this = Self { deployments: Vec::new() };
        for deployment in deployments {
            if this.deployment_on(deployment.chain_id()).is_some() {
                return Err(eyre::eyre!(
                    "duplicate deployment on chain {}",
                    deployment.chain_id()
                )
                .into());
            }
            this.deployments.push(deployment);
        }
        Ok(this)
    }

    /// Returns the deployment on `chain_id`.
    pub fn deployment_on(&self, chain_id: ChainId) -> Option<&Arc<dyn Deployment>> {
        self.deployments.iter().find(|deployment| deployment.chain_id() == chain_id)
    }

    /// Returns the account address on `chain_id`.
    pub fn address_on(&self, chain_id: ChainId) -> Option<Address> {
        self.deployment_on(chain_id).map(|deployment| deployment.address())
    }

    /// Returns all deployments, in the order they were added.
    pub fn deployments(&self) -> &[Arc<dyn Deployment>] {
        &self.deployments
    }

    /// Returns the chains the account is deployed on.
    pub fn chain_ids(&self) -> impl Iterator<Item = ChainId> + '_ {
        self.deployments.iter().map(|deployment| deployment.chain_id())
    }
}
