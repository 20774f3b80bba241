use super::Deployment;
use crate::{
    constants::ENTRYPOINT_V07,
    error::SupertxError,
    types::{Call, IERC20, IERC7579Account, IEntryPoint},
};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, U256, aliases::U192, b256},
    providers::{DynProvider, Provider, ProviderBuilder},
    sol_types::{SolCall, SolValue},
};
use url::Url;

/// ERC-7579 execution mode for a batch call with default exec type.
const BATCH_EXECUTION_MODE: B256 =
    b256!("0x0100000000000000000000000000000000000000000000000000000000000000");

/// A [`Deployment`] reading account state through a chain provider.
#[derive(Debug, Clone)]
pub struct ProviderDeployment {
    chain_id: ChainId,
    address: Address,
    provider: DynProvider,
    entrypoint: Address,
    init_code: Bytes,
}

impl ProviderDeployment {
    /// Creates a new deployment backed by `provider`.
    pub fn new(chain_id: ChainId, address: Address, provider: DynProvider) -> Self {
        Self { chain_id, address, provider, entrypoint: ENTRYPOINT_V07, init_code: Bytes::new() }
    }

    /// Connects to an HTTP endpoint and creates a deployment on it.
    pub fn from_endpoint(chain_id: ChainId, address: Address, endpoint: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(endpoint).erased();
        Self::new(chain_id, address, provider)
    }

    /// Sets the init code used while the account is not deployed.
    pub fn with_init_code(mut self, init_code: Bytes) -> Self {
        self.init_code = init_code;
        self
    }

    /// Sets the entrypoint nonces are read from.
    pub fn with_entrypoint(mut self, entrypoint: Address) -> Self {
        self.entrypoint = entrypoint;
        self
    }

    /// Returns the underlying provider.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

#[async_trait::async_trait]
impl Deployment for ProviderDeployment {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn address(&self) -> Address {
        self.address
    }

    async fn nonce(&self) -> Result<U256, SupertxError> {
        Ok(IEntryPoint::new(self.entrypoint, &self.provider)
            .getNonce(self.address, U192::ZERO)
            .call()
            .await?)
    }

    async fn is_deployed(&self) -> Result<bool, SupertxError> {
        Ok(!self.provider.get_code_at(self.address).await?.is_empty())
    }

    async fn init_code(&self) -> Result<Bytes, SupertxError> {
        Ok(self.init_code.clone())
    }

    fn encode_batch(&self, calls: &[Call]) -> Bytes {
        encode_batch(calls)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, SupertxError> {
        Ok(IERC20::new(token, &self.provider).balanceOf(self.address).call().await?)
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, SupertxError> {
        Ok(IERC20::new(token, &self.provider).decimals().call().await?)
    }
}

/// Encodes `calls` as an ERC-7579 batch `execute` call.
pub fn encode_batch(calls: &[Call]) -> Bytes {
    let executions = calls.iter().map(Call::to_execution).collect::<Vec<_>>();
    IERC7579Account::executeCall {
        mode: BATCH_EXECUTION_MODE,
        executionCalldata: executions.abi_encode().into(),
    }
    .abi_encode()
    .into()
}
