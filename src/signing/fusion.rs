//! Fusion trigger transactions.

use super::TriggerCall;
use crate::{
    constants::FUSION_EMPTY_CALLDATA_MARKER,
    error::SupertxError,
    signers::DynSigner,
    types::TriggerReceipt,
};
use alloy::{
    consensus::{SignableTransaction, TxEip1559, TxEnvelope},
    primitives::{B256, Bytes, ChainId},
    providers::{DynProvider, Provider},
    rpc::types::TransactionRequest,
};
use std::fmt::Debug;
use tracing::{debug, instrument};

/// Returns the calldata of a trigger transaction carrying `quote_hash`.
///
/// Empty calldata is replaced with [`FUSION_EMPTY_CALLDATA_MARKER`] before the hash is appended.
pub fn trigger_calldata(data: &Bytes, quote_hash: B256) -> Bytes {
    let prefix = if data.is_empty() { FUSION_EMPTY_CALLDATA_MARKER.as_slice() } else { data.as_ref() };
    [prefix, quote_hash.as_slice()].concat().into()
}

/// Sends fusion trigger transactions on one chain.
#[async_trait::async_trait]
pub trait TriggerSender: Debug + Send + Sync {
    /// The chain triggers are sent on.
    fn chain_id(&self) -> ChainId;

    /// Sends `call` and waits for its receipt.
    async fn send_trigger(&self, call: TriggerCall) -> Result<TriggerReceipt, SupertxError>;
}

/// A [`TriggerSender`] signing EIP-1559 transactions with a local signer.
#[derive(Debug, Clone)]
pub struct ProviderTriggerSender {
    chain_id: ChainId,
    provider: DynProvider,
    signer: DynSigner,
}

impl ProviderTriggerSender {
    /// Creates a new sender.
    pub fn new(chain_id: ChainId, provider: DynProvider, signer: DynSigner) -> Self {
        Self { chain_id, provider, signer }
    }
}

#[async_trait::async_trait]
impl TriggerSender for ProviderTriggerSender {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    #[instrument(skip_all, fields(chain_id = self.chain_id, to = %call.to))]
    async fn send_trigger(&self, call: TriggerCall) -> Result<TriggerReceipt, SupertxError> {
        let from = self.signer.address();
        let nonce = self.provider.get_transaction_count(from).await?;
        let fees = self.provider.estimate_eip1559_fees().await?;

        let gas_limit = self
            .provider
            .estimate_gas(
                TransactionRequest::default()
                    .to(call.to)
                    .input(call.data.clone().into())
                    .value(call.value)
                    .from(from),
            )
            .await?;

        let mut tx = TxEip1559 {
            chain_id: self.chain_id,
            nonce,
            gas_limit,
            max_fee_per_gas: fees.max_fee_per_gas,
            max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
            to: call.to.into(),
            input: call.data,
            value: call.value,
            ..Default::default()
        };

        let signature =
            self.signer.sign_transaction(&mut tx).await.map_err(SupertxError::internal)?;
        let tx = TxEnvelope::Eip1559(tx.into_signed(signature));

        let receipt = self
            .provider
            .send_tx_envelope(tx)
            .await?
            .get_receipt()
            .await
            .map_err(SupertxError::internal)?;
        debug!(tx_hash = %receipt.transaction_hash, status = receipt.status(), "Trigger mined");

        Ok(TriggerReceipt::from_rpc(self.chain_id, &receipt))
    }
}
