//! Signing supertransaction quotes.
//!
//! Every signature sent to the node starts with a one byte [`SignatureTag`] telling the executor
//! how to interpret the rest of the payload.

use crate::{
    error::{ExecutionError, SupertxError},
    signers::QuoteSigner,
    types::{SignedQuote, SuperTransactionQuote},
};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, U256},
    sol_types::SolValue,
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, instrument};

mod fusion;
pub use fusion::{ProviderTriggerSender, TriggerSender, trigger_calldata};

/// Discriminator prefixed to every quote signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignatureTag {
    /// Off-chain signature over the quote hash.
    Direct = 0x00,
    /// Quote hash embedded in an on-chain transaction.
    FusionOnchainTx = 0x01,
    /// Quote hash bound through an ERC-20 permit.
    FusionErc20Permit = 0x02,
}

impl SignatureTag {
    /// Prefixes `payload` with the tag.
    pub fn prefix(self, payload: &[u8]) -> Bytes {
        let mut out = Vec::with_capacity(payload.len() + 1);
        out.push(self as u8);
        out.extend_from_slice(payload);
        out.into()
    }
}

/// A transaction submitted by the user to authorize a quote on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerCall {
    /// The chain the trigger is sent on.
    pub chain_id: ChainId,
    /// The call target.
    pub to: Address,
    /// Native value sent with the trigger.
    pub value: U256,
    /// Trigger calldata, before the quote hash is appended.
    pub data: Bytes,
}

/// How a quote is authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SignMode {
    /// Sign the quote hash directly.
    #[default]
    DirectToMee,
    /// Send a trigger transaction carrying the quote hash.
    FusionWithOnchainTx(TriggerCall),
    /// Use a prebuilt ERC-20 permit payload.
    FusionWithErc20Permit(Bytes),
}

/// Signs quotes in any [`SignMode`].
#[derive(Debug, Clone)]
pub struct SigningCoordinator {
    signer: Arc<dyn QuoteSigner>,
    triggers: HashMap<ChainId, Arc<dyn TriggerSender>>,
}

impl SigningCoordinator {
    /// Creates a coordinator signing with `signer`.
    pub fn new(signer: Arc<dyn QuoteSigner>) -> Self {
        Self { signer, triggers: HashMap::new() }
    }

    /// Registers the sender used for fusion triggers on its chain.
    pub fn with_trigger_sender(mut self, sender: Arc<dyn TriggerSender>) -> Self {
        self.triggers.insert(sender.chain_id(), sender);
        self
    }

    /// Signs `quote` in the given mode.
    #[instrument(skip_all, fields(hash = %quote.hash))]
    pub async fn sign(
        &self,
        quote: SuperTransactionQuote,
        mode: SignMode,
    ) -> Result<SignedQuote, SupertxError> {
        match mode {
            SignMode::DirectToMee => {
                let signature =
                    self.signer.sign_quote_hash(quote.hash).await.map_err(ExecutionError::Signing)?;
                debug!("Signed quote directly");
                Ok(SignedQuote::new(quote, SignatureTag::Direct.prefix(&signature)))
            }
            SignMode::FusionWithOnchainTx(trigger) => {
                let sender = self
                    .triggers
                    .get(&trigger.chain_id)
                    .ok_or(ExecutionError::MissingTriggerChain(trigger.chain_id))?;

                let data = trigger_calldata(&trigger.data, quote.hash);
                let receipt = sender.send_trigger(TriggerCall { data, ..trigger }).await?;
                if !receipt.status {
                    return Err(ExecutionError::TriggerReverted(receipt.transaction_hash).into());
                }
                debug!(tx_hash = %receipt.transaction_hash, "Fusion trigger included");

                let signature = fusion_signature(receipt.transaction_hash, receipt.chain_id);
                Ok(SignedQuote::new(quote, signature).with_trigger_receipt(receipt))
            }
            SignMode::FusionWithErc20Permit(payload) => {
                Ok(SignedQuote::new(quote, SignatureTag::FusionErc20Permit.prefix(&payload)))
            }
        }
    }
}

/// Encodes the signature of an on-chain fusion trigger: `0x01 ∥ abi.encode(txHash, chainId)`.
pub fn fusion_signature(tx_hash: B256, chain_id: ChainId) -> Bytes {
    SignatureTag::FusionOnchainTx.prefix(&(tx_hash, U256::from(chain_id)).abi_encode())
}
