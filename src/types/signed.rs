use super::SuperTransactionQuote;
use alloy::{
    primitives::{Address, B256, BlockNumber, Bytes, ChainId},
    rpc::types::TransactionReceipt,
};
use serde::{Deserialize, Serialize};

/// Receipt of a fusion trigger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerReceipt {
    /// Chain the trigger was sent on.
    pub chain_id: ChainId,
    /// Hash of the trigger transaction.
    pub transaction_hash: B256,
    /// Block the trigger was included in.
    pub block_number: Option<BlockNumber>,
    /// Sender of the trigger.
    pub from: Address,
    /// Recipient of the trigger.
    pub to: Option<Address>,
    /// Gas used by the trigger.
    pub gas_used: u64,
    /// Whether the trigger succeeded.
    pub status: bool,
}

impl TriggerReceipt {
    /// Creates a [`TriggerReceipt`] from an RPC transaction receipt.
    pub fn from_rpc(chain_id: ChainId, receipt: &TransactionReceipt) -> Self {
        Self {
            chain_id,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            from: receipt.from,
            to: receipt.to,
            gas_used: receipt.gas_used,
            status: receipt.status(),
        }
    }
}

/// A quote signed by the account owner, ready for execution.
///
/// Consumed exactly once by execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedQuote {
    #[serde(flatten)]
    quote: SuperTransactionQuote,
    signature: Bytes,
    #[serde(skip)]
    trigger_receipt: Option<TriggerReceipt>,
}

impl SignedQuote {
    /// Creates a signed quote. Does not verify the signature.
    pub fn new(quote: SuperTransactionQuote, signature: Bytes) -> Self {
        Self { quote, signature, trigger_receipt: None }
    }

    /// Attaches the receipt of the fusion trigger transaction.
    pub fn with_trigger_receipt(mut self, receipt: TriggerReceipt) -> Self {
        self.trigger_receipt = Some(receipt);
        self
    }

    /// Returns a reference to the quote.
    pub const fn quote(&self) -> &SuperTransactionQuote {
        &self.quote
    }

    /// Returns the mode-prefixed signature.
    pub const fn signature(&self) -> &Bytes {
        &self.signature
    }

    /// Returns the fusion trigger receipt, if the quote was signed in a fusion mode.
    pub const fn trigger_receipt(&self) -> Option<&TriggerReceipt> {
        self.trigger_receipt.as_ref()
    }

    /// Returns the supertransaction hash.
    pub const fn hash(&self) -> B256 {
        self.quote.hash
    }
}
