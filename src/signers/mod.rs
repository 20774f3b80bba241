//! Quote signers.

mod r#dyn;
use alloy::primitives::{B256, Bytes};
pub use r#dyn::DynSigner;

/// Trait for a supertransaction quote signer.
#[async_trait::async_trait]
pub trait QuoteSigner: std::fmt::Debug + Send + Sync {
    /// Signs the raw 32-byte quote hash as an EIP-191 personal message.
    ///
    /// Returns the 65-byte signature.
    async fn sign_quote_hash(&self, quote_hash: B256) -> eyre::Result<Bytes>;
}
