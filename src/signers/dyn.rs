//! Multi-signer abstraction.
//!
//! A signer abstracted over multiple underlying signers.
use super::QuoteSigner;
use alloy::{
    network::{FullSigner, TxSigner},
    primitives::{Address, B256, Bytes, Signature},
    signers::{
        k256::ecdsa::SigningKey,
        local::{
            PrivateKeySigner,
            coins_bip39::{English, Mnemonic},
        },
    },
};
use std::{fmt, ops::Deref, str::FromStr, sync::Arc};

/// Abstraction over local signers.
#[derive(Clone)]
pub struct DynSigner(pub Arc<dyn FullSigner<Signature> + Send + Sync>);

impl fmt::Debug for DynSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynSigner").field(&self.address()).finish()
    }
}

impl DynSigner {
    /// Derives the signer at `index` from a mnemonic.
    pub fn from_mnemonic(phrase: &str, index: u32) -> eyre::Result<Self> {
        let mnemonic = Mnemonic::<English>::new_from_phrase(phrase)?;
        let key = mnemonic.derive_key(format!("m/44'/60'/0'/0/{index}").as_str(), None)?;
        let key: &SigningKey = key.as_ref();
        Ok(Self(Arc::new(PrivateKeySigner::from_signing_key(key.clone()))))
    }

    /// Load a private key.
    pub fn from_signing_key(key: &str) -> eyre::Result<Self> {
        Ok(Self(Arc::new(PrivateKeySigner::from_str(key)?)))
    }

    /// Returns the signer's Ethereum Address.
    pub fn address(&self) -> Address {
        TxSigner::address(&self.0)
    }
}

impl Deref for DynSigner {
    type Target = dyn FullSigner<Signature> + Send + Sync;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[async_trait::async_trait]
impl QuoteSigner for DynSigner {
    async fn sign_quote_hash(&self, quote_hash: B256) -> eyre::Result<Bytes> {
        Ok(self.sign_message(quote_hash.as_slice()).await?.as_bytes().into())
    }
}
