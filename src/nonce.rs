//! Nonce reservations.
//!
//! Quotes assembled concurrently for the same account and chain must not embed the same nonce.
//! [`NonceReservations`] hands out the lowest account nonce that is at least the on-chain nonce and
//! not held by another live reservation.
//!
//! A [`NonceReservation`] holds its nonce until it is dropped. Dropping it without calling
//! [`NonceReservation::keep`] gives the nonce back, so quotes that are abandoned or fail before
//! execution do not push later quotes past the on-chain nonce. Kept nonces are forgotten once the
//! on-chain nonce moves past them.

use crate::{account::Deployment, error::SupertxError};
use alloy::primitives::{Address, ChainId, U256};
use dashmap::DashMap;
use std::{collections::BTreeSet, sync::Arc};
use tracing::trace;

/// Hands out smart account nonces across multiple chains and accounts.
#[derive(Clone, Debug, Default)]
pub struct NonceReservations {
    held: Arc<DashMap<(ChainId, Address), BTreeSet<U256>>>,
}

impl NonceReservations {
    /// Reserves the next free nonce of `deployment`.
    pub async fn reserve(&self, deployment: &dyn Deployment) -> Result<NonceReservation, SupertxError> {
        let key = (deployment.chain_id(), deployment.address());
        let onchain = deployment.nonce().await?;

        // No await point while the shard is locked.
        let nonce = {
            let mut held = self.held.entry(key).or_default();
            held.retain(|nonce| *nonce >= onchain);

            let mut nonce = onchain;
            while held.contains(&nonce) {
                nonce += U256::from(1);
            }
            held.insert(nonce);
            nonce
        };

        trace!(chain_id = key.0, sender = %key.1, %onchain, %nonce, "Reserved nonce");
        Ok(NonceReservation { owner: self.clone(), key, nonce, kept: false })
    }

    /// Returns the nonces currently held for `sender` on `chain_id`, in ascending order.
    pub fn held(&self, chain_id: ChainId, sender: Address) -> Vec<U256> {
        self.held
            .get(&(chain_id, sender))
            .map(|held| held.iter().copied().collect())
            .unwrap_or_default()
    }

    fn release(&self, key: (ChainId, Address), nonce: U256) {
        if let Some(mut held) = self.held.get_mut(&key) {
            held.remove(&nonce);
        }
    }
}

/// A nonce held for one (chain, sender) pair.
///
/// The nonce is released on drop unless [`NonceReservation::keep`] was called.
#[derive(Debug)]
#[must_use = "the nonce is released when the reservation is dropped"]
pub struct NonceReservation {
    owner: NonceReservations,
    key: (ChainId, Address),
    nonce: U256,
    kept: bool,
}

impl NonceReservation {
    /// The reserved nonce.
    pub const fn nonce(&self) -> U256 {
        self.nonce
    }

    /// The chain the nonce is reserved on.
    pub const fn chain_id(&self) -> ChainId {
        self.key.0
    }

    /// The account the nonce is reserved for.
    pub const fn sender(&self) -> Address {
        self.key.1
    }

    /// Keeps the nonce held after the reservation is dropped, until the on-chain nonce passes it.
    ///
    /// Called once the nonce was submitted for execution.
    pub fn keep(mut self) {
        self.kept = true;
    }
}

impl Drop for NonceReservation {
    fn drop(&mut self) {
        if !self.kept {
            trace!(chain_id = self.key.0, sender = %self.key.1, nonce = %self.nonce, "Released nonce");
            self.owner.release(self.key, self.nonce);
        }
    }
}
