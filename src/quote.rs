//! Assembling quote requests.

use crate::{
    account::{Deployment, MultichainAccount},
    error::{QuoteError, SupertxError},
    node::MeeApi,
    nonce::{NonceReservation, NonceReservations},
    types::{
        Instruction, PaymentInfoRequest, QuoteRequest, SuperTransactionQuote, UserOpRequest,
    },
};
use alloy::primitives::{Address, Bytes, ChainId, U256};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::{ops::Deref, sync::Arc};
use tokio::try_join;
use tracing::{debug, instrument};

/// The token and chain the supertransaction fee is paid with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeToken {
    /// Fee token address on `chain_id`.
    pub address: Address,
    /// The chain the fee is paid on.
    pub chain_id: ChainId,
}

/// The nonces a quote request embeds, one per chain.
///
/// Dropping it releases the nonces.
#[derive(Debug, Default)]
#[must_use = "the nonces are released when dropped"]
pub struct QuoteNonces(Vec<NonceReservation>);

impl QuoteNonces {
    /// Returns the nonce reserved on `chain_id`.
    pub fn nonce_on(&self, chain_id: ChainId) -> Option<U256> {
        self.0.iter().find(|held| held.chain_id() == chain_id).map(NonceReservation::nonce)
    }

    /// Keeps every nonce held until the on-chain nonces pass them.
    pub fn keep(self) {
        self.0.into_iter().for_each(NonceReservation::keep);
    }
}

/// A quote together with the nonces it embeds.
///
/// Dropping a pending quote without executing it releases its nonces.
#[derive(Debug)]
pub struct PendingQuote {
    quote: SuperTransactionQuote,
    nonces: QuoteNonces,
}

impl PendingQuote {
    /// Creates a new pending quote.
    pub fn new(quote: SuperTransactionQuote, nonces: QuoteNonces) -> Self {
        Self { quote, nonces }
    }

    /// Returns the quote.
    pub const fn quote(&self) -> &SuperTransactionQuote {
        &self.quote
    }

    /// Splits the quote from its nonces.
    pub fn into_parts(self) -> (SuperTransactionQuote, QuoteNonces) {
        (self.quote, self.nonces)
    }
}

impl Deref for PendingQuote {
    type Target = SuperTransactionQuote;

    fn deref(&self) -> &Self::Target {
        &self.quote
    }
}

/// Builds the `v1/quote` request for `instructions`.
///
/// Every chain gets a single nonce reservation, shared by all user ops on that chain and by the
/// payment info if the fee is paid there.
#[instrument(skip_all, fields(instructions = instructions.len(), fee_chain_id = fee_token.chain_id))]
pub async fn build_quote_request(
    account: &MultichainAccount,
    instructions: &[Instruction],
    fee_token: FeeToken,
    nonces: &NonceReservations,
) -> Result<(QuoteRequest, QuoteNonces), SupertxError> {
    if instructions.is_empty() {
        return Err(QuoteError::EmptyInstructions.into());
    }

    let deployments = instructions
        .iter()
        .map(|instruction| {
            account
                .deployment_on(instruction.chain_id)
                .ok_or(QuoteError::MissingDeployment(instruction.chain_id))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let fee_deployment = account
        .deployment_on(fee_token.chain_id)
        .ok_or(QuoteError::MissingFeeDeployment(fee_token.chain_id))?;

    let reserved = reserve_nonces(deployments.iter().copied().chain([fee_deployment]), nonces).await?;
    let nonce_on = |chain_id: ChainId| reserved.nonce_on(chain_id).unwrap_or_default();

    let user_ops = try_join_all(instructions.iter().zip(&deployments).map(
        |(instruction, deployment)| async move {
            let call_gas_limit = instruction
                .call_gas_limit()
                .ok_or(QuoteError::GasOverflow(instruction.chain_id))?;
            let call_data = deployment.encode_batch(&instruction.calls);
            let init_code = init_code_if_undeployed(deployment.as_ref()).await?;

            Ok::<_, SupertxError>(UserOpRequest {
                sender: deployment.address(),
                call_data,
                call_gas_limit,
                nonce: nonce_on(instruction.chain_id),
                chain_id: instruction.chain_id,
                init_code,
            })
        },
    ))
    .await?;

    let payment_info = PaymentInfoRequest {
        sender: fee_deployment.address(),
        token: fee_token.address,
        chain_id: fee_token.chain_id,
        nonce: nonce_on(fee_token.chain_id),
        init_code: init_code_if_undeployed(fee_deployment.as_ref()).await?,
    };

    debug!(user_ops = user_ops.len(), "Assembled quote request");
    Ok((QuoteRequest { user_ops, payment_info }, reserved))
}

/// Builds the quote request for `instructions` and asks `node` to quote it.
///
/// The returned quote is authoritative and returned as received. Its nonces are released if the
/// node request fails.
pub async fn get_quote(
    node: &dyn MeeApi,
    account: &MultichainAccount,
    instructions: &[Instruction],
    fee_token: FeeToken,
    nonces: &NonceReservations,
) -> Result<PendingQuote, SupertxError> {
    let (request, reserved) = build_quote_request(account, instructions, fee_token, nonces).await?;
    let quote = node.quote(&request).await?;
    debug!(hash = %quote.hash, "Received quote");
    Ok(PendingQuote::new(quote, reserved))
}

/// Reserves one nonce per distinct chain among `deployments`.
async fn reserve_nonces<'a>(
    deployments: impl Iterator<Item = &'a Arc<dyn Deployment>>,
    nonces: &NonceReservations,
) -> Result<QuoteNonces, SupertxError> {
    let mut unique: Vec<&Arc<dyn Deployment>> = Vec::new();
    for deployment in deployments {
        if !unique.iter().any(|seen| seen.chain_id() == deployment.chain_id()) {
            unique.push(deployment);
        }
    }

    let reserved =
        try_join_all(unique.iter().map(|deployment| nonces.reserve(deployment.as_ref()))).await?;
    Ok(QuoteNonces(reserved))
}

/// Returns the account init code if the account is not deployed yet.
async fn init_code_if_undeployed(deployment: &dyn Deployment) -> Result<Option<Bytes>, SupertxError> {
    let (deployed, init_code) = try_join!(deployment.is_deployed(), deployment.init_code())?;
    Ok((!deployed).then_some(init_code))
}
