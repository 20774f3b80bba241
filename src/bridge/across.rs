//! Across bridge plugin.

use super::{BridgePlugin, BridgeQuoteParams, BridgeRoute};
use crate::{
    constants::{ACROSS_DEPOSIT_GAS_LIMIT, APPROVE_GAS_LIMIT},
    error::{BridgeError, SupertxError, extract_error_message},
    types::{Call, IERC20, Instruction},
};
use alloy::{
    primitives::{Address, Bytes, ChainId, U256},
    sol,
    sol_types::SolCall,
};
use serde::Deserialize;
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use tracing::{debug, instrument, trace};
use url::Url;

sol! {
    /// Across V3 spoke pool.
    interface IAcrossSpokePool {
        function depositV3(
            address depositor,
            address recipient,
            address inputToken,
            address outputToken,
            uint256 inputAmount,
            uint256 outputAmount,
            uint256 destinationChainId,
            address exclusiveRelayer,
            uint32 quoteTimestamp,
            uint32 fillDeadline,
            uint32 exclusivityDeadline,
            bytes calldata message
        ) external payable;
    }
}

/// A fee component returned by the Across API.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AcrossFee {
    /// Fee as a fraction of the input amount, scaled by 1e18.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub pct: U256,
    /// Absolute fee in input token units.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub total: U256,
}

/// Response of `GET suggested-fees`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFees {
    /// Total fee taken by the relayer.
    pub total_relay_fee: AcrossFee,
    /// Timestamp the quote is valid for.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub timestamp: u32,
    /// Whether the amount is below the minimum the relayers accept.
    #[serde(default)]
    pub is_amount_too_low: bool,
    /// Spoke pool on the origin chain.
    pub spoke_pool_address: Address,
    /// Relayer with exclusive fill rights, zero if none.
    #[serde(default)]
    pub exclusive_relayer: Address,
    /// End of the exclusivity window.
    #[serde(default)]
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub exclusivity_deadline: u32,
    /// Deadline for the deposit to be filled.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub fill_deadline: u32,
    /// Expected time until the deposit is filled.
    #[serde(default)]
    #[serde_as(as = "Option<PickFirst<(DisplayFromStr, _)>>")]
    pub expected_fill_time_sec: Option<u64>,
}

/// A [`BridgePlugin`] quoting routes through the Across API.
#[derive(Debug, Clone)]
pub struct AcrossPlugin {
    client: reqwest::Client,
    api_url: Url,
}

impl AcrossPlugin {
    /// Plugin identifier.
    pub const ID: &'static str = "across";

    /// Creates a new plugin talking to the given API.
    pub fn new(api_url: Url) -> Self {
        Self { client: reqwest::Client::new(), api_url }
    }

    /// Sets the HTTP client used for requests.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Fetches the suggested fees for bridging `amount` of `input_token`.
    async fn suggested_fees(
        &self,
        input_token: Address,
        output_token: Address,
        origin_chain_id: ChainId,
        destination_chain_id: ChainId,
        amount: U256,
    ) -> Result<SuggestedFees, SupertxError> {
        let url = self.api_url.join("suggested-fees").map_err(SupertxError::internal)?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("inputToken", input_token.to_string()),
                ("outputToken", output_token.to_string()),
                ("originChainId", origin_chain_id.to_string()),
                ("destinationChainId", destination_chain_id.to_string()),
                ("amount", amount.to_string()),
            ])
            .send()
            .await
            .map_err(|err| provider_error(err.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| provider_error(err.to_string()))?;
        trace!(%status, %body, "Across suggested fees");

        if !status.is_success() {
            return Err(provider_error(extract_error_message(status, &body)));
        }

        serde_json::from_str(&body).map_err(|err| provider_error(err.to_string()))
    }
}

#[async_trait::async_trait]
impl BridgePlugin for AcrossPlugin {
    fn id(&self) -> &'static str {
        Self::ID
    }

    #[instrument(skip_all, fields(from = params.from_chain_id, to = params.to_chain_id))]
    async fn quote(
        &self,
        params: BridgeQuoteParams<'_>,
    ) -> Result<Option<BridgeRoute>, SupertxError> {
        let Some(endpoints) = DepositEndpoints::resolve(&params) else {
            debug!("Token or account missing on one side of the route");
            return Ok(None);
        };

        let fees = self
            .suggested_fees(
                endpoints.input_token,
                endpoints.output_token,
                params.from_chain_id,
                params.to_chain_id,
                params.amount,
            )
            .await?;

        Ok(route_from_fees(&params, &endpoints, &fees))
    }
}

/// Token and account addresses on both sides of a deposit.
#[derive(Debug, Clone, Copy)]
struct DepositEndpoints {
    input_token: Address,
    output_token: Address,
    depositor: Address,
    recipient: Address,
}

impl DepositEndpoints {
    fn resolve(params: &BridgeQuoteParams<'_>) -> Option<Self> {
        Some(Self {
            input_token: params.token.address_on(params.from_chain_id)?,
            output_token: params.token.address_on(params.to_chain_id)?,
            depositor: params.account.address_on(params.from_chain_id)?,
            recipient: params.account.address_on(params.to_chain_id)?,
        })
    }
}

/// Builds the approve + deposit route for a fee quote.
///
/// Returns `None` if the amount is too low or the whole amount is eaten by fees.
fn route_from_fees(
    params: &BridgeQuoteParams<'_>,
    endpoints: &DepositEndpoints,
    fees: &SuggestedFees,
) -> Option<BridgeRoute> {
    if fees.is_amount_too_low {
        debug!(amount = %params.amount, "Amount too low for Across");
        return None;
    }

    let output_amount = params.amount.checked_sub(fees.total_relay_fee.total)?;
    if output_amount.is_zero() {
        return None;
    }

    let approve = IERC20::approveCall { spender: fees.spoke_pool_address, amount: params.amount };
    let deposit = IAcrossSpokePool::depositV3Call {
        depositor: endpoints.depositor,
        recipient: endpoints.recipient,
        inputToken: endpoints.input_token,
        outputToken: endpoints.output_token,
        inputAmount: params.amount,
        outputAmount: output_amount,
        destinationChainId: U256::from(params.to_chain_id),
        exclusiveRelayer: fees.exclusive_relayer,
        quoteTimestamp: fees.timestamp,
        fillDeadline: fees.fill_deadline,
        exclusivityDeadline: fees.exclusivity_deadline,
        message: Bytes::new(),
    };

    Some(BridgeRoute {
        from_chain_id: params.from_chain_id,
        amount: params.amount,
        received_at_destination: output_amount,
        plugin: AcrossPlugin::ID.to_string(),
        user_op: Instruction::new(
            params.from_chain_id,
            vec![
                Call::new(endpoints.input_token, approve.abi_encode(), APPROVE_GAS_LIMIT),
                Call::new(fees.spoke_pool_address, deposit.abi_encode(), ACROSS_DEPOSIT_GAS_LIMIT),
            ],
        ),
        bridging_duration_expected_ms: fees
            .expected_fill_time_sec
            .map(|secs| secs.saturating_mul(1000)),
    })
}

fn provider_error(message: String) -> SupertxError {
    BridgeError::Provider { plugin: AcrossPlugin::ID, message }.into()
}
