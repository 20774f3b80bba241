//! Bridge routing: covering a shortfall on one chain with funds from the others.

use crate::{
    account::MultichainAccount,
    constants::EFFICIENCY_SCALE,
    error::{BridgeError, SupertxError},
    types::{ChainBalance, Instruction, MultichainToken, UnifiedBalance},
};
use alloy::primitives::{ChainId, U256};
use futures_util::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, instrument, trace, warn};

mod across;
pub use across::{AcrossFee, AcrossPlugin, SuggestedFees};

/// Parameters of a single bridge quote request.
#[derive(Debug, Clone, Copy)]
pub struct BridgeQuoteParams<'a> {
    /// Source chain.
    pub from_chain_id: ChainId,
    /// Destination chain.
    pub to_chain_id: ChainId,
    /// Amount to move, in the token's smallest unit.
    pub amount: U256,
    /// The bridged token.
    pub token: &'a MultichainToken,
    /// The account sending on the source chain and receiving on the destination chain.
    pub account: &'a MultichainAccount,
}

/// A priced way of moving funds from one chain to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRoute {
    /// Source chain.
    pub from_chain_id: ChainId,
    /// Amount taken from the source chain.
    pub amount: U256,
    /// Amount arriving on the destination chain.
    pub received_at_destination: U256,
    /// Identifier of the plugin that quoted the route.
    pub plugin: String,
    /// The instruction executing the bridge on the source chain.
    pub user_op: Instruction,
    /// Expected bridging duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridging_duration_expected_ms: Option<u64>,
}

impl BridgeRoute {
    /// Returns `received_at_destination / amount`, scaled by [`EFFICIENCY_SCALE`].
    pub fn efficiency(&self) -> U256 {
        if self.amount.is_zero() {
            return U256::ZERO;
        }
        self.received_at_destination * U256::from(EFFICIENCY_SCALE) / self.amount
    }
}

/// A provider able to quote bridging a token between two chains.
#[async_trait::async_trait]
pub trait BridgePlugin: Debug + Send + Sync {
    /// Identifier of the plugin.
    fn id(&self) -> &'static str;

    /// Quotes bridging `params.amount` from `params.from_chain_id` to `params.to_chain_id`.
    ///
    /// Returns `None` if the plugin cannot serve the route.
    async fn quote(&self, params: BridgeQuoteParams<'_>)
    -> Result<Option<BridgeRoute>, SupertxError>;
}

/// An amount reserved on a chain to pay the supertransaction fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeReservation {
    /// Chain the fee is paid on.
    pub chain_id: ChainId,
    /// Reserved amount.
    pub amount: U256,
}

/// A request to make `amount` available on `to_chain_id`.
#[derive(Debug, Clone, Copy)]
pub struct BridgeRequest<'a> {
    /// Destination chain.
    pub to_chain_id: ChainId,
    /// Amount that must be available on the destination chain.
    pub amount: U256,
    /// Freshly aggregated balance of the bridged token.
    pub unified_balance: &'a UnifiedBalance,
    /// Bridge plugins to query, in priority order.
    pub plugins: &'a [Arc<dyn BridgePlugin>],
    /// Fee amount that must not be bridged away.
    pub fee_reservation: Option<FeeReservation>,
}

/// A route consumed by the router and the share of it that was used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumedRoute {
    /// The quoted route.
    pub route: BridgeRoute,
    /// Amount taken from the route's source chain.
    pub amount_taken: U256,
    /// Amount credited on the destination chain for `amount_taken`.
    pub received: U256,
}

/// Metadata of a bridging plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgingMeta {
    /// Destination balance plus everything bridged in.
    pub total_available_on_destination: U256,
    /// Consumed routes, in consumption order.
    pub bridging_instructions: Vec<ConsumedRoute>,
}

/// Instructions covering a destination shortfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgingInstructions {
    /// Bridge instructions, one per consumed route.
    pub instructions: Vec<Instruction>,
    /// Plan metadata.
    pub meta: BridgingMeta,
}

/// Builds the bridge instructions needed to have `request.amount` on the destination chain.
///
/// Routes are ranked by efficiency and consumed greedily; a route is never revisited once the next
/// one is taken. Nothing is bridged if the destination already holds enough.
#[instrument(skip_all, fields(to_chain_id = request.to_chain_id, amount = %request.amount))]
pub async fn build_bridge_instructions(
    account: &MultichainAccount,
    request: BridgeRequest<'_>,
) -> Result<BridgingInstructions, SupertxError> {
    let BridgeRequest { to_chain_id, amount, unified_balance, plugins, fee_reservation } = request;

    let destination_balance =
        reserve_fee(to_chain_id, unified_balance.balance_on(to_chain_id), fee_reservation);

    if destination_balance >= amount {
        debug!(%destination_balance, "Destination balance covers the amount");
        return Ok(BridgingInstructions {
            instructions: vec![],
            meta: BridgingMeta {
                total_available_on_destination: destination_balance,
                bridging_instructions: vec![],
            },
        });
    }

    let amount_to_bridge = amount - destination_balance;
    let sources = source_balances(to_chain_id, &unified_balance.breakdown, fee_reservation);

    let quotes = sources.iter().flat_map(|source| {
        plugins.iter().map(move |plugin| {
            plugin.quote(BridgeQuoteParams {
                from_chain_id: source.chain_id,
                to_chain_id,
                amount: source.balance,
                token: &unified_balance.token,
                account,
            })
        })
    });
    let quoted = try_join_all(quotes).await?;
    let unsupported = quoted.iter().filter(|route| route.is_none()).count();
    if unsupported > 0 {
        warn!(unsupported, "Dropped unsupported bridge routes");
    }
    let routes = quoted.into_iter().flatten().collect::<Vec<_>>();
    trace!(?routes, "Quoted bridge routes");

    let (consumed, total_bridged, remaining) = consume_routes(routes, amount_to_bridge);

    if !remaining.is_zero() {
        return Err(BridgeError::InsufficientBridgeLiquidity {
            required: amount_to_bridge,
            available: total_bridged,
            shortfall: amount_to_bridge.saturating_sub(total_bridged),
        }
        .into());
    }

    debug!(routes = consumed.len(), %total_bridged, "Built bridge instructions");

    Ok(BridgingInstructions {
        instructions: consumed.iter().map(|consumed| consumed.route.user_op.clone()).collect(),
        meta: BridgingMeta {
            total_available_on_destination: destination_balance + total_bridged,
            bridging_instructions: consumed,
        },
    })
}

/// Subtracts the fee reservation from `balance` if `chain_id` is the fee chain.
fn reserve_fee(chain_id: ChainId, balance: U256, fee_reservation: Option<FeeReservation>) -> U256 {
    match fee_reservation {
        Some(fee) if fee.chain_id == chain_id => balance.saturating_sub(fee.amount),
        _ => balance,
    }
}

/// Returns the non-zero balances available for bridging to `to_chain_id`.
fn source_balances(
    to_chain_id: ChainId,
    breakdown: &[ChainBalance],
    fee_reservation: Option<FeeReservation>,
) -> Vec<ChainBalance> {
    breakdown
        .iter()
        .filter(|entry| entry.chain_id != to_chain_id)
        .map(|entry| ChainBalance {
            balance: reserve_fee(entry.chain_id, entry.balance, fee_reservation),
            ..*entry
        })
        .filter(|entry| !entry.balance.is_zero())
        .collect()
}

/// Greedily consumes the most efficient routes until `amount_to_bridge` is covered.
///
/// Returns the consumed routes, the total amount credited on the destination chain and the amount
/// left uncovered.
fn consume_routes(
    mut routes: Vec<BridgeRoute>,
    amount_to_bridge: U256,
) -> (Vec<ConsumedRoute>, U256, U256) {
    routes.retain(|route| !route.amount.is_zero());
    // stable, so equally efficient routes keep their quoting order
    routes.sort_by_key(|route| std::cmp::Reverse(route.efficiency()));

    let mut remaining = amount_to_bridge;
    let mut total_bridged = U256::ZERO;
    let mut consumed = Vec::new();

    for route in routes {
        if remaining.is_zero() {
            break;
        }

        let amount_taken = remaining.min(route.amount);
        let received = route.received_at_destination * amount_taken / route.amount;

        total_bridged += received;
        remaining -= amount_taken;
        consumed.push(ConsumedRoute { route, amount_taken, received });
    }

    (consumed, total_bridged, remaining)
}
