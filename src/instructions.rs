//! Composing the per-chain instructions of a supertransaction.
//!
//! Actions are applied left to right onto an accumulator. Instructions are only ever appended,
//! never removed or reordered.

use crate::{
    account::MultichainAccount,
    balance::get_unified_balance,
    bridge::{BridgePlugin, BridgeRequest, FeeReservation, build_bridge_instructions},
    error::SupertxError,
    types::{Instruction, MultichainToken},
};
use alloy::primitives::{ChainId, U256};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Make `amount` of `token` available on `to_chain_id`, bridging from other chains if needed.
#[derive(Debug, Clone)]
pub struct BridgeIntent {
    /// The token to gather.
    pub token: MultichainToken,
    /// Amount required on the destination chain.
    pub amount: U256,
    /// Destination chain.
    pub to_chain_id: ChainId,
    /// Fee amount that must not be bridged away.
    pub fee_reservation: Option<FeeReservation>,
}

/// A single step of instruction building.
#[derive(Debug, Clone)]
pub enum BuildAction {
    /// Append literal instructions verbatim.
    Default(Vec<Instruction>),
    /// Append whatever the bridge router produces for the intent.
    Intent(BridgeIntent),
}

impl From<Instruction> for BuildAction {
    fn from(instruction: Instruction) -> Self {
        Self::Default(vec![instruction])
    }
}

impl From<BridgeIntent> for BuildAction {
    fn from(intent: BridgeIntent) -> Self {
        Self::Intent(intent)
    }
}

/// Builds instruction lists for one account.
#[derive(Debug, Clone, Copy)]
pub struct InstructionBuilder<'a> {
    account: &'a MultichainAccount,
    plugins: &'a [Arc<dyn BridgePlugin>],
}

impl<'a> InstructionBuilder<'a> {
    /// Creates a builder resolving intents with the given bridge plugins.
    pub fn new(account: &'a MultichainAccount, plugins: &'a [Arc<dyn BridgePlugin>]) -> Self {
        Self { account, plugins }
    }

    /// Applies `action` to `instructions`.
    pub async fn build(
        &self,
        mut instructions: Vec<Instruction>,
        action: BuildAction,
    ) -> Result<Vec<Instruction>, SupertxError> {
        match action {
            BuildAction::Default(literal) => instructions.extend(literal),
            BuildAction::Intent(intent) => instructions.extend(self.resolve(intent).await?),
        }
        Ok(instructions)
    }

    /// Applies every action in order, starting from an empty list.
    pub async fn build_all(
        &self,
        actions: impl IntoIterator<Item = BuildAction>,
    ) -> Result<Vec<Instruction>, SupertxError> {
        let mut instructions = Vec::new();
        for action in actions {
            instructions = self.build(instructions, action).await?;
        }
        Ok(instructions)
    }

    #[instrument(skip_all, fields(token = %intent.token.symbol, to_chain_id = intent.to_chain_id))]
    async fn resolve(&self, intent: BridgeIntent) -> Result<Vec<Instruction>, SupertxError> {
        let unified_balance = get_unified_balance(self.account, &intent.token).await?;
        let bridging = build_bridge_instructions(
            self.account,
            BridgeRequest {
                to_chain_id: intent.to_chain_id,
                amount: intent.amount,
                unified_balance: &unified_balance,
                plugins: self.plugins,
                fee_reservation: intent.fee_reservation,
            },
        )
        .await?;

        debug!(
            instructions = bridging.instructions.len(),
            available = %bridging.meta.total_available_on_destination,
            "Resolved bridge intent"
        );
        Ok(bridging.instructions)
    }
}
