//! Quote request and response types exchanged with the execution node.

use alloy::primitives::{Address, B256, Bytes, ChainId, U256};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};

/// A per-chain user operation sent to the node for quoting.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOpRequest {
    /// The smart account on `chain_id`.
    pub sender: Address,
    /// The batch-encoded calls of the instruction.
    pub call_data: Bytes,
    /// Sum of the instruction's call gas limits.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub call_gas_limit: u64,
    /// The account nonce on `chain_id`.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub nonce: U256,
    /// The chain the op executes on.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub chain_id: ChainId,
    /// Account init code, only present if the account is not deployed yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
}

/// Fee payment selection sent to the node for quoting.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfoRequest {
    /// The smart account paying the fee.
    pub sender: Address,
    /// The fee token.
    pub token: Address,
    /// The chain the fee is paid on.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub chain_id: ChainId,
    /// The account nonce on the fee chain.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub nonce: U256,
    /// Account init code, only present if the account is not deployed on the fee chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
}

/// Body of `POST v1/quote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// One op per instruction, in instruction order.
    pub user_ops: Vec<UserOpRequest>,
    /// Fee payment selection.
    pub payment_info: PaymentInfoRequest,
}

/// Fee payment details filled in by the node.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// The smart account paying the fee.
    pub sender: Address,
    /// The fee token.
    pub token: Address,
    /// The chain the fee is paid on.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub chain_id: ChainId,
    /// The account nonce on the fee chain.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub nonce: U256,
    /// Account init code, if the account is not deployed on the fee chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
    /// Fee in whole token units, as a decimal string.
    #[serde(default)]
    pub token_amount: String,
    /// Fee in the token's smallest unit.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    #[serde(default)]
    pub token_wei_amount: U256,
    /// Fee value in USD, as a decimal string.
    #[serde(default)]
    pub token_value: String,
}

/// A filled ERC-4337 user operation.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOp {
    /// The smart account.
    pub sender: Address,
    /// Account nonce.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub nonce: U256,
    /// Account init code.
    #[serde(default)]
    pub init_code: Bytes,
    /// Calldata executed by the account.
    pub call_data: Bytes,
    /// Gas available to the account call.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub call_gas_limit: U256,
    /// Gas available to validation.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub verification_gas_limit: U256,
    /// Gas paid for bundling overhead.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub pre_verification_gas: U256,
    /// Maximum fee per gas.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub max_fee_per_gas: U256,
    /// Maximum priority fee per gas.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub max_priority_fee_per_gas: U256,
    /// Paymaster address and data.
    #[serde(default)]
    pub paymaster_and_data: Bytes,
}

/// A per-chain user operation as quoted by the node.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedUserOp {
    /// The filled user operation.
    pub user_op: UserOp,
    /// ERC-4337 user operation hash.
    pub user_op_hash: B256,
    /// Hash of the user op including its validity window.
    pub mee_user_op_hash: B256,
    /// Earliest UNIX timestamp the op may execute at.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub lower_bound_timestamp: u64,
    /// Latest UNIX timestamp the op may execute at.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub upper_bound_timestamp: u64,
    /// Gas limit covering validation and execution.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub max_gas_limit: U256,
    /// Maximum fee per gas the node commits to.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub max_fee_per_gas: U256,
    /// Chain the op executes on.
    #[serde_as(as = "PickFirst<(DisplayFromStr, _)>")]
    pub chain_id: ChainId,
}

/// The node's authoritative description of a supertransaction.
///
/// The `hash` is never recomputed locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuperTransactionQuote {
    /// Supertransaction hash; this is what gets signed.
    pub hash: B256,
    /// The node that issued the quote.
    pub node: Address,
    /// Node commitment to the quote.
    pub commitment: B256,
    /// Filled fee payment details.
    pub payment_info: PaymentInfo,
    /// Quoted user operations, in instruction order.
    pub user_ops: Vec<QuotedUserOp>,
}
