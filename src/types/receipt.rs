//! Execution receipts as reported by the node explorer.

use super::{PaymentInfo, QuotedUserOp};
use alloy::primitives::{Address, B256, Bytes, ChainId};
use serde::{Deserialize, Serialize};

/// Execution status of a single user operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    /// The op is not executed yet.
    Pending,
    /// The op executed successfully.
    Success,
    /// The op failed.
    Failed,
}

/// A quoted user operation and its execution progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOpReceipt {
    /// The quoted op.
    #[serde(flatten)]
    pub op: QuotedUserOp,
    /// Current execution status.
    pub execution_status: ExecutionStatus,
    /// Execution data, the transaction hash once the op is mined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_data: Option<Bytes>,
    /// Execution error, if the op failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_error: Option<String>,
}

impl UserOpReceipt {
    /// Returns the execution error, if the op failed.
    pub fn failure(&self) -> Option<&str> {
        match (&self.execution_error, self.execution_status) {
            (Some(error), _) => Some(error.as_str()),
            (None, ExecutionStatus::Failed) => Some("user op failed"),
            (None, _) => None,
        }
    }

    /// Returns true if the op has not reached a terminal state.
    pub fn is_pending(&self) -> bool {
        self.execution_status == ExecutionStatus::Pending
    }
}

/// Explorer links for one chain of a supertransaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainExplorerLinks {
    /// Chain the links point to.
    pub chain_id: ChainId,
    /// Block explorer link for the transaction that executed the op, if the chain has a known
    /// block explorer.
    pub block_explorer: Option<String>,
    /// User operation scan link.
    pub user_op_scan: String,
}

/// Explorer links for a whole supertransaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerLinks {
    /// Aggregate supertransaction scan link.
    pub supertransaction: String,
    /// Per-chain links, in user op order.
    pub chains: Vec<ChainExplorerLinks>,
}

/// The explorer view of an executed supertransaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReceipt {
    /// Supertransaction hash.
    pub hash: B256,
    /// The node executing the supertransaction.
    pub node: Address,
    /// Node commitment to the quote.
    pub commitment: B256,
    /// Fee payment details.
    pub payment_info: PaymentInfo,
    /// Per-chain user operations and their status.
    pub user_ops: Vec<UserOpReceipt>,
    /// Explorer links, filled once every op succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_links: Option<ExplorerLinks>,
}

impl ExecutionReceipt {
    /// Returns the first failed op's chain and error.
    pub fn first_failure(&self) -> Option<(ChainId, &str)> {
        self.user_ops.iter().find_map(|op| op.failure().map(|error| (op.op.chain_id, error)))
    }

    /// Returns true if any op is still pending.
    pub fn is_pending(&self) -> bool {
        self.user_ops.iter().any(UserOpReceipt::is_pending)
    }
}
