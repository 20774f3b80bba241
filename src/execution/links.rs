use crate::{
    constants::{DEFAULT_SUPERTX_SCAN_URL, DEFAULT_USER_OP_SCAN_URL},
    types::{ChainExplorerLinks, ExecutionReceipt, ExplorerLinks, UserOpReceipt},
};
use alloy::primitives::B256;
use alloy_chains::Chain;
use serde::{Deserialize, Serialize};

/// Base URLs explorer links are built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerUrls {
    /// Supertransaction scan base URL, the hash is appended.
    pub supertransaction_scan: String,
    /// User op scan base URL, the user op hash is appended.
    pub user_op_scan: String,
}

impl Default for ExplorerUrls {
    fn default() -> Self {
        Self {
            supertransaction_scan: DEFAULT_SUPERTX_SCAN_URL.to_string(),
            user_op_scan: DEFAULT_USER_OP_SCAN_URL.to_string(),
        }
    }
}

impl ExplorerUrls {
    /// Builds the explorer links of an executed supertransaction.
    pub fn links_for(&self, receipt: &ExecutionReceipt) -> ExplorerLinks {
        ExplorerLinks {
            supertransaction: format!("{}{}", self.supertransaction_scan, receipt.hash),
            chains: receipt.user_ops.iter().map(|op| self.chain_links(op)).collect(),
        }
    }

    fn chain_links(&self, op: &UserOpReceipt) -> ChainExplorerLinks {
        let chain_id = op.op.chain_id;
        ChainExplorerLinks {
            chain_id,
            block_explorer: execution_tx_hash(op).and_then(|tx_hash| {
                let (_, base) = Chain::from_id(chain_id).etherscan_urls()?;
                Some(format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
            }),
            user_op_scan: format!("{}{}", self.user_op_scan, op.op.user_op_hash),
        }
    }
}

/// The transaction hash an executed user op was included in.
fn execution_tx_hash(op: &UserOpReceipt) -> Option<B256> {
    op.execution_data.as_ref().filter(|data| data.len() == 32).map(|data| B256::from_slice(data))
}
