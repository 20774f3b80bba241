//! Unified balance aggregation across chains.

use crate::{
    account::MultichainAccount,
    error::{BalanceError, SupertxError},
    types::{ChainBalance, MultichainToken, UnifiedBalance},
};
use alloy::primitives::U256;
use futures_util::future::try_join_all;
use tokio::try_join;
use tracing::{debug, instrument};

/// Sums the balance of `token` held by `account` on every chain where both are deployed.
///
/// Every chain is read concurrently; a single failing read fails the whole aggregation. The
/// breakdown is ordered by ascending chain id.
#[instrument(skip_all, fields(token = %token.symbol))]
pub async fn get_unified_balance(
    account: &MultichainAccount,
    token: &MultichainToken,
) -> Result<UnifiedBalance, SupertxError> {
    let reads = token.deployments.iter().filter_map(|(&chain_id, &token_address)| {
        let deployment = account.deployment_on(chain_id)?;
        Some(async move {
            let (balance, decimals) = try_join!(
                deployment.token_balance(token_address),
                deployment.token_decimals(token_address)
            )?;
            debug!(chain_id, %balance, decimals, "Read token balance");
            Ok::<_, SupertxError>(ChainBalance { chain_id, balance, decimals })
        })
    });

    let breakdown = try_join_all(reads).await?;
    Ok(reduce_balances(token.clone(), breakdown)?)
}

/// Folds per-chain balances into a [`UnifiedBalance`].
///
/// All entries must report the same decimals as the first one, which is the lowest chain id when
/// the breakdown comes from [`get_unified_balance`].
pub fn reduce_balances(
    token: MultichainToken,
    breakdown: Vec<ChainBalance>,
) -> Result<UnifiedBalance, BalanceError> {
    let Some(first) = breakdown.first() else {
        return Err(BalanceError::NoCommonChains);
    };
    let decimals = first.decimals;

    let mut total_balance = U256::ZERO;
    for entry in &breakdown {
        if entry.decimals != decimals {
            return Err(BalanceError::DecimalMismatch {
                chain_id: entry.chain_id,
                expected: decimals,
                got: entry.decimals,
            });
        }
        total_balance += entry.balance;
    }

    Ok(UnifiedBalance { token, total_balance, decimals, breakdown })
}
