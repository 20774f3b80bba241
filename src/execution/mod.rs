//! Executing signed quotes and waiting for their receipts.

use crate::{
    constants::{DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL},
    error::{ExecutionError, SupertxError},
    node::MeeApi,
    types::{ExecutionReceipt, SignedQuote},
};
use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, instrument, trace};

mod links;
pub use links::ExplorerUrls;

/// Bounds of the receipt polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitOptions {
    /// Delay between two polls.
    #[serde(with = "crate::serde::duration_millis")]
    pub poll_interval: Duration,
    /// Maximum number of polls.
    pub max_attempts: u32,
    /// Overall deadline, measured from the first poll.
    #[serde(default, with = "crate::serde::duration_millis::option")]
    pub timeout: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            timeout: None,
        }
    }
}

impl WaitOptions {
    /// Sets the delay between two polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the maximum number of polls.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the overall deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Submits `signed` for execution, returning the supertransaction hash.
#[instrument(skip_all, fields(hash = %signed.hash()))]
pub async fn execute(node: &dyn MeeApi, signed: &SignedQuote) -> Result<B256, SupertxError> {
    let hash = node.execute(signed).await?;
    debug!(%hash, "Submitted supertransaction");
    Ok(hash)
}

/// Polls the node explorer until every user op of `hash` has executed.
///
/// Fails as soon as any user op reports an execution error, even while others are pending.
/// Returns [`ExecutionError::Timeout`] once `options.max_attempts` polls were made or
/// `options.timeout` elapsed.
#[instrument(skip(node, urls, options))]
pub async fn wait_for_receipt(
    node: &dyn MeeApi,
    hash: B256,
    urls: &ExplorerUrls,
    options: WaitOptions,
) -> Result<ExecutionReceipt, SupertxError> {
    let deadline = options.timeout.map(|timeout| Instant::now() + timeout);
    let mut attempts = 0;

    loop {
        attempts += 1;
        let mut receipt = node.explorer(hash).await?;
        trace!(attempts, ?receipt, "Polled supertransaction");

        if let Some((chain_id, error)) = receipt.first_failure() {
            error!(chain_id, %error, "User op failed");
            return Err(ExecutionError::UserOpFailed { chain_id, error: error.to_string() }.into());
        }

        if !receipt.is_pending() {
            receipt.explorer_links = Some(urls.links_for(&receipt));
            debug!(attempts, "Supertransaction executed");
            return Ok(receipt);
        }

        let timed_out = deadline.is_some_and(|deadline| Instant::now() + options.poll_interval > deadline);
        if attempts >= options.max_attempts || timed_out {
            return Err(ExecutionError::Timeout { hash, attempts }.into());
        }

        tokio::time::sleep(options.poll_interval).await;
    }
}
