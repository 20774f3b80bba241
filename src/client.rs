//! Supertransaction client.

use crate::{
    account::MultichainAccount,
    balance::get_unified_balance,
    bridge::{
        BridgePlugin, BridgeRequest, BridgingInstructions, FeeReservation, build_bridge_instructions,
    },
    error::{ExecutionError, SupertxError},
    execution::{self, ExplorerUrls, WaitOptions},
    instructions::{BuildAction, InstructionBuilder},
    metrics::ClientMetrics,
    node::MeeApi,
    nonce::NonceReservations,
    quote::{FeeToken, PendingQuote, get_quote},
    signers::QuoteSigner,
    signing::{SignMode, SigningCoordinator, TriggerSender},
    types::{
        ExecutionReceipt, Instruction, MultichainToken, QuoteRequest, SignedQuote,
        SuperTransactionQuote, UnifiedBalance,
    },
};
use alloy::primitives::{B256, ChainId, U256};
use std::{sync::Arc, time::Instant};
use tracing::{instrument, warn};

/// Runs the supertransaction pipeline for one account against one execution node.
#[derive(Debug, Clone)]
pub struct SupertxClient {
    node: Arc<dyn MeeApi>,
    account: MultichainAccount,
    plugins: Vec<Arc<dyn BridgePlugin>>,
    signing: SigningCoordinator,
    nonces: NonceReservations,
    wait: WaitOptions,
    explorer: ExplorerUrls,
    metrics: Arc<ClientMetrics>,
}

impl SupertxClient {
    /// Creates a new client without bridge plugins.
    pub fn new(
        node: Arc<dyn MeeApi>,
        account: MultichainAccount,
        signer: Arc<dyn QuoteSigner>,
    ) -> Self {
        Self {
            node,
            account,
            plugins: Vec::new(),
            signing: SigningCoordinator::new(signer),
            nonces: NonceReservations::default(),
            wait: WaitOptions::default(),
            explorer: ExplorerUrls::default(),
            metrics: Arc::new(ClientMetrics::default()),
        }
    }

    /// Adds a bridge plugin. Plugins are queried in the order they were added.
    pub fn with_plugin(mut self, plugin: Arc<dyn BridgePlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Registers a fusion trigger sender.
    pub fn with_trigger_sender(mut self, sender: Arc<dyn TriggerSender>) -> Self {
        self.signing = self.signing.with_trigger_sender(sender);
        self
    }

    /// Sets the receipt polling bounds.
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Sets the explorer base URLs.
    pub fn with_explorer_urls(mut self, explorer: ExplorerUrls) -> Self {
        self.explorer = explorer;
        self
    }

    /// Shares nonce reservations with other clients of the same account.
    pub fn with_nonce_reservations(mut self, nonces: NonceReservations) -> Self {
        self.nonces = nonces;
        self
    }

    /// Returns the account.
    pub fn account(&self) -> &MultichainAccount {
        &self.account
    }

    /// Returns the configured bridge plugins.
    pub fn plugins(&self) -> &[Arc<dyn BridgePlugin>] {
        &self.plugins
    }

    /// Aggregates the account's balance of `token` across chains.
    pub async fn unified_balance(
        &self,
        token: &MultichainToken,
    ) -> Result<UnifiedBalance, SupertxError> {
        get_unified_balance(&self.account, token).await
    }

    /// Plans the bridging needed to have `amount` of `token` on `to_chain_id`.
    pub async fn bridge_instructions(
        &self,
        token: &MultichainToken,
        to_chain_id: ChainId,
        amount: U256,
        fee_reservation: Option<FeeReservation>,
    ) -> Result<BridgingInstructions, SupertxError> {
        let unified_balance = self.unified_balance(token).await?;
        build_bridge_instructions(
            &self.account,
            BridgeRequest {
                to_chain_id,
                amount,
                unified_balance: &unified_balance,
                plugins: &self.plugins,
                fee_reservation,
            },
        )
        .await
    }

    /// Applies `actions` in order and returns the resulting instructions.
    pub async fn build_instructions(
        &self,
        actions: impl IntoIterator<Item = BuildAction>,
    ) -> Result<Vec<Instruction>, SupertxError> {
        InstructionBuilder::new(&self.account, &self.plugins).build_all(actions).await
    }

    /// Quotes `instructions` with the fee paid in `fee_token`.
    ///
    /// The quote holds its nonces until it is executed or dropped.
    pub async fn quote(
        &self,
        instructions: &[Instruction],
        fee_token: FeeToken,
    ) -> Result<PendingQuote, SupertxError> {
        self.metrics.quotes.increment(1);
        get_quote(self.node.as_ref(), &self.account, instructions, fee_token, &self.nonces).await
    }

    /// Signs `quote` in the given mode.
    pub async fn sign(
        &self,
        quote: SuperTransactionQuote,
        mode: SignMode,
    ) -> Result<SignedQuote, SupertxError> {
        self.signing.sign(quote, mode).await
    }

    /// Submits `signed` for execution.
    pub async fn execute(&self, signed: &SignedQuote) -> Result<B256, SupertxError> {
        let hash = execution::execute(self.node.as_ref(), signed).await?;
        self.metrics.executed.increment(1);
        Ok(hash)
    }

    /// Waits until every user op of `hash` has executed.
    pub async fn wait_for_receipt(&self, hash: B256) -> Result<ExecutionReceipt, SupertxError> {
        let node = MeteredNode { inner: self.node.as_ref(), metrics: &self.metrics };
        let result = execution::wait_for_receipt(&node, hash, &self.explorer, self.wait).await;

        match &result {
            Err(SupertxError::Execution(ExecutionError::UserOpFailed { .. })) => {
                self.metrics.failed.increment(1)
            }
            Err(SupertxError::Execution(ExecutionError::Timeout { .. })) => {
                self.metrics.timeouts.increment(1)
            }
            _ => {}
        }
        result
    }

    /// Signs, executes and waits for `quote`.
    ///
    /// The quote's nonces stay held once the supertransaction executed. On any failure, including
    /// signing, they are released so the next quote starts from the on-chain nonces.
    #[instrument(skip_all, fields(hash = %quote.hash))]
    pub async fn execute_quote(
        &self,
        quote: PendingQuote,
        mode: SignMode,
    ) -> Result<ExecutionReceipt, SupertxError> {
        let started = Instant::now();
        let (quote, nonces) = quote.into_parts();

        let result = async {
            let signed = self.sign(quote, mode).await?;
            let hash = self.execute(&signed).await?;
            self.wait_for_receipt(hash).await
        }
        .await;

        match &result {
            Ok(_) => {
                nonces.keep();
                self.metrics.execution_time.record(started.elapsed().as_millis() as f64);
            }
            Err(err) => {
                warn!(%err, "Supertransaction failed, releasing nonces");
                drop(nonces);
            }
        }
        result
    }
}

/// A [`MeeApi`] counting explorer polls.
#[derive(Debug)]
struct MeteredNode<'a> {
    inner: &'a dyn MeeApi,
    metrics: &'a ClientMetrics,
}

#[async_trait::async_trait]
impl MeeApi for MeteredNode<'_> {
    async fn quote(&self, request: &QuoteRequest) -> Result<SuperTransactionQuote, SupertxError> {
        self.inner.quote(request).await
    }

    async fn execute(&self, signed: &SignedQuote) -> Result<B256, SupertxError> {
        self.inner.execute(signed).await
    }

    async fn explorer(&self, hash: B256) -> Result<ExecutionReceipt, SupertxError> {
        self.metrics.receipt_polls.increment(1);
        self.inner.explorer(hash).await
    }
}
