//! In-memory doubles for chain, bridge and node collaborators.

use crate::{
    account::{Deployment, encode_batch},
    bridge::{BridgePlugin, BridgeQuoteParams, BridgeRoute},
    error::{NodeError, SupertxError},
    node::MeeApi,
    signing::{TriggerCall, TriggerSender},
    types::{
        Call, ExecutionReceipt, ExecutionStatus, IERC20, Instruction, PaymentInfo, QuoteRequest,
        QuotedUserOp, SignedQuote, SuperTransactionQuote, TriggerReceipt, UserOp, UserOpReceipt,
    },
};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, U256, address, keccak256},
    sol_types::SolCall,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

/// A [`Deployment`] backed by in-memory state.
#[derive(Debug, Clone)]
pub struct MockDeployment {
    chain_id: ChainId,
    address: Address,
    nonce: Arc<Mutex<U256>>,
    deployed: bool,
    init_code: Bytes,
    tokens: HashMap<Address, (U256, u8)>,
    failing: bool,
}

impl MockDeployment {
    pub fn new(chain_id: ChainId, address: Address) -> Self {
        Self {
            chain_id,
            address,
            nonce: Default::default(),
            deployed: true,
            init_code: Bytes::new(),
            tokens: HashMap::new(),
            failing: false,
        }
    }

    pub fn with_nonce(self, nonce: U256) -> Self {
        self.set_nonce(nonce);
        self
    }

    pub fn set_nonce(&self, nonce: U256) {
        *self.nonce.lock().unwrap() = nonce;
    }

    pub fn undeployed(mut self, init_code: Bytes) -> Self {
        self.deployed = false;
        self.init_code = init_code;
        self
    }

    pub fn with_token(mut self, token: Address, balance: U256, decimals: u8) -> Self {
        self.tokens.insert(token, (balance, decimals));
        self
    }

    /// Makes every remote read fail.
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    pub fn into_dyn(self) -> Arc<dyn Deployment> {
        Arc::new(self)
    }

    fn check(&self) -> Result<(), SupertxError> {
        if self.failing {
            return Err(eyre::eyre!("rpc unavailable on chain {}", self.chain_id).into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Deployment for MockDeployment {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn address(&self) -> Address {
        self.address
    }

    async fn nonce(&self) -> Result<U256, SupertxError> {
        self.check()?;
        Ok(*self.nonce.lock().unwrap())
    }

    async fn is_deployed(&self) -> Result<bool, SupertxError> {
        self.check()?;
        Ok(self.deployed)
    }

    async fn init_code(&self) -> Result<Bytes, SupertxError> {
        self.check()?;
        Ok(self.init_code.clone())
    }

    fn encode_batch(&self, calls: &[Call]) -> Bytes {
        encode_batch(calls)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, SupertxError> {
        self.check()?;
        Ok(self.tokens.get(&token).map(|(balance, _)| *balance).unwrap_or_default())
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, SupertxError> {
        self.check()?;
        Ok(self.tokens.get(&token).map(|(_, decimals)| *decimals).unwrap_or(18))
    }
}

/// Target of the deposit call built by [`MockPlugin`].
pub const MOCK_BRIDGE: Address = address!("0x000000000000000000000000000000000000b1d9");

/// A [`BridgePlugin`] charging a fixed fee in basis points on every route.
#[derive(Debug, Clone, Default)]
pub struct MockPlugin {
    fee_bps: u64,
    unsupported: Vec<ChainId>,
    requests: Arc<Mutex<Vec<(ChainId, ChainId, U256)>>>,
}

impl MockPlugin {
    pub fn lossless() -> Self {
        Self::default()
    }

    pub fn with_fee_bps(fee_bps: u64) -> Self {
        Self { fee_bps, ..Default::default() }
    }

    /// Refuses to quote routes leaving `chain_id`.
    pub fn unsupported(mut self, chain_id: ChainId) -> Self {
        self.unsupported.push(chain_id);
        self
    }

    /// Returns every `(from, to, amount)` quoted so far.
    pub fn requests(&self) -> Vec<(ChainId, ChainId, U256)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn into_dyn(self) -> Arc<dyn BridgePlugin> {
        Arc::new(self)
    }
}

#[async_trait::async_trait]
impl BridgePlugin for MockPlugin {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn quote(
        &self,
        params: BridgeQuoteParams<'_>,
    ) -> Result<Option<BridgeRoute>, SupertxError> {
        self.requests.lock().unwrap().push((
            params.from_chain_id,
            params.to_chain_id,
            params.amount,
        ));

        if self.unsupported.contains(&params.from_chain_id) {
            return Ok(None);
        }
        let Some(token) = params.token.address_on(params.from_chain_id) else {
            return Ok(None);
        };

        let received = params.amount * U256::from(10_000 - self.fee_bps) / U256::from(10_000);
        let approve = IERC20::approveCall { spender: MOCK_BRIDGE, amount: params.amount };
        let deposit = IERC20::transferCall { to: MOCK_BRIDGE, amount: params.amount };

        Ok(Some(BridgeRoute {
            from_chain_id: params.from_chain_id,
            amount: params.amount,
            received_at_destination: received,
            plugin: self.id().to_string(),
            user_op: Instruction::new(
                params.from_chain_id,
                vec![
                    Call::new(token, approve.abi_encode(), 50_000),
                    Call::new(MOCK_BRIDGE, deposit.abi_encode(), 150_000),
                ],
            ),
            bridging_duration_expected_ms: Some(30_000),
        }))
    }
}

/// Node address used by [`MockNode`] quotes.
pub const MOCK_NODE: Address = address!("0x0000000000000000000000000000000000000de0");

/// Builds the quote a node would return for `request`.
///
/// The hash is derived from the request so that distinct requests get distinct hashes.
pub fn quote_for(request: &QuoteRequest) -> SuperTransactionQuote {
    let encoded = serde_json::to_vec(request).unwrap();
    let hash = keccak256(&encoded);

    SuperTransactionQuote {
        hash,
        node: MOCK_NODE,
        commitment: keccak256(hash),
        payment_info: PaymentInfo {
            sender: request.payment_info.sender,
            token: request.payment_info.token,
            chain_id: request.payment_info.chain_id,
            nonce: request.payment_info.nonce,
            init_code: request.payment_info.init_code.clone(),
            token_amount: "0.25".to_string(),
            token_wei_amount: U256::from(250_000),
            token_value: "0.25".to_string(),
        },
        user_ops: request
            .user_ops
            .iter()
            .enumerate()
            .map(|(index, op)| QuotedUserOp {
                user_op: UserOp {
                    sender: op.sender,
                    nonce: op.nonce,
                    init_code: op.init_code.clone().unwrap_or_default(),
                    call_data: op.call_data.clone(),
                    call_gas_limit: U256::from(op.call_gas_limit),
                    verification_gas_limit: U256::from(100_000),
                    pre_verification_gas: U256::from(50_000),
                    max_fee_per_gas: U256::from(1_000_000_000u64),
                    max_priority_fee_per_gas: U256::from(1_000_000u64),
                    paymaster_and_data: Bytes::new(),
                },
                user_op_hash: keccak256([hash.as_slice(), &[index as u8]].concat()),
                mee_user_op_hash: keccak256([&[index as u8], hash.as_slice()].concat()),
                lower_bound_timestamp: 1_700_000_000,
                upper_bound_timestamp: 1_700_000_600,
                max_gas_limit: U256::from(op.call_gas_limit + 150_000),
                max_fee_per_gas: U256::from(1_000_000_000u64),
                chain_id: op.chain_id,
            })
            .collect(),
    }
}

/// A quote with one user op on Base, paid on Base.
pub fn quote_fixture() -> SuperTransactionQuote {
    use crate::types::{PaymentInfoRequest, UserOpRequest};

    let sender = address!("0x1111111111111111111111111111111111111111");
    quote_for(&QuoteRequest {
        user_ops: vec![UserOpRequest {
            sender,
            call_data: Bytes::from_static(&[0xde, 0xad]),
            call_gas_limit: 100_000,
            nonce: U256::ZERO,
            chain_id: 8453,
            init_code: None,
        }],
        payment_info: PaymentInfoRequest {
            sender,
            token: address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            chain_id: 8453,
            nonce: U256::ZERO,
            init_code: None,
        },
    })
}

/// Builds an explorer receipt for `quote` with the given per-op statuses and errors.
pub fn receipt_for(
    quote: &SuperTransactionQuote,
    statuses: &[(ExecutionStatus, Option<&str>)],
) -> ExecutionReceipt {
    ExecutionReceipt {
        hash: quote.hash,
        node: quote.node,
        commitment: quote.commitment,
        payment_info: quote.payment_info.clone(),
        user_ops: quote
            .user_ops
            .iter()
            .zip(statuses)
            .map(|(op, (status, error))| UserOpReceipt {
                op: op.clone(),
                execution_status: *status,
                execution_data: None,
                execution_error: error.map(str::to_string),
            })
            .collect(),
        explorer_links: None,
    }
}

/// A [`MeeApi`] answering from memory.
///
/// Explorer polls pop queued receipts; the last queued receipt is returned forever.
#[derive(Debug, Default)]
pub struct MockNode {
    reject_quotes: bool,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    executed: Mutex<Vec<SignedQuote>>,
    receipts: Mutex<VecDeque<ExecutionReceipt>>,
    polls: Mutex<u32>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the quote endpoint answer with an error.
    pub fn rejecting_quotes(mut self) -> Self {
        self.reject_quotes = true;
        self
    }

    /// Queues a receipt returned by the explorer endpoint.
    pub fn push_receipt(&self, receipt: ExecutionReceipt) {
        self.receipts.lock().unwrap().push_back(receipt);
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quote_requests.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<SignedQuote> {
        self.executed.lock().unwrap().clone()
    }

    pub fn polls(&self) -> u32 {
        *self.polls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl MeeApi for MockNode {
    async fn quote(&self, request: &QuoteRequest) -> Result<SuperTransactionQuote, SupertxError> {
        self.quote_requests.lock().unwrap().push(request.clone());
        if self.reject_quotes {
            return Err(NodeError::Api {
                status: reqwest::StatusCode::BAD_REQUEST,
                message: "unsupported fee token".into(),
            }
            .into());
        }
        Ok(quote_for(request))
    }

    async fn execute(&self, signed: &SignedQuote) -> Result<B256, SupertxError> {
        self.executed.lock().unwrap().push(signed.clone());
        Ok(signed.hash())
    }

    async fn explorer(&self, hash: B256) -> Result<ExecutionReceipt, SupertxError> {
        *self.polls.lock().unwrap() += 1;

        let mut receipts = self.receipts.lock().unwrap();
        let receipt = if receipts.len() > 1 { receipts.pop_front() } else { receipts.front().cloned() };
        receipt.ok_or_else(|| eyre::eyre!("unknown supertransaction {hash}").into())
    }
}

/// A [`TriggerSender`] recording triggers and answering with a synthetic receipt.
#[derive(Debug, Clone)]
pub struct MockTriggerSender {
    chain_id: ChainId,
    reverting: bool,
    sent: Arc<Mutex<Vec<TriggerCall>>>,
}

impl MockTriggerSender {
    pub fn new(chain_id: ChainId) -> Self {
        Self { chain_id, reverting: false, sent: Default::default() }
    }

    pub fn reverting(mut self) -> Self {
        self.reverting = true;
        self
    }

    pub fn sent(&self) -> Vec<TriggerCall> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TriggerSender for MockTriggerSender {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    async fn send_trigger(&self, call: TriggerCall) -> Result<TriggerReceipt, SupertxError> {
        let transaction_hash = keccak256(&call.data);
        let to = call.to;
        self.sent.lock().unwrap().push(call);

        Ok(TriggerReceipt {
            chain_id: self.chain_id,
            transaction_hash,
            block_number: Some(1),
            from: Address::repeat_byte(0x11),
            to: Some(to),
            gas_used: 21_000,
            status: !self.reverting,
        })
    }
}
