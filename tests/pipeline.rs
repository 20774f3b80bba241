#![allow(missing_docs)]

//! Drives a supertransaction from balance aggregation to its execution receipt against in-memory
//! chains, bridge and node.

use alloy::{
    primitives::{Address, B256, Bytes, ChainId, U256, address, bytes, keccak256},
    sol_types::SolCall,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use supertx::{
    account::{Deployment, MultichainAccount, encode_batch},
    bridge::{BridgePlugin, BridgeQuoteParams, BridgeRoute},
    client::SupertxClient,
    error::{ExecutionError, SupertxError},
    execution::WaitOptions,
    instructions::BridgeIntent,
    node::MeeApi,
    quote::FeeToken,
    signers::DynSigner,
    signing::SignMode,
    types::{
        Call, ExecutionReceipt, ExecutionStatus, IERC20, Instruction, MultichainToken, PaymentInfo,
        QuoteRequest, QuotedUserOp, SignedQuote, SuperTransactionQuote, UserOp, UserOpReceipt,
    },
};

const ACCOUNT: Address = address!("0x1111111111111111111111111111111111111111");
const USDC_BASE: Address = address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
const USDC_OPTIMISM: Address = address!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85");
const BRIDGE: Address = address!("0x00000000000000000000000000000000000b1d9e");
const RECIPIENT: Address = address!("0x2222222222222222222222222222222222222222");
const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

const BASE: ChainId = 8453;
const OPTIMISM: ChainId = 10;

#[derive(Debug)]
struct Chain {
    chain_id: ChainId,
    nonce: U256,
    balances: HashMap<Address, U256>,
}

#[async_trait::async_trait]
impl Deployment for Chain {
    fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    fn address(&self) -> Address {
        ACCOUNT
    }

    async fn nonce(&self) -> Result<U256, SupertxError> {
        Ok(self.nonce)
    }

    async fn is_deployed(&self) -> Result<bool, SupertxError> {
        Ok(true)
    }

    async fn init_code(&self) -> Result<Bytes, SupertxError> {
        Ok(Bytes::new())
    }

    fn encode_batch(&self, calls: &[Call]) -> Bytes {
        encode_batch(calls)
    }

    async fn token_balance(&self, token: Address) -> Result<U256, SupertxError> {
        Ok(self.balances.get(&token).copied().unwrap_or_default())
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8, SupertxError> {
        Ok(6)
    }
}

/// Bridges anything for a 1% fee.
#[derive(Debug)]
struct OnePercentBridge;

#[async_trait::async_trait]
impl BridgePlugin for OnePercentBridge {
    fn id(&self) -> &'static str {
        "one-percent"
    }

    async fn quote(
        &self,
        params: BridgeQuoteParams<'_>,
    ) -> Result<Option<BridgeRoute>, SupertxError> {
        let Some(token) = params.token.address_on(params.from_chain_id) else {
            return Ok(None);
        };
        Ok(Some(BridgeRoute {
            from_chain_id: params.from_chain_id,
            amount: params.amount,
            received_at_destination: params.amount * U256::from(99) / U256::from(100),
            plugin: self.id().to_string(),
            user_op: Instruction::new(
                params.from_chain_id,
                vec![
                    Call::new(token, bytes!("0x095ea7b3"), 50_000),
                    Call::new(BRIDGE, bytes!("0x7b939232"), 150_000),
                ],
            ),
            bridging_duration_expected_ms: Some(20_000),
        }))
    }
}

/// Answers quotes from memory and reports every op pending for `pending_polls` explorer polls.
#[derive(Debug, Default)]
struct Node {
    pending_polls: u32,
    fail_on: Option<ChainId>,
    quotes: Mutex<Vec<SuperTransactionQuote>>,
    executed: Mutex<Vec<SignedQuote>>,
    polls: Mutex<u32>,
}

#[async_trait::async_trait]
impl MeeApi for Node {
    async fn quote(&self, request: &QuoteRequest) -> Result<SuperTransactionQuote, SupertxError> {
        let hash = keccak256(serde_json::to_vec(request).unwrap());
        let quote = SuperTransactionQuote {
            hash,
            node: Address::repeat_byte(0x0e),
            commitment: keccak256(hash),
            payment_info: PaymentInfo {
                sender: request.payment_info.sender,
                token: request.payment_info.token,
                chain_id: request.payment_info.chain_id,
                nonce: request.payment_info.nonce,
                init_code: None,
                token_amount: "0.10".to_string(),
                token_wei_amount: U256::from(100_000),
                token_value: "0.10".to_string(),
            },
            user_ops: request
                .user_ops
                .iter()
                .enumerate()
                .map(|(index, op)| QuotedUserOp {
                    user_op: UserOp {
                        sender: op.sender,
                        nonce: op.nonce,
                        init_code: Bytes::new(),
                        call_data: op.call_data.clone(),
                        call_gas_limit: U256::from(op.call_gas_limit),
                        verification_gas_limit: U256::from(100_000),
                        pre_verification_gas: U256::from(50_000),
                        max_fee_per_gas: U256::from(1_000_000_000u64),
                        max_priority_fee_per_gas: U256::from(1_000_000u64),
                        paymaster_and_data: Bytes::new(),
                    },
                    user_op_hash: keccak256([hash.as_slice(), &[index as u8]].concat()),
                    mee_user_op_hash: B256::repeat_byte(index as u8),
                    lower_bound_timestamp: 0,
                    upper_bound_timestamp: 600,
                    max_gas_limit: U256::from(op.call_gas_limit),
                    max_fee_per_gas: U256::from(1_000_000_000u64),
                    chain_id: op.chain_id,
                })
                .collect(),
        };
        self.quotes.lock().unwrap().push(quote.clone());
        Ok(quote)
    }

    async fn execute(&self, signed: &SignedQuote) -> Result<B256, SupertxError> {
        self.executed.lock().unwrap().push(signed.clone());
        Ok(signed.hash())
    }

    async fn explorer(&self, hash: B256) -> Result<ExecutionReceipt, SupertxError> {
        let polls = {
            let mut polls = self.polls.lock().unwrap();
            *polls += 1;
            *polls
        };
        let quote = self
            .quotes
            .lock()
            .unwrap()
            .iter()
            .find(|quote| quote.hash == hash)
            .cloned()
            .ok_or_else(|| eyre::eyre!("unknown supertransaction {hash}"))?;

        let user_ops = quote
            .user_ops
            .iter()
            .map(|op| {
                let (execution_status, execution_error) = if polls <= self.pending_polls {
                    (ExecutionStatus::Pending, None)
                } else if self.fail_on == Some(op.chain_id) {
                    (ExecutionStatus::Failed, Some("execution reverted".to_string()))
                } else {
                    (ExecutionStatus::Success, None)
                };
                UserOpReceipt {
                    op: op.clone(),
                    execution_status,
                    execution_data: (execution_status == ExecutionStatus::Success)
                        .then(|| Bytes::copy_from_slice(op.user_op_hash.as_slice())),
                    execution_error,
                }
            })
            .collect();

        Ok(ExecutionReceipt {
            hash,
            node: quote.node,
            commitment: quote.commitment,
            payment_info: quote.payment_info,
            user_ops,
            explorer_links: None,
        })
    }
}

fn usdc() -> MultichainToken {
    MultichainToken::new("USDC", [(BASE, USDC_BASE), (OPTIMISM, USDC_OPTIMISM)])
}

fn client(node: Arc<Node>) -> SupertxClient {
    let account = MultichainAccount::new([
        Arc::new(Chain {
            chain_id: BASE,
            nonce: U256::from(3),
            balances: HashMap::from([(USDC_BASE, U256::from(100_000_000))]),
        }) as Arc<dyn Deployment>,
        Arc::new(Chain {
            chain_id: OPTIMISM,
            nonce: U256::from(11),
            balances: HashMap::from([(USDC_OPTIMISM, U256::from(500_000_000))]),
        }),
    ])
    .unwrap();

    SupertxClient::new(node, account, Arc::new(DynSigner::from_signing_key(KEY).unwrap()))
        .with_plugin(Arc::new(OnePercentBridge))
        .with_wait_options(
            WaitOptions::default().with_poll_interval(Duration::from_secs(1)).with_max_attempts(10),
        )
}

fn transfer_on_base(amount: U256) -> Instruction {
    Instruction::new(
        BASE,
        vec![Call::new(
            USDC_BASE,
            IERC20::transferCall { to: RECIPIENT, amount }.abi_encode(),
            80_000,
        )],
    )
}

#[tokio::test(start_paused = true)]
async fn bridges_quotes_signs_and_executes() {
    let node = Arc::new(Node { pending_polls: 2, ..Default::default() });
    let client = client(node.clone());
    let amount = U256::from(300_000_000);

    let balance = client.unified_balance(&usdc()).await.unwrap();
    assert_eq!(balance.total_balance, U256::from(600_000_000));
    assert_eq!(balance.decimals, 6);

    let instructions = client
        .build_instructions([
            BridgeIntent { token: usdc(), amount, to_chain_id: BASE, fee_reservation: None }.into(),
            transfer_on_base(amount).into(),
        ])
        .await
        .unwrap();

    // one bridge from optimism covering the 200 USDC shortfall, then the transfer
    assert_eq!(instructions.len(), 2);
    assert_eq!(instructions[0].chain_id, OPTIMISM);
    assert_eq!(instructions[1].chain_id, BASE);

    let quote = client
        .quote(&instructions, FeeToken { address: USDC_BASE, chain_id: BASE })
        .await
        .unwrap();
    let nonces: Vec<_> =
        quote.user_ops.iter().map(|op| (op.chain_id, op.user_op.nonce)).collect();
    assert_eq!(nonces, vec![(OPTIMISM, U256::from(11)), (BASE, U256::from(3))]);
    assert_eq!(quote.payment_info.nonce, U256::from(3));

    let hash = quote.hash;
    let receipt = client.execute_quote(quote, SignMode::DirectToMee).await.unwrap();

    assert_eq!(receipt.hash, hash);
    assert!(receipt.user_ops.iter().all(|op| op.execution_status == ExecutionStatus::Success));
    assert_eq!(*node.polls.lock().unwrap(), 3);

    let executed = node.executed.lock().unwrap().clone();
    assert_eq!(executed.len(), 1);
    assert_eq!(executed[0].signature()[0], 0x00);
    assert_eq!(executed[0].signature().len(), 66);

    let links = receipt.explorer_links.unwrap();
    assert_eq!(links.chains.len(), 2);
    assert!(links.supertransaction.ends_with(&hash.to_string()));
    assert!(links.chains.iter().all(|chain| chain.block_explorer.is_some()));
}

#[tokio::test(start_paused = true)]
async fn insufficient_liquidity_is_reported() {
    let client = client(Arc::new(Node::default()));

    let err = client
        .bridge_instructions(&usdc(), BASE, U256::from(700_000_000), None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("insufficient"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn failed_user_op_fails_the_supertransaction() {
    let node = Arc::new(Node { pending_polls: 1, fail_on: Some(BASE), ..Default::default() });
    let client = client(node.clone());

    let instructions = vec![transfer_on_base(U256::from(1_000_000))];
    let fee = FeeToken { address: USDC_BASE, chain_id: BASE };
    let quote = client.quote(&instructions, fee).await.unwrap();

    let err = client.execute_quote(quote, SignMode::DirectToMee).await.unwrap_err();
    assert!(matches!(
        err,
        SupertxError::Execution(ExecutionError::UserOpFailed { chain_id: BASE, .. })
    ));
    assert_eq!(*node.polls.lock().unwrap(), 2);

    // the nonce of the failed supertransaction is handed out again
    let retry = client.quote(&instructions, fee).await.unwrap();
    assert_eq!(retry.user_ops[0].user_op.nonce, U256::from(3));
}

#[tokio::test(start_paused = true)]
async fn requoting_reuses_onchain_nonces() {
    let client = client(Arc::new(Node::default()));
    let instructions = vec![transfer_on_base(U256::from(1_000_000))];
    let fee = FeeToken { address: USDC_BASE, chain_id: BASE };

    let first = client.quote(&instructions, fee).await.unwrap();
    let concurrent = client.quote(&instructions, fee).await.unwrap();
    assert_eq!(first.user_ops[0].user_op.nonce, U256::from(3));
    assert_eq!(concurrent.user_ops[0].user_op.nonce, U256::from(4));

    // both quotes expire unused
    drop((first, concurrent));

    let requote = client.quote(&instructions, fee).await.unwrap();
    assert_eq!(requote.user_ops[0].user_op.nonce, U256::from(3));
}
