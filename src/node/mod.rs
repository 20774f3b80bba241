//! Talking to the execution node.

use crate::{
    error::SupertxError,
    types::{ExecutionReceipt, QuoteRequest, SignedQuote, SuperTransactionQuote},
};
use alloy::primitives::B256;
use std::fmt::Debug;

mod client;
pub use client::{ExecuteResponse, HttpMeeClient};

/// The quote, execution and explorer endpoints of an execution node.
#[async_trait::async_trait]
pub trait MeeApi: Debug + Send + Sync {
    /// Requests a quote for the given user operations (`POST v1/quote`).
    async fn quote(&self, request: &QuoteRequest) -> Result<SuperTransactionQuote, SupertxError>;

    /// Submits a signed quote for execution (`POST v1/exec`), returning the supertransaction hash.
    async fn execute(&self, signed: &SignedQuote) -> Result<B256, SupertxError>;

    /// Fetches the current execution state of a supertransaction (`GET v1/explorer/{hash}`).
    async fn explorer(&self, hash: B256) -> Result<ExecutionReceipt, SupertxError>;
}
