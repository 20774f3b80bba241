//! HTTP client for the execution node.

use super::MeeApi;
use crate::{
    error::{NodeError, SupertxError, extract_error_message},
    types::{ExecutionReceipt, QuoteRequest, SignedQuote, SuperTransactionQuote},
};
use alloy::primitives::B256;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{error, instrument, trace};
use url::Url;

/// Header carrying the node API key.
const API_KEY_HEADER: &str = "x-api-key";

/// Response of `POST v1/exec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    /// The supertransaction hash.
    pub hash: B256,
}

/// [`MeeApi`] implementation over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMeeClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpMeeClient {
    /// Creates a new client for the node at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self { client: Client::new(), base_url, api_key: None }
    }

    /// Sets the API key sent with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the HTTP client used for requests.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Returns the node base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, NodeError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Sends `request` and decodes the JSON response body.
    ///
    /// Non-2xx responses are turned into [`NodeError::Api`] with the message extracted from the
    /// body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, NodeError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(%status, %body, "Node response");

        if !status.is_success() {
            let message = extract_error_message(status, &body);
            error!(%status, %message, "Node request failed");
            return Err(NodeError::Api { status, message });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl MeeApi for HttpMeeClient {
    #[instrument(skip_all, fields(user_ops = request.user_ops.len()))]
    async fn quote(&self, request: &QuoteRequest) -> Result<SuperTransactionQuote, SupertxError> {
        let url = self.url("v1/quote")?;
        Ok(self.send(self.client.post(url).json(request)).await?)
    }

    #[instrument(skip_all, fields(hash = %signed.hash()))]
    async fn execute(&self, signed: &SignedQuote) -> Result<B256, SupertxError> {
        let url = self.url("v1/exec")?;
        let response: ExecuteResponse = self.send(self.client.post(url).json(signed)).await?;
        Ok(response.hash)
    }

    #[instrument(skip(self))]
    async fn explorer(&self, hash: B256) -> Result<ExecutionReceipt, SupertxError> {
        let url = self.url(&format!("v1/explorer/{hash}"))?;
        Ok(self.send(self.client.get(url)).await?)
    }
}
