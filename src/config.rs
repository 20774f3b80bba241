//! Client configuration.
use crate::{
    account::{Deployment, MultichainAccount, ProviderDeployment},
    bridge::AcrossPlugin,
    constants::{
        DEFAULT_ACROSS_API_URL, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_NODE_URL, DEFAULT_POLL_INTERVAL,
        ENTRYPOINT_V07,
    },
    execution::{ExplorerUrls, WaitOptions},
    node::HttpMeeClient,
    types::MultichainToken,
};
use alloy::primitives::{Address, Bytes};
use alloy_chains::Chain;
use eyre::{Context, OptionExt};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Arc,
    time::Duration,
};
use url::Url;

/// Client configuration.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Execution node configuration.
    #[serde(default)]
    pub node: NodeConfig,
    /// Receipt polling bounds.
    #[serde(default)]
    pub wait: WaitConfig,
    /// Explorer base URLs.
    #[serde(default)]
    pub explorer: ExplorerUrls,
    /// RPC endpoint per chain.
    #[serde(default, with = "crate::serde::hash_map")]
    pub chains: HashMap<Chain, Url>,
    /// The smart account.
    #[serde(default)]
    pub account: AccountConfig,
    /// Known tokens by symbol.
    #[serde(default)]
    pub tokens: BTreeMap<String, TokenConfig>,
    /// Across bridge configuration.
    #[serde(default)]
    pub across: AcrossConfig,
}

impl ClientConfig {
    /// Sets the execution node URL.
    pub fn with_node_url(mut self, url: impl Into<String>) -> Self {
        self.node.url = url.into();
        self
    }

    /// Sets the execution node API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.node.api_key = api_key;
        self
    }

    /// Sets the interval between two explorer polls.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.wait.poll_interval = poll_interval;
        self
    }

    /// Sets the maximum number of explorer polls.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.wait.max_attempts = max_attempts;
        self
    }

    /// Sets the overall receipt wait timeout.
    pub fn with_wait_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.wait.timeout = timeout;
        self
    }

    /// Adds the RPC endpoint of a chain.
    pub fn with_chain(mut self, chain: Chain, endpoint: Url) -> Self {
        self.chains.insert(chain, endpoint);
        self
    }

    /// Adds an account deployment.
    pub fn with_deployment(mut self, chain: Chain, deployment: DeploymentConfig) -> Self {
        self.account.deployments.insert(chain, deployment);
        self
    }

    /// Adds a token.
    pub fn with_token(mut self, symbol: impl Into<String>, token: TokenConfig) -> Self {
        self.tokens.insert(symbol.into(), token);
        self
    }

    /// Sets the Across API URL.
    pub fn with_across_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.across.api_url = api_url.into();
        self
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the receipt polling bounds.
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            poll_interval: self.wait.poll_interval,
            max_attempts: self.wait.max_attempts,
            timeout: self.wait.timeout,
        }
    }

    /// Returns the token configured under `symbol`.
    pub fn token(&self, symbol: &str) -> Option<MultichainToken> {
        let token = self.tokens.get(symbol)?;
        Some(MultichainToken::new(
            symbol,
            token.deployments.iter().map(|(chain, address)| (chain.id(), *address)),
        ))
    }

    /// Builds the execution node client.
    pub fn node_client(&self) -> eyre::Result<HttpMeeClient> {
        let url = Url::parse(&self.node.url)
            .wrap_err_with(|| format!("invalid node url: {}", self.node.url))?;
        let client = HttpMeeClient::new(url);
        Ok(match &self.node.api_key {
            Some(api_key) => client.with_api_key(api_key),
            None => client,
        })
    }

    /// Builds the Across bridge plugin.
    pub fn across_plugin(&self) -> eyre::Result<AcrossPlugin> {
        let url = Url::parse(&self.across.api_url)
            .wrap_err_with(|| format!("invalid across api url: {}", self.across.api_url))?;
        Ok(AcrossPlugin::new(url))
    }

    /// Builds the multichain account from the configured deployments and chain endpoints.
    pub fn build_account(&self) -> eyre::Result<MultichainAccount> {
        let deployments = self
            .account
            .deployments
            .iter()
            .map(|(chain, deployment)| {
                let endpoint = self
                    .chains
                    .get(chain)
                    .ok_or_eyre(format!("no rpc endpoint for chain {chain}"))?;
                let mut provider_deployment = ProviderDeployment::from_endpoint(
                    chain.id(),
                    deployment.address,
                    endpoint.clone(),
                )
                .with_entrypoint(self.account.entrypoint);
                if let Some(init_code) = &deployment.init_code {
                    provider_deployment = provider_deployment.with_init_code(init_code.clone());
                }
                Ok(Arc::new(provider_deployment) as Arc<dyn Deployment>)
            })
            .collect::<eyre::Result<Vec<_>>>()?;

        Ok(MultichainAccount::new(deployments)?)
    }
}

/// Execution node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Base URL of the node.
    pub url: String,
    /// API key sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self { url: DEFAULT_NODE_URL.to_string(), api_key: None }
    }
}

/// Receipt wait configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    /// Interval between two explorer polls.
    #[serde(with = "crate::serde::duration_millis")]
    pub poll_interval: Duration,
    /// Maximum number of explorer polls.
    pub max_attempts: u32,
    /// Overall deadline.
    #[serde(default, with = "crate::serde::duration_millis::option")]
    pub timeout: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            timeout: None,
        }
    }
}

/// Smart account configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Entrypoint nonces are read from.
    pub entrypoint: Address,
    /// Account deployment per chain.
    #[serde(default, with = "crate::serde::hash_map")]
    pub deployments: HashMap<Chain, DeploymentConfig>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self { entrypoint: ENTRYPOINT_V07, deployments: HashMap::new() }
    }
}

/// One account deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Account address.
    pub address: Address,
    /// Init code used until the account is deployed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_code: Option<Bytes>,
}

/// Token configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Token address per chain.
    #[serde(with = "crate::serde::hash_map")]
    pub deployments: HashMap<Chain, Address>,
}

/// Across bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcrossConfig {
    /// Base URL of the Across API.
    pub api_url: String,
}

impl Default for AcrossConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_ACROSS_API_URL.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const CONFIG: &str = r#"
node:
  url: https://node.example/
  api_key: secret
wait:
  poll_interval: 250
  max_attempts: 40
  timeout: 60000
chains:
  '8453': https://base.example/
  '10': https://optimism.example/
account:
  entrypoint: '0x0000000071727De22E5E9d8BAf0edAc6f37da032'
  deployments:
    '8453':
      address: '0x1111111111111111111111111111111111111111'
    '10':
      address: '0x1111111111111111111111111111111111111111'
      init_code: '0xfeed'
tokens:
  USDC:
    deployments:
      '8453': '0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913'
      '10': '0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85'
"#;

    #[test]
    fn parses_yaml() {
        let config: ClientConfig = serde_yaml::from_str(CONFIG).unwrap();

        let wait = config.wait_options();
        assert_eq!(wait.poll_interval, Duration::from_millis(250));
        assert_eq!(wait.max_attempts, 40);
        assert_eq!(wait.timeout, Some(Duration::from_secs(60)));
        assert_eq!(config.across.api_url, DEFAULT_ACROSS_API_URL);
        assert_eq!(config.explorer, ExplorerUrls::default());

        let usdc = config.token("USDC").unwrap();
        assert_eq!(usdc.address_on(10), Some(address!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85")));
        assert!(config.token("DAI").is_none());

        let optimism = config.account.deployments.get(&Chain::optimism_mainnet()).unwrap();
        assert!(optimism.init_code.is_some());

        let account = config.build_account().unwrap();
        assert_eq!(account.chain_ids().count(), 2);
        assert_eq!(config.node_client().unwrap().base_url().as_str(), "https://node.example/");
    }

    #[test]
    fn defaults_without_file_sections() {
        let config: ClientConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.node.url, DEFAULT_NODE_URL);
        assert_eq!(config.wait_options(), WaitOptions::default());
        assert_eq!(config.account.entrypoint, ENTRYPOINT_V07);
    }

    #[test]
    fn deployment_without_endpoint_fails() {
        let config = ClientConfig::default().with_deployment(
            Chain::base_mainnet(),
            DeploymentConfig { address: Address::ZERO, init_code: None },
        );
        assert!(config.build_account().is_err());
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("supertx-config-{}.yaml", std::process::id()));
        let config = ClientConfig::default()
            .with_node_url("https://node.example/")
            .with_max_attempts(7)
            .with_chain(Chain::base_mainnet(), "https://base.example/".parse().unwrap());

        config.save_to_file(&path).unwrap();
        let loaded = ClientConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.node.url, "https://node.example/");
        assert_eq!(loaded.wait.max_attempts, 7);
        assert_eq!(loaded.chains.len(), 1);
    }

    #[test]
    fn polling_is_configured_with_wait_bounds() {
        let config: ClientConfig =
            serde_yaml::from_str("wait:\n  poll_interval: 500\n  max_attempts: 3\n").unwrap();
        assert_eq!(config.wait.poll_interval, Duration::from_millis(500));
        assert_eq!(
            config.wait_options(),
            WaitOptions { poll_interval: Duration::from_millis(500), max_attempts: 3, timeout: None }
        );

        let config = config.with_poll_interval(Duration::from_millis(20));
        assert_eq!(config.wait_options().poll_interval, Duration::from_millis(20));
        assert_eq!(config.node.url, DEFAULT_NODE_URL);

        let yaml = serde_yaml::to_string(&config).unwrap();
        let reloaded: ClientConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(reloaded.wait.poll_interval, Duration::from_millis(20));
    }
}
