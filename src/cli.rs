//! # Supertx CLI
use crate::{
    balance::get_unified_balance,
    bridge::{BridgePlugin, BridgeRequest, build_bridge_instructions},
    config::ClientConfig,
    execution::wait_for_receipt,
};
use alloy::primitives::{B256, U256};
use alloy_chains::Chain;
use clap::{Parser, Subcommand};
use eyre::OptionExt;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

/// Inspect balances, plan bridging and track supertransactions of a multichain smart account.
#[derive(Debug, Parser)]
#[command(author, about = "Supertx", long_about = None)]
pub struct Args {
    /// The configuration file.
    #[arg(long, value_name = "CONFIG", env = "SUPERTX_CONFIG", default_value = "supertx.yaml")]
    pub config: PathBuf,
    /// Overrides the execution node URL.
    #[arg(long = "node-url", value_name = "URL", env = "SUPERTX_NODE_URL")]
    pub node_url: Option<String>,
    /// The execution node API key.
    #[arg(long = "api-key", value_name = "KEY", env = "SUPERTX_API_KEY")]
    pub api_key: Option<String>,
    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the unified balance of a token and its per-chain breakdown.
    Balance {
        /// Token symbol, as configured.
        token: String,
    },
    /// Print the bridge instructions needed to have an amount of a token on a chain.
    Plan {
        /// Token symbol, as configured.
        token: String,
        /// Destination chain.
        #[arg(long, value_name = "CHAIN")]
        chain: Chain,
        /// Amount required on the destination chain, in the token's smallest unit.
        #[arg(long, value_name = "AMOUNT")]
        amount: U256,
    },
    /// Wait for a supertransaction to execute and print its receipt.
    Receipt {
        /// Supertransaction hash.
        hash: B256,
    },
}

impl Args {
    /// Loads the configuration, applying command line overrides.
    pub fn load_config(&self) -> eyre::Result<ClientConfig> {
        let mut config = ClientConfig::load_from_file(&self.config)?;
        if let Some(url) = &self.node_url {
            config = config.with_node_url(url);
        }
        if self.api_key.is_some() {
            config = config.with_api_key(self.api_key.clone());
        }
        Ok(config)
    }

    /// Runs the command.
    pub async fn run(self) -> eyre::Result<()> {
        let config = self.load_config()?;

        match self.command {
            Command::Balance { token } => {
                let token = config.token(&token).ok_or_eyre(format!("unknown token {token}"))?;
                let account = config.build_account()?;

                let balance = get_unified_balance(&account, &token).await?;
                info!(token = %token.symbol, total = %balance.total_balance, "Fetched unified balance");
                println!("{}", serde_json::to_string_pretty(&balance)?);
            }
            Command::Plan { token, chain, amount } => {
                let token = config.token(&token).ok_or_eyre(format!("unknown token {token}"))?;
                let account = config.build_account()?;
                let plugins: Vec<Arc<dyn BridgePlugin>> = vec![Arc::new(config.across_plugin()?)];

                let unified_balance = get_unified_balance(&account, &token).await?;
                let plan = build_bridge_instructions(
                    &account,
                    BridgeRequest {
                        to_chain_id: chain.id(),
                        amount,
                        unified_balance: &unified_balance,
                        plugins: &plugins,
                        fee_reservation: None,
                    },
                )
                .await?;
                info!(
                    instructions = plan.instructions.len(),
                    available = %plan.meta.total_available_on_destination,
                    "Planned bridging"
                );
                println!("{}", serde_json::to_string_pretty(&plan)?);
            }
            Command::Receipt { hash } => {
                let node = config.node_client()?;
                let receipt =
                    wait_for_receipt(&node, hash, &config.explorer, config.wait_options()).await?;
                println!("{}", serde_json::to_string_pretty(&receipt)?);
            }
        }

        Ok(())
    }
}
