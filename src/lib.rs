//! # Supertx
//!
//! Client library for multichain supertransactions: unified balances across chains, bridge route
//! selection, instruction composition, quoting, signing and execution tracking against an
//! execution node.

pub mod account;
pub mod balance;
pub mod bridge;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod execution;
pub mod instructions;
pub mod metrics;
pub mod node;
pub mod nonce;
pub mod quote;
pub mod serde;
pub mod signers;
pub mod signing;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;
