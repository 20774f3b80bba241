use alloy::primitives::U256;
use thiserror::Error;

/// Errors related to bridge routing.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The available routes cannot cover the shortfall on the destination chain.
    #[error(
        "insufficient bridge liquidity: required {required}, available {available}, shortfall {shortfall}"
    )]
    InsufficientBridgeLiquidity {
        /// The amount that had to be bridged.
        required: U256,
        /// The amount the routes would deliver on the destination chain.
        available: U256,
        /// `required - available`.
        shortfall: U256,
    },
    /// A bridge provider failed to produce a quote.
    #[error("bridge provider {plugin} failed: {message}")]
    Provider {
        /// Identifier of the failing plugin.
        plugin: &'static str,
        /// Reason reported by the provider.
        message: String,
    },
}
