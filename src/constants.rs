//! Client constants.

use alloy::primitives::{Address, FixedBytes, address, fixed_bytes};
use std::time::Duration;

/// The default execution node URL.
pub const DEFAULT_NODE_URL: &str = "https://network.biconomy.io/";

/// Default interval between two explorer polls while waiting for a receipt.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Default maximum number of explorer polls before giving up on a receipt.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 300;

/// The canonical ERC-4337 v0.7 entrypoint.
///
/// Smart account nonces are read from this contract.
pub const ENTRYPOINT_V07: Address = address!("0x0000000071727De22E5E9d8BAf0edAc6f37da032");

/// Default Across API base URL.
pub const DEFAULT_ACROSS_API_URL: &str = "https://app.across.to/api/";

/// Aggregate supertransaction scan base URL.
pub const DEFAULT_SUPERTX_SCAN_URL: &str = "https://meescan.biconomy.io/details/";

/// User operation scan base URL.
pub const DEFAULT_USER_OP_SCAN_URL: &str = "https://jiffyscan.xyz/userOpHash/";

/// Marker used as calldata for fusion triggers that carry no calldata of their own.
///
/// The quote hash is appended after it, so the chain never sees a bare hash as calldata.
pub const FUSION_EMPTY_CALLDATA_MARKER: FixedBytes<4> = fixed_bytes!("0x00000000");

/// Gas limit attached to an ERC-20 `approve` call built by a bridge plugin.
pub const APPROVE_GAS_LIMIT: u64 = 100_000;

/// Gas limit attached to an Across `depositV3` call.
pub const ACROSS_DEPOSIT_GAS_LIMIT: u64 = 300_000;

/// Scale used for integer route efficiency ratios.
pub const EFFICIENCY_SCALE: u64 = 10_000;
