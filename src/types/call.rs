//! Calls and per-chain instructions.

use alloy::{
    primitives::{Address, Bytes, ChainId, U256},
    sol,
};
use serde::{Deserialize, Serialize};

sol! {
    /// ERC-7579 execution struct.
    #[derive(Debug, PartialEq, Eq)]
    struct Execution {
        /// The call target.
        address target;
        /// Amount of native value to send to the target.
        uint256 value;
        /// The calldata bytes.
        bytes callData;
    }
}

/// A single call made by the smart account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Call {
    /// The call target.
    pub to: Address,
    /// Native value sent along with the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// The calldata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
    /// Gas limit reserved for this call.
    pub gas_limit: u64,
}

impl Call {
    /// Creates a call to `to` with the given calldata.
    pub fn new(to: Address, data: impl Into<Bytes>, gas_limit: u64) -> Self {
        Self { to, value: None, data: Some(data.into()), gas_limit }
    }

    /// Sets the native value of the call.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    /// Converts the call into its ERC-7579 [`Execution`] form.
    pub fn to_execution(&self) -> Execution {
        Execution {
            target: self.to,
            value: self.value.unwrap_or_default(),
            callData: self.data.clone().unwrap_or_default(),
        }
    }
}

/// An ordered batch of calls executed on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    /// The chain the calls are executed on.
    pub chain_id: ChainId,
    /// The calls, in execution order.
    pub calls: Vec<Call>,
}

impl Instruction {
    /// Creates a new instruction.
    pub fn new(chain_id: ChainId, calls: Vec<Call>) -> Self {
        Self { chain_id, calls }
    }

    /// Returns the sum of all call gas limits, or `None` on overflow.
    pub fn call_gas_limit(&self) -> Option<u64> {
        self.calls.iter().try_fold(0u64, |acc, call| acc.checked_add(call.gas_limit))
    }
}
