use alloy::sol;

sol! {
    /// The ERC-4337 v0.7 entrypoint, only the parts needed to read account nonces.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IEntryPoint {
        /// Returns the next nonce of `sender` for the given nonce `key`.
        ///
        /// The key occupies the upper 192 bits of the returned nonce, the sequence the lower 64.
        function getNonce(address sender, uint192 key) external view returns (uint256 nonce);
    }

    /// ERC-7579 account execution entry point.
    #[derive(Debug)]
    interface IERC7579Account {
        /// Executes a single call or a batch of calls depending on `mode`.
        function execute(bytes32 mode, bytes calldata executionCalldata) external payable;
    }
}
