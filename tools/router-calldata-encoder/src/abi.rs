//! Solidity ABI definitions for the Universal Router entrypoints and the V4 router structs.
//!
//! The two `execute` overloads live in separate modules so each keeps the plain `executeCall`
//! name while hashing to its own selector.

use alloy_sol_types::sol;

pub mod with_deadline {
    alloy_sol_types::sol! {
        /// `execute(bytes,bytes[],uint256)`, selector `0x3593564c`.
        function execute(bytes commands, bytes[] inputs, uint256 deadline) external payable;
    }
}

pub mod without_deadline {
    alloy_sol_types::sol! {
        /// `execute(bytes,bytes[])`, selector `0x24856bc3`.
        function execute(bytes commands, bytes[] inputs) external payable;
    }
}

sol! {
    /// V4 pool identifier as the pool manager hashes it.
    #[derive(Debug, PartialEq, Eq)]
    struct PoolKey {
        address currency0;
        address currency1;
        uint24 fee;
        int24 tickSpacing;
        address hooks;
    }

    /// Parameters of the V4 `SWAP_EXACT_IN_SINGLE` action.
    #[derive(Debug, PartialEq, Eq)]
    struct ExactInputSingleParams {
        PoolKey poolKey;
        bool zeroForOne;
        uint128 amountIn;
        uint128 amountOutMinimum;
        bytes hookData;
    }
}
