//! Collaborator ABIs
//!
//! Solidity interfaces for every contract the strategy talks to, plus the
//! events the strategy itself emits. Both the in-memory chain and the live
//! RPC observer speak exactly these encodings.

use alloy_sol_types::sol;

// ============================================
// SOLIDITY INTERFACES
// ============================================

sol! {
    /// Minimal ERC-20 surface: balance query, transfer, allowance increase
    #[derive(Debug)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function increaseAllowance(address spender, uint256 addedValue) external returns (bool);
    }

    /// Uniswap V2 pair (the "want" asset) - only used to decompose the pair
    #[derive(Debug)]
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
    }

    /// Uniswap V2 style router
    #[derive(Debug)]
    interface IUniswapRouterETH {
        function swapExactTokensForTokens(
            uint256 amountIn,
            uint256 amountOutMin,
            address[] calldata path,
            address to,
            uint256 deadline
        ) external returns (uint256[] memory amounts);

        function addLiquidity(
            address tokenA,
            address tokenB,
            uint256 amountADesired,
            uint256 amountBDesired,
            uint256 amountAMin,
            uint256 amountBMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountA, uint256 amountB, uint256 liquidity);

        function getAmountsOut(uint256 amountIn, address[] calldata path)
            external view returns (uint256[] memory amounts);
    }

    /// MasterChef style staking pool keyed by pool id
    #[derive(Debug)]
    interface IRewardPool {
        function deposit(uint256 pid, uint256 amount) external;
        function withdraw(uint256 pid, uint256 amount) external;
        function emergencyWithdraw(uint256 pid) external;
        function userInfo(uint256 pid, address user)
            external view returns (uint256 amount, uint256 rewardDebt);
        function pendingReward(uint256 pid, address user) external view returns (uint256);
    }

    // ============================================
    // STRATEGY EVENTS
    // ============================================

    #[derive(Debug, PartialEq, Eq)]
    event StratHarvest(address indexed harvester, uint256 wantHarvested, uint256 tvl);

    #[derive(Debug, PartialEq, Eq)]
    event Deposit(uint256 tvl);

    #[derive(Debug, PartialEq, Eq)]
    event Withdraw(uint256 tvl);

    #[derive(Debug, PartialEq, Eq)]
    event ChargedFees(uint256 callFees, uint256 treasuryFees, uint256 strategistFees);

    #[derive(Debug, PartialEq, Eq)]
    event EmergencyReclaim(uint256 amount);
}
