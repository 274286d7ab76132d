//! ABI bindings for the pool, tokens, staking programs and vault.

use alloy::sol;

sol! {
    /// ERC-20 surface shared by BLX, USDC, stBLX and the LP token.
    interface IERC20 {
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    /// Constant-product BLX/USDC pool.
    interface IBLXPool {
        function getReserves() external view returns (uint256 reserve0, uint256 reserve1, uint32 blockTimestampLast);
        function swapFee() external view returns (uint256);
        function tradingEnabled() external view returns (bool);
        function getAmountOut(uint256 amountIn, uint256 reserveIn, uint256 reserveOut) external view returns (uint256 amountOut);
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, bool token0ToToken1, address to) external returns (uint256 amountOut);
        function addLiquidity(uint256 amount0Desired, uint256 amount1Desired, uint256 amount0Min, uint256 amount1Min, address to) external returns (uint256 amount0, uint256 amount1, uint256 liquidity);
        function removeLiquidity(uint256 liquidity, uint256 amount0Min, uint256 amount1Min, address to) external returns (uint256 amount0, uint256 amount1);
    }
}

sol! {
    /// Fixed-lock staking with per-tier APR.
    interface ITieredStaking {
        struct StakeInfo {
            uint256 amount;
            uint256 startTime;
            uint256 lockDuration;
            uint256 apr;
            bool withdrawn;
        }

        function stake(uint256 amount, uint256 lockChoice) external;
        function withdraw(uint256 index) external;
        function pendingReward(address user, uint256 index) external view returns (uint256);
        function stakesLength(address user) external view returns (uint256);
        function getUserStakesInfo(address user) external view returns (StakeInfo[] memory);
        function APR_30D() external view returns (uint256);
        function APR_90D() external view returns (uint256);
        function APR_365D() external view returns (uint256);
    }
}

sol! {
    /// Liquid staking issuing stBLX receipts.
    interface ILiquidStaking {
        function stake(uint256 amount, uint256 lockChoice) external;
        function redeem(uint256 index) external;
        function pendingReward(address user, uint256 index) external view returns (uint256);
        function stakes(address user, uint256 index) external view returns (uint256 amount, uint256 startTime, uint256 lockDuration, uint256 apr);
        function totalStaked() external view returns (uint256);
        function totalRewards() external view returns (uint256);
        function APR_30D() external view returns (uint256);
        function APR_90D() external view returns (uint256);
        function APR_365D() external view returns (uint256);
    }
}

sol! {
    /// Locked-deposit vault with optional auto-staking.
    interface IBLXVault {
        struct Deposit {
            uint256 amount;
            uint256 depositTime;
            uint256 lockUntil;
            bool autoStake;
            bool withdrawn;
        }

        function deposit(uint256 amount, uint256 lockPeriod, bool autoStake) external;
        function withdraw(uint256 depositIndex) external;
        function emergencyWithdraw() external;
        function toggleAutoStake(uint256 depositIndex) external;
        function getUserDeposits(address user) external view returns (Deposit[] memory);
        function getUserDepositCount(address user) external view returns (uint256);
        function calculateWithdrawalAmount(address user, uint256 depositIndex) external view returns (uint256 netAmount, uint256 fee);
        function isDepositLocked(address user, uint256 depositIndex) external view returns (bool);
        function totalUserBalance(address user) external view returns (uint256);
        function totalVaultBalance() external view returns (uint256);
        function totalAutoStaked() external view returns (uint256);
        function NO_LOCK() external view returns (uint256);
        function LOCK_7_DAYS() external view returns (uint256);
        function LOCK_30_DAYS() external view returns (uint256);
        function LOCK_90_DAYS() external view returns (uint256);
    }
}
