//! Liquidity Adapter
//!
//! Rebalances the reward balance into both sides of the want pair and adds
//! liquidity. Half of the reward goes to asset1; the other half is assumed
//! to already be asset0 (the reward token is expected to be asset0).

use alloy_primitives::U256;
use tracing::debug;

use super::token;
use super::Strategy;
use crate::abi::IUniswapRouterETH;
use crate::chain::Chain;
use crate::error::StrategyError;

/// Swap half the reward into asset1 and add liquidity with both balances.
///
/// Returns the want minted. If either side ends up empty the add is
/// skipped and zero is returned; the single-sided balance stays for a
/// later harvest.
pub(crate) fn add_liquidity<C: Chain + ?Sized>(strategy: &Strategy, chain: &mut C) -> Result<U256, StrategyError> {
    let me = strategy.address();
    let routes = strategy.routes();

    let reward_balance = token::balance_of(chain, strategy.reward_token(), me)?;
    let half = reward_balance / U256::from(2u64);
    strategy.swapper().swap(chain, half, &routes.reward_to_asset1)?;

    let pair = strategy.underlying();
    let amount0 = token::balance_of(chain, pair.asset0, me)?;
    let amount1 = token::balance_of(chain, pair.asset1, me)?;
    if amount0.is_zero() || amount1.is_zero() {
        debug!("Single-sided balance ({} / {}) - liquidity add skipped", amount0, amount1);
        return Ok(U256::ZERO);
    }

    let router = strategy.config().router;
    token::increase_allowance(chain, pair.asset0, me, router, amount0)?;
    token::increase_allowance(chain, pair.asset1, me, router, amount1)?;

    let added = token::invoke(
        chain,
        me,
        router,
        &IUniswapRouterETH::addLiquidityCall {
            tokenA: pair.asset0,
            tokenB: pair.asset1,
            amountADesired: amount0,
            amountBDesired: amount1,
            amountAMin: U256::ZERO,
            amountBMin: U256::ZERO,
            to: me,
            deadline: U256::from(chain.block_timestamp()),
        },
    )?;

    debug!(
        "Added liquidity: {} + {} -> {} want",
        added.amountA, added.amountB, added.liquidity
    );
    Ok(added.liquidity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::tests::{fixture, Fixture};

    #[test]
    fn test_add_liquidity_mints_want_from_reward() {
        let Fixture { mut chain, strategy, .. } = fixture();
        let me = strategy.address();
        chain.mint(strategy.reward_token(), me, U256::from(1_000_000u64));

        let minted = add_liquidity(&strategy, &mut chain).unwrap();

        assert!(!minted.is_zero());
        assert_eq!(chain.balance_of(strategy.want(), me), minted);
        // the unconsumed side is at most rounding dust
        let pair = strategy.underlying();
        let dust0 = chain.balance_of(pair.asset0, me);
        let dust1 = chain.balance_of(pair.asset1, me);
        assert!(dust0.is_zero() || dust1.is_zero());
    }

    #[test]
    fn test_single_sided_balance_is_skipped() {
        let Fixture { mut chain, strategy, .. } = fixture();
        let me = strategy.address();
        // one unit of reward: half rounds to zero, no asset1 appears
        chain.mint(strategy.reward_token(), me, U256::from(1u64));

        let minted = add_liquidity(&strategy, &mut chain).unwrap();

        assert_eq!(minted, U256::ZERO);
        assert_eq!(chain.balance_of(strategy.reward_token(), me), U256::from(1u64));
        assert_eq!(chain.balance_of(strategy.want(), me), U256::ZERO);
    }

    #[test]
    fn test_no_reward_is_a_noop() {
        let Fixture { mut chain, strategy, .. } = fixture();
        assert_eq!(add_liquidity(&strategy, &mut chain).unwrap(), U256::ZERO);
        let router = strategy.config().router;
        let asset1 = strategy.underlying().asset1;
        assert_eq!(chain.allowance(asset1, strategy.address(), router), U256::ZERO);
    }
}
