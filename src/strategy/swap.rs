//! Swap Adapter
//!
//! Exact-input swaps through the router. No slippage protection: the
//! minimum output is always zero and the deadline is the current block, so a
//! swap can never sit pending across blocks.

use alloy_primitives::{Address, U256};
use tracing::debug;

use super::token;
use crate::abi::IUniswapRouterETH;
use crate::chain::Chain;
use crate::error::StrategyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAdapter {
    /// Account swapping (and receiving the output)
    pub owner: Address,
    pub router: Address,
}

impl SwapAdapter {
    pub fn new(owner: Address, router: Address) -> Self {
        Self { owner, router }
    }

    /// Swap `amount` of `path[0]` along `path`, returning the amount received.
    ///
    /// A path shorter than two assets, a zero amount, or an amount too small
    /// to produce any output is a no-op: no allowance, no swap, zero returned.
    pub fn swap<C: Chain + ?Sized>(&self, chain: &mut C, amount: U256, path: &[Address]) -> Result<U256, StrategyError> {
        if path.len() < 2 || amount.is_zero() {
            debug!("Swap skipped (amount {}, {} hop(s))", amount, path.len().saturating_sub(1));
            return Ok(U256::ZERO);
        }

        if self.quote(chain, amount, path)?.is_zero() {
            debug!("Swap skipped: {} quotes to nothing along {} hop(s)", amount, path.len() - 1);
            return Ok(U256::ZERO);
        }

        token::increase_allowance(chain, path[0], self.owner, self.router, amount)?;

        let call = IUniswapRouterETH::swapExactTokensForTokensCall {
            amountIn: amount,
            amountOutMin: U256::ZERO,
            path: path.to_vec(),
            to: self.owner,
            deadline: U256::from(chain.block_timestamp()),
        };
        let amounts = token::invoke(chain, self.owner, self.router, &call).map_err(|e| match e {
            StrategyError::CollaboratorUnavailable { reason, .. } => StrategyError::SwapUnavailable {
                path: path.to_vec(),
                reason,
            },
            other => other,
        })?;

        let out = amounts.last().copied().unwrap_or_default();
        debug!("Swapped {} -> {} along {} hop(s)", amount, out, path.len() - 1);
        Ok(out)
    }

    /// Quote `amount` along `path` without executing anything
    pub fn quote<C: Chain + ?Sized>(&self, chain: &C, amount: U256, path: &[Address]) -> Result<U256, StrategyError> {
        if path.len() < 2 || amount.is_zero() {
            return Ok(U256::ZERO);
        }

        let call = IUniswapRouterETH::getAmountsOutCall {
            amountIn: amount,
            path: path.to_vec(),
        };
        let amounts = token::query(chain, self.owner, self.router, &call).map_err(|e| match e {
            StrategyError::CollaboratorUnavailable { reason, .. } => StrategyError::SwapUnavailable {
                path: path.to_vec(),
                reason,
            },
            other => other,
        })?;
        Ok(amounts.last().copied().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MemoryChain;

    const OWNER: Address = Address::repeat_byte(0x51);
    const ROUTER: Address = Address::repeat_byte(0x10);
    const TOKEN_A: Address = Address::repeat_byte(0xA1);
    const TOKEN_B: Address = Address::repeat_byte(0xB2);
    const TOKEN_C: Address = Address::repeat_byte(0xC3);

    fn setup() -> MemoryChain {
        let mut chain = MemoryChain::new(10_000);
        for token in [TOKEN_A, TOKEN_B, TOKEN_C] {
            chain.deploy_token(token);
        }
        chain.deploy_router(ROUTER);
        let ab = Address::repeat_byte(0xAB);
        chain.deploy_pair(ab, TOKEN_A, TOKEN_B);
        chain.seed_pair(ab, U256::from(1_000_000u64), U256::from(1_000_000u64)).unwrap();
        chain.mint(TOKEN_A, OWNER, U256::from(10_000u64));
        chain
    }

    #[test]
    fn test_zero_amount_is_a_noop() {
        let mut chain = setup();
        let swapper = SwapAdapter::new(OWNER, ROUTER);

        let out = swapper.swap(&mut chain, U256::ZERO, &[TOKEN_A, TOKEN_B]).unwrap();

        assert_eq!(out, U256::ZERO);
        assert!(chain.trace().is_empty(), "no external calls expected");
        assert_eq!(chain.balance_of(TOKEN_A, OWNER), U256::from(10_000u64));
    }

    #[test]
    fn test_single_asset_path_is_a_noop() {
        let mut chain = setup();
        let swapper = SwapAdapter::new(OWNER, ROUTER);

        let out = swapper.swap(&mut chain, U256::from(500u64), &[TOKEN_A]).unwrap();

        assert_eq!(out, U256::ZERO);
        assert!(chain.trace().is_empty());
        assert_eq!(chain.allowance(TOKEN_A, OWNER, ROUTER), U256::ZERO);
    }

    #[test]
    fn test_swap_authorises_exact_amount_and_pays_owner() {
        let mut chain = setup();
        let swapper = SwapAdapter::new(OWNER, ROUTER);

        let quoted = swapper.quote(&chain, U256::from(1_000u64), &[TOKEN_A, TOKEN_B]).unwrap();
        let out = swapper.swap(&mut chain, U256::from(1_000u64), &[TOKEN_A, TOKEN_B]).unwrap();

        assert_eq!(out, quoted);
        assert!(!out.is_zero());
        assert_eq!(chain.balance_of(TOKEN_B, OWNER), out);
        assert_eq!(chain.balance_of(TOKEN_A, OWNER), U256::from(9_000u64));
        // allowance fully consumed
        assert_eq!(chain.allowance(TOKEN_A, OWNER, ROUTER), U256::ZERO);
    }

    #[test]
    fn test_dust_that_quotes_to_nothing_is_a_noop() {
        let mut chain = setup();
        let swapper = SwapAdapter::new(OWNER, ROUTER);

        // 1 * 997 * 1e6 / (1e6 * 1000 + 997) rounds down to zero
        let out = swapper.swap(&mut chain, U256::from(1u64), &[TOKEN_A, TOKEN_B]).unwrap();

        assert_eq!(out, U256::ZERO);
        assert_eq!(chain.balance_of(TOKEN_A, OWNER), U256::from(10_000u64));
        assert_eq!(chain.allowance(TOKEN_A, OWNER, ROUTER), U256::ZERO);
        assert!(chain.trace().iter().all(|call| call.is_static));
    }

    #[test]
    fn test_missing_route_liquidity_is_swap_unavailable() {
        let mut chain = setup();
        let swapper = SwapAdapter::new(OWNER, ROUTER);

        let err = swapper
            .swap(&mut chain, U256::from(1_000u64), &[TOKEN_A, TOKEN_C])
            .unwrap_err();
        assert!(matches!(err, StrategyError::SwapUnavailable { .. }));
    }
}
