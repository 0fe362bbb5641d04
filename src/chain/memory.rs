//! In-memory chain
//!
//! A deterministic, journaled stand-in for the real network. Hosts:
//! - ERC-20 ledgers (balances + allowances, shared by every token)
//! - Uniswap V2 style pairs (0.3% fee, LP minting)
//! - A V2 router over those pairs
//! - MasterChef style reward pools with per-second emissions
//!
//! Used by the test-suite and by `compounder simulate`.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, Bytes, Log, U256};
use alloy_sol_types::{SolCall, SolInterface};
use tracing::debug;

use super::{Chain, Revert, SnapshotId};
use crate::abi::{IRewardPool, IUniswapRouterETH, IUniswapV2Pair, IERC20};

/// Liquidity locked forever on the first mint of a pair
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// One external call observed by the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub from: Address,
    pub to: Address,
    pub selector: [u8; 4],
    pub is_static: bool,
}

#[derive(Debug, Clone)]
struct PairState {
    token0: Address,
    token1: Address,
    reserve0: U256,
    reserve1: U256,
    total_supply: U256,
}

#[derive(Debug, Clone, Default)]
struct StakeInfo {
    amount: U256,
    pending: U256,
}

#[derive(Debug, Clone)]
struct PoolInfo {
    lp_token: Address,
    reward_per_second: U256,
    paused: bool,
    stakers: HashMap<Address, StakeInfo>,
}

impl PoolInfo {
    fn total_staked(&self) -> U256 {
        self.stakers.values().fold(U256::ZERO, |acc, s| acc + s.amount)
    }
}

#[derive(Debug, Clone)]
struct RewardPoolState {
    reward_token: Address,
    pools: HashMap<U256, PoolInfo>,
}

#[derive(Debug, Clone, Default)]
struct State {
    tokens: HashSet<Address>,
    routers: HashSet<Address>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    pairs: HashMap<Address, PairState>,
    reward_pools: HashMap<Address, RewardPoolState>,
    logs: Vec<Log>,
}

/// Journaled in-memory chain
#[derive(Debug, Default)]
pub struct MemoryChain {
    timestamp: u64,
    state: State,
    journal: Vec<State>,
    trace: RefCell<Vec<CallRecord>>,
}

impl MemoryChain {
    pub fn new(timestamp: u64) -> Self {
        Self {
            timestamp,
            ..Default::default()
        }
    }

    // ============================================
    // DEPLOYMENT / SETUP
    // ============================================

    pub fn deploy_token(&mut self, token: Address) {
        self.state.tokens.insert(token);
    }

    pub fn deploy_router(&mut self, router: Address) {
        self.state.routers.insert(router);
    }

    /// Deploy a pair contract; its address doubles as the LP token
    pub fn deploy_pair(&mut self, pair: Address, token0: Address, token1: Address) {
        self.state.pairs.insert(
            pair,
            PairState {
                token0,
                token1,
                reserve0: U256::ZERO,
                reserve1: U256::ZERO,
                total_supply: U256::ZERO,
            },
        );
    }

    /// Seed a pair with initial reserves; the seed LP is locked at `Address::ZERO`
    pub fn seed_pair(&mut self, pair: Address, amount0: U256, amount1: U256) -> Result<(), Revert> {
        let (token0, token1) = {
            let p = self.pair(pair)?;
            (p.token0, p.token1)
        };
        self.mint(token0, pair, amount0);
        self.mint(token1, pair, amount1);
        let liquidity = self.mint_liquidity(pair, amount0, amount1)?;
        self.mint(pair, Address::ZERO, liquidity);
        Ok(())
    }

    pub fn deploy_reward_pool(&mut self, reward_pool: Address, reward_token: Address) {
        self.state.reward_pools.insert(
            reward_pool,
            RewardPoolState {
                reward_token,
                pools: HashMap::new(),
            },
        );
    }

    pub fn add_pool(
        &mut self,
        reward_pool: Address,
        pid: U256,
        lp_token: Address,
        reward_per_second: U256,
    ) -> Result<(), Revert> {
        let chef = self
            .state
            .reward_pools
            .get_mut(&reward_pool)
            .ok_or_else(|| Revert::new("reward pool not deployed"))?;
        chef.pools.insert(
            pid,
            PoolInfo {
                lp_token,
                reward_per_second,
                paused: false,
                stakers: HashMap::new(),
            },
        );
        Ok(())
    }

    pub fn set_pool_paused(&mut self, reward_pool: Address, pid: U256, paused: bool) -> Result<(), Revert> {
        self.pool_mut(reward_pool, pid)?.paused = paused;
        Ok(())
    }

    /// Credit `amount` of unclaimed reward to `user` directly
    pub fn accrue_reward(
        &mut self,
        reward_pool: Address,
        pid: U256,
        user: Address,
        amount: U256,
    ) -> Result<(), Revert> {
        let pool = self.pool_mut(reward_pool, pid)?;
        let stake = pool.stakers.entry(user).or_default();
        stake.pending += amount;
        Ok(())
    }

    /// Move the clock forward and stream emissions to stakers pro rata
    pub fn advance_time(&mut self, secs: u64) {
        self.timestamp += secs;
        let elapsed = U256::from(secs);

        for chef in self.state.reward_pools.values_mut() {
            for pool in chef.pools.values_mut() {
                let total = pool.total_staked();
                if total.is_zero() || pool.reward_per_second.is_zero() || pool.paused {
                    continue;
                }
                let emission = pool.reward_per_second * elapsed;
                for stake in pool.stakers.values_mut() {
                    stake.pending += emission * stake.amount / total;
                }
            }
        }
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: U256) {
        *self.state.balances.entry((token, to)).or_default() += amount;
    }

    // ============================================
    // INSPECTION
    // ============================================

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.state
            .balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.state
            .allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn reserves(&self, pair: Address) -> Option<(U256, U256)> {
        self.state.pairs.get(&pair).map(|p| (p.reserve0, p.reserve1))
    }

    pub fn staked(&self, reward_pool: Address, pid: U256, user: Address) -> U256 {
        self.state
            .reward_pools
            .get(&reward_pool)
            .and_then(|c| c.pools.get(&pid))
            .and_then(|p| p.stakers.get(&user))
            .map(|s| s.amount)
            .unwrap_or_default()
    }

    pub fn logs(&self) -> &[Log] {
        &self.state.logs
    }

    pub fn trace(&self) -> Vec<CallRecord> {
        self.trace.borrow().clone()
    }

    pub fn clear_trace(&self) {
        self.trace.borrow_mut().clear();
    }

    // ============================================
    // ERC-20 LEDGER
    // ============================================

    fn move_tokens(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Result<(), Revert> {
        let from_balance = self.balance_of(token, from);
        if from_balance < amount {
            return Err(Revert::new("ERC20: transfer amount exceeds balance"));
        }
        self.state.balances.insert((token, from), from_balance - amount);
        *self.state.balances.entry((token, to)).or_default() += amount;
        Ok(())
    }

    fn spend_allowance(&mut self, token: Address, owner: Address, spender: Address, amount: U256) -> Result<(), Revert> {
        let current = self.allowance(token, owner, spender);
        if current == U256::MAX {
            return Ok(());
        }
        if current < amount {
            return Err(Revert::new("ERC20: insufficient allowance"));
        }
        self.state
            .allowances
            .insert((token, owner, spender), current - amount);
        Ok(())
    }

    fn erc20_call(&mut self, from: Address, token: Address, input: &[u8]) -> Result<Bytes, Revert> {
        let call = IERC20::IERC20Calls::abi_decode(input)
            .map_err(|_| Revert::new("ERC20: unknown selector"))?;

        match call {
            IERC20::IERC20Calls::transfer(c) => {
                self.move_tokens(token, from, c.to, c.amount)?;
                Ok(IERC20::transferCall::abi_encode_returns(&true).into())
            }
            IERC20::IERC20Calls::increaseAllowance(c) => {
                let current = self.allowance(token, from, c.spender);
                let next = current
                    .checked_add(c.addedValue)
                    .ok_or_else(|| Revert::new("ERC20: allowance overflow"))?;
                self.state.allowances.insert((token, from, c.spender), next);
                Ok(IERC20::increaseAllowanceCall::abi_encode_returns(&true).into())
            }
            _ => self.erc20_view(token, call),
        }
    }

    fn erc20_view(&self, token: Address, call: IERC20::IERC20Calls) -> Result<Bytes, Revert> {
        match call {
            IERC20::IERC20Calls::balanceOf(c) => {
                Ok(IERC20::balanceOfCall::abi_encode_returns(&self.balance_of(token, c.account)).into())
            }
            IERC20::IERC20Calls::allowance(c) => Ok(IERC20::allowanceCall::abi_encode_returns(
                &self.allowance(token, c.owner, c.spender),
            )
            .into()),
            _ => Err(Revert::new("state change during static call")),
        }
    }

    // ============================================
    // PAIRS
    // ============================================

    fn pair(&self, pair: Address) -> Result<&PairState, Revert> {
        self.state
            .pairs
            .get(&pair)
            .ok_or_else(|| Revert::new("UniswapV2: PAIR_NOT_FOUND"))
    }

    fn pair_for(&self, a: Address, b: Address) -> Result<Address, Revert> {
        self.state
            .pairs
            .iter()
            .find(|(_, p)| (p.token0 == a && p.token1 == b) || (p.token0 == b && p.token1 == a))
            .map(|(addr, _)| *addr)
            .ok_or_else(|| Revert::new("UniswapV2Library: PAIR_NOT_FOUND"))
    }

    /// Reserves of `pair` oriented as (reserve of `token_in`, reserve of the other side)
    fn oriented_reserves(&self, pair: Address, token_in: Address) -> Result<(U256, U256), Revert> {
        let p = self.pair(pair)?;
        if p.token0 == token_in {
            Ok((p.reserve0, p.reserve1))
        } else {
            Ok((p.reserve1, p.reserve0))
        }
    }

    fn sync(&mut self, pair: Address) -> Result<(), Revert> {
        let (token0, token1) = {
            let p = self.pair(pair)?;
            (p.token0, p.token1)
        };
        let reserve0 = self.balance_of(token0, pair);
        let reserve1 = self.balance_of(token1, pair);
        if let Some(p) = self.state.pairs.get_mut(&pair) {
            p.reserve0 = reserve0;
            p.reserve1 = reserve1;
        }
        Ok(())
    }

    /// Mint LP for tokens already transferred into the pair, then sync
    fn mint_liquidity(&mut self, pair: Address, amount0: U256, amount1: U256) -> Result<U256, Revert> {
        let (reserve0, reserve1, supply) = {
            let p = self.pair(pair)?;
            (p.reserve0, p.reserve1, p.total_supply)
        };

        let mut minted_supply = U256::ZERO;
        let liquidity = if supply.is_zero() {
            let product = amount0
                .checked_mul(amount1)
                .ok_or_else(|| Revert::new("UniswapV2: OVERFLOW"))?;
            let min = U256::from(MINIMUM_LIQUIDITY);
            let root = product.root(2);
            if root <= min {
                return Err(Revert::new("UniswapV2: INSUFFICIENT_LIQUIDITY_MINTED"));
            }
            minted_supply += min;
            root - min
        } else {
            let by0 = amount0 * supply / reserve0;
            let by1 = amount1 * supply / reserve1;
            by0.min(by1)
        };

        if liquidity.is_zero() {
            return Err(Revert::new("UniswapV2: INSUFFICIENT_LIQUIDITY_MINTED"));
        }

        if let Some(p) = self.state.pairs.get_mut(&pair) {
            p.total_supply += liquidity + minted_supply;
        }
        if !minted_supply.is_zero() {
            self.mint(pair, Address::ZERO, minted_supply);
        }
        self.sync(pair)?;
        Ok(liquidity)
    }

    fn pair_view(&self, pair: Address, call: IUniswapV2Pair::IUniswapV2PairCalls) -> Result<Bytes, Revert> {
        let p = self.pair(pair)?;
        match call {
            IUniswapV2Pair::IUniswapV2PairCalls::token0(_) => {
                Ok(IUniswapV2Pair::token0Call::abi_encode_returns(&p.token0).into())
            }
            IUniswapV2Pair::IUniswapV2PairCalls::token1(_) => {
                Ok(IUniswapV2Pair::token1Call::abi_encode_returns(&p.token1).into())
            }
        }
    }

    // ============================================
    // ROUTER
    // ============================================

    fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>, Revert> {
        if path.len() < 2 {
            return Err(Revert::new("UniswapV2Library: INVALID_PATH"));
        }
        if amount_in.is_zero() {
            return Err(Revert::new("UniswapV2Library: INSUFFICIENT_INPUT_AMOUNT"));
        }

        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        for hop in path.windows(2) {
            let pair = self.pair_for(hop[0], hop[1])?;
            let (reserve_in, reserve_out) = self.oriented_reserves(pair, hop[0])?;
            if reserve_in.is_zero() || reserve_out.is_zero() {
                return Err(Revert::new("UniswapV2Library: INSUFFICIENT_LIQUIDITY"));
            }
            let last = amounts[amounts.len() - 1];
            // amountOut = (amountIn * 997 * reserveOut) / (reserveIn * 1000 + amountIn * 997)
            let in_with_fee = last * U256::from(997u64);
            let numerator = in_with_fee * reserve_out;
            let denominator = reserve_in * U256::from(1000u64) + in_with_fee;
            amounts.push(numerator / denominator);
        }
        Ok(amounts)
    }

    fn check_deadline(&self, deadline: U256) -> Result<(), Revert> {
        if deadline < U256::from(self.timestamp) {
            return Err(Revert::new("UniswapV2Router: EXPIRED"));
        }
        Ok(())
    }

    fn router_call(&mut self, from: Address, router: Address, input: &[u8]) -> Result<Bytes, Revert> {
        let call = IUniswapRouterETH::IUniswapRouterETHCalls::abi_decode(input)
            .map_err(|_| Revert::new("UniswapV2Router: unknown selector"))?;

        match call {
            IUniswapRouterETH::IUniswapRouterETHCalls::swapExactTokensForTokens(c) => {
                self.check_deadline(c.deadline)?;
                let amounts = self.amounts_out(c.amountIn, &c.path)?;
                if amounts.iter().skip(1).any(|a| a.is_zero()) {
                    return Err(Revert::new("UniswapV2: INSUFFICIENT_OUTPUT_AMOUNT"));
                }
                if amounts[amounts.len() - 1] < c.amountOutMin {
                    return Err(Revert::new("UniswapV2Router: INSUFFICIENT_OUTPUT_AMOUNT"));
                }

                let first_pair = self.pair_for(c.path[0], c.path[1])?;
                self.spend_allowance(c.path[0], from, router, c.amountIn)?;
                self.move_tokens(c.path[0], from, first_pair, c.amountIn)?;

                let hops = c.path.len() - 1;
                for i in 0..hops {
                    let pair = self.pair_for(c.path[i], c.path[i + 1])?;
                    let recipient = if i + 1 < hops {
                        self.pair_for(c.path[i + 1], c.path[i + 2])?
                    } else {
                        c.to
                    };
                    self.move_tokens(c.path[i + 1], pair, recipient, amounts[i + 1])?;
                    self.sync(pair)?;
                }

                debug!("swap {} -> {:?}", c.amountIn, amounts.last());
                Ok(IUniswapRouterETH::swapExactTokensForTokensCall::abi_encode_returns(&amounts).into())
            }
            IUniswapRouterETH::IUniswapRouterETHCalls::addLiquidity(c) => {
                self.check_deadline(c.deadline)?;
                let pair = self.pair_for(c.tokenA, c.tokenB)?;
                let (reserve_a, reserve_b) = self.oriented_reserves(pair, c.tokenA)?;

                let (amount_a, amount_b) = if reserve_a.is_zero() && reserve_b.is_zero() {
                    (c.amountADesired, c.amountBDesired)
                } else {
                    let b_optimal = c.amountADesired * reserve_b / reserve_a;
                    if b_optimal <= c.amountBDesired {
                        if b_optimal < c.amountBMin {
                            return Err(Revert::new("UniswapV2Router: INSUFFICIENT_B_AMOUNT"));
                        }
                        (c.amountADesired, b_optimal)
                    } else {
                        let a_optimal = c.amountBDesired * reserve_a / reserve_b;
                        if a_optimal < c.amountAMin {
                            return Err(Revert::new("UniswapV2Router: INSUFFICIENT_A_AMOUNT"));
                        }
                        (a_optimal, c.amountBDesired)
                    }
                };

                self.spend_allowance(c.tokenA, from, router, amount_a)?;
                self.spend_allowance(c.tokenB, from, router, amount_b)?;
                self.move_tokens(c.tokenA, from, pair, amount_a)?;
                self.move_tokens(c.tokenB, from, pair, amount_b)?;

                let token0 = self.pair(pair)?.token0;
                let (amount0, amount1) = if token0 == c.tokenA {
                    (amount_a, amount_b)
                } else {
                    (amount_b, amount_a)
                };
                let liquidity = self.mint_liquidity(pair, amount0, amount1)?;
                self.mint(pair, c.to, liquidity);

                Ok(IUniswapRouterETH::addLiquidityCall::abi_encode_returns(
                    &IUniswapRouterETH::addLiquidityReturn {
                        amountA: amount_a,
                        amountB: amount_b,
                        liquidity,
                    },
                )
                .into())
            }
            other => self.router_view(other),
        }
    }

    fn router_view(&self, call: IUniswapRouterETH::IUniswapRouterETHCalls) -> Result<Bytes, Revert> {
        match call {
            IUniswapRouterETH::IUniswapRouterETHCalls::getAmountsOut(c) => {
                let amounts = self.amounts_out(c.amountIn, &c.path)?;
                Ok(IUniswapRouterETH::getAmountsOutCall::abi_encode_returns(&amounts).into())
            }
            _ => Err(Revert::new("state change during static call")),
        }
    }

    // ============================================
    // REWARD POOL
    // ============================================

    fn pool_mut(&mut self, reward_pool: Address, pid: U256) -> Result<&mut PoolInfo, Revert> {
        self.state
            .reward_pools
            .get_mut(&reward_pool)
            .and_then(|c| c.pools.get_mut(&pid))
            .ok_or_else(|| Revert::new("RewardPool: invalid pool"))
    }

    fn pool(&self, reward_pool: Address, pid: U256) -> Result<&PoolInfo, Revert> {
        self.state
            .reward_pools
            .get(&reward_pool)
            .and_then(|c| c.pools.get(&pid))
            .ok_or_else(|| Revert::new("RewardPool: invalid pool"))
    }

    /// Pay out everything pending for `user`
    fn settle_pending(&mut self, reward_pool: Address, pid: U256, user: Address) -> Result<(), Revert> {
        let reward_token = self
            .state
            .reward_pools
            .get(&reward_pool)
            .map(|c| c.reward_token)
            .ok_or_else(|| Revert::new("RewardPool: invalid pool"))?;
        let pending = {
            let stake = self.pool_mut(reward_pool, pid)?.stakers.entry(user).or_default();
            std::mem::take(&mut stake.pending)
        };
        if !pending.is_zero() {
            self.mint(reward_token, user, pending);
        }
        Ok(())
    }

    fn reward_pool_call(&mut self, from: Address, reward_pool: Address, input: &[u8]) -> Result<Bytes, Revert> {
        let call = IRewardPool::IRewardPoolCalls::abi_decode(input)
            .map_err(|_| Revert::new("RewardPool: unknown selector"))?;

        match call {
            IRewardPool::IRewardPoolCalls::deposit(c) => {
                let (lp_token, paused) = {
                    let pool = self.pool(reward_pool, c.pid)?;
                    (pool.lp_token, pool.paused)
                };
                if paused {
                    return Err(Revert::new("RewardPool: pool paused"));
                }
                self.settle_pending(reward_pool, c.pid, from)?;
                if !c.amount.is_zero() {
                    self.spend_allowance(lp_token, from, reward_pool, c.amount)?;
                    self.move_tokens(lp_token, from, reward_pool, c.amount)?;
                    self.pool_mut(reward_pool, c.pid)?
                        .stakers
                        .entry(from)
                        .or_default()
                        .amount += c.amount;
                }
                Ok(Bytes::new())
            }
            IRewardPool::IRewardPoolCalls::withdraw(c) => {
                let (lp_token, paused, staked) = {
                    let pool = self.pool(reward_pool, c.pid)?;
                    let staked = pool.stakers.get(&from).map(|s| s.amount).unwrap_or_default();
                    (pool.lp_token, pool.paused, staked)
                };
                if paused {
                    return Err(Revert::new("RewardPool: pool paused"));
                }
                if staked < c.amount {
                    return Err(Revert::new("withdraw: not good"));
                }
                self.settle_pending(reward_pool, c.pid, from)?;
                if !c.amount.is_zero() {
                    self.pool_mut(reward_pool, c.pid)?
                        .stakers
                        .entry(from)
                        .or_default()
                        .amount -= c.amount;
                    self.move_tokens(lp_token, reward_pool, from, c.amount)?;
                }
                Ok(Bytes::new())
            }
            IRewardPool::IRewardPoolCalls::emergencyWithdraw(c) => {
                let lp_token = self.pool(reward_pool, c.pid)?.lp_token;
                let stake = self
                    .pool_mut(reward_pool, c.pid)?
                    .stakers
                    .remove(&from)
                    .unwrap_or_default();
                if !stake.amount.is_zero() {
                    self.move_tokens(lp_token, reward_pool, from, stake.amount)?;
                }
                Ok(Bytes::new())
            }
            other => self.reward_pool_view(reward_pool, other),
        }
    }

    fn reward_pool_view(&self, reward_pool: Address, call: IRewardPool::IRewardPoolCalls) -> Result<Bytes, Revert> {
        match call {
            IRewardPool::IRewardPoolCalls::userInfo(c) => {
                let amount = self
                    .pool(reward_pool, c.pid)?
                    .stakers
                    .get(&c.user)
                    .map(|s| s.amount)
                    .unwrap_or_default();
                Ok(IRewardPool::userInfoCall::abi_encode_returns(&IRewardPool::userInfoReturn {
                    amount,
                    rewardDebt: U256::ZERO,
                })
                .into())
            }
            IRewardPool::IRewardPoolCalls::pendingReward(c) => {
                let pending = self
                    .pool(reward_pool, c.pid)?
                    .stakers
                    .get(&c.user)
                    .map(|s| s.pending)
                    .unwrap_or_default();
                Ok(IRewardPool::pendingRewardCall::abi_encode_returns(&pending).into())
            }
            _ => Err(Revert::new("state change during static call")),
        }
    }

    fn record(&self, from: Address, to: Address, input: &[u8], is_static: bool) {
        let mut selector = [0u8; 4];
        if input.len() >= 4 {
            selector.copy_from_slice(&input[..4]);
        }
        debug!(
            "{} {} -> {} [0x{}]",
            if is_static { "staticcall" } else { "call" },
            from,
            to,
            hex::encode(selector)
        );
        self.trace.borrow_mut().push(CallRecord {
            from,
            to,
            selector,
            is_static,
        });
    }
}

impl Chain for MemoryChain {
    fn block_timestamp(&self) -> u64 {
        self.timestamp
    }

    fn call(&mut self, from: Address, to: Address, input: Bytes) -> Result<Bytes, Revert> {
        self.record(from, to, &input, false);

        if self.state.pairs.contains_key(&to) {
            if let Ok(call) = IUniswapV2Pair::IUniswapV2PairCalls::abi_decode(&input) {
                return self.pair_view(to, call);
            }
            return self.erc20_call(from, to, &input);
        }
        if self.state.tokens.contains(&to) {
            return self.erc20_call(from, to, &input);
        }
        if self.state.routers.contains(&to) {
            return self.router_call(from, to, &input);
        }
        if self.state.reward_pools.contains_key(&to) {
            return self.reward_pool_call(from, to, &input);
        }
        Err(Revert::new(format!("call to non-contract {}", to)))
    }

    fn static_call(&self, from: Address, to: Address, input: Bytes) -> Result<Bytes, Revert> {
        self.record(from, to, &input, true);

        if self.state.pairs.contains_key(&to) {
            if let Ok(call) = IUniswapV2Pair::IUniswapV2PairCalls::abi_decode(&input) {
                return self.pair_view(to, call);
            }
        }
        if self.state.pairs.contains_key(&to) || self.state.tokens.contains(&to) {
            let call = IERC20::IERC20Calls::abi_decode(&input)
                .map_err(|_| Revert::new("ERC20: unknown selector"))?;
            return self.erc20_view(to, call);
        }
        if self.state.routers.contains(&to) {
            let call = IUniswapRouterETH::IUniswapRouterETHCalls::abi_decode(&input)
                .map_err(|_| Revert::new("UniswapV2Router: unknown selector"))?;
            return self.router_view(call);
        }
        if self.state.reward_pools.contains_key(&to) {
            let call = IRewardPool::IRewardPoolCalls::abi_decode(&input)
                .map_err(|_| Revert::new("RewardPool: unknown selector"))?;
            return self.reward_pool_view(to, call);
        }
        Err(Revert::new(format!("call to non-contract {}", to)))
    }

    fn emit(&mut self, log: Log) {
        self.state.logs.push(log);
    }

    fn snapshot(&mut self) -> SnapshotId {
        self.journal.push(self.state.clone());
        SnapshotId(self.journal.len() - 1)
    }

    fn revert_to(&mut self, id: SnapshotId) {
        if let Some(saved) = self.journal.get(id.0).cloned() {
            self.state = saved;
        }
        self.journal.truncate(id.0);
    }

    fn commit(&mut self, id: SnapshotId) {
        self.journal.truncate(id.0);
    }
}
