//! Reward Pool Adapter
//!
//! MasterChef style staking keyed by a pool id. Every deposit and withdraw
//! on the pool also flushes pending reward to the caller.

use alloy_primitives::{Address, U256};

use super::token;
use crate::abi::IRewardPool;
use crate::chain::Chain;
use crate::error::StrategyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardPoolAdapter {
    pub owner: Address,
    pub reward_pool: Address,
    pub pool_id: U256,
}

impl RewardPoolAdapter {
    pub fn new(owner: Address, reward_pool: Address, pool_id: U256) -> Self {
        Self {
            owner,
            reward_pool,
            pool_id,
        }
    }

    /// Stake `amount` of the pool's LP token. The pool pulls it via allowance.
    pub fn stake<C: Chain + ?Sized>(&self, chain: &mut C, want: Address, amount: U256) -> Result<(), StrategyError> {
        token::increase_allowance(chain, want, self.owner, self.reward_pool, amount)?;
        token::invoke_void(
            chain,
            self.owner,
            self.reward_pool,
            &IRewardPool::depositCall {
                pid: self.pool_id,
                amount,
            },
        )
    }

    pub fn unstake<C: Chain + ?Sized>(&self, chain: &mut C, amount: U256) -> Result<(), StrategyError> {
        token::invoke_void(
            chain,
            self.owner,
            self.reward_pool,
            &IRewardPool::withdrawCall {
                pid: self.pool_id,
                amount,
            },
        )
    }

    /// Zero-amount deposit; flushes pending reward into the owner's balance
    pub fn claim<C: Chain + ?Sized>(&self, chain: &mut C) -> Result<(), StrategyError> {
        token::invoke_void(
            chain,
            self.owner,
            self.reward_pool,
            &IRewardPool::depositCall {
                pid: self.pool_id,
                amount: U256::ZERO,
            },
        )
    }

    /// Pull the whole stake out, forfeiting pending reward
    pub fn emergency_unstake_all<C: Chain + ?Sized>(&self, chain: &mut C) -> Result<(), StrategyError> {
        token::invoke_void(
            chain,
            self.owner,
            self.reward_pool,
            &IRewardPool::emergencyWithdrawCall { pid: self.pool_id },
        )
    }

    pub fn staked<C: Chain + ?Sized>(&self, chain: &C) -> Result<U256, StrategyError> {
        let info = token::query(
            chain,
            self.owner,
            self.reward_pool,
            &IRewardPool::userInfoCall {
                pid: self.pool_id,
                user: self.owner,
            },
        )?;
        Ok(info.amount)
    }

    pub fn pending_reward<C: Chain + ?Sized>(&self, chain: &C) -> Result<U256, StrategyError> {
        token::query(
            chain,
            self.owner,
            self.reward_pool,
            &IRewardPool::pendingRewardCall {
                pid: self.pool_id,
                user: self.owner,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MemoryChain;

    const OWNER: Address = Address::repeat_byte(0x51);
    const CHEF: Address = Address::repeat_byte(0xCF);
    const LP: Address = Address::repeat_byte(0xAB);
    const REWARD: Address = Address::repeat_byte(0xA0);

    fn setup() -> (MemoryChain, RewardPoolAdapter) {
        let mut chain = MemoryChain::new(1_000);
        chain.deploy_token(LP);
        chain.deploy_token(REWARD);
        chain.deploy_reward_pool(CHEF, REWARD);
        chain.add_pool(CHEF, U256::from(3u64), LP, U256::from(10u64)).unwrap();
        chain.mint(LP, OWNER, U256::from(5_000u64));
        (chain, RewardPoolAdapter::new(OWNER, CHEF, U256::from(3u64)))
    }

    #[test]
    fn test_stake_and_unstake() {
        let (mut chain, pool) = setup();

        pool.stake(&mut chain, LP, U256::from(5_000u64)).unwrap();
        assert_eq!(pool.staked(&chain).unwrap(), U256::from(5_000u64));
        assert_eq!(chain.balance_of(LP, OWNER), U256::ZERO);

        pool.unstake(&mut chain, U256::from(2_000u64)).unwrap();
        assert_eq!(pool.staked(&chain).unwrap(), U256::from(3_000u64));
        assert_eq!(chain.balance_of(LP, OWNER), U256::from(2_000u64));
    }

    #[test]
    fn test_claim_flushes_pending_reward() {
        let (mut chain, pool) = setup();
        pool.stake(&mut chain, LP, U256::from(5_000u64)).unwrap();
        chain.advance_time(60);

        assert_eq!(pool.pending_reward(&chain).unwrap(), U256::from(600u64));
        pool.claim(&mut chain).unwrap();

        assert_eq!(pool.pending_reward(&chain).unwrap(), U256::ZERO);
        assert_eq!(chain.balance_of(REWARD, OWNER), U256::from(600u64));
    }

    #[test]
    fn test_unstake_more_than_staked_reverts() {
        let (mut chain, pool) = setup();
        pool.stake(&mut chain, LP, U256::from(100u64)).unwrap();

        let err = pool.unstake(&mut chain, U256::from(101u64)).unwrap_err();
        assert!(matches!(err, StrategyError::CollaboratorUnavailable { .. }));
    }

    #[test]
    fn test_emergency_unstake_forfeits_pending() {
        let (mut chain, pool) = setup();
        pool.stake(&mut chain, LP, U256::from(5_000u64)).unwrap();
        chain.advance_time(60);

        pool.emergency_unstake_all(&mut chain).unwrap();

        assert_eq!(pool.staked(&chain).unwrap(), U256::ZERO);
        assert_eq!(pool.pending_reward(&chain).unwrap(), U256::ZERO);
        assert_eq!(chain.balance_of(LP, OWNER), U256::from(5_000u64));
        assert_eq!(chain.balance_of(REWARD, OWNER), U256::ZERO);
    }

    #[test]
    fn test_paused_pool_rejects_claim() {
        let (mut chain, pool) = setup();
        chain.set_pool_paused(CHEF, U256::from(3u64), true).unwrap();

        let err = pool.claim(&mut chain).unwrap_err();
        match err {
            StrategyError::CollaboratorUnavailable { reason, .. } => {
                assert_eq!(reason.reason, "RewardPool: pool paused")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
