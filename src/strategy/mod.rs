//! LP Compounding Strategy
//!
//! Holds one staked LP position for a vault. A harvest claims the reward,
//! skims fees, turns the rest back into LP and restakes it:
//!
//! ```text
//! ClaimRewards -> ChargeFees -> AddLiquidity -> Restake
//! ```
//!
//! Every public operation runs inside [`atomically`]: on any error the chain
//! is rolled back and nothing the operation did is observable.

mod accounting;
mod fees;
mod harvest;
mod liquidity;
mod path;
mod position;
mod reward_pool;
mod swap;
mod token;

pub use accounting::{estimate_profit, Holdings, ProfitEstimate};
pub use fees::{FeeConfig, FeeSplit};
pub use harvest::{HarvestPhase, HarvestReport};
pub use path::{Routes, SwapPath, UnderlyingPair};
pub use reward_pool::RewardPoolAdapter;
pub use swap::SwapAdapter;

use alloy_primitives::{Address, Log, U256};
use alloy_sol_types::SolEvent;
use tracing::{debug, info, warn};

use crate::abi::{Deposit, EmergencyReclaim, IUniswapV2Pair, Withdraw};
use crate::chain::{atomically, Chain};
use crate::config::StrategyConfig;
use crate::error::{ConfigError, StrategyError};

/// A deployed, immutable strategy.
///
/// The only state kept outside the chain is the time of the last successful
/// harvest.
#[derive(Debug, Clone)]
pub struct Strategy {
    config: StrategyConfig,
    pool_id: U256,
    underlying: UnderlyingPair,
    routes: Routes,
    treasury: Address,
    strategist: Address,
    last_harvest: Option<u64>,
}

impl Strategy {
    /// Validate `config`, decompose the want pair and fix the swap routes.
    pub fn deploy<C: Chain + ?Sized>(chain: &C, config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let treasury = config.treasury().ok_or(ConfigError::EmptyRemitters("fee_remitters"))?;
        let strategist = config.strategist().ok_or(ConfigError::EmptyRemitters("strategists"))?;

        let not_a_pair = |e: StrategyError| ConfigError::NotAPair {
            want: config.want,
            reason: e.to_string(),
        };
        let asset0 = token::query(chain, config.strategy, config.want, &IUniswapV2Pair::token0Call {})
            .map_err(not_a_pair)?;
        let asset1 = token::query(chain, config.strategy, config.want, &IUniswapV2Pair::token1Call {})
            .map_err(not_a_pair)?;
        let underlying = UnderlyingPair { asset0, asset1 };

        let routes = Routes::derive(&config, &underlying)?;

        if config.reward_token != underlying.asset0 {
            warn!(
                "⚠️  Reward token {} is not asset0 {} of the want pair; half of every harvest will not match the pair",
                config.reward_token, underlying.asset0
            );
        }

        info!(
            "🚀 Strategy {} deployed for want {} (pool {})",
            config.strategy, config.want, config.pool_id
        );

        Ok(Self {
            pool_id: config.pool_id(),
            config,
            underlying,
            routes,
            treasury,
            strategist,
            last_harvest: None,
        })
    }

    // ============================================
    // ACCESSORS
    // ============================================

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn address(&self) -> Address {
        self.config.strategy
    }

    pub fn vault(&self) -> Address {
        self.config.vault
    }

    pub fn want(&self) -> Address {
        self.config.want
    }

    pub fn reward_token(&self) -> Address {
        self.config.reward_token
    }

    pub fn pool_id(&self) -> U256 {
        self.pool_id
    }

    pub fn fees(&self) -> &FeeConfig {
        &self.config.fees
    }

    pub fn underlying(&self) -> UnderlyingPair {
        self.underlying
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Asset fees are settled in
    pub fn fee_asset(&self) -> Address {
        if self.config.fee_in_asset_b {
            self.config.fee_asset_b
        } else {
            self.config.fee_asset_a
        }
    }

    /// Route from the reward token to [`Self::fee_asset`]
    pub fn fee_route(&self) -> &SwapPath {
        if self.config.fee_in_asset_b {
            &self.routes.reward_to_fee_b
        } else {
            &self.routes.reward_to_fee_a
        }
    }

    /// (treasury, strategist) payout addresses
    pub fn payouts(&self) -> (Address, Address) {
        (self.treasury, self.strategist)
    }

    /// Timestamp of the last successful harvest
    pub fn last_harvest(&self) -> Option<u64> {
        self.last_harvest
    }

    pub fn swapper(&self) -> SwapAdapter {
        SwapAdapter::new(self.config.strategy, self.config.router)
    }

    pub fn reward_pool(&self) -> RewardPoolAdapter {
        RewardPoolAdapter::new(self.config.strategy, self.config.reward_pool, self.pool_id)
    }

    // ============================================
    // OPERATIONS
    // ============================================

    /// Stake the whole idle want balance. Returns the amount staked.
    pub fn deposit<C: Chain + ?Sized>(&self, chain: &mut C) -> Result<U256, StrategyError> {
        atomically(chain, |chain| {
            let staked = position::deposit_idle(self, chain)?;
            let tvl = self.total_held(chain)?;
            emit(chain, self.address(), Deposit { tvl });
            info!("📥 Deposited {} want (tvl {})", staked, tvl);
            Ok(staked)
        })
    }

    /// Send exactly `amount` want to the vault, unstaking the deficit if needed.
    pub fn withdraw<C: Chain + ?Sized>(&self, chain: &mut C, amount: U256) -> Result<(), StrategyError> {
        if amount.is_zero() {
            debug!("Zero withdraw - nothing to do");
            return Ok(());
        }
        atomically(chain, |chain| {
            position::withdraw(self, chain, amount)?;
            let tvl = self.total_held(chain)?;
            emit(chain, self.address(), Withdraw { tvl });
            info!("📤 Withdrew {} want to vault (tvl {})", amount, tvl);
            Ok(())
        })
    }

    /// Claim, charge fees, add liquidity and restake as one unit.
    ///
    /// `harvester` receives the caller fee.
    pub fn harvest<C: Chain + ?Sized>(&mut self, chain: &mut C, harvester: Address) -> Result<HarvestReport, StrategyError> {
        let strategy = &*self;
        let report = atomically(chain, |chain| harvest::run(strategy, chain, harvester))?;
        self.last_harvest = Some(report.timestamp);
        Ok(report)
    }

    /// Pull the whole stake back to idle, forfeiting pending reward.
    /// Returns the amount reclaimed.
    pub fn emergency_reclaim<C: Chain + ?Sized>(&self, chain: &mut C) -> Result<U256, StrategyError> {
        atomically(chain, |chain| self.reclaim(chain))
    }

    /// Emergency reclaim, then hand every unit of want back to the vault.
    /// Returns the amount sent.
    pub fn retire<C: Chain + ?Sized>(&self, chain: &mut C) -> Result<U256, StrategyError> {
        atomically(chain, |chain| {
            self.reclaim(chain)?;
            let idle = self.balance_of_want(chain)?;
            if !idle.is_zero() {
                token::transfer(chain, self.want(), self.address(), self.vault(), idle)?;
            }
            emit(chain, self.address(), Withdraw { tvl: U256::ZERO });
            info!("🏁 Strategy retired: {} want returned to vault", idle);
            Ok(idle)
        })
    }

    fn reclaim<C: Chain + ?Sized>(&self, chain: &mut C) -> Result<U256, StrategyError> {
        let pool = self.reward_pool();
        let staked = pool.staked(chain)?;
        pool.emergency_unstake_all(chain)?;
        emit(chain, self.address(), EmergencyReclaim { amount: staked });
        warn!("🚨 Emergency reclaim: {} want unstaked, pending reward forfeited", staked);
        Ok(staked)
    }

    // ============================================
    // VIEWS
    // ============================================

    /// Idle want held directly by the strategy
    pub fn balance_of_want<C: Chain + ?Sized>(&self, chain: &C) -> Result<U256, StrategyError> {
        token::balance_of(chain, self.want(), self.address())
    }

    /// Want staked in the reward pool
    pub fn balance_of_pool<C: Chain + ?Sized>(&self, chain: &C) -> Result<U256, StrategyError> {
        self.reward_pool().staked(chain)
    }

    /// Reward pending in the reward pool
    pub fn rewards_available<C: Chain + ?Sized>(&self, chain: &C) -> Result<U256, StrategyError> {
        self.reward_pool().pending_reward(chain)
    }

    /// Idle + staked want
    pub fn total_held<C: Chain + ?Sized>(&self, chain: &C) -> Result<U256, StrategyError> {
        self.holdings(chain)?.total_held()
    }

    pub fn holdings<C: Chain + ?Sized>(&self, chain: &C) -> Result<Holdings, StrategyError> {
        let me = self.address();
        Ok(Holdings {
            idle_want: self.balance_of_want(chain)?,
            staked_want: self.balance_of_pool(chain)?,
            pending_reward: self.rewards_available(chain)?,
            idle_reward: token::balance_of(chain, self.reward_token(), me)?,
            idle_denomination: token::balance_of(chain, self.config.fee_asset_a, me)?,
        })
    }

    /// Quote-only estimate of what a harvest would yield right now,
    /// denominated in fee asset A.
    pub fn estimate_pending_profit<C: Chain + ?Sized>(&self, chain: &C) -> Result<ProfitEstimate, StrategyError> {
        let holdings = self.holdings(chain)?;
        let claimable = holdings.claimable_reward()?;
        let quoted = self
            .swapper()
            .quote(chain, claimable, &self.routes.reward_to_fee_a)?;
        estimate_profit(quoted, holdings.idle_denomination, self.fees())
    }
}

/// Emit `event` as a log of `emitter`
pub(crate) fn emit<C: Chain + ?Sized, E: SolEvent>(chain: &mut C, emitter: Address, event: E) {
    chain.emit(Log {
        address: emitter,
        data: event.encode_log_data(),
    });
}
