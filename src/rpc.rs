//! Live observer
//!
//! Evaluates the accounting views of a deployed strategy over JSON-RPC.
//! Read-only: every request is an `eth_call`.

use alloy_primitives::{Address, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use eyre::{eyre, Result};
use tracing::debug;

use crate::abi::{IRewardPool, IUniswapRouterETH, IUniswapV2Pair, IERC20};
use crate::config::StrategyConfig;
use crate::strategy::{estimate_profit, Holdings, ProfitEstimate, Routes, UnderlyingPair};

pub struct RpcObserver {
    rpc_url: String,
    config: StrategyConfig,
}

impl RpcObserver {
    /// Rejects configs that fail [`StrategyConfig::validate`]
    pub fn new(rpc_url: String, config: StrategyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { rpc_url, config })
    }

    async fn call_contract<T: SolCall>(&self, to: Address, call: T) -> Result<T::Return> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url.parse()?);

        let tx = TransactionRequest::default()
            .from(self.config.strategy)
            .to(to)
            .input(call.abi_encode().into());

        let result = provider
            .call(tx)
            .await
            .map_err(|e| eyre!("eth_call {} on {} failed: {}", T::SIGNATURE, to, e))?;

        T::abi_decode_returns(&result).map_err(|e| eyre!("{} on {} returned malformed data: {}", T::SIGNATURE, to, e))
    }

    async fn balance_of(&self, token: Address) -> Result<U256> {
        self.call_contract(token, IERC20::balanceOfCall { account: self.config.strategy })
            .await
    }

    /// The want pair's two assets
    pub async fn underlying(&self) -> Result<UnderlyingPair> {
        let want = self.config.want;
        let (asset0, asset1) = futures::try_join!(
            self.call_contract(want, IUniswapV2Pair::token0Call {}),
            self.call_contract(want, IUniswapV2Pair::token1Call {}),
        )?;
        Ok(UnderlyingPair { asset0, asset1 })
    }

    /// Fetch all balances concurrently
    pub async fn holdings(&self) -> Result<Holdings> {
        let pid = self.config.pool_id();
        let me = self.config.strategy;
        let reward_pool = self.config.reward_pool;

        let (idle_want, staked, pending_reward, idle_reward, idle_denomination) = futures::try_join!(
            self.balance_of(self.config.want),
            self.call_contract(reward_pool, IRewardPool::userInfoCall { pid, user: me }),
            self.call_contract(reward_pool, IRewardPool::pendingRewardCall { pid, user: me }),
            self.balance_of(self.config.reward_token),
            self.balance_of(self.config.fee_asset_a),
        )?;

        Ok(Holdings {
            idle_want,
            staked_want: staked.amount,
            pending_reward,
            idle_reward,
            idle_denomination,
        })
    }

    pub async fn total_held(&self) -> Result<U256> {
        Ok(self.holdings().await?.total_held()?)
    }

    /// Same estimate as [`crate::Strategy::estimate_pending_profit`], quoted
    /// by the live router.
    pub async fn estimate_pending_profit(&self) -> Result<ProfitEstimate> {
        let (holdings, underlying) = futures::try_join!(self.holdings(), self.underlying())?;
        let routes = Routes::derive(&self.config, &underlying)?;

        let claimable = holdings.claimable_reward()?;
        let quoted = if claimable.is_zero() {
            U256::ZERO
        } else {
            let amounts = self
                .call_contract(
                    self.config.router,
                    IUniswapRouterETH::getAmountsOutCall {
                        amountIn: claimable,
                        path: routes.reward_to_fee_a.into_inner(),
                    },
                )
                .await?;
            amounts.last().copied().unwrap_or_default()
        };
        debug!("Quoted {} claimable reward at {}", claimable, quoted);

        Ok(estimate_profit(quoted, holdings.idle_denomination, &self.config.fees)?)
    }
}
