//! Simulation scenarios
//!
//! A TOML description of a small on-chain world (tokens, pairs, a reward
//! pool) plus the strategy deployed into it. Amounts are decimal strings so
//! 18-decimal balances survive TOML's 64-bit integers.

use alloy_primitives::{Address, U256};
use eyre::{eyre, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::chain::MemoryChain;
use crate::config::StrategyConfig;
use crate::strategy::Strategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSpec {
    pub symbol: String,
    pub address: Address,
}

/// A constant-product pair and its seed reserves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSpec {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: String,
    pub reserve1: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardPoolSpec {
    /// Reward emitted per second to the strategy's pool
    pub reward_per_second: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,

    /// Chain timestamp at genesis
    pub start_time: u64,

    /// Want the vault hands to the strategy before the first round
    pub vault_deposit: String,

    /// Default number of harvest rounds
    #[serde(default = "default_rounds")]
    pub rounds: u32,

    /// Seconds between harvests
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Account calling harvest (receives the caller fee)
    pub harvester: Address,

    pub tokens: Vec<TokenSpec>,
    pub pairs: Vec<PairSpec>,
    pub reward_pool: RewardPoolSpec,
    pub strategy: StrategyConfig,
}

fn default_rounds() -> u32 {
    5
}

fn default_interval() -> u64 {
    3_600
}

fn amount(field: &str, raw: &str) -> Result<U256> {
    U256::from_str(raw.trim()).map_err(|e| eyre!("{} is not a valid amount ({}): {}", field, raw, e))
}

impl ScenarioConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).wrap_err_with(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(content)?;
        Ok(scenario)
    }

    /// Symbol of a known token, else the address
    pub fn symbol_of(&self, address: Address) -> String {
        self.tokens
            .iter()
            .find(|t| t.address == address)
            .map(|t| t.symbol.clone())
            .unwrap_or_else(|| address.to_string())
    }

    pub fn vault_deposit(&self) -> Result<U256> {
        amount("vault_deposit", &self.vault_deposit)
    }

    /// Build the in-memory chain described by this scenario
    pub fn build_chain(&self) -> Result<MemoryChain> {
        let mut chain = MemoryChain::new(self.start_time);
        let cfg = &self.strategy;

        for token in &self.tokens {
            chain.deploy_token(token.address);
        }
        chain.deploy_router(cfg.router);

        for pair in &self.pairs {
            chain.deploy_pair(pair.address, pair.token0, pair.token1);
            let reserve0 = amount("reserve0", &pair.reserve0)?;
            let reserve1 = amount("reserve1", &pair.reserve1)?;
            chain
                .seed_pair(pair.address, reserve0, reserve1)
                .map_err(|e| eyre!("seeding pair {}: {}", pair.address, e))?;
        }

        chain.deploy_reward_pool(cfg.reward_pool, cfg.reward_token);
        let rps = amount("reward_per_second", &self.reward_pool.reward_per_second)?;
        chain
            .add_pool(cfg.reward_pool, cfg.pool_id(), cfg.want, rps)
            .map_err(|e| eyre!("adding pool {}: {}", cfg.pool_id, e))?;

        Ok(chain)
    }

    /// Build the chain, deploy the strategy and stake the vault's deposit
    pub fn prepare(&self) -> Result<(MemoryChain, Strategy)> {
        let mut chain = self.build_chain()?;
        let strategy = Strategy::deploy(&chain, self.strategy.clone())?;

        let deposit = self.vault_deposit()?;
        chain.mint(strategy.want(), strategy.address(), deposit);
        strategy.deposit(&mut chain)?;

        info!("🏗️  Scenario '{}' ready: {} want staked", self.name, deposit);
        Ok((chain, strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../scenarios/cake_bnb.toml");

    #[test]
    fn test_sample_scenario_parses() {
        let scenario = ScenarioConfig::from_toml(SAMPLE).unwrap();

        assert_eq!(scenario.tokens.len(), 3);
        assert_eq!(scenario.pairs.len(), 2);
        assert!(scenario.strategy.validate().is_ok());
        assert_eq!(scenario.symbol_of(scenario.strategy.reward_token), "CAKE");
    }

    #[test]
    fn test_prepare_stakes_vault_deposit() {
        let scenario = ScenarioConfig::from_toml(SAMPLE).unwrap();
        let (chain, strategy) = scenario.prepare().unwrap();

        assert_eq!(strategy.balance_of_pool(&chain).unwrap(), scenario.vault_deposit().unwrap());
        assert_eq!(strategy.underlying().asset0, scenario.strategy.reward_token);
    }

    #[test]
    fn test_scenario_rounds_compound() {
        let scenario = ScenarioConfig::from_toml(SAMPLE).unwrap();
        let (mut chain, mut strategy) = scenario.prepare().unwrap();
        let start = strategy.total_held(&chain).unwrap();

        for _ in 0..3 {
            chain.advance_time(scenario.interval_secs);
            strategy.harvest(&mut chain, scenario.harvester).unwrap();
        }

        assert!(strategy.total_held(&chain).unwrap() > start);
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let mut scenario = ScenarioConfig::from_toml(SAMPLE).unwrap();
        scenario.vault_deposit = "lots".to_string();
        assert!(scenario.prepare().is_err());
    }
}
