//! Strategy Configuration
//!
//! Everything the strategy needs is supplied here, once, before deployment.
//! Nothing in this struct can be changed on a deployed [`crate::Strategy`].

use alloy_primitives::{Address, U256};
use eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::strategy::FeeConfig;

// ============================================
// ROUTE OVERRIDES
// ============================================

/// Optional replacements for the default direct routes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOverrides {
    /// reward -> fee asset A (also the profit-denomination route)
    pub reward_to_fee_a: Option<Vec<Address>>,

    /// reward -> fee asset B
    pub reward_to_fee_b: Option<Vec<Address>>,

    /// reward -> second underlying asset of the want pair
    pub reward_to_asset1: Option<Vec<Address>>,
}

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    // ========== Identity ==========
    /// The strategy's own account; all idle balances live here
    pub strategy: Address,

    /// Vault that deposits into and withdraws from the strategy
    pub vault: Address,

    // ========== Position ==========
    /// Pool-share (LP) asset the strategy accumulates
    pub want: Address,

    /// Pool identifier inside the reward pool
    pub pool_id: u64,

    /// MasterChef style reward pool
    pub reward_pool: Address,

    /// AMM router used for swaps and liquidity
    pub router: Address,

    /// Token paid out by the reward pool
    pub reward_token: Address,

    // ========== Fees ==========
    /// Fee settlement asset A (also the profit-denomination asset)
    pub fee_asset_a: Address,

    /// Fee settlement asset B
    pub fee_asset_b: Address,

    /// Treasury payout destinations; the first one receives the treasury share
    pub fee_remitters: Vec<Address>,

    /// Strategist payout destinations; the first one receives the strategist share
    pub strategists: Vec<Address>,

    #[serde(default)]
    pub fees: FeeConfig,

    /// Settle fees in asset B instead of asset A
    #[serde(default)]
    pub fee_in_asset_b: bool,

    #[serde(default)]
    pub routes: RouteOverrides,
}

impl StrategyConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let fees = FeeConfig {
            total_fee: env_u64("TOTAL_FEE", FeeConfig::default().total_fee)?,
            call_fee: env_u64("CALL_FEE", FeeConfig::default().call_fee)?,
            treasury_fee: env_u64("TREASURY_FEE", FeeConfig::default().treasury_fee)?,
            strategist_fee: env_u64("STRATEGIST_FEE", FeeConfig::default().strategist_fee)?,
            denominator: env_u64("FEE_DENOMINATOR", FeeConfig::default().denominator)?,
        };

        Ok(Self {
            strategy: env_address("STRATEGY_ADDRESS")?,
            vault: env_address("VAULT_ADDRESS")?,
            want: env_address("WANT_ADDRESS")?,
            pool_id: env_u64("POOL_ID", 0)?,
            reward_pool: env_address("REWARD_POOL_ADDRESS")?,
            router: env_address("ROUTER_ADDRESS")?,
            reward_token: env_address("REWARD_TOKEN")?,
            fee_asset_a: env_address("FEE_ASSET_A")?,
            fee_asset_b: env_address("FEE_ASSET_B")?,
            fee_remitters: env_address_list("FEE_REMITTERS")?,
            strategists: env_address_list("STRATEGISTS")?,
            fees,
            fee_in_asset_b: env::var("FEE_IN_ASSET_B")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            routes: RouteOverrides::default(),
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn pool_id(&self) -> U256 {
        U256::from(self.pool_id)
    }

    /// Treasury payout address (first fee remitter)
    pub fn treasury(&self) -> Option<Address> {
        self.fee_remitters.first().copied()
    }

    /// Strategist payout address (first strategist)
    pub fn strategist(&self) -> Option<Address> {
        self.strategists.first().copied()
    }

    /// Validate addresses and fee parameters. Routes are validated when the
    /// underlying pair is known, at deployment.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let addresses = [
            ("strategy", self.strategy),
            ("vault", self.vault),
            ("want", self.want),
            ("reward_pool", self.reward_pool),
            ("router", self.router),
            ("reward_token", self.reward_token),
            ("fee_asset_a", self.fee_asset_a),
            ("fee_asset_b", self.fee_asset_b),
        ];
        for (name, address) in addresses {
            if address == Address::ZERO {
                return Err(ConfigError::ZeroAddress(name));
            }
        }

        match self.treasury() {
            None => return Err(ConfigError::EmptyRemitters("fee_remitters")),
            Some(a) if a == Address::ZERO => return Err(ConfigError::ZeroAddress("treasury")),
            _ => {}
        }
        match self.strategist() {
            None => return Err(ConfigError::EmptyRemitters("strategists")),
            Some(a) if a == Address::ZERO => return Err(ConfigError::ZeroAddress("strategist")),
            _ => {}
        }

        self.fees.validate()
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let fee_asset = if self.fee_in_asset_b { self.fee_asset_b } else { self.fee_asset_a };
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              COMPOUNDER - STRATEGY CONFIGURATION           ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Strategy:     {:<44} ║", format!("{}", self.strategy));
        println!("║ Vault:        {:<44} ║", format!("{}", self.vault));
        println!("║ Want (LP):    {:<44} ║", format!("{}", self.want));
        println!("║ Pool ID:      {:<44} ║", self.pool_id);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ FEES (over {:<6})                                          ║", self.fees.denominator);
        println!("║ • Total:      {:<44} ║", self.fees.total_fee);
        println!("║ • Caller:     {:<44} ║", self.fees.call_fee);
        println!("║ • Treasury:   {:<44} ║", self.fees.treasury_fee);
        println!("║ • Strategist: {:<44} ║", self.fees.strategist_fee);
        println!("║ • Settled in: {:<44} ║", format!("{}", fee_asset));
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Remitters:    {:<44} ║", self.fee_remitters.len());
        println!("║ Strategists:  {:<44} ║", self.strategists.len());
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

fn env_address(key: &str) -> Result<Address> {
    let raw = env::var(key).map_err(|_| eyre!("{} is not set", key))?;
    Address::from_str(raw.trim()).map_err(|e| eyre!("{} is not a valid address: {}", key, e))
}

fn env_address_list(key: &str) -> Result<Vec<Address>> {
    let raw = env::var(key).map_err(|_| eyre!("{} is not set", key))?;
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| Address::from_str(s.trim()).map_err(|e| eyre!("{} contains an invalid address: {}", key, e)))
        .collect()
}

fn env_u64(key: &str, default: u64) -> Result<u64> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| eyre!("{} is not a valid integer: {}", key, e)),
        Err(_) => Ok(default),
    }
}

// ============================================
// HARVEST LOGGER
// ============================================

use chrono::{DateTime, Utc};
use std::io::Write;

/// One harvest, as appended to the JSON-lines harvest log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestLog {
    pub timestamp: DateTime<Utc>,
    pub harvester: String,
    pub reward_claimed: String,
    pub call_fee: String,
    pub treasury_fee: String,
    pub strategist_fee: String,
    pub want_harvested: String,
    pub tvl: String,
}

impl HarvestLog {
    /// Append this log to a file
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================
