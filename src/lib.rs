//! Compounder - auto-compounding LP strategy
//!
//! Stakes an LP position in a MasterChef style reward pool on behalf of a
//! vault, and periodically harvests: claim reward, skim fees, re-add
//! liquidity, restake.

pub mod abi;
pub mod chain;
pub mod config;
pub mod error;
pub mod rpc;
pub mod scenario;
pub mod strategy;

pub use chain::{atomically, Chain, MemoryChain, Revert};
pub use config::{HarvestLog, RouteOverrides, StrategyConfig};
pub use error::{ConfigError, StrategyError};
pub use strategy::{FeeConfig, FeeSplit, HarvestReport, Holdings, ProfitEstimate, Strategy};
