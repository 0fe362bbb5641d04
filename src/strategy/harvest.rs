//! Harvest Orchestrator
//!
//! Runs the four phases in order. The caller wraps [`run`] in
//! [`crate::chain::atomically`], so a failure in any phase undoes the earlier
//! ones.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{fees, liquidity, position, token, FeeSplit, Strategy};
use crate::abi::StratHarvest;
use crate::chain::Chain;
use crate::error::StrategyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarvestPhase {
    ClaimRewards,
    ChargeFees,
    AddLiquidity,
    Restake,
}

impl fmt::Display for HarvestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarvestPhase::ClaimRewards => write!(f, "claim rewards"),
            HarvestPhase::ChargeFees => write!(f, "charge fees"),
            HarvestPhase::AddLiquidity => write!(f, "add liquidity"),
            HarvestPhase::Restake => write!(f, "restake"),
        }
    }
}

/// Outcome of one successful harvest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestReport {
    pub harvester: Address,
    /// Reward flushed out of the reward pool by the claim
    pub reward_claimed: U256,
    pub fee_split: FeeSplit,
    /// Want minted by the liquidity step
    pub want_harvested: U256,
    /// Total held after restaking
    pub tvl: U256,
    pub timestamp: u64,
}

fn in_phase<T>(phase: HarvestPhase, result: Result<T, StrategyError>) -> Result<T, StrategyError> {
    if let Err(e) = &result {
        warn!("❌ Harvest aborted during {}: {}", phase, e);
    }
    result
}

/// Flush pending reward; returns how much arrived
fn claim<C: Chain + ?Sized>(strategy: &Strategy, chain: &mut C) -> Result<U256, StrategyError> {
    let (reward, me) = (strategy.reward_token(), strategy.address());
    let before = token::balance_of(chain, reward, me)?;
    strategy.reward_pool().claim(chain)?;
    let after = token::balance_of(chain, reward, me)?;
    Ok(after.saturating_sub(before))
}

pub(crate) fn run<C: Chain + ?Sized>(
    strategy: &Strategy,
    chain: &mut C,
    harvester: Address,
) -> Result<HarvestReport, StrategyError> {
    let me = strategy.address();

    // ========== 1. Claim ==========
    let reward_claimed = in_phase(HarvestPhase::ClaimRewards, claim(strategy, chain))?;
    debug!("Claimed {} reward", reward_claimed);

    // ========== 2. Fees ==========
    let fee_split = in_phase(
        HarvestPhase::ChargeFees,
        fees::charge_fees(strategy, chain, harvester),
    )?;

    // ========== 3. Liquidity ==========
    let want_harvested = in_phase(
        HarvestPhase::AddLiquidity,
        liquidity::add_liquidity(strategy, chain),
    )?;

    // ========== 4. Restake ==========
    in_phase(HarvestPhase::Restake, position::deposit_idle(strategy, chain))?;

    let tvl = strategy.total_held(chain)?;
    super::emit(
        chain,
        me,
        StratHarvest {
            harvester,
            wantHarvested: want_harvested,
            tvl,
        },
    );

    info!(
        "🌾 Harvest by {}: claimed {} reward, compounded {} want (tvl {})",
        harvester, reward_claimed, want_harvested, tvl
    );

    Ok(HarvestReport {
        harvester,
        reward_claimed,
        fee_split,
        want_harvested,
        tvl,
        timestamp: chain.block_timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::tests::{e18, funded, HARVESTER};

    #[test]
    fn test_phase_display() {
        assert_eq!(HarvestPhase::ClaimRewards.to_string(), "claim rewards");
        assert_eq!(HarvestPhase::Restake.to_string(), "restake");
    }

    #[test]
    fn test_run_leaves_no_idle_want() {
        let mut f = funded(e18(10));
        f.chain.advance_time(30);

        let report = run(&f.strategy, &mut f.chain, HARVESTER).unwrap();

        assert_eq!(report.reward_claimed, e18(30));
        assert_eq!(f.strategy.balance_of_want(&f.chain).unwrap(), U256::ZERO);
        assert_eq!(report.timestamp, f.chain.block_timestamp());
    }

    #[test]
    fn test_consecutive_harvests_keep_compounding() {
        let mut f = funded(e18(10));

        f.chain.advance_time(60);
        let first = f.strategy.harvest(&mut f.chain, HARVESTER).unwrap();
        f.chain.advance_time(60);
        let second = f.strategy.harvest(&mut f.chain, HARVESTER).unwrap();

        assert!(second.tvl > first.tvl);
        assert_eq!(f.strategy.last_harvest(), Some(second.timestamp));
        assert!(second.timestamp > first.timestamp);
    }
}
