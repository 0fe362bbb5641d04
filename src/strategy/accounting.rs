//! Accounting Views
//!
//! Pure arithmetic over a snapshot of balances. The same math backs the
//! in-process views and the live RPC observer.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use super::FeeConfig;
use crate::error::StrategyError;

/// Balances relevant to the strategy at one observation point
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holdings {
    pub idle_want: U256,
    pub staked_want: U256,
    /// Unclaimed reward in the reward pool
    pub pending_reward: U256,
    /// Reward already sitting in the strategy
    pub idle_reward: U256,
    /// Idle balance of the profit-denomination asset (fee asset A)
    pub idle_denomination: U256,
}

impl Holdings {
    pub fn total_held(&self) -> Result<U256, StrategyError> {
        self.idle_want
            .checked_add(self.staked_want)
            .ok_or(StrategyError::Overflow("total held"))
    }

    /// Reward a harvest would have to work with
    pub fn claimable_reward(&self) -> Result<U256, StrategyError> {
        self.pending_reward
            .checked_add(self.idle_reward)
            .ok_or(StrategyError::Overflow("claimable reward"))
    }
}

/// Pending-harvest profit, in the profit-denomination asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitEstimate {
    /// Quoted reward value plus idle denomination balance
    pub gross: U256,
    /// Share of `gross` the fee skim would take
    pub total_fee: U256,
    /// `gross - total_fee`
    pub net: U256,
    /// Harvest caller's share of `total_fee`
    pub caller_reward: U256,
}

/// Turn a quoted reward value into a profit estimate
pub fn estimate_profit(quoted: U256, idle_denomination: U256, fees: &FeeConfig) -> Result<ProfitEstimate, StrategyError> {
    let gross = quoted
        .checked_add(idle_denomination)
        .ok_or(StrategyError::Overflow("gross profit"))?;
    let total_fee = fees.fee_portion(gross)?;
    let caller_reward = fees.caller_share(total_fee)?;

    Ok(ProfitEstimate {
        gross,
        total_fee,
        net: gross - total_fee,
        caller_reward,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_with_default_fees() {
        let estimate = estimate_profit(U256::from(90_000u64), U256::from(10_000u64), &FeeConfig::default()).unwrap();

        assert_eq!(estimate.gross, U256::from(100_000u64));
        assert_eq!(estimate.total_fee, U256::from(2_000u64));
        assert_eq!(estimate.net, U256::from(98_000u64));
        assert_eq!(estimate.caller_reward, U256::from(20u64));
    }

    #[test]
    fn test_nothing_to_estimate() {
        let estimate = estimate_profit(U256::ZERO, U256::ZERO, &FeeConfig::default()).unwrap();
        assert_eq!(estimate, ProfitEstimate::default());
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = estimate_profit(U256::MAX, U256::from(1u64), &FeeConfig::default()).unwrap_err();
        assert!(matches!(err, StrategyError::Overflow("gross profit")));

        let holdings = Holdings {
            idle_want: U256::MAX,
            staked_want: U256::from(1u64),
            ..Holdings::default()
        };
        assert!(holdings.total_held().is_err());
    }

    #[test]
    fn test_zero_denominator_is_reported() {
        let fees = FeeConfig { denominator: 0, ..FeeConfig::default() };
        let err = estimate_profit(U256::from(5u64), U256::ZERO, &fees).unwrap_err();
        assert!(matches!(err, StrategyError::DivisionByZero(_)));
    }

    #[test]
    fn test_total_held_and_claimable() {
        let holdings = Holdings {
            idle_want: U256::from(3u64),
            staked_want: U256::from(4u64),
            pending_reward: U256::from(5u64),
            idle_reward: U256::from(6u64),
            idle_denomination: U256::ZERO,
        };
        assert_eq!(holdings.total_held().unwrap(), U256::from(7u64));
        assert_eq!(holdings.claimable_reward().unwrap(), U256::from(11u64));
    }
}
