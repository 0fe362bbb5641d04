//! Fee Distributor
//!
//! Skims a share of every harvest, converts it into the fee settlement asset
//! and pays it out three ways: harvest caller, treasury, strategist.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::token;
use super::Strategy;
use crate::abi::ChargedFees;
use crate::chain::Chain;
use crate::error::{ConfigError, StrategyError};

/// Fee rates as numerators over a shared denominator.
///
/// `total_fee` is the share of the harvested reward that is skimmed.
/// `call_fee` and `treasury_fee` split the skimmed amount; `strategist_fee`
/// is carved out of the treasury share, it is not additive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    pub total_fee: u64,
    pub call_fee: u64,
    pub treasury_fee: u64,
    pub strategist_fee: u64,
    pub denominator: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            total_fee: 200,       // 2% of rewards
            call_fee: 100,        // 1% of the fee
            treasury_fee: 9_900,  // 99% of the fee
            strategist_fee: 1_000, // 10% of the treasury share
            denominator: 10_000,
        }
    }
}

impl FeeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.denominator == 0 {
            return Err(ConfigError::ZeroDenominator);
        }
        if self.total_fee > self.denominator {
            return Err(ConfigError::TotalFeeTooHigh {
                total: self.total_fee,
                denominator: self.denominator,
            });
        }
        if self.call_fee.saturating_add(self.treasury_fee) > self.denominator {
            return Err(ConfigError::FeeSplitTooHigh {
                call: self.call_fee,
                treasury: self.treasury_fee,
                denominator: self.denominator,
            });
        }
        if self.strategist_fee > self.denominator {
            return Err(ConfigError::StrategistFeeTooHigh {
                strategist: self.strategist_fee,
                denominator: self.denominator,
            });
        }
        Ok(())
    }

    /// `amount * rate / denominator`, truncating
    fn apply(&self, amount: U256, rate: u64, what: &'static str) -> Result<U256, StrategyError> {
        let scaled = amount
            .checked_mul(U256::from(rate))
            .ok_or(StrategyError::Overflow(what))?;
        scaled
            .checked_div(U256::from(self.denominator))
            .ok_or(StrategyError::DivisionByZero(what))
    }

    /// Portion of a reward balance that is skimmed as fees
    pub fn fee_portion(&self, reward_balance: U256) -> Result<U256, StrategyError> {
        self.apply(reward_balance, self.total_fee, "fee portion")
    }

    /// Caller's share of an already-skimmed fee amount
    pub fn caller_share(&self, fee: U256) -> Result<U256, StrategyError> {
        self.apply(fee, self.call_fee, "caller share")
    }

    /// Three-way split of `fee` (denominated in the settlement asset)
    pub fn split(&self, fee: U256) -> Result<FeeSplit, StrategyError> {
        let call_fee = self.apply(fee, self.call_fee, "call fee")?;
        let treasury_gross = self.apply(fee, self.treasury_fee, "treasury fee")?;
        let strategist_fee = self.apply(treasury_gross, self.strategist_fee, "strategist fee")?;

        let treasury_fee = treasury_gross
            .checked_sub(strategist_fee)
            .ok_or(StrategyError::Overflow("treasury fee"))?;

        Ok(FeeSplit {
            call_fee,
            treasury_fee,
            strategist_fee,
        })
    }
}

/// Amounts paid out by one fee charge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub call_fee: U256,
    pub treasury_fee: U256,
    pub strategist_fee: U256,
}

impl FeeSplit {
    pub fn total(&self) -> U256 {
        self.call_fee + self.treasury_fee + self.strategist_fee
    }

    pub fn is_empty(&self) -> bool {
        self.total().is_zero()
    }
}

/// Skim fees off the current reward balance and pay them out.
///
/// A conversion that yields no settlement asset is a no-op: nothing is
/// transferred and an empty split is returned.
pub(crate) fn charge_fees<C: Chain + ?Sized>(
    strategy: &Strategy,
    chain: &mut C,
    harvester: Address,
) -> Result<FeeSplit, StrategyError> {
    let me = strategy.address();
    let fees = strategy.fees();

    let reward_balance = token::balance_of(chain, strategy.reward_token(), me)?;
    let to_fee_asset = fees.fee_portion(reward_balance)?;
    strategy
        .swapper()
        .swap(chain, to_fee_asset, strategy.fee_route())?;

    let fee_asset = strategy.fee_asset();
    let fee = token::balance_of(chain, fee_asset, me)?;
    if fee.is_zero() {
        debug!("No fee asset after conversion - skipping payouts");
        return Ok(FeeSplit::default());
    }

    let split = fees.split(fee)?;
    let (treasury, strategist) = strategy.payouts();
    token::transfer(chain, fee_asset, me, harvester, split.call_fee)?;
    token::transfer(chain, fee_asset, me, treasury, split.treasury_fee)?;
    token::transfer(chain, fee_asset, me, strategist, split.strategist_fee)?;

    super::emit(
        chain,
        me,
        ChargedFees {
            callFees: split.call_fee,
            treasuryFees: split.treasury_fee,
            strategistFees: split.strategist_fee,
        },
    );

    info!(
        "💸 Fees charged: caller {} | treasury {} | strategist {}",
        split.call_fee, split.treasury_fee, split.strategist_fee
    );
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_fee_truncates_caller_share_to_zero() {
        let split = FeeConfig::default().split(U256::from(20u64)).unwrap();

        // 20 * 100 / 10000 = 0.2 -> 0
        assert_eq!(split.call_fee, U256::ZERO);
        // 20 * 9900 / 10000 = 19.8 -> 19, strategist 19 * 1000 / 10000 = 1.9 -> 1
        assert_eq!(split.strategist_fee, U256::from(1u64));
        assert_eq!(split.treasury_fee, U256::from(18u64));
    }

    #[test]
    fn test_tiny_fee_truncates_every_share() {
        let split = FeeConfig::default().split(U256::from(1u64)).unwrap();
        assert!(split.is_empty());
    }

    #[test]
    fn test_fee_split_with_round_numbers() {
        let split = FeeConfig::default().split(U256::from(10_000u64)).unwrap();

        assert_eq!(split.call_fee, U256::from(100u64));
        assert_eq!(split.strategist_fee, U256::from(990u64));
        assert_eq!(split.treasury_fee, U256::from(8_910u64));
        // treasury before carve-out
        assert_eq!(split.treasury_fee + split.strategist_fee, U256::from(9_900u64));
    }

    #[test]
    fn test_split_sums_to_computed_fraction_within_truncation() {
        let fees = FeeConfig::default();
        for raw in [7u64, 333, 12_345, 999_999, 1_000_000_007] {
            let fee = U256::from(raw);
            let split = fees.split(fee).unwrap();
            let expected = fee * U256::from(fees.call_fee + fees.treasury_fee) / U256::from(fees.denominator);

            assert!(split.total() <= expected);
            // at most one unit lost per truncating division
            assert!(expected - split.total() <= U256::from(2u64), "fee {}", raw);
        }
    }

    #[test]
    fn test_strategist_is_carved_from_treasury() {
        let fees = FeeConfig {
            strategist_fee: 5_000,
            ..FeeConfig::default()
        };
        let split = fees.split(U256::from(1_000_000u64)).unwrap();
        let treasury_gross = U256::from(990_000u64);

        assert_eq!(split.strategist_fee, treasury_gross / U256::from(2u64));
        assert_eq!(split.treasury_fee + split.strategist_fee, treasury_gross);
    }

    #[test]
    fn test_fee_portion() {
        let fees = FeeConfig::default();
        assert_eq!(fees.fee_portion(U256::from(1_000u64)).unwrap(), U256::from(20u64));
        assert_eq!(fees.fee_portion(U256::ZERO).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_zero_denominator_is_an_error_not_a_panic() {
        let fees = FeeConfig { denominator: 0, ..FeeConfig::default() };

        assert!(matches!(
            fees.fee_portion(U256::from(5u64)),
            Err(StrategyError::DivisionByZero("fee portion"))
        ));
        assert!(matches!(fees.split(U256::from(5u64)), Err(StrategyError::DivisionByZero(_))));
    }

    #[test]
    fn test_oversized_strategist_fee_does_not_wrap() {
        let fees = FeeConfig { strategist_fee: 20_000, ..FeeConfig::default() };

        // strategist share (2x treasury) exceeds the treasury share it is carved from
        assert!(matches!(
            fees.split(U256::from(10_000u64)),
            Err(StrategyError::Overflow("treasury fee"))
        ));
    }

    #[test]
    fn test_validation() {
        assert!(FeeConfig::default().validate().is_ok());

        let zero = FeeConfig { denominator: 0, ..FeeConfig::default() };
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroDenominator)));

        let greedy = FeeConfig { total_fee: 10_001, ..FeeConfig::default() };
        assert!(matches!(greedy.validate(), Err(ConfigError::TotalFeeTooHigh { .. })));

        let overlapping = FeeConfig { call_fee: 200, ..FeeConfig::default() };
        assert!(matches!(overlapping.validate(), Err(ConfigError::FeeSplitTooHigh { .. })));

        let strategist = FeeConfig { strategist_fee: 10_001, ..FeeConfig::default() };
        assert!(matches!(
            strategist.validate(),
            Err(ConfigError::StrategistFeeTooHigh { .. })
        ));
    }
}
