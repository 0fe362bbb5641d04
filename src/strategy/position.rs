//! Position Manager: moves want between idle and staked on behalf of the vault.

use alloy_primitives::U256;
use tracing::debug;

use super::token;
use super::Strategy;
use crate::chain::Chain;
use crate::error::StrategyError;

/// Stake the entire idle want balance. Returns the amount staked.
pub(crate) fn deposit_idle<C: Chain + ?Sized>(strategy: &Strategy, chain: &mut C) -> Result<U256, StrategyError> {
    let idle = strategy.balance_of_want(chain)?;
    if idle.is_zero() {
        debug!("No idle want to stake");
        return Ok(U256::ZERO);
    }
    strategy.reward_pool().stake(chain, strategy.want(), idle)?;
    Ok(idle)
}

/// Transfer exactly `amount` want to the vault.
///
/// Idle want is used first; only the deficit is unstaked. Balances are
/// re-read after unstaking rather than assumed.
pub(crate) fn withdraw<C: Chain + ?Sized>(strategy: &Strategy, chain: &mut C, amount: U256) -> Result<(), StrategyError> {
    if amount.is_zero() {
        return Ok(());
    }

    let mut idle = strategy.balance_of_want(chain)?;
    if idle < amount {
        let deficit = amount - idle;
        let pool = strategy.reward_pool();
        let staked = pool.staked(chain)?;
        if staked < deficit {
            return Err(StrategyError::InsufficientStake {
                requested: amount,
                available: idle.saturating_add(staked),
            });
        }

        debug!("Unstaking deficit of {} want", deficit);
        pool.unstake(chain, deficit)?;

        idle = strategy.balance_of_want(chain)?;
        if idle < amount {
            return Err(StrategyError::InsufficientStake {
                requested: amount,
                available: idle,
            });
        }
    }

    token::transfer(chain, strategy.want(), strategy.address(), strategy.vault(), amount)
}
