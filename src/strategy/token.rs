//! Token ledger plumbing: typed wrappers over ABI calls.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

use crate::abi::IERC20;
use crate::chain::{Chain, Revert};
use crate::error::StrategyError;

/// State-changing call, decoded into the function's return type
pub(crate) fn invoke<C, T>(chain: &mut C, from: Address, to: Address, call: &T) -> Result<T::Return, StrategyError>
where
    C: Chain + ?Sized,
    T: SolCall,
{
    let output = chain
        .call(from, to, call.abi_encode().into())
        .map_err(|reason| StrategyError::CollaboratorUnavailable {
            target: to,
            call: T::SIGNATURE,
            reason,
        })?;
    T::abi_decode_returns(&output).map_err(|source| StrategyError::MalformedReturn {
        target: to,
        call: T::SIGNATURE,
        source,
    })
}

/// State-changing call to a function without return values
pub(crate) fn invoke_void<C, T>(chain: &mut C, from: Address, to: Address, call: &T) -> Result<(), StrategyError>
where
    C: Chain + ?Sized,
    T: SolCall,
{
    chain
        .call(from, to, call.abi_encode().into())
        .map(|_| ())
        .map_err(|reason| StrategyError::CollaboratorUnavailable {
            target: to,
            call: T::SIGNATURE,
            reason,
        })
}

/// Read-only call
pub(crate) fn query<C, T>(chain: &C, from: Address, to: Address, call: &T) -> Result<T::Return, StrategyError>
where
    C: Chain + ?Sized,
    T: SolCall,
{
    let output = chain
        .static_call(from, to, call.abi_encode().into())
        .map_err(|reason| StrategyError::CollaboratorUnavailable {
            target: to,
            call: T::SIGNATURE,
            reason,
        })?;
    T::abi_decode_returns(&output).map_err(|source| StrategyError::MalformedReturn {
        target: to,
        call: T::SIGNATURE,
        source,
    })
}

pub(crate) fn balance_of<C: Chain + ?Sized>(chain: &C, token: Address, owner: Address) -> Result<U256, StrategyError> {
    query(chain, owner, token, &IERC20::balanceOfCall { account: owner })
}

pub(crate) fn transfer<C: Chain + ?Sized>(
    chain: &mut C,
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<(), StrategyError> {
    let ok = invoke(chain, from, token, &IERC20::transferCall { to, amount })?;
    if !ok {
        return Err(StrategyError::CollaboratorUnavailable {
            target: token,
            call: IERC20::transferCall::SIGNATURE,
            reason: Revert::new("transfer returned false"),
        });
    }
    Ok(())
}

/// Authorise `spender` for `amount` more of `token`
pub(crate) fn increase_allowance<C: Chain + ?Sized>(
    chain: &mut C,
    token: Address,
    owner: Address,
    spender: Address,
    amount: U256,
) -> Result<(), StrategyError> {
    invoke(
        chain,
        owner,
        token,
        &IERC20::increaseAllowanceCall {
            spender,
            addedValue: amount,
        },
    )?;
    Ok(())
}
