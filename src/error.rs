use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::chain::Revert;

/// Failure of a public strategy operation. Any of these aborts the whole
/// operation; the chain is rolled back to its state before the call.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("insufficient stake: {requested} requested, only {available} available")]
    InsufficientStake { requested: U256, available: U256 },

    #[error("swap unavailable along {path:?}: {reason}")]
    SwapUnavailable { path: Vec<Address>, reason: Revert },

    #[error("{call} on {target} failed: {reason}")]
    CollaboratorUnavailable {
        target: Address,
        call: &'static str,
        reason: Revert,
    },

    #[error("{call} on {target} returned malformed data: {source}")]
    MalformedReturn {
        target: Address,
        call: &'static str,
        source: alloy_sol_types::Error,
    },

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),

    #[error("division by zero while computing {0}")]
    DivisionByZero(&'static str),
}

/// Rejected strategy configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must not be the zero address")]
    ZeroAddress(&'static str),

    #[error("{0} must list at least one address")]
    EmptyRemitters(&'static str),

    #[error("fee denominator must be non-zero")]
    ZeroDenominator,

    #[error("total fee {total} exceeds denominator {denominator}")]
    TotalFeeTooHigh { total: u64, denominator: u64 },

    #[error("call fee {call} + treasury fee {treasury} exceeds denominator {denominator}")]
    FeeSplitTooHigh { call: u64, treasury: u64, denominator: u64 },

    #[error("strategist fee {strategist} exceeds denominator {denominator}")]
    StrategistFeeTooHigh { strategist: u64, denominator: u64 },

    #[error("route {name} has {len} asset(s); at least 2 are required")]
    RouteTooShort { name: &'static str, len: usize },

    #[error("route {name} must run from {expected_from} to {expected_to}")]
    RouteEndpoints {
        name: &'static str,
        expected_from: Address,
        expected_to: Address,
    },

    #[error("route {name} repeats {asset} in consecutive hops")]
    DegenerateRoute { name: &'static str, asset: Address },

    #[error("want {want} could not be decomposed into its pair: {reason}")]
    NotAPair { want: Address, reason: String },
}
