//! Swap routes
//!
//! A route is an ordered list of assets, validated once at deployment.
//! Malformed routes never reach the swap adapter.

use alloy_primitives::Address;
use std::ops::Deref;

use crate::config::StrategyConfig;
use crate::error::ConfigError;

/// Ordered multi-hop conversion route, at least two assets long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPath(Vec<Address>);

impl SwapPath {
    pub fn new(name: &'static str, assets: Vec<Address>) -> Result<Self, ConfigError> {
        if assets.len() < 2 {
            return Err(ConfigError::RouteTooShort {
                name,
                len: assets.len(),
            });
        }
        if let Some(hop) = assets.windows(2).find(|hop| hop[0] == hop[1]) {
            return Err(ConfigError::DegenerateRoute { name, asset: hop[0] });
        }
        Ok(Self(assets))
    }

    /// Build `name` from an optional override, else the direct `from -> to` hop,
    /// and check its endpoints.
    fn resolve(
        name: &'static str,
        custom: Option<&Vec<Address>>,
        from: Address,
        to: Address,
    ) -> Result<Self, ConfigError> {
        let path = Self::new(name, custom.cloned().unwrap_or_else(|| vec![from, to]))?;
        if path.source() != from || path.target() != to {
            return Err(ConfigError::RouteEndpoints {
                name,
                expected_from: from,
                expected_to: to,
            });
        }
        Ok(path)
    }

    pub fn source(&self) -> Address {
        self.0[0]
    }

    pub fn target(&self) -> Address {
        self.0[self.0.len() - 1]
    }

    pub fn into_inner(self) -> Vec<Address> {
        self.0
    }
}

impl Deref for SwapPath {
    type Target = [Address];

    fn deref(&self) -> &[Address] {
        &self.0
    }
}

/// The two component assets of the want pair, in pair order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnderlyingPair {
    pub asset0: Address,
    pub asset1: Address,
}

/// The three fixed routes of a deployed strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub reward_to_fee_a: SwapPath,
    pub reward_to_fee_b: SwapPath,
    pub reward_to_asset1: SwapPath,
}

impl Routes {
    pub fn derive(config: &StrategyConfig, underlying: &UnderlyingPair) -> Result<Self, ConfigError> {
        let reward = config.reward_token;
        Ok(Self {
            reward_to_fee_a: SwapPath::resolve(
                "reward_to_fee_a",
                config.routes.reward_to_fee_a.as_ref(),
                reward,
                config.fee_asset_a,
            )?,
            reward_to_fee_b: SwapPath::resolve(
                "reward_to_fee_b",
                config.routes.reward_to_fee_b.as_ref(),
                reward,
                config.fee_asset_b,
            )?,
            reward_to_asset1: SwapPath::resolve(
                "reward_to_asset1",
                config.routes.reward_to_asset1.as_ref(),
                reward,
                underlying.asset1,
            )?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;

    fn underlying() -> UnderlyingPair {
        UnderlyingPair {
            asset0: Address::repeat_byte(0xA0),
            asset1: Address::repeat_byte(0xB0),
        }
    }

    #[test]
    fn test_short_paths_rejected() {
        assert!(matches!(
            SwapPath::new("x", vec![]),
            Err(ConfigError::RouteTooShort { len: 0, .. })
        ));
        assert!(matches!(
            SwapPath::new("x", vec![Address::repeat_byte(1)]),
            Err(ConfigError::RouteTooShort { len: 1, .. })
        ));
    }

    #[test]
    fn test_repeated_hop_rejected() {
        let a = Address::repeat_byte(1);
        assert!(matches!(
            SwapPath::new("x", vec![a, a]),
            Err(ConfigError::DegenerateRoute { .. })
        ));
    }

    #[test]
    fn test_default_routes_are_direct() {
        let config = sample_config();
        let routes = Routes::derive(&config, &underlying()).unwrap();

        assert_eq!(&*routes.reward_to_fee_a, &[config.reward_token, config.fee_asset_a]);
        assert_eq!(&*routes.reward_to_fee_b, &[config.reward_token, config.fee_asset_b]);
        assert_eq!(routes.reward_to_asset1.target(), underlying().asset1);
    }

    #[test]
    fn test_override_used_when_endpoints_match() {
        let mut config = sample_config();
        let hop = Address::repeat_byte(0xEE);
        config.routes.reward_to_fee_a = Some(vec![config.reward_token, hop, config.fee_asset_a]);

        let routes = Routes::derive(&config, &underlying()).unwrap();
        assert_eq!(routes.reward_to_fee_a.len(), 3);
        assert_eq!(routes.reward_to_fee_a[1], hop);
    }

    #[test]
    fn test_override_with_wrong_target_rejected() {
        let mut config = sample_config();
        config.routes.reward_to_asset1 = Some(vec![config.reward_token, config.fee_asset_a]);

        assert!(matches!(
            Routes::derive(&config, &underlying()),
            Err(ConfigError::RouteEndpoints { name: "reward_to_asset1", .. })
        ));
    }
}
