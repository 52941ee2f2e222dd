//! Registry records linking a stablecoin to its collateral pools.

use serde::{Deserialize, Serialize};

use crate::Address;

/// What a stable master reports about one of its pool managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralInfo {
    /// Collateral token managed by the pool.
    pub token: Address,
    /// Staking-receipt token minted on deposit.
    pub san_token: Address,
    /// Perpetual manager for this collateral.
    pub perpetual_manager: Address,
}

/// Claim/stake shape exposed by a gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GaugeKind {
    /// Claims report nothing.
    Liquidity,
    /// Claims report the amount paid to the user.
    StakingRewards,
}

impl std::fmt::Display for GaugeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Liquidity => write!(f, "LIQUIDITY"),
            Self::StakingRewards => write!(f, "STAKING_REWARDS"),
        }
    }
}

/// A registered gauge and the shape it was detected with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeRef {
    pub address: Address,
    pub kind: GaugeKind,
}

/// Everything the router knows about one `(stablecoin, collateral)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRegistration {
    pub stablecoin: Address,
    pub collateral: Address,
    pub stable_master: Address,
    pub pool_manager: Address,
    pub perpetual_manager: Address,
    pub san_token: Address,
    pub gauge: Option<GaugeRef>,
}

impl PairRegistration {
    /// Registry key.
    #[must_use]
    pub fn key(&self) -> (Address, Address) {
        (self.stablecoin, self.collateral)
    }
}
