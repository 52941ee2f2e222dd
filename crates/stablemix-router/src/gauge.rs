//! Uniform view over the two gauge shapes.
//!
//! Liquidity gauges claim without reporting an amount; staking-rewards
//! contracts report what they paid. Callers see `Option<Decimal>` either way.

use rust_decimal::Decimal;
use stablemix_ledger::Chain;
use stablemix_types::{Address, GaugeKind, GaugeRef, MixerError, Result};

use crate::allowance::ensure_allowance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeAdapter {
    Liquidity(Address),
    StakingRewards(Address),
}

impl GaugeAdapter {
    /// Pick the adapter from the capabilities `gauge` exposes.
    ///
    /// # Errors
    /// `UnknownContract`, or `UnsupportedInterface` if it is neither shape.
    pub fn detect(chain: &Chain, gauge: Address) -> Result<Self> {
        let contract = chain.contract(gauge)?;
        if contract.as_liquidity_gauge().is_some() {
            Ok(Self::Liquidity(gauge))
        } else if contract.as_staking_rewards().is_some() {
            Ok(Self::StakingRewards(gauge))
        } else {
            Err(MixerError::UnsupportedInterface {
                target: gauge,
                interface: "Gauge",
            })
        }
    }

    #[must_use]
    pub fn address(self) -> Address {
        match self {
            Self::Liquidity(address) | Self::StakingRewards(address) => address,
        }
    }

    #[must_use]
    pub fn kind(self) -> GaugeKind {
        match self {
            Self::Liquidity(_) => GaugeKind::Liquidity,
            Self::StakingRewards(_) => GaugeKind::StakingRewards,
        }
    }

    #[must_use]
    pub fn to_ref(self) -> GaugeRef {
        GaugeRef {
            address: self.address(),
            kind: self.kind(),
        }
    }

    /// # Errors
    /// `UnknownContract`, `UnsupportedInterface`.
    pub fn staking_token(self, chain: &Chain) -> Result<Address> {
        match self {
            Self::Liquidity(gauge) => Ok(chain.liquidity_gauge(gauge)?.staking_token()),
            Self::StakingRewards(gauge) => Ok(chain.staking_rewards(gauge)?.staking_token()),
        }
    }

    /// Stake `amount` of the router's staking tokens for `beneficiary`.
    ///
    /// # Errors
    /// Whatever the gauge or the ledger reports.
    pub fn stake(
        self,
        chain: &mut Chain,
        router: Address,
        beneficiary: Address,
        amount: Decimal,
    ) -> Result<()> {
        let token = self.staking_token(chain)?;
        ensure_allowance(&mut chain.ledger, router, token, self.address(), amount)?;
        match self {
            Self::Liquidity(gauge) => chain.liquidity_gauge_deposit(gauge, router, amount, beneficiary),
            Self::StakingRewards(gauge) => {
                chain.staking_rewards_stake_for(gauge, router, beneficiary, amount)
            }
        }
    }

    /// Claim `user`'s rewards.
    ///
    /// # Errors
    /// Whatever the gauge reports.
    pub fn claim(self, chain: &mut Chain, router: Address, user: Address) -> Result<Option<Decimal>> {
        match self {
            Self::Liquidity(gauge) => {
                chain.liquidity_gauge_claim(gauge, router, user)?;
                Ok(None)
            }
            Self::StakingRewards(gauge) => chain.staking_rewards_claim(gauge, router, user).map(Some),
        }
    }
}

impl From<GaugeRef> for GaugeAdapter {
    fn from(gauge: GaugeRef) -> Self {
        match gauge.kind {
            GaugeKind::Liquidity => Self::Liquidity(gauge.address),
            GaugeKind::StakingRewards => Self::StakingRewards(gauge.address),
        }
    }
}
