//! Reward claims, gauge staking and governance-token locking.

use stablemix_types::{
    Address, ClaimRewardsPayload, ClaimWeeklyInterestPayload, GaugeDepositPayload, MixerError,
    PerpetualSource, Result, RouterEvent, VeLockPayload,
};

use crate::dispatcher::Invocation;
use crate::gauge::GaugeAdapter;

impl Invocation<'_> {
    pub(crate) fn claim_rewards(&mut self, p: ClaimRewardsPayload) -> Result<()> {
        let this = self.this();
        for gauge in &p.gauges {
            let adapter = GaugeAdapter::detect(self.chain, *gauge)?;
            let amount = adapter.claim(self.chain, this, p.user)?;
            self.emit(RouterEvent::RewardsClaimed {
                source: *gauge,
                user: p.user,
                amount,
            });
        }

        let managers = self.perpetual_managers(&p)?;
        for (perpetual_id, manager) in p.perpetual_ids.iter().zip(managers) {
            self.chain.perpetual_get_reward(manager, this, *perpetual_id)?;
            let owner = self
                .chain
                .perpetual_manager(manager)?
                .owner_of(*perpetual_id)
                .unwrap_or(p.user);
            self.emit(RouterEvent::RewardsClaimed {
                source: manager,
                user: owner,
                amount: None,
            });
        }
        tracing::debug!(
            user = %p.user.short(),
            gauges = p.gauges.len(),
            perpetuals = p.perpetual_ids.len(),
            "Rewards claimed"
        );
        Ok(())
    }

    /// One manager per perpetual id, in order.
    fn perpetual_managers(&self, p: &ClaimRewardsPayload) -> Result<Vec<Address>> {
        match &p.perpetuals {
            PerpetualSource::Managers(managers) => {
                if managers.len() != p.perpetual_ids.len() {
                    return Err(MixerError::IncompatibleLengths);
                }
                Ok(managers.clone())
            }
            PerpetualSource::Pairs {
                stablecoins,
                collaterals,
            } => {
                if stablecoins.len() != p.perpetual_ids.len()
                    || collaterals.len() != p.perpetual_ids.len()
                {
                    return Err(MixerError::IncompatibleLengths);
                }
                stablecoins
                    .iter()
                    .zip(collaterals)
                    .map(|(stablecoin, collateral)| {
                        Ok(self.pair(*stablecoin, *collateral)?.perpetual_manager)
                    })
                    .collect()
            }
        }
    }

    pub(crate) fn claim_weekly_interest(&mut self, p: ClaimWeeklyInterestPayload) -> Result<()> {
        let this = self.this();
        let amount = self.chain.claim_interest(p.distributor, this, p.user)?;
        if p.keep_in_router && !amount.is_zero() {
            let token = self.chain.interest_distributor(p.distributor)?.token();
            self.chain
                .ledger
                .transfer_from(token, this, p.user, this, amount)?;
        }
        self.emit(RouterEvent::InterestClaimed {
            distributor: p.distributor,
            user: p.user,
            amount,
            kept_in_router: p.keep_in_router,
        });
        Ok(())
    }

    pub(crate) fn gauge_deposit(&mut self, p: GaugeDepositPayload) -> Result<()> {
        let this = self.this();
        let adapter = GaugeAdapter::detect(self.chain, p.gauge)?;
        let staked = adapter.staking_token(self.chain)?;
        if staked != p.staked_token {
            return Err(MixerError::InvalidSanToken {
                gauge: p.gauge,
                staked,
                expected: p.staked_token,
            });
        }
        let amount = if p.take_full_balance {
            self.balance(p.staked_token, this)
        } else {
            self.held(p.staked_token, p.amount)
        };
        adapter.stake(self.chain, this, p.user, amount)?;
        tracing::debug!(
            user = %p.user.short(),
            gauge = %p.gauge.short(),
            %amount,
            "Staked in gauge"
        );
        Ok(())
    }

    pub(crate) fn ve_lock(&mut self, p: VeLockPayload) -> Result<()> {
        let this = self.this();
        let locker = self.router.config().ve_locker;
        let token = self.chain.voting_escrow(locker)?.token();
        let amount = self.held(token, p.amount);
        self.ensure_allowance(token, locker, amount)?;
        self.chain.ve_deposit_for(locker, this, p.user, amount)
    }
}
