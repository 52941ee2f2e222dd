//! Stable master actions: deposit, withdraw, mint, burn.

use stablemix_types::{
    BurnPayload, DepositPayload, MintPayload, MixerError, Result, WithdrawPayload,
};

use crate::dispatcher::Invocation;
use crate::gauge::GaugeAdapter;

impl Invocation<'_> {
    pub(crate) fn deposit(&mut self, p: DepositPayload) -> Result<()> {
        let pair = self.pair(p.stablecoin, p.collateral)?;
        let this = self.this();
        let amount = self.held(pair.collateral, p.amount);
        self.ensure_allowance(pair.collateral, pair.stable_master, amount)?;

        match pair.gauge.filter(|_| p.stake_in_gauge) {
            Some(gauge) => {
                let before = self.balance(pair.san_token, this);
                self.chain.stable_master_deposit(
                    pair.stable_master,
                    this,
                    amount,
                    this,
                    pair.pool_manager,
                )?;
                let minted = self.balance(pair.san_token, this) - before;
                GaugeAdapter::from(gauge).stake(self.chain, this, p.user, minted)?;
                tracing::debug!(
                    user = %p.user.short(),
                    %amount,
                    staked = %minted,
                    gauge = %gauge.address.short(),
                    "Deposit staked in gauge"
                );
            }
            None => {
                self.chain.stable_master_deposit(
                    pair.stable_master,
                    this,
                    amount,
                    p.user,
                    pair.pool_manager,
                )?;
            }
        }
        Ok(())
    }

    pub(crate) fn withdraw(&mut self, p: WithdrawPayload) -> Result<()> {
        let pair = self.pair(p.stablecoin, p.collateral)?;
        let this = self.this();
        let amount = self.held(pair.san_token, p.amount);
        self.chain.stable_master_withdraw(
            pair.stable_master,
            this,
            amount,
            this,
            p.dest,
            pair.pool_manager,
        )
    }

    pub(crate) fn mint(&mut self, p: MintPayload) -> Result<()> {
        let pair = self.pair(p.stablecoin, p.collateral)?;
        let this = self.this();
        let amount = self.held(pair.collateral, p.amount);
        self.ensure_allowance(pair.collateral, pair.stable_master, amount)?;

        let before = self.balance(p.stablecoin, p.user);
        self.chain.stable_master_mint(
            pair.stable_master,
            this,
            amount,
            p.user,
            pair.pool_manager,
            p.min_stable_amount,
        )?;
        let minted = self.balance(p.stablecoin, p.user) - before;

        if minted < p.min_stable_amount {
            return Err(MixerError::TooSmallAmountOut {
                actual: minted,
                minimum: p.min_stable_amount,
            });
        }
        if let Some(max) = p.max_mint_rate {
            let rate = amount
                .checked_div(minted)
                .ok_or(MixerError::MintRateExceeded { rate: amount, max })?;
            if rate > max {
                return Err(MixerError::MintRateExceeded { rate, max });
            }
        }
        tracing::debug!(user = %p.user.short(), %amount, %minted, "Stablecoins minted");
        Ok(())
    }

    pub(crate) fn burn(&mut self, p: BurnPayload) -> Result<()> {
        let pair = self.pair(p.stablecoin, p.collateral)?;
        let this = self.this();
        let amount = crate::funding::resolve(p.amount, self.balance(p.stablecoin, p.from));

        if p.from != this {
            let available = self.chain.ledger.allowance(p.stablecoin, p.from, this);
            if available < amount {
                return Err(MixerError::BurnAmountExceedsAllowance {
                    needed: amount,
                    available,
                });
            }
        }
        self.chain.stable_master_burn(
            pair.stable_master,
            this,
            amount,
            p.from,
            p.dest,
            pair.pool_manager,
            p.min_collateral_amount,
        )
    }
}
