//! Action dispatch.
//!
//! An [`Invocation`] is the state of one `mixer` call while its actions run:
//! the host, the router it runs for, the caller, and the events collected so
//! far. Actions run strictly in order and each sees every earlier effect.

use rust_decimal::Decimal;
use stablemix_ledger::Chain;
use stablemix_types::{Action, Address, PairRegistration, Result, RouterEvent};

use crate::Router;
use crate::allowance::ensure_allowance;
use crate::funding::resolve;

pub(crate) struct Invocation<'a> {
    pub(crate) router: &'a Router,
    pub(crate) chain: &'a mut Chain,
    pub(crate) caller: Address,
    pub(crate) events: Vec<RouterEvent>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(router: &'a Router, chain: &'a mut Chain, caller: Address) -> Self {
        Self {
            router,
            chain,
            caller,
            events: Vec::new(),
        }
    }

    /// The router's own address.
    pub(crate) fn this(&self) -> Address {
        self.router.address()
    }

    pub(crate) fn pair(&self, stablecoin: Address, collateral: Address) -> Result<PairRegistration> {
        self.router.registry().pair(stablecoin, collateral).copied()
    }

    pub(crate) fn balance(&self, token: Address, holder: Address) -> Decimal {
        self.chain.ledger.balance_of(token, holder)
    }

    /// Resolve a router-held amount, honoring the full-balance sentinel.
    pub(crate) fn held(&self, token: Address, amount: Decimal) -> Decimal {
        resolve(amount, self.balance(token, self.this()))
    }

    pub(crate) fn ensure_allowance(
        &mut self,
        token: Address,
        spender: Address,
        amount: Decimal,
    ) -> Result<()> {
        let this = self.this();
        ensure_allowance(&mut self.chain.ledger, this, token, spender, amount)
    }

    pub(crate) fn emit(&mut self, event: RouterEvent) {
        self.events.push(event);
    }

    /// Run one decoded action. Returns `false` if it was skipped.
    pub(crate) fn dispatch(&mut self, index: usize, action: Action) -> Result<bool> {
        let Some(kind) = action.kind() else {
            let tag = action.tag();
            tracing::warn!(index, tag, "Unknown action tag skipped");
            self.emit(RouterEvent::ActionSkipped { index, tag });
            return Ok(false);
        };
        tracing::debug!(index, action = %kind, "Dispatching action");

        match action {
            Action::ClaimRewards(p) => self.claim_rewards(p)?,
            Action::ClaimWeeklyInterest(p) => self.claim_weekly_interest(p)?,
            Action::GaugeDeposit(p) => self.gauge_deposit(p)?,
            Action::Withdraw(p) => self.withdraw(p)?,
            Action::Mint(p) => self.mint(p)?,
            Action::Deposit(p) => self.deposit(p)?,
            Action::OpenPerpetual(p) => self.open_perpetual(p)?,
            Action::AddToPerpetual(p) => self.add_to_perpetual(p)?,
            Action::VeLock(p) => self.ve_lock(p)?,
            Action::Burn(p) => self.burn(p)?,
            Action::Sweep(p) => self.sweep(p)?,
            Action::SweepNative(p) => self.sweep_native(p)?,
            Action::WrapNative(p) => self.wrap_native(p)?,
            Action::UnwrapNative(p) => self.unwrap_native(p)?,
            Action::VaultMint(p) => self.vault_mint(p)?,
            Action::VaultDeposit(p) => self.vault_deposit(p)?,
            Action::VaultRedeem(p) => self.vault_redeem(p)?,
            Action::VaultWithdraw(p) => self.vault_withdraw(p)?,
            Action::Unknown(_) => return Ok(false),
        }
        Ok(true)
    }
}
