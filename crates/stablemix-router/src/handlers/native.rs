//! Sweeps and native-value wrapping.

use stablemix_types::{
    Address, MixerError, Result, RouterEvent, SweepNativePayload, SweepPayload, UnwrapNativePayload,
    WrapNativePayload,
};

use crate::dispatcher::Invocation;
use crate::funding::resolve;

impl Invocation<'_> {
    pub(crate) fn sweep(&mut self, p: SweepPayload) -> Result<()> {
        let this = self.this();
        let balance = self.balance(p.token, this);
        if balance < p.min_amount_out {
            return Err(MixerError::TooSmallAmountOut {
                actual: balance,
                minimum: p.min_amount_out,
            });
        }
        if !balance.is_zero() {
            self.chain.ledger.transfer(p.token, this, p.to, balance)?;
        }
        self.emit(RouterEvent::Swept {
            token: Some(p.token),
            to: p.to,
            amount: balance,
        });
        Ok(())
    }

    pub(crate) fn sweep_native(&mut self, p: SweepNativePayload) -> Result<()> {
        let this = self.this();
        let balance = self.chain.ledger.native_balance(this);
        if balance < p.min_amount_out {
            return Err(MixerError::TooSmallAmountOut {
                actual: balance,
                minimum: p.min_amount_out,
            });
        }
        if !balance.is_zero() {
            self.chain.ledger.transfer_native(this, p.to, balance)?;
        }
        self.emit(RouterEvent::Swept {
            token: None,
            to: p.to,
            amount: balance,
        });
        Ok(())
    }

    pub(crate) fn wrap_native(&mut self, p: WrapNativePayload) -> Result<()> {
        self.check_wrapped_native()?;
        let this = self.this();
        let amount = resolve(p.amount, self.chain.ledger.native_balance(this));
        self.chain.ledger.wrap_native(this, amount)?;
        tracing::debug!(%amount, "Native value wrapped");
        Ok(())
    }

    /// Unwrap the router's whole wrapped balance and send it to `to`.
    pub(crate) fn unwrap_native(&mut self, p: UnwrapNativePayload) -> Result<()> {
        let wrapped = self.check_wrapped_native()?;
        let this = self.this();
        let balance = self.balance(wrapped, this);
        if balance < p.min_amount_out {
            return Err(MixerError::TooSmallAmountOut {
                actual: balance,
                minimum: p.min_amount_out,
            });
        }
        if !balance.is_zero() {
            self.chain.ledger.unwrap_native(this, balance)?;
            self.chain.ledger.transfer_native(this, p.to, balance)?;
        }
        tracing::debug!(amount = %balance, to = %p.to.short(), "Native value unwrapped");
        Ok(())
    }

    fn check_wrapped_native(&self) -> Result<Address> {
        let configured = self.router.config().wrapped_native;
        if self.chain.ledger.wrapped_native() != Some(configured) {
            return Err(MixerError::Configuration(format!(
                "wrapped native token {configured} is not the ledger's"
            )));
        }
        Ok(configured)
    }
}
