//! Tokenized-vault actions. Exact-output operations are bounded by a maximum
//! input, exact-input operations by a minimum output.

use rust_decimal::Decimal;
use stablemix_types::{
    Address, MixerError, Result, VaultDepositPayload, VaultMintPayload, VaultRedeemPayload,
    VaultWithdrawPayload,
};

use crate::dispatcher::Invocation;

impl Invocation<'_> {
    fn check_vault_asset(&self, vault: Address, token: Address) -> Result<()> {
        let asset = self.chain.vault(vault)?.asset();
        if asset != token {
            return Err(MixerError::InvalidParams {
                reason: format!("vault {vault} takes {asset}, not {token}"),
            });
        }
        Ok(())
    }

    pub(crate) fn vault_mint(&mut self, p: VaultMintPayload) -> Result<()> {
        self.check_vault_asset(p.vault, p.token)?;
        let this = self.this();
        let max_amount_in = self.held(p.token, p.max_amount_in);
        self.ensure_allowance(p.token, p.vault, max_amount_in)?;

        let amount_in = self.chain.vault_mint(p.vault, this, p.shares, p.to)?;
        if amount_in > max_amount_in {
            return Err(MixerError::TooBigAmountIn {
                actual: amount_in,
                maximum: max_amount_in,
            });
        }
        tracing::debug!(vault = %p.vault.short(), shares = %p.shares, %amount_in, "Vault shares minted");
        Ok(())
    }

    pub(crate) fn vault_deposit(&mut self, p: VaultDepositPayload) -> Result<()> {
        self.check_vault_asset(p.vault, p.token)?;
        let this = self.this();
        let amount = self.held(p.token, p.amount);
        self.ensure_allowance(p.token, p.vault, amount)?;

        let shares = self.chain.vault_deposit(p.vault, this, amount, p.to)?;
        check_min(shares, p.min_shares_out)?;
        tracing::debug!(vault = %p.vault.short(), %amount, %shares, "Vault deposit");
        Ok(())
    }

    pub(crate) fn vault_redeem(&mut self, p: VaultRedeemPayload) -> Result<()> {
        let this = self.this();
        // Share tokens live at the vault's address.
        let shares = self.held(p.vault, p.shares);
        let assets = self.chain.vault_redeem(p.vault, this, shares, p.to)?;
        check_min(assets, p.min_amount_out)?;
        tracing::debug!(vault = %p.vault.short(), %shares, %assets, "Vault shares redeemed");
        Ok(())
    }

    pub(crate) fn vault_withdraw(&mut self, p: VaultWithdrawPayload) -> Result<()> {
        let this = self.this();
        let shares = self.chain.vault_withdraw(p.vault, this, p.amount, p.to)?;
        if shares > p.max_shares_in {
            return Err(MixerError::TooBigAmountIn {
                actual: shares,
                maximum: p.max_shares_in,
            });
        }
        tracing::debug!(vault = %p.vault.short(), assets = %p.amount, %shares, "Vault withdrawal");
        Ok(())
    }
}

fn check_min(actual: Decimal, minimum: Decimal) -> Result<()> {
    if actual < minimum {
        return Err(MixerError::TooSmallAmountOut { actual, minimum });
    }
    Ok(())
}
