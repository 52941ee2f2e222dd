//! Router approvals on the token ledger.
//!
//! Two policies:
//! - [`set_allowance`]: exact target, used by governance. Issues no approval
//!   when the target is already in place, and resets to zero first only for
//!   tokens that refuse a direct non-zero change.
//! - [`ensure_allowance`]: lazy infinite grant, used before delegating to a
//!   venue, vault, locker or gauge. Left outstanding afterwards.

use rust_decimal::Decimal;
use stablemix_ledger::Ledger;
use stablemix_types::{Address, Result, constants};

/// Set `owner`'s allowance of `token` for `spender` to exactly `target`.
/// Returns whether any approval was issued.
///
/// # Errors
/// `UnknownToken`, `NegativeAmount`.
pub fn set_allowance(
    ledger: &mut Ledger,
    owner: Address,
    token: Address,
    spender: Address,
    target: Decimal,
) -> Result<bool> {
    let current = ledger.allowance(token, owner, spender);
    if current == target {
        return Ok(false);
    }
    if ledger.spec(token)?.requires_zero_reset && !current.is_zero() && !target.is_zero() {
        ledger.approve(token, owner, spender, Decimal::ZERO)?;
    }
    ledger.approve(token, owner, spender, target)?;
    tracing::debug!(
        token = %token.short(),
        spender = %spender.short(),
        from = %current,
        to = %target,
        "Allowance changed"
    );
    Ok(true)
}

/// Make sure `spender` may pull at least `needed` of `owner`'s `token`,
/// granting an infinite allowance when it may not.
///
/// # Errors
/// As [`set_allowance`].
pub fn ensure_allowance(
    ledger: &mut Ledger,
    owner: Address,
    token: Address,
    spender: Address,
    needed: Decimal,
) -> Result<()> {
    if ledger.allowance(token, owner, spender) < needed {
        set_allowance(ledger, owner, token, spender, constants::MAX_ALLOWANCE)?;
    }
    Ok(())
}
