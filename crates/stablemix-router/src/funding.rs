//! Pulling caller funds into the invocation.

use rust_decimal::Decimal;
use stablemix_ledger::Ledger;
use stablemix_types::{Address, Result, TransferDeclaration, constants};

/// Resolve the full-balance sentinel against `available`.
#[must_use]
pub fn resolve(amount: Decimal, available: Decimal) -> Decimal {
    if amount == constants::FULL_BALANCE {
        available
    } else {
        amount
    }
}

/// Move `amount` of `token` from `caller` to `to` through the caller's
/// allowance to the router. Returns the amount actually moved.
///
/// # Errors
/// `InsufficientAllowance`, `InsufficientBalance`.
pub fn pull(
    ledger: &mut Ledger,
    router: Address,
    caller: Address,
    token: Address,
    to: Address,
    amount: Decimal,
) -> Result<Decimal> {
    let amount = resolve(amount, ledger.balance_of(token, caller));
    ledger.transfer_from(token, router, caller, to, amount)?;
    Ok(amount)
}

/// Run every transfer declaration in order. Each full-balance amount sees
/// the caller's balance after the transfers before it.
///
/// # Errors
/// The first failing transfer.
pub fn collect_transfers(
    ledger: &mut Ledger,
    router: Address,
    caller: Address,
    transfers: &[TransferDeclaration],
) -> Result<()> {
    for transfer in transfers {
        let moved = pull(
            ledger,
            router,
            caller,
            transfer.token,
            transfer.to,
            transfer.amount,
        )?;
        tracing::debug!(
            token = %transfer.token.short(),
            to = %transfer.to.short(),
            amount = %moved,
            "Funds collected"
        );
    }
    Ok(())
}
