//! Permit preprocessing.
//!
//! Signed approvals are applied strictly before any transfer, swap or
//! action of the same invocation. One bad record fails the invocation.

use stablemix_ledger::Ledger;
use stablemix_types::{PermitRecord, Result};

/// Apply every record in order.
///
/// # Errors
/// `PermitNotSupported`, `PermitExpired`, `InvalidSignature` from the first
/// failing record.
pub fn apply_permits(ledger: &mut Ledger, permits: &[PermitRecord]) -> Result<()> {
    for record in permits {
        ledger.permit(record)?;
        tracing::debug!(
            token = %record.token.short(),
            owner = %record.owner.short(),
            spender = %record.spender.short(),
            value = %record.value,
            "Permit applied"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use stablemix_ledger::TokenSpec;
    use stablemix_ledger::testing::Account;
    use stablemix_types::{Address, MixerError};

    use super::*;

    #[test]
    fn second_bad_record_fails_the_batch() {
        let mut ledger = Ledger::new();
        let usdc = ledger.create_token(TokenSpec::new("USDC").with_permit());
        let alice = Account::from_secret([1u8; 32]);
        let router = Address::derive(b"router");
        let deadline = ledger.now() + chrono::Duration::hours(1);

        let good = alice.sign_permit(&ledger, usdc, router, Decimal::new(10, 0), deadline);
        let expired = alice.sign_permit(
            &ledger,
            usdc,
            router,
            Decimal::new(10, 0),
            ledger.now() - chrono::Duration::hours(1),
        );
        let err = apply_permits(&mut ledger, &[good, expired]).unwrap_err();
        assert!(matches!(err, MixerError::PermitExpired));
    }

    #[test]
    fn empty_batch_is_fine() {
        let mut ledger = Ledger::new();
        apply_permits(&mut ledger, &[]).unwrap();
    }
}
