//! Swap adapter.
//!
//! Each swap pulls its input from the caller, lets the venue spend it, and
//! judges the result only by the router's balance of `out_token` measured
//! immediately around the venue call. What the venue claims to have paid is
//! ignored.

use stablemix_ledger::revert::decode_error_string;
use stablemix_ledger::{Chain, ExactInputParams};
use stablemix_types::{
    Address, MixerError, Result, RouterConfig, RouterEvent, SwapDeclaration, SwapVenue,
};

use crate::allowance::ensure_allowance;
use crate::funding;

/// Execute one swap declaration. Output stays with the router.
///
/// # Errors
/// Funding errors, venue errors, `ExternalCallFailed` / `InvalidReturnMessage`
/// for aggregator reverts, `TooSmallAmountOut` when the output misses the
/// declared minimum.
pub fn execute_swap(
    chain: &mut Chain,
    router: Address,
    config: &RouterConfig,
    caller: Address,
    swap: &SwapDeclaration,
) -> Result<RouterEvent> {
    let amount_in = funding::pull(
        &mut chain.ledger,
        router,
        caller,
        swap.in_token,
        router,
        swap.amount_in,
    )?;
    let venue = match swap.venue {
        SwapVenue::Amm => config.amm,
        SwapVenue::Aggregator => config.aggregator,
    };
    ensure_allowance(&mut chain.ledger, router, swap.in_token, venue, amount_in)?;

    let before = chain.ledger.balance_of(swap.out_token, router);
    match swap.venue {
        SwapVenue::Amm => {
            let params = ExactInputParams {
                path: swap.args.clone(),
                recipient: router,
                amount_in,
                amount_out_minimum: swap.min_amount_out,
            };
            chain.amm_exact_input(venue, router, params)?;
        }
        SwapVenue::Aggregator => {
            if let Err(revert) = chain.aggregator_execute(venue, router, &swap.args)? {
                return Err(revert_error(&revert));
            }
        }
    }
    let after = chain.ledger.balance_of(swap.out_token, router);

    let amount_out = after - before;
    if amount_out < swap.min_amount_out {
        return Err(MixerError::TooSmallAmountOut {
            actual: amount_out,
            minimum: swap.min_amount_out,
        });
    }

    tracing::debug!(
        venue = %swap.venue,
        in_token = %swap.in_token.short(),
        out_token = %swap.out_token.short(),
        %amount_in,
        %amount_out,
        "Swap executed"
    );
    Ok(RouterEvent::Swapped {
        venue: swap.venue,
        in_token: swap.in_token,
        out_token: swap.out_token,
        amount_in,
        amount_out,
    })
}

/// Map aggregator revert data to an error.
#[must_use]
pub fn revert_error(data: &[u8]) -> MixerError {
    match decode_error_string(data) {
        Some(reason) => MixerError::ExternalCallFailed { reason },
        None => MixerError::InvalidReturnMessage,
    }
}
