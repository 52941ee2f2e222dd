//! The transient records a caller submits with one `mixer` invocation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Action, Address, PermitRecord, Result};

/// Pull `amount` of `token` from the caller to `to`.
///
/// `amount == FULL_BALANCE` resolves to the caller's balance at the moment
/// the transfer runs, after every earlier transfer in the same call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDeclaration {
    pub token: Address,
    pub to: Address,
    pub amount: Decimal,
}

/// Supported swap venues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapVenue {
    /// Fixed-interface AMM; `args` is the encoded route.
    Amm,
    /// Aggregator; `args` is forwarded verbatim.
    Aggregator,
}

impl std::fmt::Display for SwapVenue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amm => write!(f, "AMM"),
            Self::Aggregator => write!(f, "AGGREGATOR"),
        }
    }
}

/// Pull `amount_in` of `in_token` from the caller and swap it for
/// `out_token`, which stays in router custody for later actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDeclaration {
    pub in_token: Address,
    pub out_token: Address,
    pub amount_in: Decimal,
    pub min_amount_out: Decimal,
    pub venue: SwapVenue,
    /// Venue-specific payload.
    pub args: Vec<u8>,
}

/// Everything submitted with one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerCall {
    pub permits: Vec<PermitRecord>,
    pub transfers: Vec<TransferDeclaration>,
    pub swaps: Vec<SwapDeclaration>,
    /// Action tags, parallel to `payloads`.
    pub actions: Vec<u8>,
    pub payloads: Vec<Vec<u8>>,
    /// Native value attached to the call, credited to the router up front.
    #[serde(default)]
    pub native_value: Decimal,
}

impl MixerCall {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn permit(mut self, permit: PermitRecord) -> Self {
        self.permits.push(permit);
        self
    }

    #[must_use]
    pub fn transfer(mut self, token: Address, to: Address, amount: Decimal) -> Self {
        self.transfers.push(TransferDeclaration { token, to, amount });
        self
    }

    #[must_use]
    pub fn swap(mut self, swap: SwapDeclaration) -> Self {
        self.swaps.push(swap);
        self
    }

    #[must_use]
    pub fn native_value(mut self, value: Decimal) -> Self {
        self.native_value = value;
        self
    }

    /// Append an already-encoded action.
    #[must_use]
    pub fn raw_action(mut self, tag: u8, payload: Vec<u8>) -> Self {
        self.actions.push(tag);
        self.payloads.push(payload);
        self
    }

    /// Encode and append an action.
    ///
    /// # Errors
    /// Returns `Serialization` if the payload cannot be encoded.
    pub fn action(self, action: &Action) -> Result<Self> {
        let (tag, payload) = action.encode()?;
        Ok(self.raw_action(tag, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionType, SweepPayload};

    #[test]
    fn builder_keeps_actions_and_payloads_parallel() {
        let call = MixerCall::new()
            .transfer(Address::derive(b"USDC"), Address::derive(b"router"), Decimal::ONE)
            .action(&Action::Sweep(SweepPayload {
                token: Address::derive(b"USDC"),
                min_amount_out: Decimal::ZERO,
                to: Address::derive(b"alice"),
            }))
            .unwrap()
            .raw_action(250, vec![1, 2, 3]);

        assert_eq!(call.transfers.len(), 1);
        assert_eq!(call.actions, vec![ActionType::Sweep.tag(), 250]);
        assert_eq!(call.payloads.len(), 2);
        assert!(call.native_value.is_zero());
    }

    #[test]
    fn venue_display() {
        assert_eq!(SwapVenue::Amm.to_string(), "AMM");
        assert_eq!(SwapVenue::Aggregator.to_string(), "AGGREGATOR");
    }
}
