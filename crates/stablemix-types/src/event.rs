//! Router events and invocation receipts.
//!
//! Results the router cannot return synchronously (perpetual ids assigned by
//! a manager, reward amounts reported by a gauge) are surfaced as
//! [`RouterEvent`]s. Each successful invocation yields a [`MixerReceipt`]
//! whose digest commits to the ordered event list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, InvocationId, PerpetualId, SwapVenue, constants};

/// Something observable that happened during an invocation or a
/// governance call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterEvent {
    /// An action tag was not recognized and was skipped.
    ActionSkipped { index: usize, tag: u8 },
    Swapped {
        venue: SwapVenue,
        in_token: Address,
        out_token: Address,
        amount_in: Decimal,
        amount_out: Decimal,
    },
    PerpetualOpened {
        perpetual_manager: Address,
        perpetual_id: PerpetualId,
        owner: Address,
    },
    PerpetualMarginAdded {
        perpetual_manager: Address,
        perpetual_id: PerpetualId,
        amount: Decimal,
    },
    /// `amount` is `None` when the source does not report it.
    RewardsClaimed {
        source: Address,
        user: Address,
        amount: Option<Decimal>,
    },
    InterestClaimed {
        distributor: Address,
        user: Address,
        amount: Decimal,
        kept_in_router: bool,
    },
    Swept {
        token: Option<Address>,
        to: Address,
        amount: Decimal,
    },
    StableMasterAdded {
        stablecoin: Address,
        stable_master: Address,
    },
    PairAdded {
        stablecoin: Address,
        collateral: Address,
        pool_manager: Address,
    },
    PairRemoved {
        stablecoin: Address,
        collateral: Address,
    },
    GaugeUpdated {
        stablecoin: Address,
        collateral: Address,
        gauge: Option<Address>,
    },
    AllowanceChanged {
        token: Address,
        spender: Address,
        amount: Decimal,
    },
    Recovered {
        token: Address,
        to: Address,
        amount: Decimal,
    },
}

/// Proof of a completed invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MixerReceipt {
    pub invocation_id: InvocationId,
    pub caller: Address,
    /// Number of actions that ran a handler.
    pub actions_executed: usize,
    /// Number of actions skipped for an unknown tag.
    pub actions_skipped: usize,
    pub events: Vec<RouterEvent>,
    pub completed_at: DateTime<Utc>,
}

impl MixerReceipt {
    /// SHA-256 over the invocation id and the serialized event list.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::RECEIPT_DOMAIN);
        hasher.update(self.invocation_id.0.as_bytes());
        hasher.update(self.caller.as_bytes());
        hasher.update((self.events.len() as u64).to_le_bytes());
        for event in &self.events {
            // Events are plain data; serialization cannot fail.
            let bytes = serde_json::to_vec(event).unwrap_or_default();
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(&bytes);
        }
        hasher.finalize().into()
    }

    /// Hex form of [`MixerReceipt::digest`], for logs.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }

    /// Perpetual ids opened during the invocation, in order.
    #[must_use]
    pub fn opened_perpetuals(&self) -> Vec<PerpetualId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RouterEvent::PerpetualOpened { perpetual_id, .. } => Some(*perpetual_id),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_receipt(events: Vec<RouterEvent>) -> MixerReceipt {
        MixerReceipt {
            invocation_id: InvocationId::new(),
            caller: Address::derive(b"alice"),
            actions_executed: events.len(),
            actions_skipped: 0,
            events,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn digest_commits_to_events() {
        let mut receipt = make_receipt(vec![RouterEvent::ActionSkipped { index: 0, tag: 99 }]);
        let before = receipt.digest();
        assert_eq!(before, receipt.digest());

        receipt.events.push(RouterEvent::ActionSkipped { index: 1, tag: 98 });
        assert_ne!(before, receipt.digest());
        assert_eq!(receipt.digest_hex().len(), 64);
    }

    #[test]
    fn opened_perpetuals_in_order() {
        let manager = Address::derive(b"perp");
        let owner = Address::derive(b"alice");
        let receipt = make_receipt(vec![
            RouterEvent::PerpetualOpened {
                perpetual_manager: manager,
                perpetual_id: PerpetualId(4),
                owner,
            },
            RouterEvent::ActionSkipped { index: 1, tag: 77 },
            RouterEvent::PerpetualOpened {
                perpetual_manager: manager,
                perpetual_id: PerpetualId(5),
                owner,
            },
        ]);
        assert_eq!(
            receipt.opened_perpetuals(),
            vec![PerpetualId(4), PerpetualId(5)]
        );
    }

    #[test]
    fn event_serde_roundtrip() {
        let event = RouterEvent::RewardsClaimed {
            source: Address::derive(b"gauge"),
            user: Address::derive(b"alice"),
            amount: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: RouterEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
