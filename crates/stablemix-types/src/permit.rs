//! Signed approval records.
//!
//! A [`PermitRecord`] lets an owner grant a spending allowance without a
//! separate approval step. The owner signs the canonical payload with the
//! ed25519 key their address is derived from; the token ledger checks the
//! signature against its current nonce for the owner and bumps the nonce,
//! so each record is consumed exactly once.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, constants};

/// An off-chain-signed approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitRecord {
    /// Token whose allowance is granted.
    pub token: Address,
    /// Owner of the funds. Must equal `Address::from_public_key(owner_key)`.
    pub owner: Address,
    /// The owner's ed25519 public key.
    pub owner_key: [u8; 32],
    pub spender: Address,
    pub value: Decimal,
    /// Last instant at which the permit may be applied.
    pub deadline: DateTime<Utc>,
    /// Ed25519 signature over [`PermitRecord::signing_payload`].
    pub signature: Vec<u8>,
}

impl PermitRecord {
    /// Canonical signing payload for this record at a given ledger nonce.
    ///
    /// Format: `"stablemix:permit:v1:" || token || owner || spender || value || nonce || deadline`
    #[must_use]
    pub fn signing_payload(&self, nonce: u64) -> Vec<u8> {
        Self::payload(
            self.token,
            self.owner,
            self.spender,
            self.value,
            nonce,
            self.deadline,
        )
    }

    /// Build the signing payload from its parts, before a record exists.
    #[must_use]
    pub fn payload(
        token: Address,
        owner: Address,
        spender: Address,
        value: Decimal,
        nonce: u64,
        deadline: DateTime<Utc>,
    ) -> Vec<u8> {
        let mut payload = Vec::with_capacity(128);
        payload.extend_from_slice(constants::PERMIT_DOMAIN);
        payload.extend_from_slice(token.as_bytes());
        payload.extend_from_slice(owner.as_bytes());
        payload.extend_from_slice(spender.as_bytes());
        payload.extend_from_slice(value.normalize().to_string().as_bytes());
        payload.extend_from_slice(&nonce.to_le_bytes());
        payload.extend_from_slice(&deadline.timestamp().to_le_bytes());
        payload
    }

    /// Whether the deadline has passed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }
}
