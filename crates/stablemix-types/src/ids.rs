//! Identifiers used throughout stablemix.
//!
//! Accounts, tokens and contracts share one 20-byte [`Address`] space.
//! Account addresses are derived from an ed25519 public key; token and
//! contract addresses from a label. Invocations use UUIDv7.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte ledger identity (account, token or contract).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Never a valid collaborator.
    pub const ZERO: Self = Self([0u8; 20]);

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Deterministic address for a contract or token label.
    #[must_use]
    pub fn derive(label: &[u8]) -> Self {
        Self::hashed(b"stablemix:address:v1:", label)
    }

    /// Account address owned by an ed25519 public key.
    #[must_use]
    pub fn from_public_key(key: &[u8; 32]) -> Self {
        Self::hashed(b"stablemix:account:v1:", key)
    }

    fn hashed(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        hasher.update(data);
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[..20]);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// First four bytes, hex encoded. For log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address(0x{})", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// PerpetualId
// ---------------------------------------------------------------------------

/// Position identifier assigned by a perpetual manager. Opaque to the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PerpetualId(pub u64);

impl fmt::Display for PerpetualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "perp:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// InvocationId
// ---------------------------------------------------------------------------

/// Unique identifier for one `mixer` invocation. UUIDv7 for time ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct InvocationId(pub Uuid);

impl InvocationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inv:{}", self.0)
    }
}
