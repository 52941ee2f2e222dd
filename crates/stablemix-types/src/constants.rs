//! System-wide constants for the stablemix router.

use rust_decimal::Decimal;

/// Amount sentinel: "use the holder's full balance at execution time".
pub const FULL_BALANCE: Decimal = Decimal::MAX;

/// Infinite approval. Never decremented by `transfer_from`.
pub const MAX_ALLOWANCE: Decimal = Decimal::MAX;

/// Default cap on the number of actions in a single invocation.
pub const DEFAULT_MAX_ACTIONS_PER_CALL: usize = 256;

/// Selector of the `Error(string)` revert layout.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Domain tag prefixed to every permit signing payload.
pub const PERMIT_DOMAIN: &[u8] = b"stablemix:permit:v1:";

/// Domain tag prefixed to the receipt digest.
pub const RECEIPT_DOMAIN: &[u8] = b"stablemix:receipt:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Router name.
pub const ROUTER_NAME: &str = "stablemix";
