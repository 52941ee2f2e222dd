//! # stablemix-router
//!
//! Atomic multi-action router for the **stablemix** protocol.
//!
//! One [`Router::mixer`] call applies permits, pulls declared transfers,
//! executes swaps and then runs an ordered list of actions (deposit, mint,
//! burn, perpetual hedging, staking, reward claims, vault operations,
//! sweeps). Either every step succeeds or the host is left untouched.
//!
//! - [`Router`]: the entry point, plus governance calls
//! - [`AccessControl`] / [`RoleChange`]: governor and guardian roles
//! - [`Registry`]: stable masters and `(stablecoin, collateral)` pairs
//! - [`GaugeAdapter`]: one staking interface over both gauge shapes
//! - [`allowance`]: idempotent approval management
//! - [`funding`]: transfer collection and full-balance resolution

pub mod access;
pub mod allowance;
pub(crate) mod dispatcher;
pub mod funding;
pub mod gauge;
mod governance;
mod handlers;
pub mod permit;
pub mod registry;
pub mod router;
pub mod swap;

pub use access::{AccessControl, RoleChange};
pub use gauge::GaugeAdapter;
pub use registry::Registry;
pub use router::Router;
