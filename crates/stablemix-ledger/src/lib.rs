//! # stablemix-ledger
//!
//! The hosting environment the **stablemix** router runs in.
//!
//! - [`Ledger`]: balances, allowances, permit nonces, native value, clock
//! - [`Chain`]: ledger plus the contract table, with [`Chain::atomically`]
//!   as the transaction boundary
//! - [`contract`]: capability traits of every external collaborator
//! - [`revert`]: `Error(string)` revert-data codec
//! - `testing` (feature `test-helpers`): collaborator doubles and signing
//!   accounts

pub mod chain;
pub mod contract;
pub mod ledger;
pub mod revert;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use chain::Chain;
pub use contract::{CallOutcome, Contract, Env, ExactInputParams};
pub use ledger::{Ledger, TokenSpec};
