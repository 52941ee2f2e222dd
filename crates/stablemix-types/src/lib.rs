//! # stablemix-types
//!
//! Shared types, errors, and configuration for the **stablemix** router.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`Address`], [`PerpetualId`], [`InvocationId`]
//! - **Instruction set**: [`ActionType`], [`Action`] and one payload struct per action
//! - **Call records**: [`MixerCall`], [`TransferDeclaration`], [`SwapDeclaration`], [`SwapVenue`]
//! - **Permits**: [`PermitRecord`]
//! - **Registry records**: [`PairRegistration`], [`CollateralInfo`], [`GaugeRef`], [`GaugeKind`]
//! - **Events**: [`RouterEvent`], [`MixerReceipt`]
//! - **Configuration**: [`RouterConfig`]
//! - **Errors**: [`MixerError`] with `MX_ERR_` prefix codes
//! - **Constants**: sentinels and defaults

pub mod action;
pub mod call;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod pair;
pub mod permit;

pub use action::*;
pub use call::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use pair::*;
pub use permit::*;

// Constants are accessed via `stablemix_types::constants::FOO`
// (not re-exported to avoid name collisions).
