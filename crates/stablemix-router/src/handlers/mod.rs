//! One handler per action, grouped by the collaborator they drive.
//!
//! Handlers are methods on [`Invocation`](crate::dispatcher::Invocation).
//! Amounts that come out of router custody accept the full-balance
//! sentinel and are resolved when the handler runs.

mod native;
mod perpetual;
mod rewards;
mod stable;
mod vault;
