//! The router and its `mixer` entry point.
//!
//! # Invocation order
//!
//! 1. Validate the call shape (parallel arrays, action limit)
//! 2. Move attached native value from the caller to the router
//! 3. Apply permits
//! 4. Collect transfers from the caller
//! 5. Execute swaps
//! 6. Run actions in order; unknown tags are skipped
//!
//! Steps 2 through 6 run inside one host transaction: if any of them fails,
//! the ledger and every collaborator are exactly as they were before the call.

use chrono::Utc;
use stablemix_ledger::Chain;
use stablemix_types::{
    Action, Address, InvocationId, MixerCall, MixerError, MixerReceipt, Result, RouterConfig,
};

use crate::access::AccessControl;
use crate::dispatcher::Invocation;
use crate::registry::Registry;
use crate::{funding, permit, swap};

/// A deployed router.
#[derive(Debug, Clone)]
pub struct Router {
    address: Address,
    config: RouterConfig,
    pub(crate) access: AccessControl,
    pub(crate) registry: Registry,
}

impl Router {
    /// # Errors
    /// `ZeroAddress` for any unset address, `InvalidConditions` if governor
    /// and guardian coincide, `Configuration` for an invalid config.
    pub fn new(
        address: Address,
        governor: Address,
        guardian: Address,
        config: RouterConfig,
    ) -> Result<Self> {
        if address.is_zero() {
            return Err(MixerError::ZeroAddress);
        }
        config.validate()?;
        let access = AccessControl::new(governor, guardian)?;
        tracing::info!(
            router = %address,
            governor = %governor.short(),
            guardian = %guardian.short(),
            "Router initialized"
        );
        Ok(Self {
            address,
            config,
            access,
            registry: Registry::new(),
        })
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[must_use]
    pub fn access(&self) -> &AccessControl {
        &self.access
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Execute a batch of heterogeneous operations as one atomic unit.
    ///
    /// # Errors
    /// Any failure of any step; the host is then left untouched.
    pub fn mixer(&self, chain: &mut Chain, caller: Address, call: MixerCall) -> Result<MixerReceipt> {
        if call.actions.len() != call.payloads.len() {
            return Err(MixerError::IncompatibleLengths);
        }
        if call.actions.len() > self.config.max_actions_per_call {
            return Err(MixerError::TooManyActions {
                count: call.actions.len(),
                max: self.config.max_actions_per_call,
            });
        }
        let invocation_id = InvocationId::new();

        let receipt = chain.atomically(|chain| {
            if !call.native_value.is_zero() {
                chain
                    .ledger
                    .transfer_native(caller, self.address, call.native_value)?;
            }
            permit::apply_permits(&mut chain.ledger, &call.permits)?;
            funding::collect_transfers(&mut chain.ledger, self.address, caller, &call.transfers)?;

            let mut invocation = Invocation::new(self, chain, caller);
            for declaration in &call.swaps {
                let event = swap::execute_swap(
                    invocation.chain,
                    self.address,
                    &self.config,
                    caller,
                    declaration,
                )?;
                invocation.emit(event);
            }

            let mut executed = 0;
            let mut skipped = 0;
            for (index, (tag, payload)) in call.actions.iter().zip(&call.payloads).enumerate() {
                let action = Action::decode(*tag, payload)?;
                if invocation.dispatch(index, action)? {
                    executed += 1;
                } else {
                    skipped += 1;
                }
            }

            Ok(MixerReceipt {
                invocation_id,
                caller,
                actions_executed: executed,
                actions_skipped: skipped,
                events: invocation.events,
                completed_at: Utc::now(),
            })
        });

        match &receipt {
            Ok(receipt) => tracing::info!(
                invocation = %invocation_id,
                caller = %caller.short(),
                executed = receipt.actions_executed,
                skipped = receipt.actions_skipped,
                digest = %receipt.digest_hex(),
                "Mixer invocation complete"
            ),
            Err(err) => tracing::warn!(
                invocation = %invocation_id,
                caller = %caller.short(),
                error = %err,
                "Mixer invocation rolled back"
            ),
        }
        receipt
    }
}
