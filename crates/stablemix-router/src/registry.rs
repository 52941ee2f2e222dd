//! Stablecoin and pair registrations.
//!
//! Owned by the router and changed only through governance, which edits a
//! staged copy and commits it when the whole call succeeds. Lookups of
//! anything unregistered fail with `ZeroAddress`, the answer a mapping of
//! unset entries would give.

use std::collections::HashMap;

use stablemix_types::{Address, GaugeRef, MixerError, PairRegistration, Result};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// stablecoin → stable master
    stable_masters: HashMap<Address, Address>,
    /// (stablecoin, collateral) → registration
    pairs: HashMap<(Address, Address), PairRegistration>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// `ZeroAddress` if `stablecoin` has no stable master.
    pub fn stable_master(&self, stablecoin: Address) -> Result<Address> {
        self.stable_masters
            .get(&stablecoin)
            .copied()
            .ok_or(MixerError::ZeroAddress)
    }

    /// # Errors
    /// `ZeroAddress` if the pair is not registered.
    pub fn pair(&self, stablecoin: Address, collateral: Address) -> Result<&PairRegistration> {
        self.pairs
            .get(&(stablecoin, collateral))
            .ok_or(MixerError::ZeroAddress)
    }

    pub fn pairs(&self) -> impl Iterator<Item = &PairRegistration> {
        self.pairs.values()
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// # Errors
    /// `AlreadyAdded` if `stablecoin` already has a stable master.
    pub fn insert_stable_master(&mut self, stablecoin: Address, stable_master: Address) -> Result<()> {
        if self.stable_masters.contains_key(&stablecoin) {
            return Err(MixerError::AlreadyAdded);
        }
        self.stable_masters.insert(stablecoin, stable_master);
        Ok(())
    }

    /// # Errors
    /// `AlreadyAdded` if the pair is registered.
    pub fn insert_pair(&mut self, registration: PairRegistration) -> Result<()> {
        let key = registration.key();
        if self.pairs.contains_key(&key) {
            return Err(MixerError::AlreadyAdded);
        }
        self.pairs.insert(key, registration);
        Ok(())
    }

    /// # Errors
    /// `ZeroAddress` if the pair is not registered.
    pub fn remove_pair(&mut self, stablecoin: Address, collateral: Address) -> Result<PairRegistration> {
        self.pairs
            .remove(&(stablecoin, collateral))
            .ok_or(MixerError::ZeroAddress)
    }

    /// Replace the pair's gauge, returning the previous one.
    ///
    /// # Errors
    /// `ZeroAddress` if the pair is not registered.
    pub fn set_gauge(
        &mut self,
        stablecoin: Address,
        collateral: Address,
        gauge: Option<GaugeRef>,
    ) -> Result<Option<GaugeRef>> {
        let registration = self
            .pairs
            .get_mut(&(stablecoin, collateral))
            .ok_or(MixerError::ZeroAddress)?;
        Ok(std::mem::replace(&mut registration.gauge, gauge))
    }
}
