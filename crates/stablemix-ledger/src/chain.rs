//! The host: ledger plus contract table, with checkpointed transactions.
//!
//! [`Chain::atomically`] is the host's transaction boundary. It snapshots the
//! whole state (ledger and every contract), runs the closure, and restores
//! the snapshot if the closure fails. The router runs every entry point
//! inside one, so a failure at any depth leaves no trace.

use std::collections::HashMap;

use rust_decimal::Decimal;
use stablemix_types::{Address, MixerError, PerpetualId, Result};

use crate::contract::{
    CallOutcome, Contract, Env, ExactInputParams, InterestDistributor, LiquidityGauge,
    PerpetualManager, PoolManager, StableMaster, StakingRewards, Vault, VotingEscrow,
};
use crate::Ledger;

/// Generates typed read-only accessors for one capability.
macro_rules! capability_views {
    ($( $(#[$meta:meta])* fn $name:ident via $accessor:ident as $interface:literal -> $cap:ident; )*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self, target: Address) -> Result<&dyn $cap> {
                self.contract(target)?
                    .$accessor()
                    .ok_or(MixerError::UnsupportedInterface { target, interface: $interface })
            }
        )*
    };
}

/// Generates a mutating call on one capability. The contract and the ledger
/// are borrowed as disjoint fields, so the contract stays in the table.
macro_rules! capability_calls {
    ($(
        $(#[$meta:meta])*
        fn $name:ident via $accessor:ident as $interface:literal
            => $method:ident($($arg:ident: $ty:ty),*) -> $ret:ty;
    )*) => {
        $(
            $(#[$meta])*
            pub fn $name(&mut self, target: Address, caller: Address, $($arg: $ty),*) -> Result<$ret> {
                let contract = self
                    .contracts
                    .get_mut(&target)
                    .ok_or(MixerError::UnknownContract(target))?;
                let capability = contract
                    .$accessor()
                    .ok_or(MixerError::UnsupportedInterface { target, interface: $interface })?;
                let mut env = Env { ledger: &mut self.ledger, caller, this: target };
                capability.$method(&mut env, $($arg),*)
            }
        )*
    };
}

/// Ledger and contracts of the hosting environment.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    pub ledger: Ledger,
    contracts: HashMap<Address, Box<dyn Contract>>,
    deployed: u64,
}

impl Chain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------
    // Deployment
    // -----------------------------------------------------------------

    /// Allocate a fresh address without deploying anything there.
    pub fn reserve_address(&mut self, label: &str) -> Address {
        self.deployed += 1;
        Address::derive(format!("contract:{label}:{}", self.deployed).as_bytes())
    }

    /// Deploy `contract` at a fresh address.
    pub fn deploy(&mut self, label: &str, contract: Box<dyn Contract>) -> Address {
        let address = self.reserve_address(label);
        self.contracts.insert(address, contract);
        tracing::debug!(address = %address.short(), label, "Contract deployed");
        address
    }

    /// Deploy `contract` at a reserved address.
    ///
    /// # Errors
    /// `ZeroAddress` for the zero address, `AlreadyAdded` if occupied.
    pub fn deploy_at(&mut self, address: Address, contract: Box<dyn Contract>) -> Result<()> {
        if address.is_zero() {
            return Err(MixerError::ZeroAddress);
        }
        if self.contracts.contains_key(&address) {
            return Err(MixerError::AlreadyAdded);
        }
        self.contracts.insert(address, contract);
        Ok(())
    }

    #[must_use]
    pub fn is_contract(&self, address: Address) -> bool {
        self.contracts.contains_key(&address)
    }

    /// # Errors
    /// `UnknownContract` if nothing is deployed at `target`.
    pub fn contract(&self, target: Address) -> Result<&dyn Contract> {
        self.contracts
            .get(&target)
            .map(|contract| &**contract)
            .ok_or(MixerError::UnknownContract(target))
    }

    // -----------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------

    /// Run `f` as one transaction: on error every change it made, to the
    /// ledger and to any contract, is rolled back.
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let checkpoint = self.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = checkpoint;
                tracing::warn!(error = %err, "Transaction reverted");
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    capability_views! {
        fn stable_master via as_stable_master as "StableMaster" -> StableMaster;
        fn pool_manager via as_pool_manager as "PoolManager" -> PoolManager;
        fn perpetual_manager via as_perpetual_manager as "PerpetualManager" -> PerpetualManager;
        fn liquidity_gauge via as_liquidity_gauge as "LiquidityGauge" -> LiquidityGauge;
        fn staking_rewards via as_staking_rewards as "StakingRewards" -> StakingRewards;
        fn voting_escrow via as_voting_escrow as "VotingEscrow" -> VotingEscrow;
        fn interest_distributor via as_interest_distributor as "InterestDistributor"
            -> InterestDistributor;
        fn vault via as_vault as "Vault" -> Vault;
    }

    // -----------------------------------------------------------------
    // Calls
    // -----------------------------------------------------------------

    capability_calls! {
        fn stable_master_deposit via as_stable_master_mut as "StableMaster"
            => deposit(amount: Decimal, user: Address, pool_manager: Address) -> ();
        fn stable_master_withdraw via as_stable_master_mut as "StableMaster"
            => withdraw(amount: Decimal, burner: Address, dest: Address, pool_manager: Address) -> ();
        fn stable_master_mint via as_stable_master_mut as "StableMaster"
            => mint(amount: Decimal, user: Address, pool_manager: Address, min_stable: Decimal) -> ();
        #[allow(clippy::too_many_arguments)]
        fn stable_master_burn via as_stable_master_mut as "StableMaster"
            => burn(
                amount: Decimal,
                burner: Address,
                dest: Address,
                pool_manager: Address,
                min_collat: Decimal
            ) -> ();

        #[allow(clippy::too_many_arguments)]
        fn open_perpetual via as_perpetual_manager_mut as "PerpetualManager"
            => open_perpetual(
                owner: Address,
                margin: Decimal,
                committed_amount: Decimal,
                max_oracle_rate: Decimal,
                min_net_margin: Decimal
            ) -> PerpetualId;
        fn add_to_perpetual via as_perpetual_manager_mut as "PerpetualManager"
            => add_to_perpetual(perpetual_id: PerpetualId, amount: Decimal) -> ();
        fn perpetual_get_reward via as_perpetual_manager_mut as "PerpetualManager"
            => get_reward(perpetual_id: PerpetualId) -> ();

        fn liquidity_gauge_deposit via as_liquidity_gauge_mut as "LiquidityGauge"
            => deposit(value: Decimal, addr: Address) -> ();
        fn liquidity_gauge_claim via as_liquidity_gauge_mut as "LiquidityGauge"
            => claim_rewards(addr: Address) -> ();

        fn staking_rewards_stake_for via as_staking_rewards_mut as "StakingRewards"
            => stake_for(account: Address, amount: Decimal) -> ();
        fn staking_rewards_claim via as_staking_rewards_mut as "StakingRewards"
            => get_reward_for(account: Address) -> Decimal;

        fn ve_deposit_for via as_voting_escrow_mut as "VotingEscrow"
            => deposit_for(addr: Address, value: Decimal) -> ();

        fn claim_interest via as_interest_distributor_mut as "InterestDistributor"
            => claim(user: Address) -> Decimal;

        fn vault_deposit via as_vault_mut as "Vault"
            => deposit(assets: Decimal, receiver: Address) -> Decimal;
        fn vault_mint via as_vault_mut as "Vault"
            => mint(shares: Decimal, receiver: Address) -> Decimal;
        fn vault_withdraw via as_vault_mut as "Vault"
            => withdraw(assets: Decimal, receiver: Address) -> Decimal;
        fn vault_redeem via as_vault_mut as "Vault"
            => redeem(shares: Decimal, receiver: Address) -> Decimal;

        fn amm_exact_input via as_amm_mut as "Amm"
            => exact_input(params: ExactInputParams) -> Decimal;
    }

    /// Forward raw calldata to an aggregator. The outer `Result` reports a
    /// missing contract; the inner [`CallOutcome`] is the aggregator's own.
    ///
    /// # Errors
    /// `UnknownContract` or `UnsupportedInterface`.
    pub fn aggregator_execute(
        &mut self,
        target: Address,
        caller: Address,
        data: &[u8],
    ) -> Result<CallOutcome> {
        let contract = self
            .contracts
            .get_mut(&target)
            .ok_or(MixerError::UnknownContract(target))?;
        let aggregator = contract
            .as_aggregator_mut()
            .ok_or(MixerError::UnsupportedInterface {
                target,
                interface: "Aggregator",
            })?;
        let mut env = Env {
            ledger: &mut self.ledger,
            caller,
            this: target,
        };
        Ok(aggregator.execute(&mut env, data))
    }
}
