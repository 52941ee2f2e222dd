//! Capability traits for the router's external collaborators.
//!
//! Every collaborator is a [`Contract`] living in the [`Chain`](crate::Chain)
//! contract table. A contract exposes the capabilities it implements through
//! the `as_*` accessors; anything it does not implement answers `None`, which
//! the chain turns into `UnsupportedInterface`.
//!
//! Collaborators never see the router. A call hands them an [`Env`] holding
//! the ledger, the calling address and their own address, so they can move
//! funds they control or funds they were approved for, and nothing else.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stablemix_types::{Address, CollateralInfo, PerpetualId, Result};

use crate::Ledger;

/// Execution context of one collaborator call.
pub struct Env<'a> {
    pub ledger: &'a mut Ledger,
    /// Address that invoked the call (`msg.sender`).
    pub caller: Address,
    /// Address of the contract being called.
    pub this: Address,
}

impl fmt::Debug for Env<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("caller", &self.caller)
            .field("this", &self.this)
            .finish_non_exhaustive()
    }
}

/// Raw aggregator result: return data on success, revert data on failure.
pub type CallOutcome = std::result::Result<Vec<u8>, Vec<u8>>;

/// Exact-input swap request for the AMM venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputParams {
    /// Venue-encoded route.
    pub path: Vec<u8>,
    pub recipient: Address,
    pub amount_in: Decimal,
    pub amount_out_minimum: Decimal,
}

// ---------------------------------------------------------------------------
// Stablecoin core
// ---------------------------------------------------------------------------

/// Issuance engine of one stablecoin.
pub trait StableMaster {
    /// The stablecoin this master issues.
    fn ag_token(&self) -> Address;

    /// Collateral managed by `pool_manager`, if the pool belongs here.
    fn collateral(&self, pool_manager: Address) -> Option<CollateralInfo>;

    /// Pull `amount` collateral from the caller, mint san tokens to `user`.
    fn deposit(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        user: Address,
        pool_manager: Address,
    ) -> Result<()>;

    /// Burn `amount` san tokens of `burner`, pay collateral to `dest`.
    fn withdraw(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        burner: Address,
        dest: Address,
        pool_manager: Address,
    ) -> Result<()>;

    /// Pull `amount` collateral from the caller, mint stablecoins to `user`.
    fn mint(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        user: Address,
        pool_manager: Address,
        min_stable: Decimal,
    ) -> Result<()>;

    /// Burn `amount` stablecoins of `burner`, pay collateral to `dest`.
    /// Burning for someone else consumes their allowance to the caller.
    fn burn(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        burner: Address,
        dest: Address,
        pool_manager: Address,
        min_collat: Decimal,
    ) -> Result<()>;
}

pub trait PoolManager {
    fn token(&self) -> Address;
    fn stable_master(&self) -> Address;
}

/// Leveraged-position manager for one collateral.
pub trait PerpetualManager {
    fn open_perpetual(
        &mut self,
        env: &mut Env<'_>,
        owner: Address,
        margin: Decimal,
        committed_amount: Decimal,
        max_oracle_rate: Decimal,
        min_net_margin: Decimal,
    ) -> Result<PerpetualId>;

    fn add_to_perpetual(
        &mut self,
        env: &mut Env<'_>,
        perpetual_id: PerpetualId,
        amount: Decimal,
    ) -> Result<()>;

    /// Pay accrued rewards of a position to its owner.
    fn get_reward(&mut self, env: &mut Env<'_>, perpetual_id: PerpetualId) -> Result<()>;

    fn owner_of(&self, perpetual_id: PerpetualId) -> Option<Address>;
}

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

/// Gauge whose claim reports nothing.
pub trait LiquidityGauge {
    fn staking_token(&self) -> Address;

    /// Pull `value` staking tokens from the caller, credit them to `addr`.
    fn deposit(&mut self, env: &mut Env<'_>, value: Decimal, addr: Address) -> Result<()>;

    fn claim_rewards(&mut self, env: &mut Env<'_>, addr: Address) -> Result<()>;

    fn staked_balance(&self, addr: Address) -> Decimal;
}

/// Gauge whose claim reports the amount paid.
pub trait StakingRewards {
    fn staking_token(&self) -> Address;

    /// Pull `amount` staking tokens from the caller, credit them to `account`.
    fn stake_for(&mut self, env: &mut Env<'_>, account: Address, amount: Decimal) -> Result<()>;

    fn get_reward_for(&mut self, env: &mut Env<'_>, account: Address) -> Result<Decimal>;

    fn staked_balance(&self, account: Address) -> Decimal;
}

/// Voting-escrow locker for the governance token.
pub trait VotingEscrow {
    fn token(&self) -> Address;

    /// Pull `value` governance tokens from the caller into `addr`'s lock.
    fn deposit_for(&mut self, env: &mut Env<'_>, addr: Address, value: Decimal) -> Result<()>;

    fn locked(&self, addr: Address) -> Decimal;
}

/// Weekly interest distributor.
pub trait InterestDistributor {
    /// Token paid out.
    fn token(&self) -> Address;

    /// Pay `user`'s pending interest to `user`; returns the amount.
    fn claim(&mut self, env: &mut Env<'_>, user: Address) -> Result<Decimal>;
}

// ---------------------------------------------------------------------------
// Vaults and venues
// ---------------------------------------------------------------------------

/// Tokenized vault. Share tokens live on the ledger at the vault's address;
/// the caller is always the share owner for withdrawals.
pub trait Vault {
    fn asset(&self) -> Address;

    /// Deposit `assets` from the caller; returns shares minted to `receiver`.
    fn deposit(&mut self, env: &mut Env<'_>, assets: Decimal, receiver: Address)
    -> Result<Decimal>;

    /// Mint exactly `shares` to `receiver`; returns assets pulled.
    fn mint(&mut self, env: &mut Env<'_>, shares: Decimal, receiver: Address) -> Result<Decimal>;

    /// Withdraw exactly `assets` to `receiver`; returns shares burned.
    fn withdraw(
        &mut self,
        env: &mut Env<'_>,
        assets: Decimal,
        receiver: Address,
    ) -> Result<Decimal>;

    /// Redeem exactly `shares` for assets sent to `receiver`; returns assets.
    fn redeem(&mut self, env: &mut Env<'_>, shares: Decimal, receiver: Address)
    -> Result<Decimal>;
}

/// Fixed-interface AMM.
pub trait Amm {
    /// Pull `amount_in` from the caller, send output to `recipient`.
    fn exact_input(&mut self, env: &mut Env<'_>, params: ExactInputParams) -> Result<Decimal>;
}

/// Aggregator accepting opaque calldata.
pub trait Aggregator {
    fn execute(&mut self, env: &mut Env<'_>, data: &[u8]) -> CallOutcome;
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// An entry of the contract table.
pub trait Contract: fmt::Debug {
    fn clone_box(&self) -> Box<dyn Contract>;

    fn as_stable_master(&self) -> Option<&dyn StableMaster> {
        None
    }
    fn as_stable_master_mut(&mut self) -> Option<&mut dyn StableMaster> {
        None
    }
    fn as_pool_manager(&self) -> Option<&dyn PoolManager> {
        None
    }
    fn as_perpetual_manager(&self) -> Option<&dyn PerpetualManager> {
        None
    }
    fn as_perpetual_manager_mut(&mut self) -> Option<&mut dyn PerpetualManager> {
        None
    }
    fn as_liquidity_gauge(&self) -> Option<&dyn LiquidityGauge> {
        None
    }
    fn as_liquidity_gauge_mut(&mut self) -> Option<&mut dyn LiquidityGauge> {
        None
    }
    fn as_staking_rewards(&self) -> Option<&dyn StakingRewards> {
        None
    }
    fn as_staking_rewards_mut(&mut self) -> Option<&mut dyn StakingRewards> {
        None
    }
    fn as_voting_escrow(&self) -> Option<&dyn VotingEscrow> {
        None
    }
    fn as_voting_escrow_mut(&mut self) -> Option<&mut dyn VotingEscrow> {
        None
    }
    fn as_interest_distributor(&self) -> Option<&dyn InterestDistributor> {
        None
    }
    fn as_interest_distributor_mut(&mut self) -> Option<&mut dyn InterestDistributor> {
        None
    }
    fn as_vault(&self) -> Option<&dyn Vault> {
        None
    }
    fn as_vault_mut(&mut self) -> Option<&mut dyn Vault> {
        None
    }
    fn as_amm_mut(&mut self) -> Option<&mut dyn Amm> {
        None
    }
    fn as_aggregator_mut(&mut self) -> Option<&mut dyn Aggregator> {
        None
    }
}

impl Clone for Box<dyn Contract> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
