//! Deterministic collaborator doubles and signing accounts.
//!
//! Only compiled for tests and under the `test-helpers` feature. Each double
//! implements the smallest behaviour that lets router flows run end to end:
//! fixed exchange rates, fixed reward payouts, no fees.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signer, SigningKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stablemix_types::{Address, CollateralInfo, MixerError, PerpetualId, PermitRecord, Result};

use crate::contract::{
    Aggregator, Amm, CallOutcome, Contract, Env, ExactInputParams, InterestDistributor,
    LiquidityGauge, PerpetualManager, PoolManager, StableMaster, StakingRewards, Vault,
    VotingEscrow,
};
use crate::revert::encode_error_string;
use crate::{Chain, Ledger, TokenSpec};

fn scale(amount: Decimal, rate: Decimal) -> Result<Decimal> {
    amount
        .checked_mul(rate)
        .ok_or_else(|| MixerError::Internal(format!("overflow scaling {amount} by {rate}")))
}

fn unscale(amount: Decimal, rate: Decimal) -> Result<Decimal> {
    amount
        .checked_div(rate)
        .ok_or_else(|| MixerError::Internal(format!("cannot divide {amount} by {rate}")))
}

fn rejected(reason: &str) -> MixerError {
    MixerError::ExternalCallFailed {
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// An externally owned account with an ed25519 key.
#[derive(Debug, Clone)]
pub struct Account {
    key: SigningKey,
    address: Address,
}

impl Account {
    /// Fresh account with a random key.
    pub fn random() -> Self {
        Self::from_secret(rand::random())
    }

    /// Deterministic account.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let key = SigningKey::from_bytes(&secret);
        let address = Address::from_public_key(&key.verifying_key().to_bytes());
        Self { key, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign an approval of `value` to `spender`, valid at the owner's
    /// current nonce on `ledger`.
    pub fn sign_permit(
        &self,
        ledger: &Ledger,
        token: Address,
        spender: Address,
        value: Decimal,
        deadline: DateTime<Utc>,
    ) -> PermitRecord {
        let nonce = ledger.nonce(token, self.address);
        let payload = PermitRecord::payload(token, self.address, spender, value, nonce, deadline);
        PermitRecord {
            token,
            owner: self.address,
            owner_key: self.key.verifying_key().to_bytes(),
            spender,
            value,
            deadline,
            signature: self.key.sign(&payload).to_bytes().to_vec(),
        }
    }
}

// ---------------------------------------------------------------------------
// Stablecoin core
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MockPool {
    info: CollateralInfo,
    /// San tokens per unit of collateral.
    san_rate: Decimal,
    /// Stablecoins per unit of collateral.
    mint_rate: Decimal,
}

/// Stable master with fixed san and mint rates per collateral. Collateral is
/// held at the pool manager's address.
#[derive(Debug, Clone)]
pub struct MockStableMaster {
    ag_token: Address,
    pools: HashMap<Address, MockPool>,
}

impl MockStableMaster {
    pub fn new(ag_token: Address) -> Self {
        Self {
            ag_token,
            pools: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_collateral(
        mut self,
        pool_manager: Address,
        info: CollateralInfo,
        san_rate: Decimal,
        mint_rate: Decimal,
    ) -> Self {
        self.pools.insert(
            pool_manager,
            MockPool {
                info,
                san_rate,
                mint_rate,
            },
        );
        self
    }

    fn pool(&self, pool_manager: Address) -> Result<&MockPool> {
        self.pools
            .get(&pool_manager)
            .ok_or_else(|| rejected("unknown pool manager"))
    }
}

impl StableMaster for MockStableMaster {
    fn ag_token(&self) -> Address {
        self.ag_token
    }

    fn collateral(&self, pool_manager: Address) -> Option<CollateralInfo> {
        self.pools.get(&pool_manager).map(|pool| pool.info)
    }

    fn deposit(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        user: Address,
        pool_manager: Address,
    ) -> Result<()> {
        let pool = self.pool(pool_manager)?;
        env.ledger
            .transfer_from(pool.info.token, env.this, env.caller, pool_manager, amount)?;
        env.ledger
            .mint(pool.info.san_token, user, scale(amount, pool.san_rate)?)
    }

    fn withdraw(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        burner: Address,
        dest: Address,
        pool_manager: Address,
    ) -> Result<()> {
        let pool = self.pool(pool_manager)?;
        if burner != env.caller {
            env.ledger
                .spend_allowance(pool.info.san_token, burner, env.caller, amount)?;
        }
        env.ledger.burn(pool.info.san_token, burner, amount)?;
        let collateral = unscale(amount, pool.san_rate)?;
        env.ledger
            .transfer(pool.info.token, pool_manager, dest, collateral)
    }

    fn mint(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        user: Address,
        pool_manager: Address,
        min_stable: Decimal,
    ) -> Result<()> {
        let pool = self.pool(pool_manager)?;
        let minted = scale(amount, pool.mint_rate)?;
        if minted < min_stable {
            return Err(rejected("slippage"));
        }
        env.ledger
            .transfer_from(pool.info.token, env.this, env.caller, pool_manager, amount)?;
        env.ledger.mint(self.ag_token, user, minted)
    }

    fn burn(
        &mut self,
        env: &mut Env<'_>,
        amount: Decimal,
        burner: Address,
        dest: Address,
        pool_manager: Address,
        min_collat: Decimal,
    ) -> Result<()> {
        let pool = self.pool(pool_manager)?;
        let collateral = unscale(amount, pool.mint_rate)?;
        if collateral < min_collat {
            return Err(rejected("slippage"));
        }
        if burner != env.caller {
            env.ledger
                .spend_allowance(self.ag_token, burner, env.caller, amount)?;
        }
        env.ledger.burn(self.ag_token, burner, amount)?;
        env.ledger
            .transfer(pool.info.token, pool_manager, dest, collateral)
    }
}

impl Contract for MockStableMaster {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_stable_master(&self) -> Option<&dyn StableMaster> {
        Some(self)
    }
    fn as_stable_master_mut(&mut self) -> Option<&mut dyn StableMaster> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
pub struct MockPoolManager {
    token: Address,
    stable_master: Address,
}

impl MockPoolManager {
    pub fn new(token: Address, stable_master: Address) -> Self {
        Self {
            token,
            stable_master,
        }
    }
}

impl PoolManager for MockPoolManager {
    fn token(&self) -> Address {
        self.token
    }
    fn stable_master(&self) -> Address {
        self.stable_master
    }
}

impl Contract for MockPoolManager {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_pool_manager(&self) -> Option<&dyn PoolManager> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
struct Position {
    owner: Address,
    margin: Decimal,
}

/// Perpetual manager with a fixed oracle rate. Ids start at 1.
#[derive(Debug, Clone)]
pub struct MockPerpetualManager {
    token: Address,
    oracle_rate: Decimal,
    reward: Option<(Address, Decimal)>,
    next_id: u64,
    positions: BTreeMap<PerpetualId, Position>,
}

impl MockPerpetualManager {
    pub fn new(token: Address) -> Self {
        Self {
            token,
            oracle_rate: Decimal::ONE,
            reward: None,
            next_id: 1,
            positions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_oracle_rate(mut self, rate: Decimal) -> Self {
        self.oracle_rate = rate;
        self
    }

    /// Pay `per_claim` of `token` to the owner on each reward claim.
    #[must_use]
    pub fn with_rewards(mut self, token: Address, per_claim: Decimal) -> Self {
        self.reward = Some((token, per_claim));
        self
    }

    fn position_mut(&mut self, perpetual_id: PerpetualId) -> Result<&mut Position> {
        self.positions
            .get_mut(&perpetual_id)
            .ok_or_else(|| rejected("nonexistent perpetual"))
    }
}

impl PerpetualManager for MockPerpetualManager {
    fn open_perpetual(
        &mut self,
        env: &mut Env<'_>,
        owner: Address,
        margin: Decimal,
        committed_amount: Decimal,
        max_oracle_rate: Decimal,
        min_net_margin: Decimal,
    ) -> Result<PerpetualId> {
        if self.oracle_rate > max_oracle_rate {
            return Err(rejected("oracle rate above maximum"));
        }
        if margin < min_net_margin || committed_amount.is_zero() {
            return Err(rejected("invalid position"));
        }
        env.ledger
            .transfer_from(self.token, env.this, env.caller, env.this, margin)?;
        let id = PerpetualId(self.next_id);
        self.next_id += 1;
        self.positions.insert(id, Position { owner, margin });
        Ok(id)
    }

    fn add_to_perpetual(
        &mut self,
        env: &mut Env<'_>,
        perpetual_id: PerpetualId,
        amount: Decimal,
    ) -> Result<()> {
        let token = self.token;
        let position = self.position_mut(perpetual_id)?;
        env.ledger
            .transfer_from(token, env.this, env.caller, env.this, amount)?;
        position.margin += amount;
        Ok(())
    }

    fn get_reward(&mut self, env: &mut Env<'_>, perpetual_id: PerpetualId) -> Result<()> {
        let reward = self.reward;
        let position = self.position_mut(perpetual_id)?;
        if let Some((token, amount)) = reward {
            env.ledger.mint(token, position.owner, amount)?;
        }
        Ok(())
    }

    fn owner_of(&self, perpetual_id: PerpetualId) -> Option<Address> {
        self.positions.get(&perpetual_id).map(|position| position.owner)
    }
}

impl Contract for MockPerpetualManager {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_perpetual_manager(&self) -> Option<&dyn PerpetualManager> {
        Some(self)
    }
    fn as_perpetual_manager_mut(&mut self) -> Option<&mut dyn PerpetualManager> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

/// Liquidity gauge paying a fixed reward per claim.
#[derive(Debug, Clone)]
pub struct MockLiquidityGauge {
    staking_token: Address,
    reward: Option<(Address, Decimal)>,
    staked: HashMap<Address, Decimal>,
}

impl MockLiquidityGauge {
    pub fn new(staking_token: Address) -> Self {
        Self {
            staking_token,
            reward: None,
            staked: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_rewards(mut self, token: Address, per_claim: Decimal) -> Self {
        self.reward = Some((token, per_claim));
        self
    }
}

impl LiquidityGauge for MockLiquidityGauge {
    fn staking_token(&self) -> Address {
        self.staking_token
    }

    fn deposit(&mut self, env: &mut Env<'_>, value: Decimal, addr: Address) -> Result<()> {
        env.ledger
            .transfer_from(self.staking_token, env.this, env.caller, env.this, value)?;
        *self.staked.entry(addr).or_insert(Decimal::ZERO) += value;
        Ok(())
    }

    fn claim_rewards(&mut self, env: &mut Env<'_>, addr: Address) -> Result<()> {
        if let Some((token, amount)) = self.reward {
            env.ledger.mint(token, addr, amount)?;
        }
        Ok(())
    }

    fn staked_balance(&self, addr: Address) -> Decimal {
        self.staked.get(&addr).copied().unwrap_or(Decimal::ZERO)
    }
}

impl Contract for MockLiquidityGauge {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_liquidity_gauge(&self) -> Option<&dyn LiquidityGauge> {
        Some(self)
    }
    fn as_liquidity_gauge_mut(&mut self) -> Option<&mut dyn LiquidityGauge> {
        Some(self)
    }
}

/// Staking-rewards contract paying a fixed reward per claim.
#[derive(Debug, Clone)]
pub struct MockStakingRewards {
    staking_token: Address,
    reward: Option<(Address, Decimal)>,
    staked: HashMap<Address, Decimal>,
}

impl MockStakingRewards {
    pub fn new(staking_token: Address) -> Self {
        Self {
            staking_token,
            reward: None,
            staked: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_rewards(mut self, token: Address, per_claim: Decimal) -> Self {
        self.reward = Some((token, per_claim));
        self
    }
}

impl StakingRewards for MockStakingRewards {
    fn staking_token(&self) -> Address {
        self.staking_token
    }

    fn stake_for(&mut self, env: &mut Env<'_>, account: Address, amount: Decimal) -> Result<()> {
        env.ledger
            .transfer_from(self.staking_token, env.this, env.caller, env.this, amount)?;
        *self.staked.entry(account).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    fn get_reward_for(&mut self, env: &mut Env<'_>, account: Address) -> Result<Decimal> {
        let Some((token, amount)) = self.reward else {
            return Ok(Decimal::ZERO);
        };
        env.ledger.mint(token, account, amount)?;
        Ok(amount)
    }

    fn staked_balance(&self, account: Address) -> Decimal {
        self.staked.get(&account).copied().unwrap_or(Decimal::ZERO)
    }
}

impl Contract for MockStakingRewards {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_staking_rewards(&self) -> Option<&dyn StakingRewards> {
        Some(self)
    }
    fn as_staking_rewards_mut(&mut self) -> Option<&mut dyn StakingRewards> {
        Some(self)
    }
}

#[derive(Debug, Clone)]
pub struct MockVotingEscrow {
    token: Address,
    locked: HashMap<Address, Decimal>,
}

impl MockVotingEscrow {
    pub fn new(token: Address) -> Self {
        Self {
            token,
            locked: HashMap::new(),
        }
    }
}

impl VotingEscrow for MockVotingEscrow {
    fn token(&self) -> Address {
        self.token
    }

    fn deposit_for(&mut self, env: &mut Env<'_>, addr: Address, value: Decimal) -> Result<()> {
        env.ledger
            .transfer_from(self.token, env.this, env.caller, env.this, value)?;
        *self.locked.entry(addr).or_insert(Decimal::ZERO) += value;
        Ok(())
    }

    fn locked(&self, addr: Address) -> Decimal {
        self.locked.get(&addr).copied().unwrap_or(Decimal::ZERO)
    }
}

impl Contract for MockVotingEscrow {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_voting_escrow(&self) -> Option<&dyn VotingEscrow> {
        Some(self)
    }
    fn as_voting_escrow_mut(&mut self) -> Option<&mut dyn VotingEscrow> {
        Some(self)
    }
}

/// Distributor minting each user's pending interest on claim.
#[derive(Debug, Clone)]
pub struct MockInterestDistributor {
    token: Address,
    pending: HashMap<Address, Decimal>,
}

impl MockInterestDistributor {
    pub fn new(token: Address) -> Self {
        Self {
            token,
            pending: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_pending(mut self, user: Address, amount: Decimal) -> Self {
        self.pending.insert(user, amount);
        self
    }
}

impl InterestDistributor for MockInterestDistributor {
    fn token(&self) -> Address {
        self.token
    }

    fn claim(&mut self, env: &mut Env<'_>, user: Address) -> Result<Decimal> {
        let amount = self.pending.remove(&user).unwrap_or(Decimal::ZERO);
        env.ledger.mint(self.token, user, amount)?;
        Ok(amount)
    }
}

impl Contract for MockInterestDistributor {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_interest_distributor(&self) -> Option<&dyn InterestDistributor> {
        Some(self)
    }
    fn as_interest_distributor_mut(&mut self) -> Option<&mut dyn InterestDistributor> {
        Some(self)
    }
}

// ---------------------------------------------------------------------------
// Vaults and venues
// ---------------------------------------------------------------------------

/// Vault at a fixed share price (assets per share). Shares are the ledger
/// token living at the vault's own address.
#[derive(Debug, Clone)]
pub struct MockVault {
    asset: Address,
    share_price: Decimal,
}

impl MockVault {
    /// Deploy a vault together with its share token.
    pub fn deploy(
        chain: &mut Chain,
        asset: Address,
        share_price: Decimal,
        symbol: &str,
    ) -> Result<Address> {
        let address = chain.reserve_address(symbol);
        chain
            .ledger
            .create_token_at(address, TokenSpec::new(symbol))?;
        chain.deploy_at(
            address,
            Box::new(Self {
                asset,
                share_price,
            }),
        )?;
        Ok(address)
    }

    fn pull_and_mint(
        &self,
        env: &mut Env<'_>,
        assets: Decimal,
        shares: Decimal,
        receiver: Address,
    ) -> Result<()> {
        env.ledger
            .transfer_from(self.asset, env.this, env.caller, env.this, assets)?;
        env.ledger.mint(env.this, receiver, shares)
    }

    fn burn_and_pay(
        &self,
        env: &mut Env<'_>,
        assets: Decimal,
        shares: Decimal,
        receiver: Address,
    ) -> Result<()> {
        env.ledger.burn(env.this, env.caller, shares)?;
        env.ledger.transfer(self.asset, env.this, receiver, assets)
    }
}

impl Vault for MockVault {
    fn asset(&self) -> Address {
        self.asset
    }

    fn deposit(
        &mut self,
        env: &mut Env<'_>,
        assets: Decimal,
        receiver: Address,
    ) -> Result<Decimal> {
        let shares = unscale(assets, self.share_price)?;
        self.pull_and_mint(env, assets, shares, receiver)?;
        Ok(shares)
    }

    fn mint(&mut self, env: &mut Env<'_>, shares: Decimal, receiver: Address) -> Result<Decimal> {
        let assets = scale(shares, self.share_price)?;
        self.pull_and_mint(env, assets, shares, receiver)?;
        Ok(assets)
    }

    fn withdraw(
        &mut self,
        env: &mut Env<'_>,
        assets: Decimal,
        receiver: Address,
    ) -> Result<Decimal> {
        let shares = unscale(assets, self.share_price)?;
        self.burn_and_pay(env, assets, shares, receiver)?;
        Ok(shares)
    }

    fn redeem(
        &mut self,
        env: &mut Env<'_>,
        shares: Decimal,
        receiver: Address,
    ) -> Result<Decimal> {
        let assets = scale(shares, self.share_price)?;
        self.burn_and_pay(env, assets, shares, receiver)?;
        Ok(assets)
    }
}

impl Contract for MockVault {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_vault(&self) -> Option<&dyn Vault> {
        Some(self)
    }
    fn as_vault_mut(&mut self) -> Option<&mut dyn Vault> {
        Some(self)
    }
}

/// AMM quoting fixed rates per `(in, out)` pair. Pays output from its own
/// ledger balance, so tests must fund it.
#[derive(Debug, Clone, Default)]
pub struct MockAmm {
    rates: HashMap<(Address, Address), Decimal>,
}

impl MockAmm {
    pub fn new() -> Self {
        Self::default()
    }

    /// `rate` units of `out_token` per unit of `in_token`.
    #[must_use]
    pub fn with_rate(mut self, in_token: Address, out_token: Address, rate: Decimal) -> Self {
        self.rates.insert((in_token, out_token), rate);
        self
    }

    /// Encode a single-hop route.
    pub fn path(in_token: Address, out_token: Address) -> Vec<u8> {
        serde_json::to_vec(&[in_token, out_token]).expect("route path serializes")
    }
}

impl Amm for MockAmm {
    fn exact_input(&mut self, env: &mut Env<'_>, params: ExactInputParams) -> Result<Decimal> {
        let [in_token, out_token]: [Address; 2] =
            serde_json::from_slice(&params.path).map_err(|_| rejected("bad path"))?;
        let rate = self
            .rates
            .get(&(in_token, out_token))
            .copied()
            .ok_or_else(|| rejected("no pool"))?;
        let amount_out = scale(params.amount_in, rate)?;
        if amount_out < params.amount_out_minimum {
            return Err(rejected("Too little received"));
        }
        env.ledger
            .transfer_from(in_token, env.this, env.caller, env.this, params.amount_in)?;
        env.ledger
            .transfer(out_token, env.this, params.recipient, amount_out)?;
        Ok(amount_out)
    }
}

impl Contract for MockAmm {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_amm_mut(&mut self) -> Option<&mut dyn Amm> {
        Some(self)
    }
}

/// Calldata understood by [`MockAggregator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorOrder {
    pub in_token: Address,
    pub out_token: Address,
    pub amount_in: Decimal,
}

impl AggregatorOrder {
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("aggregator order serializes")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AggregatorMode {
    Fill,
    Revert(String),
    Garbage,
}

/// Aggregator filling [`AggregatorOrder`]s at fixed rates, paying the caller.
#[derive(Debug, Clone)]
pub struct MockAggregator {
    rates: HashMap<(Address, Address), Decimal>,
    mode: AggregatorMode,
}

impl MockAggregator {
    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
            mode: AggregatorMode::Fill,
        }
    }

    #[must_use]
    pub fn with_rate(mut self, in_token: Address, out_token: Address, rate: Decimal) -> Self {
        self.rates.insert((in_token, out_token), rate);
        self
    }

    /// Revert every call with an `Error(string)` message.
    #[must_use]
    pub fn reverting_with(mut self, message: &str) -> Self {
        self.mode = AggregatorMode::Revert(message.to_string());
        self
    }

    /// Revert every call with undecodable data.
    #[must_use]
    pub fn reverting_with_garbage(mut self) -> Self {
        self.mode = AggregatorMode::Garbage;
        self
    }

    fn fill(&self, env: &mut Env<'_>, data: &[u8]) -> Result<Decimal> {
        let order: AggregatorOrder =
            serde_json::from_slice(data).map_err(|_| rejected("bad calldata"))?;
        let rate = self
            .rates
            .get(&(order.in_token, order.out_token))
            .copied()
            .ok_or_else(|| rejected("no route"))?;
        let amount_out = scale(order.amount_in, rate)?;
        env.ledger
            .transfer_from(order.in_token, env.this, env.caller, env.this, order.amount_in)?;
        env.ledger
            .transfer(order.out_token, env.this, env.caller, amount_out)?;
        Ok(amount_out)
    }
}

impl Default for MockAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator for MockAggregator {
    fn execute(&mut self, env: &mut Env<'_>, data: &[u8]) -> CallOutcome {
        match &self.mode {
            AggregatorMode::Revert(message) => Err(encode_error_string(message)),
            AggregatorMode::Garbage => Err(vec![0xde, 0xad, 0xbe, 0xef]),
            AggregatorMode::Fill => match self.fill(env, data) {
                Ok(amount_out) => Ok(amount_out.to_string().into_bytes()),
                Err(err) => Err(encode_error_string(&err.to_string())),
            },
        }
    }
}

impl Contract for MockAggregator {
    fn clone_box(&self) -> Box<dyn Contract> {
        Box::new(self.clone())
    }
    fn as_aggregator_mut(&mut self) -> Option<&mut dyn Aggregator> {
        Some(self)
    }
}
