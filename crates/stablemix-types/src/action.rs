//! The router's instruction set.
//!
//! A caller submits parallel `actions: Vec<u8>` / `payloads: Vec<Vec<u8>>`.
//! Each tag maps to an [`ActionType`]; each payload is the JSON encoding of
//! that type's payload struct. [`Action::decode`] turns a `(tag, payload)`
//! pair into the closed [`Action`] enum exactly once, before dispatch.
//!
//! Tags that this router does not know decode to [`Action::Unknown`] and are
//! skipped by the dispatcher. Specialized routers extend the tag space, so an
//! unknown tag is not a decoding error. A *known* tag with a bad payload is.
//!
//! | tag | action |
//! |----:|--------|
//! | 0 | `ClaimRewards` |
//! | 1 | `ClaimWeeklyInterest` |
//! | 2 | `GaugeDeposit` |
//! | 3 | `Withdraw` |
//! | 4 | `Mint` |
//! | 5 | `Deposit` |
//! | 6 | `OpenPerpetual` |
//! | 7 | `AddToPerpetual` |
//! | 8 | `VeLock` |
//! | 9 | `Burn` |
//! | 10 | `Sweep` |
//! | 11 | `SweepNative` |
//! | 12 | `WrapNative` |
//! | 13 | `UnwrapNative` |
//! | 14 | `VaultMint` |
//! | 15 | `VaultDeposit` |
//! | 16 | `VaultRedeem` |
//! | 17 | `VaultWithdraw` |

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Address, MixerError, PerpetualId, Result};

/// Recognized action tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum ActionType {
    ClaimRewards = 0,
    ClaimWeeklyInterest = 1,
    GaugeDeposit = 2,
    Withdraw = 3,
    Mint = 4,
    Deposit = 5,
    OpenPerpetual = 6,
    AddToPerpetual = 7,
    VeLock = 8,
    Burn = 9,
    Sweep = 10,
    SweepNative = 11,
    WrapNative = 12,
    UnwrapNative = 13,
    VaultMint = 14,
    VaultDeposit = 15,
    VaultRedeem = 16,
    VaultWithdraw = 17,
}

impl ActionType {
    /// Every recognized tag, in tag order.
    pub const ALL: [Self; 18] = [
        Self::ClaimRewards,
        Self::ClaimWeeklyInterest,
        Self::GaugeDeposit,
        Self::Withdraw,
        Self::Mint,
        Self::Deposit,
        Self::OpenPerpetual,
        Self::AddToPerpetual,
        Self::VeLock,
        Self::Burn,
        Self::Sweep,
        Self::SweepNative,
        Self::WrapNative,
        Self::UnwrapNative,
        Self::VaultMint,
        Self::VaultDeposit,
        Self::VaultRedeem,
        Self::VaultWithdraw,
    ];

    /// Map a wire tag to an action type. `None` for tags this router skips.
    #[must_use]
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(usize::from(tag)).copied()
    }

    #[must_use]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ClaimRewards => "CLAIM_REWARDS",
            Self::ClaimWeeklyInterest => "CLAIM_WEEKLY_INTEREST",
            Self::GaugeDeposit => "GAUGE_DEPOSIT",
            Self::Withdraw => "WITHDRAW",
            Self::Mint => "MINT",
            Self::Deposit => "DEPOSIT",
            Self::OpenPerpetual => "OPEN_PERPETUAL",
            Self::AddToPerpetual => "ADD_TO_PERPETUAL",
            Self::VeLock => "VE_LOCK",
            Self::Burn => "BURN",
            Self::Sweep => "SWEEP",
            Self::SweepNative => "SWEEP_NATIVE",
            Self::WrapNative => "WRAP_NATIVE",
            Self::UnwrapNative => "UNWRAP_NATIVE",
            Self::VaultMint => "VAULT_MINT",
            Self::VaultDeposit => "VAULT_DEPOSIT",
            Self::VaultRedeem => "VAULT_REDEEM",
            Self::VaultWithdraw => "VAULT_WITHDRAW",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Where the perpetual managers for a reward claim come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerpetualSource {
    /// Explicit manager per perpetual id.
    Managers(Vec<Address>),
    /// `(stablecoin, collateral)` pairs resolved through the registry.
    Pairs {
        stablecoins: Vec<Address>,
        collaterals: Vec<Address>,
    },
}

impl Default for PerpetualSource {
    fn default() -> Self {
        Self::Managers(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRewardsPayload {
    pub user: Address,
    pub gauges: Vec<Address>,
    #[serde(default)]
    pub perpetual_ids: Vec<PerpetualId>,
    #[serde(default)]
    pub perpetuals: PerpetualSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimWeeklyInterestPayload {
    pub user: Address,
    pub distributor: Address,
    /// Leave the claimed tokens in router custody for a later action.
    pub keep_in_router: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaugeDepositPayload {
    pub user: Address,
    pub amount: Decimal,
    pub staked_token: Address,
    pub gauge: Address,
    /// Ignore `amount` and stake the router's whole balance.
    #[serde(default)]
    pub take_full_balance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawPayload {
    /// San tokens held by the router.
    pub amount: Decimal,
    pub dest: Address,
    pub stablecoin: Address,
    pub collateral: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintPayload {
    pub user: Address,
    /// Collateral held by the router.
    pub amount: Decimal,
    pub min_stable_amount: Decimal,
    pub stablecoin: Address,
    pub collateral: Address,
    /// Maximum collateral spent per stablecoin minted.
    #[serde(default)]
    pub max_mint_rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositPayload {
    pub user: Address,
    /// Collateral held by the router.
    pub amount: Decimal,
    pub stablecoin: Address,
    pub collateral: Address,
    /// Stake the resulting san tokens in the pair's gauge for `user`.
    #[serde(default)]
    pub stake_in_gauge: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPerpetualPayload {
    pub owner: Address,
    pub margin: Decimal,
    pub committed_amount: Decimal,
    pub max_oracle_rate: Decimal,
    pub min_net_margin: Decimal,
    pub stablecoin: Address,
    pub collateral: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddToPerpetualPayload {
    pub perpetual_id: PerpetualId,
    pub amount: Decimal,
    pub stablecoin: Address,
    pub collateral: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VeLockPayload {
    pub user: Address,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnPayload {
    /// Holder of the stablecoins. Anyone but the router must have approved it.
    pub from: Address,
    pub dest: Address,
    pub amount: Decimal,
    pub min_collateral_amount: Decimal,
    pub stablecoin: Address,
    pub collateral: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepPayload {
    pub token: Address,
    pub min_amount_out: Decimal,
    pub to: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepNativePayload {
    pub min_amount_out: Decimal,
    pub to: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapNativePayload {
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnwrapNativePayload {
    pub min_amount_out: Decimal,
    pub to: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMintPayload {
    /// Underlying asset held by the router.
    pub token: Address,
    pub vault: Address,
    pub shares: Decimal,
    pub to: Address,
    pub max_amount_in: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDepositPayload {
    pub token: Address,
    pub vault: Address,
    pub amount: Decimal,
    pub to: Address,
    pub min_shares_out: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultRedeemPayload {
    pub vault: Address,
    pub shares: Decimal,
    pub to: Address,
    pub min_amount_out: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultWithdrawPayload {
    pub vault: Address,
    pub amount: Decimal,
    pub to: Address,
    pub max_shares_in: Decimal,
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A decoded action, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ClaimRewards(ClaimRewardsPayload),
    ClaimWeeklyInterest(ClaimWeeklyInterestPayload),
    GaugeDeposit(GaugeDepositPayload),
    Withdraw(WithdrawPayload),
    Mint(MintPayload),
    Deposit(DepositPayload),
    OpenPerpetual(OpenPerpetualPayload),
    AddToPerpetual(AddToPerpetualPayload),
    VeLock(VeLockPayload),
    Burn(BurnPayload),
    Sweep(SweepPayload),
    SweepNative(SweepNativePayload),
    WrapNative(WrapNativePayload),
    UnwrapNative(UnwrapNativePayload),
    VaultMint(VaultMintPayload),
    VaultDeposit(VaultDepositPayload),
    VaultRedeem(VaultRedeemPayload),
    VaultWithdraw(VaultWithdrawPayload),
    /// A tag this router does not implement. Dispatch is a no-op.
    Unknown(u8),
}

impl Action {
    /// Decode a wire `(tag, payload)` pair.
    ///
    /// # Errors
    /// Returns `MalformedPayload` if `tag` is recognized but `payload` does
    /// not decode into that tag's payload struct.
    pub fn decode(tag: u8, payload: &[u8]) -> Result<Self> {
        let Some(kind) = ActionType::from_tag(tag) else {
            return Ok(Self::Unknown(tag));
        };
        let action = match kind {
            ActionType::ClaimRewards => Self::ClaimRewards(parse(kind, payload)?),
            ActionType::ClaimWeeklyInterest => Self::ClaimWeeklyInterest(parse(kind, payload)?),
            ActionType::GaugeDeposit => Self::GaugeDeposit(parse(kind, payload)?),
            ActionType::Withdraw => Self::Withdraw(parse(kind, payload)?),
            ActionType::Mint => Self::Mint(parse(kind, payload)?),
            ActionType::Deposit => Self::Deposit(parse(kind, payload)?),
            ActionType::OpenPerpetual => Self::OpenPerpetual(parse(kind, payload)?),
            ActionType::AddToPerpetual => Self::AddToPerpetual(parse(kind, payload)?),
            ActionType::VeLock => Self::VeLock(parse(kind, payload)?),
            ActionType::Burn => Self::Burn(parse(kind, payload)?),
            ActionType::Sweep => Self::Sweep(parse(kind, payload)?),
            ActionType::SweepNative => Self::SweepNative(parse(kind, payload)?),
            ActionType::WrapNative => Self::WrapNative(parse(kind, payload)?),
            ActionType::UnwrapNative => Self::UnwrapNative(parse(kind, payload)?),
            ActionType::VaultMint => Self::VaultMint(parse(kind, payload)?),
            ActionType::VaultDeposit => Self::VaultDeposit(parse(kind, payload)?),
            ActionType::VaultRedeem => Self::VaultRedeem(parse(kind, payload)?),
            ActionType::VaultWithdraw => Self::VaultWithdraw(parse(kind, payload)?),
        };
        Ok(action)
    }

    /// Encode back into a wire `(tag, payload)` pair. `Unknown` encodes
    /// with an empty payload.
    ///
    /// # Errors
    /// Returns `Serialization` if the payload cannot be encoded.
    pub fn encode(&self) -> Result<(u8, Vec<u8>)> {
        let payload = match self {
            Self::ClaimRewards(p) => serde_json::to_vec(p)?,
            Self::ClaimWeeklyInterest(p) => serde_json::to_vec(p)?,
            Self::GaugeDeposit(p) => serde_json::to_vec(p)?,
            Self::Withdraw(p) => serde_json::to_vec(p)?,
            Self::Mint(p) => serde_json::to_vec(p)?,
            Self::Deposit(p) => serde_json::to_vec(p)?,
            Self::OpenPerpetual(p) => serde_json::to_vec(p)?,
            Self::AddToPerpetual(p) => serde_json::to_vec(p)?,
            Self::VeLock(p) => serde_json::to_vec(p)?,
            Self::Burn(p) => serde_json::to_vec(p)?,
            Self::Sweep(p) => serde_json::to_vec(p)?,
            Self::SweepNative(p) => serde_json::to_vec(p)?,
            Self::WrapNative(p) => serde_json::to_vec(p)?,
            Self::UnwrapNative(p) => serde_json::to_vec(p)?,
            Self::VaultMint(p) => serde_json::to_vec(p)?,
            Self::VaultDeposit(p) => serde_json::to_vec(p)?,
            Self::VaultRedeem(p) => serde_json::to_vec(p)?,
            Self::VaultWithdraw(p) => serde_json::to_vec(p)?,
            Self::Unknown(_) => Vec::new(),
        };
        Ok((self.tag(), payload))
    }

    /// The wire tag of this action.
    #[must_use]
    pub fn tag(&self) -> u8 {
        match self {
            Self::Unknown(tag) => *tag,
            known => known.kind().map_or(0, ActionType::tag),
        }
    }

    /// The action type, or `None` for [`Action::Unknown`].
    #[must_use]
    pub fn kind(&self) -> Option<ActionType> {
        let kind = match self {
            Self::ClaimRewards(_) => ActionType::ClaimRewards,
            Self::ClaimWeeklyInterest(_) => ActionType::ClaimWeeklyInterest,
            Self::GaugeDeposit(_) => ActionType::GaugeDeposit,
            Self::Withdraw(_) => ActionType::Withdraw,
            Self::Mint(_) => ActionType::Mint,
            Self::Deposit(_) => ActionType::Deposit,
            Self::OpenPerpetual(_) => ActionType::OpenPerpetual,
            Self::AddToPerpetual(_) => ActionType::AddToPerpetual,
            Self::VeLock(_) => ActionType::VeLock,
            Self::Burn(_) => ActionType::Burn,
            Self::Sweep(_) => ActionType::Sweep,
            Self::SweepNative(_) => ActionType::SweepNative,
            Self::WrapNative(_) => ActionType::WrapNative,
            Self::UnwrapNative(_) => ActionType::UnwrapNative,
            Self::VaultMint(_) => ActionType::VaultMint,
            Self::VaultDeposit(_) => ActionType::VaultDeposit,
            Self::VaultRedeem(_) => ActionType::VaultRedeem,
            Self::VaultWithdraw(_) => ActionType::VaultWithdraw,
            Self::Unknown(_) => return None,
        };
        Some(kind)
    }
}

fn parse<T: DeserializeOwned>(kind: ActionType, payload: &[u8]) -> Result<T> {
    serde_json::from_slice(payload).map_err(|e| MixerError::MalformedPayload {
        action: kind.to_string(),
        reason: e.to_string(),
    })
}
