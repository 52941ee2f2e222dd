//! Fungible-token ledger of the host environment.
//!
//! Tracks per-(token, holder) balances, per-(token, owner, spender)
//! allowances, permit nonces, native value and a wrapped-native token.
//! Every mutating call is atomic on its own: it validates first and only
//! then writes, so a failed call leaves the ledger unchanged.
//!
//! The ledger does not authenticate its callers. Contracts and the router
//! are trusted to move only funds they control, exactly as a token contract
//! trusts `msg.sender`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, VerifyingKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stablemix_types::{Address, MixerError, PermitRecord, Result, constants};

/// Static properties of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub symbol: String,
    /// Exposes the signature-based approval entry point.
    pub permit: bool,
    /// Rejects changing a non-zero allowance to another non-zero value.
    pub requires_zero_reset: bool,
}

impl TokenSpec {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            permit: false,
            requires_zero_reset: false,
        }
    }

    #[must_use]
    pub fn with_permit(mut self) -> Self {
        self.permit = true;
        self
    }

    #[must_use]
    pub fn with_zero_reset(mut self) -> Self {
        self.requires_zero_reset = true;
        self
    }
}

#[derive(Debug, Clone)]
struct TokenState {
    spec: TokenSpec,
    balances: HashMap<Address, Decimal>,
    allowances: HashMap<(Address, Address), Decimal>,
    nonces: HashMap<Address, u64>,
    total_supply: Decimal,
}

impl TokenState {
    fn new(spec: TokenSpec) -> Self {
        Self {
            spec,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            nonces: HashMap::new(),
            total_supply: Decimal::ZERO,
        }
    }

    fn balance(&self, holder: Address) -> Decimal {
        self.balances.get(&holder).copied().unwrap_or(Decimal::ZERO)
    }

    fn allowance(&self, owner: Address, spender: Address) -> Decimal {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

/// The host's value ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    tokens: HashMap<Address, TokenState>,
    native: HashMap<Address, Decimal>,
    wrapped_native: Option<Address>,
    now: DateTime<Utc>,
    approvals_issued: u64,
    tokens_created: u64,
}

impl Ledger {
    /// Create an empty ledger whose clock starts at the current wall time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
            native: HashMap::new(),
            wrapped_native: None,
            now: Utc::now(),
            approvals_issued: 0,
            tokens_created: 0,
        }
    }

    // -----------------------------------------------------------------
    // Tokens
    // -----------------------------------------------------------------

    /// Create a token at a fresh derived address.
    pub fn create_token(&mut self, spec: TokenSpec) -> Address {
        self.tokens_created += 1;
        let label = format!("token:{}:{}", spec.symbol, self.tokens_created);
        let address = Address::derive(label.as_bytes());
        self.tokens.insert(address, TokenState::new(spec));
        address
    }

    /// Create a token at a chosen address (share tokens living at their
    /// vault's address).
    ///
    /// # Errors
    /// `ZeroAddress` for the zero address, `AlreadyAdded` if taken.
    pub fn create_token_at(&mut self, address: Address, spec: TokenSpec) -> Result<()> {
        if address.is_zero() {
            return Err(MixerError::ZeroAddress);
        }
        if self.tokens.contains_key(&address) {
            return Err(MixerError::AlreadyAdded);
        }
        self.tokens.insert(address, TokenState::new(spec));
        Ok(())
    }

    /// Create the wrapped-native token and remember it.
    pub fn enable_wrapped_native(&mut self, symbol: &str) -> Address {
        let address = self.create_token(TokenSpec::new(symbol));
        self.wrapped_native = Some(address);
        address
    }

    #[must_use]
    pub fn wrapped_native(&self) -> Option<Address> {
        self.wrapped_native
    }

    #[must_use]
    pub fn is_token(&self, token: Address) -> bool {
        self.tokens.contains_key(&token)
    }

    /// # Errors
    /// `UnknownToken` if `token` was never created.
    pub fn spec(&self, token: Address) -> Result<&TokenSpec> {
        Ok(&self.token(token)?.spec)
    }

    /// Balance of `holder`. Zero for unknown tokens.
    #[must_use]
    pub fn balance_of(&self, token: Address, holder: Address) -> Decimal {
        self.tokens
            .get(&token)
            .map_or(Decimal::ZERO, |state| state.balance(holder))
    }

    #[must_use]
    pub fn total_supply(&self, token: Address) -> Decimal {
        self.tokens
            .get(&token)
            .map_or(Decimal::ZERO, |state| state.total_supply)
    }

    #[must_use]
    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Decimal {
        self.tokens
            .get(&token)
            .map_or(Decimal::ZERO, |state| state.allowance(owner, spender))
    }

    /// Current permit nonce of `owner` on `token`.
    #[must_use]
    pub fn nonce(&self, token: Address, owner: Address) -> u64 {
        self.tokens
            .get(&token)
            .and_then(|state| state.nonces.get(&owner).copied())
            .unwrap_or(0)
    }

    /// Number of approval operations ever issued.
    #[must_use]
    pub fn approvals_issued(&self) -> u64 {
        self.approvals_issued
    }

    /// Set `owner`'s allowance for `spender` to exactly `amount`.
    ///
    /// # Errors
    /// `ApproveFromNonZero` when the token requires a reset to zero before a
    /// non-zero allowance can change to another non-zero value.
    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Decimal,
    ) -> Result<()> {
        check_amount(amount)?;
        let state = self.token_mut(token)?;
        let current = state.allowance(owner, spender);
        if state.spec.requires_zero_reset && !current.is_zero() && !amount.is_zero() {
            return Err(MixerError::ApproveFromNonZero { token });
        }
        state.allowances.insert((owner, spender), amount);
        self.approvals_issued += 1;
        tracing::debug!(
            token = %token.short(),
            owner = %owner.short(),
            spender = %spender.short(),
            %amount,
            "Approval set"
        );
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// `InsufficientBalance` if `from` holds less than `amount`.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<()> {
        check_amount(amount)?;
        let state = self.token_mut(token)?;
        let available = state.balance(from);
        if available < amount {
            return Err(MixerError::InsufficientBalance {
                token,
                needed: amount,
                available,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }
        state.balances.insert(from, available - amount);
        *state.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming
    /// allowance unless `spender == from` or the allowance is infinite.
    ///
    /// # Errors
    /// `InsufficientAllowance` or `InsufficientBalance`.
    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<()> {
        check_amount(amount)?;
        self.check_allowance(token, from, spender, amount)?;
        self.transfer(token, from, to, amount)?;
        self.consume_allowance(token, from, spender, amount);
        Ok(())
    }

    /// Consume `amount` of `spender`'s allowance over `owner`'s funds without
    /// moving anything (burn-from style operations).
    ///
    /// # Errors
    /// `InsufficientAllowance` if the allowance is too small.
    pub fn spend_allowance(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Decimal,
    ) -> Result<()> {
        check_amount(amount)?;
        self.check_allowance(token, owner, spender, amount)?;
        self.consume_allowance(token, owner, spender, amount);
        Ok(())
    }

    fn check_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Decimal,
    ) -> Result<()> {
        let state = self.token(token)?;
        if spender == owner {
            return Ok(());
        }
        let available = state.allowance(owner, spender);
        if available < amount {
            return Err(MixerError::InsufficientAllowance {
                token,
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    fn consume_allowance(&mut self, token: Address, owner: Address, spender: Address, amount: Decimal) {
        if spender == owner {
            return;
        }
        if let Some(state) = self.tokens.get_mut(&token) {
            if let Some(current) = state.allowances.get_mut(&(owner, spender)) {
                if *current != constants::MAX_ALLOWANCE {
                    *current -= amount;
                }
            }
        }
    }

    /// Create `amount` new units for `to`.
    ///
    /// # Errors
    /// `UnknownToken` or `NegativeAmount`.
    pub fn mint(&mut self, token: Address, to: Address, amount: Decimal) -> Result<()> {
        check_amount(amount)?;
        let state = self.token_mut(token)?;
        *state.balances.entry(to).or_insert(Decimal::ZERO) += amount;
        state.total_supply += amount;
        Ok(())
    }

    /// Destroy `amount` units held by `from`.
    ///
    /// # Errors
    /// `InsufficientBalance` if `from` holds less than `amount`.
    pub fn burn(&mut self, token: Address, from: Address, amount: Decimal) -> Result<()> {
        check_amount(amount)?;
        let state = self.token_mut(token)?;
        let available = state.balance(from);
        if available < amount {
            return Err(MixerError::InsufficientBalance {
                token,
                needed: amount,
                available,
            });
        }
        state.balances.insert(from, available - amount);
        state.total_supply -= amount;
        Ok(())
    }

    /// Apply a signed approval.
    ///
    /// Checks, in order: the token supports permits, the deadline has not
    /// passed on the ledger clock, the owner address derives from the
    /// supplied key, and the signature verifies at the owner's current
    /// nonce. On success the nonce increments and the allowance is set to
    /// `record.value` regardless of its previous value.
    ///
    /// # Errors
    /// `PermitNotSupported`, `PermitExpired` or `InvalidSignature`.
    pub fn permit(&mut self, record: &PermitRecord) -> Result<()> {
        check_amount(record.value)?;
        let now = self.now;
        let state = self.token_mut(record.token)?;
        if !state.spec.permit {
            return Err(MixerError::PermitNotSupported(record.token));
        }
        if record.is_expired_at(now) {
            return Err(MixerError::PermitExpired);
        }
        if Address::from_public_key(&record.owner_key) != record.owner {
            return Err(MixerError::InvalidSignature);
        }
        let nonce = state.nonces.get(&record.owner).copied().unwrap_or(0);
        let key =
            VerifyingKey::from_bytes(&record.owner_key).map_err(|_| MixerError::InvalidSignature)?;
        let signature =
            Signature::from_slice(&record.signature).map_err(|_| MixerError::InvalidSignature)?;
        key.verify_strict(&record.signing_payload(nonce), &signature)
            .map_err(|_| MixerError::InvalidSignature)?;

        state.nonces.insert(record.owner, nonce + 1);
        state
            .allowances
            .insert((record.owner, record.spender), record.value);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Native value
    // -----------------------------------------------------------------

    #[must_use]
    pub fn native_balance(&self, holder: Address) -> Decimal {
        self.native.get(&holder).copied().unwrap_or(Decimal::ZERO)
    }

    /// Credit native value out of thin air. Genesis funding only.
    pub fn credit_native(&mut self, holder: Address, amount: Decimal) {
        *self.native.entry(holder).or_insert(Decimal::ZERO) += amount;
    }

    /// # Errors
    /// `InsufficientNativeBalance` if `from` holds less than `amount`.
    pub fn transfer_native(&mut self, from: Address, to: Address, amount: Decimal) -> Result<()> {
        check_amount(amount)?;
        let available = self.native_balance(from);
        if available < amount {
            return Err(MixerError::InsufficientNativeBalance {
                needed: amount,
                available,
            });
        }
        if amount.is_zero() || from == to {
            return Ok(());
        }
        self.native.insert(from, available - amount);
        self.credit_native(to, amount);
        Ok(())
    }

    /// Convert `holder`'s native value into wrapped-native tokens.
    ///
    /// # Errors
    /// `Internal` if no wrapped-native token exists,
    /// `InsufficientNativeBalance` if `holder` lacks value.
    pub fn wrap_native(&mut self, holder: Address, amount: Decimal) -> Result<()> {
        let wrapped = self.require_wrapped_native()?;
        check_amount(amount)?;
        let available = self.native_balance(holder);
        if available < amount {
            return Err(MixerError::InsufficientNativeBalance {
                needed: amount,
                available,
            });
        }
        self.mint(wrapped, holder, amount)?;
        self.native.insert(holder, available - amount);
        Ok(())
    }

    /// Convert `holder`'s wrapped-native tokens back into native value.
    ///
    /// # Errors
    /// `Internal` if no wrapped-native token exists,
    /// `InsufficientBalance` if `holder` lacks tokens.
    pub fn unwrap_native(&mut self, holder: Address, amount: Decimal) -> Result<()> {
        let wrapped = self.require_wrapped_native()?;
        self.burn(wrapped, holder, amount)?;
        self.credit_native(holder, amount);
        Ok(())
    }

    fn require_wrapped_native(&self) -> Result<Address> {
        self.wrapped_native
            .ok_or_else(|| MixerError::Internal("wrapped native token not enabled".to_string()))
    }

    // -----------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn set_time(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn advance(&mut self, by: chrono::Duration) {
        self.now += by;
    }

    // -----------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------

    /// Verify that the sum of all balances equals the recorded supply.
    ///
    /// # Errors
    /// `SupplyInvariantViolation` if they differ.
    pub fn verify_supply(&self, token: Address) -> Result<()> {
        let state = self.token(token)?;
        let actual: Decimal = state.balances.values().copied().sum();
        if actual != state.total_supply {
            return Err(MixerError::SupplyInvariantViolation {
                reason: format!(
                    "Token {token} ({}): balances sum to {actual}, supply is {}",
                    state.spec.symbol, state.total_supply,
                ),
            });
        }
        Ok(())
    }

    fn token(&self, token: Address) -> Result<&TokenState> {
        self.tokens
            .get(&token)
            .ok_or(MixerError::UnknownToken(token))
    }

    fn token_mut(&mut self, token: Address) -> Result<&mut TokenState> {
        self.tokens
            .get_mut(&token)
            .ok_or(MixerError::UnknownToken(token))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn check_amount(amount: Decimal) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MixerError::NegativeAmount(amount));
    }
    Ok(())
}
