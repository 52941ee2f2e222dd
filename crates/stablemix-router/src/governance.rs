//! Governance entry points.
//!
//! Every call checks roles first, then edits a staged copy of the registry
//! inside a host transaction. The copy replaces the live registry only when
//! the whole call succeeded, so a half-applied batch is impossible.

use rust_decimal::Decimal;
use stablemix_ledger::Chain;
use stablemix_types::{
    Address, GaugeRef, MixerError, PairRegistration, Result, RouterEvent, constants,
};

use crate::Router;
use crate::access::RoleChange;
use crate::allowance::set_allowance;
use crate::funding::resolve;
use crate::gauge::GaugeAdapter;
use crate::registry::Registry;

impl Router {
    /// Run `f` against a staged registry inside a host transaction and commit
    /// the registry only if `f` succeeds.
    fn govern<F>(&mut self, chain: &mut Chain, f: F) -> Result<Vec<RouterEvent>>
    where
        F: FnOnce(&Self, &mut Registry, &mut Chain) -> Result<Vec<RouterEvent>>,
    {
        let mut staged = self.registry.clone();
        let events = chain.atomically(|chain| f(self, &mut staged, chain))?;
        self.registry = staged;
        Ok(events)
    }

    /// Register the stable master issuing `stablecoin`.
    ///
    /// # Errors
    /// Access errors, `ZeroAddress`, `InvalidParams` if the master issues
    /// another stablecoin, `AlreadyAdded`.
    pub fn add_stable_master(
        &mut self,
        chain: &mut Chain,
        caller: Address,
        stablecoin: Address,
        stable_master: Address,
    ) -> Result<Vec<RouterEvent>> {
        self.access.require_governor_or_guardian(caller)?;
        if stablecoin.is_zero() || stable_master.is_zero() {
            return Err(MixerError::ZeroAddress);
        }
        self.govern(chain, |_, registry, chain| {
            let issued = chain.stable_master(stable_master)?.ag_token();
            if issued != stablecoin {
                return Err(MixerError::InvalidParams {
                    reason: format!("stable master {stable_master} issues {issued}"),
                });
            }
            registry.insert_stable_master(stablecoin, stable_master)?;
            tracing::info!(
                stablecoin = %stablecoin.short(),
                stable_master = %stable_master.short(),
                "Stable master added"
            );
            Ok(vec![RouterEvent::StableMasterAdded {
                stablecoin,
                stable_master,
            }])
        })
    }

    /// Register `(stablecoin, collateral)` pairs from their pool managers,
    /// with an optional gauge each, and grant the standing allowances the
    /// handlers rely on.
    ///
    /// # Errors
    /// Access errors, `IncompatibleLengths`, `ZeroAddress` for an unknown
    /// stablecoin, `InvalidParams` for a foreign pool manager,
    /// `InvalidSanToken` for a mismatched gauge, `AlreadyAdded`.
    pub fn add_pairs(
        &mut self,
        chain: &mut Chain,
        caller: Address,
        stablecoins: &[Address],
        pool_managers: &[Address],
        gauges: &[Option<Address>],
    ) -> Result<Vec<RouterEvent>> {
        self.access.require_governor_or_guardian(caller)?;
        if stablecoins.len() != pool_managers.len() || stablecoins.len() != gauges.len() {
            return Err(MixerError::IncompatibleLengths);
        }
        self.govern(chain, |router, registry, chain| {
            let mut events = Vec::new();
            for ((stablecoin, pool_manager), gauge) in
                stablecoins.iter().zip(pool_managers).zip(gauges)
            {
                let registration = resolve_pair(chain, registry, *stablecoin, *pool_manager)?;
                let gauge = gauge
                    .map(|gauge| check_gauge(chain, gauge, registration.san_token))
                    .transpose()?;
                let registration = PairRegistration {
                    gauge,
                    ..registration
                };
                registry.insert_pair(registration)?;
                grant_pair_allowances(chain, router.address(), &registration, constants::MAX_ALLOWANCE)?;

                tracing::info!(
                    stablecoin = %registration.stablecoin.short(),
                    collateral = %registration.collateral.short(),
                    pool_manager = %registration.pool_manager.short(),
                    gauge = ?gauge.map(|g| g.address.short()),
                    "Pair added"
                );
                events.push(RouterEvent::PairAdded {
                    stablecoin: registration.stablecoin,
                    collateral: registration.collateral,
                    pool_manager: registration.pool_manager,
                });
                if let Some(gauge) = gauge {
                    events.push(RouterEvent::GaugeUpdated {
                        stablecoin: registration.stablecoin,
                        collateral: registration.collateral,
                        gauge: Some(gauge.address),
                    });
                }
            }
            Ok(events)
        })
    }

    /// Unregister pairs and revoke their allowances. The only way to
    /// replace a pair's pool manager.
    ///
    /// # Errors
    /// Access errors, `IncompatibleLengths`, `ZeroAddress` for an unknown pair.
    pub fn remove_pairs(
        &mut self,
        chain: &mut Chain,
        caller: Address,
        stablecoins: &[Address],
        collaterals: &[Address],
    ) -> Result<Vec<RouterEvent>> {
        self.access.require_governor_or_guardian(caller)?;
        if stablecoins.len() != collaterals.len() {
            return Err(MixerError::IncompatibleLengths);
        }
        self.govern(chain, |router, registry, chain| {
            let mut events = Vec::new();
            for (stablecoin, collateral) in stablecoins.iter().zip(collaterals) {
                let registration = registry.remove_pair(*stablecoin, *collateral)?;
                grant_pair_allowances(chain, router.address(), &registration, Decimal::ZERO)?;
                tracing::info!(
                    stablecoin = %stablecoin.short(),
                    collateral = %collateral.short(),
                    "Pair removed"
                );
                events.push(RouterEvent::PairRemoved {
                    stablecoin: *stablecoin,
                    collateral: *collateral,
                });
            }
            Ok(events)
        })
    }

    /// Replace or clear the gauge of registered pairs. The old gauge loses
    /// its san-token allowance, the new one is granted an infinite one.
    ///
    /// # Errors
    /// Access errors, `IncompatibleLengths`, `ZeroAddress` for an unknown
    /// pair, `InvalidSanToken` for a mismatched gauge.
    pub fn set_liquidity_gauges(
        &mut self,
        chain: &mut Chain,
        caller: Address,
        gauges: &[Option<Address>],
        stablecoins: &[Address],
        collaterals: &[Address],
    ) -> Result<Vec<RouterEvent>> {
        self.access.require_governor_or_guardian(caller)?;
        if gauges.len() != stablecoins.len() || gauges.len() != collaterals.len() {
            return Err(MixerError::IncompatibleLengths);
        }
        self.govern(chain, |router, registry, chain| {
            let this = router.address();
            let mut events = Vec::new();
            for ((gauge, stablecoin), collateral) in gauges.iter().zip(stablecoins).zip(collaterals) {
                let san_token = registry.pair(*stablecoin, *collateral)?.san_token;
                let new = gauge
                    .map(|gauge| check_gauge(chain, gauge, san_token))
                    .transpose()?;
                let old = registry.set_gauge(*stablecoin, *collateral, new)?;

                if let Some(old) = old {
                    set_allowance(&mut chain.ledger, this, san_token, old.address, Decimal::ZERO)?;
                }
                if let Some(new) = new {
                    set_allowance(
                        &mut chain.ledger,
                        this,
                        san_token,
                        new.address,
                        constants::MAX_ALLOWANCE,
                    )?;
                }
                tracing::info!(
                    stablecoin = %stablecoin.short(),
                    collateral = %collateral.short(),
                    gauge = ?gauge.map(|g| g.short()),
                    "Gauge updated"
                );
                events.push(RouterEvent::GaugeUpdated {
                    stablecoin: *stablecoin,
                    collateral: *collateral,
                    gauge: *gauge,
                });
            }
            Ok(events)
        })
    }

    /// Set router allowances to exact amounts.
    ///
    /// # Errors
    /// Access errors, `IncompatibleLengths`, ledger errors.
    pub fn change_allowance(
        &mut self,
        chain: &mut Chain,
        caller: Address,
        tokens: &[Address],
        spenders: &[Address],
        amounts: &[Decimal],
    ) -> Result<Vec<RouterEvent>> {
        self.access.require_governor_or_guardian(caller)?;
        if tokens.len() != spenders.len() || tokens.len() != amounts.len() {
            return Err(MixerError::IncompatibleLengths);
        }
        self.govern(chain, |router, _, chain| {
            let mut events = Vec::new();
            for ((token, spender), amount) in tokens.iter().zip(spenders).zip(amounts) {
                if set_allowance(&mut chain.ledger, router.address(), *token, *spender, *amount)? {
                    events.push(RouterEvent::AllowanceChanged {
                        token: *token,
                        spender: *spender,
                        amount: *amount,
                    });
                }
            }
            Ok(events)
        })
    }

    /// Add or remove a governor, or replace the guardian.
    ///
    /// # Errors
    /// See [`AccessControl::apply`](crate::AccessControl::apply).
    pub fn set_governor_or_guardian(&mut self, caller: Address, change: RoleChange) -> Result<()> {
        self.access.apply(caller, change)
    }

    /// Move tokens stuck in the router to `to`.
    ///
    /// # Errors
    /// Access errors, `ZeroAddress`, ledger errors.
    pub fn recover_erc20(
        &mut self,
        chain: &mut Chain,
        caller: Address,
        token: Address,
        to: Address,
        amount: Decimal,
    ) -> Result<Vec<RouterEvent>> {
        self.access.require_governor_or_guardian(caller)?;
        if to.is_zero() {
            return Err(MixerError::ZeroAddress);
        }
        self.govern(chain, |router, _, chain| {
            let this = router.address();
            let amount = resolve(amount, chain.ledger.balance_of(token, this));
            chain.ledger.transfer(token, this, to, amount)?;
            tracing::info!(token = %token.short(), to = %to.short(), %amount, "Tokens recovered");
            Ok(vec![RouterEvent::Recovered { token, to, amount }])
        })
    }
}

/// Build a pair registration from a pool manager, checking it belongs to
/// the stablecoin's stable master.
fn resolve_pair(
    chain: &Chain,
    registry: &Registry,
    stablecoin: Address,
    pool_manager: Address,
) -> Result<PairRegistration> {
    let stable_master = registry.stable_master(stablecoin)?;
    let manager = chain.pool_manager(pool_manager)?;
    if manager.stable_master() != stable_master {
        return Err(MixerError::InvalidParams {
            reason: format!("pool manager {pool_manager} belongs to another stable master"),
        });
    }
    let info = chain
        .stable_master(stable_master)?
        .collateral(pool_manager)
        .ok_or_else(|| MixerError::InvalidParams {
            reason: format!("stable master {stable_master} does not know {pool_manager}"),
        })?;
    if info.token != manager.token() {
        return Err(MixerError::InvalidParams {
            reason: format!("pool manager {pool_manager} manages another collateral"),
        });
    }
    Ok(PairRegistration {
        stablecoin,
        collateral: info.token,
        stable_master,
        pool_manager,
        perpetual_manager: info.perpetual_manager,
        san_token: info.san_token,
        gauge: None,
    })
}

/// Detect a gauge's shape and check it stakes `san_token`.
fn check_gauge(chain: &Chain, gauge: Address, san_token: Address) -> Result<GaugeRef> {
    let adapter = GaugeAdapter::detect(chain, gauge)?;
    let staked = adapter.staking_token(chain)?;
    if staked != san_token {
        return Err(MixerError::InvalidSanToken {
            gauge,
            staked,
            expected: san_token,
        });
    }
    Ok(adapter.to_ref())
}

/// Set every standing allowance of a pair to `amount`: collateral to the
/// stable master and perpetual manager, san tokens to the stable master and
/// the gauge.
fn grant_pair_allowances(
    chain: &mut Chain,
    router: Address,
    pair: &PairRegistration,
    amount: Decimal,
) -> Result<()> {
    let ledger = &mut chain.ledger;
    set_allowance(ledger, router, pair.collateral, pair.stable_master, amount)?;
    set_allowance(ledger, router, pair.collateral, pair.perpetual_manager, amount)?;
    set_allowance(ledger, router, pair.san_token, pair.stable_master, amount)?;
    if let Some(gauge) = pair.gauge {
        set_allowance(ledger, router, pair.san_token, gauge.address, amount)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use stablemix_ledger::TokenSpec;
    use stablemix_ledger::testing::{MockLiquidityGauge, MockPoolManager, MockStableMaster};
    use stablemix_types::{CollateralInfo, RouterConfig};

    use super::*;

    fn addr(label: &str) -> Address {
        Address::derive(label.as_bytes())
    }

    struct Setup {
        chain: Chain,
        router: Router,
        ag_token: Address,
        stable_master: Address,
        pool_manager: Address,
        usdc: Address,
        san: Address,
    }

    fn setup() -> Setup {
        let mut chain = Chain::new();
        let ag_token = chain.ledger.create_token(TokenSpec::new("agEUR"));
        let usdc = chain.ledger.create_token(TokenSpec::new("USDC"));
        let san = chain.ledger.create_token(TokenSpec::new("sanUSDC"));
        let stable_master = chain.reserve_address("stable_master");
        let pool_manager = chain.deploy("pool", Box::new(MockPoolManager::new(usdc, stable_master)));
        let info = CollateralInfo {
            token: usdc,
            san_token: san,
            perpetual_manager: addr("perp"),
        };
        chain
            .deploy_at(
                stable_master,
                Box::new(MockStableMaster::new(ag_token).with_collateral(
                    pool_manager,
                    info,
                    Decimal::ONE,
                    Decimal::ONE,
                )),
            )
            .unwrap();
        let config = RouterConfig {
            wrapped_native: addr("WETH"),
            amm: addr("amm"),
            aggregator: addr("aggregator"),
            ve_locker: addr("ve"),
            max_actions_per_call: 16,
        };
        let router = Router::new(addr("router"), addr("gov"), addr("guardian"), config).unwrap();
        Setup {
            chain,
            router,
            ag_token,
            stable_master,
            pool_manager,
            usdc,
            san,
        }
    }

    #[test]
    fn stable_master_must_issue_the_stablecoin() {
        let mut s = setup();
        let err = s
            .router
            .add_stable_master(&mut s.chain, addr("gov"), s.usdc, s.stable_master)
            .unwrap_err();
        assert!(matches!(err, MixerError::InvalidParams { .. }));

        s.router
            .add_stable_master(&mut s.chain, addr("gov"), s.ag_token, s.stable_master)
            .unwrap();
        let err = s
            .router
            .add_stable_master(&mut s.chain, addr("guardian"), s.ag_token, s.stable_master)
            .unwrap_err();
        assert!(matches!(err, MixerError::AlreadyAdded));
    }

    #[test]
    fn outsiders_cannot_govern() {
        let mut s = setup();
        let err = s
            .router
            .add_stable_master(&mut s.chain, addr("mallory"), s.ag_token, s.stable_master)
            .unwrap_err();
        assert!(matches!(err, MixerError::NotGovernorOrGuardian(_)));
        let err = s
            .router
            .recover_erc20(&mut s.chain, addr("mallory"), s.usdc, addr("mallory"), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, MixerError::NotGovernorOrGuardian(_)));
    }

    #[test]
    fn add_pair_grants_standing_allowances() {
        let mut s = setup();
        let router = s.router.address();
        s.router
            .add_stable_master(&mut s.chain, addr("gov"), s.ag_token, s.stable_master)
            .unwrap();
        s.router
            .add_pairs(&mut s.chain, addr("gov"), &[s.ag_token], &[s.pool_manager], &[None])
            .unwrap();

        let pair = s.router.registry().pair(s.ag_token, s.usdc).unwrap();
        assert_eq!(pair.san_token, s.san);
        let ledger = &s.chain.ledger;
        assert_eq!(
            ledger.allowance(s.usdc, router, s.stable_master),
            constants::MAX_ALLOWANCE
        );
        assert_eq!(
            ledger.allowance(s.usdc, router, addr("perp")),
            constants::MAX_ALLOWANCE
        );
        assert_eq!(
            ledger.allowance(s.san, router, s.stable_master),
            constants::MAX_ALLOWANCE
        );
    }

    #[test]
    fn failed_batch_leaves_registry_untouched() {
        let mut s = setup();
        s.router
            .add_stable_master(&mut s.chain, addr("gov"), s.ag_token, s.stable_master)
            .unwrap();
        let approvals = s.chain.ledger.approvals_issued();

        // Second entry duplicates the first: the whole batch fails.
        let err = s
            .router
            .add_pairs(
                &mut s.chain,
                addr("gov"),
                &[s.ag_token, s.ag_token],
                &[s.pool_manager, s.pool_manager],
                &[None, None],
            )
            .unwrap_err();
        assert!(matches!(err, MixerError::AlreadyAdded));
        assert_eq!(s.router.registry().pair_count(), 0);
        assert_eq!(s.chain.ledger.approvals_issued(), approvals);
        assert!(s
            .chain
            .ledger
            .allowance(s.usdc, s.router.address(), s.stable_master)
            .is_zero());
    }

    #[test]
    fn pool_manager_of_another_stable_master_rejected() {
        let mut s = setup();
        s.router
            .add_stable_master(&mut s.chain, addr("gov"), s.ag_token, s.stable_master)
            .unwrap();
        let foreign = s.chain.deploy(
            "foreign_pool",
            Box::new(MockPoolManager::new(s.usdc, addr("other_stable_master"))),
        );
        let approvals = s.chain.ledger.approvals_issued();

        let err = s
            .router
            .add_pairs(&mut s.chain, addr("gov"), &[s.ag_token], &[foreign], &[None])
            .unwrap_err();
        assert!(matches!(err, MixerError::InvalidParams { .. }));
        assert_eq!(s.router.registry().pair_count(), 0);
        assert_eq!(s.chain.ledger.approvals_issued(), approvals);
    }

    #[test]
    fn gauge_must_stake_san_token() {
        let mut s = setup();
        s.router
            .add_stable_master(&mut s.chain, addr("gov"), s.ag_token, s.stable_master)
            .unwrap();
        let wrong = s
            .chain
            .deploy("gauge", Box::new(MockLiquidityGauge::new(s.usdc)));
        let err = s
            .router
            .add_pairs(&mut s.chain, addr("gov"), &[s.ag_token], &[s.pool_manager], &[Some(wrong)])
            .unwrap_err();
        assert!(matches!(err, MixerError::InvalidSanToken { .. }));
    }

    #[test]
    fn gauge_swap_moves_allowance() {
        let mut s = setup();
        let router = s.router.address();
        let first = s.chain.deploy("gauge", Box::new(MockLiquidityGauge::new(s.san)));
        let second = s.chain.deploy("gauge", Box::new(MockLiquidityGauge::new(s.san)));
        s.router
            .add_stable_master(&mut s.chain, addr("gov"), s.ag_token, s.stable_master)
            .unwrap();
        s.router
            .add_pairs(&mut s.chain, addr("gov"), &[s.ag_token], &[s.pool_manager], &[Some(first)])
            .unwrap();

        s.router
            .set_liquidity_gauges(&mut s.chain, addr("guardian"), &[Some(second)], &[s.ag_token], &[s.usdc])
            .unwrap();
        assert!(s.chain.ledger.allowance(s.san, router, first).is_zero());
        assert_eq!(
            s.chain.ledger.allowance(s.san, router, second),
            constants::MAX_ALLOWANCE
        );
        let pair = s.router.registry().pair(s.ag_token, s.usdc).unwrap();
        assert_eq!(pair.gauge.map(|g| g.address), Some(second));
    }

    #[test]
    fn remove_pair_revokes_and_allows_replacement() {
        let mut s = setup();
        let router = s.router.address();
        s.router
            .add_stable_master(&mut s.chain, addr("gov"), s.ag_token, s.stable_master)
            .unwrap();
        s.router
            .add_pairs(&mut s.chain, addr("gov"), &[s.ag_token], &[s.pool_manager], &[None])
            .unwrap();
        s.router
            .remove_pairs(&mut s.chain, addr("gov"), &[s.ag_token], &[s.usdc])
            .unwrap();
        assert!(s.chain.ledger.allowance(s.usdc, router, s.stable_master).is_zero());
        assert!(matches!(
            s.router.registry().pair(s.ag_token, s.usdc),
            Err(MixerError::ZeroAddress)
        ));
        s.router
            .add_pairs(&mut s.chain, addr("gov"), &[s.ag_token], &[s.pool_manager], &[None])
            .unwrap();
    }

    #[test]
    fn change_allowance_checks_lengths_and_skips_noops() {
        let mut s = setup();
        let err = s
            .router
            .change_allowance(&mut s.chain, addr("gov"), &[s.usdc], &[], &[Decimal::ONE])
            .unwrap_err();
        assert!(matches!(err, MixerError::IncompatibleLengths));

        let events = s
            .router
            .change_allowance(&mut s.chain, addr("gov"), &[s.usdc], &[addr("amm")], &[Decimal::ONE])
            .unwrap();
        assert_eq!(events.len(), 1);
        let events = s
            .router
            .change_allowance(&mut s.chain, addr("gov"), &[s.usdc], &[addr("amm")], &[Decimal::ONE])
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn recover_moves_router_balance() {
        let mut s = setup();
        let router = s.router.address();
        s.chain.ledger.mint(s.usdc, router, Decimal::new(12, 0)).unwrap();
        s.router
            .recover_erc20(&mut s.chain, addr("gov"), s.usdc, addr("treasury"), constants::FULL_BALANCE)
            .unwrap();
        assert_eq!(
            s.chain.ledger.balance_of(s.usdc, addr("treasury")),
            Decimal::new(12, 0)
        );
    }

    #[test]
    fn role_change_through_router() {
        let mut s = setup();
        s.router
            .set_governor_or_guardian(addr("gov"), RoleChange::AddGovernor(addr("gov2")))
            .unwrap();
        assert!(s.router.access().is_governor(addr("gov2")));
    }
}
