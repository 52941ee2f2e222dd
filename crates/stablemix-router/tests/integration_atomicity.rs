//! Integration test: all-or-nothing invocations and governance.
//!
//! A failing action anywhere in a call must leave balances, allowances,
//! permit nonces and collaborator state exactly as they were.

mod common;

use common::{Fixture, STARTING_BALANCE, dec};
use rust_decimal::Decimal;
use stablemix_ledger::testing::{MockAggregator, MockLiquidityGauge, MockStakingRewards};
use stablemix_router::{RoleChange, Router};
use stablemix_types::*;

const FULL: Decimal = constants::FULL_BALANCE;

#[test]
fn late_failure_restores_every_balance() {
    let mut fx = Fixture::new();
    let alice = fx.alice.address();
    let router = fx.router_address();
    fx.approve_router(alice, fx.usdc);
    let approvals = fx.chain.ledger.approvals_issued();

    // The deposit succeeds, then the sweep finds nothing left and fails.
    let call = MixerCall::new()
        .transfer(fx.usdc, router, dec(1000))
        .action(&fx.deposit(alice, FULL, true))
        .unwrap()
        .action(&Action::Sweep(SweepPayload {
            token: fx.usdc,
            min_amount_out: dec(1),
            to: alice,
        }))
        .unwrap();
    let err = fx.mixer(alice, call).unwrap_err();

    assert!(matches!(
        err,
        MixerError::TooSmallAmountOut { minimum, .. } if minimum == dec(1)
    ));
    assert_eq!(fx.balance(fx.usdc, alice), dec(STARTING_BALANCE));
    assert!(fx.balance(fx.usdc, fx.pool_manager).is_zero());
    assert!(fx.staked_in_gauge(alice).is_zero());
    assert_eq!(fx.chain.ledger.approvals_issued(), approvals);
    fx.assert_router_empty();
    fx.assert_supplies();
}

#[test]
fn failed_call_rolls_back_collaborator_state() {
    let mut fx = Fixture::new();
    let alice = fx.alice.address();
    let router = fx.router_address();
    fx.approve_router(alice, fx.usdc);

    let open = Action::OpenPerpetual(OpenPerpetualPayload {
        owner: alice,
        margin: dec(100),
        committed_amount: dec(10),
        max_oracle_rate: dec(2),
        min_net_margin: Decimal::ZERO,
        stablecoin: fx.ag_eur,
        collateral: fx.usdc,
    });
    let failing = MixerCall::new()
        .transfer(fx.usdc, router, dec(100))
        .action(&open)
        .unwrap()
        .raw_action(ActionType::Burn.tag(), b"{}".to_vec());
    assert!(fx.mixer(alice, failing).is_err());

    // The id handed out by the reverted call is handed out again.
    let call = MixerCall::new()
        .transfer(fx.usdc, router, dec(100))
        .action(&open)
        .unwrap();
    let receipt = fx.mixer(alice, call).unwrap();
    assert_eq!(receipt.opened_perpetuals(), vec![PerpetualId(1)]);
    assert_eq!(fx.balance(fx.usdc, alice), dec(STARTING_BALANCE - 100));
}

#[test]
fn aggregator_revert_message_surfaces() {
    let mut fx = Fixture::new();
    let alice = fx.alice.address();

    let reverting = fx.chain.deploy(
        "reverting_aggregator",
        Box::new(MockAggregator::new().reverting_with("Return amount is not enough")),
    );
    let garbage = fx.chain.deploy(
        "garbage_aggregator",
        Box::new(MockAggregator::new().reverting_with_garbage()),
    );

    for (aggregator, label) in [(reverting, "router_reverting"), (garbage, "router_garbage")] {
        let config = RouterConfig {
            aggregator,
            ..fx.router.config().clone()
        };
        let address = fx.chain.reserve_address(label);
        let router = Router::new(address, fx.governor, fx.guardian, config).unwrap();
        fx.chain
            .ledger
            .approve(fx.usdt, alice, address, constants::MAX_ALLOWANCE)
            .unwrap();

        let call = MixerCall::new().swap(fx.aggregator_swap(dec(100), Decimal::ZERO));
        let err = router.mixer(&mut fx.chain, alice, call).unwrap_err();
        if aggregator == reverting {
            match err {
                MixerError::ExternalCallFailed { reason } => {
                    assert_eq!(reason, "Return amount is not enough");
                }
                other => panic!("expected ExternalCallFailed, got {other:?}"),
            }
        } else {
            assert!(matches!(err, MixerError::InvalidReturnMessage));
        }
        assert_eq!(fx.balance(fx.usdt, alice), dec(STARTING_BALANCE));
    }
}

#[test]
fn removed_pair_stops_routing() {
    let mut fx = Fixture::new();
    let alice = fx.alice.address();
    let router = fx.router_address();
    let (governor, ag_eur, usdc) = (fx.governor, fx.ag_eur, fx.usdc);
    fx.approve_router(alice, usdc);

    fx.router
        .remove_pairs(&mut fx.chain, governor, &[ag_eur], &[usdc])
        .unwrap();
    assert!(
        fx.chain
            .ledger
            .allowance(usdc, router, fx.stable_master)
            .is_zero()
    );

    let call = MixerCall::new()
        .transfer(usdc, router, dec(10))
        .action(&fx.deposit(alice, FULL, false))
        .unwrap();
    let err = fx.mixer(alice, call).unwrap_err();
    assert!(matches!(err, MixerError::ZeroAddress));

    // Re-registering restores the route.
    let pool_manager = fx.pool_manager;
    fx.router
        .add_pairs(&mut fx.chain, governor, &[ag_eur], &[pool_manager], &[None])
        .unwrap();
    let call = MixerCall::new()
        .transfer(usdc, router, dec(10))
        .action(&fx.deposit(alice, FULL, true))
        .unwrap();
    fx.mixer(alice, call).unwrap();
    // No gauge registered any more, so the deposit lands unstaked.
    assert_eq!(fx.balance(fx.san_usdc, alice), dec(10));
    fx.assert_router_empty();
}

#[test]
fn staking_rewards_gauge_swapped_in() {
    let mut fx = Fixture::new();
    let alice = fx.alice.address();
    let router = fx.router_address();
    let (ag_eur, usdc, san, angle) = (fx.ag_eur, fx.usdc, fx.san_usdc, fx.angle);
    fx.approve_router(alice, usdc);

    let staking = fx.chain.deploy(
        "staking_rewards",
        Box::new(MockStakingRewards::new(san).with_rewards(angle, dec(4))),
    );
    let events = fx
        .router
        .set_liquidity_gauges(&mut fx.chain, fx.guardian, &[Some(staking)], &[ag_eur], &[usdc])
        .unwrap();
    assert!(matches!(
        events[0],
        RouterEvent::GaugeUpdated { gauge: Some(g), .. } if g == staking
    ));
    let old_gauge = fx.gauge;
    assert!(fx.chain.ledger.allowance(san, router, old_gauge).is_zero());

    let call = MixerCall::new()
        .transfer(usdc, router, dec(250))
        .action(&fx.deposit(alice, FULL, true))
        .unwrap()
        .action(&Action::ClaimRewards(ClaimRewardsPayload {
            user: alice,
            gauges: vec![staking],
            perpetual_ids: vec![],
            perpetuals: PerpetualSource::default(),
        }))
        .unwrap();
    let receipt = fx.mixer(alice, call).unwrap();

    let staked = fx
        .chain
        .staking_rewards(staking)
        .unwrap()
        .staked_balance(alice);
    assert_eq!(staked, dec(250));
    assert_eq!(fx.balance(angle, alice), dec(4));
    assert!(receipt.events.iter().any(|event| matches!(
        event,
        RouterEvent::RewardsClaimed { amount: Some(amount), .. } if *amount == dec(4)
    )));
    fx.assert_router_empty();
}

#[test]
fn mismatched_gauge_rejected_without_side_effects() {
    let mut fx = Fixture::new();
    let (guardian, ag_eur, usdc) = (fx.guardian, fx.ag_eur, fx.usdc);
    let wrong = fx
        .chain
        .deploy("wrong_gauge", Box::new(MockLiquidityGauge::new(usdc)));

    let err = fx
        .router
        .set_liquidity_gauges(&mut fx.chain, guardian, &[Some(wrong)], &[ag_eur], &[usdc])
        .unwrap_err();
    assert!(matches!(err, MixerError::InvalidSanToken { .. }));
    let pair = fx.router.registry().pair(ag_eur, usdc).unwrap();
    assert_eq!(pair.gauge.map(|gauge| gauge.address), Some(fx.gauge));
}

#[test]
fn recover_stray_tokens() {
    let mut fx = Fixture::new();
    let router = fx.router_address();
    let (governor, guardian, usdt) = (fx.governor, fx.guardian, fx.usdt);
    let treasury = Address::derive(b"treasury");
    let mallory = Address::derive(b"mallory");
    fx.chain.ledger.mint(usdt, router, dec(50)).unwrap();

    let err = fx
        .router
        .recover_erc20(&mut fx.chain, mallory, usdt, mallory, FULL)
        .unwrap_err();
    assert!(matches!(err, MixerError::NotGovernorOrGuardian(_)));

    let events = fx
        .router
        .recover_erc20(&mut fx.chain, guardian, usdt, treasury, dec(42))
        .unwrap();
    assert!(matches!(events[0], RouterEvent::Recovered { amount, .. } if amount == dec(42)));
    assert_eq!(fx.balance(usdt, treasury), dec(42));

    let events = fx
        .router
        .recover_erc20(&mut fx.chain, governor, usdt, treasury, FULL)
        .unwrap();
    assert!(matches!(events[0], RouterEvent::Recovered { amount, .. } if amount == dec(8)));
    assert_eq!(fx.balance(usdt, treasury), dec(50));
    fx.assert_router_empty();
}

#[test]
fn governor_rotation() {
    let mut fx = Fixture::new();
    let (governor, guardian) = (fx.governor, fx.guardian);
    let successor = Address::derive(b"successor");
    let mallory = Address::derive(b"mallory");

    fx.router
        .set_governor_or_guardian(governor, RoleChange::AddGovernor(successor))
        .unwrap();
    fx.router
        .set_governor_or_guardian(successor, RoleChange::RemoveGovernor(governor))
        .unwrap();
    assert!(!fx.router.access().is_governor(governor));
    assert!(fx.router.access().is_governor(successor));

    // The guardian rotates governors too, within the role invariants.
    fx.router
        .set_governor_or_guardian(guardian, RoleChange::AddGovernor(governor))
        .unwrap();
    fx.router
        .set_governor_or_guardian(guardian, RoleChange::RemoveGovernor(successor))
        .unwrap();
    assert_eq!(fx.router.access().governors().collect::<Vec<_>>(), vec![governor]);

    let err = fx
        .router
        .set_governor_or_guardian(guardian, RoleChange::RemoveGovernor(governor))
        .unwrap_err();
    assert!(matches!(err, MixerError::InvalidConditions { .. }));
    let err = fx
        .router
        .set_governor_or_guardian(guardian, RoleChange::AddGovernor(guardian))
        .unwrap_err();
    assert!(matches!(err, MixerError::InvalidConditions { .. }));
    let err = fx
        .router
        .set_governor_or_guardian(mallory, RoleChange::AddGovernor(mallory))
        .unwrap_err();
    assert!(matches!(err, MixerError::NotGovernorOrGuardian(_)));
}
