//! Shared fixture: one stablecoin with a USDC pair, a gauge, a perpetual
//! manager, both swap venues, a vault, a voting escrow and an interest
//! distributor, all registered with a router.

#![allow(dead_code)]

use rust_decimal::Decimal;
use stablemix_ledger::testing::{
    Account, MockAggregator, MockAmm, MockInterestDistributor, MockLiquidityGauge,
    MockPerpetualManager, MockPoolManager, MockStableMaster, MockVault, MockVotingEscrow,
};
use stablemix_ledger::{Chain, TokenSpec};
use stablemix_router::Router;
use stablemix_types::*;

pub fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

/// Install a subscriber when `RUST_LOG` is set.
pub fn init_tracing() {
    if let Ok(filter) = tracing_subscriber::EnvFilter::try_from_default_env() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

pub struct Fixture {
    pub chain: Chain,
    pub router: Router,
    pub governor: Address,
    pub guardian: Address,
    pub alice: Account,
    pub bob: Account,

    pub ag_eur: Address,
    pub usdc: Address,
    pub usdt: Address,
    pub san_usdc: Address,
    pub angle: Address,
    pub interest: Address,
    pub weth: Address,

    pub stable_master: Address,
    pub pool_manager: Address,
    pub perpetual_manager: Address,
    pub gauge: Address,
    pub amm: Address,
    pub aggregator: Address,
    pub vault: Address,
    pub ve: Address,
    pub distributor: Address,
}

pub const STARTING_BALANCE: i64 = 10_000;
pub const GAUGE_REWARD: i64 = 3;
pub const PERPETUAL_REWARD: i64 = 5;
pub const PENDING_INTEREST: i64 = 7;

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        let mut chain = Chain::new();
        let weth = chain.ledger.enable_wrapped_native("WETH");
        let ag_eur = chain.ledger.create_token(TokenSpec::new("agEUR"));
        let usdc = chain.ledger.create_token(TokenSpec::new("USDC").with_permit());
        let usdt = chain
            .ledger
            .create_token(TokenSpec::new("USDT").with_zero_reset());
        let san_usdc = chain.ledger.create_token(TokenSpec::new("sanUSDC_EUR"));
        let angle = chain.ledger.create_token(TokenSpec::new("ANGLE"));
        let interest = chain.ledger.create_token(TokenSpec::new("sanUSDC_EUR-interest"));

        let stable_master = chain.reserve_address("stable_master");
        let pool_manager = chain.deploy(
            "pool_manager",
            Box::new(MockPoolManager::new(usdc, stable_master)),
        );
        let perpetual_manager = chain.deploy(
            "perpetual_manager",
            Box::new(MockPerpetualManager::new(usdc).with_rewards(angle, dec(PERPETUAL_REWARD))),
        );
        let info = CollateralInfo {
            token: usdc,
            san_token: san_usdc,
            perpetual_manager,
        };
        chain
            .deploy_at(
                stable_master,
                Box::new(MockStableMaster::new(ag_eur).with_collateral(
                    pool_manager,
                    info,
                    Decimal::ONE,
                    Decimal::ONE,
                )),
            )
            .unwrap();
        let gauge = chain.deploy(
            "gauge",
            Box::new(MockLiquidityGauge::new(san_usdc).with_rewards(angle, dec(GAUGE_REWARD))),
        );

        // USDT quotes 1:1 into USDC on the AMM and 0.99 on the aggregator.
        let amm = chain.deploy(
            "amm",
            Box::new(MockAmm::new().with_rate(usdt, usdc, Decimal::ONE)),
        );
        let aggregator = chain.deploy(
            "aggregator",
            Box::new(MockAggregator::new().with_rate(usdt, usdc, Decimal::new(99, 2))),
        );
        chain.ledger.mint(usdc, amm, dec(1_000_000)).unwrap();
        chain.ledger.mint(usdc, aggregator, dec(1_000_000)).unwrap();

        let vault = MockVault::deploy(&mut chain, usdc, dec(2), "vUSDC").unwrap();
        let ve = chain.deploy("ve", Box::new(MockVotingEscrow::new(angle)));

        let alice = Account::from_secret([7u8; 32]);
        let bob = Account::from_secret([9u8; 32]);
        let distributor = chain.deploy(
            "distributor",
            Box::new(
                MockInterestDistributor::new(interest)
                    .with_pending(alice.address(), dec(PENDING_INTEREST)),
            ),
        );

        let governor = Address::derive(b"governor");
        let guardian = Address::derive(b"guardian");
        let config = RouterConfig {
            wrapped_native: weth,
            amm,
            aggregator,
            ve_locker: ve,
            max_actions_per_call: constants::DEFAULT_MAX_ACTIONS_PER_CALL,
        };
        let mut router =
            Router::new(chain.reserve_address("router"), governor, guardian, config).unwrap();
        router
            .add_stable_master(&mut chain, governor, ag_eur, stable_master)
            .unwrap();
        router
            .add_pairs(&mut chain, governor, &[ag_eur], &[pool_manager], &[Some(gauge)])
            .unwrap();

        for account in [&alice, &bob] {
            chain.ledger.mint(usdc, account.address(), dec(STARTING_BALANCE)).unwrap();
            chain.ledger.mint(usdt, account.address(), dec(STARTING_BALANCE)).unwrap();
        }

        Self {
            chain,
            router,
            governor,
            guardian,
            alice,
            bob,
            ag_eur,
            usdc,
            usdt,
            san_usdc,
            angle,
            interest,
            weth,
            stable_master,
            pool_manager,
            perpetual_manager,
            gauge,
            amm,
            aggregator,
            vault,
            ve,
            distributor,
        }
    }

    pub fn router_address(&self) -> Address {
        self.router.address()
    }

    /// Give the router an infinite allowance on `owner`'s `token`.
    pub fn approve_router(&mut self, owner: Address, token: Address) {
        let router = self.router_address();
        self.chain
            .ledger
            .approve(token, owner, router, constants::MAX_ALLOWANCE)
            .unwrap();
    }

    pub fn balance(&self, token: Address, holder: Address) -> Decimal {
        self.chain.ledger.balance_of(token, holder)
    }

    pub fn mixer(&mut self, caller: Address, call: MixerCall) -> Result<MixerReceipt> {
        self.router.mixer(&mut self.chain, caller, call)
    }

    pub fn staked_in_gauge(&self, user: Address) -> Decimal {
        self.chain
            .liquidity_gauge(self.gauge)
            .unwrap()
            .staked_balance(user)
    }

    /// The router holds nothing once an invocation has settled.
    pub fn assert_router_empty(&self) {
        let router = self.router_address();
        for token in [
            self.ag_eur,
            self.usdc,
            self.usdt,
            self.san_usdc,
            self.angle,
            self.interest,
            self.weth,
            self.vault,
        ] {
            assert!(
                self.balance(token, router).is_zero(),
                "router still holds {} of {token}",
                self.balance(token, router)
            );
        }
        assert!(self.chain.ledger.native_balance(router).is_zero());
    }

    pub fn assert_supplies(&self) {
        for token in [self.ag_eur, self.usdc, self.usdt, self.san_usdc, self.weth, self.vault] {
            self.chain.ledger.verify_supply(token).unwrap();
        }
    }

    pub fn sweep(&self, token: Address, to: Address) -> Action {
        Action::Sweep(SweepPayload {
            token,
            min_amount_out: Decimal::ZERO,
            to,
        })
    }

    pub fn deposit(&self, user: Address, amount: Decimal, stake_in_gauge: bool) -> Action {
        Action::Deposit(DepositPayload {
            user,
            amount,
            stablecoin: self.ag_eur,
            collateral: self.usdc,
            stake_in_gauge,
        })
    }

    pub fn mint(&self, user: Address, amount: Decimal, min_stable_amount: Decimal) -> Action {
        Action::Mint(MintPayload {
            user,
            amount,
            min_stable_amount,
            stablecoin: self.ag_eur,
            collateral: self.usdc,
            max_mint_rate: None,
        })
    }

    pub fn amm_swap(&self, amount_in: Decimal, min_amount_out: Decimal) -> SwapDeclaration {
        SwapDeclaration {
            in_token: self.usdt,
            out_token: self.usdc,
            amount_in,
            min_amount_out,
            venue: SwapVenue::Amm,
            args: MockAmm::path(self.usdt, self.usdc),
        }
    }

    pub fn aggregator_swap(&self, amount_in: Decimal, min_amount_out: Decimal) -> SwapDeclaration {
        SwapDeclaration {
            in_token: self.usdt,
            out_token: self.usdc,
            amount_in,
            min_amount_out,
            venue: SwapVenue::Aggregator,
            args: stablemix_ledger::testing::AggregatorOrder {
                in_token: self.usdt,
                out_token: self.usdc,
                amount_in,
            }
            .encode(),
        }
    }
}
