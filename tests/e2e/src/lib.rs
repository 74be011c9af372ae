//! End-to-end harness
//!
//! Deploys the same market the demo deployment uses (USDT against ETH, WBTC
//! and XRP at fixed seed prices), funds two users with 1000 USDT each and
//! approves the engine for it.

use anyhow::Result;
use smartbasket_basket::{Allocation, BasketEngine, BasketError, BasketId, EngineConfig};
use smartbasket_common::{derive_address, Address, Amount, SwapVenue, Timestamp};
use smartbasket_router::liquidity::AddLiquidity;
use smartbasket_router::Exchange;
use smartbasket_token::whole_tokens;

pub const GENESIS: Timestamp = 1_700_000_000;

/// 1000 USDT per user
pub const USER_FUNDS: u64 = 1_000;

/// (symbol, usdt reserve, token reserve): 2500, 60000 and 0.5 USDT per token
const MARKETS: &[(&str, u64, u64)] = &[
    ("ETH", 2_500_000, 1_000),
    ("WBTC", 3_000_000, 50),
    ("XRP", 50_000, 100_000),
];

pub struct Deployment {
    pub exchange: Exchange,
    pub engine: BasketEngine,
    pub usdt: Address,
    pub eth: Address,
    pub wbtc: Address,
    pub xrp: Address,
    pub deployer: Address,
    pub user1: Address,
    pub user2: Address,
}

/// `value` as base units, accepting decimals (`"2.5"`)
pub fn ether(value: &str) -> Amount {
    smartbasket_common::parse_amount(value, smartbasket_common::DEFAULT_DECIMALS)
        .unwrap_or_else(|err| panic!("bad test amount {}: {}", value, err))
}

pub fn assert_close(actual: Amount, expected: &str, delta: &str) {
    let (expected, delta) = (ether(expected), ether(delta));
    let diff = if actual > expected { actual - expected } else { expected - actual };
    assert!(
        diff <= delta,
        "{} not within {} of {}",
        smartbasket_common::format_amount(actual, smartbasket_common::DEFAULT_DECIMALS),
        smartbasket_common::format_amount(delta, smartbasket_common::DEFAULT_DECIMALS),
        smartbasket_common::format_amount(expected, smartbasket_common::DEFAULT_DECIMALS),
    );
}

impl Deployment {
    pub fn new() -> Result<Self> {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut exchange = Exchange::new(GENESIS);
        let deployer = derive_address("deployer");
        let router = exchange.router;

        let usdt = exchange.register_token("USDT", "Tether USD", whole_tokens(USER_FUNDS))?;
        exchange.mint(usdt, deployer, whole_tokens(1_000_000_000))?;
        SwapVenue::approve(&mut exchange, usdt, deployer, router, Amount::MAX)?;

        let mut listed = Vec::new();
        for &(symbol, usdt_reserve, token_reserve) in MARKETS {
            let token = exchange.register_token(symbol, symbol, Amount::ZERO)?;
            seed(
                &mut exchange,
                deployer,
                usdt,
                token,
                whole_tokens(usdt_reserve),
                whole_tokens(token_reserve),
            )?;
            listed.push(token);
        }

        let engine = BasketEngine::new(usdt, EngineConfig::default());
        let user1 = derive_address("user1");
        let user2 = derive_address("user2");
        for user in [user1, user2] {
            exchange.mint(usdt, user, whole_tokens(USER_FUNDS))?;
            SwapVenue::approve(&mut exchange, usdt, user, engine.account, whole_tokens(USER_FUNDS))?;
        }
        log::debug!("e2e deployment ready: engine {}", engine.account);

        Ok(Self {
            exchange,
            engine,
            usdt,
            eth: listed[0],
            wbtc: listed[1],
            xrp: listed[2],
            deployer,
            user1,
            user2,
        })
    }

    pub fn create(
        &mut self,
        owner: Address,
        allocations: &[(Address, u8)],
        amount: &str,
    ) -> Result<BasketId, BasketError> {
        let allocations: Vec<_> = allocations
            .iter()
            .map(|(asset, pct)| Allocation::new(*asset, *pct))
            .collect();
        let guard = self.engine.config.guard(self.exchange.now());
        self.engine
            .create_basket(&mut self.exchange, owner, &allocations, ether(amount), guard)
    }

    pub fn sell(&mut self, owner: Address, id: BasketId) -> Result<Amount, BasketError> {
        let guard = self.engine.config.guard(self.exchange.now());
        self.engine.sell_basket(&mut self.exchange, owner, id, guard)
    }

    pub fn usdt_balance(&self, account: Address) -> Amount {
        self.exchange.tokens().balance_of(self.usdt, account)
    }

    /// Market buy of `token` with `usdt` stable units by a fresh trader
    pub fn push_price(&mut self, trader: &str, token: Address, usdt: u64) -> Result<Amount> {
        let trader = derive_address(trader);
        let amount = whole_tokens(usdt);
        let router = self.exchange.router;
        self.exchange.mint(self.usdt, trader, amount)?;
        SwapVenue::approve(&mut self.exchange, self.usdt, trader, router, amount)?;
        let deadline = self.exchange.now() + 60;
        let amounts = self.exchange.swap_exact_tokens_for_tokens(
            trader,
            amount,
            Amount::from(1u64),
            &[self.usdt, token],
            trader,
            deadline,
        )?;
        Ok(amounts[1])
    }
}

fn seed(
    exchange: &mut Exchange,
    deployer: Address,
    usdt: Address,
    token: Address,
    usdt_amount: Amount,
    token_amount: Amount,
) -> Result<()> {
    let router = exchange.router;
    exchange.mint(token, deployer, token_amount)?;
    SwapVenue::approve(&mut *exchange, token, deployer, router, Amount::MAX)?;
    let params = AddLiquidity {
        token_a: usdt,
        token_b: token,
        amount_a_desired: usdt_amount,
        amount_b_desired: token_amount,
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
    };
    exchange.add_liquidity(deployer, params, deployer, GENESIS)?;
    Ok(())
}
