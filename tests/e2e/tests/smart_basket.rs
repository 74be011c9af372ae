//! Basket lifecycle against a fully seeded exchange
//! Run with: cargo test -p smartbasket-e2e-tests

use smartbasket_basket::{AllocationIssue, BasketError, BasketEvent, BasketId};
use smartbasket_common::{Amount, SwapVenue};
use smartbasket_e2e_tests::{assert_close, ether, Deployment};

fn deployment() -> Deployment {
    Deployment::new().unwrap()
}

#[test]
fn test_deploys_correctly() {
    let d = deployment();
    assert_eq!(d.engine.stable, d.usdt);
    assert_ne!(d.engine.account, d.exchange.router);
    assert_eq!(d.usdt_balance(d.user1), ether("1000"));
    assert!(d.engine.user_baskets(d.user1).is_empty());
}

#[test]
fn test_create_basket() {
    let mut d = deployment();
    let id = d.create(d.user1, &[(d.eth, 50), (d.wbtc, 50)], "100").unwrap();

    assert_eq!(id, BasketId(0));
    assert_eq!(
        d.engine.events().last(),
        Some(&BasketEvent::BasketCreated {
            owner: d.user1,
            id,
            total: ether("100"),
            invested: ether("100"),
            at: d.exchange.now(),
        })
    );

    let baskets = d.engine.user_baskets(d.user1);
    assert_eq!(baskets.len(), 1);
    assert_eq!(baskets[0].token_count(), 2);
    assert_eq!(baskets[0].invested, ether("100"));
    assert_eq!(d.usdt_balance(d.user1), ether("900"));
}

#[test]
fn test_created_event_keeps_uneven_total() {
    let mut d = deployment();
    let id = d
        .create(d.user1, &[(d.eth, 33), (d.wbtc, 33), (d.xrp, 34)], "100.000000000000000007")
        .unwrap();

    match d.engine.events().last() {
        Some(BasketEvent::BasketCreated {
            id: created,
            total,
            invested,
            ..
        }) => {
            assert_eq!(*created, id);
            assert_eq!(*total, ether("100.000000000000000007"));
            assert_eq!(*invested, ether("100.000000000000000006"));
            assert_ne!(total, invested);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(d.usdt_balance(d.user1), ether("899.999999999999999994"));
}

#[test]
fn test_spends_follow_percentages_end_to_end() {
    let mut d = deployment();
    let (usdt, engine) = (d.usdt, d.engine.account);
    d.exchange.mint(usdt, d.user1, ether("9000")).unwrap();
    SwapVenue::approve(&mut d.exchange, usdt, d.user1, engine, ether("10000")).unwrap();

    let id = d
        .create(d.user1, &[(d.eth, 60), (d.wbtc, 20), (d.xrp, 20)], "10000")
        .unwrap();

    let basket = d.engine.basket(d.user1, id).unwrap();
    let costs: Vec<_> = basket.holdings.iter().map(|h| (h.asset, h.cost)).collect();
    assert_eq!(
        costs,
        vec![
            (d.eth, ether("6000")),
            (d.wbtc, ether("2000")),
            (d.xrp, ether("2000")),
        ]
    );
    assert_eq!(basket.invested, ether("10000"));
    assert_eq!(d.usdt_balance(d.user1), Amount::ZERO);
}

#[test]
fn test_rejects_allocation_not_summing_to_100() {
    let mut d = deployment();
    let err = d.create(d.user1, &[(d.eth, 50), (d.wbtc, 40)], "100").unwrap_err();

    assert_eq!(err, BasketError::InvalidAllocation(AllocationIssue::SumNot100(90)));
    assert_eq!(err.to_string(), "invalid allocation: total percentage must be 100, got 90");
    assert_eq!(d.usdt_balance(d.user1), ether("1000"));
    assert!(d.engine.events().is_empty());
}

#[test]
fn test_sell_basket() {
    let mut d = deployment();
    let id = d.create(d.user1, &[(d.eth, 50), (d.wbtc, 50)], "100").unwrap();
    let before = d.usdt_balance(d.user1);

    let proceeds = d.sell(d.user1, id).unwrap();

    assert_eq!(d.usdt_balance(d.user1) - before, proceeds);
    assert_close(proceeds, "100", "1");
    assert!(d.engine.user_baskets(d.user1).is_empty());
    assert!(d.engine.custody_shortfalls(&d.exchange).is_empty());
}

#[test]
fn test_sell_unknown_basket() {
    let mut d = deployment();
    let err = d.sell(d.user1, BasketId(0)).unwrap_err();
    assert_eq!(
        err,
        BasketError::UnknownBasket {
            owner: d.user1,
            id: BasketId(0),
        }
    );
}

#[test]
fn test_cannot_sell_another_users_basket() {
    let mut d = deployment();
    let id = d.create(d.user1, &[(d.eth, 100)], "100").unwrap();

    assert!(matches!(d.sell(d.user2, id), Err(BasketError::UnknownBasket { .. })));
    assert_eq!(d.engine.user_baskets(d.user1).len(), 1);
    assert_eq!(d.usdt_balance(d.user2), ether("1000"));
}

#[test]
fn test_multiple_baskets_for_a_user() {
    let mut d = deployment();
    d.create(d.user1, &[(d.eth, 100)], "50").unwrap();
    d.create(d.user1, &[(d.wbtc, 50), (d.xrp, 50)], "50").unwrap();

    let baskets = d.engine.user_baskets(d.user1);
    assert_eq!(baskets.len(), 2);
    assert_eq!(baskets[0].token_count(), 1);
    assert_eq!(baskets[1].token_count(), 2);
}

#[test]
fn test_basket_total_value() {
    let mut d = deployment();
    let id = d.create(d.user1, &[(d.eth, 50), (d.wbtc, 50)], "100").unwrap();

    let value = d.engine.basket_total_value(&d.exchange, d.user1, id).unwrap();
    assert_close(value, "100", "5");
}

#[test]
fn test_basket_asset_details() {
    let mut d = deployment();
    let id = d.create(d.user1, &[(d.eth, 60), (d.wbtc, 40)], "100").unwrap();

    let details = d.engine.basket_asset_details(&d.exchange, d.user1, id).unwrap();
    assert_eq!(details.len(), 2);
    assert_eq!(details[0].asset, d.eth);
    assert_eq!(details[1].asset, d.wbtc);
    assert!(details.iter().all(|a| a.quantity > Amount::ZERO));
    assert_close(details[0].value, "60", "3");
    assert_close(details[1].value, "40", "2");
}

#[test]
fn test_unknown_basket_value_and_details() {
    let d = deployment();
    assert!(matches!(
        d.engine.basket_total_value(&d.exchange, d.user1, BasketId(0)),
        Err(BasketError::UnknownBasket { .. })
    ));
    assert!(matches!(
        d.engine.basket_asset_details(&d.exchange, d.user1, BasketId(0)),
        Err(BasketError::UnknownBasket { .. })
    ));
}

#[test]
fn test_values_across_multiple_baskets() {
    let mut d = deployment();
    let first = d.create(d.user1, &[(d.eth, 100)], "50").unwrap();
    let second = d.create(d.user1, &[(d.wbtc, 50), (d.xrp, 50)], "50").unwrap();

    assert_close(d.engine.basket_total_value(&d.exchange, d.user1, first).unwrap(), "50", "2.5");
    assert_close(d.engine.basket_total_value(&d.exchange, d.user1, second).unwrap(), "50", "2.5");

    let first = d.engine.basket_asset_details(&d.exchange, d.user1, first).unwrap();
    let second = d.engine.basket_asset_details(&d.exchange, d.user1, second).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
    assert_close(first[0].value, "50", "2.5");
    assert_close(second[0].value + second[1].value, "50", "2.5");
    assert_close(d.engine.portfolio_value(&d.exchange, d.user1).unwrap(), "100", "5");
}

#[test]
fn test_ids_stay_stable_after_selling() {
    let mut d = deployment();
    let first = d.create(d.user1, &[(d.eth, 100)], "50").unwrap();
    let second = d.create(d.user1, &[(d.wbtc, 100)], "50").unwrap();

    d.sell(d.user1, first).unwrap();
    let remaining = d.engine.user_baskets(d.user1);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second);

    let third = d.create(d.user1, &[(d.xrp, 100)], "50").unwrap();
    assert_ne!(third, first);
    assert!(d.sell(d.user1, first).is_err());
    d.sell(d.user1, second).unwrap();
}

#[test]
fn test_price_moves_between_create_and_sell() {
    let mut d = deployment();
    let id = d.create(d.user1, &[(d.eth, 50), (d.wbtc, 50)], "200").unwrap();
    let before = d.engine.basket_total_value(&d.exchange, d.user1, id).unwrap();

    d.push_price("whale", d.eth, 250_000).unwrap();
    d.exchange.advance(30);

    let after = d.engine.basket_total_value(&d.exchange, d.user1, id).unwrap();
    assert!(after > before);

    let proceeds = d.sell(d.user1, id).unwrap();
    assert!(proceeds > ether("200"));
    assert!(d.engine.custody_shortfalls(&d.exchange).is_empty());
}

#[test]
fn test_two_users_share_custody() {
    let mut d = deployment();
    let a = d.create(d.user1, &[(d.eth, 100)], "300").unwrap();
    let b = d.create(d.user2, &[(d.eth, 100)], "300").unwrap();

    let eth_held = d.exchange.tokens().balance_of(d.eth, d.engine.account);
    let owed: Amount = d
        .engine
        .ledger()
        .iter()
        .flat_map(|basket| basket.holdings.iter())
        .map(|h| h.quantity)
        .fold(Amount::ZERO, |acc, q| acc + q);
    assert_eq!(eth_held, owed);

    d.sell(d.user1, a).unwrap();
    assert!(d.engine.custody_shortfalls(&d.exchange).is_empty());
    d.sell(d.user2, b).unwrap();
    assert_eq!(d.exchange.tokens().balance_of(d.eth, d.engine.account), Amount::ZERO);
}

#[test]
fn test_expired_guard_is_rejected() {
    let mut d = deployment();
    let mut guard = d.engine.config.guard(d.exchange.now());
    guard.deadline = d.exchange.now() - 1;
    let allocations = [smartbasket_basket::Allocation::new(d.eth, 100)];

    let err = d
        .engine
        .create_basket(&mut d.exchange, d.user1, &allocations, ether("10"), guard)
        .unwrap_err();
    assert!(matches!(err, BasketError::SwapExpired { .. }));
    assert_eq!(d.usdt_balance(d.user1), ether("1000"));
}

#[test]
fn test_insufficient_allowance_rolls_back() {
    let mut d = deployment();
    let err = d.create(d.user1, &[(d.eth, 50), (d.wbtc, 50)], "1500").unwrap_err();

    assert!(matches!(
        err,
        BasketError::InsufficientAllowance { .. } | BasketError::InsufficientBalance { .. }
    ));
    assert_eq!(d.usdt_balance(d.user1), ether("1000"));
    assert!(d.engine.user_baskets(d.user1).is_empty());
}

#[test]
fn test_event_log_serializes() {
    let mut d = deployment();
    let id = d.create(d.user1, &[(d.eth, 100)], "10").unwrap();
    d.sell(d.user1, id).unwrap();

    let json = serde_json::to_value(d.engine.events()).unwrap();
    assert_eq!(json[0]["event"], "BasketCreated");
    assert_eq!(json[1]["event"], "BasketSold");
    assert_eq!(d.engine.events_for(d.user1).count(), 2);
    assert_eq!(d.engine.events_for(d.user2).count(), 0);
}
