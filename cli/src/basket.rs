//! Basket commands

use anyhow::{Context, Result};
use colored::Colorize;
use smartbasket_basket::{Allocation, BasketError, BasketEvent, BasketId, SwapGuard};
use smartbasket_common::{Address, Amount, SwapVenue};

use crate::client::{self, fmt_amount, format_address, print_field, AppState};
use crate::config::{resolve_account, CliConfig};

/// Parse `ETH:60,WBTC:40` against the listed tokens
pub fn parse_allocations(state: &AppState, input: &str) -> Result<Vec<Allocation>> {
    input.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (symbol, percentage) = part
                .split_once(':')
                .with_context(|| format!("Expected SYMBOL:PERCENT, got '{}'", part.trim()))?;
            let asset = client::resolve_token(&state.exchange, symbol.trim())?;
            let percentage: u8 = percentage
                .trim()
                .parse()
                .with_context(|| format!("Invalid percentage in '{}'", part.trim()))?;
            Ok(Allocation::new(asset, percentage))
        })
        .collect()
}

fn guard_for(state: &AppState, slippage_bps: Option<u64>) -> SwapGuard {
    let mut guard = state.engine.config.guard(state.exchange.now());
    if let Some(bps) = slippage_bps {
        guard.max_slippage_bps = bps;
    }
    guard
}

fn owner_or_self(config: &CliConfig, owner: Option<String>) -> Result<Address> {
    match owner {
        Some(owner) => resolve_account(&owner),
        None => Ok(config.account),
    }
}

fn report(err: BasketError) -> anyhow::Error {
    let retry = if err.is_retryable() { " (retryable)" } else { "" };
    anyhow::anyhow!("{}{}\nHint: {}", err, retry, err.hint())
}

pub async fn create_basket(
    config: &CliConfig,
    allocations: String,
    amount: String,
    slippage_bps: Option<u64>,
    approve: bool,
) -> Result<()> {
    let mut state = client::load_state(config)?;
    let allocations = parse_allocations(&state, &allocations)?;
    let total = client::parse_token_amount(&amount)?;
    let guard = guard_for(&state, slippage_bps);

    if approve {
        let (stable, spender) = (state.engine.stable, state.engine.account);
        SwapVenue::approve(&mut state.exchange, stable, config.account, spender, total)?;
    }

    let AppState {
        exchange, engine, ..
    } = &mut state;
    let id = engine
        .create_basket(exchange, config.account, &allocations, total, guard)
        .map_err(report)?;
    client::save_state(config, &state)?;

    println!("{}", "=== Basket Created ===".bright_green().bold());
    print_basket(&state, config.account, id)?;
    Ok(())
}

pub async fn sell_basket(config: &CliConfig, id: u64, slippage_bps: Option<u64>) -> Result<()> {
    let mut state = client::load_state(config)?;
    let guard = guard_for(&state, slippage_bps);

    let AppState {
        exchange, engine, ..
    } = &mut state;
    let proceeds = engine
        .sell_basket(exchange, config.account, BasketId(id), guard)
        .map_err(report)?;
    client::save_state(config, &state)?;

    println!("{}", "=== Basket Sold ===".bright_green().bold());
    print_field("Basket", BasketId(id));
    print_field("Proceeds", fmt_amount(proceeds).bright_green());
    Ok(())
}

fn print_basket(state: &AppState, owner: Address, id: BasketId) -> Result<()> {
    let valuation = state
        .engine
        .valuation(&state.exchange, owner, id)
        .map_err(report)?;
    let basket = state.engine.basket(owner, id).map_err(report)?;

    print_field("Basket", id.to_string().bright_yellow());
    print_field("Invested", fmt_amount(valuation.invested));
    print_field("Value", fmt_amount(valuation.total_value));
    let roi = valuation
        .roi_bps
        .map(|bps| format!("{:+.2}%", bps as f64 / 100.0))
        .unwrap_or_else(|| "n/a".to_string());
    let pnl = if valuation.pnl.is_negative() {
        format!("{} ({})", valuation.pnl, roi).bright_red()
    } else {
        format!("+{} ({})", valuation.pnl, roi).bright_green()
    };
    print_field("PnL (base units)", pnl);

    for (i, asset) in valuation.assets.iter().enumerate() {
        let branch = if i + 1 == valuation.assets.len() { "  └─" } else { "  ├─" };
        println!(
            "{} {:>6} {:>3}%  qty {}  value {}  cost {}",
            branch.dimmed(),
            client::symbol_of(&state.exchange, asset.asset).bright_yellow(),
            asset.percentage,
            fmt_amount(asset.quantity),
            fmt_amount(asset.value),
            fmt_amount(basket.holdings[i].cost)
        );
    }
    Ok(())
}

pub async fn list_baskets(config: &CliConfig, owner: Option<String>) -> Result<()> {
    let state = client::load_state(config)?;
    let owner = owner_or_self(config, owner)?;
    let baskets = state.engine.user_baskets(owner);

    println!("{}", "=== Baskets ===".bright_green().bold());
    print_field("Owner", format_address(&owner));
    if baskets.is_empty() {
        println!("{}", "  No baskets".dimmed());
        return Ok(());
    }
    for basket in baskets {
        let symbols: Vec<_> = basket
            .holdings
            .iter()
            .map(|h| format!("{} {}%", client::symbol_of(&state.exchange, h.asset), h.percentage))
            .collect();
        println!(
            "{} {}  invested {}  [{}]",
            "  ├─".dimmed(),
            basket.id.to_string().bright_yellow(),
            fmt_amount(basket.invested),
            symbols.join(", ")
        );
    }
    Ok(())
}

pub async fn show_value(config: &CliConfig, id: u64, owner: Option<String>) -> Result<()> {
    let state = client::load_state(config)?;
    let owner = owner_or_self(config, owner)?;
    let value = state
        .engine
        .basket_total_value(&state.exchange, owner, BasketId(id))
        .map_err(report)?;
    print_field("Total value", fmt_amount(value).bright_green());
    Ok(())
}

pub async fn show_details(config: &CliConfig, id: u64, owner: Option<String>) -> Result<()> {
    let state = client::load_state(config)?;
    let owner = owner_or_self(config, owner)?;
    println!("{}", "=== Basket Details ===".bright_green().bold());
    print_basket(&state, owner, BasketId(id))
}

pub async fn show_portfolio(config: &CliConfig, owner: Option<String>) -> Result<()> {
    let state = client::load_state(config)?;
    let owner = owner_or_self(config, owner)?;
    let value = state
        .engine
        .portfolio_value(&state.exchange, owner)
        .map_err(report)?;
    let invested = state
        .engine
        .user_baskets(owner)
        .iter()
        .fold(Amount::ZERO, |acc, b| acc + b.invested);

    println!("{}", "=== Portfolio ===".bright_green().bold());
    print_field("Owner", format_address(&owner));
    print_field("Baskets", state.engine.user_baskets(owner).len());
    print_field("Invested", fmt_amount(invested));
    print_field("Value", fmt_amount(value).bright_green());
    Ok(())
}

pub async fn show_history(config: &CliConfig, owner: Option<String>, limit: usize) -> Result<()> {
    let state = client::load_state(config)?;
    let owner = owner_or_self(config, owner)?;
    let events: Vec<_> = state.engine.events_for(owner).collect();

    println!("{}", "=== Basket History ===".bright_green().bold());
    if events.is_empty() {
        println!("{}", "  No events".dimmed());
    }
    for event in events.iter().rev().take(limit) {
        let line = match event {
            BasketEvent::BasketCreated {
                id,
                total,
                invested,
                at,
                ..
            } => format!(
                "{} created  {}  requested {}  invested {}",
                timestamp(*at),
                id,
                fmt_amount(*total),
                fmt_amount(*invested)
            ),
            BasketEvent::BasketSold { id, proceeds, at, .. } => format!(
                "{} sold     {}  proceeds {}",
                timestamp(*at),
                id,
                fmt_amount(*proceeds)
            ),
        };
        println!("{} {}", "  ├─".dimmed(), line);
    }
    Ok(())
}

fn timestamp(at: u64) -> String {
    i64::try_from(at)
        .ok()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| at.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::deploy::build_deployment;

    #[test]
    fn test_parse_allocations() {
        let (state, manifest) = build_deployment(&DeployConfig::default(), 0).unwrap();

        let allocations = parse_allocations(&state, "eth:60, WBTC:20,XRP:20").unwrap();
        assert_eq!(
            allocations,
            vec![
                Allocation::new(manifest.tokens["ETH"], 60),
                Allocation::new(manifest.tokens["WBTC"], 20),
                Allocation::new(manifest.tokens["XRP"], 20),
            ]
        );

        assert!(parse_allocations(&state, "ETH60").is_err());
        assert!(parse_allocations(&state, "ETH:abc").is_err());
        assert!(parse_allocations(&state, "NOPE:100").is_err());
    }

    #[tokio::test]
    async fn test_create_and_sell_through_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let config = CliConfig::new(state_path.to_str().unwrap(), None, "alice", false).unwrap();
        crate::deploy::deploy(&config, false).await.unwrap();
        crate::tokens::claim_faucet(&config, None).await.unwrap();

        create_basket(&config, "ETH:50,WBTC:50".to_string(), "100".to_string(), None, true)
            .await
            .unwrap();
        let state = client::load_state(&config).unwrap();
        let baskets = state.engine.user_baskets(config.account);
        assert_eq!(baskets.len(), 1);
        let id = baskets[0].id;

        sell_basket(&config, id.0, None).await.unwrap();
        let state = client::load_state(&config).unwrap();
        assert!(state.engine.user_baskets(config.account).is_empty());
        assert_eq!(state.engine.events_for(config.account).count(), 2);
        assert!(sell_basket(&config, id.0, None).await.is_err());
    }
}
