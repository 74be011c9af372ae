//! Quotes, swaps and spot prices

use anyhow::{Context, Result};
use colored::Colorize;
use smartbasket_common::{Address, SwapVenue};

use crate::client::{self, fmt_amount, print_field};
use crate::config::CliConfig;

/// Direct pair, or a hop through the stable token
fn route(state: &client::AppState, from: Address, to: Address) -> Vec<Address> {
    let stable = state.engine.stable;
    if state.exchange.pair(from, to).is_some() || from == stable || to == stable {
        vec![from, to]
    } else {
        vec![from, stable, to]
    }
}

fn describe_path(state: &client::AppState, path: &[Address]) -> String {
    path.iter()
        .map(|token| client::symbol_of(&state.exchange, *token))
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub async fn quote(config: &CliConfig, from: String, to: String, amount: String) -> Result<()> {
    let state = client::load_state(config)?;
    let from = client::resolve_token(&state.exchange, &from)?;
    let to = client::resolve_token(&state.exchange, &to)?;
    let amount = client::parse_token_amount(&amount)?;

    let path = route(&state, from, to);
    let amounts = state.exchange.get_amounts_out(amount, &path)?;

    println!("{}", "=== Quote ===".bright_green().bold());
    print_field("Path", describe_path(&state, &path));
    print_field("In", fmt_amount(amount));
    print_field("Out", fmt_amount(amounts[amounts.len() - 1]).bright_green());
    Ok(())
}

pub async fn swap(
    config: &CliConfig,
    from: String,
    to: String,
    amount: String,
    slippage_bps: Option<u64>,
) -> Result<()> {
    let mut state = client::load_state(config)?;
    let from = client::resolve_token(&state.exchange, &from)?;
    let to = client::resolve_token(&state.exchange, &to)?;
    let amount_in = client::parse_token_amount(&amount)?;

    let mut guard = state.engine.config.guard(state.exchange.now());
    if let Some(bps) = slippage_bps {
        guard.max_slippage_bps = bps;
    }
    guard.check(state.exchange.now())?;

    let path = route(&state, from, to);
    let quoted = state.exchange.get_amounts_out(amount_in, &path)?;
    let amount_out_min = guard.min_out(quoted[quoted.len() - 1])?;

    let router = state.exchange.router;
    if SwapVenue::allowance(&state.exchange, from, config.account, router) < amount_in {
        SwapVenue::approve(&mut state.exchange, from, config.account, router, amount_in)?;
    }
    let amounts = state
        .exchange
        .swap_exact_tokens_for_tokens(config.account, amount_in, amount_out_min, &path, config.account, guard.deadline)
        .context("Swap failed")?;
    client::save_state(config, &state)?;

    println!("{}", "=== Swap ===".bright_green().bold());
    print_field("Path", describe_path(&state, &path));
    print_field("Paid", fmt_amount(amount_in));
    print_field("Received", fmt_amount(amounts[amounts.len() - 1]).bright_green());
    print_field("Minimum", fmt_amount(amount_out_min).dimmed());
    Ok(())
}

/// Spot price of every listed token in stable units
pub async fn show_prices(config: &CliConfig) -> Result<()> {
    let state = client::load_state(config)?;
    let stable = state.engine.stable;

    println!("{}", "=== Prices ===".bright_green().bold());
    for info in state.exchange.tokens().tokens() {
        if info.address == stable {
            continue;
        }
        let price = match state.exchange.spot_price(info.address, stable) {
            Ok(price) => fmt_amount(price),
            Err(_) => "no pool".dimmed().to_string(),
        };
        println!("{} {:>8} {}", "  ├─".dimmed(), info.symbol.bright_yellow(), price);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::deploy::build_deployment;
    use smartbasket_token::whole_tokens;

    #[test]
    fn test_route_hops_through_stable() {
        let (state, manifest) = build_deployment(&DeployConfig::default(), 0).unwrap();
        let (usdt, eth, wbtc) = (manifest.tokens["USDT"], manifest.tokens["ETH"], manifest.tokens["WBTC"]);

        assert_eq!(route(&state, eth, usdt), vec![eth, usdt]);
        assert_eq!(route(&state, eth, wbtc), vec![eth, usdt, wbtc]);
        let amounts = state
            .exchange
            .get_amounts_out(whole_tokens(1), &route(&state, eth, wbtc))
            .unwrap();
        assert_eq!(amounts.len(), 3);
    }
}
