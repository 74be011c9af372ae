//! Liquidity provider operations

use anyhow::{Context, Result};
use colored::Colorize;
use smartbasket_common::{Amount, SwapVenue};
use smartbasket_router::liquidity::AddLiquidity;

use crate::client::{self, fmt_amount, print_field};
use crate::config::CliConfig;

pub async fn add_liquidity(
    config: &CliConfig,
    token_a: String,
    token_b: String,
    amount_a: String,
    amount_b: String,
) -> Result<()> {
    let mut state = client::load_state(config)?;
    let a = client::resolve_token(&state.exchange, &token_a)?;
    let b = client::resolve_token(&state.exchange, &token_b)?;
    let params = AddLiquidity {
        token_a: a,
        token_b: b,
        amount_a_desired: client::parse_token_amount(&amount_a)?,
        amount_b_desired: client::parse_token_amount(&amount_b)?,
        amount_a_min: Amount::ZERO,
        amount_b_min: Amount::ZERO,
    };

    let router = state.exchange.router;
    for (token, amount) in [(a, params.amount_a_desired), (b, params.amount_b_desired)] {
        if SwapVenue::allowance(&state.exchange, token, config.account, router) < amount {
            SwapVenue::approve(&mut state.exchange, token, config.account, router, amount)?;
        }
    }

    let deadline = state.exchange.now() + state.engine.config.deadline_secs;
    let receipt = state
        .exchange
        .add_liquidity(config.account, params, config.account, deadline)
        .context("Add liquidity failed")?;
    client::save_state(config, &state)?;

    println!("{}", "=== Add Liquidity ===".bright_green().bold());
    print_field(&token_a, fmt_amount(receipt.amount_a));
    print_field(&token_b, fmt_amount(receipt.amount_b));
    print_field("LP minted", fmt_amount(receipt.liquidity).bright_green());
    Ok(())
}

/// Burn `liquidity` LP shares, or all of them when omitted
pub async fn remove_liquidity(
    config: &CliConfig,
    token_a: String,
    token_b: String,
    liquidity: Option<String>,
) -> Result<()> {
    let mut state = client::load_state(config)?;
    let a = client::resolve_token(&state.exchange, &token_a)?;
    let b = client::resolve_token(&state.exchange, &token_b)?;
    let liquidity = match liquidity {
        Some(amount) => client::parse_token_amount(&amount)?,
        None => state.exchange.lp_balance_of(a, b, config.account),
    };
    if liquidity.is_zero() {
        anyhow::bail!("No {}/{} liquidity to remove", token_a, token_b);
    }

    let deadline = state.exchange.now() + state.engine.config.deadline_secs;
    let (amount_a, amount_b) = state
        .exchange
        .remove_liquidity(
            config.account,
            a,
            b,
            liquidity,
            Amount::ZERO,
            Amount::ZERO,
            config.account,
            deadline,
        )
        .context("Remove liquidity failed")?;
    client::save_state(config, &state)?;

    println!("{}", "=== Remove Liquidity ===".bright_green().bold());
    print_field("LP burned", fmt_amount(liquidity));
    print_field(&token_a, fmt_amount(amount_a).bright_green());
    print_field(&token_b, fmt_amount(amount_b).bright_green());
    Ok(())
}

pub async fn show_positions(config: &CliConfig) -> Result<()> {
    let state = client::load_state(config)?;

    println!("{}", "=== Liquidity Positions ===".bright_green().bold());
    let mut found = false;
    for pair in state.exchange.factory().pairs() {
        let shares = pair.lp_balance_of(config.account);
        if shares.is_zero() {
            continue;
        }
        found = true;
        println!(
            "{} {}/{}  {} LP of {}",
            "  ├─".dimmed(),
            client::symbol_of(&state.exchange, pair.token0).bright_yellow(),
            client::symbol_of(&state.exchange, pair.token1).bright_yellow(),
            fmt_amount(shares),
            fmt_amount(pair.total_supply)
        );
    }
    if !found {
        println!("{}", "  No positions found".dimmed());
    }
    Ok(())
}
