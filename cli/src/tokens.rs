//! Token commands: faucet, mint, approve, balances

use anyhow::{Context, Result};
use colored::Colorize;
use smartbasket_common::{Address, Amount, SwapVenue};

use crate::client::{self, fmt_amount, format_address, print_field, AppState};
use crate::config::{resolve_account, CliConfig};

/// Named spender: `basket`, `router`, or any account
pub fn resolve_spender(state: &AppState, spender: &str) -> Result<Address> {
    match spender.to_ascii_lowercase().as_str() {
        "basket" | "smartbasket" | "engine" => Ok(state.engine.account),
        "router" => Ok(state.exchange.router),
        _ => resolve_account(spender),
    }
}

pub async fn claim_faucet(config: &CliConfig, token: Option<String>) -> Result<()> {
    let mut state = client::load_state(config)?;
    let token = match token {
        Some(symbol) => client::resolve_token(&state.exchange, &symbol)?,
        None => state.engine.stable,
    };

    let amount = state
        .exchange
        .claim_faucet(token, config.account)
        .context("Faucet claim failed")?;
    client::save_state(config, &state)?;

    println!(
        "{} {} {} to {}",
        "Claimed".bright_green(),
        fmt_amount(amount),
        client::symbol_of(&state.exchange, token),
        config.account_label
    );
    Ok(())
}

pub async fn mint(config: &CliConfig, token: String, amount: String, to: Option<String>) -> Result<()> {
    let mut state = client::load_state(config)?;
    let token = client::resolve_token(&state.exchange, &token)?;
    let amount = client::parse_token_amount(&amount)?;
    let to = match to {
        Some(account) => resolve_account(&account)?,
        None => config.account,
    };

    state.exchange.mint(token, to, amount)?;
    client::save_state(config, &state)?;

    println!(
        "{} {} {} to {}",
        "Minted".bright_green(),
        fmt_amount(amount),
        client::symbol_of(&state.exchange, token),
        format_address(&to)
    );
    Ok(())
}

/// Mint a test portfolio: a million stable plus each pool's seed size
pub async fn fund(config: &CliConfig, to: Option<String>) -> Result<()> {
    let mut state = client::load_state(config)?;
    let to = match to {
        Some(account) => resolve_account(&account)?,
        None => config.account,
    };

    println!("{}", "=== Funding Test Account ===".bright_green().bold());
    let stable = state.engine.stable;
    let stable_amount = client::parse_token_amount("1000000")?;
    state.exchange.mint(stable, to, stable_amount)?;
    println!("{} {} {}", "  ├─".dimmed(), fmt_amount(stable_amount), config.deploy.stable.symbol);

    for listing in &config.deploy.tokens {
        let Ok(token) = client::resolve_token(&state.exchange, &listing.symbol) else {
            println!("{} {} not listed, skipped", "  ├─".dimmed(), listing.symbol.yellow());
            continue;
        };
        let amount = client::parse_token_amount(&listing.liquidity)?;
        state.exchange.mint(token, to, amount)?;
        println!("{} {} {}", "  ├─".dimmed(), fmt_amount(amount), listing.symbol);
    }

    client::save_state(config, &state)?;
    println!("{} {}", "  └─".dimmed(), format_address(&to).bright_green());
    Ok(())
}

pub async fn approve(
    config: &CliConfig,
    token: String,
    amount: Option<String>,
    spender: String,
) -> Result<()> {
    let mut state = client::load_state(config)?;
    let token = client::resolve_token(&state.exchange, &token)?;
    let spender = resolve_spender(&state, &spender)?;
    let amount = match amount {
        Some(amount) => client::parse_token_amount(&amount)?,
        None => Amount::MAX,
    };

    SwapVenue::approve(&mut state.exchange, token, config.account, spender, amount)?;
    client::save_state(config, &state)?;

    let shown = if amount == Amount::MAX {
        "unlimited".to_string()
    } else {
        fmt_amount(amount)
    };
    println!(
        "{} {} {} for {}",
        "Approved".bright_green(),
        shown,
        client::symbol_of(&state.exchange, token),
        format_address(&spender)
    );
    Ok(())
}

pub async fn show_balances(config: &CliConfig, account: Option<String>) -> Result<()> {
    let state = client::load_state(config)?;
    let (label, account) = match account {
        Some(label) => (label.clone(), resolve_account(&label)?),
        None => (config.account_label.clone(), config.account),
    };

    println!("{}", "=== Balances ===".bright_green().bold());
    print_field("Account", format!("{} ({})", label, account));

    let mut empty = true;
    for info in state.exchange.tokens().tokens() {
        let balance = state.exchange.tokens().balance_of(info.address, account);
        if balance.is_zero() {
            continue;
        }
        empty = false;
        println!("{} {:>8} {}", "  ├─".dimmed(), info.symbol.bright_yellow(), fmt_amount(balance));
    }
    if empty {
        println!("{}", "  No token balances".dimmed());
    }
    Ok(())
}
