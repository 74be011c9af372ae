//! Local state persistence and display helpers

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use smartbasket_basket::BasketEngine;
use smartbasket_common::{format_amount, parse_amount, Address, Amount, Timestamp, DEFAULT_DECIMALS};
use smartbasket_router::Exchange;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::CliConfig;

/// Everything a deployment persists between CLI runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    pub exchange: Exchange,
    pub engine: BasketEngine,
    /// RFC 3339
    pub deployed_at: String,
}

/// Deployed-address manifest, `addresses.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub core: BTreeMap<String, Address>,
    pub tokens: BTreeMap<String, Address>,
}

/// Wall-clock unix seconds
pub fn now_ts() -> Timestamp {
    Timestamp::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// Load the deployment and move its clock to the current time
pub fn load_state(config: &CliConfig) -> Result<AppState> {
    let path = &config.state_path;
    if !path.exists() {
        anyhow::bail!(
            "No deployment found at {}\nRun: smartbasket deploy",
            path.display()
        );
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    let mut state: AppState = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
    state.exchange.set_timestamp(now_ts());
    Ok(state)
}

pub fn save_state(config: &CliConfig, state: &AppState) -> Result<()> {
    write_json(&config.state_path, state)
}

pub fn write_manifest(config: &CliConfig, manifest: &Manifest) -> Result<()> {
    write_json(&config.manifest_path, manifest)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    let data = serde_json::to_string_pretty(value)?;
    fs::write(path, data).with_context(|| format!("Failed to write: {}", path.display()))
}

/// Token by symbol (any case) or `0x` address
pub fn resolve_token(exchange: &Exchange, token: &str) -> Result<Address> {
    if token.starts_with("0x") {
        let address: Address = token
            .parse()
            .with_context(|| format!("Invalid token address: {}", token))?;
        if exchange.tokens().is_listed(address) {
            return Ok(address);
        }
        anyhow::bail!("Token {} is not listed", token);
    }
    exchange
        .token_by_symbol(token)
        .map(|info| info.address)
        .with_context(|| format!("Unknown token symbol: {}", token))
}

pub fn symbol_of(exchange: &Exchange, token: Address) -> String {
    exchange
        .tokens()
        .info(token)
        .map(|info| info.symbol.clone())
        .unwrap_or_else(|| format_address(&token))
}

/// Decimal string in whole tokens to base units
pub fn parse_token_amount(amount: &str) -> Result<Amount> {
    parse_amount(amount, DEFAULT_DECIMALS).with_context(|| format!("Invalid amount: {}", amount))
}

pub fn fmt_amount(amount: Amount) -> String {
    format_amount(amount, DEFAULT_DECIMALS)
}

/// Shortened `0x1234…abcd` form
pub fn format_address(address: &Address) -> String {
    let full = address.to_string();
    format!("{}...{}", &full[0..6], &full[full.len() - 4..])
}

pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{} {}", format!("{label}:").bright_cyan(), value);
}
