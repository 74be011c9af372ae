//! Deployment of the demo exchange and basket engine

use anyhow::{Context, Result};
use colored::Colorize;
use smartbasket_basket::{BasketEngine, DEFAULT_ENGINE_LABEL};
use smartbasket_common::{derive_address, Amount, SwapVenue, Timestamp, DEFAULT_DECIMALS, U256};
use smartbasket_router::liquidity::AddLiquidity;
use smartbasket_router::Exchange;
use smartbasket_token::whole_tokens;

use crate::client::{self, fmt_amount, format_address, AppState, Manifest};
use crate::config::{CliConfig, DeployConfig, DEPLOYER_LABEL};

/// Build a fresh deployment: tokens, seeded stable pairs and the engine
pub fn build_deployment(deploy: &DeployConfig, now: Timestamp) -> Result<(AppState, Manifest)> {
    let mut exchange = Exchange::new(now);
    let deployer = derive_address(DEPLOYER_LABEL);
    let router = exchange.router;
    let unit = U256::from(10u64).pow(U256::from(DEFAULT_DECIMALS));
    let mut manifest = Manifest::default();

    let stable = exchange.register_token(
        &deploy.stable.symbol,
        &deploy.stable.name,
        whole_tokens(deploy.faucet_tokens),
    )?;
    SwapVenue::approve(&mut exchange, stable, deployer, router, Amount::MAX)?;
    manifest.tokens.insert(deploy.stable.symbol.clone(), stable);

    for listing in &deploy.tokens {
        let token = exchange
            .register_token(&listing.symbol, &listing.name, Amount::ZERO)
            .with_context(|| format!("Failed to list {}", listing.symbol))?;
        let amount = client::parse_token_amount(&listing.liquidity)?;
        let price = client::parse_token_amount(&listing.price)?;
        let stable_amount = amount
            .checked_mul(price)
            .map(|v| v / unit)
            .with_context(|| format!("Seed value overflows for {}", listing.symbol))?;

        exchange.mint(token, deployer, amount)?;
        exchange.mint(stable, deployer, stable_amount)?;
        SwapVenue::approve(&mut exchange, token, deployer, router, Amount::MAX)?;

        let params = AddLiquidity {
            token_a: stable,
            token_b: token,
            amount_a_desired: stable_amount,
            amount_b_desired: amount,
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
        };
        exchange
            .add_liquidity(deployer, params, deployer, now)
            .with_context(|| format!("Failed to seed the {} pool", listing.symbol))?;
        manifest.tokens.insert(listing.symbol.clone(), token);
        log::debug!("seeded {}: {} against {}", listing.symbol, amount, stable_amount);
    }

    let engine = BasketEngine::new(stable, deploy.engine);
    manifest.core.insert("Factory".to_string(), exchange.factory().address);
    manifest.core.insert("Router".to_string(), exchange.router);
    manifest.core.insert(DEFAULT_ENGINE_LABEL.to_string(), engine.account);

    let state = AppState {
        exchange,
        engine,
        deployed_at: chrono::Utc::now().to_rfc3339(),
    };
    Ok((state, manifest))
}

pub async fn deploy(config: &CliConfig, force: bool) -> Result<()> {
    println!("{}", "=== Deployment ===".bright_green().bold());

    if config.state_path.exists() && !force {
        anyhow::bail!(
            "State already exists at {}\nPass --force to redeploy",
            config.state_path.display()
        );
    }

    let (state, manifest) = build_deployment(&config.deploy, client::now_ts())?;
    client::save_state(config, &state)?;
    client::write_manifest(config, &manifest)?;

    println!("{} {}", "Factory:".bright_cyan(), state.exchange.factory().address);
    println!("{} {}", "Router:".bright_cyan(), state.exchange.router);
    println!("{} {}", "SmartBasket:".bright_cyan(), state.engine.account);
    println!("\n{}", "Pools:".bright_yellow());
    for pair in state.exchange.factory().pairs() {
        println!(
            "{} {} / {}  reserves {} / {}",
            "  ├─".dimmed(),
            client::symbol_of(&state.exchange, pair.token0),
            client::symbol_of(&state.exchange, pair.token1),
            fmt_amount(pair.reserve0),
            fmt_amount(pair.reserve1),
        );
    }

    println!("\n{} {}", "State:".bright_cyan(), config.state_path.display());
    println!("{} {}", "Manifest:".bright_cyan(), config.manifest_path.display());
    println!(
        "{} {}",
        "Deployer:".bright_cyan(),
        format_address(&derive_address(DEPLOYER_LABEL))
    );
    println!("\n{}", "=== Deployment Complete ===".bright_green().bold());
    Ok(())
}
