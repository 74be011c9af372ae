//! Deployment configuration and CLI context

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use smartbasket_basket::EngineConfig;
use smartbasket_common::{derive_address, Address};
use smartbasket_token::DEFAULT_FAUCET_TOKENS;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_PATH: &str = "~/.smartbasket/state.json";
pub const MANIFEST_FILE: &str = "addresses.json";

/// Account that seeds the pools at deploy time
pub const DEPLOYER_LABEL: &str = "deployer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StableListing {
    pub symbol: String,
    pub name: String,
}

/// A listed token and the pool it is seeded with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenListing {
    pub symbol: String,
    pub name: String,
    /// Stable units per whole token, decimal string
    pub price: String,
    /// Whole tokens deposited into the stable pair, decimal string
    pub liquidity: String,
}

impl TokenListing {
    fn new(symbol: &str, name: &str, price: &str, liquidity: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price: price.to_string(),
            liquidity: liquidity.to_string(),
        }
    }
}

fn default_faucet_tokens() -> u64 {
    DEFAULT_FAUCET_TOKENS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Whole stable tokens per faucet claim
    #[serde(default = "default_faucet_tokens")]
    pub faucet_tokens: u64,
    pub stable: StableListing,
    #[serde(default)]
    pub engine: EngineConfig,
    pub tokens: Vec<TokenListing>,
}

impl Default for DeployConfig {
    /// The demo market: USDT against nine listed tokens
    fn default() -> Self {
        Self {
            faucet_tokens: DEFAULT_FAUCET_TOKENS,
            stable: StableListing {
                symbol: "USDT".to_string(),
                name: "Tether USD".to_string(),
            },
            engine: EngineConfig::default(),
            tokens: vec![
                TokenListing::new("ETH", "Ether", "2500", "1000"),
                TokenListing::new("WBTC", "Wrapped Bitcoin", "60000", "50"),
                TokenListing::new("XRP", "XRP", "0.5", "100000"),
                TokenListing::new("UNI", "Uniswap", "7", "10000"),
                TokenListing::new("LINK", "Chainlink", "15", "5000"),
                TokenListing::new("DOGE", "Dogecoin", "0.1", "1000000"),
                TokenListing::new("SHIB", "Shiba Inu", "0.00001", "1000000000"),
                TokenListing::new("PEPE", "Pepe", "0.000001", "10000000000"),
                TokenListing::new("FLOKI", "Floki", "0.0001", "5000000000"),
            ],
        }
    }
}

impl DeployConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

/// Resolved global options shared by every command
pub struct CliConfig {
    pub state_path: PathBuf,
    pub manifest_path: PathBuf,
    pub account_label: String,
    pub account: Address,
    pub deploy: DeployConfig,
    pub verbose: bool,
}

impl CliConfig {
    pub fn new(state: &str, config: Option<&str>, account: &str, verbose: bool) -> Result<Self> {
        let state_path = expand(state)?;
        let manifest_path = state_path
            .parent()
            .map(|dir| dir.join(MANIFEST_FILE))
            .unwrap_or_else(|| PathBuf::from(MANIFEST_FILE));

        let deploy = match config {
            Some(path) => DeployConfig::load(&expand(path)?)?,
            None => DeployConfig::default(),
        };

        Ok(Self {
            state_path,
            manifest_path,
            account_label: account.to_string(),
            account: resolve_account(account)?,
            deploy,
            verbose,
        })
    }
}

fn expand(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path).with_context(|| format!("Failed to expand path: {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// `0x`-prefixed address, or a label mapped to its derived account
pub fn resolve_account(account: &str) -> Result<Address> {
    if account.starts_with("0x") {
        return account
            .parse()
            .with_context(|| format!("Invalid address: {}", account));
    }
    Ok(derive_address(account))
}
