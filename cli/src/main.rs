//! SmartBasket CLI - deploy and drive the basket engine
//!
//! Persists an in-memory exchange (tokens, constant product pools, router)
//! and the basket engine to a JSON state file, and exposes token, trading,
//! liquidity and basket operations against it.

use clap::{Parser, Subcommand};
use colored::Colorize;

mod basket;
mod client;
mod config;
mod deploy;
mod liquidity;
mod tokens;
mod trading;

use config::{CliConfig, DEFAULT_STATE_PATH};

#[derive(Parser)]
#[command(name = "smartbasket")]
#[command(about = "SmartBasket CLI - Build and trade token baskets on a simulated exchange", long_about = None)]
#[command(version)]
struct Cli {
    /// State file holding the deployment
    #[arg(short, long, default_value = DEFAULT_STATE_PATH)]
    state: String,

    /// Deployment config (TOML); defaults to the built-in demo token set
    #[arg(short, long)]
    config: Option<String>,

    /// Acting account: a label such as `alice` or a 0x address
    #[arg(short, long, default_value = "alice")]
    account: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy tokens, pools, router and the basket engine
    Deploy {
        /// Overwrite an existing deployment
        #[arg(long)]
        force: bool,
    },

    /// Claim faucet tokens (the stable token by default)
    Faucet {
        token: Option<String>,
    },

    /// Mint tokens to an account
    Mint {
        token: String,

        amount: String,

        /// Recipient (defaults to the acting account)
        #[arg(long)]
        to: Option<String>,
    },

    /// Mint a test portfolio of every listed token
    Fund {
        #[arg(long)]
        to: Option<String>,
    },

    /// Approve a spender (basket, router, or an account)
    Approve {
        token: String,

        /// Allowance; unlimited when omitted
        amount: Option<String>,

        #[arg(long, default_value = "basket")]
        spender: String,
    },

    /// Show token balances
    Balance {
        account: Option<String>,
    },

    /// Quote a swap without executing it
    Quote {
        from: String,

        to: String,

        amount: String,
    },

    /// Swap an exact input amount
    Swap {
        from: String,

        to: String,

        amount: String,

        /// Maximum slippage in basis points
        #[arg(long)]
        slippage_bps: Option<u64>,
    },

    /// Show spot prices against the stable token
    Prices,

    /// Liquidity operations
    Liquidity {
        #[command(subcommand)]
        command: LiquidityCommands,
    },

    /// Basket operations
    Basket {
        #[command(subcommand)]
        command: BasketCommands,
    },

    /// Run the basket scenario suite on a throwaway deployment
    Test,
}

#[derive(Subcommand)]
enum LiquidityCommands {
    /// Deposit a token pair
    Add {
        token_a: String,

        token_b: String,

        amount_a: String,

        amount_b: String,
    },

    /// Burn LP shares
    Remove {
        token_a: String,

        token_b: String,

        /// LP amount; everything held when omitted
        liquidity: Option<String>,
    },

    /// Show LP positions
    Show,
}

#[derive(Subcommand)]
enum BasketCommands {
    /// Create a basket, e.g. `create ETH:60,WBTC:40 100`
    Create {
        allocations: String,

        /// Stable amount to invest
        amount: String,

        /// Maximum slippage in basis points
        #[arg(long)]
        slippage_bps: Option<u64>,

        /// Approve the engine for the amount first
        #[arg(long)]
        approve: bool,
    },

    /// List baskets
    List {
        #[arg(long)]
        owner: Option<String>,
    },

    /// Current stable value of a basket
    Value {
        id: u64,

        #[arg(long)]
        owner: Option<String>,
    },

    /// Per-asset breakdown of a basket
    Details {
        id: u64,

        #[arg(long)]
        owner: Option<String>,
    },

    /// Sell a basket back into the stable token
    Sell {
        id: u64,

        #[arg(long)]
        slippage_bps: Option<u64>,
    },

    /// Created and sold baskets
    History {
        #[arg(long)]
        owner: Option<String>,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Combined value of all baskets
    Portfolio {
        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = CliConfig::new(&cli.state, cli.config.as_deref(), &cli.account, cli.verbose)?;

    if cli.verbose {
        println!("{} {}", "State:".bright_cyan(), config.state_path.display());
        println!("{} {} ({})", "Account:".bright_cyan(), config.account_label, config.account);
    }

    match cli.command {
        Commands::Deploy { force } => {
            deploy::deploy(&config, force).await?;
        }
        Commands::Faucet { token } => {
            tokens::claim_faucet(&config, token).await?;
        }
        Commands::Mint { token, amount, to } => {
            tokens::mint(&config, token, amount, to).await?;
        }
        Commands::Fund { to } => {
            tokens::fund(&config, to).await?;
        }
        Commands::Approve { token, amount, spender } => {
            tokens::approve(&config, token, amount, spender).await?;
        }
        Commands::Balance { account } => {
            tokens::show_balances(&config, account).await?;
        }
        Commands::Quote { from, to, amount } => {
            trading::quote(&config, from, to, amount).await?;
        }
        Commands::Swap { from, to, amount, slippage_bps } => {
            trading::swap(&config, from, to, amount, slippage_bps).await?;
        }
        Commands::Prices => {
            trading::show_prices(&config).await?;
        }
        Commands::Liquidity { command } => match command {
            LiquidityCommands::Add { token_a, token_b, amount_a, amount_b } => {
                liquidity::add_liquidity(&config, token_a, token_b, amount_a, amount_b).await?;
            }
            LiquidityCommands::Remove { token_a, token_b, liquidity } => {
                liquidity::remove_liquidity(&config, token_a, token_b, liquidity).await?;
            }
            LiquidityCommands::Show => {
                liquidity::show_positions(&config).await?;
            }
        },
        Commands::Basket { command } => match command {
            BasketCommands::Create { allocations, amount, slippage_bps, approve } => {
                basket::create_basket(&config, allocations, amount, slippage_bps, approve).await?;
            }
            BasketCommands::List { owner } => {
                basket::list_baskets(&config, owner).await?;
            }
            BasketCommands::Value { id, owner } => {
                basket::show_value(&config, id, owner).await?;
            }
            BasketCommands::Details { id, owner } => {
                basket::show_details(&config, id, owner).await?;
            }
            BasketCommands::Sell { id, slippage_bps } => {
                basket::sell_basket(&config, id, slippage_bps).await?;
            }
            BasketCommands::History { owner, limit } => {
                basket::show_history(&config, owner, limit).await?;
            }
            BasketCommands::Portfolio { owner } => {
                basket::show_portfolio(&config, owner).await?;
            }
        },
        Commands::Test => {
            tests::run_all(&config).await?;
        }
    }

    Ok(())
}
