//! Router over the constant product pairs
//!
//! [`Exchange`] bundles the token ledger, the pair factory and the block
//! clock, and exposes the UniswapV2Router02 surface (liquidity, path quotes,
//! exact-in and exact-out swaps). Every write either completes or leaves the
//! state untouched, the way a reverted transaction would.

pub mod exchange;
pub mod liquidity;
pub mod swap;
pub mod venue;

pub use exchange::{Exchange, DEFAULT_FACTORY_LABEL, DEFAULT_ROUTER_LABEL};
pub use smartbasket_amm::{Factory, Pair};
pub use smartbasket_token::{TokenInfo, TokenLedger};
