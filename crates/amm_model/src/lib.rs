//! AMM Model - Pure constant product math (x·y=k)
//!
//! The Uniswap-V2 pricing and share formulas used by the pair, the router and
//! the basket engine. Everything here is a total function over `U256`: no
//! state, no allocation, no panics.
//!
//! Production crates (`programs/amm`, `programs/router`) import these
//! functions directly instead of re-deriving the math.

#![no_std]

#[cfg(kani)]
extern crate kani;

pub mod math;

#[cfg(kani)]
mod proofs;

pub use alloy_primitives::U256;
pub use math::{
    burn_amounts, get_amount_in, get_amount_out, initial_liquidity, isqrt, k_holds,
    min_out_with_slippage, proportional_liquidity, quote, quote_exact_in, SwapQuote,
};

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Swap fee charged on input, in basis points (0.3%, i.e. 997/1000)
pub const DEFAULT_FEE_BPS: u64 = 30;

/// LP shares permanently locked on the first mint of every pair
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Error types for AMM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmError {
    /// Invalid reserves (zero)
    InvalidReserves,
    /// Invalid amount (zero, or a fee/slippage outside 0..BPS_SCALE)
    InvalidAmount,
    /// Insufficient liquidity in pool
    InsufficientLiquidity,
    /// Liquidity minted or burned would round to zero
    InsufficientLiquidityMinted,
    /// Arithmetic overflow
    Overflow,
}

impl core::fmt::Display for AmmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            AmmError::InvalidReserves => "invalid reserves",
            AmmError::InvalidAmount => "invalid amount",
            AmmError::InsufficientLiquidity => "insufficient liquidity",
            AmmError::InsufficientLiquidityMinted => "insufficient liquidity minted",
            AmmError::Overflow => "arithmetic overflow",
        };
        f.write_str(msg)
    }
}
