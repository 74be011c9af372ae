//! Constant product AMM math (x·y=k)
//!
//! Re-exports the pure functions from `amm_model`; pairs and the router never
//! duplicate the formulas.

pub use amm_model::{
    burn_amounts, get_amount_in, get_amount_out, initial_liquidity, k_holds,
    min_out_with_slippage, proportional_liquidity, quote, AmmError, BPS_SCALE,
    DEFAULT_FEE_BPS, MINIMUM_LIQUIDITY,
};
