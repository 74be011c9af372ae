//! Constant product AMM math (x·y=k)

use alloy_primitives::U256;

use crate::{AmmError, BPS_SCALE, MINIMUM_LIQUIDITY};

/// Result of pricing an exact-input swap against a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapQuote {
    /// Output amount delivered to the trader
    pub amount_out: U256,

    /// Input-side reserve after the trade
    pub new_reserve_in: U256,

    /// Output-side reserve after the trade
    pub new_reserve_out: U256,
}

#[inline]
fn bps(value: u64) -> U256 {
    U256::from(value)
}

fn fee_complement(fee_bps: u64) -> Result<U256, AmmError> {
    if fee_bps >= BPS_SCALE {
        return Err(AmmError::InvalidAmount);
    }
    Ok(bps(BPS_SCALE - fee_bps))
}

/// Output amount for an exact input (router `getAmountOut`)
///
/// With fee on input:
/// - Δin_net = Δin · (1 - fee)
/// - Δout = Δin_net · y / (x + Δin_net)
///
/// # Arguments
/// * `amount_in` - Input token amount
/// * `reserve_in` - Reserve of the input token
/// * `reserve_out` - Reserve of the output token
/// * `fee_bps` - Fee in basis points (30 = 0.3%)
pub fn get_amount_out(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u64,
) -> Result<U256, AmmError> {
    if amount_in.is_zero() {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InvalidReserves);
    }

    let amount_in_with_fee = amount_in
        .checked_mul(fee_complement(fee_bps)?)
        .ok_or(AmmError::Overflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or(AmmError::Overflow)?;
    let denominator = reserve_in
        .checked_mul(bps(BPS_SCALE))
        .and_then(|d| d.checked_add(amount_in_with_fee))
        .ok_or(AmmError::Overflow)?;

    Ok(numerator / denominator)
}

/// Input amount required for an exact output (router `getAmountIn`)
///
/// Rounds up by one unit so the pair invariant always holds.
pub fn get_amount_in(
    amount_out: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u64,
) -> Result<U256, AmmError> {
    if amount_out.is_zero() {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(AmmError::InvalidReserves);
    }
    if amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }

    let numerator = reserve_in
        .checked_mul(amount_out)
        .and_then(|n| n.checked_mul(bps(BPS_SCALE)))
        .ok_or(AmmError::Overflow)?;
    let denominator = (reserve_out - amount_out)
        .checked_mul(fee_complement(fee_bps)?)
        .ok_or(AmmError::Overflow)?;

    (numerator / denominator)
        .checked_add(U256::from(1u64))
        .ok_or(AmmError::Overflow)
}

/// Price an exact-input swap and project the reserves after it
pub fn quote_exact_in(
    amount_in: U256,
    reserve_in: U256,
    reserve_out: U256,
    fee_bps: u64,
) -> Result<SwapQuote, AmmError> {
    let amount_out = get_amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
    if amount_out.is_zero() || amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }

    Ok(SwapQuote {
        amount_out,
        new_reserve_in: reserve_in.checked_add(amount_in).ok_or(AmmError::Overflow)?,
        new_reserve_out: reserve_out - amount_out,
    })
}

/// Equivalent amount of the other asset at the current reserve ratio (no fee)
pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256, AmmError> {
    if amount_a.is_zero() {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_a.is_zero() || reserve_b.is_zero() {
        return Err(AmmError::InvalidReserves);
    }
    let product = amount_a.checked_mul(reserve_b).ok_or(AmmError::Overflow)?;
    Ok(product / reserve_a)
}

/// Lowest acceptable output for a quoted amount under a slippage tolerance
///
/// `max_slippage_bps` must lie in `0..BPS_SCALE`; 10,000 bps would allow a
/// zero output and is rejected.
pub fn min_out_with_slippage(quoted: U256, max_slippage_bps: u64) -> Result<U256, AmmError> {
    let keep = fee_complement(max_slippage_bps)?;
    let scaled = quoted.checked_mul(keep).ok_or(AmmError::Overflow)?;
    Ok(scaled / bps(BPS_SCALE))
}

/// Integer square root (Babylonian method, floor)
pub fn isqrt(y: U256) -> U256 {
    if y > U256::from(3u64) {
        let mut z = y;
        let mut x = y / U256::from(2u64) + U256::from(1u64);
        while x < z {
            z = x;
            x = (y / x + x) / U256::from(2u64);
        }
        z
    } else if !y.is_zero() {
        U256::from(1u64)
    } else {
        U256::ZERO
    }
}

/// LP shares minted by the very first deposit into an empty pair
///
/// `sqrt(a·b) - MINIMUM_LIQUIDITY`; the locked remainder makes the pool
/// impossible to drain to zero supply.
pub fn initial_liquidity(amount0: U256, amount1: U256) -> Result<U256, AmmError> {
    let product = amount0.checked_mul(amount1).ok_or(AmmError::Overflow)?;
    let root = isqrt(product);
    let minimum = U256::from(MINIMUM_LIQUIDITY);
    if root <= minimum {
        return Err(AmmError::InsufficientLiquidityMinted);
    }
    Ok(root - minimum)
}

/// LP shares minted for a deposit into a pair that already has supply
pub fn proportional_liquidity(
    amount0: U256,
    amount1: U256,
    reserve0: U256,
    reserve1: U256,
    total_supply: U256,
) -> Result<U256, AmmError> {
    if reserve0.is_zero() || reserve1.is_zero() {
        return Err(AmmError::InvalidReserves);
    }
    let l0 = amount0.checked_mul(total_supply).ok_or(AmmError::Overflow)? / reserve0;
    let l1 = amount1.checked_mul(total_supply).ok_or(AmmError::Overflow)? / reserve1;
    let liquidity = l0.min(l1);
    if liquidity.is_zero() {
        return Err(AmmError::InsufficientLiquidityMinted);
    }
    Ok(liquidity)
}

/// Token amounts released by burning `liquidity` shares
pub fn burn_amounts(
    liquidity: U256,
    total_supply: U256,
    balance0: U256,
    balance1: U256,
) -> Result<(U256, U256), AmmError> {
    if total_supply.is_zero() || liquidity > total_supply {
        return Err(AmmError::InsufficientLiquidity);
    }
    let amount0 = liquidity.checked_mul(balance0).ok_or(AmmError::Overflow)? / total_supply;
    let amount1 = liquidity.checked_mul(balance1).ok_or(AmmError::Overflow)? / total_supply;
    if amount0.is_zero() || amount1.is_zero() {
        return Err(AmmError::InsufficientLiquidityMinted);
    }
    Ok((amount0, amount1))
}

/// Post-swap invariant check performed by the pair
///
/// `(b0·S - in0·fee) · (b1·S - in1·fee) >= r0 · r1 · S²`
pub fn k_holds(
    balance0: U256,
    balance1: U256,
    amount0_in: U256,
    amount1_in: U256,
    reserve0: U256,
    reserve1: U256,
    fee_bps: u64,
) -> Result<bool, AmmError> {
    let scale = bps(BPS_SCALE);
    let fee = bps(fee_bps);

    let adjusted0 = balance0
        .checked_mul(scale)
        .and_then(|b| b.checked_sub(amount0_in.checked_mul(fee)?))
        .ok_or(AmmError::Overflow)?;
    let adjusted1 = balance1
        .checked_mul(scale)
        .and_then(|b| b.checked_sub(amount1_in.checked_mul(fee)?))
        .ok_or(AmmError::Overflow)?;

    let lhs = adjusted0.checked_mul(adjusted1).ok_or(AmmError::Overflow)?;
    let rhs = reserve0
        .checked_mul(reserve1)
        .and_then(|k| k.checked_mul(scale * scale))
        .ok_or(AmmError::Overflow)?;

    Ok(lhs >= rhs)
}
