//! Fixed-point math utilities

use alloy_primitives::{I256, U256};

/// Percentages are whole numbers out of 100
pub const PERCENT_SCALE: u64 = 100;

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u64 = amm_model::BPS_SCALE;

/// `amount * percentage / 100`, rounding down
#[inline]
pub fn percent_of(amount: U256, percentage: u8) -> Option<U256> {
    amount
        .checked_mul(U256::from(percentage))
        .map(|scaled| scaled / U256::from(PERCENT_SCALE))
}

/// `amount * bps / 10_000`, rounding down
#[inline]
pub fn apply_bps(amount: U256, bps: u64) -> Option<U256> {
    amount
        .checked_mul(U256::from(bps))
        .map(|scaled| scaled / U256::from(BPS_SCALE))
}

/// Signed profit of a position: `value - basis`
#[inline]
pub fn calculate_pnl(value: U256, basis: U256) -> Option<I256> {
    let value = I256::try_from(value).ok()?;
    let basis = I256::try_from(basis).ok()?;
    value.checked_sub(basis)
}

/// Return on investment in basis points, truncated toward zero
///
/// Returns `None` for a zero basis or a ratio that does not fit in `i64`.
pub fn roi_bps(value: U256, basis: U256) -> Option<i64> {
    if basis.is_zero() {
        return None;
    }
    let (delta, negative) = if value >= basis {
        (value - basis, false)
    } else {
        (basis - value, true)
    };
    let magnitude = delta.checked_mul(U256::from(BPS_SCALE))? / basis;
    let magnitude = i64::try_from(magnitude).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// True when `actual` lies within `tolerance_bps` of `expected`
pub fn within_bps(actual: U256, expected: U256, tolerance_bps: u64) -> bool {
    let Some(tolerance) = apply_bps(expected, tolerance_bps) else {
        return false;
    };
    let delta = if actual >= expected {
        actual - expected
    } else {
        expected - actual
    };
    delta <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_of_truncates() {
        assert_eq!(percent_of(U256::from(10_000u64), 60), Some(U256::from(6_000u64)));
        assert_eq!(percent_of(U256::from(10u64), 33), Some(U256::from(3u64)));
        assert_eq!(percent_of(U256::MAX, 2), None);
    }

    #[test]
    fn test_pnl_calculation() {
        let pnl = calculate_pnl(U256::from(110u64), U256::from(100u64)).unwrap();
        assert_eq!(pnl, I256::try_from(10i64).unwrap());

        let pnl = calculate_pnl(U256::from(90u64), U256::from(100u64)).unwrap();
        assert_eq!(pnl, I256::try_from(-10i64).unwrap());
    }

    #[test]
    fn test_roi_bps() {
        assert_eq!(roi_bps(U256::from(110u64), U256::from(100u64)), Some(1_000));
        assert_eq!(roi_bps(U256::from(95u64), U256::from(100u64)), Some(-500));
        assert_eq!(roi_bps(U256::from(95u64), U256::ZERO), None);
    }

    #[test]
    fn test_within_bps() {
        let expected = U256::from(100_000u64);
        assert!(within_bps(U256::from(95_000u64), expected, 500));
        assert!(!within_bps(U256::from(94_999u64), expected, 500));
        assert!(within_bps(U256::from(104_000u64), expected, 500));
    }
}

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// M1: splitting by whole percentages never allocates more than the total
    #[kani::proof]
    fn m1_percent_split_bounded() {
        let total: u64 = kani::any();
        let a: u8 = kani::any();
        kani::assume(a <= 100);
        let b = 100 - a;

        let total = U256::from(total);
        let spent = percent_of(total, a).unwrap() + percent_of(total, b).unwrap();
        assert!(spent <= total, "M1: spends exceed total");
    }
}
