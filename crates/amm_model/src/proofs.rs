//! Kani proofs for constant product invariants
//!
//! - **A1: Invariant Non-Decreasing** - an exact-in swap never lowers x·y
//! - **A2: Output Bounded** - a swap never pays out the whole output reserve
//! - **A3: Round Trip Lossy** - selling the proceeds back never returns more than was paid
//! - **A4: Slippage Floor** - the minimum output never exceeds the quote

use alloy_primitives::U256;

use crate::{get_amount_out, k_holds, min_out_with_slippage, DEFAULT_FEE_BPS};

fn bounded_reserve() -> U256 {
    let r: u64 = kani::any();
    kani::assume(r > 1_000 && r < 1_000_000_000);
    U256::from(r)
}

#[kani::proof]
#[kani::unwind(4)]
fn a1_invariant_non_decreasing() {
    let r_in = bounded_reserve();
    let r_out = bounded_reserve();
    let dx: u64 = kani::any();
    kani::assume(dx > 0 && dx < 1_000_000_000);
    let dx = U256::from(dx);

    if let Ok(out) = get_amount_out(dx, r_in, r_out, DEFAULT_FEE_BPS) {
        let b_in = r_in + dx;
        let b_out = r_out - out;
        assert!(b_in * b_out >= r_in * r_out, "A1: k must not decrease");
        assert!(k_holds(b_in, b_out, dx, U256::ZERO, r_in, r_out, DEFAULT_FEE_BPS).unwrap_or(false));
    }
}

#[kani::proof]
#[kani::unwind(4)]
fn a2_output_bounded() {
    let r_in = bounded_reserve();
    let r_out = bounded_reserve();
    let dx: u64 = kani::any();
    kani::assume(dx > 0);

    if let Ok(out) = get_amount_out(U256::from(dx), r_in, r_out, DEFAULT_FEE_BPS) {
        assert!(out < r_out, "A2: reserve must never be fully drained");
    }
}

#[kani::proof]
#[kani::unwind(4)]
fn a3_round_trip_lossy() {
    let r_a = bounded_reserve();
    let r_b = bounded_reserve();
    let dx: u64 = kani::any();
    kani::assume(dx > 0 && dx < 1_000_000);
    let dx = U256::from(dx);

    if let Ok(out) = get_amount_out(dx, r_a, r_b, DEFAULT_FEE_BPS) {
        if out.is_zero() {
            return;
        }
        if let Ok(back) = get_amount_out(out, r_b - out, r_a + dx, DEFAULT_FEE_BPS) {
            assert!(back <= dx, "A3: round trip must not create value");
        }
    }
}

#[kani::proof]
fn a4_slippage_floor_below_quote() {
    let quoted: u64 = kani::any();
    let slippage: u64 = kani::any();
    kani::assume(slippage < 10_000);

    let floor = min_out_with_slippage(U256::from(quoted), slippage).unwrap();
    assert!(floor <= U256::from(quoted), "A4: floor must not exceed quote");
}
