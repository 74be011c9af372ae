//! Liquidation planning and execution

use log::debug;
use serde::{Deserialize, Serialize};
use smartbasket_common::{Address, Amount, SwapVenue, Timestamp};

use crate::error::BasketError;
use crate::ledger::Basket;
use crate::planner::SwapGuard;
use crate::valuation::holding_value;

/// One quoted sale back into the stable token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationLeg {
    pub asset: Address,
    pub quantity: Amount,
    pub expected_out: Amount,
    pub min_out: Amount,
}

/// Quote every non-empty holding of `basket`
pub fn plan_liquidation<V: SwapVenue>(
    venue: &V,
    stable: Address,
    basket: &Basket,
    guard: &SwapGuard,
) -> Result<Vec<LiquidationLeg>, BasketError> {
    let mut legs = Vec::with_capacity(basket.holdings.len());
    for holding in basket.holdings.iter().filter(|h| !h.quantity.is_zero()) {
        let expected_out = holding_value(venue, stable, holding)?;
        legs.push(LiquidationLeg {
            asset: holding.asset,
            quantity: holding.quantity,
            expected_out,
            min_out: guard.min_out(expected_out)?,
        });
    }
    Ok(legs)
}

/// Sell every leg from `account` and return the stable proceeds
///
/// Proceeds stay with `account`; paying the owner is the caller's step.
pub fn execute_liquidation<V: SwapVenue>(
    venue: &mut V,
    account: Address,
    stable: Address,
    legs: &[LiquidationLeg],
    deadline: Timestamp,
) -> Result<Amount, BasketError> {
    let router = venue.router();
    let mut proceeds = Amount::ZERO;
    for leg in legs {
        venue.approve(leg.asset, account, router, leg.quantity)?;
        let amounts = venue.swap_exact_tokens_for_tokens(
            account,
            leg.quantity,
            leg.min_out,
            &[leg.asset, stable],
            account,
            deadline,
        )?;
        let received = amounts[amounts.len() - 1];
        debug!("sold {} of {} for {}", leg.quantity, leg.asset, received);
        proceeds = proceeds
            .checked_add(received)
            .ok_or(BasketError::InvalidAmount(received))?;
    }
    Ok(proceeds)
}
