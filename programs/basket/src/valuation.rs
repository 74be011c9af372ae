//! Mark-to-market valuation

use serde::{Deserialize, Serialize};
use smartbasket_common::{calculate_pnl, roi_bps, Address, Amount, SwapVenue, I256};

use crate::error::BasketError;
use crate::ledger::{Basket, BasketId, Holding};

/// One holding priced in stable units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetValue {
    pub asset: Address,
    pub percentage: u8,
    pub quantity: Amount,
    pub value: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketValuation {
    pub id: BasketId,
    pub assets: Vec<AssetValue>,
    pub total_value: Amount,
    pub invested: Amount,
    pub pnl: I256,
    /// `None` when nothing was invested
    pub roi_bps: Option<i64>,
}

/// Stable units `holding` would fetch if sold in full right now
///
/// An empty holding is worth nothing and is not quoted.
pub fn holding_value<V: SwapVenue>(
    venue: &V,
    stable: Address,
    holding: &Holding,
) -> Result<Amount, BasketError> {
    if holding.quantity.is_zero() {
        return Ok(Amount::ZERO);
    }
    let amounts = venue.get_amounts_out(holding.quantity, &[holding.asset, stable])?;
    Ok(amounts[amounts.len() - 1])
}

pub fn value_basket<V: SwapVenue>(
    venue: &V,
    stable: Address,
    basket: &Basket,
) -> Result<BasketValuation, BasketError> {
    let mut assets = Vec::with_capacity(basket.holdings.len());
    let mut total_value = Amount::ZERO;
    for holding in &basket.holdings {
        let value = holding_value(venue, stable, holding)?;
        total_value = total_value
            .checked_add(value)
            .ok_or(BasketError::InvalidAmount(value))?;
        assets.push(AssetValue {
            asset: holding.asset,
            percentage: holding.percentage,
            quantity: holding.quantity,
            value,
        });
    }

    let pnl = calculate_pnl(total_value, basket.invested).ok_or(BasketError::InvalidAmount(total_value))?;
    Ok(BasketValuation {
        id: basket.id,
        assets,
        total_value,
        invested: basket.invested,
        pnl,
        roi_bps: roi_bps(total_value, basket.invested),
    })
}
