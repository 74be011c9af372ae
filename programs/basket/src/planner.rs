//! Acquisition planning and execution
//!
//! A purchase is split in two steps. [`plan_acquisition`] is read-only: it
//! splits the total by percentage and quotes every leg at the current
//! reserves. [`execute_acquisition`] then swaps each leg with the minimum
//! output fixed at planning time. Every leg trades against its own
//! stable/asset pair, so quotes taken up front stay valid until that leg
//! runs.

use amm_model::min_out_with_slippage;
use log::debug;
use serde::{Deserialize, Serialize};
use smartbasket_common::{percent_of, Address, Amount, SwapVenue, Timestamp, BPS_SCALE};

use crate::allocation::Allocation;
use crate::error::BasketError;
use crate::ledger::Holding;

/// Slippage bound and deadline carried by every basket operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapGuard {
    /// Accepted shortfall against the live quote, below 10000
    pub max_slippage_bps: u64,
    pub deadline: Timestamp,
}

impl SwapGuard {
    pub fn new(max_slippage_bps: u64, deadline: Timestamp) -> Self {
        Self {
            max_slippage_bps,
            deadline,
        }
    }

    /// Reject a malformed bound or a deadline already in the past
    pub fn check(&self, now: Timestamp) -> Result<(), BasketError> {
        if self.max_slippage_bps >= BPS_SCALE {
            return Err(BasketError::InvalidSlippage(self.max_slippage_bps));
        }
        if self.deadline < now {
            return Err(BasketError::SwapExpired {
                deadline: self.deadline,
                now,
            });
        }
        Ok(())
    }

    /// Minimum acceptable output for `quoted`; never zero
    pub fn min_out(&self, quoted: Amount) -> Result<Amount, BasketError> {
        let min_out = min_out_with_slippage(quoted, self.max_slippage_bps)
            .map_err(|_| BasketError::InvalidSlippage(self.max_slippage_bps))?;
        if min_out.is_zero() {
            return Err(BasketError::InsufficientOutput {
                amount_out: quoted,
                amount_out_min: Amount::from(1u64),
            });
        }
        Ok(min_out)
    }
}

/// Per-allocation spends, truncating; the sum never exceeds `total`
pub fn plan_spends(allocations: &[Allocation], total: Amount) -> Result<Vec<Amount>, BasketError> {
    allocations
        .iter()
        .map(|a| percent_of(total, a.percentage).ok_or(BasketError::InvalidAmount(total)))
        .collect()
}

/// One quoted purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedLeg {
    pub asset: Address,
    pub percentage: u8,
    pub spend: Amount,
    pub expected_out: Amount,
    pub min_out: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionPlan {
    pub legs: Vec<PlannedLeg>,
    pub total: Amount,
    /// Sum of leg spends; the only amount pulled from the owner
    pub spent: Amount,
}

impl AcquisitionPlan {
    /// Left unspent by truncation
    pub fn dust(&self) -> Amount {
        self.total - self.spent
    }
}

/// Split `total` and quote every leg against the venue
pub fn plan_acquisition<V: SwapVenue>(
    venue: &V,
    stable: Address,
    allocations: &[Allocation],
    total: Amount,
    guard: &SwapGuard,
) -> Result<AcquisitionPlan, BasketError> {
    let spends = plan_spends(allocations, total)?;

    let mut legs = Vec::with_capacity(allocations.len());
    let mut spent = Amount::ZERO;
    for (allocation, spend) in allocations.iter().zip(spends) {
        if spend.is_zero() {
            return Err(BasketError::InvalidAmount(total));
        }
        let amounts = venue.get_amounts_out(spend, &[stable, allocation.asset])?;
        let expected_out = amounts[amounts.len() - 1];
        let min_out = guard.min_out(expected_out)?;
        debug!(
            "plan {}%: {} -> {} (expect {}, min {})",
            allocation.percentage, spend, allocation.asset, expected_out, min_out
        );

        spent += spend;
        legs.push(PlannedLeg {
            asset: allocation.asset,
            percentage: allocation.percentage,
            spend,
            expected_out,
            min_out,
        });
    }

    Ok(AcquisitionPlan { legs, total, spent })
}

/// Swap every leg from `account`'s stable balance into `account`
///
/// The caller owns rollback: a failing leg leaves earlier legs executed.
pub fn execute_acquisition<V: SwapVenue>(
    venue: &mut V,
    account: Address,
    stable: Address,
    plan: &AcquisitionPlan,
    deadline: Timestamp,
) -> Result<Vec<Holding>, BasketError> {
    let router = venue.router();
    venue.approve(stable, account, router, plan.spent)?;

    let mut holdings = Vec::with_capacity(plan.legs.len());
    for leg in &plan.legs {
        let amounts = venue.swap_exact_tokens_for_tokens(
            account,
            leg.spend,
            leg.min_out,
            &[stable, leg.asset],
            account,
            deadline,
        )?;
        let quantity = amounts[amounts.len() - 1];
        debug!("bought {} of {} for {}", quantity, leg.asset, leg.spend);

        holdings.push(Holding {
            asset: leg.asset,
            percentage: leg.percentage,
            quantity,
            cost: leg.spend,
        });
    }
    Ok(holdings)
}
