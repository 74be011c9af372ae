//! Allocation validation

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smartbasket_common::{Address, PERCENT_SCALE};
use thiserror::Error;

/// Assets a basket may hold unless the engine is configured otherwise
pub const DEFAULT_MAX_ASSETS: usize = 5;

/// One asset and its whole-number share of a basket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub asset: Address,
    pub percentage: u8,
}

impl Allocation {
    pub fn new(asset: Address, percentage: u8) -> Self {
        Self { asset, percentage }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationIssue {
    #[error("allocation list is empty")]
    Empty,

    #[error("{count} allocations exceed the limit of {max}")]
    TooMany { count: usize, max: usize },

    #[error("zero percentage for {0}")]
    ZeroPercentage(Address),

    #[error("percentage {percentage} for {asset} is above 100")]
    PercentageOutOfRange { asset: Address, percentage: u8 },

    #[error("total percentage must be 100, got {0}")]
    SumNot100(u32),

    #[error("duplicate asset {0}")]
    Duplicate(Address),

    #[error("asset {0} cannot be bought with the stable token")]
    Unresolvable(Address),
}

/// Check an allocation list before any funds move
///
/// `resolvable` decides whether an asset can be traded against the stable
/// token. Checks run in list order, so the first offending entry is
/// reported.
pub fn validate_allocations(
    allocations: &[Allocation],
    max_assets: usize,
    resolvable: impl Fn(Address) -> bool,
) -> Result<(), AllocationIssue> {
    if allocations.is_empty() {
        return Err(AllocationIssue::Empty);
    }
    if allocations.len() > max_assets {
        return Err(AllocationIssue::TooMany {
            count: allocations.len(),
            max: max_assets,
        });
    }

    let mut seen = BTreeSet::new();
    let mut total: u32 = 0;
    for allocation in allocations {
        if allocation.percentage == 0 {
            return Err(AllocationIssue::ZeroPercentage(allocation.asset));
        }
        if u64::from(allocation.percentage) > PERCENT_SCALE {
            return Err(AllocationIssue::PercentageOutOfRange {
                asset: allocation.asset,
                percentage: allocation.percentage,
            });
        }
        if !seen.insert(allocation.asset) {
            return Err(AllocationIssue::Duplicate(allocation.asset));
        }
        if !resolvable(allocation.asset) {
            return Err(AllocationIssue::Unresolvable(allocation.asset));
        }
        total += u32::from(allocation.percentage);
    }

    if u64::from(total) != PERCENT_SCALE {
        return Err(AllocationIssue::SumNot100(total));
    }
    Ok(())
}
