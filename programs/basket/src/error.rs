//! Basket engine errors

use smartbasket_common::{Address, Amount, Timestamp, VenueError};
use thiserror::Error;

use crate::allocation::AllocationIssue;
use crate::ledger::BasketId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BasketError {
    #[error("invalid allocation: {0}")]
    InvalidAllocation(#[from] AllocationIssue),

    /// Stale or foreign basket reference
    #[error("unknown basket {id} for {owner}")]
    UnknownBasket { owner: Address, id: BasketId },

    #[error("insufficient allowance of {token}: approved {approved}, need {need}")]
    InsufficientAllowance {
        token: Address,
        approved: Amount,
        need: Amount,
    },

    #[error("insufficient balance of {token}: have {have}, need {need}")]
    InsufficientBalance {
        token: Address,
        have: Amount,
        need: Amount,
    },

    #[error("swap expired: deadline {deadline}, now {now}")]
    SwapExpired { deadline: Timestamp, now: Timestamp },

    #[error("insufficient output: got {amount_out}, minimum {amount_out_min}")]
    InsufficientOutput {
        amount_out: Amount,
        amount_out_min: Amount,
    },

    #[error("slippage bound {0} bps must be below 10000")]
    InvalidSlippage(u64),

    #[error("amount {0} is too small to fund every allocation")]
    InvalidAmount(Amount),

    #[error("venue: {0}")]
    Venue(VenueError),
}

impl BasketError {
    /// Whether resubmitting the same request can succeed
    ///
    /// Expired deadlines and slippage misses depend on the moment of
    /// submission; everything else needs different input or an approval.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BasketError::SwapExpired { .. } | BasketError::InsufficientOutput { .. }
        )
    }

    /// Short operator hint for the error class
    pub fn hint(&self) -> &'static str {
        match self {
            BasketError::InvalidAllocation(_) => "fix the allocation list",
            BasketError::UnknownBasket { .. } => "list baskets to get a live id",
            BasketError::InsufficientAllowance { .. } => "approve the basket engine first",
            BasketError::InsufficientBalance { .. } => "fund the account first",
            BasketError::SwapExpired { .. } => "retry with a fresh deadline",
            BasketError::InsufficientOutput { .. } => "retry with a wider slippage tolerance",
            BasketError::InvalidSlippage(_) => "use a slippage bound below 10000 bps",
            BasketError::InvalidAmount(_) => "increase the amount",
            BasketError::Venue(_) => "check the exchange state",
        }
    }
}

impl From<VenueError> for BasketError {
    fn from(err: VenueError) -> Self {
        match err {
            VenueError::Expired { deadline, now } => BasketError::SwapExpired { deadline, now },
            VenueError::InsufficientOutputAmount {
                amount_out,
                amount_out_min,
            } => BasketError::InsufficientOutput {
                amount_out,
                amount_out_min,
            },
            VenueError::InsufficientAllowance {
                token,
                approved,
                need,
                ..
            } => BasketError::InsufficientAllowance {
                token,
                approved,
                need,
            },
            VenueError::InsufficientBalance {
                token, have, need, ..
            } => BasketError::InsufficientBalance { token, have, need },
            other => BasketError::Venue(other),
        }
    }
}
