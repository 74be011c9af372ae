//! SmartBasket engine
//!
//! Baskets are fixed-percentage bundles of assets bought with a stable token.
//! The engine validates allocations, plans and executes the purchases, keeps
//! the per-owner ledger, values baskets at live quotes and liquidates them
//! back into the stable token. It is generic over [`SwapVenue`], so the same
//! code runs against the in-memory exchange and against test doubles.
//!
//! [`SwapVenue`]: smartbasket_common::SwapVenue

pub mod allocation;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod liquidation;
pub mod planner;
pub mod valuation;

pub use allocation::{validate_allocations, Allocation, AllocationIssue, DEFAULT_MAX_ASSETS};
pub use engine::{
    BasketEngine, BasketEvent, CustodyShortfall, EngineConfig, DEFAULT_DEADLINE_SECS,
    DEFAULT_ENGINE_LABEL, DEFAULT_SLIPPAGE_BPS,
};
pub use error::BasketError;
pub use ledger::{Basket, BasketId, BasketLedger, Holding};
pub use liquidation::LiquidationLeg;
pub use planner::{plan_spends, AcquisitionPlan, PlannedLeg, SwapGuard};
pub use valuation::{AssetValue, BasketValuation};
