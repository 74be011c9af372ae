//! Basket engine
//!
//! [`BasketEngine`] holds custody of every basket's assets under its own
//! account and keeps the per-owner ledger. Owners fund a purchase by
//! approving the engine for the stable token; the engine pulls exactly the
//! planned spend, swaps through the venue's router and records the result.
//!
//! Create and sell are single units of work: the venue is snapshotted before
//! the first transfer and restored if any leg fails, so an owner never ends
//! up with a half-bought or half-sold basket.

use std::collections::BTreeMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use smartbasket_common::{derive_address, Address, Amount, SwapVenue, Timestamp};

use crate::allocation::{validate_allocations, Allocation, DEFAULT_MAX_ASSETS};
use crate::error::BasketError;
use crate::ledger::{Basket, BasketId, BasketLedger};
use crate::liquidation::{execute_liquidation, plan_liquidation};
use crate::planner::{execute_acquisition, plan_acquisition, SwapGuard};
use crate::valuation::{value_basket, AssetValue, BasketValuation};

pub const DEFAULT_ENGINE_LABEL: &str = "SmartBasket";

/// 1%
pub const DEFAULT_SLIPPAGE_BPS: u64 = 100;

/// Ten minutes, as the deployment scripts use
pub const DEFAULT_DEADLINE_SECS: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_assets: usize,
    pub default_slippage_bps: u64,
    pub deadline_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_assets: DEFAULT_MAX_ASSETS,
            default_slippage_bps: DEFAULT_SLIPPAGE_BPS,
            deadline_secs: DEFAULT_DEADLINE_SECS,
        }
    }
}

impl EngineConfig {
    /// Guard with the default tolerance and a deadline `deadline_secs` after `now`
    pub fn guard(&self, now: Timestamp) -> SwapGuard {
        SwapGuard::new(self.default_slippage_bps, now.saturating_add(self.deadline_secs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum BasketEvent {
    BasketCreated {
        owner: Address,
        id: BasketId,
        /// Amount the owner submitted
        total: Amount,
        /// Amount actually pulled, `total` less dust
        invested: Amount,
        at: Timestamp,
    },
    BasketSold {
        owner: Address,
        id: BasketId,
        proceeds: Amount,
        at: Timestamp,
    },
}

impl BasketEvent {
    pub fn owner(&self) -> Address {
        match self {
            BasketEvent::BasketCreated { owner, .. } | BasketEvent::BasketSold { owner, .. } => *owner,
        }
    }
}

/// Token whose engine balance is below what live baskets claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyShortfall {
    pub token: Address,
    pub held: Amount,
    pub owed: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEngine {
    /// Custody account; owners approve this address
    pub account: Address,
    pub stable: Address,
    pub config: EngineConfig,
    ledger: BasketLedger,
    events: Vec<BasketEvent>,
}

fn unit_of_work<V: SwapVenue, R>(
    venue: &mut V,
    op: impl FnOnce(&mut V) -> Result<R, BasketError>,
) -> Result<R, BasketError> {
    let snapshot = venue.snapshot();
    match op(venue) {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!("basket operation rolled back: {}", err);
            venue.restore(snapshot);
            Err(err)
        }
    }
}

impl BasketEngine {
    pub fn new(stable: Address, config: EngineConfig) -> Self {
        Self {
            account: derive_address(DEFAULT_ENGINE_LABEL),
            stable,
            config,
            ledger: BasketLedger::new(),
            events: Vec::new(),
        }
    }

    /// Whether `asset` can be bought with the stable token on `venue`
    pub fn is_resolvable<V: SwapVenue>(&self, venue: &V, asset: Address) -> bool {
        asset != self.stable && venue.is_listed(asset) && venue.has_pair(self.stable, asset)
    }

    /// Buy a new basket for `owner` with up to `total` stable units
    ///
    /// Only the sum of the truncated per-asset spends is pulled from the
    /// owner and recorded as invested.
    pub fn create_basket<V: SwapVenue>(
        &mut self,
        venue: &mut V,
        owner: Address,
        allocations: &[Allocation],
        total: Amount,
        guard: SwapGuard,
    ) -> Result<BasketId, BasketError> {
        guard.check(venue.now())?;
        let listed: &V = venue;
        validate_allocations(allocations, self.config.max_assets, |asset| {
            self.is_resolvable(listed, asset)
        })?;
        if total.is_zero() {
            return Err(BasketError::InvalidAmount(total));
        }

        let plan = plan_acquisition(venue, self.stable, allocations, total, &guard)?;
        let (account, stable) = (self.account, self.stable);
        let holdings = unit_of_work(venue, |venue| {
            venue.transfer_from(stable, account, owner, account, plan.spent)?;
            execute_acquisition(venue, account, stable, &plan, guard.deadline)
        })?;

        let now = venue.now();
        let id = self.ledger.append(Basket {
            id: BasketId(0),
            owner,
            holdings,
            invested: plan.spent,
            created_at: now,
        });
        self.events.push(BasketEvent::BasketCreated {
            owner,
            id,
            total,
            invested: plan.spent,
            at: now,
        });
        info!(
            "basket {} created for {}: {} assets, invested {} (dust {})",
            id,
            owner,
            allocations.len(),
            plan.spent,
            plan.dust()
        );
        Ok(id)
    }

    /// Sell every holding of basket `id` and pay the stable proceeds to `owner`
    pub fn sell_basket<V: SwapVenue>(
        &mut self,
        venue: &mut V,
        owner: Address,
        id: BasketId,
        guard: SwapGuard,
    ) -> Result<Amount, BasketError> {
        guard.check(venue.now())?;
        let basket = self.ledger.get(owner, id)?;
        let legs = plan_liquidation(venue, self.stable, basket, &guard)?;

        let (account, stable) = (self.account, self.stable);
        let proceeds = unit_of_work(venue, |venue| {
            let proceeds = execute_liquidation(venue, account, stable, &legs, guard.deadline)?;
            venue.transfer(stable, account, owner, proceeds)?;
            Ok(proceeds)
        })?;

        self.ledger.remove(owner, id)?;
        self.events.push(BasketEvent::BasketSold {
            owner,
            id,
            proceeds,
            at: venue.now(),
        });
        info!("basket {} sold for {}: proceeds {}", id, owner, proceeds);
        Ok(proceeds)
    }

    pub fn user_baskets(&self, owner: Address) -> Vec<&Basket> {
        self.ledger.list_for(owner)
    }

    pub fn basket(&self, owner: Address, id: BasketId) -> Result<&Basket, BasketError> {
        self.ledger.get(owner, id)
    }

    pub fn valuation<V: SwapVenue>(
        &self,
        venue: &V,
        owner: Address,
        id: BasketId,
    ) -> Result<BasketValuation, BasketError> {
        value_basket(venue, self.stable, self.ledger.get(owner, id)?)
    }

    pub fn basket_total_value<V: SwapVenue>(
        &self,
        venue: &V,
        owner: Address,
        id: BasketId,
    ) -> Result<Amount, BasketError> {
        Ok(self.valuation(venue, owner, id)?.total_value)
    }

    pub fn basket_asset_details<V: SwapVenue>(
        &self,
        venue: &V,
        owner: Address,
        id: BasketId,
    ) -> Result<Vec<AssetValue>, BasketError> {
        Ok(self.valuation(venue, owner, id)?.assets)
    }

    /// Combined value of all of `owner`'s baskets
    pub fn portfolio_value<V: SwapVenue>(&self, venue: &V, owner: Address) -> Result<Amount, BasketError> {
        let mut total = Amount::ZERO;
        for basket in self.ledger.list_for(owner) {
            let value = value_basket(venue, self.stable, basket)?.total_value;
            total = total.checked_add(value).ok_or(BasketError::InvalidAmount(value))?;
        }
        Ok(total)
    }

    pub fn events(&self) -> &[BasketEvent] {
        &self.events
    }

    pub fn events_for(&self, owner: Address) -> impl Iterator<Item = &BasketEvent> {
        self.events.iter().filter(move |e| e.owner() == owner)
    }

    pub fn ledger(&self) -> &BasketLedger {
        &self.ledger
    }

    /// Tokens the custody account holds less of than live baskets claim
    pub fn custody_shortfalls<V: SwapVenue>(&self, venue: &V) -> Vec<CustodyShortfall> {
        let mut owed: BTreeMap<Address, Amount> = BTreeMap::new();
        for holding in self.ledger.iter().flat_map(|b| b.holdings.iter()) {
            let entry = owed.entry(holding.asset).or_default();
            *entry = entry.saturating_add(holding.quantity);
        }

        owed.into_iter()
            .filter_map(|(token, owed)| {
                let held = venue.balance_of(token, self.account);
                (held < owed).then_some(CustodyShortfall { token, held, owed })
            })
            .collect()
    }
}
