//! Per-owner basket ledger

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smartbasket_common::{Address, Amount, Timestamp};

use crate::error::BasketError;

/// Stable basket reference, never reused after removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketId(pub u64);

impl fmt::Display for BasketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One asset position inside a basket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub asset: Address,
    pub percentage: u8,
    /// Asset units held in custody for the basket
    pub quantity: Amount,
    /// Stable units spent acquiring `quantity`
    pub cost: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    pub id: BasketId,
    pub owner: Address,
    pub holdings: Vec<Holding>,
    /// Stable units actually debited from the owner
    pub invested: Amount,
    pub created_at: Timestamp,
}

impl Basket {
    pub fn token_count(&self) -> usize {
        self.holdings.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketLedger {
    next_id: u64,
    /// owner -> id -> basket; ids grow monotonically so map order is insertion order
    baskets: BTreeMap<Address, BTreeMap<BasketId, Basket>>,
}

impl BasketLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `basket` under a fresh id and return it
    pub fn append(&mut self, mut basket: Basket) -> BasketId {
        let id = BasketId(self.next_id);
        self.next_id += 1;
        basket.id = id;
        self.baskets.entry(basket.owner).or_default().insert(id, basket);
        id
    }

    pub fn remove(&mut self, owner: Address, id: BasketId) -> Result<Basket, BasketError> {
        let owned = self
            .baskets
            .get_mut(&owner)
            .ok_or(BasketError::UnknownBasket { owner, id })?;
        let basket = owned
            .remove(&id)
            .ok_or(BasketError::UnknownBasket { owner, id })?;
        if owned.is_empty() {
            self.baskets.remove(&owner);
        }
        Ok(basket)
    }

    pub fn get(&self, owner: Address, id: BasketId) -> Result<&Basket, BasketError> {
        self.baskets
            .get(&owner)
            .and_then(|owned| owned.get(&id))
            .ok_or(BasketError::UnknownBasket { owner, id })
    }

    /// `owner`'s live baskets in creation order
    pub fn list_for(&self, owner: Address) -> Vec<&Basket> {
        self.baskets
            .get(&owner)
            .map(|owned| owned.values().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Basket> {
        self.baskets.values().flat_map(|owned| owned.values())
    }

    pub fn len(&self) -> usize {
        self.baskets.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }
}
