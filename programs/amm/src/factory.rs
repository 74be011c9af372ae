//! Pair factory

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};
use smartbasket_common::{keccak256, Address, VenueError};
use smartbasket_token::TokenLedger;

use crate::{math, pair::Pair};

/// Order two tokens the way pairs store them
pub fn sort_tokens(a: Address, b: Address) -> Result<(Address, Address), VenueError> {
    if a == b {
        return Err(VenueError::IdenticalAddresses);
    }
    if a.is_zero() || b.is_zero() {
        return Err(VenueError::InvalidPath);
    }
    Ok(if a < b { (a, b) } else { (b, a) })
}

/// Deterministic pair address for an already-sorted token pair
pub fn pair_address(token0: Address, token1: Address) -> Address {
    let mut material = Vec::with_capacity(44);
    material.extend_from_slice(b"pair");
    material.extend_from_slice(token0.as_slice());
    material.extend_from_slice(token1.as_slice());
    Address::from_word(keccak256(&material))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factory {
    pub address: Address,
    pub fee_bps: u64,
    /// Keyed by pair address
    pairs: BTreeMap<Address, Pair>,
}

impl Factory {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            fee_bps: math::DEFAULT_FEE_BPS,
            pairs: BTreeMap::new(),
        }
    }

    pub fn create_pair(
        &mut self,
        tokens: &TokenLedger,
        a: Address,
        b: Address,
    ) -> Result<Address, VenueError> {
        let (token0, token1) = sort_tokens(a, b)?;
        for token in [token0, token1] {
            if !tokens.is_listed(token) {
                return Err(VenueError::UnknownToken(token));
            }
        }

        let address = pair_address(token0, token1);
        if self.pairs.contains_key(&address) {
            return Err(VenueError::PairExists(token0, token1));
        }

        self.pairs
            .insert(address, Pair::new(address, token0, token1, self.fee_bps));
        info!("pair created: {} / {} at {}", token0, token1, address);
        Ok(address)
    }

    pub fn get_pair(&self, a: Address, b: Address) -> Option<&Pair> {
        let (token0, token1) = sort_tokens(a, b).ok()?;
        self.pairs.get(&pair_address(token0, token1))
    }

    pub fn get_pair_mut(&mut self, a: Address, b: Address) -> Option<&mut Pair> {
        let (token0, token1) = sort_tokens(a, b).ok()?;
        self.pairs.get_mut(&pair_address(token0, token1))
    }

    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.values()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
