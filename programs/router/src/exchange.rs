//! Exchange state and the block clock

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use smartbasket_amm::{Factory, Pair};
use smartbasket_common::{derive_address, Address, Amount, Timestamp, VenueError};
use smartbasket_token::{TokenInfo, TokenLedger};

pub const DEFAULT_ROUTER_LABEL: &str = "UniswapV2Router02";
pub const DEFAULT_FACTORY_LABEL: &str = "UniswapV2Factory";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub router: Address,
    pub(crate) tokens: TokenLedger,
    pub(crate) factory: Factory,
    timestamp: Timestamp,
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Exchange {
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            router: derive_address(DEFAULT_ROUTER_LABEL),
            tokens: TokenLedger::new(),
            factory: Factory::new(derive_address(DEFAULT_FACTORY_LABEL)),
            timestamp,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.timestamp
    }

    /// Move the clock; it never runs backwards
    pub fn set_timestamp(&mut self, timestamp: Timestamp) {
        if timestamp < self.timestamp {
            debug!("ignoring clock rewind {} -> {}", self.timestamp, timestamp);
            return;
        }
        self.timestamp = timestamp;
    }

    pub fn advance(&mut self, secs: u64) {
        self.timestamp = self.timestamp.saturating_add(secs);
    }

    pub fn tokens(&self) -> &TokenLedger {
        &self.tokens
    }

    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    pub fn token_by_symbol(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.by_symbol(symbol)
    }

    pub fn register_token(
        &mut self,
        symbol: &str,
        name: &str,
        faucet_amount: Amount,
    ) -> Result<Address, VenueError> {
        Ok(self.tokens.register(symbol, name, faucet_amount)?)
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<(), VenueError> {
        Ok(self.tokens.mint(token, to, amount)?)
    }

    pub fn claim_faucet(&mut self, token: Address, account: Address) -> Result<Amount, VenueError> {
        Ok(self.tokens.claim_faucet(token, account)?)
    }

    pub fn create_pair(&mut self, a: Address, b: Address) -> Result<Address, VenueError> {
        self.factory.create_pair(&self.tokens, a, b)
    }

    pub fn pair(&self, a: Address, b: Address) -> Option<&Pair> {
        self.factory.get_pair(a, b)
    }

    /// Reserves ordered as `(reserve_a, reserve_b)`
    pub fn get_reserves(&self, a: Address, b: Address) -> Result<(Amount, Amount), VenueError> {
        let pair = self.pair(a, b).ok_or(VenueError::PairNotFound(a, b))?;
        pair.reserves_for(a)
    }

    pub(crate) fn ensure(&self, deadline: Timestamp) -> Result<(), VenueError> {
        if deadline < self.timestamp {
            return Err(VenueError::Expired {
                deadline,
                now: self.timestamp,
            });
        }
        Ok(())
    }

    /// Run `op` as one transaction: on error every change it made is undone
    pub fn transact<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, VenueError>,
    ) -> Result<R, VenueError> {
        let checkpoint = self.clone();
        match op(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("exchange transaction reverted: {}", err);
                *self = checkpoint;
                Err(err)
            }
        }
    }
}
