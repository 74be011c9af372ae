//! [`SwapVenue`] over the in-memory exchange

use smartbasket_common::{Address, Amount, SwapVenue, Timestamp, VenueError};

use crate::Exchange;

impl SwapVenue for Exchange {
    type Snapshot = Exchange;

    fn now(&self) -> Timestamp {
        Exchange::now(self)
    }

    fn router(&self) -> Address {
        self.router
    }

    fn is_listed(&self, token: Address) -> bool {
        self.tokens.is_listed(token)
    }

    fn has_pair(&self, a: Address, b: Address) -> bool {
        self.pair(a, b).is_some()
    }

    fn balance_of(&self, token: Address, account: Address) -> Amount {
        self.tokens.balance_of(token, account)
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.tokens.allowance(token, owner, spender)
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), VenueError> {
        Ok(self.tokens.approve(token, owner, spender, amount)?)
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), VenueError> {
        Ok(self.tokens.transfer(token, from, to, amount)?)
    }

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), VenueError> {
        Ok(self.tokens.transfer_from(token, spender, from, to, amount)?)
    }

    fn get_amounts_out(&self, amount_in: Amount, path: &[Address]) -> Result<Vec<Amount>, VenueError> {
        Exchange::get_amounts_out(self, amount_in, path)
    }

    fn swap_exact_tokens_for_tokens(
        &mut self,
        trader: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<Amount>, VenueError> {
        Exchange::swap_exact_tokens_for_tokens(self, trader, amount_in, amount_out_min, path, to, deadline)
    }

    fn snapshot(&self) -> Exchange {
        self.clone()
    }

    fn restore(&mut self, snapshot: Exchange) {
        *self = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbasket_common::derive_address;
    use smartbasket_token::whole_tokens;

    fn through_trait<V: SwapVenue>(venue: &mut V, token: Address, from: Address, to: Address) {
        let snapshot = venue.snapshot();
        venue.transfer(token, from, to, whole_tokens(5)).unwrap();
        assert_eq!(venue.balance_of(token, to), whole_tokens(5));
        venue.restore(snapshot);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut ex = Exchange::new(0);
        let usdt = ex.register_token("USDT", "Tether USD", Amount::ZERO).unwrap();
        let alice = derive_address("alice");
        let bob = derive_address("bob");
        ex.mint(usdt, alice, whole_tokens(10)).unwrap();

        through_trait(&mut ex, usdt, alice, bob);

        assert_eq!(SwapVenue::balance_of(&ex, usdt, bob), Amount::ZERO);
        assert_eq!(SwapVenue::balance_of(&ex, usdt, alice), whole_tokens(10));
    }

    #[test]
    fn test_router_is_spender() {
        let ex = Exchange::new(0);
        assert_eq!(SwapVenue::router(&ex), derive_address(crate::DEFAULT_ROUTER_LABEL));
        assert!(!SwapVenue::has_pair(&ex, derive_address("a"), derive_address("b")));
    }
}
