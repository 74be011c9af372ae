//! Path quotes and swaps

use log::{debug, info};
use smartbasket_amm::{math, pair_address, sort_tokens};
use smartbasket_common::{Address, Amount, Timestamp, VenueError};

use crate::Exchange;

impl Exchange {
    fn hop_reserves(&self, input: Address, output: Address) -> Result<(Amount, Amount), VenueError> {
        let pair = self
            .pair(input, output)
            .ok_or(VenueError::PairNotFound(input, output))?;
        pair.reserves_for(input)
    }

    fn fee_bps(&self, input: Address, output: Address) -> u64 {
        self.pair(input, output)
            .map(|pair| pair.fee_bps)
            .unwrap_or(math::DEFAULT_FEE_BPS)
    }

    /// Amounts along `path` for an exact input; `amounts[0] == amount_in`
    pub fn get_amounts_out(&self, amount_in: Amount, path: &[Address]) -> Result<Vec<Amount>, VenueError> {
        if path.len() < 2 {
            return Err(VenueError::InvalidPath);
        }

        let mut amounts = Vec::with_capacity(path.len());
        amounts.push(amount_in);
        let mut amount = amount_in;
        for hop in path.windows(2) {
            let (reserve_in, reserve_out) = self.hop_reserves(hop[0], hop[1])?;
            amount = math::get_amount_out(amount, reserve_in, reserve_out, self.fee_bps(hop[0], hop[1]))?;
            amounts.push(amount);
        }
        Ok(amounts)
    }

    /// Amounts along `path` for an exact output; the last entry is `amount_out`
    pub fn get_amounts_in(&self, amount_out: Amount, path: &[Address]) -> Result<Vec<Amount>, VenueError> {
        if path.len() < 2 {
            return Err(VenueError::InvalidPath);
        }

        let mut amounts = vec![Amount::ZERO; path.len()];
        let last = path.len() - 1;
        amounts[last] = amount_out;
        for i in (1..path.len()).rev() {
            let (reserve_in, reserve_out) = self.hop_reserves(path[i - 1], path[i])?;
            amounts[i - 1] = math::get_amount_in(
                amounts[i],
                reserve_in,
                reserve_out,
                self.fee_bps(path[i - 1], path[i]),
            )?;
        }
        Ok(amounts)
    }

    /// Price of one whole `base` token in `quote` units at the current reserves
    pub fn spot_price(&self, base: Address, quote: Address) -> Result<Amount, VenueError> {
        let (reserve_base, reserve_quote) = self.hop_reserves(base, quote)?;
        let unit = Amount::from(10u64).pow(Amount::from(
            self.tokens
                .info(base)
                .ok_or(VenueError::UnknownToken(base))?
                .decimals,
        ));
        Ok(math::quote(unit, reserve_base, reserve_quote)?)
    }

    /// Execute the hops for precomputed `amounts`
    ///
    /// The input must already sit in the first pair.
    fn execute_path(&mut self, amounts: &[Amount], path: &[Address], to: Address) -> Result<(), VenueError> {
        let now = self.now();
        for i in 0..path.len() - 1 {
            let (input, output) = (path[i], path[i + 1]);
            let (token0, _) = sort_tokens(input, output)?;
            let amount_out = amounts[i + 1];
            let (amount0_out, amount1_out) = if input == token0 {
                (Amount::ZERO, amount_out)
            } else {
                (amount_out, Amount::ZERO)
            };

            let recipient = if i + 2 < path.len() {
                let (next0, next1) = sort_tokens(output, path[i + 2])?;
                pair_address(next0, next1)
            } else {
                to
            };

            let pair = self
                .factory
                .get_pair_mut(input, output)
                .ok_or(VenueError::PairNotFound(input, output))?;
            pair.swap(&mut self.tokens, amount0_out, amount1_out, recipient, now)?;
            debug!("hop {} -> {}: out {}", input, output, amount_out);
        }
        Ok(())
    }

    fn pull_input(&mut self, trader: Address, path: &[Address], amount_in: Amount) -> Result<(), VenueError> {
        let first_pair = self
            .pair(path[0], path[1])
            .ok_or(VenueError::PairNotFound(path[0], path[1]))?
            .address;
        let router = self.router;
        Ok(self
            .tokens
            .transfer_from(path[0], router, trader, first_pair, amount_in)?)
    }

    /// Swap an exact input for as much output as the pools give
    pub fn swap_exact_tokens_for_tokens(
        &mut self,
        trader: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<Amount>, VenueError> {
        self.transact(|ex| {
            ex.ensure(deadline)?;
            if amount_in.is_zero() {
                return Err(VenueError::ZeroAmount);
            }

            let amounts = ex.get_amounts_out(amount_in, path)?;
            let amount_out = amounts[amounts.len() - 1];
            if amount_out < amount_out_min {
                return Err(VenueError::InsufficientOutputAmount {
                    amount_out,
                    amount_out_min,
                });
            }

            ex.pull_input(trader, path, amount_in)?;
            ex.execute_path(&amounts, path, to)?;
            info!("swap {} -> {} ({} hops) for {}", amount_in, amount_out, path.len() - 1, to);
            Ok(amounts)
        })
    }

    /// Swap as little input as needed for an exact output
    pub fn swap_tokens_for_exact_tokens(
        &mut self,
        trader: Address,
        amount_out: Amount,
        amount_in_max: Amount,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<Amount>, VenueError> {
        self.transact(|ex| {
            ex.ensure(deadline)?;
            if amount_out.is_zero() {
                return Err(VenueError::ZeroAmount);
            }

            let amounts = ex.get_amounts_in(amount_out, path)?;
            if amounts[0] > amount_in_max {
                return Err(VenueError::ExcessiveInputAmount {
                    amount_in: amounts[0],
                    amount_in_max,
                });
            }

            ex.pull_input(trader, path, amounts[0])?;
            ex.execute_path(&amounts, path, to)?;
            info!("swap {} -> exact {} for {}", amounts[0], amount_out, to);
            Ok(amounts)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liquidity::AddLiquidity;
    use smartbasket_common::derive_address;
    use smartbasket_token::whole_tokens;

    struct Fixture {
        ex: Exchange,
        usdt: Address,
        eth: Address,
        wbtc: Address,
        trader: Address,
    }

    fn fixture() -> Fixture {
        let mut ex = Exchange::new(1_000);
        let lp = derive_address("lp");
        let trader = derive_address("trader");
        let usdt = ex.register_token("USDT", "Tether USD", Amount::ZERO).unwrap();
        let eth = ex.register_token("ETH", "Ether", Amount::ZERO).unwrap();
        let wbtc = ex.register_token("WBTC", "Wrapped Bitcoin", Amount::ZERO).unwrap();

        for token in [usdt, eth, wbtc] {
            ex.mint(token, lp, whole_tokens(100_000_000)).unwrap();
            ex.mint(token, trader, whole_tokens(100_000)).unwrap();
            ex.tokens.approve(token, lp, ex.router, Amount::MAX).unwrap();
            ex.tokens.approve(token, trader, ex.router, Amount::MAX).unwrap();
        }

        for (token, usdt_amount, amount) in [(eth, 2_500_000, 1_000), (wbtc, 3_000_000, 50)] {
            let params = AddLiquidity {
                token_a: usdt,
                token_b: token,
                amount_a_desired: whole_tokens(usdt_amount),
                amount_b_desired: whole_tokens(amount),
                amount_a_min: Amount::ZERO,
                amount_b_min: Amount::ZERO,
            };
            ex.add_liquidity(lp, params, lp, 2_000).unwrap();
        }

        Fixture { ex, usdt, eth, wbtc, trader }
    }

    #[test]
    fn test_spot_price() {
        let f = fixture();
        assert_eq!(f.ex.spot_price(f.eth, f.usdt).unwrap(), whole_tokens(2_500));
        assert_eq!(f.ex.spot_price(f.wbtc, f.usdt).unwrap(), whole_tokens(60_000));
    }

    #[test]
    fn test_exact_in_swap_matches_quote() {
        let mut f = fixture();
        let path = [f.usdt, f.eth];
        let quoted = f.ex.get_amounts_out(whole_tokens(2_500), &path).unwrap();

        let amounts = f
            .ex
            .swap_exact_tokens_for_tokens(f.trader, whole_tokens(2_500), quoted[1], &path, f.trader, 1_100)
            .unwrap();

        assert_eq!(amounts, quoted);
        assert_eq!(
            f.ex.tokens().balance_of(f.eth, f.trader),
            whole_tokens(100_000) + quoted[1]
        );
        // Price impact + fee: less than one whole ETH
        assert!(quoted[1] < whole_tokens(1));
    }

    #[test]
    fn test_multi_hop_swap() {
        let mut f = fixture();
        let path = [f.eth, f.usdt, f.wbtc];
        let quoted = f.ex.get_amounts_out(whole_tokens(10), &path).unwrap();
        assert_eq!(quoted.len(), 3);

        f.ex.swap_exact_tokens_for_tokens(f.trader, whole_tokens(10), Amount::from(1u64), &path, f.trader, 1_100)
            .unwrap();

        assert_eq!(
            f.ex.tokens().balance_of(f.wbtc, f.trader),
            whole_tokens(100_000) + quoted[2]
        );
    }

    #[test]
    fn test_min_out_enforced_and_reverted() {
        let mut f = fixture();
        let path = [f.usdt, f.eth];
        let quoted = f.ex.get_amounts_out(whole_tokens(2_500), &path).unwrap();
        let before = f.ex.clone();

        let result = f.ex.swap_exact_tokens_for_tokens(
            f.trader,
            whole_tokens(2_500),
            quoted[1] + Amount::from(1u64),
            &path,
            f.trader,
            1_100,
        );

        assert!(matches!(result, Err(VenueError::InsufficientOutputAmount { .. })));
        assert_eq!(f.ex, before);
    }

    #[test]
    fn test_expired_swap() {
        let mut f = fixture();
        let result = f.ex.swap_exact_tokens_for_tokens(
            f.trader,
            whole_tokens(1),
            Amount::from(1u64),
            &[f.usdt, f.eth],
            f.trader,
            999,
        );
        assert_eq!(result, Err(VenueError::Expired { deadline: 999, now: 1_000 }));
    }

    #[test]
    fn test_exact_out_swap() {
        let mut f = fixture();
        let path = [f.usdt, f.eth];
        let needed = f.ex.get_amounts_in(whole_tokens(1), &path).unwrap();

        let amounts = f
            .ex
            .swap_tokens_for_exact_tokens(f.trader, whole_tokens(1), needed[0], &path, f.trader, 1_100)
            .unwrap();

        assert_eq!(amounts[1], whole_tokens(1));
        assert!(amounts[0] > whole_tokens(2_500));

        let result = f.ex.swap_tokens_for_exact_tokens(
            f.trader,
            whole_tokens(1),
            whole_tokens(2_500),
            &path,
            f.trader,
            1_100,
        );
        assert!(matches!(result, Err(VenueError::ExcessiveInputAmount { .. })));
    }

    #[test]
    fn test_missing_pair() {
        let f = fixture();
        let result = f.ex.get_amounts_out(whole_tokens(1), &[f.eth, f.wbtc]);
        assert_eq!(result, Err(VenueError::PairNotFound(f.eth, f.wbtc)));
        assert_eq!(f.ex.get_amounts_out(whole_tokens(1), &[f.eth]), Err(VenueError::InvalidPath));
    }
}
