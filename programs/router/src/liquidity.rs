//! Add and remove liquidity (Router02 `addLiquidity` / `removeLiquidity`)

use log::info;
use smartbasket_amm::math;
use smartbasket_common::{Address, Amount, Timestamp, VenueError};

use crate::Exchange;

/// Amounts actually deposited by [`Exchange::add_liquidity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityReceipt {
    pub amount_a: Amount,
    pub amount_b: Amount,
    pub liquidity: Amount,
}

/// Token amounts and LP bounds for one deposit
#[derive(Debug, Clone, Copy)]
pub struct AddLiquidity {
    pub token_a: Address,
    pub token_b: Address,
    pub amount_a_desired: Amount,
    pub amount_b_desired: Amount,
    pub amount_a_min: Amount,
    pub amount_b_min: Amount,
}

impl Exchange {
    fn optimal_amounts(&self, params: &AddLiquidity) -> Result<(Amount, Amount), VenueError> {
        let (reserve_a, reserve_b) = self.get_reserves(params.token_a, params.token_b)?;
        if reserve_a.is_zero() && reserve_b.is_zero() {
            return Ok((params.amount_a_desired, params.amount_b_desired));
        }

        let amount_b_optimal = math::quote(params.amount_a_desired, reserve_a, reserve_b)?;
        if amount_b_optimal <= params.amount_b_desired {
            if amount_b_optimal < params.amount_b_min {
                return Err(VenueError::InsufficientAmount {
                    token: params.token_b,
                    amount: amount_b_optimal,
                    amount_min: params.amount_b_min,
                });
            }
            return Ok((params.amount_a_desired, amount_b_optimal));
        }

        let amount_a_optimal = math::quote(params.amount_b_desired, reserve_b, reserve_a)?;
        if amount_a_optimal > params.amount_a_desired {
            return Err(VenueError::InvariantViolated);
        }
        if amount_a_optimal < params.amount_a_min {
            return Err(VenueError::InsufficientAmount {
                token: params.token_a,
                amount: amount_a_optimal,
                amount_min: params.amount_a_min,
            });
        }
        Ok((amount_a_optimal, params.amount_b_desired))
    }

    /// Deposit both tokens at the current ratio and mint LP shares to `to`
    ///
    /// Creates the pair on first use. `provider` must have approved the router
    /// for both tokens.
    pub fn add_liquidity(
        &mut self,
        provider: Address,
        params: AddLiquidity,
        to: Address,
        deadline: Timestamp,
    ) -> Result<LiquidityReceipt, VenueError> {
        self.transact(|ex| {
            ex.ensure(deadline)?;
            if ex.pair(params.token_a, params.token_b).is_none() {
                ex.create_pair(params.token_a, params.token_b)?;
            }

            let (amount_a, amount_b) = ex.optimal_amounts(&params)?;
            let router = ex.router;
            let now = ex.now();
            let pair = ex
                .factory
                .get_pair_mut(params.token_a, params.token_b)
                .ok_or(VenueError::PairNotFound(params.token_a, params.token_b))?;

            ex.tokens
                .transfer_from(params.token_a, router, provider, pair.address, amount_a)?;
            ex.tokens
                .transfer_from(params.token_b, router, provider, pair.address, amount_b)?;
            let liquidity = pair.mint(&ex.tokens, to, now)?;

            info!(
                "liquidity added: {} + {} -> {} LP for {}",
                amount_a, amount_b, liquidity, to
            );
            Ok(LiquidityReceipt {
                amount_a,
                amount_b,
                liquidity,
            })
        })
    }

    /// Burn `liquidity` of `provider`'s LP shares and pay both tokens to `to`
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity(
        &mut self,
        provider: Address,
        token_a: Address,
        token_b: Address,
        liquidity: Amount,
        amount_a_min: Amount,
        amount_b_min: Amount,
        to: Address,
        deadline: Timestamp,
    ) -> Result<(Amount, Amount), VenueError> {
        self.transact(|ex| {
            ex.ensure(deadline)?;
            let now = ex.now();
            let pair = ex
                .factory
                .get_pair_mut(token_a, token_b)
                .ok_or(VenueError::PairNotFound(token_a, token_b))?;

            let (amount0, amount1) = pair.burn(&mut ex.tokens, provider, liquidity, to, now)?;
            let (amount_a, amount_b) = if token_a == pair.token0 {
                (amount0, amount1)
            } else {
                (amount1, amount0)
            };

            if amount_a < amount_a_min {
                return Err(VenueError::InsufficientAmount {
                    token: token_a,
                    amount: amount_a,
                    amount_min: amount_a_min,
                });
            }
            if amount_b < amount_b_min {
                return Err(VenueError::InsufficientAmount {
                    token: token_b,
                    amount: amount_b,
                    amount_min: amount_b_min,
                });
            }

            info!("liquidity removed: {} LP -> {} + {}", liquidity, amount_a, amount_b);
            Ok((amount_a, amount_b))
        })
    }

    /// LP shares `holder` owns in the `a`/`b` pair
    pub fn lp_balance_of(&self, a: Address, b: Address, holder: Address) -> Amount {
        self.pair(a, b)
            .map(|pair| pair.lp_balance_of(holder))
            .unwrap_or(Amount::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartbasket_common::derive_address;
    use smartbasket_token::whole_tokens;

    fn funded(ex: &mut Exchange, who: Address) -> (Address, Address) {
        let usdt = ex.register_token("USDT", "Tether USD", Amount::ZERO).unwrap();
        let eth = ex.register_token("ETH", "Ether", Amount::ZERO).unwrap();
        for token in [usdt, eth] {
            ex.mint(token, who, whole_tokens(10_000_000)).unwrap();
            ex.tokens.approve(token, who, ex.router, Amount::MAX).unwrap();
        }
        (usdt, eth)
    }

    fn deposit(usdt: Address, eth: Address, usdt_amount: u64, eth_amount: u64) -> AddLiquidity {
        AddLiquidity {
            token_a: usdt,
            token_b: eth,
            amount_a_desired: whole_tokens(usdt_amount),
            amount_b_desired: whole_tokens(eth_amount),
            amount_a_min: Amount::ZERO,
            amount_b_min: Amount::ZERO,
        }
    }

    #[test]
    fn test_add_liquidity_creates_pair() {
        let mut ex = Exchange::new(0);
        let lp = derive_address("lp");
        let (usdt, eth) = funded(&mut ex, lp);

        let receipt = ex.add_liquidity(lp, deposit(usdt, eth, 250_000, 100), lp, 10).unwrap();

        assert_eq!(receipt.amount_a, whole_tokens(250_000));
        assert_eq!(receipt.amount_b, whole_tokens(100));
        assert_eq!(
            ex.get_reserves(usdt, eth).unwrap(),
            (whole_tokens(250_000), whole_tokens(100))
        );
        assert_eq!(ex.lp_balance_of(usdt, eth, lp), receipt.liquidity);
    }

    #[test]
    fn test_second_deposit_uses_pool_ratio() {
        let mut ex = Exchange::new(0);
        let lp = derive_address("lp");
        let (usdt, eth) = funded(&mut ex, lp);
        ex.add_liquidity(lp, deposit(usdt, eth, 250_000, 100), lp, 10).unwrap();

        // Over-supplying ETH only takes the amount the ratio needs
        let receipt = ex.add_liquidity(lp, deposit(usdt, eth, 2_500, 5), lp, 10).unwrap();
        assert_eq!(receipt.amount_a, whole_tokens(2_500));
        assert_eq!(receipt.amount_b, whole_tokens(1));
    }

    #[test]
    fn test_add_liquidity_min_amount() {
        let mut ex = Exchange::new(0);
        let lp = derive_address("lp");
        let (usdt, eth) = funded(&mut ex, lp);
        ex.add_liquidity(lp, deposit(usdt, eth, 250_000, 100), lp, 10).unwrap();

        let mut params = deposit(usdt, eth, 2_500, 5);
        params.amount_b_min = whole_tokens(2);
        let before = ex.clone();

        let result = ex.add_liquidity(lp, params, lp, 10);
        assert!(matches!(result, Err(VenueError::InsufficientAmount { .. })));
        assert_eq!(ex, before);
    }

    #[test]
    fn test_add_liquidity_expired() {
        let mut ex = Exchange::new(100);
        let lp = derive_address("lp");
        let (usdt, eth) = funded(&mut ex, lp);

        let result = ex.add_liquidity(lp, deposit(usdt, eth, 100, 100), lp, 99);
        assert!(matches!(result, Err(VenueError::Expired { .. })));
        assert!(ex.pair(usdt, eth).is_none());
    }

    #[test]
    fn test_remove_liquidity_round_trip() {
        let mut ex = Exchange::new(0);
        let lp = derive_address("lp");
        let (usdt, eth) = funded(&mut ex, lp);
        let receipt = ex.add_liquidity(lp, deposit(usdt, eth, 1_000, 1_000), lp, 10).unwrap();

        let (a, b) = ex
            .remove_liquidity(lp, usdt, eth, receipt.liquidity, Amount::ZERO, Amount::ZERO, lp, 10)
            .unwrap();

        assert!(a < whole_tokens(1_000) && a > whole_tokens(999));
        assert!(b < whole_tokens(1_000) && b > whole_tokens(999));
        assert_eq!(ex.lp_balance_of(usdt, eth, lp), Amount::ZERO);
    }
}
