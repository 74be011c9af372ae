//! Constant product pair

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use smartbasket_common::{Address, Amount, Timestamp, VenueError};
use smartbasket_token::TokenLedger;

use crate::math;

/// Holder of the permanently locked minimum liquidity
pub const LOCKED_LIQUIDITY_HOLDER: Address = Address::ZERO;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub address: Address,
    /// Lower-sorted token
    pub token0: Address,
    pub token1: Address,
    pub reserve0: Amount,
    pub reserve1: Amount,
    pub fee_bps: u64,
    pub block_timestamp_last: Timestamp,
    /// Outstanding LP shares
    pub total_supply: Amount,
    lp_balances: BTreeMap<Address, Amount>,
}

impl Pair {
    pub fn new(address: Address, token0: Address, token1: Address, fee_bps: u64) -> Self {
        Self {
            address,
            token0,
            token1,
            reserve0: Amount::ZERO,
            reserve1: Amount::ZERO,
            fee_bps,
            block_timestamp_last: 0,
            total_supply: Amount::ZERO,
            lp_balances: BTreeMap::new(),
        }
    }

    pub fn contains(&self, token: Address) -> bool {
        token == self.token0 || token == self.token1
    }

    /// `(reserve_in, reserve_out)` when trading `token_in` into this pair
    pub fn reserves_for(&self, token_in: Address) -> Result<(Amount, Amount), VenueError> {
        if token_in == self.token0 {
            Ok((self.reserve0, self.reserve1))
        } else if token_in == self.token1 {
            Ok((self.reserve1, self.reserve0))
        } else {
            Err(VenueError::InvalidPath)
        }
    }

    pub fn lp_balance_of(&self, holder: Address) -> Amount {
        self.lp_balances.get(&holder).copied().unwrap_or(Amount::ZERO)
    }

    fn credit_lp(&mut self, holder: Address, amount: Amount) -> Result<(), VenueError> {
        let balance = self
            .lp_balance_of(holder)
            .checked_add(amount)
            .ok_or(VenueError::Overflow)?;
        self.lp_balances.insert(holder, balance);
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(VenueError::Overflow)?;
        Ok(())
    }

    fn balances(&self, tokens: &TokenLedger) -> (Amount, Amount) {
        (
            tokens.balance_of(self.token0, self.address),
            tokens.balance_of(self.token1, self.address),
        )
    }

    fn update(&mut self, balance0: Amount, balance1: Amount, now: Timestamp) {
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        self.block_timestamp_last = now;
    }

    /// Mint LP shares for whatever has been transferred in since the last sync
    pub fn mint(
        &mut self,
        tokens: &TokenLedger,
        to: Address,
        now: Timestamp,
    ) -> Result<Amount, VenueError> {
        let (balance0, balance1) = self.balances(tokens);
        let amount0 = balance0
            .checked_sub(self.reserve0)
            .ok_or(VenueError::InvariantViolated)?;
        let amount1 = balance1
            .checked_sub(self.reserve1)
            .ok_or(VenueError::InvariantViolated)?;

        let liquidity = if self.total_supply.is_zero() {
            let liquidity = math::initial_liquidity(amount0, amount1)?;
            self.credit_lp(LOCKED_LIQUIDITY_HOLDER, Amount::from(math::MINIMUM_LIQUIDITY))?;
            liquidity
        } else {
            math::proportional_liquidity(
                amount0,
                amount1,
                self.reserve0,
                self.reserve1,
                self.total_supply,
            )?
        };

        self.credit_lp(to, liquidity)?;
        self.update(balance0, balance1, now);
        debug!(
            "pair {}: minted {} LP to {} (reserves {} / {})",
            self.address, liquidity, to, self.reserve0, self.reserve1
        );
        Ok(liquidity)
    }

    /// Burn `liquidity` of `owner`'s shares and pay both tokens to `to`
    pub fn burn(
        &mut self,
        tokens: &mut TokenLedger,
        owner: Address,
        liquidity: Amount,
        to: Address,
        now: Timestamp,
    ) -> Result<(Amount, Amount), VenueError> {
        let held = self.lp_balance_of(owner);
        if held < liquidity {
            return Err(VenueError::InsufficientBalance {
                token: self.address,
                account: owner,
                have: held,
                need: liquidity,
            });
        }

        let (balance0, balance1) = self.balances(tokens);
        let (amount0, amount1) =
            math::burn_amounts(liquidity, self.total_supply, balance0, balance1)?;

        self.lp_balances.insert(owner, held - liquidity);
        self.total_supply -= liquidity;

        tokens.transfer(self.token0, self.address, to, amount0)?;
        tokens.transfer(self.token1, self.address, to, amount1)?;

        let (balance0, balance1) = self.balances(tokens);
        self.update(balance0, balance1, now);
        Ok((amount0, amount1))
    }

    /// Pay out the requested amounts and verify the input covers them
    ///
    /// Input must already have been transferred to the pair; the balance
    /// difference is what counts as paid in.
    pub fn swap(
        &mut self,
        tokens: &mut TokenLedger,
        amount0_out: Amount,
        amount1_out: Amount,
        to: Address,
        now: Timestamp,
    ) -> Result<(), VenueError> {
        if amount0_out.is_zero() && amount1_out.is_zero() {
            return Err(VenueError::ZeroAmount);
        }
        if amount0_out >= self.reserve0 || amount1_out >= self.reserve1 {
            return Err(VenueError::Amm(math::AmmError::InsufficientLiquidity));
        }
        if to == self.token0 || to == self.token1 {
            return Err(VenueError::InvalidPath);
        }

        if !amount0_out.is_zero() {
            tokens.transfer(self.token0, self.address, to, amount0_out)?;
        }
        if !amount1_out.is_zero() {
            tokens.transfer(self.token1, self.address, to, amount1_out)?;
        }

        let (balance0, balance1) = self.balances(tokens);
        let amount0_in = balance0.saturating_sub(self.reserve0 - amount0_out);
        let amount1_in = balance1.saturating_sub(self.reserve1 - amount1_out);
        if amount0_in.is_zero() && amount1_in.is_zero() {
            return Err(VenueError::ZeroAmount);
        }

        if !math::k_holds(
            balance0,
            balance1,
            amount0_in,
            amount1_in,
            self.reserve0,
            self.reserve1,
            self.fee_bps,
        )? {
            return Err(VenueError::InvariantViolated);
        }

        self.update(balance0, balance1, now);
        Ok(())
    }

    /// Force reserves to match balances
    pub fn sync(&mut self, tokens: &TokenLedger, now: Timestamp) {
        let (balance0, balance1) = self.balances(tokens);
        self.update(balance0, balance1, now);
    }
}
