//! ERC20-style multi-token ledger
//!
//! Holds every listed token's balances, allowances and supply. Pairs, the
//! router and the basket engine all move funds through this ledger, so it is
//! the single source of truth for who owns what.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use smartbasket_common::{derive_address, Address, Amount, VenueError, DEFAULT_DECIMALS, U256};
use thiserror::Error;

/// Whole tokens minted per faucet claim unless a token overrides it
pub const DEFAULT_FAUCET_TOKENS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unknown token {0}")]
    UnknownToken(Address),

    #[error("token {0} is already registered")]
    AlreadyRegistered(String),

    #[error("insufficient balance of {token} for {account}: have {have}, need {need}")]
    InsufficientBalance {
        token: Address,
        account: Address,
        have: Amount,
        need: Amount,
    },

    #[error("insufficient allowance of {token} from {owner} to {spender}: approved {approved}, need {need}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        approved: Amount,
        need: Amount,
    },

    #[error("token {0} has no faucet")]
    FaucetDisabled(Address),

    #[error("arithmetic overflow")]
    Overflow,
}

impl From<TokenError> for VenueError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::UnknownToken(token) | TokenError::FaucetDisabled(token) => {
                VenueError::UnknownToken(token)
            }
            TokenError::InsufficientBalance { token, account, have, need } => {
                VenueError::InsufficientBalance { token, account, have, need }
            }
            TokenError::InsufficientAllowance { token, owner, spender, approved, need } => {
                VenueError::InsufficientAllowance { token, owner, spender, approved, need }
            }
            TokenError::AlreadyRegistered(_) | TokenError::Overflow => VenueError::Overflow,
        }
    }
}

/// Static description of a listed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    /// Amount minted per faucet claim; zero disables the faucet
    pub faucet_amount: Amount,
    pub total_supply: Amount,
}

/// Address a token symbol is deployed at
pub fn token_address(symbol: &str) -> Address {
    derive_address(&format!("token:{symbol}"))
}

/// Whole-token amount in base units for the default 18 decimals
pub fn whole_tokens(tokens: u64) -> Amount {
    U256::from(tokens) * U256::from(10u64).pow(U256::from(DEFAULT_DECIMALS))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenLedger {
    tokens: BTreeMap<Address, TokenInfo>,
    /// token -> account -> balance
    balances: BTreeMap<Address, BTreeMap<Address, Amount>>,
    /// token -> owner -> spender -> allowance
    allowances: BTreeMap<Address, BTreeMap<Address, BTreeMap<Address, Amount>>>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token and return its address
    pub fn register(
        &mut self,
        symbol: &str,
        name: &str,
        faucet_amount: Amount,
    ) -> Result<Address, TokenError> {
        let address = token_address(symbol);
        if self.tokens.contains_key(&address) {
            return Err(TokenError::AlreadyRegistered(symbol.to_string()));
        }

        self.tokens.insert(
            address,
            TokenInfo {
                address,
                symbol: symbol.to_string(),
                name: name.to_string(),
                decimals: DEFAULT_DECIMALS,
                faucet_amount,
                total_supply: Amount::ZERO,
            },
        );
        debug!("registered token {} at {}", symbol, address);
        Ok(address)
    }

    pub fn info(&self, token: Address) -> Option<&TokenInfo> {
        self.tokens.get(&token)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&TokenInfo> {
        self.tokens.values().find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenInfo> {
        self.tokens.values()
    }

    pub fn is_listed(&self, token: Address) -> bool {
        self.tokens.contains_key(&token)
    }

    fn require_listed(&self, token: Address) -> Result<(), TokenError> {
        if self.is_listed(token) {
            Ok(())
        } else {
            Err(TokenError::UnknownToken(token))
        }
    }

    pub fn balance_of(&self, token: Address, account: Address) -> Amount {
        self.balances
            .get(&token)
            .and_then(|accounts| accounts.get(&account))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount {
        self.allowances
            .get(&token)
            .and_then(|owners| owners.get(&owner))
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn set_balance(&mut self, token: Address, account: Address, amount: Amount) {
        let accounts = self.balances.entry(token).or_default();
        if amount.is_zero() {
            accounts.remove(&account);
        } else {
            accounts.insert(account, amount);
        }
    }

    pub fn mint(&mut self, token: Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        let info = self.tokens.get_mut(&token).ok_or(TokenError::UnknownToken(token))?;
        info.total_supply = info
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        let balance = self.balance_of(token, to);
        let updated = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        self.set_balance(token, to, updated);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.require_listed(token)?;

        let have = self.balance_of(token, from);
        if have < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                account: from,
                have,
                need: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        self.set_balance(token, from, have - amount);
        self.set_balance(token, to, credited);
        Ok(())
    }

    /// Set `spender`'s allowance over `owner`'s tokens (overwrites, like ERC20)
    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        self.require_listed(token)?;
        self.allowances
            .entry(token)
            .or_default()
            .entry(owner)
            .or_default()
            .insert(spender, amount);
        Ok(())
    }

    /// Move `owner`'s tokens on behalf of `spender`
    ///
    /// An allowance of `U256::MAX` is treated as unlimited and never decreases.
    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        owner: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let approved = self.allowance(token, owner, spender);
        if approved < amount {
            return Err(TokenError::InsufficientAllowance {
                token,
                owner,
                spender,
                approved,
                need: amount,
            });
        }

        self.transfer(token, owner, to, amount)?;

        if approved != Amount::MAX {
            self.approve(token, owner, spender, approved - amount)?;
        }
        Ok(())
    }

    /// Mint the token's faucet amount to `account` and return it
    pub fn claim_faucet(&mut self, token: Address, account: Address) -> Result<Amount, TokenError> {
        let amount = self
            .info(token)
            .ok_or(TokenError::UnknownToken(token))?
            .faucet_amount;
        if amount.is_zero() {
            return Err(TokenError::FaucetDisabled(token));
        }
        self.mint(token, account, amount)?;
        debug!("faucet: {} of {} to {}", amount, token, account);
        Ok(amount)
    }
}
