//! Uniswap-V2 style pairs and the factory that creates them
//!
//! A [`Pair`] keeps its token balances in the shared [`TokenLedger`] under its
//! own address and caches reserves, exactly as the on-chain pair contract
//! does. All pricing comes from [`math`].

pub mod factory;
pub mod math;
pub mod pair;

pub use factory::{pair_address, sort_tokens, Factory};
pub use pair::Pair;

pub use smartbasket_token::TokenLedger;
