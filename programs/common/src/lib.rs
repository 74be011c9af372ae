//! Shared types for the SmartBasket programs
//!
//! Addresses, amounts, unit conversion, fixed-point helpers and the
//! [`SwapVenue`] seam through which the basket engine reaches the exchange.

pub mod math;
pub mod units;
pub mod venue;

pub use alloy_primitives::{keccak256, Address, I256, U256};
pub use math::*;
pub use units::{format_amount, parse_amount, AmountError, DEFAULT_DECIMALS};
pub use venue::{SwapVenue, VenueError};

/// Token amount in base units (18 decimals for every listed token)
pub type Amount = U256;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// Deterministic address for a named account or contract
///
/// Mirrors how the deployment flow hands out addresses: the same label always
/// maps to the same account, so manifests written by one run resolve in the
/// next.
pub fn derive_address(label: &str) -> Address {
    Address::from_word(keccak256(label.as_bytes()))
}
