//! Human-readable token amounts

use alloy_primitives::utils::{format_units, parse_units, UnitsError};
use thiserror::Error;

use crate::Amount;

/// Decimals used by every token the deployment lists
pub const DEFAULT_DECIMALS: u8 = 18;

#[derive(Debug, Error)]
pub enum AmountError {
    #[error("amount must not be negative: {0}")]
    Negative(String),
    #[error("invalid amount: {0}")]
    Units(#[from] UnitsError),
}

/// Parse `"1.5"` into base units for a token with `decimals` places
pub fn parse_amount(value: &str, decimals: u8) -> Result<Amount, AmountError> {
    let value = value.trim();
    if value.starts_with('-') {
        return Err(AmountError::Negative(value.to_string()));
    }
    Ok(parse_units(value, decimals)?.get_absolute())
}

/// Format base units with trailing zeros trimmed (`1500000000000000000` → `"1.5"`)
pub fn format_amount(amount: Amount, decimals: u8) -> String {
    let Ok(formatted) = format_units(amount, decimals) else {
        return amount.to_string();
    };
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}
