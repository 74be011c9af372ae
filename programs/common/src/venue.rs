//! Swap venue interface
//!
//! The basket engine never touches reserves directly. Everything it needs from
//! the exchange (token movements, quotes, swaps, the block clock) goes through
//! [`SwapVenue`], which the router implements over its in-memory state.

use amm_model::AmmError;
use thiserror::Error;

use crate::{Address, Amount, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VenueError {
    #[error("unknown token {0}")]
    UnknownToken(Address),

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

    #[error("transaction expired: deadline {deadline}, now {now}")]
    Expired { deadline: Timestamp, now: Timestamp },

    #[error("insufficient output amount: got {amount_out}, minimum {amount_out_min}")]
    InsufficientOutputAmount {
        amount_out: Amount,
        amount_out_min: Amount,
    },

    #[error("excessive input amount: need {amount_in}, maximum {amount_in_max}")]
    ExcessiveInputAmount {
        amount_in: Amount,
        amount_in_max: Amount,
    },

    #[error("insufficient {token} amount: optimal {amount}, minimum {amount_min}")]
    InsufficientAmount {
        token: Address,
        amount: Amount,
        amount_min: Amount,
    },

    #[error("invalid path")]
    InvalidPath,

    #[error("identical addresses")]
    IdenticalAddresses,

    #[error("no pair for {0} / {1}")]
    PairNotFound(Address, Address),

    #[error("pair {0} / {1} already exists")]
    PairExists(Address, Address),

    #[error("pair invariant violated")]
    InvariantViolated,

    #[error("zero amount")]
    ZeroAmount,

    #[error("amm: {0}")]
    Amm(AmmError),

    #[error("arithmetic overflow")]
    Overflow,
}

impl From<AmmError> for VenueError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::Overflow => VenueError::Overflow,
            other => VenueError::Amm(other),
        }
    }
}

/// An exchange the basket engine can trade against
///
/// Reads are point-in-time: reserves move with every trade from every
/// participant, so a quote is only valid at the instant it is taken.
pub trait SwapVenue {
    /// Opaque copy of the venue state used to undo a failed unit of work
    type Snapshot;

    /// Current block timestamp
    fn now(&self) -> Timestamp;

    /// Address that must be approved to pull swap inputs
    fn router(&self) -> Address;

    /// Whether `token` is registered on the venue
    fn is_listed(&self, token: Address) -> bool;

    /// Whether a direct pair exists between two tokens
    fn has_pair(&self, a: Address, b: Address) -> bool;

    fn balance_of(&self, token: Address, account: Address) -> Amount;

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> Amount;

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), VenueError>;

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), VenueError>;

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), VenueError>;

    /// Output amounts along `path` for an exact input (first entry is `amount_in`)
    fn get_amounts_out(&self, amount_in: Amount, path: &[Address]) -> Result<Vec<Amount>, VenueError>;

    /// Swap an exact input along `path`, paying the output to `to`
    fn swap_exact_tokens_for_tokens(
        &mut self,
        trader: Address,
        amount_in: Amount,
        amount_out_min: Amount,
        path: &[Address],
        to: Address,
        deadline: Timestamp,
    ) -> Result<Vec<Amount>, VenueError>;

    fn snapshot(&self) -> Self::Snapshot;

    fn restore(&mut self, snapshot: Self::Snapshot);
}
