//! Ledger failure taxonomy.
//!
//! The `Display` text of each [`LedgerError`] variant is part of the
//! observable contract with existing audit consumers and must not change.

use serde::Serialize;
use utoipa::ToSchema;

use super::{AccountId, Amount, PositionId, Role};

/// Coarse classification of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing role, or not the position owner on transfer.
    Unauthorized,
    /// Investment larger than the remaining pool availability.
    CapacityExceeded,
    /// Custody balance on the external asset is too low.
    InsufficientFunds,
    /// Position id is not live.
    NotFound,
    /// A split amount is below the pool's minimum ticket.
    BelowMinimumTicket,
    /// Split amounts do not add up to the declared total.
    AmountMismatch,
    /// Explicit position id is already live.
    IdInUse,
    /// Malformed arguments.
    InvalidInput,
}

/// Every way a ledger operation can be rejected.
///
/// A rejected operation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Caller does not hold the role the operation requires.
    #[error("AccessControl: account {account} is missing role {role}")]
    MissingRole {
        /// Account that attempted the call.
        account: AccountId,
        /// Role the call requires.
        role: Role,
    },

    /// Caller tried to move a position on behalf of someone else.
    #[error("Only the sender can initiate the transfer.")]
    NotSender {
        /// Account that attempted the call.
        caller: AccountId,
        /// Account named as the sender.
        from: AccountId,
    },

    /// Named sender is not the current owner of the position.
    #[error("ERC721: transfer from incorrect owner")]
    IncorrectOwner {
        /// Position being transferred.
        position_id: PositionId,
        /// Account named as the sender.
        from: AccountId,
    },

    /// Investment exceeds the remaining pool availability.
    #[error("Investment amount larger than pool availability.")]
    CapacityExceeded {
        /// Amount requested.
        requested: Amount,
        /// Availability at the time of the request.
        available: Amount,
    },

    /// Custody cannot cover the requested payout.
    #[error("Insufficient balance, try again later.")]
    InsufficientFunds {
        /// Amount requested.
        requested: Amount,
    },

    /// Position id is not live (never minted or already burned).
    #[error("ERC721: invalid token ID")]
    PositionNotFound(PositionId),

    /// Explicit position id is already live.
    #[error("ERC721: token already minted")]
    PositionIdInUse(PositionId),

    /// A split amount is below the minimum ticket.
    #[error("Individual split values are not above the minimum investable value.")]
    BelowMinimumTicket {
        /// Offending amount.
        amount: Amount,
        /// Minimum ticket in force.
        minimum_ticket: Amount,
    },

    /// Split amounts do not reconcile with the declared total.
    #[error("The split values do not add up to the initial token value.")]
    AmountMismatch {
        /// Declared total.
        expected: Amount,
        /// Sum of the split amounts, `None` if it overflowed.
        actual: Option<Amount>,
    },

    /// Malformed arguments.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl LedgerError {
    /// Returns the taxonomy bucket of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRole { .. } | Self::NotSender { .. } | Self::IncorrectOwner { .. } => {
                ErrorKind::Unauthorized
            }
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::PositionNotFound(_) => ErrorKind::NotFound,
            Self::PositionIdInUse(_) => ErrorKind::IdInUse,
            Self::BelowMinimumTicket { .. } => ErrorKind::BelowMinimumTicket,
            Self::AmountMismatch { .. } => ErrorKind::AmountMismatch,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}
