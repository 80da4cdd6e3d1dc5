//! Pool configuration and remaining availability.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{Amount, LedgerError};

/// Parameters supplied when a pool is initialized.
///
/// Everything except `minimum_ticket` is immutable once the pool exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolTerms {
    /// Total investable amount.
    pub capacity: Amount,
    /// Reward rate, opaque to the ledger.
    pub rate: u64,
    /// Investment window start (epoch milliseconds).
    pub window_start: u64,
    /// Investment window end (epoch milliseconds).
    pub window_end: u64,
    /// Smallest amount a split child may carry.
    pub minimum_ticket: Amount,
}

/// Read-only view of a pool, in `checkPoolDetails` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PoolDetails {
    /// Total investable amount.
    #[serde(with = "super::amount::as_string")]
    #[schema(value_type = String)]
    pub capacity: Amount,
    /// Remaining investable amount.
    #[serde(with = "super::amount::as_string")]
    #[schema(value_type = String)]
    pub availability: Amount,
    /// Reward rate.
    pub rate: u64,
    /// Investment window start (epoch milliseconds).
    pub window_start: u64,
    /// Investment window end (epoch milliseconds).
    pub window_end: u64,
    /// Current minimum ticket.
    #[serde(with = "super::amount::as_string")]
    #[schema(value_type = String)]
    pub minimum_ticket: Amount,
}

impl PoolDetails {
    /// Returns `(capacity, availability, rate, window_start, window_end,
    /// minimum_ticket)`.
    #[must_use]
    pub const fn as_tuple(&self) -> (Amount, Amount, u64, u64, u64, Amount) {
        (
            self.capacity,
            self.availability,
            self.rate,
            self.window_start,
            self.window_end,
            self.minimum_ticket,
        )
    }
}

/// Capacity-bounded pool account.
///
/// Invariant: `availability <= terms.capacity`, and availability never
/// increases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolAccount {
    terms: PoolTerms,
    availability: Amount,
}

impl PoolAccount {
    /// Initializes the account with full availability.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidInput`] if the window ends before it
    /// starts.
    pub fn initialize(terms: PoolTerms) -> Result<Self, LedgerError> {
        if terms.window_start > terms.window_end {
            return Err(LedgerError::InvalidInput(format!(
                "investment window ends ({}) before it starts ({})",
                terms.window_end, terms.window_start
            )));
        }
        Ok(Self {
            availability: terms.capacity,
            terms,
        })
    }

    /// Takes `amount` out of the remaining availability and returns what is
    /// left.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::CapacityExceeded`] if `amount` is larger than
    /// the availability; nothing changes in that case.
    pub fn reserve(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        let remaining =
            self.availability
                .checked_sub(amount)
                .ok_or(LedgerError::CapacityExceeded {
                    requested: amount,
                    available: self.availability,
                })?;
        self.availability = remaining;
        Ok(remaining)
    }

    /// Puts availability back to a value observed before a rolled-back
    /// reservation. Never raises it above capacity.
    pub(crate) fn restore_availability(&mut self, availability: Amount) {
        self.availability = availability.min(self.terms.capacity);
    }

    /// Replaces the minimum ticket and returns the previous value.
    pub fn update_minimum_ticket(&mut self, minimum_ticket: Amount) -> Amount {
        std::mem::replace(&mut self.terms.minimum_ticket, minimum_ticket)
    }

    /// Current minimum ticket.
    #[must_use]
    pub const fn minimum_ticket(&self) -> Amount {
        self.terms.minimum_ticket
    }

    /// Remaining availability.
    #[must_use]
    pub const fn availability(&self) -> Amount {
        self.availability
    }

    /// Configuration plus current availability.
    #[must_use]
    pub const fn snapshot(&self) -> PoolDetails {
        PoolDetails {
            capacity: self.terms.capacity,
            availability: self.availability,
            rate: self.terms.rate,
            window_start: self.terms.window_start,
            window_end: self.terms.window_end,
            minimum_ticket: self.terms.minimum_ticket,
        }
    }
}
