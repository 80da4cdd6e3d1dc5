//! Boundary to the external fungible asset that pays rewards.
//!
//! The ledger only ever calls [`ValueTransferAsset::balance_of`] and
//! [`ValueTransferAsset::transfer`]. [`InMemoryAsset`] is the in-process
//! implementation the gateway runs with.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use super::{AccountId, Amount};

/// Failure reported by the external asset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetError {
    /// Sender balance is below the transfer amount.
    #[error("insufficient balance for {holder}: has {balance}, needs {requested}")]
    InsufficientBalance {
        /// Sending account.
        holder: AccountId,
        /// Its balance.
        balance: Amount,
        /// Amount requested.
        requested: Amount,
    },
    /// Recipient balance would overflow.
    #[error("balance overflow for {0}")]
    Overflow(AccountId),
}

/// Fungible balance-holding service.
pub trait ValueTransferAsset: Send + Sync + fmt::Debug {
    /// Balance of `holder`.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn balance_of(&self, holder: &AccountId) -> Result<Amount, AssetError>;

    /// Moves `amount` from `from` to `to`, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError`] if the move cannot be made; balances are
    /// unchanged in that case.
    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError>;
}

/// In-memory ledger of asset balances.
#[derive(Debug, Default)]
pub struct InMemoryAsset {
    balances: RwLock<HashMap<AccountId, Amount>>,
}

impl InMemoryAsset {
    /// Creates an asset whose whole `supply` is held by `treasury`.
    #[must_use]
    pub fn with_supply(treasury: AccountId, supply: Amount) -> Self {
        let mut balances = HashMap::new();
        if supply > 0 {
            balances.insert(treasury, supply);
        }
        Self {
            balances: RwLock::new(balances),
        }
    }
}

impl ValueTransferAsset for InMemoryAsset {
    fn balance_of(&self, holder: &AccountId) -> Result<Amount, AssetError> {
        let balances = self.balances.read().unwrap_or_else(PoisonError::into_inner);
        Ok(balances.get(holder).copied().unwrap_or(0))
    }

    fn transfer(&self, from: &AccountId, to: &AccountId, amount: Amount) -> Result<(), AssetError> {
        let mut balances = self.balances.write().unwrap_or_else(PoisonError::into_inner);
        let from_balance = balances.get(from).copied().unwrap_or(0);
        let debited = from_balance
            .checked_sub(amount)
            .ok_or_else(|| AssetError::InsufficientBalance {
                holder: from.clone(),
                balance: from_balance,
                requested: amount,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| AssetError::Overflow(to.clone()))?;
        balances.insert(from.clone(), debited);
        balances.insert(to.clone(), credited);
        Ok(())
    }
}
