//! Owned-entity registry of live positions.
//!
//! [`PositionRegistry`] maps live position ids to their records and keeps
//! the auto-assignment counter. Each method validates before it mutates, so
//! a rejected call leaves the registry untouched.

use std::collections::BTreeMap;

use super::{AccountId, LedgerError, Position, PositionId, Provenance};

/// Live positions of one pool plus the next auto-assigned id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionRegistry {
    live: BTreeMap<PositionId, Position>,
    next_id: u64,
}

impl PositionRegistry {
    /// Creates an empty registry whose first auto-assigned id is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a live position and returns its id.
    ///
    /// With `id == None` the next counter value is used and the counter
    /// advances. Counter values are never handed out twice, even after a
    /// burn. An explicit `id` leaves the counter alone.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PositionIdInUse`] if the chosen id is live,
    /// and [`LedgerError::InvalidInput`] if the counter is exhausted.
    pub fn mint(
        &mut self,
        owner: AccountId,
        id: Option<PositionId>,
        content_ref: String,
        provenance: Provenance,
    ) -> Result<PositionId, LedgerError> {
        let (id, next_id) = match id {
            Some(explicit) => (explicit, self.next_id),
            None => {
                let next = self.next_id.checked_add(1).ok_or_else(|| {
                    LedgerError::InvalidInput("position id space exhausted".to_string())
                })?;
                (PositionId::new(self.next_id), next)
            }
        };
        if self.live.contains_key(&id) {
            return Err(LedgerError::PositionIdInUse(id));
        }
        self.live.insert(
            id,
            Position {
                id,
                owner,
                content_ref,
                provenance,
            },
        );
        self.next_id = next_id;
        Ok(id)
    }

    /// Removes a live position and returns its final record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PositionNotFound`] if `id` is not live.
    pub fn burn(&mut self, id: PositionId) -> Result<Position, LedgerError> {
        self.live
            .remove(&id)
            .ok_or(LedgerError::PositionNotFound(id))
    }

    /// Moves a position from `from` to `to` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::NotSender`] if `caller` is not `from`.
    /// - [`LedgerError::PositionNotFound`] if `id` is not live.
    /// - [`LedgerError::IncorrectOwner`] if `from` does not own `id`.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        id: PositionId,
        from: &AccountId,
        to: AccountId,
    ) -> Result<(), LedgerError> {
        if caller != from {
            return Err(LedgerError::NotSender {
                caller: caller.clone(),
                from: from.clone(),
            });
        }
        let position = self
            .live
            .get_mut(&id)
            .ok_or(LedgerError::PositionNotFound(id))?;
        if &position.owner != from {
            return Err(LedgerError::IncorrectOwner {
                position_id: id,
                from: from.clone(),
            });
        }
        position.owner = to;
        Ok(())
    }

    /// Undoes a [`mint`](Self::mint) of `id`, putting the counter back to
    /// `next_id`.
    pub(crate) fn revert_mint(&mut self, id: PositionId, next_id: PositionId) {
        self.live.remove(&id);
        self.next_id = next_id.get();
    }

    /// Puts a burned record back under its own id.
    pub(crate) fn reinstate(&mut self, position: Position) {
        self.live.insert(position.id, position);
    }

    /// Returns the owner of a live position.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PositionNotFound`] if `id` is not live.
    pub fn owner_of(&self, id: PositionId) -> Result<&AccountId, LedgerError> {
        self.get(id).map(|position| &position.owner)
    }

    /// Returns the full record of a live position.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::PositionNotFound`] if `id` is not live.
    pub fn get(&self, id: PositionId) -> Result<&Position, LedgerError> {
        self.live.get(&id).ok_or(LedgerError::PositionNotFound(id))
    }

    /// Live positions owned by `owner`, in id order.
    pub fn owned_by<'a>(&'a self, owner: &'a AccountId) -> impl Iterator<Item = &'a Position> {
        self.live.values().filter(move |p| &p.owner == owner)
    }

    /// Number of live positions.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Id the next auto-assigned mint will try.
    #[must_use]
    pub const fn next_id(&self) -> PositionId {
        PositionId::new(self.next_id)
    }
}
