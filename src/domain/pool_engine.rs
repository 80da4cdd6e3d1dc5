//! Pool engine: the single entry point for every ledger mutation.
//!
//! [`PoolEngine`] composes a [`RoleAuthority`], a [`PositionRegistry`], a
//! [`PoolAccount`] and a handle to the external [`ValueTransferAsset`].
//! Every mutating call runs inside [`PoolEngine::transact`], which journals
//! each reversible step and replays the journal backwards if a later step
//! fails, so callers observe either the whole effect or none of it.
//!
//! The engine is synchronous and takes `&mut self`; serializing calls per
//! pool is the job of whoever owns it (see [`super::PoolRegistry`]).

use std::sync::Arc;

use super::{
    AccountId, Amount, LedgerError, LedgerEvent, PoolAccount, PoolDetails, PoolTerms, Position,
    PositionId, PositionRegistry, Provenance, Role, RoleAuthority, ValueTransferAsset,
};

/// Result of a successful mutation: the returned value plus its audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt<T> {
    /// Operation result.
    pub value: T,
    /// Audit record to publish.
    pub event: LedgerEvent,
}

impl<T> Receipt<T> {
    const fn new(value: T, event: LedgerEvent) -> Self {
        Self { value, event }
    }
}

/// Everything a failed call must restore.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LedgerState {
    roles: RoleAuthority,
    positions: PositionRegistry,
    account: PoolAccount,
}

/// Inverse of one step taken inside a [`Txn`].
#[derive(Debug)]
enum Undo {
    Reserved { availability: Amount },
    Minted { id: PositionId, next_id: PositionId },
    Burned(Position),
}

/// Ledger state under a running call.
///
/// Reservations, mints and burns go through the journaling methods. Any
/// other mutation (roles, minimum ticket, transfers, the asset) must be the
/// call's last step, since it is not journaled.
#[derive(Debug)]
struct Txn<'a> {
    state: &'a mut LedgerState,
    journal: Vec<Undo>,
}

impl<'a> Txn<'a> {
    fn begin(state: &'a mut LedgerState) -> Self {
        Self {
            state,
            journal: Vec::new(),
        }
    }

    fn reserve(&mut self, amount: Amount) -> Result<Amount, LedgerError> {
        let availability = self.state.account.availability();
        let remaining = self.state.account.reserve(amount)?;
        self.journal.push(Undo::Reserved { availability });
        Ok(remaining)
    }

    fn mint(
        &mut self,
        owner: AccountId,
        id: Option<PositionId>,
        content_ref: String,
        provenance: Provenance,
    ) -> Result<PositionId, LedgerError> {
        let next_id = self.state.positions.next_id();
        let id = self
            .state
            .positions
            .mint(owner, id, content_ref, provenance)?;
        self.journal.push(Undo::Minted { id, next_id });
        Ok(id)
    }

    fn burn(&mut self, id: PositionId) -> Result<Position, LedgerError> {
        let burned = self.state.positions.burn(id)?;
        self.journal.push(Undo::Burned(burned.clone()));
        Ok(burned)
    }

    fn roll_back(self) {
        for step in self.journal.into_iter().rev() {
            match step {
                Undo::Reserved { availability } => {
                    self.state.account.restore_availability(availability);
                }
                Undo::Minted { id, next_id } => self.state.positions.revert_mint(id, next_id),
                Undo::Burned(position) => self.state.positions.reinstate(position),
            }
        }
    }
}

/// Ledger of one investment pool.
#[derive(Debug)]
pub struct PoolEngine {
    state: LedgerState,
    asset: Arc<dyn ValueTransferAsset>,
    custody: AccountId,
}

impl PoolEngine {
    /// Builds a pool. `administrator` receives Administrator, `operator`
    /// receives PoolOperator, and `custody` is the pool's own account on
    /// `asset`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidInput`] if the terms are inconsistent.
    pub fn initialize(
        administrator: AccountId,
        operator: AccountId,
        terms: PoolTerms,
        asset: Arc<dyn ValueTransferAsset>,
        custody: AccountId,
    ) -> Result<Receipt<Self>, LedgerError> {
        let account = PoolAccount::initialize(terms)?;
        let event = LedgerEvent::PoolInitialized {
            administrator: administrator.clone(),
            operator: operator.clone(),
            capacity: terms.capacity,
            rate: terms.rate,
            window_start: terms.window_start,
            window_end: terms.window_end,
            minimum_ticket: terms.minimum_ticket,
        };
        let engine = Self {
            state: LedgerState {
                roles: RoleAuthority::new(administrator, operator),
                positions: PositionRegistry::new(),
                account,
            },
            asset,
            custody,
        };
        Ok(Receipt::new(engine, event))
    }

    /// Runs `op` inside a [`Txn`], undoing its journaled steps if it
    /// fails. The asset must only be mutated as the last step of `op`.
    fn transact<T, F>(&mut self, op: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Txn<'_>, &dyn ValueTransferAsset, &AccountId) -> Result<T, LedgerError>,
    {
        let mut txn = Txn::begin(&mut self.state);
        let result = op(&mut txn, self.asset.as_ref(), &self.custody);
        if result.is_err() {
            txn.roll_back();
        }
        result
    }

    /// Reserves `amount` of pool availability and issues a position to
    /// `investor`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without PoolOperator,
    /// [`LedgerError::CapacityExceeded`] if `amount` exceeds availability,
    /// [`LedgerError::PositionIdInUse`] if the next id was minted explicitly.
    pub fn invest(
        &mut self,
        caller: &AccountId,
        order_ref: &str,
        amount: Amount,
        investor: AccountId,
        content_ref: &str,
    ) -> Result<Receipt<PositionId>, LedgerError> {
        self.transact(|txn, _, _| {
            txn.state.roles.require(Role::PoolOperator, caller)?;
            let availability = txn.reserve(amount)?;
            let position_id = txn.mint(
                investor.clone(),
                None,
                content_ref.to_string(),
                Provenance::Invested { amount },
            )?;
            Ok(Receipt::new(
                position_id,
                LedgerEvent::Invested {
                    order_ref: order_ref.to_string(),
                    investor,
                    amount,
                    position_id,
                    content_ref: content_ref.to_string(),
                    availability,
                },
            ))
        })
    }

    /// Pays `reward_amount` from pool custody to `wallet`. Returns the
    /// custody balance left afterwards.
    ///
    /// `position_id` is carried into the audit record only; neither the
    /// registry nor the pool account is consulted.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without PoolOperator,
    /// [`LedgerError::InvalidInput`] if `wallet` is a custody account,
    /// [`LedgerError::InsufficientFunds`] if custody cannot cover the payout
    /// or the asset rejects the transfer.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        order_ref: &str,
        reward_amount: Amount,
        wallet: AccountId,
        position_id: PositionId,
    ) -> Result<Receipt<Amount>, LedgerError> {
        self.transact(|txn, asset, custody| {
            txn.state.roles.require(Role::PoolOperator, caller)?;
            if wallet.is_custody() {
                return Err(LedgerError::InvalidInput(format!(
                    "cannot pay out to custody account {wallet}"
                )));
            }
            let insufficient = || LedgerError::InsufficientFunds {
                requested: reward_amount,
            };
            let balance = asset.balance_of(custody).map_err(|_| insufficient())?;
            let remaining = balance.checked_sub(reward_amount).ok_or_else(insufficient)?;
            asset
                .transfer(custody, &wallet, reward_amount)
                .map_err(|_| insufficient())?;
            Ok(Receipt::new(
                remaining,
                LedgerEvent::Withdrawn {
                    order_ref: order_ref.to_string(),
                    wallet,
                    reward_amount,
                    position_id,
                    custody_balance: remaining,
                },
            ))
        })
    }

    /// Burns `position_id` and issues a settlement position to `wallet`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without PoolOperator,
    /// [`LedgerError::PositionNotFound`] if the position is not live.
    pub fn final_withdrawal(
        &mut self,
        caller: &AccountId,
        order_ref: &str,
        wallet: AccountId,
        position_id: PositionId,
        content_ref: &str,
    ) -> Result<Receipt<PositionId>, LedgerError> {
        self.transact(|txn, _, _| {
            txn.state.roles.require(Role::PoolOperator, caller)?;
            txn.burn(position_id)?;
            let new_position_id = txn.mint(
                wallet.clone(),
                None,
                content_ref.to_string(),
                Provenance::FinalWithdrawal {
                    parent: position_id,
                },
            )?;
            Ok(Receipt::new(
                new_position_id,
                LedgerEvent::FinalWithdrawal {
                    order_ref: order_ref.to_string(),
                    wallet,
                    position_id,
                    content_ref: content_ref.to_string(),
                    new_position_id,
                },
            ))
        })
    }

    /// Replaces `position_id` with one child per `(amounts[i],
    /// content_refs[i])`, all owned by `new_owner`. Returns the child ids
    /// in input order.
    ///
    /// Preconditions are checked in this order: every amount reaches the
    /// minimum ticket, the amounts sum to `total_amount`, both lists have
    /// the same non-zero length.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`], [`LedgerError::BelowMinimumTicket`],
    /// [`LedgerError::AmountMismatch`], [`LedgerError::InvalidInput`],
    /// [`LedgerError::PositionNotFound`] if the parent is not live, or
    /// [`LedgerError::PositionIdInUse`] if a child id collides.
    #[allow(clippy::too_many_arguments)]
    pub fn split(
        &mut self,
        caller: &AccountId,
        order_ref: &str,
        position_id: PositionId,
        total_amount: Amount,
        amounts: &[Amount],
        content_refs: &[String],
        new_owner: AccountId,
    ) -> Result<Receipt<Vec<PositionId>>, LedgerError> {
        self.transact(|txn, _, _| {
            txn.state.roles.require(Role::PoolOperator, caller)?;

            let minimum_ticket = txn.state.account.minimum_ticket();
            if let Some(&amount) = amounts.iter().find(|&&a| a < minimum_ticket) {
                return Err(LedgerError::BelowMinimumTicket {
                    amount,
                    minimum_ticket,
                });
            }
            let sum = amounts
                .iter()
                .try_fold(0u128, |acc, &amount| acc.checked_add(amount));
            if sum != Some(total_amount) {
                return Err(LedgerError::AmountMismatch {
                    expected: total_amount,
                    actual: sum,
                });
            }
            if amounts.len() != content_refs.len() {
                return Err(LedgerError::InvalidInput(format!(
                    "{} split amounts but {} content references",
                    amounts.len(),
                    content_refs.len()
                )));
            }
            if amounts.is_empty() {
                return Err(LedgerError::InvalidInput(
                    "split needs at least one child".to_string(),
                ));
            }

            txn.burn(position_id)?;
            let mut new_position_ids = Vec::with_capacity(amounts.len());
            for (&amount, content_ref) in amounts.iter().zip(content_refs) {
                let child = txn.mint(
                    new_owner.clone(),
                    None,
                    content_ref.clone(),
                    Provenance::Split {
                        parent: position_id,
                        amount,
                    },
                )?;
                new_position_ids.push(child);
            }

            let event = LedgerEvent::Split {
                order_ref: order_ref.to_string(),
                new_owner,
                position_id,
                new_position_ids: new_position_ids.clone(),
                count: new_position_ids.len(),
            };
            Ok(Receipt::new(new_position_ids, event))
        })
    }

    /// Moves `position_id` from `from` to `to`. Not role-gated: only the
    /// current owner, acting as `caller`, may move a position.
    ///
    /// # Errors
    ///
    /// [`LedgerError::NotSender`] or [`LedgerError::IncorrectOwner`] for
    /// anyone but the owner, [`LedgerError::PositionNotFound`] if the
    /// position is not live.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        from: AccountId,
        to: AccountId,
        position_id: PositionId,
    ) -> Result<Receipt<()>, LedgerError> {
        self.transact(|txn, _, _| {
            txn.state
                .positions
                .transfer(caller, position_id, &from, to.clone())?;
            Ok(Receipt::new(
                (),
                LedgerEvent::Transferred {
                    from,
                    to,
                    position_id,
                },
            ))
        })
    }

    /// Destroys a live position and returns its final record.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without PoolOperator,
    /// [`LedgerError::PositionNotFound`] if the position is not live.
    pub fn burn(
        &mut self,
        caller: &AccountId,
        position_id: PositionId,
    ) -> Result<Receipt<Position>, LedgerError> {
        self.transact(|txn, _, _| {
            txn.state.roles.require(Role::PoolOperator, caller)?;
            let burned = txn.burn(position_id)?;
            Ok(Receipt::new(burned, LedgerEvent::Burned { position_id }))
        })
    }

    /// Replaces the minimum ticket and returns the previous value.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without PoolOperator.
    pub fn update_minimum_ticket(
        &mut self,
        caller: &AccountId,
        minimum_ticket: Amount,
    ) -> Result<Receipt<Amount>, LedgerError> {
        self.transact(|txn, _, _| {
            txn.state.roles.require(Role::PoolOperator, caller)?;
            let previous = txn.state.account.update_minimum_ticket(minimum_ticket);
            Ok(Receipt::new(
                previous,
                LedgerEvent::MinimumTicketUpdated {
                    previous,
                    minimum_ticket,
                },
            ))
        })
    }

    /// Mints a position with an explicit id, or the next counter value when
    /// `position_id` is `None`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without PoolOperator,
    /// [`LedgerError::PositionIdInUse`] if the id is live.
    pub fn safe_mint(
        &mut self,
        caller: &AccountId,
        to: AccountId,
        position_id: Option<PositionId>,
        content_ref: &str,
    ) -> Result<Receipt<PositionId>, LedgerError> {
        self.transact(|txn, _, _| {
            txn.state.roles.require(Role::PoolOperator, caller)?;
            let position_id = txn.mint(
                to.clone(),
                position_id,
                content_ref.to_string(),
                Provenance::Minted,
            )?;
            Ok(Receipt::new(
                position_id,
                LedgerEvent::Minted {
                    to,
                    position_id,
                    content_ref: content_ref.to_string(),
                },
            ))
        })
    }

    /// Assigns `role` to `holder`. Returns `None` if it was already held,
    /// since nothing changed.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without Administrator.
    pub fn grant_role(
        &mut self,
        caller: &AccountId,
        role: Role,
        holder: AccountId,
    ) -> Result<Option<LedgerEvent>, LedgerError> {
        self.transact(|txn, _, _| {
            let changed = txn.state.roles.grant(caller, role, holder.clone())?;
            Ok(changed.then(|| LedgerEvent::RoleGranted {
                role,
                account: holder,
                sender: caller.clone(),
            }))
        })
    }

    /// Removes `role` from `holder`. Returns `None` if it was not held.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without Administrator.
    pub fn revoke_role(
        &mut self,
        caller: &AccountId,
        role: Role,
        holder: AccountId,
    ) -> Result<Option<LedgerEvent>, LedgerError> {
        self.transact(|txn, _, _| {
            let changed = txn.state.roles.revoke(caller, role, &holder)?;
            Ok(changed.then(|| LedgerEvent::RoleRevoked {
                role,
                account: holder,
                sender: caller.clone(),
            }))
        })
    }

    /// Moves `amount` of the asset from `caller` into pool custody and
    /// returns the new custody balance. Anyone may fund a pool.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InvalidInput`] if `caller` is a custody account,
    /// [`LedgerError::InsufficientFunds`] if the asset rejects the move.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        amount: Amount,
    ) -> Result<Receipt<Amount>, LedgerError> {
        self.transact(|_, asset, custody| {
            if caller.is_custody() {
                return Err(LedgerError::InvalidInput(format!(
                    "custody account {caller} cannot fund a pool"
                )));
            }
            let insufficient = || LedgerError::InsufficientFunds { requested: amount };
            let balance = asset.balance_of(custody).map_err(|_| insufficient())?;
            let custody_balance = balance.checked_add(amount).ok_or_else(insufficient)?;
            asset
                .transfer(caller, custody, amount)
                .map_err(|_| insufficient())?;
            Ok(Receipt::new(
                custody_balance,
                LedgerEvent::CustodyDeposited {
                    from: caller.clone(),
                    amount,
                    custody_balance,
                },
            ))
        })
    }

    /// Checks that `caller` may take the pool out of service and returns the
    /// record to publish. The engine itself is left untouched; dropping it
    /// is up to its owner.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MissingRole`] without Administrator.
    pub fn authorize_removal(&self, caller: &AccountId) -> Result<LedgerEvent, LedgerError> {
        self.state.roles.require(Role::Administrator, caller)?;
        Ok(LedgerEvent::PoolRemoved {
            sender: caller.clone(),
        })
    }

    /// `checkPoolDetails`: configuration plus current availability.
    #[must_use]
    pub const fn details(&self) -> PoolDetails {
        self.state.account.snapshot()
    }

    /// Owner of a live position.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PositionNotFound`] if the position is not live.
    pub fn owner_of(&self, position_id: PositionId) -> Result<&AccountId, LedgerError> {
        self.state.positions.owner_of(position_id)
    }

    /// Full record of a live position.
    ///
    /// # Errors
    ///
    /// [`LedgerError::PositionNotFound`] if the position is not live.
    pub fn position(&self, position_id: PositionId) -> Result<&Position, LedgerError> {
        self.state.positions.get(position_id)
    }

    /// Live positions owned by `owner`, in id order.
    #[must_use]
    pub fn positions_of(&self, owner: &AccountId) -> Vec<Position> {
        self.state.positions.owned_by(owner).cloned().collect()
    }

    /// Number of live positions.
    #[must_use]
    pub fn live_positions(&self) -> usize {
        self.state.positions.live_count()
    }

    /// Returns `true` if `holder` holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role, holder: &AccountId) -> bool {
        self.state.roles.has_role(role, holder)
    }

    /// The pool's account on the external asset.
    #[must_use]
    pub const fn custody_account(&self) -> &AccountId {
        &self.custody
    }

    /// Current custody balance on the external asset.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientFunds`] if the asset cannot be queried.
    pub fn custody_balance(&self) -> Result<Amount, LedgerError> {
        self.asset
            .balance_of(&self.custody)
            .map_err(|_| LedgerError::InsufficientFunds { requested: 0 })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::pool_account::tests::scenario_terms;
    use crate::domain::{AssetError, ErrorKind, InMemoryAsset, PoolId};

    const CID_A: &str = "QmZf7U3TgffsWDyTfzYws7nioz5NujbozehBa2QhpWbk4n";
    const CID_B: &str = "QmcEe52qLd8b8XgQ5179UsfVH9S63kHG4kymCEidEEmv26";

    fn account(raw: &str) -> AccountId {
        let Ok(id) = AccountId::new(raw) else {
            panic!("valid identity");
        };
        id
    }

    fn owner() -> AccountId {
        account("0xowner")
    }

    fn manager() -> AccountId {
        account("0xmanager")
    }

    fn investor() -> AccountId {
        account("0xinvestor")
    }

    fn treasury() -> AccountId {
        account("0xtreasury")
    }

    fn engine_with_asset(asset: Arc<dyn ValueTransferAsset>) -> PoolEngine {
        let Ok(receipt) = PoolEngine::initialize(
            owner(),
            manager(),
            scenario_terms(),
            asset,
            AccountId::custody(PoolId::new()),
        ) else {
            panic!("valid pool terms");
        };
        receipt.value
    }

    fn engine() -> PoolEngine {
        engine_with_asset(Arc::new(InMemoryAsset::with_supply(
            treasury(),
            1_000_000_000,
        )))
    }

    fn invest(engine: &mut PoolEngine, amount: Amount) -> PositionId {
        let Ok(receipt) = engine.invest(&manager(), "0", amount, investor(), CID_A) else {
            panic!("investment should succeed");
        };
        receipt.value
    }

    fn split_refs() -> Vec<String> {
        vec![CID_A.to_string(), CID_B.to_string()]
    }

    #[test]
    fn initialize_reports_terms() {
        let Ok(receipt) = PoolEngine::initialize(
            owner(),
            manager(),
            scenario_terms(),
            Arc::new(InMemoryAsset::default()),
            AccountId::custody(PoolId::new()),
        ) else {
            panic!("valid pool terms");
        };
        assert_eq!(receipt.event.event_name(), "PoolInitializedEvent");
        let engine = receipt.value;
        assert!(engine.has_role(Role::Administrator, &owner()));
        assert!(engine.has_role(Role::PoolOperator, &manager()));
        assert_eq!(engine.details().availability, 400_000_000_000);
    }

    #[test]
    fn invest_reserves_and_mints() {
        let mut engine = engine();
        let Ok(receipt) = engine.invest(&manager(), "0", 160_000_000, investor(), CID_A) else {
            panic!("investment should succeed");
        };
        assert_eq!(receipt.value, PositionId::new(0));
        assert_eq!(
            receipt.event,
            LedgerEvent::Invested {
                order_ref: "0".to_string(),
                investor: investor(),
                amount: 160_000_000,
                position_id: PositionId::new(0),
                content_ref: CID_A.to_string(),
                availability: 399_840_000_000,
            }
        );
        assert_eq!(engine.details().availability, 399_840_000_000);
        assert_eq!(engine.owner_of(PositionId::new(0)), Ok(&investor()));
    }

    #[test]
    fn invest_beyond_availability_is_rejected() {
        let mut engine = engine();
        let available = engine.details().availability;
        let Err(err) = engine.invest(&manager(), "0", available + 10, investor(), CID_A) else {
            panic!("over-investment must fail");
        };
        assert_eq!(
            err.to_string(),
            "Investment amount larger than pool availability."
        );
        assert_eq!(engine.details().availability, available);
        assert_eq!(engine.live_positions(), 0);
    }

    #[test]
    fn invest_requires_pool_operator() {
        let mut engine = engine();
        let Err(err) = engine.invest(&owner(), "0", 10, investor(), CID_A) else {
            panic!("administrator is not an operator");
        };
        assert_eq!(
            err.to_string(),
            "AccessControl: account 0xowner is missing role POOL_MANAGER"
        );
        assert_eq!(engine.details().availability, 400_000_000_000);
    }

    #[test]
    fn availability_tracks_invest_sequences() {
        let mut engine = engine();
        let mut expected = engine.details().availability;
        for amount in [1, 60_000_000, 399_000_000_000, 999_999_999, 2_000_000_000, 0] {
            let before = engine.details().availability;
            let result = engine.invest(&manager(), "seq", amount, investor(), CID_A);
            if amount <= before {
                assert!(result.is_ok());
                expected -= amount;
            } else {
                assert_eq!(
                    result.err().map(|e| e.kind()),
                    Some(ErrorKind::CapacityExceeded)
                );
            }
            assert_eq!(engine.details().availability, expected);
        }
    }

    #[test]
    fn withdraw_without_custody_balance_fails() {
        let mut engine = engine();
        let Err(err) = engine.withdraw(&manager(), "0", 10_000_000, investor(), PositionId::new(0))
        else {
            panic!("empty custody cannot pay");
        };
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(err.to_string(), "Insufficient balance, try again later.");
    }

    #[test]
    fn withdraw_pays_from_custody() {
        let mut engine = engine();
        assert!(engine.deposit(&treasury(), 10_000_000).is_ok());
        assert_eq!(engine.custody_balance(), Ok(10_000_000));

        let Ok(receipt) =
            engine.withdraw(&manager(), "0", 10_000_000, investor(), PositionId::new(0))
        else {
            panic!("funded custody should pay");
        };
        assert_eq!(
            receipt.event,
            LedgerEvent::Withdrawn {
                order_ref: "0".to_string(),
                wallet: investor(),
                reward_amount: 10_000_000,
                position_id: PositionId::new(0),
                custody_balance: 0,
            }
        );
        assert_eq!(engine.custody_balance(), Ok(0));
        assert_eq!(engine.details().availability, 400_000_000_000);
    }

    #[test]
    fn withdraw_requires_pool_operator() {
        let mut engine = engine();
        assert!(engine.deposit(&treasury(), 100).is_ok());
        let result = engine.withdraw(&owner(), "0", 100, investor(), PositionId::new(0));
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
        assert_eq!(engine.custody_balance(), Ok(100));
    }

    #[derive(Debug)]
    struct BrokenAsset;

    impl ValueTransferAsset for BrokenAsset {
        fn balance_of(&self, _holder: &AccountId) -> Result<Amount, AssetError> {
            Ok(u128::MAX)
        }

        fn transfer(&self, _: &AccountId, to: &AccountId, _: Amount) -> Result<(), AssetError> {
            Err(AssetError::Overflow(to.clone()))
        }
    }

    #[test]
    fn asset_failures_surface_as_insufficient_funds() {
        let mut engine = engine_with_asset(Arc::new(BrokenAsset));
        let result = engine.withdraw(&manager(), "0", 1, investor(), PositionId::new(0));
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::InsufficientFunds)
        );
    }

    #[test]
    fn final_withdrawal_burns_and_reissues() {
        let mut engine = engine();
        let original = invest(&mut engine, 100);
        let Ok(receipt) = engine.final_withdrawal(&manager(), "0", investor(), original, CID_A)
        else {
            panic!("final withdrawal should succeed");
        };
        assert_eq!(receipt.value, PositionId::new(1));
        assert_eq!(
            receipt.event,
            LedgerEvent::FinalWithdrawal {
                order_ref: "0".to_string(),
                wallet: investor(),
                position_id: original,
                content_ref: CID_A.to_string(),
                new_position_id: PositionId::new(1),
            }
        );
        let Err(err) = engine.owner_of(original) else {
            panic!("settled position must be burned");
        };
        assert_eq!(err.to_string(), "ERC721: invalid token ID");
        assert!(matches!(
            engine.position(PositionId::new(1)).map(|p| &p.provenance),
            Ok(Provenance::FinalWithdrawal { parent }) if *parent == original
        ));
    }

    #[test]
    fn final_withdrawal_of_missing_position_mints_nothing() {
        let mut engine = engine();
        let result = engine.final_withdrawal(&manager(), "0", investor(), PositionId::new(4), CID_A);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::NotFound));
        assert_eq!(engine.live_positions(), 0);
        assert!(engine.owner_of(PositionId::new(0)).is_err());
    }

    #[test]
    fn split_burns_parent_and_mints_children() {
        let mut engine = engine();
        let parent = invest(&mut engine, 160_000_000);
        let Ok(receipt) = engine.split(
            &manager(),
            "0",
            parent,
            160_000_000,
            &[100_000_000, 60_000_000],
            &split_refs(),
            investor(),
        ) else {
            panic!("split should succeed");
        };
        let children = vec![PositionId::new(1), PositionId::new(2)];
        assert_eq!(receipt.value, children);
        assert_eq!(
            receipt.event,
            LedgerEvent::Split {
                order_ref: "0".to_string(),
                new_owner: investor(),
                position_id: parent,
                new_position_ids: children,
                count: 2,
            }
        );
        assert!(engine.owner_of(parent).is_err());
        assert_eq!(engine.owner_of(PositionId::new(1)), Ok(&investor()));
        assert_eq!(engine.owner_of(PositionId::new(2)), Ok(&investor()));
        assert!(matches!(
            engine.position(PositionId::new(2)).map(|p| &p.provenance),
            Ok(Provenance::Split { amount: 60_000_000, .. })
        ));
        assert_eq!(
            engine.position(PositionId::new(2)).map(|p| p.content_ref.as_str()),
            Ok(CID_B)
        );
    }

    #[test]
    fn split_below_minimum_ticket_changes_nothing() {
        let mut engine = engine();
        let parent = invest(&mut engine, 160_000_000);
        let Err(err) = engine.split(
            &manager(),
            "0",
            parent,
            160_000_000,
            &[5_000_000, 155_000_000],
            &split_refs(),
            investor(),
        ) else {
            panic!("split below minimum must fail");
        };
        assert_eq!(err.kind(), ErrorKind::BelowMinimumTicket);
        assert_eq!(engine.owner_of(parent), Ok(&investor()));
        assert_eq!(engine.live_positions(), 1);
    }

    #[test]
    fn split_checks_minimum_before_sum() {
        let mut engine = engine();
        let parent = invest(&mut engine, 160_000_000);
        let result = engine.split(
            &manager(),
            "0",
            parent,
            1,
            &[5_000_000, 155_000_000],
            &split_refs(),
            investor(),
        );
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::BelowMinimumTicket)
        );
    }

    #[test]
    fn split_amounts_must_reconcile() {
        let mut engine = engine();
        let parent = invest(&mut engine, 160_000_000);
        let Err(err) = engine.split(
            &manager(),
            "0",
            parent,
            160_000_000,
            &[105_000_000, 60_000_000],
            &split_refs(),
            investor(),
        ) else {
            panic!("mismatched split must fail");
        };
        assert_eq!(
            err.to_string(),
            "The split values do not add up to the initial token value."
        );
        assert_eq!(engine.owner_of(parent), Ok(&investor()));
        assert_eq!(engine.live_positions(), 1);
    }

    #[test]
    fn split_sum_overflow_is_a_mismatch() {
        let mut engine = engine();
        let parent = invest(&mut engine, 160_000_000);
        let result = engine.split(
            &manager(),
            "0",
            parent,
            160_000_000,
            &[u128::MAX, 60_000_000],
            &split_refs(),
            investor(),
        );
        assert_eq!(
            result.err(),
            Some(LedgerError::AmountMismatch {
                expected: 160_000_000,
                actual: None,
            })
        );
    }

    #[test]
    fn split_rejects_length_mismatch_and_empty_lists() {
        let mut engine = engine();
        let parent = invest(&mut engine, 120_000_000);
        let result = engine.split(
            &manager(),
            "0",
            parent,
            120_000_000,
            &[60_000_000, 60_000_000],
            &[CID_A.to_string()],
            investor(),
        );
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::InvalidInput));

        let result = engine.split(&manager(), "0", parent, 0, &[], &[], investor());
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::InvalidInput));
        assert_eq!(engine.owner_of(parent), Ok(&investor()));
    }

    #[test]
    fn split_requires_pool_operator() {
        let mut engine = engine();
        let parent = invest(&mut engine, 100);
        let result = engine.split(&owner(), "0", parent, 100, &[50, 50], &split_refs(), investor());
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
    }

    #[test]
    fn failed_child_mint_rolls_back_parent_burn() {
        let mut engine = engine();
        let parent = invest(&mut engine, 160_000_000);
        assert!(
            engine
                .safe_mint(&manager(), owner(), Some(PositionId::new(2)), CID_B)
                .is_ok()
        );

        let result = engine.split(
            &manager(),
            "0",
            parent,
            160_000_000,
            &[100_000_000, 60_000_000],
            &split_refs(),
            investor(),
        );
        assert_eq!(
            result.err(),
            Some(LedgerError::PositionIdInUse(PositionId::new(2)))
        );
        assert_eq!(engine.owner_of(parent), Ok(&investor()));
        assert!(engine.owner_of(PositionId::new(1)).is_err());
        assert_eq!(engine.owner_of(PositionId::new(2)), Ok(&owner()));
        assert_eq!(engine.live_positions(), 2);

        // The counter was restored too: the next auto id is 1 again.
        assert_eq!(invest(&mut engine, 1), PositionId::new(1));
    }

    #[test]
    fn failed_invest_mint_restores_availability() {
        let mut engine = engine();
        assert!(
            engine
                .safe_mint(&manager(), owner(), Some(PositionId::new(0)), CID_A)
                .is_ok()
        );
        let result = engine.invest(&manager(), "0", 500, investor(), CID_A);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::IdInUse));
        assert_eq!(engine.details().availability, 400_000_000_000);
    }

    #[test]
    fn rolled_back_journal_restores_whole_state() {
        let mut engine = engine();
        let parent = invest(&mut engine, 160_000_000);
        let before = engine.state.clone();

        let mut txn = Txn::begin(&mut engine.state);
        assert!(txn.reserve(1_000).is_ok());
        assert!(txn.burn(parent).is_ok());
        assert!(
            txn.mint(investor(), Some(parent), CID_B.to_string(), Provenance::Minted)
                .is_ok()
        );
        assert!(
            txn.mint(owner(), None, CID_A.to_string(), Provenance::Minted)
                .is_ok()
        );
        assert_eq!(txn.journal.len(), 4);
        txn.roll_back();

        assert_eq!(engine.state, before);
        assert_eq!(engine.position(parent).map(|p| &p.content_ref), Ok(&CID_A.to_string()));
    }

    #[test]
    fn only_owner_can_transfer() {
        let mut engine = engine();
        let id = invest(&mut engine, 100);

        let Err(err) = engine.transfer(&manager(), investor(), owner(), id) else {
            panic!("operator must not move investor positions");
        };
        assert_eq!(err.to_string(), "Only the sender can initiate the transfer.");
        assert_eq!(engine.owner_of(id), Ok(&investor()));

        let Ok(receipt) = engine.transfer(&investor(), investor(), owner(), id) else {
            panic!("owner transfer should succeed");
        };
        assert_eq!(
            receipt.event,
            LedgerEvent::Transferred {
                from: investor(),
                to: owner(),
                position_id: id,
            }
        );
        assert_eq!(engine.owner_of(id), Ok(&owner()));

        let result = engine.transfer(&investor(), investor(), manager(), id);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
    }

    #[test]
    fn burn_removes_position() {
        let mut engine = engine();
        let id = invest(&mut engine, 100);
        let Ok(receipt) = engine.burn(&manager(), id) else {
            panic!("burn should succeed");
        };
        assert_eq!(receipt.value.owner, investor());
        assert_eq!(receipt.event, LedgerEvent::Burned { position_id: id });
        assert_eq!(engine.owner_of(id).err().map(|e| e.kind()), Some(ErrorKind::NotFound));
        assert_eq!(
            engine.burn(&manager(), id).err().map(|e| e.kind()),
            Some(ErrorKind::NotFound)
        );
    }

    #[test]
    fn burn_requires_pool_operator() {
        let mut engine = engine();
        let id = invest(&mut engine, 100);
        let result = engine.burn(&investor(), id);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
        assert_eq!(engine.owner_of(id), Ok(&investor()));
    }

    #[test]
    fn update_minimum_ticket_is_operator_only() {
        let mut engine = engine();
        let Ok(receipt) = engine.update_minimum_ticket(&manager(), 20) else {
            panic!("operator may update the minimum");
        };
        assert_eq!(receipt.value, 60_000_000);
        assert_eq!(engine.details().as_tuple().5, 20);

        let result = engine.update_minimum_ticket(&owner(), 30);
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
        assert_eq!(engine.details().minimum_ticket, 20);
    }

    #[test]
    fn safe_mint_assigns_requested_id() {
        let mut engine = engine();
        let Ok(receipt) = engine.safe_mint(&manager(), investor(), Some(PositionId::new(0)), CID_A)
        else {
            panic!("safe mint should succeed");
        };
        assert_eq!(receipt.value, PositionId::new(0));
        assert_eq!(engine.owner_of(PositionId::new(0)), Ok(&investor()));

        let again = engine.safe_mint(&manager(), owner(), Some(PositionId::new(0)), CID_A);
        assert_eq!(again.err().map(|e| e.kind()), Some(ErrorKind::IdInUse));

        let denied = engine.safe_mint(&owner(), owner(), Some(PositionId::new(5)), CID_A);
        assert_eq!(denied.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
    }

    #[test]
    fn granted_operator_can_invest_and_revoked_cannot() {
        let mut engine = engine();
        assert!(engine.invest(&investor(), "0", 100_000_000, investor(), CID_A).is_err());

        let Ok(Some(event)) = engine.grant_role(&owner(), Role::PoolOperator, investor()) else {
            panic!("administrator may grant");
        };
        assert_eq!(event.event_name(), "RoleGrantedEvent");
        let Ok(receipt) = engine.invest(&investor(), "0", 100_000_000, investor(), CID_A) else {
            panic!("new operator may invest");
        };
        assert!(matches!(
            receipt.event,
            LedgerEvent::Invested { availability: 399_900_000_000, .. }
        ));

        assert!(matches!(
            engine.revoke_role(&owner(), Role::PoolOperator, manager()),
            Ok(Some(LedgerEvent::RoleRevoked { .. }))
        ));
        let result = engine.invest(&manager(), "0", 100_000_000, investor(), CID_A);
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("AccessControl: account 0xmanager is missing role POOL_MANAGER".to_string())
        );
    }

    #[test]
    fn redundant_role_changes_emit_nothing() {
        let mut engine = engine();
        assert_eq!(
            engine.grant_role(&owner(), Role::PoolOperator, manager()),
            Ok(None)
        );
        assert_eq!(
            engine.revoke_role(&owner(), Role::PoolOperator, investor()),
            Ok(None)
        );
    }

    #[test]
    fn only_administrator_changes_roles() {
        let mut engine = engine();
        let grant = engine.grant_role(&manager(), Role::PoolOperator, investor());
        assert_eq!(
            grant.err().map(|e| e.to_string()),
            Some("AccessControl: account 0xmanager is missing role ADMIN_ROLE".to_string())
        );
        let revoke = engine.revoke_role(&manager(), Role::PoolOperator, manager());
        assert_eq!(revoke.err().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
        assert!(engine.has_role(Role::PoolOperator, &manager()));
        assert!(!engine.has_role(Role::PoolOperator, &investor()));
    }

    #[test]
    fn only_administrator_may_remove_pool() {
        let engine = engine();
        assert_eq!(
            engine.authorize_removal(&owner()),
            Ok(LedgerEvent::PoolRemoved { sender: owner() })
        );
        assert_eq!(
            engine.authorize_removal(&manager()).err().map(|e| e.kind()),
            Some(ErrorKind::Unauthorized)
        );
    }

    #[test]
    fn deposit_beyond_funder_balance_fails() {
        let mut engine = engine();
        let result = engine.deposit(&investor(), 1);
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::InsufficientFunds)
        );
        assert_eq!(engine.custody_balance(), Ok(0));
    }

    #[test]
    fn withdraw_to_own_custody_is_rejected() {
        let mut engine = engine();
        assert!(engine.deposit(&treasury(), 500).is_ok());
        let custody = engine.custody_account().clone();
        let Err(err) = engine.withdraw(&manager(), "0", 500, custody, PositionId::new(0)) else {
            panic!("custody cannot pay itself");
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(engine.custody_balance(), Ok(500));
    }

    #[test]
    fn custody_accounts_cannot_fund_pools() {
        let asset: Arc<dyn ValueTransferAsset> =
            Arc::new(InMemoryAsset::with_supply(treasury(), 1_000));
        let mut first = engine_with_asset(Arc::clone(&asset));
        let mut second = engine_with_asset(asset);
        assert!(first.deposit(&treasury(), 400).is_ok());

        let first_custody = first.custody_account().clone();
        let Err(err) = second.deposit(&first_custody, 400) else {
            panic!("another pool's custody must not fund this one");
        };
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let own_custody = first.custody_account().clone();
        assert_eq!(
            first.deposit(&own_custody, 400).err().map(|e| e.kind()),
            Some(ErrorKind::InvalidInput)
        );
        assert_eq!(first.custody_balance(), Ok(400));
        assert_eq!(second.custody_balance(), Ok(0));
    }

    #[test]
    fn positions_of_lists_owned_positions() {
        let mut engine = engine();
        let first = invest(&mut engine, 100);
        assert!(engine.safe_mint(&manager(), owner(), None, CID_B).is_ok());
        let second = invest(&mut engine, 100);
        let ids: Vec<_> = engine.positions_of(&investor()).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![first, second]);
    }
}
