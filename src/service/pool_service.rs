//! Pool service: runs ledger operations and emits audit events.

use std::sync::Arc;

use crate::domain::pool_entry::{PoolEntry, PoolSummary};
use crate::domain::{
    AccountId, Amount, EventBus, LedgerError, LedgerEvent, PoolDetails, PoolEngine, PoolEvent,
    PoolId, PoolRegistry, PoolTerms, Position, PositionId, Receipt, Role, ValueTransferAsset,
};
use crate::error::GatewayError;

/// Arguments of a split, grouped for readability at call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOrder {
    /// Caller correlation key.
    pub order_ref: String,
    /// Parent position to burn.
    pub position_id: PositionId,
    /// Declared value of the parent.
    pub total_amount: Amount,
    /// Child amounts.
    pub amounts: Vec<Amount>,
    /// Child content references, one per amount.
    pub content_refs: Vec<String>,
    /// Owner of every child.
    pub new_owner: AccountId,
}

/// Orchestration layer for all pool operations.
///
/// Every mutation follows the same pattern: acquire the pool's write lock →
/// run exactly one engine call → update metadata → release the lock → emit
/// the audit record → return the result. Nothing awaits while the lock is
/// held, so an engine call can never be interrupted halfway.
#[derive(Debug, Clone)]
pub struct PoolService {
    registry: Arc<PoolRegistry>,
    event_bus: EventBus,
    asset: Arc<dyn ValueTransferAsset>,
}

/// Splits a receipt into its value and the record to publish.
fn emitted<T>(receipt: Receipt<T>) -> (T, Option<LedgerEvent>) {
    (receipt.value, Some(receipt.event))
}

impl PoolService {
    /// Creates a new `PoolService` settling rewards on `asset`.
    #[must_use]
    pub fn new(
        registry: Arc<PoolRegistry>,
        event_bus: EventBus,
        asset: Arc<dyn ValueTransferAsset>,
    ) -> Self {
        Self {
            registry,
            event_bus,
            asset,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`PoolRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<PoolRegistry> {
        &self.registry
    }

    /// Returns the external asset handle.
    #[must_use]
    pub fn asset(&self) -> &Arc<dyn ValueTransferAsset> {
        &self.asset
    }

    fn publish(&self, pool_id: PoolId, record: LedgerEvent) {
        let event_name = record.event_name();
        let receivers = self.event_bus.publish(PoolEvent::new(pool_id, record));
        tracing::debug!(%pool_id, event = event_name, receivers, "audit event published");
    }

    /// Runs one engine call under the pool's write lock.
    async fn apply<T, F>(&self, pool_id: PoolId, op: F) -> Result<T, GatewayError>
    where
        F: FnOnce(&mut PoolEngine) -> Result<(T, Option<LedgerEvent>), LedgerError>,
    {
        let entry_lock = self.registry.get(pool_id).await?;
        let mut entry = entry_lock.write().await;

        let (value, record) = match op(&mut entry.engine) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(%pool_id, kind = ?err.kind(), error = %err, "ledger operation rejected");
                return Err(err.into());
            }
        };
        // Publish under the guard: broadcast order is ledger order.
        if let Some(record) = record {
            entry.touch();
            tracing::info!(%pool_id, event = record.event_name(), "ledger mutation applied");
            self.publish(pool_id, record);
        }
        drop(entry);
        Ok(value)
    }

    /// Runs a read-only query under the pool's read lock.
    async fn inspect<T, F>(&self, pool_id: PoolId, query: F) -> Result<T, GatewayError>
    where
        F: FnOnce(&PoolEngine) -> Result<T, LedgerError>,
    {
        let entry_lock = self.registry.get(pool_id).await?;
        let entry = entry_lock.read().await;
        Ok(query(&entry.engine)?)
    }

    /// Initializes a new pool. `administrator` (the caller) receives
    /// Administrator and `operator` receives PoolOperator.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the terms are inconsistent.
    pub async fn create_pool(
        &self,
        administrator: AccountId,
        operator: AccountId,
        terms: PoolTerms,
        name: Option<String>,
    ) -> Result<PoolId, GatewayError> {
        let pool_id = PoolId::new();
        let receipt = PoolEngine::initialize(
            administrator,
            operator,
            terms,
            Arc::clone(&self.asset),
            AccountId::custody(pool_id),
        )?;
        self.registry
            .insert(PoolEntry::new(pool_id, receipt.value, name))
            .await?;

        tracing::info!(
            %pool_id,
            capacity = %terms.capacity,
            minimum_ticket = %terms.minimum_ticket,
            "pool created"
        );
        self.publish(pool_id, receipt.event);
        Ok(pool_id)
    }

    /// Reserves availability and issues a position to `investor`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the ledger
    /// rejects the investment.
    pub async fn invest(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        order_ref: &str,
        amount: Amount,
        investor: AccountId,
        content_ref: &str,
    ) -> Result<PositionId, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .invest(caller, order_ref, amount, investor, content_ref)
                .map(emitted)
        })
        .await
    }

    /// Pays a reward out of pool custody. Returns the remaining custody
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the ledger
    /// rejects the payout.
    pub async fn withdraw(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        order_ref: &str,
        reward_amount: Amount,
        wallet: AccountId,
        position_id: PositionId,
    ) -> Result<Amount, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .withdraw(caller, order_ref, reward_amount, wallet, position_id)
                .map(emitted)
        })
        .await
    }

    /// Settles a position into a fresh settlement position.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the ledger
    /// rejects the settlement.
    pub async fn final_withdrawal(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        order_ref: &str,
        wallet: AccountId,
        position_id: PositionId,
        content_ref: &str,
    ) -> Result<PositionId, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .final_withdrawal(caller, order_ref, wallet, position_id, content_ref)
                .map(emitted)
        })
        .await
    }

    /// Splits a position into children.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the ledger
    /// rejects the split.
    pub async fn split(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        order: SplitOrder,
    ) -> Result<Vec<PositionId>, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .split(
                    caller,
                    &order.order_ref,
                    order.position_id,
                    order.total_amount,
                    &order.amounts,
                    &order.content_refs,
                    order.new_owner,
                )
                .map(emitted)
        })
        .await
    }

    /// Moves a position between owners on behalf of its owner.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the caller is
    /// not the owner.
    pub async fn transfer(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        from: AccountId,
        to: AccountId,
        position_id: PositionId,
    ) -> Result<(), GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .transfer(caller, from, to, position_id)
                .map(emitted)
        })
        .await
    }

    /// Burns a position and returns its final record.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool or position is not found or
    /// the caller lacks PoolOperator.
    pub async fn burn(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        position_id: PositionId,
    ) -> Result<Position, GatewayError> {
        self.apply(pool_id, |engine| engine.burn(caller, position_id).map(emitted))
            .await
    }

    /// Replaces the minimum ticket and returns the previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the caller
    /// lacks PoolOperator.
    pub async fn update_minimum_ticket(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        minimum_ticket: Amount,
    ) -> Result<Amount, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .update_minimum_ticket(caller, minimum_ticket)
                .map(emitted)
        })
        .await
    }

    /// Mints a position directly.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found, the id is live,
    /// or the caller lacks PoolOperator.
    pub async fn safe_mint(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        to: AccountId,
        position_id: Option<PositionId>,
        content_ref: &str,
    ) -> Result<PositionId, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .safe_mint(caller, to, position_id, content_ref)
                .map(emitted)
        })
        .await
    }

    /// Grants a role. Returns `false` if the holder already had it.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the caller is
    /// not an Administrator.
    pub async fn grant_role(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        role: Role,
        holder: AccountId,
    ) -> Result<bool, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .grant_role(caller, role, holder)
                .map(|record| (record.is_some(), record))
        })
        .await
    }

    /// Revokes a role. Returns `false` if the holder did not have it.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the caller is
    /// not an Administrator.
    pub async fn revoke_role(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        role: Role,
        holder: AccountId,
    ) -> Result<bool, GatewayError> {
        self.apply(pool_id, |engine| {
            engine
                .revoke_role(caller, role, holder)
                .map(|record| (record.is_some(), record))
        })
        .await
    }

    /// Funds pool custody from the caller's asset balance. Returns the new
    /// custody balance.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the caller's
    /// balance is too low.
    pub async fn deposit(
        &self,
        pool_id: PoolId,
        caller: &AccountId,
        amount: Amount,
    ) -> Result<Amount, GatewayError> {
        self.apply(pool_id, |engine| engine.deposit(caller, amount).map(emitted))
            .await
    }

    /// Takes a pool out of service.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the caller is
    /// not an Administrator.
    pub async fn remove_pool(&self, pool_id: PoolId, caller: &AccountId) -> Result<(), GatewayError> {
        let record = self
            .inspect(pool_id, |engine| engine.authorize_removal(caller))
            .await?;
        // The entry guard is released first: `PoolRegistry::list` holds the
        // map lock while it waits on entry locks.
        self.registry.remove(pool_id).await?;

        tracing::info!(%pool_id, "pool removed");
        self.publish(pool_id, record);
        Ok(())
    }

    /// `checkPoolDetails` for one pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn pool_details(&self, pool_id: PoolId) -> Result<PoolDetails, GatewayError> {
        self.inspect(pool_id, |engine| Ok(engine.details())).await
    }

    /// Full record of a live position.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool or position is not found.
    pub async fn position(
        &self,
        pool_id: PoolId,
        position_id: PositionId,
    ) -> Result<Position, GatewayError> {
        self.inspect(pool_id, |engine| engine.position(position_id).cloned())
            .await
    }

    /// Owner of a live position.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool or position is not found.
    pub async fn owner_of(
        &self,
        pool_id: PoolId,
        position_id: PositionId,
    ) -> Result<AccountId, GatewayError> {
        self.inspect(pool_id, |engine| engine.owner_of(position_id).cloned())
            .await
    }

    /// Live positions owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn positions_of(
        &self,
        pool_id: PoolId,
        owner: &AccountId,
    ) -> Result<Vec<Position>, GatewayError> {
        self.inspect(pool_id, |engine| Ok(engine.positions_of(owner)))
            .await
    }

    /// Returns whether `holder` holds `role` in the pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PoolNotFound`] if the pool does not exist.
    pub async fn has_role(
        &self,
        pool_id: PoolId,
        role: Role,
        holder: &AccountId,
    ) -> Result<bool, GatewayError> {
        self.inspect(pool_id, |engine| Ok(engine.has_role(role, holder)))
            .await
    }

    /// Current custody balance of the pool.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the pool is not found or the asset
    /// cannot be queried.
    pub async fn custody_balance(&self, pool_id: PoolId) -> Result<Amount, GatewayError> {
        self.inspect(pool_id, PoolEngine::custody_balance).await
    }

    /// Returns summaries of all pools.
    pub async fn list_pools(&self) -> Vec<PoolSummary> {
        self.registry.list().await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::pool_account::tests::scenario_terms;
    use crate::domain::{ErrorKind, InMemoryAsset};

    const CID: &str = "QmZf7U3TgffsWDyTfzYws7nioz5NujbozehBa2QhpWbk4n";

    fn account(raw: &str) -> AccountId {
        let Ok(id) = AccountId::new(raw) else {
            panic!("valid identity");
        };
        id
    }

    fn make_service() -> PoolService {
        PoolService::new(
            Arc::new(PoolRegistry::new()),
            EventBus::new(1000),
            Arc::new(InMemoryAsset::with_supply(account("0xtreasury"), 1_000_000_000)),
        )
    }

    async fn make_pool(service: &PoolService) -> PoolId {
        let Ok(pool_id) = service
            .create_pool(account("0xowner"), account("0xmanager"), scenario_terms(), None)
            .await
        else {
            panic!("pool creation failed");
        };
        pool_id
    }

    #[tokio::test]
    async fn create_pool_emits_event() {
        let service = make_service();
        let mut rx = service.event_bus().subscribe();
        let pool_id = make_pool(&service).await;

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.pool_id(), pool_id);
        assert_eq!(event.event_type_str(), "pool_initialized");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_mutations_publish_in_ledger_order() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let mut rx = service.event_bus().subscribe();

        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .invest(
                            pool_id,
                            &account("0xmanager"),
                            "0",
                            1_000,
                            account("0xinvestor"),
                            CID,
                        )
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert!(matches!(task.await, Ok(Ok(_))));
        }

        let mut previous = (None, scenario_terms().capacity);
        for _ in 0..32 {
            let Ok(event) = rx.recv().await else {
                panic!("expected event");
            };
            let LedgerEvent::Invested {
                position_id,
                availability,
                ..
            } = event.record
            else {
                panic!("expected invest record");
            };
            assert!(availability < previous.1);
            assert!(previous.0.is_none_or(|id| id < position_id));
            previous = (Some(position_id), availability);
        }
    }

    #[tokio::test]
    async fn invest_updates_state_and_emits() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let mut rx = service.event_bus().subscribe();

        let result = service
            .invest(pool_id, &account("0xmanager"), "0", 160_000_000, account("0xinvestor"), CID)
            .await;
        assert!(matches!(result, Ok(id) if id == PositionId::new(0)));

        let Ok(details) = service.pool_details(pool_id).await else {
            panic!("pool not found");
        };
        assert_eq!(details.availability, 399_840_000_000);

        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_name, "InvestedEvent");

        let Ok(entry_lock) = service.registry().get(pool_id).await else {
            panic!("pool not found");
        };
        assert_eq!(entry_lock.read().await.operation_count, 1);
    }

    #[tokio::test]
    async fn rejected_operation_emits_nothing() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let mut rx = service.event_bus().subscribe();

        let result = service
            .invest(pool_id, &account("0xowner"), "0", 10, account("0xinvestor"), CID)
            .await;
        let Err(GatewayError::Ledger(err)) = result else {
            panic!("administrator is not an operator");
        };
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_pool_is_not_found() {
        let service = make_service();
        let result = service.pool_details(PoolId::new()).await;
        assert!(matches!(result, Err(GatewayError::PoolNotFound(_))));
    }

    #[tokio::test]
    async fn deposit_then_withdraw_moves_asset() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let treasury = account("0xtreasury");

        assert!(matches!(
            service.deposit(pool_id, &treasury, 10_000_000).await,
            Ok(10_000_000)
        ));
        let result = service
            .withdraw(
                pool_id,
                &account("0xmanager"),
                "0",
                10_000_000,
                account("0xinvestor"),
                PositionId::new(0),
            )
            .await;
        assert!(matches!(result, Ok(0)));
        assert_eq!(
            service.asset().balance_of(&account("0xinvestor")),
            Ok(10_000_000)
        );
    }

    #[tokio::test]
    async fn pools_do_not_share_custody() {
        let service = make_service();
        let first = make_pool(&service).await;
        let second = make_pool(&service).await;
        assert!(service.deposit(first, &account("0xtreasury"), 5).await.is_ok());
        assert!(matches!(service.custody_balance(first).await, Ok(5)));
        assert!(matches!(service.custody_balance(second).await, Ok(0)));
    }

    #[tokio::test]
    async fn split_via_service() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let manager = account("0xmanager");
        let investor = account("0xinvestor");
        let _ = service
            .invest(pool_id, &manager, "0", 160_000_000, investor.clone(), CID)
            .await;

        let order = SplitOrder {
            order_ref: "0".to_string(),
            position_id: PositionId::new(0),
            total_amount: 160_000_000,
            amounts: vec![100_000_000, 60_000_000],
            content_refs: vec![CID.to_string(), CID.to_string()],
            new_owner: investor.clone(),
        };
        let Ok(children) = service.split(pool_id, &manager, order).await else {
            panic!("split failed");
        };
        assert_eq!(children, vec![PositionId::new(1), PositionId::new(2)]);
        let Ok(owned) = service.positions_of(pool_id, &investor).await else {
            panic!("pool not found");
        };
        assert_eq!(owned.len(), 2);
        assert!(service.owner_of(pool_id, PositionId::new(0)).await.is_err());
    }

    #[tokio::test]
    async fn concurrent_invests_never_exceed_capacity() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let manager = account("0xmanager");
        let tranche = 60_000_000_000;

        let mut handles = Vec::new();
        for i in 0..10 {
            let service = service.clone();
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                service
                    .invest(pool_id, &manager, &i.to_string(), tranche, account("0xinvestor"), CID)
                    .await
                    .is_ok()
            }));
        }
        let mut accepted = 0u128;
        for handle in handles {
            if matches!(handle.await, Ok(true)) {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 6);
        let Ok(details) = service.pool_details(pool_id).await else {
            panic!("pool not found");
        };
        assert_eq!(details.availability, 400_000_000_000 - accepted * tranche);
    }

    #[tokio::test]
    async fn remove_pool_requires_administrator() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let mut rx = service.event_bus().subscribe();

        let denied = service.remove_pool(pool_id, &account("0xmanager")).await;
        assert!(matches!(denied, Err(GatewayError::Ledger(_))));
        assert!(service.pool_details(pool_id).await.is_ok());

        assert!(service.remove_pool(pool_id, &account("0xowner")).await.is_ok());
        assert!(service.pool_details(pool_id).await.is_err());
        let Ok(event) = rx.recv().await else {
            panic!("expected event");
        };
        assert_eq!(event.event_type_str(), "pool_removed");
    }

    #[tokio::test]
    async fn redundant_grant_does_not_touch_metadata() {
        let service = make_service();
        let pool_id = make_pool(&service).await;
        let changed = service
            .grant_role(pool_id, &account("0xowner"), Role::PoolOperator, account("0xmanager"))
            .await;
        assert!(matches!(changed, Ok(false)));
        let Ok(entry_lock) = service.registry().get(pool_id).await else {
            panic!("pool not found");
        };
        assert_eq!(entry_lock.read().await.operation_count, 0);
    }
}
