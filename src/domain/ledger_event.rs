//! Audit records produced by successful ledger mutations.
//!
//! Field order inside each variant mirrors the argument order of the
//! corresponding audit event and is relied upon by existing consumers.

use serde::Serialize;

use super::amount::as_string;
use super::{AccountId, Amount, PositionId, Role};

/// One audit record per successful mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Pool created with its initial terms and role holders.
    PoolInitialized {
        /// Deploying identity, holds Administrator.
        administrator: AccountId,
        /// Designated manager, holds PoolOperator.
        operator: AccountId,
        /// Total investable amount.
        #[serde(with = "as_string")]
        capacity: Amount,
        /// Reward rate.
        rate: u64,
        /// Window start (epoch milliseconds).
        window_start: u64,
        /// Window end (epoch milliseconds).
        window_end: u64,
        /// Initial minimum ticket.
        #[serde(with = "as_string")]
        minimum_ticket: Amount,
    },

    /// Investment accepted and position issued.
    Invested {
        /// Caller correlation key.
        order_ref: String,
        /// Owner of the new position.
        investor: AccountId,
        /// Amount reserved.
        #[serde(with = "as_string")]
        amount: Amount,
        /// New position.
        position_id: PositionId,
        /// Content reference attached to the position.
        content_ref: String,
        /// Availability after the reservation.
        #[serde(with = "as_string")]
        availability: Amount,
    },

    /// Reward paid out of pool custody.
    Withdrawn {
        /// Caller correlation key.
        order_ref: String,
        /// Receiving wallet.
        wallet: AccountId,
        /// Amount paid.
        #[serde(with = "as_string")]
        reward_amount: Amount,
        /// Position the payout is traced to.
        position_id: PositionId,
        /// Custody balance after the payout.
        #[serde(with = "as_string")]
        custody_balance: Amount,
    },

    /// Position settled into a fresh settlement position.
    FinalWithdrawal {
        /// Caller correlation key.
        order_ref: String,
        /// Owner of the settlement position.
        wallet: AccountId,
        /// Burned position.
        position_id: PositionId,
        /// Content reference of the settlement position.
        content_ref: String,
        /// Settlement position.
        new_position_id: PositionId,
    },

    /// Position split into children.
    Split {
        /// Caller correlation key.
        order_ref: String,
        /// Owner of every child.
        new_owner: AccountId,
        /// Burned parent.
        position_id: PositionId,
        /// Children, in amount order.
        new_position_ids: Vec<PositionId>,
        /// Number of children.
        count: usize,
    },

    /// Position changed hands.
    Transferred {
        /// Previous owner.
        from: AccountId,
        /// New owner.
        to: AccountId,
        /// Position moved.
        position_id: PositionId,
    },

    /// Position destroyed by an operator.
    Burned {
        /// Burned position.
        position_id: PositionId,
    },

    /// Position minted directly by an operator.
    Minted {
        /// Owner.
        to: AccountId,
        /// New position.
        position_id: PositionId,
        /// Content reference.
        content_ref: String,
    },

    /// Minimum ticket replaced.
    MinimumTicketUpdated {
        /// Previous value.
        #[serde(with = "as_string")]
        previous: Amount,
        /// New value.
        #[serde(with = "as_string")]
        minimum_ticket: Amount,
    },

    /// Role assigned.
    RoleGranted {
        /// Role.
        role: Role,
        /// New holder.
        account: AccountId,
        /// Administrator that made the change.
        sender: AccountId,
    },

    /// Role removed.
    RoleRevoked {
        /// Role.
        role: Role,
        /// Former holder.
        account: AccountId,
        /// Administrator that made the change.
        sender: AccountId,
    },

    /// Pool taken out of service by an administrator.
    PoolRemoved {
        /// Administrator that removed the pool.
        sender: AccountId,
    },

    /// Funds moved into pool custody.
    CustodyDeposited {
        /// Funding account.
        from: AccountId,
        /// Amount moved.
        #[serde(with = "as_string")]
        amount: Amount,
        /// Custody balance after the deposit.
        #[serde(with = "as_string")]
        custody_balance: Amount,
    },
}

impl LedgerEvent {
    /// Event identity as known to audit consumers.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::PoolInitialized { .. } => "PoolInitializedEvent",
            Self::Invested { .. } => "InvestedEvent",
            Self::Withdrawn { .. } => "WithdrawEvent",
            Self::FinalWithdrawal { .. } => "FinalWithdrawalEvent",
            Self::Split { .. } => "SplitEvent",
            Self::Transferred { .. } => "TransferEvent",
            Self::Burned { .. } => "BurnEvent",
            Self::Minted { .. } => "MintEvent",
            Self::MinimumTicketUpdated { .. } => "MinimumTicketUpdatedEvent",
            Self::RoleGranted { .. } => "RoleGrantedEvent",
            Self::RoleRevoked { .. } => "RoleRevokedEvent",
            Self::PoolRemoved { .. } => "PoolRemovedEvent",
            Self::CustodyDeposited { .. } => "CustodyDepositedEvent",
        }
    }

    /// Snake-case discriminator used in the JSON encoding.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::PoolInitialized { .. } => "pool_initialized",
            Self::Invested { .. } => "invested",
            Self::Withdrawn { .. } => "withdrawn",
            Self::FinalWithdrawal { .. } => "final_withdrawal",
            Self::Split { .. } => "split",
            Self::Transferred { .. } => "transferred",
            Self::Burned { .. } => "burned",
            Self::Minted { .. } => "minted",
            Self::MinimumTicketUpdated { .. } => "minimum_ticket_updated",
            Self::RoleGranted { .. } => "role_granted",
            Self::RoleRevoked { .. } => "role_revoked",
            Self::PoolRemoved { .. } => "pool_removed",
            Self::CustodyDeposited { .. } => "custody_deposited",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn account(raw: &str) -> AccountId {
        let Ok(id) = AccountId::new(raw) else {
            panic!("valid identity");
        };
        id
    }

    #[test]
    fn invested_serializes_in_contract_order() {
        let event = LedgerEvent::Invested {
            order_ref: "0".to_string(),
            investor: account("0xinvestor"),
            amount: 160_000_000,
            position_id: PositionId::new(0),
            content_ref: "QmZf".to_string(),
            availability: 399_840_000_000,
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert_eq!(
            json,
            r#"{"event_type":"invested","order_ref":"0","investor":"0xinvestor","amount":"160000000","position_id":0,"content_ref":"QmZf","availability":"399840000000"}"#
        );
        assert_eq!(event.event_name(), "InvestedEvent");
    }

    #[test]
    fn split_carries_ids_and_count() {
        let event = LedgerEvent::Split {
            order_ref: "0".to_string(),
            new_owner: account("0xinvestor"),
            position_id: PositionId::new(0),
            new_position_ids: vec![PositionId::new(1), PositionId::new(2)],
            count: 2,
        };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["new_position_ids"], serde_json::json!([1, 2]));
        assert_eq!(json["count"], 2);
        assert_eq!(event.event_type_str(), "split");
    }

    #[test]
    fn names_match_legacy_event_identities() {
        let transfer = LedgerEvent::Transferred {
            from: account("0xa"),
            to: account("0xb"),
            position_id: PositionId::new(0),
        };
        assert_eq!(transfer.event_name(), "TransferEvent");
        let withdraw = LedgerEvent::Withdrawn {
            order_ref: "0".to_string(),
            wallet: account("0xa"),
            reward_amount: 1,
            position_id: PositionId::new(0),
            custody_balance: 0,
        };
        assert_eq!(withdraw.event_name(), "WithdrawEvent");
    }
}
