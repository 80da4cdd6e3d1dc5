//! Position records: uniquely owned claims against a pool.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AccountId, Amount};

/// Identifier of a position within one pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PositionId(u64);

impl PositionId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PositionId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// How a position came to exist. Never changes after mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Issued against an investment.
    Invested {
        /// Amount reserved from the pool.
        #[serde(with = "super::amount::as_string")]
        #[schema(value_type = String)]
        amount: Amount,
    },
    /// Carved out of a parent position by a split.
    Split {
        /// Burned parent position.
        parent: PositionId,
        /// Share of the parent assigned to this child.
        #[serde(with = "super::amount::as_string")]
        #[schema(value_type = String)]
        amount: Amount,
    },
    /// Settlement position issued by a final withdrawal.
    FinalWithdrawal {
        /// Burned position that was settled.
        parent: PositionId,
    },
    /// Minted directly by an operator.
    Minted,
}

/// A live position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Position {
    /// Position id.
    pub id: PositionId,
    /// Current owner.
    pub owner: AccountId,
    /// Opaque external content reference, fixed at mint.
    pub content_ref: String,
    /// Creation provenance.
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_serializes_amount_as_string() {
        let json = serde_json::to_value(Provenance::Split {
            parent: PositionId::new(0),
            amount: 60_000_000,
        })
        .unwrap_or_default();
        assert_eq!(json["kind"], "split");
        assert_eq!(json["parent"], 0);
        assert_eq!(json["amount"], "60000000");
    }

    #[test]
    fn position_id_orders_numerically() {
        assert!(PositionId::new(2) < PositionId::new(10));
        assert_eq!(PositionId::from(5).get(), 5);
    }
}
