//! Two-role authorization component.
//!
//! [`RoleAuthority`] is owned by a [`super::PoolEngine`] and consulted before
//! every gated mutation. Only Administrator holders may change assignments.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AccountId, LedgerError};

/// The two fixed authorization roles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Grants and revokes roles. Held by the deploying identity.
    Administrator,
    /// Runs pool operations. Held by the designated manager.
    PoolOperator,
}

impl Role {
    /// Role identifier as it appears in access-control messages.
    #[must_use]
    pub const fn as_contract_str(self) -> &'static str {
        match self {
            Self::Administrator => "ADMIN_ROLE",
            Self::PoolOperator => "POOL_MANAGER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_contract_str())
    }
}

/// Error returned when parsing an unknown role name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" | "admin_role" => Ok(Self::Administrator),
            "pool_operator" | "operator" | "pool_manager" => Ok(Self::PoolOperator),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// Holder sets for each [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAuthority {
    holders: BTreeMap<Role, BTreeSet<AccountId>>,
}

impl RoleAuthority {
    /// Seeds the authority with the deploying administrator and the pool
    /// operator named at initialization.
    #[must_use]
    pub fn new(administrator: AccountId, operator: AccountId) -> Self {
        let mut holders: BTreeMap<Role, BTreeSet<AccountId>> = BTreeMap::new();
        holders
            .entry(Role::Administrator)
            .or_default()
            .insert(administrator);
        holders.entry(Role::PoolOperator).or_default().insert(operator);
        Self { holders }
    }

    /// Returns `true` if `holder` currently holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role, holder: &AccountId) -> bool {
        self.holders
            .get(&role)
            .is_some_and(|set| set.contains(holder))
    }

    /// Succeeds only if `caller` holds `role`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingRole`] otherwise.
    pub fn require(&self, role: Role, caller: &AccountId) -> Result<(), LedgerError> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(LedgerError::MissingRole {
                account: caller.clone(),
                role,
            })
        }
    }

    /// Assigns `role` to `holder`. Returns `false` if it was already held.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingRole`] if `caller` is not an
    /// Administrator.
    pub fn grant(
        &mut self,
        caller: &AccountId,
        role: Role,
        holder: AccountId,
    ) -> Result<bool, LedgerError> {
        self.require(Role::Administrator, caller)?;
        Ok(self.holders.entry(role).or_default().insert(holder))
    }

    /// Removes `role` from `holder`. Returns `false` if it was not held.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MissingRole`] if `caller` is not an
    /// Administrator.
    pub fn revoke(
        &mut self,
        caller: &AccountId,
        role: Role,
        holder: &AccountId,
    ) -> Result<bool, LedgerError> {
        self.require(Role::Administrator, caller)?;
        Ok(self
            .holders
            .get_mut(&role)
            .is_some_and(|set| set.remove(holder)))
    }

    /// Iterates over the current holders of `role`.
    pub fn holders(&self, role: Role) -> impl Iterator<Item = &AccountId> {
        self.holders.get(&role).into_iter().flatten()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    fn account(raw: &str) -> AccountId {
        let Ok(id) = AccountId::new(raw) else {
            panic!("valid identity");
        };
        id
    }

    fn authority() -> RoleAuthority {
        RoleAuthority::new(account("0xadmin"), account("0xmanager"))
    }

    #[test]
    fn seeds_initial_holders() {
        let roles = authority();
        assert!(roles.has_role(Role::Administrator, &account("0xadmin")));
        assert!(roles.has_role(Role::PoolOperator, &account("0xmanager")));
        assert!(!roles.has_role(Role::PoolOperator, &account("0xadmin")));
        assert!(!roles.has_role(Role::Administrator, &account("0xmanager")));
    }

    #[test]
    fn admin_grants_and_revokes_operator() {
        let mut roles = authority();
        let admin = account("0xadmin");
        let investor = account("0xinvestor");

        assert_eq!(
            roles.grant(&admin, Role::PoolOperator, investor.clone()),
            Ok(true)
        );
        assert!(roles.has_role(Role::PoolOperator, &investor));
        assert_eq!(
            roles.grant(&admin, Role::PoolOperator, investor.clone()),
            Ok(false)
        );

        assert_eq!(roles.revoke(&admin, Role::PoolOperator, &investor), Ok(true));
        assert!(!roles.has_role(Role::PoolOperator, &investor));
        assert_eq!(
            roles.revoke(&admin, Role::PoolOperator, &investor),
            Ok(false)
        );
    }

    #[test]
    fn operator_cannot_change_roles() {
        let mut roles = authority();
        let manager = account("0xmanager");
        let before = roles.clone();

        let Err(err) = roles.grant(&manager, Role::PoolOperator, account("0xinvestor")) else {
            panic!("operator must not grant");
        };
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            err.to_string(),
            "AccessControl: account 0xmanager is missing role ADMIN_ROLE"
        );

        let Err(err) = roles.revoke(&manager, Role::PoolOperator, &manager) else {
            panic!("operator must not revoke");
        };
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(roles, before);
    }

    #[test]
    fn parses_role_names() {
        assert_eq!("pool_operator".parse::<Role>(), Ok(Role::PoolOperator));
        assert_eq!("POOL_MANAGER".parse::<Role>(), Ok(Role::PoolOperator));
        assert_eq!("admin".parse::<Role>(), Ok(Role::Administrator));
        assert!("auditor".parse::<Role>().is_err());
    }

    #[test]
    fn holders_lists_assignments() {
        let roles = authority();
        let ops: Vec<_> = roles.holders(Role::PoolOperator).collect();
        assert_eq!(ops, vec![&account("0xmanager")]);
    }
}
