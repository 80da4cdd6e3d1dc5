//! Account identity used for role holders, position owners and wallets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PoolId;

/// Identity of an account (typically a hex address such as `0xabc…`).
///
/// Identities are trimmed and lowercased on construction so that two
/// spellings of the same address compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

/// Prefix of pool custody identities. Only [`AccountId::custody`] may
/// produce it.
pub const CUSTODY_PREFIX: &str = "pool:";

/// Error returned when an identity string cannot name an account.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAccountId {
    /// Nothing left after trimming.
    #[error("account identity must not be empty")]
    Empty,
    /// The identity falls in the reserved custody namespace.
    #[error("account identity {0:?} is reserved for pool custody")]
    Reserved(String),
}

impl AccountId {
    /// Builds an identity from any string-like value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAccountId::Empty`] if the value is empty after
    /// trimming, and [`InvalidAccountId::Reserved`] if it starts with
    /// [`CUSTODY_PREFIX`].
    pub fn new(raw: impl AsRef<str>) -> Result<Self, InvalidAccountId> {
        let normalized = raw.as_ref().trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(InvalidAccountId::Empty);
        }
        if normalized.starts_with(CUSTODY_PREFIX) {
            return Err(InvalidAccountId::Reserved(normalized));
        }
        Ok(Self(normalized))
    }

    /// Custody account that holds a pool's balance on the external asset.
    #[must_use]
    pub fn custody(pool_id: PoolId) -> Self {
        Self(format!("{CUSTODY_PREFIX}{pool_id}"))
    }

    /// Returns `true` for pool custody identities.
    #[must_use]
    pub fn is_custody(&self) -> bool {
        self.0.starts_with(CUSTODY_PREFIX)
    }

    /// Returns the normalized identity string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = InvalidAccountId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let Ok(a) = AccountId::new(" 0xAbC ") else {
            panic!("valid identity");
        };
        let Ok(b) = AccountId::new("0xabc") else {
            panic!("valid identity");
        };
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xabc");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(AccountId::new("   "), Err(InvalidAccountId::Empty));
    }

    #[test]
    fn deserialize_rejects_empty() {
        assert!(serde_json::from_str::<AccountId>(r#""""#).is_err());
        let parsed: Result<AccountId, _> = serde_json::from_str(r#""0xDEAD""#);
        assert_eq!(parsed.ok().map(String::from), Some("0xdead".to_string()));
    }

    #[test]
    fn custody_account_is_pool_scoped() {
        let pool = PoolId::new();
        let custody = AccountId::custody(pool);
        assert_eq!(custody.to_string(), format!("pool:{pool}"));
        assert_ne!(custody, AccountId::custody(PoolId::new()));
        assert!(custody.is_custody());
    }

    #[test]
    fn custody_namespace_cannot_be_claimed() {
        let pool = PoolId::new();
        let spelled = format!(" POOL:{pool} ");
        assert!(matches!(
            AccountId::new(&spelled),
            Err(InvalidAccountId::Reserved(_))
        ));
        let quoted = format!("\"pool:{pool}\"");
        assert!(serde_json::from_str::<AccountId>(&quoted).is_err());
        let Ok(plain) = AccountId::new("0xpool") else {
            panic!("valid identity");
        };
        assert!(!plain.is_custody());
    }
}
